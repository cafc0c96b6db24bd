//! Kanban board and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use toolkit::DomainEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanbanBoard {
    pub id: i64,
    pub uuid: Uuid,
    pub brand_id: i64,
    pub team_id: i64,
    pub name: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for KanbanBoard {
    const KIND: &'static str = "kanban_board";
    const LABEL: &'static str = "Kanban board";

    fn id(&self) -> i64 {
        self.id
    }

    fn team_id(&self) -> Option<i64> {
        Some(self.team_id)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanbanTask {
    pub id: i64,
    pub uuid: Uuid,
    pub kanban_board_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order: i64,
    pub done: bool,
    pub done_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KanbanTask {
    /// `done` and `done_at` move together and are never independently
    /// settable: flipping to done stamps `done_at`, flipping back clears it.
    pub fn set_done(&mut self, done: bool, now: DateTime<Utc>) -> bool {
        if self.done == done {
            return false;
        }
        self.done = done;
        self.done_at = done.then_some(now);
        true
    }
}

impl DomainEntity for KanbanTask {
    const KIND: &'static str = "kanban_task";
    const LABEL: &'static str = "Kanban task";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> KanbanTask {
        KanbanTask {
            id: 1,
            uuid: Uuid::new_v4(),
            kanban_board_id: 1,
            title: "Launch review".to_string(),
            description: None,
            order: 1,
            done: false,
            done_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_done_and_done_at_move_together() {
        let mut task = task();
        let now = Utc::now();
        assert!(task.set_done(true, now));
        assert_eq!(task.done_at, Some(now));
        assert!(task.set_done(false, now));
        assert_eq!(task.done_at, None);
    }

    #[test]
    fn test_setting_done_twice_is_a_no_op() {
        let mut task = task();
        let first = Utc::now();
        assert!(task.set_done(true, first));
        assert!(!task.set_done(true, Utc::now()));
        assert_eq!(task.done_at, Some(first));
    }
}

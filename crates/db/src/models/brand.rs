//! Brand: the team-scoped root entity every board hangs off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use toolkit::DomainEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub uuid: Uuid,
    pub team_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for Brand {
    const KIND: &'static str = "brand";
    const LABEL: &'static str = "Brand";

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

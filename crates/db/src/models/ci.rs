//! Corporate-identity board and its color entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use toolkit::DomainEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiBoard {
    pub id: i64,
    pub uuid: Uuid,
    pub brand_id: i64,
    pub team_id: i64,
    pub name: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for CiBoard {
    const KIND: &'static str = "ci_board";
    const LABEL: &'static str = "CI board";

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
pub struct CiColor {
    pub id: i64,
    pub uuid: Uuid,
    pub ci_board_id: i64,
    pub name: String,
    /// Hex value including the leading `#`.
    pub hex: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for CiColor {
    const KIND: &'static str = "ci_color";
    const LABEL: &'static str = "CI color";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

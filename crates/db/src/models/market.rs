//! Competitor entries. Listings re-check `view` per row because competitor
//! visibility can be restricted below the board scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use toolkit::DomainEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub id: i64,
    pub uuid: Uuid,
    pub brand_id: i64,
    pub team_id: i64,
    pub name: String,
    pub url: Option<String>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for Competitor {
    const KIND: &'static str = "competitor";
    const LABEL: &'static str = "Competitor";

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

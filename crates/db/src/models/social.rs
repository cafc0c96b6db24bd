//! Social platforms and their export formats. Deleting a platform cascades
//! to its formats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use toolkit::DomainEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPlatform {
    pub id: i64,
    pub uuid: Uuid,
    pub brand_id: i64,
    pub team_id: i64,
    pub name: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for SocialPlatform {
    const KIND: &'static str = "social_platform";
    const LABEL: &'static str = "Social platform";

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
pub struct SocialFormat {
    pub id: i64,
    pub uuid: Uuid,
    pub social_platform_id: i64,
    pub name: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for SocialFormat {
    const KIND: &'static str = "social_format";
    const LABEL: &'static str = "Social format";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

//! SEO keyword clusters, keywords and the metrics budget ledger.
//!
//! Metrics lookups against the external provider cost money; every fetch is
//! charged against the brand's budget ledger and logged as an API cost row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use toolkit::DomainEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoCluster {
    pub id: i64,
    pub uuid: Uuid,
    pub brand_id: i64,
    pub team_id: i64,
    pub name: String,
    pub color: Option<String>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for SeoCluster {
    const KIND: &'static str = "seo_cluster";
    const LABEL: &'static str = "SEO keyword cluster";

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
pub struct SeoKeyword {
    pub id: i64,
    pub uuid: Uuid,
    pub seo_cluster_id: i64,
    pub term: String,
    pub search_volume: Option<i64>,
    pub cpc_cents: Option<i64>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for SeoKeyword {
    const KIND: &'static str = "seo_keyword";
    const LABEL: &'static str = "SEO keyword";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Per-brand spending ledger for external metrics lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoBudget {
    pub id: i64,
    pub uuid: Uuid,
    pub brand_id: i64,
    pub budget_limit_cents: i64,
    pub budget_spent_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SeoBudget {
    /// Ledger limit applied when a brand has no explicit budget row yet.
    pub const DEFAULT_LIMIT_CENTS: i64 = 10_000;

    pub fn remaining_cents(&self) -> i64 {
        self.budget_limit_cents - self.budget_spent_cents
    }

    pub fn covers(&self, cost_cents: i64) -> bool {
        self.budget_spent_cents + cost_cents <= self.budget_limit_cents
    }
}

impl DomainEntity for SeoBudget {
    const KIND: &'static str = "seo_budget";
    const LABEL: &'static str = "SEO budget";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Append-only log of external API charges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCostLog {
    pub id: i64,
    pub uuid: Uuid,
    pub brand_id: i64,
    pub provider: String,
    pub cost_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl DomainEntity for ApiCostLog {
    const KIND: &'static str = "api_cost_log";
    const LABEL: &'static str = "API cost log";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, _now: DateTime<Utc>) {
        // Append-only, rows are never updated.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_threshold() {
        let budget = SeoBudget {
            id: 1,
            uuid: Uuid::new_v4(),
            brand_id: 1,
            budget_limit_cents: 100,
            budget_spent_cents: 90,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(budget.remaining_cents(), 10);
        assert!(budget.covers(10));
        assert!(!budget.covers(11));
    }
}

//! Content board, its blocks and the per-block text content.
//!
//! A block starts without content; creating text content sets the block's
//! content-type pointer (`content_kind` + `content_id`) in the same atomic
//! batch that inserts the text row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use toolkit::DomainEntity;

/// Content type a block points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentKind::Text),
            _ => Err(format!("Invalid content kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBoard {
    pub id: i64,
    pub uuid: Uuid,
    pub brand_id: i64,
    pub team_id: i64,
    pub name: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainEntity for ContentBoard {
    const KIND: &'static str = "content_board";
    const LABEL: &'static str = "Content board";

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
pub struct ContentBlock {
    pub id: i64,
    pub uuid: Uuid,
    pub content_board_id: i64,
    pub name: String,
    pub order: i64,
    pub content_kind: Option<ContentKind>,
    pub content_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentBlock {
    pub fn has_content(&self) -> bool {
        self.content_kind.is_some()
    }
}

impl DomainEntity for ContentBlock {
    const KIND: &'static str = "content_block";
    const LABEL: &'static str = "Content block";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockText {
    pub id: i64,
    pub uuid: Uuid,
    pub content_block_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlockText {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

impl DomainEntity for BlockText {
    const KIND: &'static str = "block_text";
    const LABEL: &'static str = "Block text";

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

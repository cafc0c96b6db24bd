pub mod brand;
pub mod ci;
pub mod content;
pub mod kanban;
pub mod market;
pub mod seo;
pub mod social;

pub use brand::Brand;
pub use ci::{CiBoard, CiColor};
pub use content::{BlockText, ContentBlock, ContentBoard, ContentKind};
pub use kanban::{KanbanBoard, KanbanTask};
pub use market::Competitor;
pub use seo::{ApiCostLog, SeoBudget, SeoCluster, SeoKeyword};
pub use social::{SocialFormat, SocialPlatform};

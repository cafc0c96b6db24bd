//! Domain models and storage for the brand-management tool layer.
//!
//! Models follow one shape: integer primary key issued by the store, public
//! `uuid`, foreign key to the owning scope, display `order` where siblings
//! are user-sortable, and `created_at`/`updated_at` timestamps. The
//! [`memory::MemoryStore`] implements the `toolkit` store seam; a relational
//! backend would implement the same trait.

pub mod memory;
pub mod models;

pub use memory::MemoryStore;

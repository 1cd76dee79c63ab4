//! # Prodflow Stores
//!
//! In-memory implementations of the prodflow-core store traits.
//!
//! Each store guards its map with one `RwLock`; the quorum-aware plan
//! mutations run entirely inside a single write-lock critical section,
//! which is the in-process equivalent of the one-transaction rule the
//! store contract requires.

mod link_store;
mod plan_store;
mod schedule_store;
mod user_directory;

pub use link_store::InMemoryLinkStore;
pub use plan_store::InMemoryPlanStore;
pub use schedule_store::InMemoryScheduleStore;
pub use user_directory::InMemoryUserDirectory;

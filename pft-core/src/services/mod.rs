//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case.

mod link;
mod sync;

pub use link::{LinkService, DEFAULT_USER_ID};
pub use sync::{SyncResult, SyncService};

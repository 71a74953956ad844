//! Test doubles for the store and publisher seams.
//!
//! The orchestrator only sees `WorkflowStore` and `EventPublisher`, so these
//! doubles let tests force each failure path without a database or broker.

mod publisher;
mod store;

pub use publisher::RecordingPublisher;
pub use store::UnavailableStore;

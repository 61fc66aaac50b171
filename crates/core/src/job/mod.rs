//! Job registry for tracking pass-generation work.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteJobStore;
pub use store::{CreateJobRequest, JobError, JobFilter, JobStore};
pub use types::{Job, JobState};

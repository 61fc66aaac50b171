//! Background processing pipeline turning uploads into pass artifacts.

mod config;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use runner::PassPipeline;
pub use types::{PipelineError, PipelineStatus};

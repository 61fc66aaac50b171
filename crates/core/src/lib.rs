pub mod artifact;
pub mod auth;
pub mod certificates;
pub mod config;
pub mod extract;
pub mod job;
pub mod metrics;
pub mod pdf;
pub mod pipeline;
pub mod provision;
pub mod signer;
pub mod testing;
pub mod wallet;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use job::{CreateJobRequest, Job, JobError, JobFilter, JobState, JobStore, SqliteJobStore};
pub use pipeline::{PassPipeline, PipelineConfig, PipelineError, PipelineStatus};

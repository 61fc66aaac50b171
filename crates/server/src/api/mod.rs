pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod passes;
pub mod routes;
pub mod upload;

pub use routes::create_router;

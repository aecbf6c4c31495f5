//! DashScout chat API, a REST front end over the query pipelines.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `ds-e2e-tests`) can access internal types like `AppState` and
//! `build_router`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::build_router;
pub use state::AppState;

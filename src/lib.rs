pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use errors::{AppError, AppResult};
pub use routes::{build_router, AppState};

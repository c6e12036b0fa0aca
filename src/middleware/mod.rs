mod auth;
mod logging;

pub use auth::require_auth;
pub use logging::log_request;

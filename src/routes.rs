use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::auth::{CredentialCodec, CredentialError};
use crate::config::AuthConfig;
use crate::handlers;
use crate::middleware;
use crate::services::{AccountService, Notifier, TaskAccessController, TaskStore, UserStore};

/// Shared by every handler and by the auth middleware.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<CredentialCodec>,
    pub tasks: TaskAccessController,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(
        auth: &AuthConfig,
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CredentialError> {
        let codec = Arc::new(CredentialCodec::new(auth)?);
        Ok(Self {
            tasks: TaskAccessController::new(tasks, notifier),
            accounts: AccountService::new(users, codec.clone(), auth.bcrypt_cost),
            codec,
        })
    }
}

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/v1/login", post(handlers::handle_login))
        .route("/v1/users", post(handlers::handle_signup))
        .route(
            "/v1/tasks",
            post(handlers::create_task).get(handlers::list_tasks),
        )
        .route(
            "/v1/tasks/:id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/v1/user_tasks", get(handlers::list_user_tasks))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .layer(from_fn(middleware::log_request))
        // Enforced by the JSON extractor, so oversized bodies surface as a
        // JsonRejection and go through the AppError envelope.
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

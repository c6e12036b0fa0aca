use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::errors::AppResult;
use crate::handlers::json::JsonBody;
use crate::models::{LoginRequest, SignupRequest, UserResponse};
use crate::routes::AppState;

pub async fn handle_login(
    State(state): State<AppState>,
    JsonBody(login): JsonBody<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let auth = state.accounts.login(login).await?;
    Ok(Json(auth))
}

pub async fn handle_signup(
    State(state): State<AppState>,
    JsonBody(signup): JsonBody<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state.accounts.signup(signup).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

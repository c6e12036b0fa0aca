use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::auth::Credential;
use crate::errors::{AppError, AppResult};
use crate::handlers::json::JsonBody;
use crate::models::TaskPayload;
use crate::routes::AppState;

// Body rejections are handed to the controller unopened so they surface
// only after the permission and ownership checks.
type TaskBody = Result<JsonBody<TaskPayload>, AppError>;

fn unwrap_body(body: TaskBody) -> AppResult<TaskPayload> {
    body.map(|JsonBody(payload)| payload)
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    body: TaskBody,
) -> AppResult<impl IntoResponse> {
    let task = state.tasks.create(&credential, unwrap_body(body)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(task_id): Path<String>,
    body: TaskBody,
) -> AppResult<impl IntoResponse> {
    state
        .tasks
        .update(&credential, &task_id, unwrap_body(body))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(task_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let task = state.tasks.get_one(&credential, &task_id).await?;
    Ok(Json(task))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
) -> AppResult<impl IntoResponse> {
    let tasks = state.tasks.list_all(&credential).await?;
    Ok(Json(tasks))
}

pub async fn list_user_tasks(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
) -> AppResult<impl IntoResponse> {
    let tasks = state.tasks.list_own(&credential).await?;
    Ok(Json(tasks))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(task_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.tasks.delete(&credential, &task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

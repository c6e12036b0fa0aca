use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` with rejections reported through the application envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

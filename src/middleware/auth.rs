use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::routes::AppState;

/// Paths reachable without a credential.
const PUBLIC_PATHS: &[&str] = &["/v1/login", "/v1/users"];

/// Decodes the bearer credential and stores it in the request extensions
/// for handlers to pick up with `Extension<Credential>`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if PUBLIC_PATHS.contains(&path) {
        return next.run(req).await;
    }

    let token = match bearer_token(req.headers()) {
        Some(token) => token.to_string(),
        None => {
            tracing::debug!(path, "request without bearer credential");
            return AppError::Unauthorized(
                "the authorization header must carry a bearer token".into(),
            )
            .into_response();
        }
    };

    match state.codec.decode(&token) {
        Ok(credential) => {
            tracing::debug!(subject = credential.subject_id, "credential accepted");
            req.extensions_mut().insert(credential);
            next.run(req).await
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_the_token_after_bearer() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("abc.def.ghi")), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
    }
}

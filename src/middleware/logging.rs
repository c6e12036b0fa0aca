use axum::{body::Body, extract::Request, http::header::HOST, middleware::Next, response::Response};

pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let host = req
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(req).await;
    tracing::info!(%method, %uri, %host, status = response.status().as_u16(), "request");
    response
}

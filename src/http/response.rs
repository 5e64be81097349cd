//! Response handling.
//!
//! # Responsibilities
//! - Framework handlers shared by applications (welcome page, health, 404)
//! - Fixed responses for routes declared in `app.toml`
//!
//! # Design Decisions
//! - Unmatched paths answer with a JSON body, never an empty 404
//! - Declared responses are built once at init and cloned per request

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /` of the default application.
pub async fn welcome() -> Html<String> {
    Html(format!(
        "<!doctype html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>Nightframe</title></head>\n\
         <body>\n\
         <h1>Nightframe {}</h1>\n\
         <p>The default application is running. Add an <code>app.toml</code> \
         to the working directory to serve your own application.</p>\n\
         </body>\n\
         </html>\n",
        env!("CARGO_PKG_VERSION")
    ))
}

/// Fallback for unmatched paths.
pub async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "path": uri.path() })),
    )
}

/// A response fixed at application init.
#[derive(Debug, Clone)]
pub struct StaticResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl StaticResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

impl IntoResponse for StaticResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[tokio::test]
    async fn test_static_response_keeps_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        let response = StaticResponse::new(StatusCode::CREATED, headers, "made").into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"made");
    }

    #[tokio::test]
    async fn test_not_found_reports_path() {
        let (status, Json(body)) = not_found("/missing?x=1".parse().unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/missing");
    }
}

//! Per-request correlation ids.
//!
//! Every request handled by the API carries an `x-request-id`. A value set by
//! an upstream proxy is kept so that its logs and ours line up; otherwise a
//! UUID v4 is minted here. The id ends up in three places:
//! - the `request_id` field of the request span opened by `TraceLayer`
//! - a Sentry tag on the current scope
//! - the response headers, so a customer can quote it in a support ticket

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id that is passed through unchanged.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Attach a request id to the span, the Sentry scope and the response.
///
/// An incoming `x-request-id` is reused when it is non-empty, at most
/// 128 bytes and made of visible ASCII. Anything else is replaced with a
/// fresh UUID v4 rather than echoed back.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| is_usable(id))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    // The span is opened by TraceLayer with an empty `request_id` field.
    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn is_usable(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn router() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    async fn echoed(header: Option<&str>) -> String {
        let mut request = Request::builder().uri("/");
        if let Some(value) = header {
            request = request.header(REQUEST_ID_HEADER, value);
        }
        let response = router()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.headers()[REQUEST_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_upstream_id_is_kept() {
        assert_eq!(echoed(Some("edge-7f3a")).await, "edge-7f3a");
    }

    #[tokio::test]
    async fn test_missing_or_unusable_id_is_replaced() {
        for header in [None, Some(""), Some("has space"), Some(&"x".repeat(129)[..])] {
            let id = echoed(header).await;
            assert!(Uuid::parse_str(&id).is_ok(), "{header:?} -> {id}");
        }
    }
}

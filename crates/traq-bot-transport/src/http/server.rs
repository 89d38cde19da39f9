//! Webhook route for [`PushTransport`].
//!
//! ```text
//! POST <path>
//!   X-TRAQ-BOT-EVENT       event name (required)
//!   X-TRAQ-BOT-REQUEST-ID  request id
//!   X-TRAQ-BOT-TOKEN       verification token
//!   body                   JSON
//!
//! 204 No Content   accepted
//! 400 Bad Request  token mismatch, missing event name, body is not JSON
//! ```

use std::net::SocketAddr;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use traq_bot_core::TransportResult;

use crate::push::{PushTransport, SubmitOutcome};

/// Header carrying the event name.
pub const HEADER_EVENT: &str = "X-TRAQ-BOT-EVENT";
/// Header carrying the request id.
pub const HEADER_REQUEST_ID: &str = "X-TRAQ-BOT-REQUEST-ID";
/// Header carrying the verification token.
pub const HEADER_TOKEN: &str = "X-TRAQ-BOT-TOKEN";

/// Builds a router that accepts webhook POSTs on `path`.
pub fn push_router(transport: PushTransport, path: &str) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    Router::new()
        .route(&path, post(handle_event))
        .with_state(transport)
}

/// A running webhook server.
#[derive(Debug)]
pub struct PushServerHandle {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl PushServerHandle {
    /// Returns the bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits until the server has shut down.
    pub async fn stopped(self) {
        if let Err(e) = self.task.await {
            error!(error = %e, "HTTP server task failed");
        }
    }
}

/// Binds `addr` and serves the webhook route until `cancel` fires.
pub async fn serve_push(
    addr: &str,
    path: &str,
    transport: PushTransport,
    cancel: CancellationToken,
) -> TransportResult<PushServerHandle> {
    let router = push_router(transport, path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    info!(addr = %local_addr, path = %path, "HTTP server listening");

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, router).with_graceful_shutdown(cancel.cancelled_owned());
        if let Err(e) = server.await {
            error!(error = %e, "HTTP server error");
        }
        info!("HTTP server stopped");
    });

    Ok(PushServerHandle { local_addr, task })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn handle_event(
    State(transport): State<PushTransport>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(event_name) = header_str(&headers, HEADER_EVENT) else {
        warn!("Webhook request without event name");
        return StatusCode::BAD_REQUEST;
    };

    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            warn!(event = %event_name, error = %e, "Webhook body is not JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    let request_id = header_str(&headers, HEADER_REQUEST_ID).map(str::to_owned);
    let token = header_str(&headers, HEADER_TOKEN);

    match transport.submit(event_name, request_id, token, body) {
        SubmitOutcome::Accepted => StatusCode::NO_CONTENT,
        SubmitOutcome::Rejected(_) => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use traq_bot_core::EventSource;

    fn request(headers: &[(&str, &str)], body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/bot")
            .header("content-type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    #[tokio::test]
    async fn test_accepted_event_is_queued() {
        let mut transport = PushTransport::new(Some("token".into()));
        let app = push_router(transport.clone(), "bot");

        let response = app
            .oneshot(request(
                &[
                    (HEADER_EVENT, "PING"),
                    (HEADER_REQUEST_ID, "req-1"),
                    (HEADER_TOKEN, "token"),
                ],
                r#"{"eventTime":"2019-05-08T13:33:51.690308239Z"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let envelope = transport
            .next_event(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(envelope.event_name(), "PING");
        assert_eq!(envelope.request_id(), Some("req-1"));
    }

    #[tokio::test]
    async fn test_wrong_token_is_bad_request() {
        let transport = PushTransport::new(Some("token".into()));
        let app = push_router(transport.clone(), "/bot");

        let response = app
            .oneshot(request(
                &[(HEADER_EVENT, "PING"), (HEADER_TOKEN, "TOKEN")],
                "{}",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transport.pending(), 0);
    }

    #[tokio::test]
    async fn test_missing_event_header_is_bad_request() {
        let transport = PushTransport::new(None);
        let app = push_router(transport.clone(), "/bot");

        let response = app.oneshot(request(&[], "{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transport.pending(), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let transport = PushTransport::new(None);
        let app = push_router(transport.clone(), "/bot");

        let response = app
            .oneshot(request(&[(HEADER_EVENT, "PING")], "not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transport.pending(), 0);
    }

    #[tokio::test]
    async fn test_serve_push_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let handle = serve_push("127.0.0.1:0", "/bot", PushTransport::new(None), cancel.clone())
            .await
            .unwrap();
        assert_ne!(handle.local_addr().port(), 0);

        cancel.cancel();
        handle.stopped().await;
    }
}

//! The ingestion HTTP surface: `POST /submit` and `GET /health`.

use crate::errors::SubmitError;
use crate::submission::Submission;
use anyhow::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Source of the expected submission token. Fetched fresh on every
/// request; implementations must not cache.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn fetch_token(&self) -> Result<String>;
}

/// Destination queue for accepted submissions.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, body: &str) -> Result<()>;
}

/// Read-only state shared by all requests. There is nothing mutable
/// here, so concurrent requests need no coordination.
pub struct ApiState {
    pub token_store: Box<dyn TokenStore>,
    pub publisher: Box<dyn Publisher>,
}

/// Build the ingestion router.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/submit", post(submit))
        .route("/health", get(health))
        .with_state(state)
}

/// Accept a submission: authenticate the token against the parameter
/// store, validate `data.email_timestream`, and forward the raw body
/// to the queue. Exactly one publish attempt per valid request.
async fn submit(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<Value>, SubmitError> {
    let raw = std::str::from_utf8(&body).map_err(|_| SubmitError::MalformedRequest)?;
    let submission = Submission::parse(raw)?;

    // A store failure is reported exactly like a bad token.
    let expected = state.token_store.fetch_token().await.map_err(|e| {
        warn!("Failed to fetch the expected token: {:?}", e);
        SubmitError::Unauthorized
    })?;
    if submission.token() != expected {
        return Err(SubmitError::Unauthorized);
    }

    submission.validate_email_timestream()?;

    state.publisher.publish(submission.raw()).await.map_err(|e| {
        error!("Failed to forward submission to the queue: {:?}", e);
        SubmitError::DownstreamUnavailable
    })?;
    info!("Accepted submission");
    Ok(Json(json!({ "message": "Payload accepted" })))
}

/// Liveness probe. Deliberately checks nothing, so it can't be used
/// to infer the availability of the token store or the queue.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct StaticToken(&'static str);

    #[async_trait]
    impl TokenStore for StaticToken {
        async fn fetch_token(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl TokenStore for UnreachableStore {
        async fn fetch_token(&self) -> Result<String> {
            Err(anyhow!("parameter store is unreachable"))
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Publisher for Arc<RecordingPublisher> {
        async fn publish(&self, body: &str) -> Result<()> {
            self.sent.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }

    struct FailingPublisher;

    #[async_trait]
    impl Publisher for FailingPublisher {
        async fn publish(&self, _body: &str) -> Result<()> {
            Err(anyhow!("queue rejected the message"))
        }
    }

    fn app_with(
        token_store: impl TokenStore + 'static,
        publisher: impl Publisher + 'static,
    ) -> Router {
        router(Arc::new(ApiState {
            token_store: Box::new(token_store),
            publisher: Box::new(publisher),
        }))
    }

    async fn post_submit(app: Router, payload: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/submit")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn valid_submission_is_accepted_and_forwarded_verbatim() {
        let publisher = Arc::new(RecordingPublisher::default());
        let app = app_with(StaticToken("T"), publisher.clone());
        let payload = r#"{"token":"T","data":{"email_timestream":1700000000}}"#;

        let (status, body) = post_submit(app, payload).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Payload accepted" }));
        assert_eq!(*publisher.sent.lock().unwrap(), vec![payload.to_string()]);
    }

    #[tokio::test]
    async fn omitted_timestream_is_accepted() {
        let publisher = Arc::new(RecordingPublisher::default());
        let app = app_with(StaticToken("T"), publisher.clone());

        let (status, _) = post_submit(app, r#"{"token":"T","data":{"note":"hi"}}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(publisher.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_without_publishing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let app = app_with(StaticToken("T"), publisher.clone());

        let (status, body) = post_submit(app, r#"{"token":"T"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing 'token' or 'data' in request" }));
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_token_is_rejected_without_publishing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let app = app_with(StaticToken("T"), publisher.clone());

        let (status, body) = post_submit(app, r#"{"token":"nope","data":{}}"#).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Invalid token" }));
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_outage_reads_as_invalid_token() {
        let publisher = Arc::new(RecordingPublisher::default());
        let app = app_with(UnreachableStore, publisher.clone());

        let (status, body) = post_submit(app, r#"{"token":"T","data":{}}"#).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Invalid token" }));
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_timestream_is_rejected_without_publishing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let app = app_with(StaticToken("T"), publisher.clone());

        let (status, body) =
            post_submit(app, r#"{"token":"T","data":{"email_timestream":"soon"}}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid 'email_timestream'" }));
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_is_a_server_error() {
        let app = app_with(StaticToken("T"), FailingPublisher);

        let (status, body) = post_submit(app, r#"{"token":"T","data":{}}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to send message to SQS" }));
    }

    #[tokio::test]
    async fn health_always_reports_ok() {
        let app = app_with(StaticToken("T"), FailingPublisher);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }
}

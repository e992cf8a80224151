//! Token verification endpoint.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
};
use serde::{Deserialize, Serialize};

use warden_common::constants::headers::X_FORWARDED_FOR;
use warden_common::{Constraints, Response, WardenError};

use crate::state::AppState;
use crate::verify::HttpClient;

#[derive(Deserialize)]
pub struct VerifyRequest {
    /// Token produced by the client-side widget
    token: String,
    /// End-user address; falls back to the first X-Forwarded-For hop
    remote_ip: Option<String>,
    /// Per-request constraints, replacing the configured defaults
    constraints: Option<Constraints>,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    valid: bool,
    #[serde(flatten)]
    response: Response,
}

/// Error body for failed requests
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps a [`WardenError`] onto an HTTP reply
pub struct ApiError(WardenError);

impl From<WardenError> for ApiError {
    fn from(err: WardenError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

/// Verify a token with the siteverify service
///
/// Returns 200 with the verdict whether or not the token is valid;
/// 502 when the siteverify service cannot be reached.
pub async fn verify_token<C: HttpClient + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let remote_ip = payload.remote_ip.or_else(|| forwarded_for(&headers));
    let constraints = payload
        .constraints
        .unwrap_or_else(|| state.verifier.constraints().clone());

    let response = state
        .verifier
        .verify_with(&payload.token, remote_ip.as_deref(), &constraints)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Siteverify request failed"))?;

    Ok(Json(VerifyResponse {
        valid: response.valid(),
        response,
    }))
}

/// First address in an X-Forwarded-For chain
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|hop| !hop.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::routes::create_router;
    use crate::verify::{FormRequest, HttpReply};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[derive(Clone)]
    struct StubClient {
        body: Option<String>,
        requests: Arc<Mutex<Vec<FormRequest>>>,
    }

    impl StubClient {
        fn replying(body: &str) -> Self {
            Self {
                body: Some(body.to_string()),
                requests: Arc::default(),
            }
        }

        fn unreachable() -> Self {
            Self {
                body: None,
                requests: Arc::default(),
            }
        }
    }

    impl HttpClient for StubClient {
        async fn send(&self, request: FormRequest) -> Result<HttpReply, WardenError> {
            self.requests.lock().unwrap().push(request);
            match &self.body {
                Some(body) => Ok(HttpReply {
                    status: 200,
                    body: body.clone(),
                }),
                None => Err(WardenError::transport(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "timed out",
                ))),
            }
        }
    }

    const REPLY: &str = r#"{"success": true, "error-codes": [], "hostname": "test.local.com",
                            "score": 0.8, "action": "login"}"#;

    fn app(client: StubClient, config: AppConfig) -> axum::Router {
        create_router(AppState::with_client(config, client))
    }

    fn config() -> AppConfig {
        AppConfig {
            secret: "test_secret".to_string(),
            ..Default::default()
        }
    }

    async fn post(
        app: axum::Router,
        body: serde_json::Value,
        xff: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::post("/verify").header("Content-Type", "application/json");
        if let Some(xff) = xff {
            request = request.header(X_FORWARDED_FOR, xff);
        }
        let request = request.body(Body::from(body.to_string())).unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_verify_valid_token() {
        let (status, body) = post(
            app(StubClient::replying(REPLY), config()),
            serde_json::json!({"token": "t"}),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["success"], true);
        assert_eq!(body["hostname"], "test.local.com");
        assert_eq!(body["error-codes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_configured_constraints_apply() {
        let mut config = config();
        config.constraints.hostname = Some("other.com".to_string());
        config.constraints.threshold = Some(0.9);

        let (status, body) = post(
            app(StubClient::replying(REPLY), config),
            serde_json::json!({"token": "t"}),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert_eq!(
            body["error-codes"],
            serde_json::json!(["hostname-mismatch", "score-threshold-not-met"])
        );
        assert_eq!(body["constraints"]["hostname"], "other.com");
    }

    #[tokio::test]
    async fn test_request_constraints_replace_defaults() {
        let mut config = config();
        config.constraints.hostname = Some("other.com".to_string());

        let (_, body) = post(
            app(StubClient::replying(REPLY), config),
            serde_json::json!({"token": "t", "constraints": {"action": "signup"}}),
            None,
        )
        .await;

        assert_eq!(body["error-codes"], serde_json::json!(["action-mismatch"]));
        assert_eq!(body["constraints"]["hostname"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_remote_ip_from_forwarded_header() {
        let client = StubClient::replying(REPLY);
        let requests = client.requests.clone();

        post(
            app(client, config()),
            serde_json::json!({"token": "t"}),
            Some("203.0.113.7, 10.0.0.1"),
        )
        .await;

        let sent = requests.lock().unwrap();
        assert!(sent[0].body.contains("remoteip=203.0.113.7&"));
    }

    #[tokio::test]
    async fn test_explicit_remote_ip_wins() {
        let client = StubClient::replying(REPLY);
        let requests = client.requests.clone();

        post(
            app(client, config()),
            serde_json::json!({"token": "t", "remote_ip": "198.51.100.1"}),
            Some("203.0.113.7"),
        )
        .await;

        let sent = requests.lock().unwrap();
        assert!(sent[0].body.contains("remoteip=198.51.100.1&"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let (status, body) = post(
            app(StubClient::unreachable(), config()),
            serde_json::json!({"token": "t"}),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_garbage_upstream_reply() {
        let (status, body) = post(
            app(StubClient::replying("<html>"), config()),
            serde_json::json!({"token": "t"}),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert_eq!(body["error-codes"], serde_json::json!(["invalid-json-response"]));
    }
}

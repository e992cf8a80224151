//! HTTP transport seam.
//!
//! The verifier only needs one request/response exchange per call. Timeouts,
//! pooling and retries belong to whichever client is plugged in here.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use warden_common::WardenError;

use super::FormRequest;

/// Raw reply from the verification endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Anything able to perform a single form POST
pub trait HttpClient: Send + Sync {
    /// Send the request and read the whole body.
    ///
    /// Connection-level failures are reported as [`WardenError::Transport`].
    fn send(&self, request: FormRequest)
    -> impl Future<Output = Result<HttpReply, WardenError>> + Send;
}

/// Default transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Create a client with a total request timeout
    pub fn new(timeout: Duration) -> Result<Self, WardenError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .user_agent(format!("warden/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WardenError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestClient {
    async fn send(&self, request: FormRequest) -> Result<HttpReply, WardenError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| WardenError::InvalidInput(format!("Bad HTTP method: {}", e)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(WardenError::transport)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(WardenError::transport)?;

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::HeaderMap, http::header::CONTENT_TYPE, routing::post};
    use tokio::net::TcpListener;

    /// Echo the content type and body back as `<content-type>\n<body>`
    async fn echo(headers: HeaderMap, body: String) -> String {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        format!("{}\n{}", content_type, body)
    }

    async fn spawn_echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/siteverify", post(echo));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/siteverify", addr)
    }

    #[tokio::test]
    async fn test_reqwest_client_posts_form() {
        let url = spawn_echo_server().await;
        let client = ReqwestClient::new(Duration::from_secs(5)).unwrap();
        let request = FormRequest::siteverify(&url, "test_secret", "test_token", Some("10.0.0.1"));
        let expected_body = request.body.clone();

        let reply = client.send(request).await.unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(
            reply.body,
            format!("application/x-www-form-urlencoded\n{}", expected_body)
        );
    }

    #[tokio::test]
    async fn test_reqwest_client_connection_refused() {
        // Bind and release a port so nothing is listening on it.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ReqwestClient::new(Duration::from_secs(5)).unwrap();
        let request = FormRequest::siteverify(&format!("http://{}/", addr), "s", "t", None);

        let err = client.send(request).await.unwrap_err();

        assert!(matches!(err, WardenError::Transport(_)));
        assert!(err.is_retryable());
    }
}

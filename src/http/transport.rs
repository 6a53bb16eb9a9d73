//! Terminal stage backed by `reqwest`.

use async_trait::async_trait;
use std::time::Duration;

use super::pipeline::{HttpResult, Transport};
use super::{HttpError, HttpRequest, HttpResponse};

/// Performs the real network I/O.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Client with a whole-request timeout used when a request carries none.
    pub fn new(default_timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(default_timeout)
            .build()
            .map_err(HttpError::from)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> HttpResult {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use reqwest::header::USER_AGENT;
    use reqwest::Url;

    async fn echo_agent(headers: HeaderMap) -> (StatusCode, String) {
        let agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        (StatusCode::ACCEPTED, agent)
    }

    async fn spawn_server() -> std::net::SocketAddr {
        let app = Router::new().route("/echo", get(echo_agent));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }

    #[tokio::test]
    async fn test_round_trip_against_local_server() {
        let addr = spawn_server().await;
        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&format!("http://{}/echo", addr)).unwrap();
        let request = HttpRequest::get(url).with_header(
            USER_AGENT,
            reqwest::header::HeaderValue::from_static("geo-mcp-test"),
        );

        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status.as_u16(), 202);
        assert_eq!(response.text(), "geo-mcp-test");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let url = Url::parse(&format!("http://{}/?access_token=secret", addr)).unwrap();
        let err = transport.send(HttpRequest::get(url)).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(!err.to_string().contains("secret"));
    }
}

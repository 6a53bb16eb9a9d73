//! Policy chain: ordered stages around one terminal transport.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::identify::UserAgentPolicy;
use super::retry::RetryPolicy;
use super::trace::TracingPolicy;
use super::{HttpError, HttpRequest, HttpResponse};
use crate::types::{BuildInfo, RetryConfig};

/// Outcome of a dispatch.
pub type HttpResult = std::result::Result<HttpResponse, HttpError>;

/// One cross-cutting stage of the pipeline.
///
/// A policy may rewrite the request, inspect the response, skip `next`
/// entirely, or call it several times.
#[async_trait]
pub trait Policy: Send + Sync + fmt::Debug {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> HttpResult;
}

/// Terminal stage: performs the actual network I/O.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: HttpRequest) -> HttpResult;
}

/// Continuation handed to each policy: the remaining stages plus the transport.
///
/// `Copy`, so a policy can run the rest of the chain more than once.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    policies: &'a [Arc<dyn Policy>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    /// Run the remaining stages on `request`.
    pub async fn run(self, request: HttpRequest) -> HttpResult {
        match self.policies.split_first() {
            Some((policy, rest)) => {
                let next = Next {
                    policies: rest,
                    transport: self.transport,
                };
                policy.handle(request, next).await
            }
            None => self.transport.send(request).await,
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.policies.iter().map(|p| p.name()).collect();
        f.debug_struct("Next")
            .field("remaining", &names)
            .field("transport", &self.transport)
            .finish()
    }
}

/// Immutable, shareable request pipeline.
///
/// Built once at startup; there is no way to add a stage afterwards.
#[derive(Debug)]
pub struct HttpPipeline {
    policies: Vec<Arc<dyn Policy>>,
    transport: Arc<dyn Transport>,
}

impl HttpPipeline {
    pub fn builder(transport: Arc<dyn Transport>) -> HttpPipelineBuilder {
        HttpPipelineBuilder {
            policies: Vec::new(),
            transport,
        }
    }

    /// Identification → retry → tracing → transport.
    pub fn standard(
        build: &BuildInfo,
        retry: &RetryConfig,
        attempt_timeout: Duration,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::builder(transport)
            .policy(Arc::new(UserAgentPolicy::new(build)))
            .policy(Arc::new(
                RetryPolicy::new(retry).with_attempt_timeout(attempt_timeout),
            ))
            .policy(Arc::new(TracingPolicy::new()))
            .build()
    }

    /// Send `request` through every stage in order.
    pub async fn dispatch(&self, request: HttpRequest) -> HttpResult {
        let next = Next {
            policies: &self.policies,
            transport: self.transport.as_ref(),
        };
        next.run(request).await
    }

    /// Stage names in execution order.
    pub fn policy_names(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.name()).collect()
    }
}

/// Collects stages in order, then freezes them into an [`HttpPipeline`].
#[derive(Debug)]
pub struct HttpPipelineBuilder {
    policies: Vec<Arc<dyn Policy>>,
    transport: Arc<dyn Transport>,
}

impl HttpPipelineBuilder {
    /// Append a stage. Callers keep their own `Arc` to read stage state later.
    pub fn policy<P: Policy + 'static>(mut self, policy: Arc<P>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn build(self) -> HttpPipeline {
        HttpPipeline {
            policies: self.policies,
            transport: self.transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};
    use reqwest::{StatusCode, Url};
    use std::sync::Mutex;

    /// Records the order stages are entered and left.
    #[derive(Debug)]
    struct Marker {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Policy for Marker {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn handle(&self, request: HttpRequest, next: Next<'_>) -> HttpResult {
            self.log.lock().unwrap().push(format!("in:{}", self.label));
            let request = request.with_header(
                HeaderName::from_static("x-stage"),
                HeaderValue::from_static(self.label),
            );
            let response = next.run(request).await;
            self.log.lock().unwrap().push(format!("out:{}", self.label));
            response
        }
    }

    #[derive(Debug)]
    struct ShortCircuit;

    #[async_trait]
    impl Policy for ShortCircuit {
        fn name(&self) -> &'static str {
            "short_circuit"
        }

        async fn handle(&self, _request: HttpRequest, _next: Next<'_>) -> HttpResult {
            Ok(HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE, "circuit open"))
        }
    }

    #[derive(Debug)]
    struct EchoStage {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for EchoStage {
        async fn send(&self, request: HttpRequest) -> HttpResult {
            self.log.lock().unwrap().push("transport".to_string());
            let stage = request
                .headers
                .get("x-stage")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            Ok(HttpResponse::new(StatusCode::OK, stage))
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::get(Url::parse("http://localhost/test").unwrap())
    }

    #[tokio::test]
    async fn test_stages_run_in_order_and_unwind_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = HttpPipeline::builder(Arc::new(EchoStage { log: log.clone() }))
            .policy(Arc::new(Marker { label: "first", log: log.clone() }))
            .policy(Arc::new(Marker { label: "second", log: log.clone() }))
            .build();

        let response = pipeline.dispatch(request()).await.unwrap();

        // The innermost stage wrote the header last.
        assert_eq!(response.text(), "second");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["in:first", "in:second", "transport", "out:second", "out:first"]
        );
        assert_eq!(pipeline.policy_names(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_policy_can_short_circuit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = HttpPipeline::builder(Arc::new(EchoStage { log: log.clone() }))
            .policy(Arc::new(ShortCircuit))
            .build();

        let response = pipeline.dispatch(request()).await.unwrap();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_chain_hits_transport() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = HttpPipeline::builder(Arc::new(EchoStage { log: log.clone() })).build();
        let response = pipeline.dispatch(request()).await.unwrap();
        assert!(response.is_success());
        assert_eq!(*log.lock().unwrap(), vec!["transport"]);
    }

    #[test]
    fn test_standard_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = HttpPipeline::standard(
            &BuildInfo::current(),
            &RetryConfig::default(),
            Duration::from_secs(10),
            Arc::new(EchoStage { log }),
        );
        assert_eq!(pipeline.policy_names(), vec!["user_agent", "retry", "tracing"]);
    }
}

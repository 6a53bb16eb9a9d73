//! Observability stage: one span per attempt, closed on every exit path.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::field::Empty;
use tracing::Instrument;

use super::pipeline::{HttpResult, Next, Policy};
use super::HttpRequest;

/// Counts of closed spans by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStats {
    pub ok: u64,
    pub error: u64,
}

/// Wraps each downstream call in an `http_request` span tagged with the
/// outcome. Only host and path are recorded: the query carries the token.
#[derive(Debug, Default)]
pub struct TracingPolicy {
    ok: AtomicU64,
    error: AtomicU64,
}

impl TracingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SpanStats {
        SpanStats {
            ok: self.ok.load(Ordering::Relaxed),
            error: self.error.load(Ordering::Relaxed),
        }
    }
}

/// Closes the span record on drop, so a cancelled attempt still counts.
struct SpanGuard<'a> {
    policy: &'a TracingPolicy,
    span: tracing::Span,
    started: Instant,
    closed: bool,
}

impl<'a> SpanGuard<'a> {
    fn new(policy: &'a TracingPolicy, span: tracing::Span) -> Self {
        Self {
            policy,
            span,
            started: Instant::now(),
            closed: false,
        }
    }

    fn close(&mut self, ok: bool, status: Option<u16>, detail: &str) {
        if self.closed {
            return;
        }
        self.closed = true;

        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let outcome = if ok { "ok" } else { "error" };
        self.span.record("outcome", outcome);
        self.span.record("elapsed_ms", elapsed_ms);
        if let Some(status) = status {
            self.span.record("status", status);
        }

        if ok {
            self.policy.ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.policy.error.fetch_add(1, Ordering::Relaxed);
        }

        self.span.in_scope(|| {
            tracing::debug!(outcome, status, elapsed_ms, detail, "http_request_closed");
        });
    }
}

impl Drop for SpanGuard<'_> {
    fn drop(&mut self) {
        self.close(false, None, "cancelled");
    }
}

#[async_trait]
impl Policy for TracingPolicy {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> HttpResult {
        let span = tracing::info_span!(
            "http_request",
            method = %request.method,
            host = request.url.host_str().unwrap_or(""),
            path = request.url.path(),
            status = Empty,
            outcome = Empty,
            elapsed_ms = Empty,
        );
        let mut guard = SpanGuard::new(self, span.clone());

        let result = next.run(request).instrument(span).await;

        match &result {
            Ok(response) => {
                let code = response.status.as_u16();
                guard.close(response.is_success(), Some(code), "");
            }
            Err(err) => guard.close(false, None, &err.to_string()),
        }
        result
    }
}

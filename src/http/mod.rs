//! Outbound request pipeline shared by every remote tool.
//!
//! A chain of responsibility: each [`Policy`] receives the request and a
//! [`Next`] continuation, and the chain ends in a [`Transport`].
//!
//! ```text
//!   dispatch ─▶ UserAgentPolicy ─▶ RetryPolicy ─▶ TracingPolicy ─▶ ReqwestTransport
//!                                      │  ▲                              │
//!                                      │  └────── attempt 1..=N ◀─────────┘
//!                                      └─ backoff + jitter between attempts
//! ```
//!
//! Non-2xx statuses come back as responses; only transport failures that
//! outlive the retry budget come back as [`HttpError`].

mod error;
mod identify;
mod message;
mod pipeline;
mod retry;
mod trace;
mod transport;

pub use error::HttpError;
pub use identify::UserAgentPolicy;
pub use message::{HttpRequest, HttpResponse};
pub use pipeline::{HttpPipeline, HttpPipelineBuilder, HttpResult, Next, Policy, Transport};
pub use retry::RetryPolicy;
pub use trace::{SpanStats, TracingPolicy};
pub use transport::ReqwestTransport;

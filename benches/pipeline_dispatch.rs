//! Hot-path overhead benchmark.
//!
//! Measures pipeline dispatch against an in-memory transport, tool input
//! validation, and resource store lookups using Criterion.

use async_trait::async_trait;
use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_mcp::http::{HttpPipeline, HttpRequest, HttpResponse, HttpResult, Transport};
use geo_mcp::resources::{ResourceData, ResourceStore};
use geo_mcp::schema::Schema;
use geo_mcp::types::{BuildInfo, RetryConfig};
use reqwest::{StatusCode, Url};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Answers every request with the same body; no I/O.
#[derive(Debug)]
struct FixedTransport {
    body: Bytes,
}

#[async_trait]
impl Transport for FixedTransport {
    async fn send(&self, _request: HttpRequest) -> HttpResult {
        Ok(HttpResponse::new(StatusCode::OK, self.body.clone()))
    }
}

fn bench_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let url = Url::parse("https://api.example.test/search/geocode/v6/forward?q=Berlin").unwrap();

    let mut group = c.benchmark_group("pipeline_dispatch");
    for &size in &[0usize, 1024, 65536] {
        let pipeline = HttpPipeline::standard(
            &BuildInfo::current(),
            &RetryConfig::default(),
            Duration::from_secs(10),
            Arc::new(FixedTransport {
                body: Bytes::from(vec![b'x'; size]),
            }),
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &pipeline, |b, p| {
            b.iter(|| {
                rt.block_on(async {
                    p.dispatch(HttpRequest::get(black_box(url.clone())))
                        .await
                        .unwrap()
                })
            });
        });
    }
    group.finish();
}

fn bench_input_validation(c: &mut Criterion) {
    let schema = Schema::compile(json!({
        "type": "object",
        "properties": {
            "q": {"type": "string", "minLength": 1, "maxLength": 256},
            "limit": {"type": "integer", "minimum": 1, "maximum": 10, "default": 5},
            "country": {"type": ["string", "null"]}
        },
        "required": ["q"]
    }))
    .unwrap();

    let valid = json!({"q": "Brandenburger Tor", "country": "de"});
    let invalid = json!({"q": "", "limit": 40});

    c.bench_function("schema_parse_valid", |b| {
        b.iter(|| schema.parse(black_box(&valid)).unwrap())
    });
    c.bench_function("schema_parse_invalid", |b| {
        b.iter(|| schema.parse(black_box(&invalid)).unwrap_err())
    });
}

fn bench_store_get(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let _guard = rt.enter();
    let store = ResourceStore::new(Duration::from_secs(600));
    for i in 0..1000 {
        store.create(
            format!("r{}", i),
            format!("geo-mcp://temp/r{}", i),
            ResourceData::Json(json!({"i": i})),
            None,
            None,
        );
    }

    c.bench_function("store_get_hit", |b| {
        b.iter(|| store.get(black_box("geo-mcp://temp/r500")).unwrap())
    });
    c.bench_function("store_get_miss", |b| {
        b.iter(|| store.get(black_box("geo-mcp://temp/none")))
    });
}

criterion_group!(benches, bench_dispatch, bench_input_validation, bench_store_get);
criterion_main!(benches);

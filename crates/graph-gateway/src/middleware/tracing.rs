//! Request tracing middleware.
//!
//! Wraps every HTTP request in a `graph_request` span. An incoming W3C
//! `traceparent` header is recorded on the span so gateway logs can be joined
//! with the caller's trace.

use axum::{body::Body, http::Request, response::Response};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{debug, info_span, Instrument, Span};

/// Tracing layer that creates spans for each request
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

/// Tracing service
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let parent = TraceParent::from_request(&req);

        let span = info_span!(
            "graph_request",
            http.method = %req.method(),
            http.target = %req.uri().path(),
            http.status_code = tracing::field::Empty,
            trace_id = tracing::field::Empty,
            parent_span_id = tracing::field::Empty,
            otel.kind = "server",
            otel.status_code = tracing::field::Empty,
        );

        if let Some(parent) = &parent {
            span.record("trace_id", parent.trace_id.as_str());
            span.record("parent_span_id", parent.parent_id.as_str());
        }

        Box::pin(
            async move {
                let started = Instant::now();
                let result = inner.call(req).await;
                let span = Span::current();

                match &result {
                    Ok(response) => {
                        let status = response.status();
                        span.record("http.status_code", status.as_u16());
                        // 101 Switching Protocols counts as success
                        let ok = !(status.is_client_error() || status.is_server_error());
                        span.record("otel.status_code", if ok { "OK" } else { "ERROR" });
                    }
                    Err(_) => {
                        span.record("otel.status_code", "ERROR");
                    }
                }

                debug!(latency_ms = started.elapsed().as_millis(), "Request finished");
                result
            }
            .instrument(span),
        )
    }
}

/// Parsed W3C `traceparent` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceParent {
    pub trace_id: String,
    pub parent_id: String,
}

impl TraceParent {
    /// Parse `version-trace_id-parent_id-flags`
    pub fn parse(header: &str) -> Option<Self> {
        let parts: Vec<&str> = header.trim().split('-').collect();
        if parts.len() != 4 {
            return None;
        }

        let is_hex = |s: &str, len: usize| {
            s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
        };
        if !is_hex(parts[0], 2) || !is_hex(parts[1], 32) || !is_hex(parts[2], 16) {
            return None;
        }

        Some(Self {
            trace_id: parts[1].to_string(),
            parent_id: parts[2].to_string(),
        })
    }

    fn from_request<B>(req: &Request<B>) -> Option<Self> {
        let header = req.headers().get("traceparent")?.to_str().ok()?;
        Self::parse(header)
    }
}

//! Telemetry utilities for tracking per-request metrics.
//!
//! This module provides a tracing Layer that counts row store calls per HTTP
//! request.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use tracing::{span::Id, Subscriber};
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

/// Name of the span `RecipeService` opens around every row store call.
pub const STORE_CALL_SPAN: &str = "store.call";

pub const STORE_CALL_COUNT_HEADER: &str = "x-store-call-count";

tokio::task_local! {
    /// Task-local counter for row store calls in the current request.
    /// This follows the async task across await points and thread migrations.
    static STORE_CALL_COUNTER: Arc<AtomicU32>;
}

/// Get the current store call count for this request, if available.
pub fn get_store_call_count() -> Option<u32> {
    STORE_CALL_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// A tracing Layer that counts `store.call` spans per HTTP request.
///
/// The spans are created on the request task before the call is handed to
/// the store, so the task-local counter set up by
/// [`store_call_counting_middleware`] is in scope even when the store itself
/// runs the query on a blocking thread.
pub struct StoreCallCountingLayer;

impl<S> Layer<S> for StoreCallCountingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        if span.name() == STORE_CALL_SPAN {
            let _ = STORE_CALL_COUNTER.try_with(|counter| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
}

/// Middleware that initializes the per-request store call counter.
///
/// This must be added to the router AFTER the TraceLayer (so it runs BEFORE
/// the trace span is created, wrapping the entire request lifecycle).
pub async fn store_call_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    STORE_CALL_COUNTER.scope(counter, next.run(request)).await
}

/// Whether `X-Store-Call-Count` should be attached to responses.
/// Enabled with `TRACK_STORE_CALL_COUNT=1`.
pub fn store_call_count_enabled() -> bool {
    std::env::var("TRACK_STORE_CALL_COUNT")
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Middleware that adds the X-Store-Call-Count header to responses.
pub async fn store_call_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(count) = get_store_call_count() {
        response
            .headers_mut()
            .insert(STORE_CALL_COUNT_HEADER, count.into());
    }

    response
}

//! Traced HTTP client used by every adapter.
//!
//! Wraps a `reqwest::Client`, opens an `outgoing_http` span per request and
//! injects a `traceparent` header.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use tracing::{Instrument, Level};

use crate::trace;

#[derive(Clone, Debug)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Client with a per-request timeout. A zero duration means no timeout.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?))
    }

    /// Execute a built request inside an `outgoing_http` span.
    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<Response> {
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        );

        trace::inject_trace_context(req.headers_mut());

        let response = self
            .inner
            .execute(req)
            .instrument(span.clone())
            .await?;

        span.record("http.status_code", response.status().as_u16());
        tracing::debug!(parent: &span, status = %response.status(), "response received");

        Ok(response)
    }

    /// Build and execute a request prepared with [`TracedClient::request`].
    pub async fn send(&self, builder: RequestBuilder) -> reqwest::Result<Response> {
        let req = builder.build()?;
        self.execute(req).await
    }

    /// Start a request builder; finish it with [`TracedClient::send`].
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.inner.request(method, url)
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        self.send(self.inner.get(url)).await
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

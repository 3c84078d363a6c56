//! HTTP transport used by [`crate::ApiClient`].
//!
//! [`Transport`] is the seam between the session logic and the network. The
//! production implementation, [`ReqwestTransport`], always sends credentials: a cookie
//! store on native targets, `credentials: "include"` on the browser's fetch.

use std::future::Future;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// An outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }
}

/// A response with its body already read.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Async interface for sending HTTP requests.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { client })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
        })
    }

    /// Use an existing client. Credential handling is the caller's responsibility.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to a default HTTP client");
            Self::with_client(reqwest::Client::new())
        })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method, &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        #[cfg(target_arch = "wasm32")]
        {
            builder = builder.fetch_credentials_include();
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::sync::Notify;

    use super::*;
    use crate::error::ApiError;

    enum Scripted {
        Respond(HttpResponse),
        Fail(String),
    }

    /// Scripted transport: fixed answers per URL, a request log, and an optional gate
    /// that holds every response until released.
    #[derive(Clone, Default)]
    pub(crate) struct MockTransport {
        routes: Arc<Mutex<HashMap<String, Scripted>>>,
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        gate: Arc<Mutex<Option<Arc<Notify>>>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(&self, url: &str, status: u16, body: &str) -> &Self {
            self.routes
                .lock()
                .insert(url.to_string(), Scripted::Respond(HttpResponse::new(status, body)));
            self
        }

        pub(crate) fn fail(&self, url: &str, message: &str) -> &Self {
            self.routes
                .lock()
                .insert(url.to_string(), Scripted::Fail(message.to_string()));
            self
        }

        /// Hold responses until the returned handle is notified.
        pub(crate) fn hold(&self) -> Arc<Notify> {
            let notify = Arc::new(Notify::new());
            *self.gate.lock() = Some(Arc::clone(&notify));
            notify
        }

        /// Let held responses through and stop holding new ones.
        pub(crate) fn release(&self) {
            if let Some(gate) = self.gate.lock().take() {
                gate.notify_waiters();
            }
        }

        pub(crate) fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().clone()
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl Transport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().push(request.clone());
            let gate = self.gate.lock().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            match self.routes.lock().get(&request.url) {
                Some(Scripted::Respond(response)) => Ok(response.clone()),
                Some(Scripted::Fail(message)) => Err(ApiError::Transport(message.clone())),
                None => Ok(HttpResponse::new(404, "Not Found")),
            }
        }
    }
}

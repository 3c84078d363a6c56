//! # API client: the query cache adapter
//!
//! [`ApiClient`] is the one object every consumer shares. It owns the
//! [`SessionResolver`], the [`Transport`], and two [`QueryCache`]s (identity and
//! generic queries), and branches every call on the session mode.
//!
//! ## Demo branch
//!
//! When the resolver reports demo mode nothing is sent: mutations return
//! [`demo::mutation_response`], reads return [`demo::response_for`] the URL, and the
//! identity is the demo sentinel.
//!
//! ## Live branch
//!
//! Requests go through the transport with credentials. Non-2xx answers become
//! [`ApiError::Status`] carrying the status and body text (or the reason phrase when
//! the body is empty). Reads honour the configured retry count; mutations never retry.
//!
//! ## Identity resolution is total
//!
//! [`ApiClient::resolve_identity`] always returns a [`UserIdentity`]. `401` means "no
//! user" and yields the public sentinel; any other failure is logged, recorded on the
//! cache entry, and also yields the public sentinel. The UI never sees an auth error.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use store::{ClientConfig, IdentityStrategy};

use crate::cache::{Fetch, QueryCache};
use crate::clock::{Clock, SystemClock};
use crate::demo;
use crate::environment::Environment;
use crate::error::{ApiError, Result};
use crate::models::{demo_user, public_user, MeResponse, UserIdentity};
use crate::session::SessionResolver;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// What a read does with a `401`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnauthorizedBehavior {
    /// Resolve to `null`.
    #[default]
    ReturnNull,
    /// Fail with [`ApiError::Status`].
    Throw,
}

/// Turn a non-2xx response into an error carrying status and body.
fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let body = if response.body.trim().is_empty() {
        StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default()
            .to_string()
    } else {
        response.body
    };
    Err(ApiError::Status {
        status: response.status,
        body,
    })
}

/// Shared client: session branching, HTTP calls, and query caching.
pub struct ApiClient<T> {
    config: ClientConfig,
    transport: T,
    resolver: SessionResolver,
    clock: Arc<dyn Clock>,
    identity: QueryCache<UserIdentity>,
    queries: QueryCache<Value>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: ClientConfig, transport: T, env: Arc<dyn Environment>) -> Self {
        let resolver = SessionResolver::new(env, config.demo.clone());
        Self {
            config,
            transport,
            resolver,
            clock: Arc::new(SystemClock),
            identity: QueryCache::new(),
            queries: QueryCache::new(),
        }
    }

    /// Builder method to replace the clock used for staleness.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    pub fn identity_cache(&self) -> &QueryCache<UserIdentity> {
        &self.identity
    }

    pub fn query_cache(&self) -> &QueryCache<Value> {
        &self.queries
    }

    pub fn is_demo(&self) -> bool {
        self.resolver.is_demo()
    }

    pub fn login_url(&self) -> String {
        self.config.api.url(&self.config.api.login_path)
    }

    pub fn logout_url(&self) -> String {
        self.config.api.url(&self.config.api.logout_path)
    }

    fn identity_key(&self) -> &str {
        &self.config.api.identity_path
    }

    fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Send a mutation (or any one-off request).
    ///
    /// In demo mode this returns a synthesized success without touching the network.
    pub async fn api_request(&self, method: Method, url: &str, body: Option<Value>) -> Result<Value> {
        if self.is_demo() {
            tracing::debug!(%method, url, "demo mode, request not sent");
            return Ok(demo::mutation_response());
        }

        let is_read = method == Method::GET || method == Method::HEAD;
        let request = HttpRequest {
            method,
            url: self.config.api.url(url),
            body,
        };
        let response = ensure_success(self.transport.send(request).await?)?;
        let value: Value = response.json()?;

        if !is_read {
            let path = url.split('?').next().unwrap_or(url);
            self.queries.invalidate_path(path);
            if path.starts_with("/api/auth") {
                self.identity.invalidate(self.identity_key());
            }
        }
        Ok(value)
    }

    /// Read `url` through the query cache.
    pub async fn get_query(&self, url: &str, on_unauthorized: UnauthorizedBehavior) -> Result<Value> {
        if self.is_demo() {
            tracing::debug!(url, "demo mode, serving canned data");
            return Ok(demo::response_for(url));
        }

        let stale_time = self.config.cache.stale_time();
        let lease = loop {
            if let Some(value) = self.queries.get_fresh(url, self.now(), stale_time) {
                tracing::debug!(url, "query cache hit");
                return Ok(value);
            }
            match self.queries.begin_or_join(url) {
                Fetch::Lead(lease) => break lease,
                // A failed shared fetch leaves nothing fresh, so the next pass leads
                Fetch::Join(waiter) => waiter.wait().await,
            }
        };

        let response = match self.send_query(HttpRequest::get(self.config.api.url(url))).await {
            Ok(response) => response,
            Err(e) => {
                lease.fail(e.to_string());
                return Err(e);
            }
        };

        let decoded = if response.status == 401 && on_unauthorized == UnauthorizedBehavior::ReturnNull {
            Ok(Value::Null)
        } else {
            ensure_success(response).and_then(|r| r.json::<Value>())
        };

        match decoded {
            Ok(value) => {
                if !lease.complete(value.clone(), None, self.now()) {
                    tracing::debug!(url, "discarding superseded query result");
                }
                Ok(value)
            }
            Err(e) => {
                lease.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Resolve the current identity. Never fails; see the module docs.
    pub async fn resolve_identity(&self) -> UserIdentity {
        let key = self.identity_key();

        if self.is_demo() {
            let user = demo_user();
            if self.identity.peek(key).as_ref() != Some(&user) {
                self.identity.set_query_data(key, user.clone(), self.now());
            }
            return user;
        }

        let stale_time = self.config.cache.stale_time();
        let lease = loop {
            if let Some(user) = self.identity.get_fresh(key, self.now(), stale_time) {
                if !user.is_demo_sentinel() {
                    tracing::debug!(user = %user.id, "identity cache hit");
                    return user;
                }
            }
            match self.identity.begin_or_join(key) {
                Fetch::Lead(lease) => break lease,
                Fetch::Join(waiter) => {
                    tracing::debug!("joining in-flight identity fetch");
                    waiter.wait().await;
                }
            }
        };

        let (user, error) = match self.fetch_identity().await {
            Ok(user) => (user, None),
            Err(e) => {
                tracing::warn!(error = %e, "identity resolution failed, using public user");
                (public_user(), Some(e.to_string()))
            }
        };

        if lease.complete(user.clone(), error, self.now()) {
            user
        } else {
            tracing::debug!("discarding superseded identity fetch");
            self.identity.peek(key).unwrap_or(user)
        }
    }

    /// Drop the cached identity and resolve it again.
    pub async fn refresh_identity(&self) -> UserIdentity {
        self.invalidate_identity();
        self.resolve_identity().await
    }

    /// The last resolved identity, fresh or not.
    pub fn cached_identity(&self) -> Option<UserIdentity> {
        self.identity.peek(self.identity_key())
    }

    /// Overwrite the cached identity. In-flight resolutions are discarded.
    pub fn set_identity(&self, user: UserIdentity) {
        self.identity.set_query_data(self.identity_key(), user, self.now());
    }

    pub fn invalidate_identity(&self) {
        self.identity.invalidate(self.identity_key());
    }

    pub fn is_resolving_identity(&self) -> bool {
        self.identity.is_fetching(self.identity_key())
    }

    /// Error recorded by the last identity fetch, if it degraded.
    pub fn identity_error(&self) -> Option<String> {
        self.identity.error(self.identity_key())
    }

    async fn fetch_identity(&self) -> Result<UserIdentity> {
        match self.config.session.strategy {
            IdentityStrategy::Direct => self.fetch_profile().await,
            IdentityStrategy::TwoStep => {
                let request = HttpRequest::get(self.config.api.url(&self.config.api.me_path));
                let me: MeResponse = ensure_success(self.send_query(request).await?)?.json()?;
                if me.is_public {
                    return Ok(me.into_public_identity());
                }
                self.fetch_profile().await
            }
        }
    }

    /// GET the identity endpoint. `401` is the public sentinel, not an error.
    async fn fetch_profile(&self) -> Result<UserIdentity> {
        let request = HttpRequest::get(self.config.api.url(&self.config.api.identity_path));
        let response = self.send_query(request).await?;
        if response.status == 401 {
            tracing::debug!("no server session");
            return Ok(public_user());
        }
        let user: Option<UserIdentity> = ensure_success(response)?.json()?;
        Ok(match user {
            Some(mut user) => {
                user.is_public = false;
                user
            }
            None => public_user(),
        })
    }

    /// Send a read, retrying failures up to the configured count.
    async fn send_query(&self, request: HttpRequest) -> Result<HttpResponse> {
        let attempts = self.config.cache.retry.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.send(request.clone()).await {
                Ok(response)
                    if response.is_success() || response.status == 401 || attempt >= attempts =>
                {
                    return Ok(response)
                }
                Ok(response) => {
                    tracing::debug!(url = %request.url, status = response.status, attempt, "retrying query")
                }
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => tracing::debug!(url = %request.url, error = %e, attempt, "retrying query"),
            }
        }
    }
}

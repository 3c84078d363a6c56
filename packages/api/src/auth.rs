//! # Auth state: what the UI reads about the current session
//!
//! [`AuthController`] turns the [`ApiClient`]'s cached identity and the
//! [`SessionResolver`](crate::SessionResolver)'s demo flag into an [`AuthState`]
//! snapshot, and owns the session-changing operations (`login`, `logout`,
//! `activate_demo`). The Dioxus hook in the `ui` crate is a thin signal wrapper
//! around it.
//!
//! ## Flags
//!
//! | Flag | True when |
//! |------|-----------|
//! | `is_loading` | no identity has been resolved yet (never in demo mode) |
//! | `is_demo` | the demo query parameter or persisted flag is present |
//! | `is_authenticated` | a real account is resolved and demo mode is off |
//! | `is_public` | demo mode is off and no real account is resolved |
//! | `is_logging_out` | a logout was issued and the page is navigating away |
//!
//! ## Logout
//!
//! Demo mode clears the persisted flag and goes to `/`; no request is made. Otherwise
//! the browser goes to the server's logout endpoint. Either way the cached identity is
//! overwritten with the public sentinel before `logout` returns, so every reader sees
//! the logged-out state without waiting for a round trip.
//!
//! Once issued, a logout stays in flight while the page navigates away: `is_logging_out`
//! remains set and further `logout` calls do nothing. Only `login` or `activate_demo`
//! start a new session and clear it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::ApiClient;
use crate::models::{demo_user, public_user, UserIdentity};
use crate::session::SessionMode;
use crate::transport::Transport;

/// Snapshot of the session as the UI sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserIdentity>,
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub is_public: bool,
    pub is_demo: bool,
    pub is_logging_out: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
            is_authenticated: false,
            is_public: true,
            is_demo: false,
            is_logging_out: false,
        }
    }
}

impl AuthState {
    pub fn mode(&self) -> SessionMode {
        if self.is_demo {
            SessionMode::Demo
        } else if self.is_authenticated {
            SessionMode::Authenticated
        } else {
            SessionMode::Public
        }
    }
}

/// Result of [`AuthController::logout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The session was cleared and the browser sent to `redirect`.
    Completed { redirect: String },
    /// A logout was already issued; nothing was done.
    AlreadyInProgress,
}

/// Session state and session-changing operations over a shared [`ApiClient`].
pub struct AuthController<T> {
    client: Arc<ApiClient<T>>,
    logging_out: Arc<AtomicBool>,
}

impl<T> Clone for AuthController<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            logging_out: Arc::clone(&self.logging_out),
        }
    }
}

impl<T: Transport> AuthController<T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self {
            client,
            logging_out: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn client(&self) -> &Arc<ApiClient<T>> {
        &self.client
    }

    pub fn is_logging_out(&self) -> bool {
        self.logging_out.load(Ordering::SeqCst)
    }

    /// Current state from the cache, without any network call.
    pub fn state(&self) -> AuthState {
        let is_demo = self.client.is_demo();
        let cached = self.client.cached_identity();
        let user = if is_demo {
            Some(cached.filter(UserIdentity::is_demo_sentinel).unwrap_or_else(demo_user))
        } else {
            cached.filter(|user| !user.is_demo_sentinel())
        };

        let is_real = user.as_ref().is_some_and(UserIdentity::is_real);
        AuthState {
            is_loading: user.is_none(),
            is_authenticated: !is_demo && is_real,
            is_public: !is_demo && !is_real,
            is_demo,
            is_logging_out: self.is_logging_out(),
            user,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.client
            .resolver()
            .resolve_mode(self.client.cached_identity().as_ref())
    }

    /// Resolve the identity (cache first) and return the resulting state.
    pub async fn load(&self) -> AuthState {
        self.client.resolve_identity().await;
        self.state()
    }

    /// Force a fresh identity resolution.
    pub async fn refresh(&self) -> AuthState {
        self.client.refresh_identity().await;
        self.state()
    }

    /// Send the browser to the login endpoint.
    pub fn login(&self) {
        self.logging_out.store(false, Ordering::SeqCst);
        let url = self.client.login_url();
        tracing::info!(%url, "redirecting to login");
        self.client.resolver().environment().navigate_to(&url);
    }

    /// Turn demo mode on and show the demo identity immediately.
    pub fn activate_demo(&self) -> AuthState {
        self.logging_out.store(false, Ordering::SeqCst);
        self.client.resolver().activate_demo();
        self.client.set_identity(demo_user());
        self.state()
    }

    /// Window regained focus. Marks the identity stale only when configured to
    /// refetch on focus; returns whether it did.
    pub fn on_window_focus(&self) -> bool {
        if !self.client.config().cache.refetch_on_window_focus {
            return false;
        }
        self.client.invalidate_identity();
        true
    }

    /// End the session. See the module docs.
    pub fn logout(&self) -> LogoutOutcome {
        if self.logging_out.swap(true, Ordering::SeqCst) {
            tracing::debug!("logout already in progress");
            return LogoutOutcome::AlreadyInProgress;
        }

        let resolver = self.client.resolver();
        let redirect = if resolver.is_demo() {
            resolver.clear_demo();
            "/".to_string()
        } else {
            self.client.logout_url()
        };

        resolver.environment().navigate_to(&redirect);
        self.client.set_identity(public_user());
        tracing::info!(%redirect, "logged out");

        LogoutOutcome::Completed { redirect }
    }
}

#[cfg(test)]
mod tests {
    use store::ClientConfig;

    use super::*;
    use crate::environment::{Environment, MemoryEnvironment};
    use crate::transport::mock::MockTransport;

    const USER_JSON: &str = r#"{"id":"u1","email":"a@b.com","firstName":"Ada","createdAt":"2024-01-01T00:00:00Z"}"#;

    fn controller(url: &str, transport: &MockTransport) -> (AuthController<MockTransport>, MemoryEnvironment) {
        controller_with(ClientConfig::default(), url, transport)
    }

    fn controller_with(
        config: ClientConfig,
        url: &str,
        transport: &MockTransport,
    ) -> (AuthController<MockTransport>, MemoryEnvironment) {
        let env = MemoryEnvironment::at(url);
        let client = ApiClient::new(config, transport.clone(), Arc::new(env.clone()));
        (AuthController::new(Arc::new(client)), env)
    }

    #[tokio::test]
    async fn test_loading_before_first_resolution() {
        let transport = MockTransport::new();
        let (auth, _) = controller("/", &transport);

        let state = auth.state();
        assert!(state.is_loading);
        assert!(state.user.is_none());
        assert!(!state.is_authenticated);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_authenticated_scenario() {
        let transport = MockTransport::new();
        transport.respond("/api/auth/user", 200, USER_JSON);
        let (auth, _) = controller("/", &transport);

        let state = auth.load().await;

        assert!(state.is_authenticated);
        assert!(!state.is_public);
        assert!(!state.is_demo);
        assert!(!state.is_loading);
        assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
        assert_eq!(state.mode(), SessionMode::Authenticated);
        assert_eq!(auth.mode(), SessionMode::Authenticated);
    }

    #[tokio::test]
    async fn test_unauthorized_scenario() {
        let transport = MockTransport::new();
        transport.respond("/api/auth/user", 401, "Unauthorized");
        let (auth, _) = controller("/", &transport);

        let state = auth.load().await;

        assert!(!state.is_authenticated);
        assert!(state.is_public);
        assert!(state.user.unwrap().is_public_sentinel());
    }

    #[tokio::test]
    async fn test_server_error_does_not_leave_loading() {
        let transport = MockTransport::new();
        transport.respond("/api/auth/user", 500, "oops");
        let (auth, _) = controller("/", &transport);

        let state = auth.load().await;

        assert!(!state.is_loading);
        assert!(state.is_public);
        assert!(state.user.unwrap().is_public_sentinel());
    }

    #[tokio::test]
    async fn test_demo_scenario() {
        let transport = MockTransport::new();
        let (auth, env) = controller("/?demo=true", &transport);

        let state = auth.load().await;
        assert!(state.is_demo);
        assert!(!state.is_authenticated);
        assert!(!state.is_public);
        assert!(state.user.unwrap().is_demo_sentinel());

        // Sticky after the parameter disappears
        env.set_location("/logs");
        assert!(auth.state().is_demo);

        let logs = auth
            .client()
            .get_query("/api/logs", crate::UnauthorizedBehavior::Throw)
            .await
            .unwrap();
        assert!(logs.as_array().is_some_and(|l| !l.is_empty()));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_demo_state_without_load() {
        let transport = MockTransport::new();
        let (auth, _) = controller("/?demo=true", &transport);

        let state = auth.state();
        assert!(!state.is_loading);
        assert!(state.is_demo);
    }

    #[tokio::test]
    async fn test_demo_logout() {
        let transport = MockTransport::new();
        let (auth, env) = controller("/dashboard?demo=true", &transport);
        auth.load().await;

        let outcome = auth.logout();

        assert_eq!(
            outcome,
            LogoutOutcome::Completed {
                redirect: "/".to_string()
            }
        );
        assert_eq!(env.stored_flag("bruceops-demo-mode"), None);
        assert_eq!(env.navigations(), vec!["/".to_string()]);
        assert_eq!(transport.request_count(), 0);

        let state = auth.state();
        assert!(!state.is_demo);
        assert!(state.is_public);
        assert!(!state.is_authenticated);
        assert!(state.is_logging_out);
    }

    #[tokio::test]
    async fn test_live_logout() {
        let transport = MockTransport::new();
        transport.respond("/api/auth/user", 200, USER_JSON);
        let (auth, env) = controller("/", &transport);
        assert!(auth.load().await.is_authenticated);

        let outcome = auth.logout();

        assert_eq!(
            outcome,
            LogoutOutcome::Completed {
                redirect: "/api/logout".to_string()
            }
        );
        assert_eq!(env.navigations(), vec!["/api/logout".to_string()]);
        // Navigated to, never fetched
        assert_eq!(transport.request_count(), 1);

        let state = auth.state();
        assert!(!state.is_authenticated);
        assert!(state.is_public);
        assert!(state.user.unwrap().is_public_sentinel());
    }

    #[tokio::test]
    async fn test_logout_from_public() {
        let transport = MockTransport::new();
        transport.respond("/api/auth/user", 401, "");
        let (auth, _) = controller("/", &transport);
        auth.load().await;

        auth.logout();

        let state = auth.state();
        assert!(!state.is_authenticated);
        assert!(state.is_public);
    }

    #[tokio::test]
    async fn test_logout_beats_in_flight_resolution() {
        let transport = MockTransport::new();
        transport.respond("/api/auth/user", 200, USER_JSON);
        let gate = transport.hold();
        let (auth, _) = controller("/", &transport);

        let (state, _) = tokio::join!(auth.load(), async {
            let outcome = auth.logout();
            gate.notify_one();
            outcome
        });

        assert!(!state.is_authenticated);
        assert!(state.is_public);
        assert!(!auth.state().is_authenticated);
    }

    #[tokio::test]
    async fn test_repeated_logout_navigates_once() {
        let transport = MockTransport::new();
        let (auth, env) = controller("/", &transport);
        let other = auth.clone();

        assert!(matches!(auth.logout(), LogoutOutcome::Completed { .. }));
        assert!(auth.state().is_logging_out);
        assert_eq!(other.logout(), LogoutOutcome::AlreadyInProgress);
        assert_eq!(auth.logout(), LogoutOutcome::AlreadyInProgress);
        assert_eq!(env.navigations(), vec!["/api/logout".to_string()]);
    }

    #[tokio::test]
    async fn test_new_session_clears_logging_out() {
        let transport = MockTransport::new();
        let (auth, env) = controller("/", &transport);

        auth.logout();
        auth.login();
        assert!(!auth.is_logging_out());

        assert!(matches!(auth.logout(), LogoutOutcome::Completed { .. }));
        auth.activate_demo();
        assert!(!auth.state().is_logging_out);
        assert_eq!(env.navigations().len(), 3);
    }

    #[tokio::test]
    async fn test_login_navigates() {
        let transport = MockTransport::new();
        let (auth, env) = controller("/", &transport);

        auth.login();

        assert_eq!(env.navigations(), vec!["/api/login".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_demo() {
        let transport = MockTransport::new();
        let (auth, env) = controller("/", &transport);

        let state = auth.activate_demo();

        assert!(state.is_demo);
        assert!(state.user.unwrap().is_demo_sentinel());
        assert_eq!(env.stored_flag("bruceops-demo-mode").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_window_focus_policy() {
        let transport = MockTransport::new();
        transport.respond("/api/auth/user", 200, USER_JSON);
        let (auth, _) = controller("/", &transport);
        auth.load().await;

        assert!(!auth.on_window_focus());
        auth.load().await;
        assert_eq!(transport.request_count(), 1);

        let mut config = ClientConfig::default();
        config.cache.refetch_on_window_focus = true;
        let (auth, _) = controller_with(config, "/", &transport);
        auth.load().await;
        assert!(auth.on_window_focus());
        auth.load().await;
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_refresh_after_login_elsewhere() {
        let transport = MockTransport::new();
        transport.respond("/api/auth/user", 401, "");
        let (auth, _) = controller("/", &transport);
        assert!(auth.load().await.is_public);

        transport.respond("/api/auth/user", 200, USER_JSON);
        // Cached public answer is still fresh
        assert!(auth.load().await.is_public);
        assert!(auth.refresh().await.is_authenticated);
    }
}

//! Authentication context and hooks for the UI.

use api::{AuthController, AuthState, LogoutOutcome, ReqwestTransport, UserIdentity};
use dioxus::prelude::*;
use std::sync::Arc;
use store::ClientConfig;

use crate::environment::{make_environment, prepare_config};

/// Controller type shared through the context.
pub type Controller = AuthController<ReqwestTransport>;

/// How often the provider re-reads the identity. Only stale entries hit the network.
const RECHECK_INTERVAL_SECS: u64 = 30;

/// Context installed by [`AuthProvider`].
#[derive(Clone)]
struct AuthContext {
    controller: Controller,
    state: Signal<AuthState>,
}

/// Handle returned by [`use_auth_state`].
///
/// Getters read the underlying signal, so components re-render when the session changes.
#[derive(Clone)]
pub struct UseAuthState {
    controller: Controller,
    state: Signal<AuthState>,
}

impl UseAuthState {
    pub fn state(&self) -> AuthState {
        (self.state)()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.state.read().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    pub fn is_public(&self) -> bool {
        self.state.read().is_public
    }

    pub fn is_demo(&self) -> bool {
        self.state.read().is_demo
    }

    pub fn is_logging_out(&self) -> bool {
        self.state.read().is_logging_out
    }

    /// Shared controller, for API calls that should follow the session mode.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// End the session. The signal flips to the logged-out state before navigation
    /// completes and keeps `is_logging_out` set while the page leaves.
    pub fn logout(&self) {
        let mut state = self.state;
        if state.peek().is_logging_out {
            return;
        }
        match self.controller.logout() {
            LogoutOutcome::Completed { redirect } => {
                tracing::debug!("logout redirecting to {}", redirect);
            }
            LogoutOutcome::AlreadyInProgress => {}
        }
        state.set(self.controller.state());
    }

    pub fn login(&self) {
        self.controller.login();
    }

    pub fn activate_demo(&self) {
        let mut state = self.state;
        state.set(self.controller.activate_demo());
    }

    /// Re-resolve the identity from the server.
    pub fn refresh(&self) {
        let controller = self.controller.clone();
        let mut state = self.state;
        spawn(async move {
            state.set(controller.refresh().await);
        });
    }
}

/// Get the current authentication state.
/// Must be called below an [`AuthProvider`].
pub fn use_auth_state() -> UseAuthState {
    let context = use_context::<AuthContext>();
    UseAuthState {
        controller: context.controller,
        state: context.state,
    }
}

fn make_controller(config: Option<ClientConfig>) -> Controller {
    let config = prepare_config(config.unwrap_or_default());
    let client = api::ApiClient::new(config, ReqwestTransport::default(), make_environment());
    AuthController::new(Arc::new(client))
}

/// Provider component that manages authentication state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(config: Option<ClientConfig>, children: Element) -> Element {
    let controller = use_hook(move || make_controller(config));
    let mut auth_state = use_signal(|| controller.state());

    // Resolve the current user on mount
    let load_controller = controller.clone();
    let _ = use_resource(move || {
        let controller = load_controller.clone();
        async move {
            auth_state.set(controller.load().await);
        }
    });

    // Periodic re-read; the cache decides whether anything is fetched
    let recheck_controller = controller.clone();
    use_effect(move || {
        let controller = recheck_controller.clone();
        spawn(async move {
            loop {
                #[cfg(target_arch = "wasm32")]
                gloo_timers::future::sleep(std::time::Duration::from_secs(RECHECK_INTERVAL_SECS)).await;
                #[cfg(not(target_arch = "wasm32"))]
                tokio::time::sleep(std::time::Duration::from_secs(RECHECK_INTERVAL_SECS)).await;

                // Leave the state alone while a logout is redirecting
                if auth_state.peek().is_logging_out {
                    continue;
                }
                let next = controller.load().await;
                if *auth_state.peek() != next {
                    auth_state.set(next);
                }
            }
        });
    });

    use_context_provider(|| AuthContext {
        controller: controller.clone(),
        state: auth_state,
    });

    rsx! {
        {children}
    }
}

/// Button that sends the browser to the login endpoint.
#[component]
pub fn LoginButton(
    #[props(default = "Sign in".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let auth = use_auth_state();
    let loading = auth.is_loading();

    rsx! {
        button {
            class: "{class}",
            disabled: loading,
            onclick: move |_| auth.login(),
            "{label}"
        }
    }
}

/// Button that switches the session into demo mode.
#[component]
pub fn DemoButton(
    #[props(default = "Try the demo".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let auth = use_auth_state();
    let is_demo = auth.is_demo();

    rsx! {
        button {
            class: "{class}",
            disabled: is_demo,
            onclick: move |_| auth.activate_demo(),
            "{label}"
        }
    }
}

/// Button to log out the current user.
/// Disabled while a logout is in flight.
#[component]
pub fn LogoutButton(
    #[props(default = "Log out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let auth = use_auth_state();
    let logging_out = auth.is_logging_out();

    rsx! {
        button {
            class: "{class}",
            disabled: logging_out,
            onclick: move |_| auth.logout(),
            if logging_out {
                "Logging out..."
            } else {
                "{label}"
            }
        }
    }
}

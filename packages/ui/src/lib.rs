//! This crate contains the shared session UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub mod environment;
pub use environment::{make_environment, prepare_config};
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use environment::BrowserEnvironment;

mod auth;
pub use auth::{
    use_auth_state, AuthProvider, Controller, DemoButton, LoginButton, LogoutButton, UseAuthState,
};

mod mode_indicator;
pub use mode_indicator::ModeIndicator;

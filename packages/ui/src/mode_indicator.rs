//! Session mode indicator for page headers.

use api::SessionMode;
use dioxus::prelude::*;

use crate::auth::use_auth_state;
use crate::Icon;
use crate::icons::{FaFlask, FaUserCheck, FaUserSlash};

/// A small icon that shows which session mode the client is in.
///
/// - **Authenticated**: green user-check icon with the user's display name
/// - **Demo**: amber flask icon ("Demo mode: changes are not saved")
/// - **Public**: gray slashed-user icon ("Browsing as guest")
#[component]
pub fn ModeIndicator() -> Element {
    let auth = use_auth_state();
    let state = auth.state();

    if state.is_loading {
        return rsx! {};
    }

    match state.mode() {
        SessionMode::Authenticated => {
            let name = state
                .user
                .as_ref()
                .map(|user| user.display_name())
                .unwrap_or_default();
            rsx! {
                span {
                    class: "mode-indicator mode-indicator--authenticated",
                    title: "Signed in as {name}",
                    Icon { icon: FaUserCheck, width: 14, height: 14 }
                }
            }
        }
        SessionMode::Demo => rsx! {
            span {
                class: "mode-indicator mode-indicator--demo",
                title: "Demo mode: changes are not saved",
                Icon { icon: FaFlask, width: 14, height: 14 }
            }
        },
        SessionMode::Public => rsx! {
            span {
                class: "mode-indicator mode-indicator--public",
                title: "Browsing as guest",
                Icon { icon: FaUserSlash, width: 14, height: 14 }
            }
        },
    }
}

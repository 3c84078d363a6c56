use dioxus::prelude::*;

use store::ClientConfig;
use ui::AuthProvider;
use views::Home;

mod views;

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::LaunchBuilder::new()
        .with_context(client_config())
        .launch(App);
}

/// Defaults in the browser; `bruceops.toml` and `BRUCEOPS_*` variables elsewhere.
fn client_config() -> ClientConfig {
    #[cfg(target_arch = "wasm32")]
    {
        ClientConfig::default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        ClientConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load {}: {}", ClientConfig::filename(), e);
            ClientConfig::default()
        })
    }
}

#[component]
fn App() -> Element {
    let config = use_context::<ClientConfig>();

    rsx! {
        // Global app resources
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AuthProvider {
            config: config,
            Home {}
        }
    }
}

//! Landing view: who is signed in, the session controls, and recent journal entries.

use api::UnauthorizedBehavior;
use dioxus::prelude::*;
use serde_json::Value;
use ui::{use_auth_state, DemoButton, LoginButton, LogoutButton, ModeIndicator};

/// `(date, top win)` pairs from a `/api/logs` answer.
fn log_rows(logs: &Value) -> Vec<(String, String)> {
    logs.as_array()
        .map(|entries| {
            entries
                .iter()
                .map(|entry| {
                    (
                        entry["date"].as_str().unwrap_or_default().to_string(),
                        entry["topWin"].as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[component]
pub fn Home() -> Element {
    let auth = use_auth_state();
    let state = auth.state();

    let logs_auth = auth.clone();
    let logs = use_resource(move || {
        let auth = logs_auth.clone();
        // Re-run when the session mode changes
        let _mode = auth.state().mode();
        async move {
            auth.controller()
                .client()
                .get_query("/api/logs", UnauthorizedBehavior::ReturnNull)
                .await
        }
    });

    let greeting = match &state.user {
        Some(user) if !state.is_public => format!("Welcome back, {}", user.display_name()),
        _ => "Welcome to Harris Wildlands".to_string(),
    };

    let rows = match &*logs.read() {
        Some(Ok(value)) => Ok(log_rows(value)),
        Some(Err(e)) => {
            tracing::error!("Failed to load logs: {}", e);
            Err(e.to_string())
        }
        None => Ok(Vec::new()),
    };

    rsx! {
        div {
            class: "home",
            header {
                class: "home-header",
                h1 { "BruceOps" }
                ModeIndicator {}
            }

            if state.is_loading {
                p { class: "home-status", "Checking your session..." }
            } else {
                p { class: "home-greeting", "{greeting}" }

                div {
                    class: "home-actions",
                    if state.is_public {
                        LoginButton { class: "btn btn-primary" }
                        DemoButton { class: "btn" }
                    } else {
                        LogoutButton { class: "btn" }
                    }
                }
            }

            section {
                class: "home-logs",
                h2 { "Recent LifeOps entries" }
                {match rows {
                    Ok(rows) if rows.is_empty() => rsx! {
                        p { class: "home-empty", "No entries yet." }
                    },
                    Ok(rows) => rsx! {
                        ul {
                            for (date, win) in rows {
                                li { key: "{date}", "{date}: {win}" }
                            }
                        }
                    },
                    Err(message) => rsx! {
                        p { class: "home-error", "Could not load entries ({message})" }
                    },
                }}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_rows_from_demo_data() {
        let rows = log_rows(&api::demo::response_for("/api/logs"));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].0, "2024-06-03");
        assert!(!rows[0].1.is_empty());
    }

    #[test]
    fn test_log_rows_from_null() {
        assert!(log_rows(&Value::Null).is_empty());
    }
}

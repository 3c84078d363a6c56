//! # Session resolver: public, demo, or signed in
//!
//! [`SessionResolver`] classifies the current client into one [`SessionMode`].
//!
//! ## Demo detection
//!
//! Demo mode is purely local. The resolver checks, in order:
//!
//! 1. the demo query parameter (`?demo=true` by default);
//! 2. the persisted demo flag.
//!
//! Seeing an activating query parameter persists the flag, so demo mode survives
//! navigations that drop the parameter until [`SessionResolver::clear_demo`] runs.
//! Persisting the flag is the only side effect of a read.
//!
//! ## Public vs. authenticated
//!
//! Without a demo signal the answer depends on the server session, which the resolver
//! cannot see. [`SessionResolver::resolve_mode`] therefore takes the identity resolved
//! by [`crate::ApiClient`] and classifies it.

use std::fmt;
use std::sync::Arc;

use store::config::DemoConfig;

use crate::environment::Environment;
use crate::models::UserIdentity;

/// Value written under the demo storage key.
const DEMO_FLAG_VALUE: &str = "true";

/// Mutually exclusive classification of the current client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Anonymous visitor.
    Public,
    /// Demo mode: canned data, nothing reaches the backend.
    Demo,
    /// A real account with a server session.
    Authenticated,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Demo => "demo",
            Self::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_activating(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "1" | "true" | "yes" | "on"
    )
}

/// Decides which [`SessionMode`] the client is in.
#[derive(Clone)]
pub struct SessionResolver {
    env: Arc<dyn Environment>,
    demo: DemoConfig,
}

impl fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionResolver")
            .field("demo", &self.demo)
            .finish_non_exhaustive()
    }
}

impl SessionResolver {
    pub fn new(env: Arc<dyn Environment>, demo: DemoConfig) -> Self {
        Self { env, demo }
    }

    pub fn environment(&self) -> &Arc<dyn Environment> {
        &self.env
    }

    /// Whether demo mode is active, persisting the flag when the query parameter
    /// turns it on.
    pub fn is_demo(&self) -> bool {
        if let Some(value) = self.env.query_param(&self.demo.query_param) {
            if is_activating(&value) {
                if self.env.stored_flag(&self.demo.storage_key).as_deref()
                    != Some(DEMO_FLAG_VALUE)
                {
                    tracing::debug!("demo mode activated from query parameter");
                    self.env
                        .set_stored_flag(&self.demo.storage_key, DEMO_FLAG_VALUE);
                }
                return true;
            }
        }
        self.env
            .stored_flag(&self.demo.storage_key)
            .is_some_and(|value| is_activating(&value))
    }

    /// Classify the client given the identity resolved so far.
    pub fn resolve_mode(&self, identity: Option<&UserIdentity>) -> SessionMode {
        if self.is_demo() {
            return SessionMode::Demo;
        }
        match identity {
            Some(user) if user.is_real() => SessionMode::Authenticated,
            _ => SessionMode::Public,
        }
    }

    /// Turn demo mode on without a query parameter.
    pub fn activate_demo(&self) {
        self.env
            .set_stored_flag(&self.demo.storage_key, DEMO_FLAG_VALUE);
    }

    /// Forget the persisted demo flag.
    pub fn clear_demo(&self) {
        self.env.remove_stored_flag(&self.demo.storage_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::MemoryEnvironment;
    use crate::models::{demo_user, public_user};

    fn resolver(env: &MemoryEnvironment) -> SessionResolver {
        SessionResolver::new(Arc::new(env.clone()), DemoConfig::default())
    }

    fn signed_in() -> UserIdentity {
        serde_json::from_str(r#"{"id": "u1", "email": "a@b.com"}"#).unwrap()
    }

    #[test]
    fn test_no_signals_is_public() {
        let env = MemoryEnvironment::at("/dashboard");
        let resolver = resolver(&env);

        assert!(!resolver.is_demo());
        assert_eq!(resolver.resolve_mode(None), SessionMode::Public);
        assert_eq!(
            resolver.resolve_mode(Some(&public_user())),
            SessionMode::Public
        );
        // Reading never writes without a demo signal
        assert!(env.store().is_empty());
    }

    #[test]
    fn test_real_identity_is_authenticated() {
        let env = MemoryEnvironment::at("/");
        let resolver = resolver(&env);

        assert_eq!(
            resolver.resolve_mode(Some(&signed_in())),
            SessionMode::Authenticated
        );
    }

    #[test]
    fn test_query_param_is_sticky() {
        let env = MemoryEnvironment::at("/?demo=true");
        let resolver = resolver(&env);

        assert!(resolver.is_demo());
        assert_eq!(env.stored_flag("bruceops-demo-mode").as_deref(), Some("true"));

        // Parameter gone, flag keeps demo mode on
        env.set_location("/logs");
        assert!(resolver.is_demo());
        assert_eq!(resolver.resolve_mode(Some(&demo_user())), SessionMode::Demo);
    }

    #[test]
    fn test_demo_wins_over_real_identity() {
        let env = MemoryEnvironment::at("/?demo=1");
        let resolver = resolver(&env);

        assert_eq!(resolver.resolve_mode(Some(&signed_in())), SessionMode::Demo);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for url in ["/", "/?demo=true", "/?demo=false"] {
            let env = MemoryEnvironment::at(url);
            let resolver = resolver(&env);
            let first = resolver.resolve_mode(None);
            let second = resolver.resolve_mode(None);
            assert_eq!(first, second, "mode changed between reads at {url}");
        }
    }

    #[test]
    fn test_non_activating_param_keeps_existing_flag() {
        let env = MemoryEnvironment::at("/?demo=false");
        let resolver = resolver(&env);
        assert!(!resolver.is_demo());

        resolver.activate_demo();
        assert!(resolver.is_demo());
    }

    #[test]
    fn test_clear_demo() {
        let env = MemoryEnvironment::at("/?demo=true");
        let resolver = resolver(&env);
        assert!(resolver.is_demo());

        env.set_location("/");
        resolver.clear_demo();

        assert!(!resolver.is_demo());
        assert!(env.store().is_empty());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(SessionMode::Authenticated.to_string(), "authenticated");
        assert_eq!(SessionMode::Demo.as_str(), "demo");
    }
}

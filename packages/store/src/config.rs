//! # Client configuration: `bruceops.toml`
//!
//! Defines the TOML configuration read by the client session layer
//! (filename: [`ClientConfig::filename`] = `"bruceops.toml"`). It names the API
//! endpoints, the demo-mode switches, and the cache policy for identity queries.
//!
//! ## Structure
//!
//! ```toml
//! [api]
//! base_url = ""                    # empty = same origin
//! identity_path = "/api/auth/user"
//! me_path = "/api/me"
//! login_path = "/api/login"
//! logout_path = "/api/logout"
//!
//! [demo]
//! query_param = "demo"             # ?demo=true turns demo mode on
//! storage_key = "bruceops-demo-mode"
//!
//! [cache]
//! stale_time_secs = 300
//! retry = 0
//! refetch_on_window_focus = false
//!
//! [session]
//! strategy = "direct"              # or "two-step" (/api/me, then /api/auth/user)
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`ClientConfig`] | Top-level config. TOML (de)serialisation, layered loading on native targets, canonical filename. |
//! | [`ApiConfig`] | Endpoint paths and the optional base URL. |
//! | [`DemoConfig`] | Query parameter and storage key of the sticky demo flag. |
//! | [`CacheConfig`] | Staleness window (default **5 minutes**), retry count (default **0**), refocus policy. |
//! | [`SessionConfig`] | Which [`IdentityStrategy`] resolves the current user. |
//!
//! Every field has a default, so a missing or empty config file is equivalent to
//! the default configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `bruceops.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// API endpoint configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix prepended to relative request paths. Empty means same origin.
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_identity_path")]
    pub identity_path: String,
    #[serde(default = "default_me_path")]
    pub me_path: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
}

fn default_identity_path() -> String {
    "/api/auth/user".to_string()
}

fn default_me_path() -> String {
    "/api/me".to_string()
}

fn default_login_path() -> String {
    "/api/login".to_string()
}

fn default_logout_path() -> String {
    "/api/logout".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            identity_path: default_identity_path(),
            me_path: default_me_path(),
            login_path: default_login_path(),
            logout_path: default_logout_path(),
        }
    }
}

impl ApiConfig {
    /// Join a request path onto the base URL.
    ///
    /// Absolute URLs are returned unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// Demo-mode switches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_query_param")]
    pub query_param: String,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_query_param() -> String {
    "demo".to_string()
}

fn default_storage_key() -> String {
    "bruceops-demo-mode".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            query_param: default_query_param(),
            storage_key: default_storage_key(),
        }
    }
}

/// Query cache policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds before a cached result is re-fetched on the next read.
    #[serde(default = "default_stale_time")]
    pub stale_time_secs: u64,
    /// Automatic retries after a failed query. 0 surfaces failures immediately.
    #[serde(default)]
    pub retry: u32,
    #[serde(default)]
    pub refetch_on_window_focus: bool,
}

fn default_stale_time() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: default_stale_time(),
            retry: 0,
            refetch_on_window_focus: false,
        }
    }
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

/// How the current identity is fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStrategy {
    /// A single GET of the identity endpoint; `401` means "no user".
    #[default]
    Direct,
    /// GET `/api/me` first, then the identity endpoint for non-public callers.
    TwoStep,
}

/// Session resolution configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub strategy: IdentityStrategy,
}

impl ClientConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "bruceops.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Builder method to pick the identity strategy.
    pub fn with_strategy(mut self, strategy: IdentityStrategy) -> Self {
        self.session.strategy = strategy;
        self
    }

    /// Builder method to set the staleness window.
    pub fn with_stale_time_secs(mut self, secs: u64) -> Self {
        self.cache.stale_time_secs = secs;
        self
    }

    /// Prefix of the environment variables read by [`ClientConfig::load`].
    pub const ENV_PREFIX: &'static str = "BRUCEOPS";

    /// Load configuration from defaults, an optional `bruceops.toml` in the working
    /// directory, and `BRUCEOPS_<SECTION>__<KEY>` environment variables, in that order.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_prefix(Self::ENV_PREFIX)
    }

    /// [`ClientConfig::load`] reading `<prefix>_<SECTION>__<KEY>` variables instead.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_with_prefix(prefix: &str) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let defaults = Self::default();
        let config = Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.identity_path", defaults.api.identity_path)?
            .set_default("api.me_path", defaults.api.me_path)?
            .set_default("api.login_path", defaults.api.login_path)?
            .set_default("api.logout_path", defaults.api.logout_path)?
            .set_default("demo.query_param", defaults.demo.query_param)?
            .set_default("demo.storage_key", defaults.demo.storage_key)?
            .set_default("cache.stale_time_secs", defaults.cache.stale_time_secs)?
            .set_default("cache.retry", defaults.cache.retry)?
            .set_default(
                "cache.refetch_on_window_focus",
                defaults.cache.refetch_on_window_focus,
            )?
            .set_default("session.strategy", "direct")?
            .add_source(
                File::with_name(Self::filename())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

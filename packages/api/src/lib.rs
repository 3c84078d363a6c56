//! # API crate: client session core for BruceOps
//!
//! This crate decides who the current visitor is and talks to the backend on their
//! behalf. It has no UI and no browser dependency of its own: the page it runs in is
//! reached through [`Environment`], the network through [`Transport`], so everything
//! here runs under plain `cargo test`.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`session`] | [`SessionResolver`] and [`SessionMode`]: public, demo, or authenticated; sticky demo flag |
//! | [`client`] | [`ApiClient`]: demo short-circuiting, HTTP calls, identity resolution that never fails |
//! | [`cache`] | [`QueryCache`]: keyed results with a staleness window and generation-guarded writes |
//! | [`auth`] | [`AuthController`] and [`AuthState`]: the flags the UI reads, plus `login`/`logout` |
//! | [`demo`] | Canned responses served in demo mode |
//! | [`environment`] | [`Environment`] capability and the in-memory [`MemoryEnvironment`] |
//! | [`transport`] | [`Transport`] trait and the `reqwest`-backed [`ReqwestTransport`] |
//! | [`models`] | [`UserIdentity`], the public/demo sentinels, `/api/me` body |
//! | [`clock`] | Platform-aware millisecond clock |
//!
//! ## Endpoints used
//!
//! - `GET /api/auth/user`: current user; `401` means nobody is signed in
//! - `GET /api/me`: public-or-not probe for the two-step strategy
//! - `GET /api/login`, `GET /api/logout`: navigated to, never fetched

pub mod auth;
pub mod cache;
pub mod client;
pub mod clock;
pub mod demo;
pub mod environment;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use auth::{AuthController, AuthState, LogoutOutcome};
pub use cache::{Fetch, FetchLease, FetchTicket, FetchWaiter, QueryCache};
pub use client::{ApiClient, UnauthorizedBehavior};
pub use clock::{Clock, ManualClock, SystemClock};
pub use environment::{Environment, MemoryEnvironment};
pub use error::{ApiError, Result};
pub use models::{demo_user, public_user, MeResponse, UserIdentity};
pub use session::{SessionMode, SessionResolver};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub use reqwest::Method;
pub use store::{ClientConfig, IdentityStrategy};

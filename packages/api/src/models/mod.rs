//! Data models for the application.

mod user;

pub use user::{
    demo_user, public_user, MeResponse, UserIdentity, DEMO_USER_ID, PUBLIC_USER_ID,
};

//! # User identity model
//!
//! Defines the identity of whoever is using the client right now.
//!
//! ## [`UserIdentity`]
//!
//! The JSON shape returned by `GET /api/auth/user`, deserialised from camelCase:
//!
//! - `id`: unique user id (string).
//! - `email`, `firstName`, `lastName`, `profileImageUrl`: profile fields, all optional
//!   because the identity provider may withhold any of them.
//! - `createdAt` / `updatedAt`: audit timestamps (RFC 3339).
//! - `isPublic`: `true` only for the public sentinel or a merged `/api/me` answer.
//!
//! ## Sentinels
//!
//! Two identities exist outside persistence. [`public_user`] (id `"public"`) stands in
//! for an anonymous visitor; [`demo_user`] (id `"demo-user"`) is shown while demo mode
//! is active. Both are built once per process and handed out as clones, so no caller
//! can mutate the shared value.
//!
//! ## [`MeResponse`]
//!
//! The body of `GET /api/me`, used by the two-step identity strategy. A public answer
//! is folded onto the public sentinel with [`MeResponse::into_public_identity`].

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Id of the public sentinel identity.
pub const PUBLIC_USER_ID: &str = "public";
/// Id of the demo sentinel identity.
pub const DEMO_USER_ID: &str = "demo-user";

static PUBLIC_USER: LazyLock<UserIdentity> = LazyLock::new(|| UserIdentity {
    id: PUBLIC_USER_ID.to_string(),
    email: None,
    first_name: Some("Guest".to_string()),
    last_name: None,
    profile_image_url: None,
    created_at: None,
    updated_at: None,
    is_public: true,
});

static DEMO_USER: LazyLock<UserIdentity> = LazyLock::new(|| UserIdentity {
    id: DEMO_USER_ID.to_string(),
    email: Some("demo@harriswildlands.com".to_string()),
    first_name: Some("Demo".to_string()),
    last_name: Some("User".to_string()),
    profile_image_url: None,
    created_at: None,
    updated_at: None,
    is_public: false,
});

/// The identity used when nobody is signed in.
pub fn public_user() -> UserIdentity {
    PUBLIC_USER.clone()
}

/// The identity shown while demo mode is active.
pub fn demo_user() -> UserIdentity {
    DEMO_USER.clone()
}

/// The current user as seen by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_public: bool,
}

impl UserIdentity {
    pub fn is_public_sentinel(&self) -> bool {
        self.id == PUBLIC_USER_ID
    }

    pub fn is_demo_sentinel(&self) -> bool {
        self.id == DEMO_USER_ID
    }

    /// Whether this identity belongs to a real signed-in account.
    pub fn is_real(&self) -> bool {
        !self.is_public && !self.is_public_sentinel() && !self.is_demo_sentinel()
    }

    /// Full name when known, falling back to email, then to the id.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            return name;
        }
        self.email.clone().unwrap_or_else(|| self.id.clone())
    }

    /// Up to two uppercase initials for avatar placeholders.
    pub fn initials(&self) -> String {
        let display = self.display_name();
        display
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Body of `GET /api/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub is_public: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl MeResponse {
    /// Fold a public answer onto the public sentinel.
    ///
    /// Fields present in the response override the sentinel's; the id always stays
    /// `"public"`.
    pub fn into_public_identity(self) -> UserIdentity {
        let mut user = public_user();
        if self.email.is_some() {
            user.email = self.email;
        }
        if self.first_name.is_some() {
            user.first_name = self.first_name;
        }
        if self.last_name.is_some() {
            user.last_name = self.last_name;
        }
        if self.profile_image_url.is_some() {
            user.profile_image_url = self.profile_image_url;
        }
        user.is_public = true;
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let user: UserIdentity = serde_json::from_str(
            r#"{
                "id": "u1",
                "email": "a@b.com",
                "firstName": "Bruce",
                "lastName": "Harris",
                "profileImageUrl": null,
                "createdAt": "2024-03-01T12:00:00Z",
                "updatedAt": "2024-03-02T08:30:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.first_name.as_deref(), Some("Bruce"));
        assert!(user.created_at.is_some());
        assert!(!user.is_public);
        assert!(user.is_real());
        assert_eq!(user.display_name(), "Bruce Harris");
        assert_eq!(user.initials(), "BH");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let user: UserIdentity =
            serde_json::from_str(r#"{"id": "u2", "email": "x@y.org"}"#).unwrap();
        assert_eq!(user.display_name(), "x@y.org");

        let bare: UserIdentity = serde_json::from_str(r#"{"id": "u3"}"#).unwrap();
        assert_eq!(bare.display_name(), "u3");
    }

    #[test]
    fn test_sentinels() {
        let public = public_user();
        assert!(public.is_public_sentinel());
        assert!(public.is_public);
        assert!(!public.is_real());

        let demo = demo_user();
        assert!(demo.is_demo_sentinel());
        assert!(!demo.is_public);
        assert!(!demo.is_real());
        assert_eq!(demo.display_name(), "Demo User");
    }

    #[test]
    fn test_sentinel_clones_are_independent() {
        let mut first = public_user();
        first.first_name = Some("Changed".to_string());
        assert_eq!(public_user().first_name.as_deref(), Some("Guest"));
    }

    #[test]
    fn test_me_response_merges_onto_public() {
        let me: MeResponse = serde_json::from_str(
            r#"{"isPublic": true, "id": "ignored", "firstName": "Visitor"}"#,
        )
        .unwrap();
        let user = me.into_public_identity();

        assert_eq!(user.id, PUBLIC_USER_ID);
        assert_eq!(user.first_name.as_deref(), Some("Visitor"));
        assert!(user.is_public);
    }
}

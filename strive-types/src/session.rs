use serde::{Deserialize, Serialize};

/// Profile photo reference used when the user never uploaded one.
pub const DEFAULT_PROFILE_PHOTO: &str = "default_dp.png";

/// Authenticated identity. Persisted across restarts; valid until a request
/// using the token fails with an authorization error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub profile_photo: String,
}

impl Session {
    pub fn new(token: String, username: String, profile_photo: Option<String>) -> Self {
        Self {
            token,
            username,
            profile_photo: profile_photo.unwrap_or_else(|| DEFAULT_PROFILE_PHOTO.to_string()),
        }
    }
}

/// Credentials captured during a failed login (user-not-found), reused to
/// complete signup. Cleared once signup completes or fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCredential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Unknown values fall back to the default.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

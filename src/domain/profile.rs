use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label shown when a member or sender cannot be resolved to a profile.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Presence of a user as shown next to avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    Online,
    Away,
    #[default]
    Offline,
}

impl Presence {
    /// Parses the free-text `status` column; anything unrecognised is offline.
    pub fn from_status(status: Option<&str>) -> Self {
        match status.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("online") => Self::Online,
            Some(value) if value.eq_ignore_ascii_case("away") => Self::Away,
            _ => Self::Offline,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Offline => "offline",
        }
    }
}

/// A user's identity and presence record, as stored in `profiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            display_name: None,
            avatar_url: None,
            bio: None,
            status: None,
            last_seen: None,
        }
    }

    /// Display name, then username, for rendering. `None` when both are blank.
    pub fn label(&self) -> Option<&str> {
        non_blank(self.display_name.as_deref()).or_else(|| non_blank(self.username.as_deref()))
    }

    pub fn presence(&self) -> Presence {
        Presence::from_status(self.status.as_deref())
    }
}

/// Resolves an optional profile to a display label, masking gaps with `fallback`.
pub fn label_or<'a>(profile: Option<&'a Profile>, fallback: &'a str) -> &'a str {
    profile.and_then(Profile::label).unwrap_or(fallback)
}

/// Partial update for the signed-in user's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.display_name.is_none()
            && self.avatar_url.is_none()
            && self.bio.is_none()
            && self.status.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Approved,
    Disabled,
}

/// Per-feature flags, each toggled independently by an admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissions {
    #[serde(default)]
    pub trend_dashboard: bool,
    #[serde(default)]
    pub caption_gen: bool,
    #[serde(default)]
    pub image_analysis: bool,
    #[serde(default)]
    pub audio_analysis: bool,
}

impl UserPermissions {
    pub fn all() -> Self {
        Self {
            trend_dashboard: true,
            caption_gen: true,
            image_analysis: true,
            audio_analysis: true,
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::TrendDashboard => self.trend_dashboard,
            Permission::CaptionGen => self.caption_gen,
            Permission::ImageAnalysis => self.image_analysis,
            Permission::AudioAnalysis => self.audio_analysis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    TrendDashboard,
    CaptionGen,
    ImageAnalysis,
    AudioAnalysis,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Permission::TrendDashboard => "Trend Dashboard",
            Permission::CaptionGen => "Caption Generation",
            Permission::ImageAnalysis => "Image Analysis",
            Permission::AudioAnalysis => "Audio Analysis",
        };
        f.write_str(label)
    }
}

/// Profile document stored in the `users` collection, keyed by `uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(default)]
    pub permissions: UserPermissions,
    /// Epoch milliseconds
    pub created_at: i64,
}

impl UserProfile {
    /// Profile created at signup: a regular user waiting for approval with nothing enabled.
    pub fn new_pending(uid: String, email: String) -> Self {
        Self {
            uid,
            email,
            role: UserRole::User,
            status: UserStatus::Pending,
            permissions: UserPermissions::default(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Login identity kept apart from the profile so password hashes never leave the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub uid: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

/// Partial profile update sent by the admin panel. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub permissions: Option<UserPermissions>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.permissions.is_none() && self.role.is_none()
    }

    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(status) = self.status {
            profile.status = status;
        }
        if let Some(permissions) = self.permissions {
            profile.permissions = permissions;
        }
        if let Some(role) = self.role {
            profile.role = role;
        }
    }
}

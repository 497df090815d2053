//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Password placeholder for accounts created through Google sign-in.
///
/// It is not a bcrypt hash, so no password ever verifies against it.
pub const EXTERNAL_PASSWORD: &str = "-";

/// Profile picture placeholder for new accounts
pub const DEFAULT_PROFILE: &str = "none-url";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SharedError> {
        match value {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(SharedError::invalid_code("role", other)),
        }
    }
}

/// Account lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveState {
    #[serde(rename = "1")]
    Active,
    #[serde(rename = "0")]
    Inactive,
    /// Soft-deleted: the account still owns boards or memberships
    #[serde(rename = "2")]
    Deleted,
}

impl ActiveState {
    /// Wire code: `"1"` active, `"0"` inactive, `"2"` deleted
    pub fn code(&self) -> &'static str {
        match self {
            ActiveState::Active => "1",
            ActiveState::Inactive => "0",
            ActiveState::Deleted => "2",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, SharedError> {
        match code {
            "1" => Ok(ActiveState::Active),
            "0" => Ok(ActiveState::Inactive),
            "2" => Ok(ActiveState::Deleted),
            other => Err(SharedError::invalid_code("active state", other)),
        }
    }
}

/// A stored user account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile: String,
    pub role: Role,
    pub is_verified: bool,
    pub active: ActiveState,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the stored hash can ever match a password
    pub fn has_password(&self) -> bool {
        self.password_hash != EXTERNAL_PASSWORD
    }
}

/// Fields needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile: String,
    pub role: Role,
    pub is_verified: bool,
}

impl NewUser {
    /// A self-registered, unverified account
    pub fn signup(name: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            email,
            password_hash,
            profile: DEFAULT_PROFILE.to_string(),
            role: Role::User,
            is_verified: false,
        }
    }

    pub fn into_user(self, id: Uuid, created_at: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            profile: self.profile,
            role: self.role,
            is_verified: self.is_verified,
            active: ActiveState::Active,
            created_at,
        }
    }
}

/// Partial profile update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub profile: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none() && self.profile.is_none()
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash = hash.clone();
        }
        if let Some(profile) = &self.profile {
            user.profile = profile.clone();
        }
    }
}

/// The part of a user that other users may see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            profile: user.profile.clone(),
            role: user.role,
        }
    }
}

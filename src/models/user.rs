//! User profiles and roles.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Role ==
/// Role stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

/// What an admin operation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Review content, ban users, read the dashboard
    Moderate,
    /// Change other users' roles
    ManageRoles,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Moderate => matches!(self, Role::Moderator | Role::Admin),
            Permission::ManageRoles => matches!(self, Role::Admin),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Profile ==
/// Public profile of a registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    /// Banned users keep their role but lose every permission
    #[serde(default)]
    pub banned: bool,
}

impl Profile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            banned: false,
        }
    }

    /// Role that counts for authorization, `None` while banned.
    pub fn effective_role(&self) -> Option<Role> {
        (!self.banned).then_some(self.role)
    }
}

// == Profile Update ==
/// Profile mutations available to moderators and admins.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileUpdate {
    Ban { reason: Option<String> },
    Unban,
    ChangeRole(Role),
}

impl ProfileUpdate {
    /// Applies the update to an in-memory profile.
    pub fn apply(&self, profile: &mut Profile) {
        match self {
            ProfileUpdate::Ban { .. } => profile.banned = true,
            ProfileUpdate::Unban => profile.banned = false,
            ProfileUpdate::ChangeRole(role) => profile.role = *role,
        }
    }
}

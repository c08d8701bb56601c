use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried by a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => f.write_str("customer"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// Represents the user of the active session.
///
/// Supplied by the authentication layer after it has checked credentials;
/// the engine never sees a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    /// Creates a new User instance.
    ///
    /// # Arguments
    /// * `id` - Identifier assigned by the authentication layer
    /// * `name` - User's display name
    /// * `email` - User's email address
    /// * `role` - Customer or admin
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    pub fn customer(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(id, name, email, Role::Customer)
    }

    pub fn admin(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(id, name, email, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

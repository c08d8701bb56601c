//! The signed-in user for this engine instance and the role checks every
//! command goes through.

use parking_lot::RwLock;
use thiserror::Error;

use crate::domain::{Role, User};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccessError {
    #[error("Please login to continue")]
    AuthRequired,
    #[error("This action requires the {required} role")]
    RoleForbidden { required: Role },
}

#[derive(Debug, Default)]
pub struct Session {
    user: RwLock<Option<User>>,
}

impl Session {
    pub fn new(user: Option<User>) -> Self {
        Self { user: RwLock::new(user) }
    }

    pub fn current(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// Replaces the session user and returns the previous one.
    pub fn replace(&self, user: Option<User>) -> Option<User> {
        std::mem::replace(&mut *self.user.write(), user)
    }

    pub fn require_user(&self) -> Result<User, AccessError> {
        self.current().ok_or(AccessError::AuthRequired)
    }

    pub fn require_role(&self, required: Role) -> Result<User, AccessError> {
        let user = self.require_user()?;
        if user.role != required {
            return Err(AccessError::RoleForbidden { required });
        }
        Ok(user)
    }

    pub fn require_customer(&self) -> Result<User, AccessError> {
        self.require_role(Role::Customer)
    }

    pub fn require_admin(&self) -> Result<User, AccessError> {
        self.require_role(Role::Admin)
    }
}

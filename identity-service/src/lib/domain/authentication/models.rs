use std::fmt;

use crate::domain::user::models::Handle;
use crate::domain::user::models::LoginClient;
use crate::domain::user::models::Role;

/// Command to register a new user with domain types
pub struct RegisterCommand {
    pub handle: Handle,
    pub password: String,
    pub role: Role,
}

impl RegisterCommand {
    /// Construct a new register command.
    ///
    /// # Arguments
    /// * `handle` - Validated handle
    /// * `password` - Plain text password (will be hashed by service)
    /// * `role` - Validated role tag
    pub fn new(handle: Handle, password: String, role: Role) -> Self {
        Self {
            handle,
            password,
            role,
        }
    }
}

/// Login attempt.
///
/// The handle is kept raw: a handle that fails validation is rejected the
/// same way as an unknown one. `client` ends up in the login history.
pub struct LoginCommand {
    pub handle: String,
    pub password: String,
    pub client: LoginClient,
}

/// Password change for an authenticated user.
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
}

impl fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("handle", &self.handle)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("handle", &self.handle)
            .field("password", &"<redacted>")
            .field("client", &self.client)
            .finish()
    }
}

impl fmt::Debug for ChangePasswordCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordCommand")
            .field("current_password", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}

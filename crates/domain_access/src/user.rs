//! Back-office user accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use core_kernel::UserId;

use crate::error::AccessError;
use crate::role::Role;

/// A stored user account
///
/// The password hash never leaves the process: it is skipped on
/// serialization and only [`UserView`] is handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds an active account from already-validated input
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

/// Public projection of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView::from(&user)
    }
}

/// Input for creating an account
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Trims username and email; both stay case-sensitive
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    pub fn validate(&self) -> Result<(), AccessError> {
        if self.username.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(AccessError::Validation(
                "username, email and password are required".to_string(),
            ));
        }
        check_email(&self.email)
    }
}

/// Partial update of an account; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Re-hashed only when present and non-empty
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// Trims identifiers and drops blank values
    pub fn normalized(self) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            username: non_blank(self.username),
            email: non_blank(self.email),
            password: self.password.filter(|p| !p.is_empty()),
            role: self.role,
            is_active: self.is_active,
        }
    }

    pub fn validate(&self) -> Result<(), AccessError> {
        match self.email.as_deref() {
            Some(email) => check_email(email),
            None => Ok(()),
        }
    }

    /// Applies everything except the password, which the service hashes
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(active) = self.is_active {
            user.is_active = active;
        }
        user.updated_at = now;
    }
}

fn check_email(email: &str) -> Result<(), AccessError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(AccessError::Validation(format!("invalid email: {email}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            UserId::new(),
            "operador",
            "operador@example.com",
            "$argon2id$hash",
            Role::Register,
            Utc::now(),
        )
    }

    #[test]
    fn test_hash_not_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "register");
    }

    #[test]
    fn test_new_user_requires_fields() {
        assert!(NewUser::new("ana", "", "secreto").validate().is_err());
        assert!(NewUser::new("ana", "ana@example.com", "").validate().is_err());
        assert!(NewUser::new("ana", "no-es-correo", "secreto").validate().is_err());
        assert!(NewUser::new("ana", "ana@example.com", "secreto").validate().is_ok());
    }

    #[test]
    fn test_update_normalizes_and_applies() {
        let mut account = user();
        let update = UserUpdate {
            username: Some("  ".into()),
            email: Some(" nuevo@example.com ".into()),
            password: Some(String::new()),
            is_active: Some(false),
            ..Default::default()
        }
        .normalized();

        assert!(update.username.is_none());
        assert!(update.password.is_none());
        update.apply_to(&mut account, Utc::now());

        assert_eq!(account.username, "operador");
        assert_eq!(account.email, "nuevo@example.com");
        assert!(!account.is_active);
        assert_eq!(account.role, Role::Register);
    }
}

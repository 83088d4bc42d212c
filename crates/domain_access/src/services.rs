//! User account services
//!
//! Login, bootstrap registration and account management. Every mutation is
//! checked against [`crate::permissions`] before it reaches storage.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use core_kernel::{PortError, UserId};

use crate::error::AccessError;
use crate::password::{hash_password, verify_password};
use crate::permissions::{self, Action, Actor};
use crate::ports::UserPort;
use crate::role::Role;
use crate::user::{NewUser, User, UserUpdate};

pub struct UserService {
    users: Arc<dyn UserPort>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserPort>) -> Self {
        Self { users }
    }

    /// Checks a username/password pair
    ///
    /// Unknown users, inactive accounts and wrong passwords all fail with the
    /// same `InvalidCredentials` error.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AccessError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AccessError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(username, "Login failed: unknown user");
            return Err(AccessError::InvalidCredentials);
        };
        if !user.is_active {
            warn!(username, "Login failed: inactive account");
            return Err(AccessError::InvalidCredentials);
        }
        if !verify_password(password, &user.password_hash) {
            warn!(username, "Login failed: wrong password");
            return Err(AccessError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Creates the first account of an empty system as superadmin
    pub async fn register_first(&self, data: NewUser) -> Result<User, AccessError> {
        if self.users.count_users().await? > 0 {
            return Err(AccessError::RegistrationClosed);
        }
        let user = self.insert(data, Role::Superadmin).await?;
        info!(user_id = %user.id, username = %user.username, "Bootstrap superadmin registered");
        Ok(user)
    }

    /// Reloads the account behind a token; inactive or missing accounts are rejected
    pub async fn current(&self, id: UserId) -> Result<User, AccessError> {
        match self.users.get_user(id).await {
            Ok(user) if user.is_active => Ok(user),
            Ok(_) => Err(AccessError::InvalidCredentials),
            Err(e) if e.is_not_found() => Err(AccessError::InvalidCredentials),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists every account, newest first
    pub async fn list(&self, actor: &Actor) -> Result<Vec<User>, AccessError> {
        permissions::require(actor.role, Action::UsersRead)?;
        Ok(self.users.list_users().await?)
    }

    /// Creates an account on behalf of `actor`; the role defaults to admin
    pub async fn create(&self, actor: &Actor, data: NewUser) -> Result<User, AccessError> {
        let role = data.role.unwrap_or_default();
        permissions::authorize_create(actor, role)?;

        let user = self.insert(data, role).await?;
        info!(
            user_id = %user.id,
            role = %user.role,
            created_by = %actor.id,
            "User created"
        );
        Ok(user)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: UserId,
        update: UserUpdate,
    ) -> Result<User, AccessError> {
        let update = update.normalized();
        let mut user = self.get(id).await?;
        permissions::authorize_update(actor, user.id, user.role, user.is_active, &update)?;
        update.validate()?;

        if let Some(username) = update.username.as_deref() {
            if username != user.username {
                self.ensure_username_free(username, Some(id)).await?;
            }
        }
        if let Some(email) = update.email.as_deref() {
            if email != user.email {
                self.ensure_email_free(email, Some(id)).await?;
            }
        }

        update.apply_to(&mut user, Utc::now());
        if let Some(password) = update.password.as_deref() {
            user.password_hash = hash_password(password)?;
        }

        let updated = self
            .users
            .update_user(user)
            .await
            .map_err(|e| storage_error(e, id))?;
        info!(user_id = %id, updated_by = %actor.id, "User updated");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: UserId) -> Result<(), AccessError> {
        if actor.id == id {
            return Err(AccessError::forbidden("you cannot delete your own account"));
        }
        let user = self.get(id).await?;
        permissions::authorize_delete(actor, user.id, user.role)?;

        self.users
            .delete_user(id)
            .await
            .map_err(|e| storage_error(e, id))?;
        info!(user_id = %id, deleted_by = %actor.id, "User deleted");
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<User, AccessError> {
        self.users
            .get_user(id)
            .await
            .map_err(|e| storage_error(e, id))
    }

    async fn insert(&self, data: NewUser, role: Role) -> Result<User, AccessError> {
        let data = data.normalized();
        data.validate()?;
        self.ensure_username_free(&data.username, None).await?;
        self.ensure_email_free(&data.email, None).await?;

        let hash = hash_password(&data.password)?;
        let user = User::new(UserId::new(), data.username, data.email, hash, role, Utc::now());
        let id = user.id;
        self.users
            .create_user(user)
            .await
            .map_err(|e| storage_error(e, id))
    }

    async fn ensure_username_free(
        &self,
        username: &str,
        owner: Option<UserId>,
    ) -> Result<(), AccessError> {
        match self.users.find_by_username(username).await? {
            Some(holder) if Some(holder.id) != owner => Err(AccessError::Duplicate {
                field: "username",
                value: username.to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<UserId>) -> Result<(), AccessError> {
        match self.users.find_by_email(email).await? {
            Some(holder) if Some(holder.id) != owner => Err(AccessError::Duplicate {
                field: "email",
                value: email.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn storage_error(error: PortError, id: UserId) -> AccessError {
    if error.is_not_found() {
        AccessError::NotFound(id)
    } else {
        AccessError::Port(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockUserPort;

    struct Fixture {
        service: UserService,
        superadmin: Actor,
        admin: Actor,
        register: Actor,
    }

    async fn fixture() -> Fixture {
        let service = UserService::new(Arc::new(MockUserPort::new()));
        let root = service
            .register_first(NewUser::new("root", "root@example.com", "root-pass"))
            .await
            .unwrap();
        let superadmin = Actor::new(root.id, root.role);

        let admin = service
            .create(&superadmin, NewUser::new("jefa", "jefa@example.com", "pass").with_role(Role::Admin))
            .await
            .unwrap();
        let register = service
            .create(
                &superadmin,
                NewUser::new("taquilla", "taquilla@example.com", "pass").with_role(Role::Register),
            )
            .await
            .unwrap();

        Fixture {
            service,
            superadmin,
            admin: Actor::new(admin.id, admin.role),
            register: Actor::new(register.id, register.role),
        }
    }

    #[tokio::test]
    async fn test_register_first_only_once() {
        let f = fixture().await;
        let result = f
            .service
            .register_first(NewUser::new("otro", "otro@example.com", "x"))
            .await;
        assert!(matches!(result, Err(AccessError::RegistrationClosed)));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let f = fixture().await;
        let user = f.service.authenticate("root", "root-pass").await.unwrap();
        assert_eq!(user.role, Role::Superadmin);

        assert!(matches!(
            f.service.authenticate("root", "wrong").await,
            Err(AccessError::InvalidCredentials)
        ));
        assert!(matches!(
            f.service.authenticate("nadie", "root-pass").await,
            Err(AccessError::InvalidCredentials)
        ));
        assert!(matches!(
            f.service.authenticate("", "").await,
            Err(AccessError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_inactive_account_cannot_login() {
        let f = fixture().await;
        let update = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        f.service
            .update(&f.superadmin, f.register.id, update)
            .await
            .unwrap();

        assert!(matches!(
            f.service.authenticate("taquilla", "pass").await,
            Err(AccessError::InvalidCredentials)
        ));
        assert!(f.service.current(f.register.id).await.is_err());
    }

    #[tokio::test]
    async fn test_default_role_is_admin() {
        let f = fixture().await;
        let user = f
            .service
            .create(&f.superadmin, NewUser::new("nuevo", "nuevo@example.com", "x"))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let f = fixture().await;
        let same_name = f
            .service
            .create(&f.superadmin, NewUser::new("jefa", "otra@example.com", "x"))
            .await;
        assert!(matches!(same_name, Err(AccessError::Duplicate { field: "username", .. })));

        let same_email = f
            .service
            .create(&f.superadmin, NewUser::new("otra", "jefa@example.com", "x"))
            .await;
        assert!(matches!(same_email, Err(AccessError::Duplicate { field: "email", .. })));
    }

    #[tokio::test]
    async fn test_admin_cannot_grant_superadmin() {
        let f = fixture().await;
        let promote = || UserUpdate {
            role: Some(Role::Superadmin),
            ..Default::default()
        };

        let denied = f.service.update(&f.admin, f.register.id, promote()).await;
        assert!(matches!(denied, Err(AccessError::Forbidden(_))));

        let granted = f
            .service
            .update(&f.superadmin, f.register.id, promote())
            .await
            .unwrap();
        assert_eq!(granted.role, Role::Superadmin);
    }

    #[tokio::test]
    async fn test_admin_cannot_touch_other_admins() {
        let f = fixture().await;
        let other = f
            .service
            .create(&f.superadmin, NewUser::new("par", "par@example.com", "x"))
            .await
            .unwrap();

        let rename = UserUpdate {
            username: Some("renombrado".into()),
            ..Default::default()
        };
        assert!(f.service.update(&f.admin, other.id, rename).await.is_err());
        assert!(f.service.delete(&f.admin, other.id).await.is_err());
        assert!(f.service.delete(&f.admin, f.register.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_self_profile_edit_rehashes_password() {
        let f = fixture().await;
        let update = UserUpdate {
            password: Some("nueva-clave".into()),
            email: Some("caja@example.com".into()),
            ..Default::default()
        };
        let updated = f
            .service
            .update(&f.register, f.register.id, update)
            .await
            .unwrap();
        assert_eq!(updated.email, "caja@example.com");

        assert!(f.service.authenticate("taquilla", "nueva-clave").await.is_ok());
        assert!(f.service.authenticate("taquilla", "pass").await.is_err());
    }

    #[tokio::test]
    async fn test_self_delete_rejected() {
        let f = fixture().await;
        for actor in [f.superadmin, f.admin, f.register] {
            let result = f.service.delete(&actor, actor.id).await;
            assert!(matches!(result, Err(AccessError::Forbidden(_))));
        }
    }

    #[tokio::test]
    async fn test_register_cannot_list_users() {
        let f = fixture().await;
        assert!(f.service.list(&f.register).await.is_err());
        let users = f.service.list(&f.admin).await.unwrap();
        assert_eq!(users.len(), 3);
    }
}

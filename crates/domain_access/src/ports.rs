//! Access Domain Ports
//!
//! Storage interface for user accounts. Adapters must enforce uniqueness of
//! both username and email and report a violation as `PortError::Conflict`.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError, UserId};

use crate::user::User;

#[async_trait]
pub trait UserPort: DomainPort + HealthCheckable {
    async fn get_user(&self, id: UserId) -> Result<User, PortError>;

    /// Exact, case-sensitive lookup
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, PortError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError>;

    /// All accounts, newest first
    async fn list_users(&self) -> Result<Vec<User>, PortError>;

    /// Number of accounts in any state
    async fn count_users(&self) -> Result<u64, PortError>;

    async fn create_user(&self, user: User) -> Result<User, PortError>;

    async fn update_user(&self, user: User) -> Result<User, PortError>;

    async fn delete_user(&self, id: UserId) -> Result<(), PortError>;
}

/// In-memory implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockUserPort {
        users: RwLock<HashMap<UserId, User>>,
    }

    impl MockUserPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_users(users: Vec<User>) -> Self {
            let port = Self::new();
            for user in users {
                port.users.write().await.insert(user.id, user);
            }
            port
        }

        fn ensure_unique(users: &HashMap<UserId, User>, user: &User) -> Result<(), PortError> {
            for other in users.values().filter(|u| u.id != user.id) {
                if other.username == user.username {
                    return Err(PortError::conflict(format!(
                        "duplicate username {}",
                        user.username
                    )));
                }
                if other.email == user.email {
                    return Err(PortError::conflict(format!("duplicate email {}", user.email)));
                }
            }
            Ok(())
        }
    }

    impl DomainPort for MockUserPort {}

    #[async_trait]
    impl HealthCheckable for MockUserPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-user-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl UserPort for MockUserPort {
        async fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.users
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, PortError> {
            Ok(self
                .users
                .read()
                .await
                .values()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
            Ok(self
                .users
                .read()
                .await
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn list_users(&self) -> Result<Vec<User>, PortError> {
            let mut users: Vec<_> = self.users.read().await.values().cloned().collect();
            users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(users)
        }

        async fn count_users(&self) -> Result<u64, PortError> {
            Ok(self.users.read().await.len() as u64)
        }

        async fn create_user(&self, user: User) -> Result<User, PortError> {
            let mut users = self.users.write().await;
            Self::ensure_unique(&users, &user)?;
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn update_user(&self, user: User) -> Result<User, PortError> {
            let mut users = self.users.write().await;
            if !users.contains_key(&user.id) {
                return Err(PortError::not_found("User", user.id));
            }
            Self::ensure_unique(&users, &user)?;
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn delete_user(&self, id: UserId) -> Result<(), PortError> {
            self.users
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("User", id))
        }
    }
}

//! Client Domain Ports
//!
//! Port interfaces for client storage. Two adapters implement them:
//!
//! - **PostgreSQL adapter**: `infra_db::adapters::PostgresClientAdapter`
//! - **Mock adapter**: in-memory, for tests (feature `mock`)
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_party::ports::ClientPort;
//! use std::sync::Arc;
//!
//! pub struct ClientService {
//!     clients: Arc<dyn ClientPort>,
//! }
//!
//! impl ClientService {
//!     pub async fn get(&self, id: ClientId) -> Result<Client, PortError> {
//!         self.clients.get_client(id).await
//!     }
//! }
//! ```

use async_trait::async_trait;

use core_kernel::{ClientId, DomainPort, HealthCheckable, Page, PortError};

use crate::client::{Client, ClientQuery};

/// Storage operations for clients
///
/// Adapters must enforce uniqueness of the cédula and report a violation as
/// `PortError::Conflict`.
#[async_trait]
pub trait ClientPort: DomainPort + HealthCheckable {
    /// Retrieves a client by ID, active or not
    ///
    /// # Returns
    ///
    /// The client if found, or `PortError::NotFound`
    async fn get_client(&self, id: ClientId) -> Result<Client, PortError>;

    /// Finds the client holding the given identity document
    async fn find_by_cedula(&self, cedula: &str) -> Result<Option<Client>, PortError>;

    /// Lists active clients matching the query, newest first
    async fn list_clients(&self, query: ClientQuery) -> Result<Page<Client>, PortError>;

    /// Inserts a new client
    async fn create_client(&self, client: Client) -> Result<Client, PortError>;

    /// Persists all mutable fields of an existing client
    async fn update_client(&self, client: Client) -> Result<Client, PortError>;

    /// Permanently removes a client
    async fn delete_client(&self, id: ClientId) -> Result<(), PortError>;
}

/// Lookup of policies that reference a client
///
/// Implemented by the policy storage so that client deletion can be guarded
/// without this crate depending on the policy domain.
#[async_trait]
pub trait PolicyReferences: DomainPort {
    /// Number of policies, in any status, owned by the client
    async fn count_policies_for_client(&self, id: ClientId) -> Result<u64, PortError>;
}

/// In-memory implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of ClientPort
    #[derive(Debug, Default)]
    pub struct MockClientPort {
        clients: Arc<RwLock<HashMap<ClientId, Client>>>,
    }

    impl MockClientPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with clients for testing
        pub async fn with_clients(clients: Vec<Client>) -> Self {
            let port = Self::new();
            for client in clients {
                port.clients.write().await.insert(client.id, client);
            }
            port
        }

        /// Snapshot of every stored client, newest first
        pub async fn all(&self) -> Vec<Client> {
            let mut clients: Vec<_> = self.clients.read().await.values().cloned().collect();
            clients.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            clients
        }

        fn ensure_unique(
            clients: &HashMap<ClientId, Client>,
            client: &Client,
        ) -> Result<(), PortError> {
            if clients
                .values()
                .any(|c| c.id != client.id && c.cedula == client.cedula)
            {
                return Err(PortError::conflict(format!(
                    "duplicate cedula {}",
                    client.cedula
                )));
            }
            Ok(())
        }
    }

    impl DomainPort for MockClientPort {}

    #[async_trait]
    impl HealthCheckable for MockClientPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-client-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ClientPort for MockClientPort {
        async fn get_client(&self, id: ClientId) -> Result<Client, PortError> {
            self.clients
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Client", id))
        }

        async fn find_by_cedula(&self, cedula: &str) -> Result<Option<Client>, PortError> {
            Ok(self
                .clients
                .read()
                .await
                .values()
                .find(|c| c.cedula == cedula)
                .cloned())
        }

        async fn list_clients(&self, query: ClientQuery) -> Result<Page<Client>, PortError> {
            let matching: Vec<_> = self
                .all()
                .await
                .into_iter()
                .filter(|c| c.is_active && query.matches(c))
                .collect();
            Ok(Page::from_vec(matching, query.page))
        }

        async fn create_client(&self, client: Client) -> Result<Client, PortError> {
            let mut clients = self.clients.write().await;
            Self::ensure_unique(&clients, &client)?;
            clients.insert(client.id, client.clone());
            Ok(client)
        }

        async fn update_client(&self, client: Client) -> Result<Client, PortError> {
            let mut clients = self.clients.write().await;
            if !clients.contains_key(&client.id) {
                return Err(PortError::not_found("Client", client.id));
            }
            Self::ensure_unique(&clients, &client)?;
            clients.insert(client.id, client.clone());
            Ok(client)
        }

        async fn delete_client(&self, id: ClientId) -> Result<(), PortError> {
            self.clients
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Client", id))
        }
    }

    /// Policy reference counts keyed by client
    #[derive(Debug, Default)]
    pub struct MockPolicyReferences {
        counts: RwLock<HashMap<ClientId, u64>>,
    }

    impl MockPolicyReferences {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn set_count(&self, id: ClientId, count: u64) {
            self.counts.write().await.insert(id, count);
        }
    }

    impl DomainPort for MockPolicyReferences {}

    #[async_trait]
    impl PolicyReferences for MockPolicyReferences {
        async fn count_policies_for_client(&self, id: ClientId) -> Result<u64, PortError> {
            Ok(self.counts.read().await.get(&id).copied().unwrap_or(0))
        }
    }
}

//! Client domain services
//!
//! Orchestrates validation, uniqueness checks and the policy-reference guard
//! on top of the storage ports.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use core_kernel::{ClientId, Page, PortError};

use crate::client::{Client, ClientQuery, ClientUpdate, NewClient};
use crate::error::ClientError;
use crate::ports::{ClientPort, PolicyReferences};
use crate::validation::ClientValidator;

/// Service for managing client records
pub struct ClientService {
    clients: Arc<dyn ClientPort>,
    policies: Arc<dyn PolicyReferences>,
}

impl ClientService {
    /// Creates a new client service
    pub fn new(clients: Arc<dyn ClientPort>, policies: Arc<dyn PolicyReferences>) -> Self {
        Self { clients, policies }
    }

    /// Lists active clients, newest first
    pub async fn list(&self, query: ClientQuery) -> Result<Page<Client>, ClientError> {
        Ok(self.clients.list_clients(query).await?)
    }

    /// Fetches a client regardless of its active flag
    pub async fn get(&self, id: ClientId) -> Result<Client, ClientError> {
        self.clients
            .get_client(id)
            .await
            .map_err(|e| not_found_as(e, id))
    }

    /// Registers a new client
    ///
    /// # Errors
    ///
    /// - `ClientError::Validation` if required fields are missing or malformed
    /// - `ClientError::DuplicateCedula` if the cédula is already registered
    pub async fn create(&self, data: NewClient) -> Result<Client, ClientError> {
        let data = data.normalized();
        ClientValidator::validate_new(&data).into_result()?;

        if self.clients.find_by_cedula(&data.cedula).await?.is_some() {
            return Err(ClientError::DuplicateCedula(data.cedula));
        }

        let cedula = data.cedula.clone();
        let client = Client::from_new(ClientId::new(), data, Utc::now());
        let created = self
            .clients
            .create_client(client)
            .await
            .map_err(|e| conflict_as_duplicate(ClientError::Port(e), &cedula))?;

        info!(client_id = %created.id, cedula = %created.cedula, "Client registered");
        Ok(created)
    }

    /// Applies a partial update to a client
    pub async fn update(&self, id: ClientId, update: ClientUpdate) -> Result<Client, ClientError> {
        let update = update.normalized();
        ClientValidator::validate_update(&update).into_result()?;

        let mut client = self.get(id).await?;

        if let Some(cedula) = update.cedula.as_deref() {
            if cedula != client.cedula {
                if let Some(holder) = self.clients.find_by_cedula(cedula).await? {
                    if holder.id != id {
                        return Err(ClientError::DuplicateCedula(cedula.to_string()));
                    }
                }
            }
        }

        client.apply(update, Utc::now());
        let cedula = client.cedula.clone();
        let updated = self
            .clients
            .update_client(client)
            .await
            .map_err(|e| conflict_as_duplicate(not_found_as(e, id), &cedula))?;

        debug!(client_id = %id, "Client updated");
        Ok(updated)
    }

    /// Permanently deletes a client that owns no policies
    ///
    /// # Errors
    ///
    /// - `ClientError::NotFound` if the client does not exist
    /// - `ClientError::HasPolicies` if any policy still references the client
    pub async fn delete(&self, id: ClientId) -> Result<(), ClientError> {
        self.get(id).await?;

        let count = self.policies.count_policies_for_client(id).await?;
        if count > 0 {
            return Err(ClientError::HasPolicies { count });
        }

        self.clients
            .delete_client(id)
            .await
            .map_err(|e| not_found_as(e, id))?;

        info!(client_id = %id, "Client deleted");
        Ok(())
    }
}

fn not_found_as(error: PortError, id: ClientId) -> ClientError {
    if error.is_not_found() {
        ClientError::NotFound(id)
    } else {
        ClientError::Port(error)
    }
}

fn conflict_as_duplicate(error: ClientError, cedula: &str) -> ClientError {
    match error {
        ClientError::Port(e) if e.is_conflict() => ClientError::DuplicateCedula(cedula.to_string()),
        other => other,
    }
}

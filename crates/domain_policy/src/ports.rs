//! Policy Domain Ports
//!
//! Port interfaces for policy, coverage and dashboard storage.
//!
//! # Architecture
//!
//! - **PostgreSQL adapters**: `infra_db::adapters` (policy numbers are
//!   allocated inside the insert transaction)
//! - **Mock adapters**: in-memory, for tests (feature `mock`)
//!
//! Policy adapters also implement `domain_party::PolicyReferences` so that
//! client deletion can be guarded.

use async_trait::async_trait;

use core_kernel::{ClientId, CoverageId, DomainPort, HealthCheckable, Page, PolicyId, PortError};

use crate::coverage::Coverage;
use crate::policy::{PendingPolicy, Policy, PolicyQuery, PolicyWithClient};
use crate::stats::DashboardStats;

/// Storage operations for policies
#[async_trait]
pub trait PolicyPort: DomainPort + HealthCheckable {
    /// Retrieves a policy with its owner's display data
    async fn get_policy(&self, id: PolicyId) -> Result<PolicyWithClient, PortError>;

    /// Lists policies matching the query, newest first
    async fn list_policies(&self, query: PolicyQuery) -> Result<Page<PolicyWithClient>, PortError>;

    /// All policies of one client, newest first
    async fn list_for_client(&self, client_id: ClientId) -> Result<Vec<Policy>, PortError>;

    /// Allocates the next policy number and inserts the policy
    ///
    /// The increment and the insert must be atomic: concurrent calls never
    /// share or skip a number.
    async fn issue_policy(&self, pending: PendingPolicy) -> Result<Policy, PortError>;

    /// Persists the mutable fields of an existing policy
    async fn update_policy(&self, policy: Policy) -> Result<Policy, PortError>;

    /// Permanently removes a policy
    async fn delete_policy(&self, id: PolicyId) -> Result<(), PortError>;

    /// Number of policies whose coverage name equals `name`
    async fn count_by_coverage(&self, name: &str) -> Result<u64, PortError>;

    /// Most recently created policy whose number ends with `fragment`
    async fn find_by_number_suffix(
        &self,
        fragment: &str,
    ) -> Result<Option<PolicyWithClient>, PortError>;
}

/// Storage operations for the coverage catalog
///
/// Adapters must enforce uniqueness of the name and report a violation as
/// `PortError::Conflict`.
#[async_trait]
pub trait CoveragePort: DomainPort + HealthCheckable {
    async fn get_coverage(&self, id: CoverageId) -> Result<Coverage, PortError>;

    /// Finds a coverage by exact name, active or not
    async fn find_by_name(&self, name: &str) -> Result<Option<Coverage>, PortError>;

    /// Finds an active coverage by exact name
    async fn find_active_by_name(&self, name: &str) -> Result<Option<Coverage>, PortError>;

    /// Lists coverages ordered by name
    async fn list_coverages(&self, include_inactive: bool) -> Result<Vec<Coverage>, PortError>;

    async fn create_coverage(&self, coverage: Coverage) -> Result<Coverage, PortError>;

    async fn update_coverage(&self, coverage: Coverage) -> Result<Coverage, PortError>;

    async fn delete_coverage(&self, id: CoverageId) -> Result<(), PortError>;
}

/// Aggregated figures for the dashboard
#[async_trait]
pub trait StatsPort: DomainPort {
    async fn dashboard(&self) -> Result<DashboardStats, PortError>;
}

/// In-memory implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use domain_party::{ClientPort, MockClientPort, PolicyReferences};
    use rust_decimal::Decimal;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::{Mutex, RwLock};

    use crate::numbering::PolicySequence;
    use crate::policy::PolicyStatus;
    use crate::stats::{CoverageBreakdown, StatTotals, VehicleBreakdown, RECENT_LIMIT};

    fn healthy(adapter_id: &str) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some("Mock adapter always healthy".to_string()),
            checked_at: Utc::now(),
        }
    }

    /// In-memory mock implementation of PolicyPort
    ///
    /// Joins client data from a shared `MockClientPort`.
    #[derive(Debug)]
    pub struct MockPolicyPort {
        policies: RwLock<HashMap<PolicyId, Policy>>,
        sequence: Mutex<PolicySequence>,
        clients: Arc<MockClientPort>,
    }

    impl MockPolicyPort {
        pub fn new(clients: Arc<MockClientPort>) -> Self {
            Self {
                policies: RwLock::new(HashMap::new()),
                sequence: Mutex::new(PolicySequence::new()),
                clients,
            }
        }

        /// Pre-populates with already numbered policies
        pub async fn with_policies(clients: Arc<MockClientPort>, policies: Vec<Policy>) -> Self {
            let port = Self::new(clients);
            {
                let mut stored = port.policies.write().await;
                for policy in policies {
                    stored.insert(policy.id, policy);
                }
            }
            port
        }

        /// Every policy joined with its client, newest first
        pub async fn all_rows(&self) -> Vec<PolicyWithClient> {
            let mut policies: Vec<Policy> = self.policies.read().await.values().cloned().collect();
            policies.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

            let mut rows = Vec::with_capacity(policies.len());
            for policy in policies {
                if let Ok(client) = self.clients.get_client(policy.client_id).await {
                    rows.push(PolicyWithClient::new(policy, &client));
                }
            }
            rows
        }
    }

    impl DomainPort for MockPolicyPort {}

    #[async_trait]
    impl HealthCheckable for MockPolicyPort {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("mock-policy-port")
        }
    }

    #[async_trait]
    impl PolicyPort for MockPolicyPort {
        async fn get_policy(&self, id: PolicyId) -> Result<PolicyWithClient, PortError> {
            let policy = self
                .policies
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Policy", id))?;
            let client = self.clients.get_client(policy.client_id).await?;
            Ok(PolicyWithClient::new(policy, &client))
        }

        async fn list_policies(
            &self,
            query: PolicyQuery,
        ) -> Result<Page<PolicyWithClient>, PortError> {
            let rows: Vec<_> = self
                .all_rows()
                .await
                .into_iter()
                .filter(|row| query.matches(row))
                .collect();
            Ok(Page::from_vec(rows, query.page))
        }

        async fn list_for_client(&self, client_id: ClientId) -> Result<Vec<Policy>, PortError> {
            Ok(self
                .all_rows()
                .await
                .into_iter()
                .map(|row| row.policy)
                .filter(|policy| policy.client_id == client_id)
                .collect())
        }

        async fn issue_policy(&self, pending: PendingPolicy) -> Result<Policy, PortError> {
            let mut policies = self.policies.write().await;
            let mut sequence = self.sequence.lock().await;
            let number = sequence.next(policies.values().map(|p| p.policy_number.as_str()));

            if policies.values().any(|p| p.policy_number == number) {
                return Err(PortError::conflict(format!("duplicate policy number {number}")));
            }
            let policy = Policy::issue(pending, number);
            policies.insert(policy.id, policy.clone());
            Ok(policy)
        }

        async fn update_policy(&self, policy: Policy) -> Result<Policy, PortError> {
            let mut policies = self.policies.write().await;
            if !policies.contains_key(&policy.id) {
                return Err(PortError::not_found("Policy", policy.id));
            }
            policies.insert(policy.id, policy.clone());
            Ok(policy)
        }

        async fn delete_policy(&self, id: PolicyId) -> Result<(), PortError> {
            self.policies
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Policy", id))
        }

        async fn count_by_coverage(&self, name: &str) -> Result<u64, PortError> {
            Ok(self
                .policies
                .read()
                .await
                .values()
                .filter(|p| p.coverage_name == name)
                .count() as u64)
        }

        async fn find_by_number_suffix(
            &self,
            fragment: &str,
        ) -> Result<Option<PolicyWithClient>, PortError> {
            Ok(self
                .all_rows()
                .await
                .into_iter()
                .find(|row| row.policy.policy_number.ends_with(fragment)))
        }
    }

    #[async_trait]
    impl PolicyReferences for MockPolicyPort {
        async fn count_policies_for_client(&self, id: ClientId) -> Result<u64, PortError> {
            Ok(self
                .policies
                .read()
                .await
                .values()
                .filter(|p| p.client_id == id)
                .count() as u64)
        }
    }

    /// In-memory mock implementation of CoveragePort
    #[derive(Debug, Default)]
    pub struct MockCoveragePort {
        coverages: RwLock<HashMap<CoverageId, Coverage>>,
    }

    impl MockCoveragePort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_coverages(coverages: Vec<Coverage>) -> Self {
            let port = Self::new();
            {
                let mut stored = port.coverages.write().await;
                for coverage in coverages {
                    stored.insert(coverage.id, coverage);
                }
            }
            port
        }

        fn ensure_unique(
            coverages: &HashMap<CoverageId, Coverage>,
            coverage: &Coverage,
        ) -> Result<(), PortError> {
            if coverages
                .values()
                .any(|c| c.id != coverage.id && c.name == coverage.name)
            {
                return Err(PortError::conflict(format!(
                    "duplicate coverage name {}",
                    coverage.name
                )));
            }
            Ok(())
        }
    }

    impl DomainPort for MockCoveragePort {}

    #[async_trait]
    impl HealthCheckable for MockCoveragePort {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("mock-coverage-port")
        }
    }

    #[async_trait]
    impl CoveragePort for MockCoveragePort {
        async fn get_coverage(&self, id: CoverageId) -> Result<Coverage, PortError> {
            self.coverages
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Coverage", id))
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Coverage>, PortError> {
            Ok(self
                .coverages
                .read()
                .await
                .values()
                .find(|c| c.name == name)
                .cloned())
        }

        async fn find_active_by_name(&self, name: &str) -> Result<Option<Coverage>, PortError> {
            Ok(self.find_by_name(name).await?.filter(|c| c.is_active))
        }

        async fn list_coverages(&self, include_inactive: bool) -> Result<Vec<Coverage>, PortError> {
            let mut coverages: Vec<_> = self
                .coverages
                .read()
                .await
                .values()
                .filter(|c| include_inactive || c.is_active)
                .cloned()
                .collect();
            coverages.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(coverages)
        }

        async fn create_coverage(&self, coverage: Coverage) -> Result<Coverage, PortError> {
            let mut coverages = self.coverages.write().await;
            Self::ensure_unique(&coverages, &coverage)?;
            coverages.insert(coverage.id, coverage.clone());
            Ok(coverage)
        }

        async fn update_coverage(&self, coverage: Coverage) -> Result<Coverage, PortError> {
            let mut coverages = self.coverages.write().await;
            if !coverages.contains_key(&coverage.id) {
                return Err(PortError::not_found("Coverage", coverage.id));
            }
            Self::ensure_unique(&coverages, &coverage)?;
            coverages.insert(coverage.id, coverage.clone());
            Ok(coverage)
        }

        async fn delete_coverage(&self, id: CoverageId) -> Result<(), PortError> {
            self.coverages
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Coverage", id))
        }
    }

    /// Dashboard figures computed from the other mocks
    #[derive(Debug)]
    pub struct MockStatsPort {
        policies: Arc<MockPolicyPort>,
        clients: Arc<MockClientPort>,
        active_users: AtomicU64,
    }

    impl MockStatsPort {
        pub fn new(policies: Arc<MockPolicyPort>, clients: Arc<MockClientPort>) -> Self {
            Self {
                policies,
                clients,
                active_users: AtomicU64::new(0),
            }
        }

        pub fn set_active_users(&self, count: u64) {
            self.active_users.store(count, Ordering::Relaxed);
        }
    }

    impl DomainPort for MockStatsPort {}

    #[async_trait]
    impl StatsPort for MockStatsPort {
        async fn dashboard(&self) -> Result<DashboardStats, PortError> {
            let clients: Vec<_> = self
                .clients
                .all()
                .await
                .into_iter()
                .filter(|c| c.is_active)
                .collect();
            let rows = self.policies.all_rows().await;

            let count_status = |status: PolicyStatus| {
                rows.iter().filter(|r| r.policy.status == status).count() as u64
            };
            let active: Vec<_> = rows
                .iter()
                .filter(|r| r.policy.status == PolicyStatus::Activa)
                .map(|r| &r.policy)
                .collect();

            let mut by_coverage: BTreeMap<String, (u64, Decimal)> = BTreeMap::new();
            let mut by_vehicle: BTreeMap<&'static str, VehicleBreakdown> = BTreeMap::new();
            for policy in &active {
                let entry = by_coverage
                    .entry(policy.coverage_name.clone())
                    .or_insert((0, Decimal::ZERO));
                entry.0 += 1;
                entry.1 += policy.premium;

                let vehicle_type = policy.vehicle.vehicle_type;
                by_vehicle
                    .entry(vehicle_type.as_str())
                    .or_insert(VehicleBreakdown {
                        vehicle_type,
                        count: 0,
                    })
                    .count += 1;
            }

            Ok(DashboardStats {
                stats: StatTotals {
                    total_clients: clients.len() as u64,
                    total_policies: rows.len() as u64,
                    active_policies: active.len() as u64,
                    pending_policies: count_status(PolicyStatus::Pendiente),
                    expired_policies: count_status(PolicyStatus::Vencida),
                    total_users: self.active_users.load(Ordering::Relaxed),
                    total_premiums: active.iter().map(|p| p.premium).sum(),
                    total_amounts: active.iter().map(|p| p.amount).sum(),
                },
                recent_clients: clients.into_iter().take(RECENT_LIMIT).collect(),
                recent_policies: rows.iter().take(RECENT_LIMIT).cloned().collect(),
                by_coverage: by_coverage
                    .into_iter()
                    .map(|(coverage_name, (count, total_premiums))| CoverageBreakdown {
                        coverage_name,
                        count,
                        total_premiums,
                    })
                    .collect(),
                by_vehicle: by_vehicle.into_values().collect(),
            })
        }
    }
}

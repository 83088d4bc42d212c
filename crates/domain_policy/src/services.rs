//! Policy domain services
//!
//! Orchestrate the lifecycle operations over the storage ports:
//!
//! - `PolicyService`: issue, update, renew, delete, list and verify policies
//! - `CoverageService`: maintain the coverage catalog and expose its pricing

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use core_kernel::{ClientId, CoverageId, Page, PolicyId, PortError, UserId};
use domain_party::ClientPort;

use crate::coverage::{Coverage, CoverageUpdate, NewCoverage};
use crate::error::PolicyError;
use crate::policy::{
    NewPolicy, Policy, PolicyQuery, PolicyUpdate, PolicyVerification, PolicyWithClient,
};
use crate::ports::{CoveragePort, PolicyPort};
use crate::pricing::{CoveragePricing, Pricing, PricingResolver};

/// Service for the policy lifecycle
pub struct PolicyService {
    policies: Arc<dyn PolicyPort>,
    coverages: Arc<dyn CoveragePort>,
    clients: Arc<dyn ClientPort>,
    pricing: PricingResolver,
}

impl PolicyService {
    pub fn new(
        policies: Arc<dyn PolicyPort>,
        coverages: Arc<dyn CoveragePort>,
        clients: Arc<dyn ClientPort>,
    ) -> Self {
        Self {
            policies,
            pricing: PricingResolver::new(coverages.clone()),
            coverages,
            clients,
        }
    }

    pub async fn list(&self, query: PolicyQuery) -> Result<Page<PolicyWithClient>, PolicyError> {
        Ok(self.policies.list_policies(query).await?)
    }

    pub async fn get(&self, id: PolicyId) -> Result<PolicyWithClient, PolicyError> {
        self.policies
            .get_policy(id)
            .await
            .map_err(|e| not_found_as(e, PolicyError::NotFound(id)))
    }

    /// Policies owned by one client, newest first
    pub async fn list_for_client(&self, client_id: ClientId) -> Result<Vec<Policy>, PolicyError> {
        Ok(self.policies.list_for_client(client_id).await?)
    }

    /// Issues a new policy
    ///
    /// The policy is numbered from the persistent sequence, priced from the
    /// named coverage (zero if it does not resolve) and starts `activa`.
    ///
    /// # Errors
    ///
    /// - `PolicyError::Validation` / `PolicyError::Temporal` for bad input
    /// - `PolicyError::ClientNotFound` if the client is unknown or inactive
    pub async fn create(
        &self,
        data: NewPolicy,
        created_by: Option<UserId>,
    ) -> Result<Policy, PolicyError> {
        let checked = data.clone().check()?;

        let client = self
            .clients
            .get_client(checked.client_id)
            .await
            .map_err(|e| not_found_as(e, PolicyError::ClientNotFound(checked.client_id)))?;
        if !client.is_active {
            return Err(PolicyError::ClientNotFound(client.id));
        }

        let pricing = self.pricing.resolve(&checked.coverage_name).await?;
        let pending = data.into_pending(&pricing, created_by, Utc::now())?;
        let policy = self.policies.issue_policy(pending).await?;

        info!(
            policy_number = %policy.policy_number,
            client_id = %policy.client_id,
            coverage = %policy.coverage_name,
            premium = %policy.premium,
            "Policy issued"
        );
        Ok(policy)
    }

    /// Updates status, notes, coverage name and end date
    pub async fn update(&self, id: PolicyId, update: PolicyUpdate) -> Result<Policy, PolicyError> {
        let update = update.normalized();
        let mut policy = self.get(id).await?.policy;

        let pricing = match update.coverage_name.as_deref() {
            Some(name) if name != policy.coverage_name => Some(self.pricing.resolve(name).await?),
            _ => None,
        };
        policy.apply(update, pricing, Utc::now())?;

        let updated = self
            .policies
            .update_policy(policy)
            .await
            .map_err(|e| not_found_as(e, PolicyError::NotFound(id)))?;
        info!(policy_number = %updated.policy_number, status = %updated.status, "Policy updated");
        Ok(updated)
    }

    /// Renews a policy for one calendar year starting `today`
    ///
    /// `today` is the current date in the agency's timezone.
    pub async fn renew(&self, id: PolicyId, today: NaiveDate) -> Result<Policy, PolicyError> {
        let mut policy = self.get(id).await?.policy;
        let previous_status = policy.status;

        let pricing = self.pricing.resolve(&policy.coverage_name).await?;
        if pricing.premium.is_zero() {
            warn!(
                policy_number = %policy.policy_number,
                coverage = %policy.coverage_name,
                "Coverage no longer prices, keeping previous premium"
            );
        }
        policy.renew(today, &pricing, Utc::now())?;

        let renewed = self
            .policies
            .update_policy(policy)
            .await
            .map_err(|e| not_found_as(e, PolicyError::NotFound(id)))?;
        info!(
            policy_number = %renewed.policy_number,
            previous_status = %previous_status,
            end_date = %renewed.end_date,
            "Policy renewed"
        );
        Ok(renewed)
    }

    pub async fn delete(&self, id: PolicyId) -> Result<(), PolicyError> {
        self.policies
            .delete_policy(id)
            .await
            .map_err(|e| not_found_as(e, PolicyError::NotFound(id)))?;
        info!(policy_id = %id, "Policy deleted");
        Ok(())
    }

    /// Pricing of every active coverage, keyed by name
    pub async fn pricing_config(&self) -> Result<BTreeMap<String, CoveragePricing>, PolicyError> {
        Ok(self
            .coverages
            .list_coverages(false)
            .await?
            .iter()
            .map(|coverage| (coverage.name.clone(), CoveragePricing::from(coverage)))
            .collect())
    }

    /// Public lookup by the trailing digits of a policy number
    pub async fn verify(&self, fragment: &str) -> Result<PolicyVerification, PolicyError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Err(PolicyError::validation("policy number is required"));
        }
        self.policies
            .find_by_number_suffix(fragment)
            .await?
            .map(PolicyVerification::from)
            .ok_or_else(|| PolicyError::NumberNotFound(fragment.to_string()))
    }
}

/// Service for the coverage catalog
pub struct CoverageService {
    coverages: Arc<dyn CoveragePort>,
    policies: Arc<dyn PolicyPort>,
}

impl CoverageService {
    pub fn new(coverages: Arc<dyn CoveragePort>, policies: Arc<dyn PolicyPort>) -> Self {
        Self { coverages, policies }
    }

    /// Lists coverages by name; inactive ones only on request
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Coverage>, PolicyError> {
        Ok(self.coverages.list_coverages(include_inactive).await?)
    }

    pub async fn get(&self, id: CoverageId) -> Result<Coverage, PolicyError> {
        self.coverages
            .get_coverage(id)
            .await
            .map_err(|e| not_found_as(e, PolicyError::CoverageNotFound(id)))
    }

    /// Pricing of the active coverage with this exact name
    pub async fn pricing(&self, name: &str) -> Result<(Coverage, Pricing), PolicyError> {
        let coverage = self
            .coverages
            .find_active_by_name(name)
            .await?
            .ok_or_else(|| PolicyError::CoverageNameNotFound(name.to_string()))?;
        let pricing = Pricing::of(&coverage);
        Ok((coverage, pricing))
    }

    pub async fn create(&self, data: NewCoverage) -> Result<Coverage, PolicyError> {
        let coverage = Coverage::from_new(CoverageId::new(), data, Utc::now())?;

        if self.coverages.find_by_name(&coverage.name).await?.is_some() {
            return Err(PolicyError::DuplicateCoverage(coverage.name));
        }
        let name = coverage.name.clone();
        let created = self
            .coverages
            .create_coverage(coverage)
            .await
            .map_err(|e| conflict_as(e, PolicyError::DuplicateCoverage(name)))?;

        info!(coverage = %created.name, premium = %created.premium, "Coverage created");
        Ok(created)
    }

    /// Updates a coverage; renaming does not touch existing policies
    pub async fn update(&self, id: CoverageId, update: CoverageUpdate) -> Result<Coverage, PolicyError> {
        let mut coverage = self.get(id).await?;

        if let Some(new_name) = update.renames_to(&coverage.name) {
            if let Some(other) = self.coverages.find_by_name(new_name).await? {
                if other.id != id {
                    return Err(PolicyError::DuplicateCoverage(new_name.to_string()));
                }
            }
            warn!(
                from = %coverage.name,
                to = new_name,
                "Coverage renamed, existing policies keep the old name"
            );
        }

        coverage.apply(update, Utc::now())?;
        let name = coverage.name.clone();
        self.coverages
            .update_coverage(coverage)
            .await
            .map_err(|e| conflict_as(not_found_port(e, id), PolicyError::DuplicateCoverage(name)))
    }

    /// Deletes a coverage that no policy refers to by name
    pub async fn delete(&self, id: CoverageId) -> Result<(), PolicyError> {
        let coverage = self.get(id).await?;

        let count = self.policies.count_by_coverage(&coverage.name).await?;
        if count > 0 {
            return Err(PolicyError::CoverageInUse {
                name: coverage.name,
                count,
            });
        }

        self.coverages
            .delete_coverage(id)
            .await
            .map_err(|e| not_found_as(e, PolicyError::CoverageNotFound(id)))?;
        info!(coverage = %coverage.name, "Coverage deleted");
        Ok(())
    }
}

fn not_found_as(error: PortError, mapped: PolicyError) -> PolicyError {
    if error.is_not_found() {
        mapped
    } else {
        PolicyError::Port(error)
    }
}

fn not_found_port(error: PortError, id: CoverageId) -> PolicyError {
    not_found_as(error, PolicyError::CoverageNotFound(id))
}

fn conflict_as(error: impl Into<PolicyError>, mapped: PolicyError) -> PolicyError {
    match error.into() {
        PolicyError::Port(e) if e.is_conflict() => mapped,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageSlot;
    use crate::policy::{PolicyStatus, VehicleType};
    use crate::ports::mock::{MockCoveragePort, MockPolicyPort};
    use domain_party::{Client, MockClientPort, NewClient};
    use rust_decimal_macros::dec;

    struct Fixture {
        policies: PolicyService,
        coverages: CoverageService,
        client: Client,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn fixture() -> Fixture {
        let client = Client::from_new(
            ClientId::new(),
            NewClient::new("V-12345678", "Ana", "Pérez"),
            Utc::now(),
        );
        let mut inactive = Client::from_new(
            ClientId::new(),
            NewClient::new("V-999", "Inés", "Baja"),
            Utc::now(),
        );
        inactive.is_active = false;

        let clients = Arc::new(MockClientPort::with_clients(vec![client.clone(), inactive]).await);
        let policy_port = Arc::new(MockPolicyPort::new(clients.clone()));
        let coverage_port = Arc::new(MockCoveragePort::new());

        let coverages = CoverageService::new(coverage_port.clone(), policy_port.clone());
        coverages
            .create(NewCoverage {
                name: "Básica".into(),
                premium: Some(dec!(40)),
                slots: vec![
                    CoverageSlot::new("Daño", dec!(500)),
                    CoverageSlot::default(),
                    CoverageSlot::new("Robo", dec!(1200)),
                ],
                ..Default::default()
            })
            .await
            .unwrap();

        Fixture {
            policies: PolicyService::new(policy_port, coverage_port, clients),
            coverages,
            client,
        }
    }

    fn new_policy(client_id: ClientId, coverage: &str) -> NewPolicy {
        NewPolicy {
            client_id: Some(client_id),
            vehicle_type: Some(VehicleType::Moto),
            plate: "ab12cd".into(),
            brand: "Yamaha".into(),
            model: "YBR".into(),
            year: Some(2020),
            coverage_name: coverage.into(),
            start_date: Some(date(2024, 3, 1)),
            end_date: Some(date(2025, 3, 1)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sequential_numbers() {
        let f = fixture().await;
        let mut previous = String::new();
        for i in 1..=5u64 {
            let policy = f
                .policies
                .create(new_policy(f.client.id, "Básica"), None)
                .await
                .unwrap();
            assert_eq!(policy.policy_number, format!("{i:08}"));
            assert!(policy.policy_number > previous);
            previous = policy.policy_number;
        }
    }

    #[tokio::test]
    async fn test_create_prices_from_coverage() {
        let f = fixture().await;
        let user = UserId::new();
        let policy = f
            .policies
            .create(new_policy(f.client.id, "Básica"), Some(user))
            .await
            .unwrap();

        assert_eq!(policy.premium, dec!(40));
        assert_eq!(policy.amount, dec!(1700));
        assert_eq!(policy.status, PolicyStatus::Activa);
        assert_eq!(policy.vehicle.plate, "AB12CD");
        assert_eq!(policy.created_by, Some(user));
    }

    #[tokio::test]
    async fn test_create_with_unknown_coverage_prices_zero() {
        let f = fixture().await;
        let policy = f
            .policies
            .create(new_policy(f.client.id, "Amplia"), None)
            .await
            .unwrap();
        assert!(policy.premium.is_zero());
        assert!(policy.amount.is_zero());
    }

    #[tokio::test]
    async fn test_create_requires_active_client() {
        let f = fixture().await;
        let result = f.policies.create(new_policy(ClientId::new(), "Básica"), None).await;
        assert!(matches!(result, Err(PolicyError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_pricing_for_unpriced_coverage() {
        let f = fixture().await;
        let policy = f
            .policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();

        let updated = f
            .policies
            .update(
                policy.id,
                PolicyUpdate {
                    coverage_name: Some("Amplia".into()),
                    status: Some(PolicyStatus::Cancelada),
                    notes: Some(Some("cliente solicitó baja".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.coverage_name, "Amplia");
        assert_eq!(updated.premium, dec!(40));
        assert_eq!(updated.status, PolicyStatus::Cancelada);
        assert_eq!(updated.notes.as_deref(), Some("cliente solicitó baja"));
    }

    #[tokio::test]
    async fn test_update_reprices_for_priced_coverage() {
        let f = fixture().await;
        f.coverages
            .create(NewCoverage {
                name: "Amplia".into(),
                premium: Some(dec!(80)),
                slots: vec![
                    CoverageSlot::new("Daño", dec!(600)),
                    CoverageSlot::new("Grúa", dec!(300)),
                ],
                ..Default::default()
            })
            .await
            .unwrap();
        let policy = f
            .policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();
        assert_eq!((policy.premium, policy.amount), (dec!(40), dec!(1700)));

        let updated = f
            .policies
            .update(
                policy.id,
                PolicyUpdate {
                    coverage_name: Some("Amplia".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.coverage_name, "Amplia");
        assert_eq!(updated.premium, dec!(80));
        assert_eq!(updated.amount, dec!(900));
        assert_eq!(updated.status, PolicyStatus::Activa);
    }

    #[tokio::test]
    async fn test_renew_cancelled_policy() {
        let f = fixture().await;
        let policy = f
            .policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();
        f.policies
            .update(
                policy.id,
                PolicyUpdate {
                    status: Some(PolicyStatus::Cancelada),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let renewed = f.policies.renew(policy.id, date(2026, 10, 18)).await.unwrap();
        assert_eq!(renewed.status, PolicyStatus::Activa);
        assert_eq!(renewed.start_date, date(2026, 10, 18));
        assert_eq!(renewed.end_date, date(2027, 10, 18));
        assert_eq!(renewed.policy_number, policy.policy_number);
    }

    #[tokio::test]
    async fn test_renew_uses_current_rates() {
        let f = fixture().await;
        let policy = f
            .policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();
        let coverage = f.coverages.list(false).await.unwrap().remove(0);
        f.coverages
            .update(
                coverage.id,
                CoverageUpdate {
                    premium: Some(dec!(55)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let renewed = f.policies.renew(policy.id, date(2025, 1, 10)).await.unwrap();
        assert_eq!(renewed.premium, dec!(55));
        assert_eq!(renewed.amount, dec!(1700));
    }

    #[tokio::test]
    async fn test_delete_policy() {
        let f = fixture().await;
        let policy = f
            .policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();

        f.policies.delete(policy.id).await.unwrap();
        assert!(matches!(
            f.policies.get(policy.id).await,
            Err(PolicyError::NotFound(_))
        ));
        assert!(matches!(
            f.policies.delete(policy.id).await,
            Err(PolicyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_joins_client() {
        let f = fixture().await;
        let first = f
            .policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();
        let second = f
            .policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();
        f.policies
            .update(
                first.id,
                PolicyUpdate {
                    status: Some(PolicyStatus::Vencida),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let page = f
            .policies
            .list(PolicyQuery {
                status: Some(PolicyStatus::Activa),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].policy.id, second.id);
        assert_eq!(page.items[0].client_name, "Ana Pérez");

        let page = f
            .policies
            .list(PolicyQuery {
                search: Some("12345678".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_verify_by_suffix() {
        let f = fixture().await;
        f.policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();

        let found = f.policies.verify("0001").await.unwrap();
        assert_eq!(found.policy_number, "00000001");
        assert_eq!(found.client_cedula, "V-12345678");

        assert!(matches!(
            f.policies.verify("  ").await,
            Err(PolicyError::Validation(_))
        ));
        assert!(matches!(
            f.policies.verify("4242").await,
            Err(PolicyError::NumberNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_pricing_config_lists_active() {
        let f = fixture().await;
        let config = f.policies.pricing_config().await.unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config["Básica"].amount, dec!(1700));
        assert_eq!(config["Básica"].items.len(), 2);
    }

    #[tokio::test]
    async fn test_coverage_delete_guarded_by_policies() {
        let f = fixture().await;
        let coverage = f.coverages.list(false).await.unwrap().remove(0);
        let policy = f
            .policies
            .create(new_policy(f.client.id, "Básica"), None)
            .await
            .unwrap();

        let result = f.coverages.delete(coverage.id).await;
        assert!(matches!(result, Err(PolicyError::CoverageInUse { count: 1, .. })));

        f.policies.delete(policy.id).await.unwrap();
        f.coverages.delete(coverage.id).await.unwrap();
        assert!(f.coverages.list(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_coverage_duplicate_name() {
        let f = fixture().await;
        let result = f
            .coverages
            .create(NewCoverage {
                name: "Básica".into(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(PolicyError::DuplicateCoverage(_))));
    }

    #[tokio::test]
    async fn test_coverage_pricing_requires_active() {
        let f = fixture().await;
        let coverage = f.coverages.list(false).await.unwrap().remove(0);
        let (_, pricing) = f.coverages.pricing("Básica").await.unwrap();
        assert_eq!(pricing.amount, dec!(1700));

        f.coverages
            .update(
                coverage.id,
                CoverageUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            f.coverages.pricing("Básica").await,
            Err(PolicyError::CoverageNameNotFound(_))
        ));
        assert_eq!(f.coverages.list(false).await.unwrap().len(), 0);
        assert_eq!(f.coverages.list(true).await.unwrap().len(), 1);
    }
}

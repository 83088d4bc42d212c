//! Vehicle policy entity
//!
//! A policy insures one vehicle of one client for a validity window.
//!
//! # Invariants
//!
//! - The policy number is unique and never changes after issuance
//! - The plate is stored upper-case
//! - Premium and insured amount are a snapshot taken at issuance or renewal;
//!   later edits of the coverage do not change them
//! - The end date never precedes the start date

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, PageRequest, PolicyId, UserId, ValidityPeriod};

use crate::error::PolicyError;
use crate::pricing::Pricing;

const MIN_VEHICLE_YEAR: i32 = 1900;
const MAX_VEHICLE_YEAR: i32 = 2100;

/// Policy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    /// In force
    Activa,
    /// Past its term
    Vencida,
    /// Cancelled by the agency
    Cancelada,
    /// Awaiting activation
    Pendiente,
}

impl PolicyStatus {
    pub const ALL: [PolicyStatus; 4] = [
        PolicyStatus::Activa,
        PolicyStatus::Vencida,
        PolicyStatus::Cancelada,
        PolicyStatus::Pendiente,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Activa => "activa",
            PolicyStatus::Vencida => "vencida",
            PolicyStatus::Cancelada => "cancelada",
            PolicyStatus::Pendiente => "pendiente",
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStatus {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PolicyError::validation(format!("unknown policy status: {s}")))
    }
}

/// Kind of insured vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Automovil,
    Camioneta,
    Moto,
    Camion,
    Bus,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Automovil,
        VehicleType::Camioneta,
        VehicleType::Moto,
        VehicleType::Camion,
        VehicleType::Bus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Automovil => "automovil",
            VehicleType::Camioneta => "camioneta",
            VehicleType::Moto => "moto",
            VehicleType::Camion => "camion",
            VehicleType::Bus => "bus",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|vt| vt.as_str() == s)
            .ok_or_else(|| PolicyError::validation(format!("unknown vehicle type: {s}")))
    }
}

/// The insured vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_type: VehicleType,
    /// Licence plate, upper-case
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub body_serial: Option<String>,
    pub engine_serial: Option<String>,
}

/// A vehicle liability policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub policy_number: String,
    pub client_id: ClientId,
    #[serde(flatten)]
    pub vehicle: Vehicle,
    /// Name of the coverage this policy was priced from
    pub coverage_name: String,
    /// Insured amount
    pub amount: Decimal,
    pub premium: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PolicyStatus,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// Completes a pending policy with its allocated number
    pub fn issue(pending: PendingPolicy, policy_number: String) -> Self {
        Self {
            id: pending.id,
            policy_number,
            client_id: pending.client_id,
            vehicle: pending.vehicle,
            coverage_name: pending.coverage_name,
            amount: pending.amount,
            premium: pending.premium,
            start_date: pending.start_date,
            end_date: pending.end_date,
            status: pending.status,
            notes: pending.notes,
            created_by: pending.created_by,
            created_at: pending.created_at,
            updated_at: pending.created_at,
        }
    }

    pub fn validity(&self) -> ValidityPeriod {
        ValidityPeriod {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Applies the mutable fields of an update
    ///
    /// `pricing` is the resolution of the new coverage name, if it changed.
    /// A zero premium keeps the previous snapshot.
    pub fn apply(
        &mut self,
        update: PolicyUpdate,
        pricing: Option<Pricing>,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        if let Some(end_date) = update.end_date {
            ValidityPeriod::new(self.start_date, end_date)?;
            self.end_date = end_date;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(coverage_name) = update.coverage_name {
            if let Some(pricing) = pricing.filter(|p| !p.premium.is_zero()) {
                self.premium = pricing.premium;
                self.amount = pricing.amount;
            }
            self.coverage_name = coverage_name;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Starts a fresh one-year term on `today` at current rates
    ///
    /// Zero figures from the resolver fall back to the previous values field
    /// by field. The status becomes `activa` whatever it was.
    pub fn renew(
        &mut self,
        today: NaiveDate,
        pricing: &Pricing,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        let term = ValidityPeriod::annual(today)?;
        self.start_date = term.start;
        self.end_date = term.end;
        if !pricing.premium.is_zero() {
            self.premium = pricing.premium;
        }
        if !pricing.amount.is_zero() {
            self.amount = pricing.amount;
        }
        self.status = PolicyStatus::Activa;
        self.updated_at = now;
        Ok(())
    }
}

/// A validated policy waiting for its number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPolicy {
    pub id: PolicyId,
    pub client_id: ClientId,
    pub vehicle: Vehicle,
    pub coverage_name: String,
    pub amount: Decimal,
    pub premium: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PolicyStatus,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Policy creation input
///
/// Fields are optional or free text so that a missing or blank value can be
/// reported as a validation error rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPolicy {
    pub client_id: Option<ClientId>,
    pub vehicle_type: Option<VehicleType>,
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub body_serial: Option<String>,
    pub engine_serial: Option<String>,
    #[serde(default)]
    pub coverage_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewPolicy {
    /// Checks required fields and ranges, then builds a pending policy
    pub fn into_pending(
        self,
        pricing: &Pricing,
        created_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<PendingPolicy, PolicyError> {
        let checked = self.check()?;
        Ok(PendingPolicy {
            id: PolicyId::new(),
            client_id: checked.client_id,
            vehicle: checked.vehicle,
            coverage_name: checked.coverage_name,
            amount: pricing.amount,
            premium: pricing.premium,
            start_date: checked.period.start,
            end_date: checked.period.end,
            status: PolicyStatus::Activa,
            notes: checked.notes,
            created_by,
            created_at: now,
        })
    }

    /// Validates required fields, the vehicle year and the validity window
    pub fn check(self) -> Result<CheckedPolicy, PolicyError> {
        let plate = self.plate.trim().to_uppercase();
        let brand = self.brand.trim().to_string();
        let model = self.model.trim().to_string();
        let coverage_name = self.coverage_name.trim().to_string();

        let (
            Some(client_id),
            Some(vehicle_type),
            Some(year),
            Some(start_date),
            Some(end_date),
        ) = (
            self.client_id,
            self.vehicle_type,
            self.year,
            self.start_date,
            self.end_date,
        )
        else {
            return Err(PolicyError::validation("all required fields must be provided"));
        };
        if plate.is_empty() || brand.is_empty() || model.is_empty() || coverage_name.is_empty() {
            return Err(PolicyError::validation("all required fields must be provided"));
        }

        if !(MIN_VEHICLE_YEAR..=MAX_VEHICLE_YEAR).contains(&year) {
            return Err(PolicyError::validation(format!(
                "vehicle year must be between {MIN_VEHICLE_YEAR} and {MAX_VEHICLE_YEAR}"
            )));
        }
        let period = ValidityPeriod::new(start_date, end_date)?;

        Ok(CheckedPolicy {
            client_id,
            vehicle: Vehicle {
                vehicle_type,
                plate,
                brand,
                model,
                year,
                color: non_blank(self.color),
                body_serial: non_blank(self.body_serial),
                engine_serial: non_blank(self.engine_serial),
            },
            coverage_name,
            period,
            notes: non_blank(self.notes),
        })
    }
}

/// Creation input after required-field and range checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedPolicy {
    pub client_id: ClientId,
    pub vehicle: Vehicle,
    pub coverage_name: String,
    pub period: ValidityPeriod,
    pub notes: Option<String>,
}

/// Mutable fields of an existing policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyUpdate {
    pub status: Option<PolicyStatus>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
    pub coverage_name: Option<String>,
    pub end_date: Option<NaiveDate>,
}

impl PolicyUpdate {
    /// Drops a blank coverage name and turns blank notes into a clear
    pub fn normalized(self) -> Self {
        Self {
            status: self.status,
            notes: self.notes.map(non_blank),
            coverage_name: self
                .coverage_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            end_date: self.end_date,
        }
    }
}

/// Filter for listing policies
#[derive(Debug, Clone, Default)]
pub struct PolicyQuery {
    pub status: Option<PolicyStatus>,
    /// Substring matched against number, plate, client names and cédula
    pub search: Option<String>,
    pub page: PageRequest,
}

impl PolicyQuery {
    /// Returns true if the row passes the status filter and search term
    pub fn matches(&self, row: &PolicyWithClient) -> bool {
        if let Some(status) = self.status {
            if row.policy.status != status {
                return false;
            }
        }
        let Some(term) = self.search.as_deref().map(str::to_lowercase) else {
            return true;
        };
        [
            row.policy.policy_number.as_str(),
            row.policy.vehicle.plate.as_str(),
            row.client_first_name.as_str(),
            row.client_last_name.as_str(),
            row.client_cedula.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// A policy joined with its owner's display data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyWithClient {
    #[serde(flatten)]
    pub policy: Policy,
    pub client_name: String,
    #[serde(skip)]
    pub client_first_name: String,
    #[serde(skip)]
    pub client_last_name: String,
    pub client_cedula: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
}

impl PolicyWithClient {
    pub fn new(policy: Policy, client: &domain_party::Client) -> Self {
        Self {
            policy,
            client_name: client.full_name(),
            client_first_name: client.first_name.clone(),
            client_last_name: client.last_name.clone(),
            client_cedula: client.cedula.clone(),
            client_phone: client.phone.clone(),
            client_email: client.email.clone(),
        }
    }
}

/// What the public verification page may show about a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyVerification {
    pub policy_number: String,
    pub status: PolicyStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub client_name: String,
    pub client_cedula: String,
    pub vehicle_type: VehicleType,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub coverage_name: String,
    pub amount: Decimal,
    pub premium: Decimal,
}

impl From<PolicyWithClient> for PolicyVerification {
    fn from(row: PolicyWithClient) -> Self {
        let policy = row.policy;
        Self {
            policy_number: policy.policy_number,
            status: policy.status,
            start_date: policy.start_date,
            end_date: policy.end_date,
            client_name: row.client_name,
            client_cedula: row.client_cedula,
            vehicle_type: policy.vehicle.vehicle_type,
            plate: policy.vehicle.plate,
            brand: policy.vehicle.brand,
            model: policy.vehicle.model,
            year: policy.vehicle.year,
            color: policy.vehicle.color,
            coverage_name: policy.coverage_name,
            amount: policy.amount,
            premium: policy.premium,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> NewPolicy {
        NewPolicy {
            client_id: Some(ClientId::new()),
            vehicle_type: Some(VehicleType::Automovil),
            plate: " ab123cd ".into(),
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: Some(2018),
            coverage_name: "Básica".into(),
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2025, 1, 1)),
            ..Default::default()
        }
    }

    fn pricing(premium: Decimal, amount: Decimal) -> Pricing {
        Pricing {
            premium,
            amount,
            items: vec![],
        }
    }

    fn issued() -> Policy {
        let pending = draft()
            .into_pending(&pricing(dec!(50), dec!(1700)), None, Utc::now())
            .unwrap();
        Policy::issue(pending, "00000001".into())
    }

    #[test]
    fn test_status_serde_values() {
        assert_eq!(serde_json::to_string(&PolicyStatus::Cancelada).unwrap(), "\"cancelada\"");
        assert_eq!("pendiente".parse::<PolicyStatus>().unwrap(), PolicyStatus::Pendiente);
        assert!("expired".parse::<PolicyStatus>().is_err());
    }

    #[test]
    fn test_vehicle_type_parse() {
        for vt in VehicleType::ALL {
            assert_eq!(vt.as_str().parse::<VehicleType>().unwrap(), vt);
        }
    }

    #[test]
    fn test_issue_uppercases_plate_and_activates() {
        let policy = issued();
        assert_eq!(policy.vehicle.plate, "AB123CD");
        assert_eq!(policy.status, PolicyStatus::Activa);
        assert_eq!(policy.amount, dec!(1700));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let result = NewPolicy {
            brand: "  ".into(),
            ..draft()
        }
        .check();
        assert!(matches!(result, Err(PolicyError::Validation(_))));

        let result = NewPolicy {
            start_date: None,
            ..draft()
        }
        .check();
        assert!(matches!(result, Err(PolicyError::Validation(_))));
    }

    #[test]
    fn test_year_and_period_ranges() {
        let result = NewPolicy {
            year: Some(1899),
            ..draft()
        }
        .check();
        assert!(matches!(result, Err(PolicyError::Validation(_))));

        let result = NewPolicy {
            end_date: Some(date(2023, 12, 31)),
            ..draft()
        }
        .check();
        assert!(matches!(result, Err(PolicyError::Temporal(_))));
    }

    #[test]
    fn test_update_keeps_pricing_on_zero_premium() {
        let mut policy = issued();
        policy
            .apply(
                PolicyUpdate {
                    coverage_name: Some("Inexistente".into()),
                    ..Default::default()
                },
                Some(Pricing::zero()),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(policy.coverage_name, "Inexistente");
        assert_eq!(policy.premium, dec!(50));
        assert_eq!(policy.amount, dec!(1700));
    }

    #[test]
    fn test_update_clears_notes() {
        let mut policy = issued();
        policy.notes = Some("pendiente de pago".into());
        policy
            .apply(
                PolicyUpdate {
                    notes: Some(None),
                    status: Some(PolicyStatus::Vencida),
                    ..Default::default()
                },
                None,
                Utc::now(),
            )
            .unwrap();
        assert_eq!(policy.notes, None);
        assert_eq!(policy.status, PolicyStatus::Vencida);
    }

    #[test]
    fn test_renew_from_cancelled() {
        let mut policy = issued();
        policy.status = PolicyStatus::Cancelada;

        policy
            .renew(date(2024, 2, 29), &pricing(dec!(60), Decimal::ZERO), Utc::now())
            .unwrap();

        assert_eq!(policy.status, PolicyStatus::Activa);
        assert_eq!(policy.start_date, date(2024, 2, 29));
        assert_eq!(policy.end_date, date(2025, 2, 28));
        assert_eq!(policy.premium, dec!(60));
        assert_eq!(policy.amount, dec!(1700));
    }

    #[test]
    fn test_policy_json_is_flat() {
        let json = serde_json::to_value(issued()).unwrap();
        assert_eq!(json["plate"], "AB123CD");
        assert_eq!(json["vehicle_type"], "automovil");
        assert_eq!(json["status"], "activa");
    }
}

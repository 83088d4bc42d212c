//! Pre-built Test Fixtures
//!
//! Fixed, predictable data for unit and integration tests. The "Básica"
//! coverage is the reference plan used throughout the suite: premium 35,
//! slots Daño 500 and Robo 1200 with an empty slot between them.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClientId, CoverageId, UserId};
use domain_access::{hash_password, Role, User};
use domain_party::{Client, NewClient};
use domain_policy::{Coverage, CoverageSlot, NewCoverage, NewPolicy, VehicleType};

/// Password shared by every fixture account
pub const FIXTURE_PASSWORD: &str = "clave-segura-123";

/// Fixture for client data
pub struct ClientFixtures;

impl ClientFixtures {
    pub fn ana_input() -> NewClient {
        NewClient {
            phone: Some("0414-5551234".to_string()),
            email: Some("ana.perez@example.com".to_string()),
            city: Some("Valencia".to_string()),
            region: Some("Carabobo".to_string()),
            ..NewClient::new("V-12345678", "Ana", "Pérez")
        }
    }

    pub fn ana() -> Client {
        Client::from_new(ClientId::new(), Self::ana_input(), TemporalFixtures::now())
    }

    pub fn luis_input() -> NewClient {
        NewClient::new("V-87654321", "Luis", "Gómez")
    }
}

/// Fixture for coverage plans
pub struct CoverageFixtures;

impl CoverageFixtures {
    pub const BASICA: &'static str = "Básica";
    pub const AMPLIA: &'static str = "Amplia";

    pub fn basica_input() -> NewCoverage {
        NewCoverage {
            name: Self::BASICA.to_string(),
            description: Some("Responsabilidad civil básica".to_string()),
            premium: Some(dec!(35)),
            slots: vec![
                CoverageSlot::new("Daño", dec!(500)),
                CoverageSlot {
                    name: None,
                    amount: Some(Decimal::ZERO),
                },
                CoverageSlot::new("Robo", dec!(1200)),
            ],
        }
    }

    /// Premium 35, insured amount 1700
    pub fn basica() -> Coverage {
        Coverage::from_new(CoverageId::new(), Self::basica_input(), TemporalFixtures::now())
            .expect("fixture coverage is valid")
    }

    pub fn amplia_input() -> NewCoverage {
        NewCoverage {
            name: Self::AMPLIA.to_string(),
            description: None,
            premium: Some(dec!(80)),
            slots: vec![
                CoverageSlot::new("Daño a cosas", dec!(2000)),
                CoverageSlot::new("Daño a personas", dec!(3000)),
                CoverageSlot::new("Defensa penal", dec!(1000)),
            ],
        }
    }

    /// Premium 80, insured amount 6000
    pub fn amplia() -> Coverage {
        Coverage::from_new(CoverageId::new(), Self::amplia_input(), TemporalFixtures::now())
            .expect("fixture coverage is valid")
    }
}

/// Fixture for policy creation input
pub struct PolicyFixtures;

impl PolicyFixtures {
    /// A car on the "Básica" plan starting on [`TemporalFixtures::policy_start`]
    pub fn new_policy(client_id: ClientId) -> NewPolicy {
        NewPolicy {
            client_id: Some(client_id),
            vehicle_type: Some(VehicleType::Automovil),
            plate: "ab123cd".to_string(),
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: Some(2018),
            color: Some("Gris".to_string()),
            coverage_name: CoverageFixtures::BASICA.to_string(),
            start_date: Some(TemporalFixtures::policy_start()),
            end_date: Some(TemporalFixtures::policy_end()),
            ..NewPolicy::default()
        }
    }
}

/// Fixture for back-office accounts
pub struct UserFixtures;

impl UserFixtures {
    pub fn superadmin() -> User {
        Self::account("root", Role::Superadmin)
    }

    pub fn admin() -> User {
        Self::account("oficina", Role::Admin)
    }

    pub fn register() -> User {
        Self::account("taquilla", Role::Register)
    }

    /// An active account whose password is [`FIXTURE_PASSWORD`]
    pub fn account(username: &str, role: Role) -> User {
        let hash = hash_password(FIXTURE_PASSWORD).expect("fixture password hashes");
        User::new(
            UserId::new(),
            username,
            format!("{username}@example.com"),
            hash,
            role,
            TemporalFixtures::now(),
        )
    }
}

/// Fixture for dates
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// 2026-03-15
    pub fn policy_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date")
    }

    /// One year after [`Self::policy_start`]
    pub fn policy_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 3, 15).expect("valid date")
    }

    /// 2024-02-29, the start of a term that must end on 2025-02-28
    pub fn leap_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date")
    }

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 14, 30, 0)
            .single()
            .expect("valid timestamp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_access::verify_password;

    #[test]
    fn test_basica_prices_to_1700() {
        let coverage = CoverageFixtures::basica();
        assert_eq!(coverage.premium, dec!(35));
        assert_eq!(coverage.insured_amount(), dec!(1700));
    }

    #[test]
    fn test_policy_fixture_points_at_client() {
        let client = ClientFixtures::ana();
        let policy = PolicyFixtures::new_policy(client.id);
        assert_eq!(policy.client_id, Some(client.id));
        assert_eq!(policy.coverage_name, CoverageFixtures::BASICA);
    }

    #[test]
    fn test_fixture_accounts_accept_shared_password() {
        let user = UserFixtures::register();
        assert_eq!(user.role, Role::Register);
        assert!(verify_password(FIXTURE_PASSWORD, &user.password_hash));
    }
}

//! Test Data Builders
//!
//! Builders with randomised but valid defaults, so tests only spell out the
//! fields they care about. Names and e-mails come from `fake`; cédulas are
//! random eight-digit numbers, which keeps them unique within a test run.

use chrono::NaiveDate;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::{ClientId, CoverageId, UserId};
use domain_access::{hash_password, NewUser, Role, User};
use domain_party::{Client, NewClient};
use domain_policy::{Coverage, CoverageSlot, NewCoverage, NewPolicy, VehicleType};

use crate::fixtures::{CoverageFixtures, TemporalFixtures, FIXTURE_PASSWORD};

fn random_cedula() -> String {
    format!("V-{}", (1_000_000u32..99_999_999).fake::<u32>())
}

/// Builder for client input
pub struct ClientBuilder {
    data: NewClient,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        Self {
            data: NewClient {
                email: Some(SafeEmail().fake()),
                ..NewClient::new(random_cedula(), first, last)
            },
        }
    }

    pub fn with_cedula(mut self, cedula: impl Into<String>) -> Self {
        self.data.cedula = cedula.into();
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.data.first_name = first.into();
        self.data.last_name = last.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.data.phone = Some(phone.into());
        self
    }

    pub fn build(self) -> NewClient {
        self.data
    }

    /// Builds a stored-looking, active client
    pub fn build_client(self) -> Client {
        Client::from_new(ClientId::new(), self.data, TemporalFixtures::now())
    }
}

/// Builder for coverage input
pub struct CoverageBuilder {
    data: NewCoverage,
}

impl Default for CoverageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageBuilder {
    /// Starts from the "Básica" plan under a random name
    pub fn new() -> Self {
        let suffix: u32 = (1..1_000_000).fake();
        Self {
            data: NewCoverage {
                name: format!("Plan {suffix}"),
                ..CoverageFixtures::basica_input()
            },
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.data.name = name.into();
        self
    }

    pub fn with_premium(mut self, premium: Decimal) -> Self {
        self.data.premium = Some(premium);
        self
    }

    pub fn with_slot(mut self, name: impl Into<String>, amount: Decimal) -> Self {
        self.data.slots.push(CoverageSlot::new(name, amount));
        self
    }

    pub fn without_slots(mut self) -> Self {
        self.data.slots.clear();
        self
    }

    pub fn build(self) -> NewCoverage {
        self.data
    }

    /// Builds an active coverage
    ///
    /// # Panics
    ///
    /// Panics if the accumulated input is invalid
    pub fn build_coverage(self) -> Coverage {
        Coverage::from_new(CoverageId::new(), self.data, TemporalFixtures::now())
            .expect("builder produced an invalid coverage")
    }
}

/// Builder for policy creation input
pub struct NewPolicyBuilder {
    data: NewPolicy,
}

impl NewPolicyBuilder {
    /// A car on "Básica" for the given client, starting on the fixture date
    pub fn new(client_id: ClientId) -> Self {
        let plate = format!("AB{:03}CD", (0u32..1000).fake::<u32>());
        Self {
            data: NewPolicy {
                client_id: Some(client_id),
                vehicle_type: Some(VehicleType::Automovil),
                plate,
                brand: "Chevrolet".to_string(),
                model: "Aveo".to_string(),
                year: Some((1990..2026).fake()),
                coverage_name: CoverageFixtures::BASICA.to_string(),
                start_date: Some(TemporalFixtures::policy_start()),
                end_date: Some(TemporalFixtures::policy_end()),
                ..NewPolicy::default()
            },
        }
    }

    pub fn with_vehicle_type(mut self, vehicle_type: VehicleType) -> Self {
        self.data.vehicle_type = Some(vehicle_type);
        self
    }

    pub fn with_plate(mut self, plate: impl Into<String>) -> Self {
        self.data.plate = plate.into();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.data.year = Some(year);
        self
    }

    pub fn with_coverage(mut self, name: impl Into<String>) -> Self {
        self.data.coverage_name = name.into();
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.data.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.data.end_date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.data.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> NewPolicy {
        self.data
    }
}

/// Builder for back-office accounts
pub struct UserBuilder {
    username: String,
    email: String,
    password: String,
    role: Role,
    is_active: bool,
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UserBuilder {
    pub fn new() -> Self {
        let first: String = FirstName().fake();
        let suffix: u32 = (100..100_000).fake();
        Self {
            username: format!("{}{suffix}", first.to_lowercase()),
            email: SafeEmail().fake(),
            password: FIXTURE_PASSWORD.to_string(),
            role: Role::Admin,
            is_active: true,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Registration input carrying the plain password
    pub fn build_input(self) -> NewUser {
        NewUser::new(self.username, self.email, self.password).with_role(self.role)
    }

    /// A stored account with a hashed password
    pub fn build(self) -> User {
        let hash = hash_password(&self.password).expect("password hashes");
        let mut user = User::new(
            UserId::new(),
            self.username,
            self.email,
            hash,
            self.role,
            TemporalFixtures::now(),
        );
        user.is_active = self.is_active;
        user
    }
}

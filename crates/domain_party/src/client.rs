//! Client entity and its command/query shapes

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, PageRequest};

/// A policyholder registered with the agency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// National identity document number, unique across clients
    pub cedula: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Builds a new active client from creation data
    pub fn from_new(id: ClientId, data: NewClient, now: DateTime<Utc>) -> Self {
        Self {
            id,
            cedula: data.cedula,
            first_name: data.first_name,
            last_name: data.last_name,
            phone: data.phone,
            email: data.email,
            address: data.address,
            city: data.city,
            region: data.region,
            birth_date: data.birth_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// "First Last", as shown on policy documents
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Applies a partial update in place
    pub fn apply(&mut self, update: ClientUpdate, now: DateTime<Utc>) {
        if let Some(cedula) = update.cedula {
            self.cedula = cedula;
        }
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(city) = update.city {
            self.city = city;
        }
        if let Some(region) = update.region {
            self.region = region;
        }
        if let Some(birth_date) = update.birth_date {
            self.birth_date = birth_date;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    pub fn summary(&self) -> ClientSummary {
        ClientSummary {
            id: self.id,
            cedula: self.cedula.clone(),
            full_name: self.full_name(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            is_active: self.is_active,
        }
    }
}

/// The slice of a client other domains display next to their own records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: ClientId,
    pub cedula: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
}

/// Data required to register a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub cedula: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl NewClient {
    pub fn new(
        cedula: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            cedula: cedula.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    /// Trims text fields and turns blank optional fields into `None`
    pub fn normalized(self) -> Self {
        Self {
            cedula: self.cedula.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: blank_to_none(self.phone),
            email: blank_to_none(self.email),
            address: blank_to_none(self.address),
            city: blank_to_none(self.city),
            region: blank_to_none(self.region),
            birth_date: self.birth_date,
        }
    }
}

/// Partial update of a client
///
/// Outer `None` leaves a field untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientUpdate {
    pub cedula: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub region: Option<Option<String>>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

impl ClientUpdate {
    /// Trims values; blank required fields are dropped from the update
    pub fn normalized(self) -> Self {
        let required = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            cedula: required(self.cedula),
            first_name: required(self.first_name),
            last_name: required(self.last_name),
            phone: self.phone.map(blank_to_none),
            email: self.email.map(blank_to_none),
            address: self.address.map(blank_to_none),
            city: self.city.map(blank_to_none),
            region: self.region.map(blank_to_none),
            birth_date: self.birth_date,
            is_active: self.is_active,
        }
    }
}

/// Filter for listing clients
#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    /// Substring matched against cedula, names, email and phone
    pub search: Option<String>,
    pub page: PageRequest,
}

impl ClientQuery {
    /// Returns true if the client matches the search term
    pub fn matches(&self, client: &Client) -> bool {
        let Some(term) = self.search.as_deref().map(str::to_lowercase) else {
            return true;
        };
        if term.is_empty() {
            return true;
        }
        [
            Some(client.cedula.as_str()),
            Some(client.first_name.as_str()),
            Some(client.last_name.as_str()),
            client.email.as_deref(),
            client.phone.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

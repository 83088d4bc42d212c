//! Coverage catalog entries
//!
//! A coverage is a named pricing template: a flat base premium plus ten
//! itemised insured-amount slots. Policies refer to coverages by name.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::CoverageId;

use crate::error::PolicyError;

/// Number of itemised slots every coverage carries
pub const COVERAGE_SLOTS: usize = 10;

/// One itemised entry of a coverage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSlot {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
}

impl CoverageSlot {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: Some(name.into()),
            amount: Some(amount),
        }
    }

    /// The trimmed name, if the slot is in use
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// The slot amount, a missing value counting as zero
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// A coverage plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub id: CoverageId,
    /// Unique name, used by policies as a soft reference
    pub name: String,
    pub description: Option<String>,
    /// Flat base premium
    pub premium: Decimal,
    pub slots: [CoverageSlot; COVERAGE_SLOTS],
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coverage {
    /// Builds an active coverage from validated input
    pub fn from_new(id: CoverageId, data: NewCoverage, now: DateTime<Utc>) -> Result<Self, PolicyError> {
        let data = data.normalized();
        data.validate()?;
        Ok(Self {
            id,
            name: data.name,
            description: data.description,
            premium: data.premium.unwrap_or(Decimal::ZERO),
            slots: into_slots(data.slots)?,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Slots that carry a name
    pub fn named_slots(&self) -> impl Iterator<Item = &CoverageSlot> {
        self.slots.iter().filter(|slot| slot.label().is_some())
    }

    /// Sum of the amounts of named slots
    pub fn insured_amount(&self) -> Decimal {
        self.named_slots().map(CoverageSlot::amount_or_zero).sum()
    }

    /// Applies a partial update
    pub fn apply(&mut self, update: CoverageUpdate, now: DateTime<Utc>) -> Result<(), PolicyError> {
        let update = update.normalized();
        update.validate()?;

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(premium) = update.premium {
            self.premium = premium;
        }
        if let Some(slots) = update.slots {
            self.slots = into_slots(slots)?;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Input for a new coverage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoverage {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    /// Missing premium counts as zero
    pub premium: Option<Decimal>,
    /// Up to ten slots; the rest are left empty
    #[serde(default)]
    pub slots: Vec<CoverageSlot>,
}

impl NewCoverage {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            premium: self.premium,
            slots: self.slots,
        }
    }

    fn validate(&self) -> Result<(), PolicyError> {
        if self.name.is_empty() {
            return Err(PolicyError::validation("coverage name is required"));
        }
        validate_figures(self.premium, &self.slots)
    }
}

/// Partial update of a coverage
///
/// When `slots` is present it replaces all ten slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub premium: Option<Decimal>,
    pub slots: Option<Vec<CoverageSlot>>,
    pub is_active: Option<bool>,
}

impl CoverageUpdate {
    fn normalized(self) -> Self {
        Self {
            name: self
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            description: self.description.map(|d| {
                d.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
            }),
            ..self
        }
    }

    fn validate(&self) -> Result<(), PolicyError> {
        validate_figures(self.premium, self.slots.as_deref().unwrap_or_default())
    }

    /// The new name, when the update renames the coverage
    pub fn renames_to(&self, current: &str) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != current)
    }
}

/// Money columns are NUMERIC(14, 2): two decimals, magnitude below 10^12
const MONEY_LIMIT: Decimal = dec!(1000000000000);

fn validate_money(value: Decimal, what: &str) -> Result<(), PolicyError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PolicyError::validation(format!("{what} must not be negative")));
    }
    if value.normalize().scale() > 2 {
        return Err(PolicyError::validation(format!(
            "{what} must have at most two decimals"
        )));
    }
    if value >= MONEY_LIMIT {
        return Err(PolicyError::validation(format!(
            "{what} must be below {MONEY_LIMIT}"
        )));
    }
    Ok(())
}

fn validate_figures(premium: Option<Decimal>, slots: &[CoverageSlot]) -> Result<(), PolicyError> {
    if let Some(premium) = premium {
        validate_money(premium, "premium")?;
    }
    if slots.len() > COVERAGE_SLOTS {
        return Err(PolicyError::validation(format!(
            "a coverage has at most {COVERAGE_SLOTS} items"
        )));
    }
    for amount in slots.iter().filter_map(|slot| slot.amount) {
        validate_money(amount, "item amount")?;
    }
    let insured: Decimal = slots
        .iter()
        .filter(|slot| slot.label().is_some())
        .map(CoverageSlot::amount_or_zero)
        .sum();
    validate_money(insured, "total insured amount")
}

/// Pads a slot list to exactly ten entries
fn into_slots(slots: Vec<CoverageSlot>) -> Result<[CoverageSlot; COVERAGE_SLOTS], PolicyError> {
    let mut padded = slots;
    if padded.len() > COVERAGE_SLOTS {
        return Err(PolicyError::validation(format!(
            "a coverage has at most {COVERAGE_SLOTS} items"
        )));
    }
    padded.resize_with(COVERAGE_SLOTS, CoverageSlot::default);
    padded
        .try_into()
        .map_err(|_| PolicyError::validation("invalid coverage items"))
}

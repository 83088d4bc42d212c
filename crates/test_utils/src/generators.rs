//! Property-Based Test Generators
//!
//! Proptest strategies producing values that respect the domain's own
//! invariants: valid calendar dates, ten-slot coverages, known enum values.

use chrono::NaiveDate;
use proptest::prelude::*;
use proptest::sample::select;
use rust_decimal::Decimal;

use domain_access::Role;
use domain_policy::{format_policy_number, CoverageSlot, PolicyStatus, VehicleType, COVERAGE_SLOTS};

/// Strategy for any account role
pub fn role_strategy() -> impl Strategy<Value = Role> {
    select(Role::ALL.to_vec())
}

/// Strategy for any policy status
pub fn policy_status_strategy() -> impl Strategy<Value = PolicyStatus> {
    select(PolicyStatus::ALL.to_vec())
}

/// Strategy for any vehicle type
pub fn vehicle_type_strategy() -> impl Strategy<Value = VehicleType> {
    select(VehicleType::ALL.to_vec())
}

/// Strategy for money amounts with two decimals, 0.00 to 99 999.99
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a single slot, named or empty
pub fn slot_strategy() -> impl Strategy<Value = CoverageSlot> {
    prop_oneof![
        3 => ("[A-Za-zÁÉÍÓÚáéíóúñ ]{1,24}", amount_strategy())
            .prop_map(|(name, amount)| CoverageSlot::new(name, amount)),
        1 => Just(CoverageSlot::default()),
    ]
}

/// Strategy for up to ten slots
pub fn slots_strategy() -> impl Strategy<Value = Vec<CoverageSlot>> {
    prop::collection::vec(slot_strategy(), 0..=COVERAGE_SLOTS)
}

/// Strategy for counter values
pub fn sequence_value_strategy() -> impl Strategy<Value = u64> {
    1u64..1_000_000_000
}

/// Strategy for policy numbers as stored, current and legacy formats
pub fn policy_number_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u64..100_000_000).prop_map(format_policy_number),
        ("[A-Z]{2,4}", 1u64..100_000_000)
            .prop_map(|(prefix, value)| format!("{prefix}-{}", format_policy_number(value))),
    ]
}

/// Strategy for calendar dates between 2000 and 2040, leap days included
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040, 1u32..=366).prop_filter_map("day out of year", |(year, ordinal)| {
        NaiveDate::from_yo_opt(year, ordinal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_policy::numeric_suffix;

    proptest! {
        #[test]
        fn test_generated_numbers_have_numeric_suffix(number in policy_number_strategy()) {
            prop_assert!(numeric_suffix(&number).is_some());
        }

        #[test]
        fn test_generated_amounts_are_non_negative(amount in amount_strategy()) {
            prop_assert!(amount >= Decimal::ZERO);
            prop_assert!(amount.scale() == 2);
        }

        #[test]
        fn test_slot_vectors_fit_a_coverage(slots in slots_strategy()) {
            prop_assert!(slots.len() <= COVERAGE_SLOTS);
        }
    }
}

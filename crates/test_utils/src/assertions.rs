//! Custom Test Assertions
//!
//! Assertion helpers with messages that name the domain rule that broke.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::add_years;
use domain_policy::{Coverage, Policy, PolicyStatus};

/// Asserts that a policy number is eight or more ASCII digits
pub fn assert_policy_number_format(number: &str) {
    assert!(
        number.len() >= 8 && number.bytes().all(|b| b.is_ascii_digit()),
        "Policy number {number:?} is not a zero-padded eight-digit counter"
    );
}

/// Asserts that numbers were issued consecutively in the given order
pub fn assert_consecutive_numbers(numbers: &[String]) {
    let values: Vec<u64> = numbers
        .iter()
        .map(|n| {
            assert_policy_number_format(n);
            n.parse().expect("digits parse")
        })
        .collect();
    for pair in values.windows(2) {
        assert_eq!(
            pair[1],
            pair[0] + 1,
            "Policy numbers are not consecutive: {numbers:?}"
        );
    }
}

/// Asserts that a policy runs exactly one calendar year from `start`
pub fn assert_one_year_term(policy: &Policy, start: NaiveDate) {
    let end = add_years(start, 1).expect("one year after start exists");
    assert_eq!(policy.start_date, start, "Unexpected start date");
    assert_eq!(
        policy.end_date, end,
        "End date {} is not one year after {start}",
        policy.end_date
    );
}

/// Asserts that a policy carries the figures of a coverage
pub fn assert_priced_from(policy: &Policy, coverage: &Coverage) {
    assert_eq!(policy.coverage_name, coverage.name, "Coverage name mismatch");
    assert_eq!(
        policy.premium, coverage.premium,
        "Premium not taken from coverage {}",
        coverage.name
    );
    assert_eq!(
        policy.amount,
        coverage.insured_amount(),
        "Insured amount is not the sum of the named slots of {}",
        coverage.name
    );
}

/// Asserts that a policy is active with the given figures
pub fn assert_active_with(policy: &Policy, premium: Decimal, amount: Decimal) {
    assert_eq!(policy.status, PolicyStatus::Activa, "Policy is not active");
    assert_eq!(policy.premium, premium, "Premium mismatch");
    assert_eq!(policy.amount, amount, "Insured amount mismatch");
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!("Expected Err matching {}, got Ok({:?})", stringify!($pattern), value),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}

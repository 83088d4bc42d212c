//! Property tests for policy numbering

use proptest::prelude::*;

use domain_policy::numbering::{seed_from, NUMBER_WIDTH};
use domain_policy::{format_policy_number, numeric_suffix, PolicySequence};

proptest! {
    #[test]
    fn prop_numbers_are_padded_and_parse_back(value in 0u64..100_000_000) {
        let number = format_policy_number(value);
        prop_assert_eq!(number.len(), NUMBER_WIDTH);
        prop_assert_eq!(numeric_suffix(&number), Some(value));
    }

    #[test]
    fn prop_wide_values_are_not_truncated(value in 100_000_000u64..10_000_000_000) {
        let number = format_policy_number(value);
        prop_assert_eq!(number, value.to_string());
    }

    #[test]
    fn prop_sequence_strictly_increases(count in 1usize..50, seed in 0u64..1_000_000) {
        let legacy = format!("2023-{}", format_policy_number(seed));
        let mut sequence = PolicySequence::new();
        let mut previous = seed;
        for _ in 0..count {
            let number = sequence.next([legacy.as_str()]);
            let value = numeric_suffix(&number).unwrap();
            prop_assert_eq!(value, previous + 1);
            previous = value;
        }
    }

    #[test]
    fn prop_seed_is_max_of_numeric_suffixes(values in proptest::collection::vec(0u64..99_999_999, 0..20)) {
        let numbers: Vec<String> = values.iter().map(|v| format_policy_number(*v)).collect();
        let expected = values.iter().copied().max().unwrap_or(0);
        prop_assert_eq!(seed_from(numbers.iter().map(String::as_str)), expected);
    }
}

#[test]
fn test_first_number_of_fresh_sequence() {
    let mut sequence = PolicySequence::new();
    assert_eq!(sequence.next(std::iter::empty()), "00000001");
    assert_eq!(sequence.next(std::iter::empty()), "00000002");
}

#[test]
fn test_legacy_prefix_uses_last_eight_characters() {
    assert_eq!(numeric_suffix("RCV2022-00001234"), Some(1234));
    assert_eq!(numeric_suffix("X-123"), None);
    assert_eq!(numeric_suffix("X-12a45678"), None);
}

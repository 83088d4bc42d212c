//! Policy number sequence
//!
//! Policy numbers are a persisted monotonic counter rendered as eight
//! zero-padded decimal digits (`00000001`, `00000002`, ...). Values past
//! eight digits render in full.
//!
//! When the counter does not exist yet it is seeded from the highest number
//! already issued. Legacy numbers of the form `PREFIX-########` contribute
//! their last eight characters; all-digit numbers contribute themselves;
//! anything else is ignored.
//!
//! Storage adapters own the atomic increment. This module holds the
//! formatting and seeding rules they share.

/// Name of the counter row backing policy numbers
pub const POLICY_SEQUENCE: &str = "policy";

/// Minimum width of a rendered policy number
pub const NUMBER_WIDTH: usize = 8;

/// Renders a counter value as a policy number
pub fn format_policy_number(value: u64) -> String {
    format!("{value:0width$}", width = NUMBER_WIDTH)
}

/// Numeric value a stored policy number contributes to the seed
pub fn numeric_suffix(number: &str) -> Option<u64> {
    let digits = if number.contains('-') {
        let chars: Vec<char> = number.chars().collect();
        let start = chars.len().saturating_sub(NUMBER_WIDTH);
        chars[start..].iter().collect::<String>()
    } else {
        number.to_string()
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Seed value for a fresh counter given the numbers already issued
pub fn seed_from<'a>(numbers: impl IntoIterator<Item = &'a str>) -> u64 {
    numbers
        .into_iter()
        .filter_map(numeric_suffix)
        .max()
        .unwrap_or(0)
}

/// In-process counter with the same seeding rules as the stored one
#[derive(Debug, Default, Clone)]
pub struct PolicySequence {
    value: Option<u64>,
}

impl PolicySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last issued value, if the counter has been initialised
    pub fn current(&self) -> Option<u64> {
        self.value
    }

    /// Advances the counter, seeding it from `existing` on first use
    pub fn next<'a>(&mut self, existing: impl IntoIterator<Item = &'a str>) -> String {
        let current = match self.value {
            Some(value) => value,
            None => seed_from(existing),
        };
        let next = current + 1;
        self.value = Some(next);
        format_policy_number(next)
    }
}

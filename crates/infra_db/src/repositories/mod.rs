//! Repository implementations
//!
//! Each repository owns the SQL for one table and speaks in row types; the
//! adapters in [`crate::adapters`] translate rows to domain models. Queries
//! are built at runtime and decoded with `FromRow`.

pub mod client;
pub mod policy;
pub mod coverage;
pub mod user;
pub mod stats;

pub use client::{ClientRepository, ClientRow};
pub use policy::{PolicyRepository, PolicyRow, PolicyClientRow};
pub use coverage::{CoverageRepository, CoverageRow};
pub use user::{UserRepository, UserRow};
pub use stats::{StatsRepository, StatTotalsRow, CoverageCountRow, VehicleCountRow};

/// `%term%` for ILIKE with the LIKE wildcards of `term` escaped
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// `%term` for suffix matches
pub(crate) fn suffix_pattern(term: &str) -> String {
    format!("%{}", escape_like(term))
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

//! Request and response bodies
//!
//! Domain types that already serialize are returned as they are; this
//! module holds the envelopes around them and the request shapes whose
//! JSON form differs from the domain input.

pub mod auth;
pub mod client;
pub mod coverage;
pub mod policy;
pub mod user;

use serde::{Deserialize, Deserializer, Serialize};

use core_kernel::Page;

/// Pagination block of list responses
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            total: page.total,
            page: page.page,
            limit: page.limit,
            pages: page.pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Distinguishes an absent field from an explicit `null`
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: absent
/// stays `None`, `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

//! Client DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Page, PageRequest};
use domain_party::{Client, ClientQuery, ClientUpdate};
use domain_policy::Policy;

use super::{double_option, Pagination};

#[derive(Debug, Default, Deserialize)]
pub struct ClientListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<ClientListParams> for ClientQuery {
    fn from(params: ClientListParams) -> Self {
        ClientQuery {
            search: params.search.filter(|s| !s.trim().is_empty()),
            page: PageRequest::new(params.page, params.limit),
        }
    }
}

/// Partial client update; `null` clears an optional field
#[derive(Debug, Default, Deserialize)]
pub struct UpdateClientRequest {
    pub cedula: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub region: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

impl From<UpdateClientRequest> for ClientUpdate {
    fn from(request: UpdateClientRequest) -> Self {
        ClientUpdate {
            cedula: request.cedula,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            email: request.email,
            address: request.address,
            city: request.city,
            region: request.region,
            birth_date: request.birth_date,
            is_active: request.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
    pub pagination: Pagination,
}

impl From<Page<Client>> for ClientListResponse {
    fn from(page: Page<Client>) -> Self {
        let pagination = Pagination::from(&page);
        Self {
            clients: page.items,
            pagination,
        }
    }
}

/// A client with every policy it holds
#[derive(Debug, Serialize)]
pub struct ClientDetailResponse {
    pub client: Client,
    pub policies: Vec<Policy>,
}

#[derive(Debug, Serialize)]
pub struct ClientMessageResponse {
    pub message: String,
    pub client: Client,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_keeps_null_as_clear() {
        let request: UpdateClientRequest =
            serde_json::from_str(r#"{"phone": null, "first_name": "Ana María"}"#).unwrap();
        let update = ClientUpdate::from(request);

        assert_eq!(update.phone, Some(None));
        assert_eq!(update.email, None);
        assert_eq!(update.first_name.as_deref(), Some("Ana María"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let query = ClientQuery::from(ClientListParams {
            search: Some("  ".into()),
            page: None,
            limit: Some(5),
        });
        assert!(query.search.is_none());
        assert_eq!(query.page.limit, 5);
    }
}

//! User DTOs

use serde::Serialize;

use domain_access::UserView;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserView>,
}

#[derive(Debug, Serialize)]
pub struct UserMessageResponse {
    pub message: String,
    pub user: UserView,
}

//! Authentication DTOs

use serde::{Deserialize, Serialize};

use domain_access::{NewUser, UserView};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Bootstrap registration; the role is always superadmin
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        NewUser::new(request.username, request.email, request.password)
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserView,
}

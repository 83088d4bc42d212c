//! HTTP API Layer
//!
//! This crate provides the REST API of the RCV agency backend using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each resource
//! - **Middleware**: JWT authentication and audit logging
//! - **DTOs**: Request/Response envelopes
//! - **Error Handling**: Consistent `{"error", "message"}` responses
//!
//! Handlers talk to the domain services only; storage is chosen when the
//! [`AppState`] is built, from PostgreSQL adapters in the server binary or
//! in-memory mocks in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::postgres(pool, config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::OriginalUri,
    http::Uri,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use core_kernel::{CoreError, Timezone};
use domain_access::{UserPort, UserService};
use domain_party::{ClientPort, ClientService, PolicyReferences};
use domain_policy::{CoveragePort, CoverageService, PolicyPort, PolicyService, StatsPort};
use infra_db::adapters::{
    PostgresClientAdapter, PostgresCoverageAdapter, PostgresPolicyAdapter, PostgresStatsAdapter,
    PostgresUserAdapter,
};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{clients, coverages, dashboard, health, policies, users, verify};
use crate::middleware::{audit_middleware, auth_middleware};

/// Storage ports the services are built from
#[derive(Clone)]
pub struct Ports {
    pub clients: Arc<dyn ClientPort>,
    pub policies: Arc<dyn PolicyPort>,
    /// Policy counts per client, guarding client deletion
    pub references: Arc<dyn PolicyReferences>,
    pub coverages: Arc<dyn CoveragePort>,
    pub users: Arc<dyn UserPort>,
    pub stats: Arc<dyn StatsPort>,
}

impl Ports {
    /// PostgreSQL adapters over one pool
    pub fn postgres(pool: PgPool) -> Self {
        let policies = Arc::new(PostgresPolicyAdapter::new(pool.clone()));
        Self {
            clients: Arc::new(PostgresClientAdapter::new(pool.clone())),
            policies: policies.clone(),
            references: policies,
            coverages: Arc::new(PostgresCoverageAdapter::new(pool.clone())),
            users: Arc::new(PostgresUserAdapter::new(pool.clone())),
            stats: Arc::new(PostgresStatsAdapter::new(pool)),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<ClientService>,
    pub policies: Arc<PolicyService>,
    pub coverages: Arc<CoverageService>,
    pub users: Arc<UserService>,
    pub stats: Arc<dyn StatsPort>,
    pub ports: Ports,
    pub config: Arc<ApiConfig>,
    /// Agency timezone, fixing "today" for renewals
    pub timezone: Timezone,
}

impl AppState {
    /// Wires the services; fails on an unknown timezone name
    pub fn new(ports: Ports, config: ApiConfig) -> Result<Self, CoreError> {
        let timezone = config
            .timezone()
            .map_err(|e| CoreError::configuration(e.to_string()))?;

        Ok(Self {
            clients: Arc::new(ClientService::new(
                ports.clients.clone(),
                ports.references.clone(),
            )),
            policies: Arc::new(PolicyService::new(
                ports.policies.clone(),
                ports.coverages.clone(),
                ports.clients.clone(),
            )),
            coverages: Arc::new(CoverageService::new(
                ports.coverages.clone(),
                ports.policies.clone(),
            )),
            users: Arc::new(UserService::new(ports.users.clone())),
            stats: ports.stats.clone(),
            ports,
            config: Arc::new(config),
            timezone,
        })
    }

    pub fn postgres(pool: PgPool, config: ApiConfig) -> Result<Self, CoreError> {
        Self::new(Ports::postgres(pool), config)
    }
}

/// Creates the main router
///
/// `/health*` and `/api/auth/{login,register}` and `/api/verify/:number`
/// are public; every other `/api` route passes the auth and audit
/// middleware. With `static_dir` configured, other paths are served from
/// it with `index.html` as the fallback.
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/clients/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/policies",
            get(policies::list_policies).post(policies::create_policy),
        )
        .route("/policies/config/pricing", get(policies::pricing_config))
        .route(
            "/policies/:id",
            get(policies::get_policy)
                .put(policies::update_policy)
                .delete(policies::delete_policy),
        )
        .route("/policies/:id/renew", post(policies::renew_policy))
        .route(
            "/coverages",
            get(coverages::list_coverages).post(coverages::create_coverage),
        )
        .route("/coverages/pricing/:name", get(coverages::coverage_pricing))
        .route(
            "/coverages/:id",
            get(coverages::get_coverage)
                .put(coverages::update_coverage)
                .delete(coverages::delete_coverage),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/dashboard/stats", get(dashboard::stats))
        .route_layer(axum_middleware::from_fn(audit_middleware))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/verify/:number", get(verify::verify_policy))
        .merge(protected_routes)
        .fallback(api_not_found);

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api", api_routes);

    let router = match state.config.static_dir.as_deref() {
        Some(dir) => {
            let index = Path::new(dir).join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => router.fallback(not_found),
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn api_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("no API route for {}", uri.path()))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("nothing at {}", uri.path()))
}

//! HTTP API tests
//!
//! The router is driven end to end with `axum-test` over the in-memory
//! mock ports, so these run without a database.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::add_years;
use domain_access::{MockUserPort, Role, User};
use domain_party::MockClientPort;
use domain_policy::{MockCoveragePort, MockPolicyPort, MockStatsPort};
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState, Ports};
use test_utils::{ClientFixtures, CoverageFixtures, UserFixtures, FIXTURE_PASSWORD};

struct TestApp {
    server: TestServer,
    config: ApiConfig,
}

impl TestApp {
    async fn with_users(users: Vec<User>) -> Self {
        let clients = Arc::new(MockClientPort::new());
        let policies = Arc::new(MockPolicyPort::new(clients.clone()));
        let coverages = MockCoveragePort::with_coverages(vec![
            CoverageFixtures::basica(),
            CoverageFixtures::amplia(),
        ])
        .await;
        let stats = MockStatsPort::new(policies.clone(), clients.clone());
        stats.set_active_users(users.len() as u64);

        let ports = Ports {
            clients,
            policies: policies.clone(),
            references: policies,
            coverages: Arc::new(coverages),
            users: Arc::new(MockUserPort::with_users(users).await),
            stats: Arc::new(stats),
        };

        let config = ApiConfig {
            jwt_secret: "test-secret".to_string(),
            ..ApiConfig::default()
        };
        let state = AppState::new(ports, config.clone()).unwrap();
        let server = TestServer::new(create_router(state)).unwrap();
        Self { server, config }
    }

    async fn empty() -> Self {
        Self::with_users(Vec::new()).await
    }

    fn token(&self, user: &User) -> String {
        create_token(user, &self.config.jwt_secret, 3600).unwrap()
    }
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn policy_body(client_id: &Value) -> Value {
    json!({
        "client_id": client_id,
        "vehicle_type": "automovil",
        "plate": "ab123cd",
        "brand": "Toyota",
        "model": "Corolla",
        "year": 2018,
        "coverage_name": CoverageFixtures::BASICA,
        "start_date": "2026-03-15",
        "end_date": "2027-03-15"
    })
}

/// Creates Ana through the API and returns her id
async fn create_ana(app: &TestApp, token: &str) -> Value {
    let response = app
        .server
        .post("/api/clients")
        .authorization_bearer(token)
        .json(&ClientFixtures::ana_input())
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["client"]["id"].clone()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_liveness_and_readiness() {
        let app = TestApp::empty().await;

        let live = app.server.get("/health").await;
        assert_eq!(live.status_code(), StatusCode::OK);
        assert_eq!(live.json::<Value>()["status"], "healthy");

        let ready = app.server.get("/health/ready").await;
        assert_eq!(ready.status_code(), StatusCode::OK);
        assert_eq!(ready.json::<Value>()["status"], "ready");
    }
}

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = TestApp::empty().await;

        let response = app.server.get("/api/clients").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let forged = create_token(&admin, "someone-else", 3600).unwrap();

        let response = app
            .server
            .get("/api/auth/me")
            .authorization_bearer(forged)
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_of_deleted_account_is_rejected() {
        let app = TestApp::empty().await;
        let ghost = UserFixtures::admin();

        let response = app
            .server
            .get("/api/auth/me")
            .authorization_bearer(app.token(&ghost))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    /// The first account becomes superadmin; registration then closes
    #[tokio::test]
    async fn test_bootstrap_registration() {
        let app = TestApp::empty().await;
        let body = json!({
            "username": "root",
            "email": "root@example.com",
            "password": FIXTURE_PASSWORD
        });

        let first = app.server.post("/api/auth/register").json(&body).await;
        assert_eq!(first.status_code(), StatusCode::CREATED);
        let first = first.json::<Value>();
        assert_eq!(first["user"]["role"], "superadmin");
        assert!(first["user"].get("password_hash").is_none());

        let token = first["token"].as_str().unwrap();
        let me = app
            .server
            .get("/api/auth/me")
            .authorization_bearer(token)
            .await;
        assert_eq!(me.status_code(), StatusCode::OK);
        assert_eq!(me.json::<Value>()["user"]["username"], "root");

        let second = app
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": "intruso",
                "email": "intruso@example.com",
                "password": "otra-clave"
            }))
            .await;
        assert_eq!(second.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login() {
        let app = TestApp::with_users(vec![UserFixtures::admin()]).await;

        let ok = app
            .server
            .post("/api/auth/login")
            .json(&json!({"username": "oficina", "password": FIXTURE_PASSWORD}))
            .await;
        assert_eq!(ok.status_code(), StatusCode::OK);
        let body = ok.json::<Value>();
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["user"]["role"], "admin");

        let wrong_password = app
            .server
            .post("/api/auth/login")
            .json(&json!({"username": "oficina", "password": "incorrecta"}))
            .await;
        let unknown_user = app
            .server
            .post("/api/auth/login")
            .json(&json!({"username": "nadie", "password": FIXTURE_PASSWORD}))
            .await;

        assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong_password.json::<Value>()["message"],
            unknown_user.json::<Value>()["message"]
        );
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = TestApp::empty().await;

        let response = app
            .server
            .post("/api/auth/login")
            .text("not json")
            .content_type("application/json")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }
}

mod clients {
    use super::*;

    #[tokio::test]
    async fn test_create_list_and_get() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);

        let id = create_ana(&app, &token).await;

        let list = app
            .server
            .get("/api/clients")
            .add_query_param("search", "pérez")
            .authorization_bearer(&token)
            .await;
        assert_eq!(list.status_code(), StatusCode::OK);
        let list = list.json::<Value>();
        assert_eq!(list["pagination"]["total"], 1);
        assert_eq!(list["clients"][0]["cedula"], "V-12345678");

        let detail = app
            .server
            .get(&format!("/api/clients/{}", id.as_str().unwrap()))
            .authorization_bearer(&token)
            .await;
        assert_eq!(detail.status_code(), StatusCode::OK);
        let detail = detail.json::<Value>();
        assert_eq!(detail["client"]["first_name"], "Ana");
        assert_eq!(detail["policies"], json!([]));
    }

    #[tokio::test]
    async fn test_duplicate_cedula_conflicts() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        create_ana(&app, &token).await;

        let again = app
            .server
            .post("/api/clients")
            .authorization_bearer(&token)
            .json(&ClientFixtures::ana_input())
            .await;

        assert_eq!(again.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_update_clears_optional_field() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        let id = create_ana(&app, &token).await;

        let response = app
            .server
            .put(&format!("/api/clients/{}", id.as_str().unwrap()))
            .authorization_bearer(&token)
            .json(&json!({"phone": null, "city": "Maracay"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let client = &response.json::<Value>()["client"];
        assert_eq!(client["phone"], Value::Null);
        assert_eq!(client["city"], "Maracay");
        assert_eq!(client["email"], "ana.perez@example.com");
    }

    #[tokio::test]
    async fn test_register_role_cannot_delete() {
        let register = UserFixtures::register();
        let app = TestApp::with_users(vec![register.clone()]).await;
        let token = app.token(&register);
        let id = create_ana(&app, &token).await;

        let response = app
            .server
            .delete(&format!("/api/clients/{}", id.as_str().unwrap()))
            .authorization_bearer(&token)
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["error"], "forbidden");
    }

    /// A client referenced by a policy cannot be deleted
    #[tokio::test]
    async fn test_delete_with_policies_conflicts() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        let id = create_ana(&app, &token).await;

        let issued = app
            .server
            .post("/api/policies")
            .authorization_bearer(&token)
            .json(&policy_body(&id))
            .await;
        assert_eq!(issued.status_code(), StatusCode::CREATED);

        let path = format!("/api/clients/{}", id.as_str().unwrap());
        let response = app.server.delete(&path).authorization_bearer(&token).await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);

        let still_there = app.server.get(&path).authorization_bearer(&token).await;
        assert_eq!(still_there.status_code(), StatusCode::OK);
        assert_eq!(still_there.json::<Value>()["policies"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_found() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;

        let response = app
            .server
            .get(&format!("/api/clients/{}", uuid::Uuid::now_v7()))
            .authorization_bearer(app.token(&admin))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;

        let response = app
            .server
            .get("/api/clients/not-a-uuid")
            .authorization_bearer(app.token(&admin))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}

mod policies {
    use super::*;

    /// Numbers come from the sequence; premium and amount from the coverage
    #[tokio::test]
    async fn test_issue_numbers_and_prices() {
        let register = UserFixtures::register();
        let app = TestApp::with_users(vec![register.clone()]).await;
        let token = app.token(&register);
        let client_id = create_ana(&app, &token).await;

        let mut numbers = Vec::new();
        for _ in 0..3 {
            let response = app
                .server
                .post("/api/policies")
                .authorization_bearer(&token)
                .json(&policy_body(&client_id))
                .await;
            assert_eq!(response.status_code(), StatusCode::CREATED);
            let policy = response.json::<Value>()["policy"].clone();

            assert_eq!(decimal(&policy["premium"]), dec!(35));
            assert_eq!(decimal(&policy["amount"]), dec!(1700));
            assert_eq!(policy["status"], "activa");
            assert_eq!(policy["plate"], "AB123CD");
            assert_eq!(policy["end_date"], "2027-03-15");
            assert_eq!(policy["created_by"], json!(register.id));
            numbers.push(policy["policy_number"].as_str().unwrap().to_string());
        }

        assert_eq!(numbers, vec!["00000001", "00000002", "00000003"]);
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        let client_id = create_ana(&app, &token).await;

        let response = app
            .server
            .post("/api/policies")
            .authorization_bearer(&token)
            .json(&json!({"client_id": client_id, "plate": "ab123cd"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_filters_by_estado() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        let client_id = create_ana(&app, &token).await;

        for _ in 0..2 {
            app.server
                .post("/api/policies")
                .authorization_bearer(&token)
                .json(&policy_body(&client_id))
                .await;
        }
        let first = app
            .server
            .get("/api/policies")
            .add_query_param("search", "00000001")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        let id = first["policies"][0]["id"].as_str().unwrap().to_string();

        let cancelled = app
            .server
            .put(&format!("/api/policies/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"status": "cancelada"}))
            .await;
        assert_eq!(cancelled.status_code(), StatusCode::OK);

        let active = app
            .server
            .get("/api/policies")
            .add_query_param("estado", "activa")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        assert_eq!(active["pagination"]["total"], 1);
        assert_eq!(active["policies"][0]["policy_number"], "00000002");
        assert_eq!(active["policies"][0]["client_name"], "Ana Pérez");

        let invalid = app
            .server
            .get("/api/policies")
            .add_query_param("estado", "archivada")
            .authorization_bearer(&token)
            .await;
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }

    /// Renewal restarts the term today and reactivates the policy
    #[tokio::test]
    async fn test_renew_cancelled_policy() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        let client_id = create_ana(&app, &token).await;

        let issued = app
            .server
            .post("/api/policies")
            .authorization_bearer(&token)
            .json(&policy_body(&client_id))
            .await
            .json::<Value>();
        let id = issued["policy"]["id"].as_str().unwrap().to_string();

        app.server
            .put(&format!("/api/policies/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"status": "cancelada"}))
            .await;

        let renewed = app
            .server
            .post(&format!("/api/policies/{id}/renew"))
            .authorization_bearer(&token)
            .await;
        assert_eq!(renewed.status_code(), StatusCode::OK);
        let policy = renewed.json::<Value>()["policy"].clone();

        let start: NaiveDate = policy["start_date"].as_str().unwrap().parse().unwrap();
        let end: NaiveDate = policy["end_date"].as_str().unwrap().parse().unwrap();
        assert_eq!(policy["status"], "activa");
        assert_eq!(end, add_years(start, 1).unwrap());
        assert_eq!(policy["policy_number"], "00000001");
    }

    /// Moving to a priced coverage recomputes premium and amount
    #[tokio::test]
    async fn test_update_to_priced_coverage_reprices() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        let client_id = create_ana(&app, &token).await;

        let issued = app
            .server
            .post("/api/policies")
            .authorization_bearer(&token)
            .json(&policy_body(&client_id))
            .await
            .json::<Value>();
        let id = issued["policy"]["id"].as_str().unwrap().to_string();
        assert_eq!(decimal(&issued["policy"]["premium"]), dec!(35));

        let response = app
            .server
            .put(&format!("/api/policies/{id}"))
            .authorization_bearer(&token)
            .json(&json!({"coverage_name": CoverageFixtures::AMPLIA}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let policy = response.json::<Value>()["policy"].clone();
        assert_eq!(policy["coverage_name"], CoverageFixtures::AMPLIA);
        assert_eq!(decimal(&policy["premium"]), dec!(80));
        assert_eq!(decimal(&policy["amount"]), dec!(6000));
        assert_eq!(policy["policy_number"], "00000001");
    }

    #[tokio::test]
    async fn test_pricing_config_lists_active_coverages() {
        let register = UserFixtures::register();
        let app = TestApp::with_users(vec![register.clone()]).await;

        let response = app
            .server
            .get("/api/policies/config/pricing")
            .authorization_bearer(app.token(&register))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let pricing = &response.json::<Value>()["pricing"];
        assert_eq!(decimal(&pricing["Básica"]["amount"]), dec!(1700));
        assert_eq!(decimal(&pricing["Amplia"]["premium"]), dec!(80));
        assert_eq!(pricing["Básica"]["items"].as_array().unwrap().len(), 2);
    }
}

mod coverages {
    use super::*;

    #[tokio::test]
    async fn test_pricing_by_name() {
        let register = UserFixtures::register();
        let app = TestApp::with_users(vec![register.clone()]).await;
        let token = app.token(&register);

        let found = app
            .server
            .get("/api/coverages/pricing/B%C3%A1sica")
            .authorization_bearer(&token)
            .await;
        assert_eq!(found.status_code(), StatusCode::OK);
        let body = found.json::<Value>();
        assert_eq!(body["coverage_name"], "Básica");
        assert_eq!(decimal(&body["premium"]), dec!(35));
        assert_eq!(decimal(&body["amount"]), dec!(1700));

        let missing = app
            .server
            .get("/api/coverages/pricing/Premium")
            .authorization_bearer(&token)
            .await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_role_cannot_write_catalog() {
        let register = UserFixtures::register();
        let app = TestApp::with_users(vec![register.clone()]).await;

        let response = app
            .server
            .post("/api/coverages")
            .authorization_bearer(app.token(&register))
            .json(&json!({"name": "Plus", "premium": "50"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    /// Figures that do not fit the money columns are a client error
    #[tokio::test]
    async fn test_out_of_range_figures_are_bad_request() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);

        let bodies = [
            json!({"name": "Plus", "premium": "1000000000000"}),
            json!({"name": "Plus", "premium": "10.005"}),
            json!({"name": "Plus", "premium": "50", "slots": [
                {"name": "Daño", "amount": "600000000000"},
                {"name": "Robo", "amount": "600000000000"}
            ]}),
        ];
        for body in bodies {
            let response = app
                .server
                .post("/api/coverages")
                .authorization_bearer(&token)
                .json(&body)
                .await;
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(response.json::<Value>()["error"], "validation_error");
        }
    }

    /// A coverage used by a policy can be deactivated but not deleted
    #[tokio::test]
    async fn test_delete_in_use_conflicts() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        let client_id = create_ana(&app, &token).await;
        app.server
            .post("/api/policies")
            .authorization_bearer(&token)
            .json(&policy_body(&client_id))
            .await;

        let list = app
            .server
            .get("/api/coverages")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        let basica = list["coverages"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == CoverageFixtures::BASICA)
            .unwrap();
        let path = format!("/api/coverages/{}", basica["id"].as_str().unwrap());

        let delete = app.server.delete(&path).authorization_bearer(&token).await;
        assert_eq!(delete.status_code(), StatusCode::CONFLICT);

        let deactivate = app
            .server
            .put(&path)
            .authorization_bearer(&token)
            .json(&json!({"is_active": false}))
            .await;
        assert_eq!(deactivate.status_code(), StatusCode::OK);

        let active = app
            .server
            .get("/api/coverages")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        let everything = app
            .server
            .get("/api/coverages")
            .add_query_param("all", "1")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        assert_eq!(active["coverages"].as_array().unwrap().len(), 1);
        assert_eq!(everything["coverages"].as_array().unwrap().len(), 2);
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn test_admin_cannot_assign_superadmin() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;

        let response = app
            .server
            .post("/api/users")
            .authorization_bearer(app.token(&admin))
            .json(&json!({
                "username": "jefe",
                "email": "jefe@example.com",
                "password": "clave",
                "role": "superadmin"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_created_account_defaults_to_admin() {
        let root = UserFixtures::superadmin();
        let app = TestApp::with_users(vec![root.clone()]).await;
        let token = app.token(&root);

        let created = app
            .server
            .post("/api/users")
            .authorization_bearer(&token)
            .json(&json!({
                "username": "nueva",
                "email": "nueva@example.com",
                "password": "clave"
            }))
            .await;
        assert_eq!(created.status_code(), StatusCode::CREATED);
        assert_eq!(created.json::<Value>()["user"]["role"], "admin");

        let list = app
            .server
            .get("/api/users")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        assert_eq!(list["users"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_nobody_deletes_themselves() {
        let root = UserFixtures::superadmin();
        let app = TestApp::with_users(vec![root.clone()]).await;

        let response = app
            .server
            .delete(&format!("/api/users/{}", root.id.as_uuid()))
            .authorization_bearer(app.token(&root))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    /// Any role may edit its own profile but not its own role
    #[tokio::test]
    async fn test_self_profile_edit() {
        let register = UserFixtures::register();
        let app = TestApp::with_users(vec![register.clone()]).await;
        let token = app.token(&register);
        let path = format!("/api/users/{}", register.id.as_uuid());

        let email = app
            .server
            .put(&path)
            .authorization_bearer(&token)
            .json(&json!({"email": "taquilla2@example.com"}))
            .await;
        assert_eq!(email.status_code(), StatusCode::OK);
        assert_eq!(email.json::<Value>()["user"]["email"], "taquilla2@example.com");

        let promote = app
            .server
            .put(&path)
            .authorization_bearer(&token)
            .json(&json!({"role": Role::Admin}))
            .await;
        assert_eq!(promote.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_register_role_cannot_list_users() {
        let register = UserFixtures::register();
        let app = TestApp::with_users(vec![register.clone()]).await;

        let response = app
            .server
            .get("/api/users")
            .authorization_bearer(app.token(&register))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}

mod public {
    use super::*;

    #[tokio::test]
    async fn test_verify_by_suffix_without_token() {
        let admin = UserFixtures::admin();
        let app = TestApp::with_users(vec![admin.clone()]).await;
        let token = app.token(&admin);
        let client_id = create_ana(&app, &token).await;
        app.server
            .post("/api/policies")
            .authorization_bearer(&token)
            .json(&policy_body(&client_id))
            .await;

        let found = app.server.get("/api/verify/1").await;
        assert_eq!(found.status_code(), StatusCode::OK);
        let policy = &found.json::<Value>()["policy"];
        assert_eq!(policy["policy_number"], "00000001");
        assert_eq!(policy["client_cedula"], "V-12345678");
        assert_eq!(policy["plate"], "AB123CD");

        let missing = app.server.get("/api/verify/99").await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let app = TestApp::empty().await;

        let response = app.server.get("/api/nope").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "not_found");
        assert!(body["message"].as_str().unwrap().contains("/api/nope"));
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let register = UserFixtures::register();
        let app = TestApp::with_users(vec![register.clone()]).await;
        let token = app.token(&register);
        let client_id = create_ana(&app, &token).await;
        app.server
            .post("/api/policies")
            .authorization_bearer(&token)
            .json(&policy_body(&client_id))
            .await;

        let response = app
            .server
            .get("/api/dashboard/stats")
            .authorization_bearer(&token)
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["stats"]["total_clients"], 1);
        assert_eq!(body["stats"]["active_policies"], 1);
        assert_eq!(body["stats"]["total_users"], 1);
        assert_eq!(decimal(&body["stats"]["total_premiums"]), dec!(35));
        assert_eq!(body["recent_policies"].as_array().unwrap().len(), 1);
        assert_eq!(body["by_vehicle"][0]["vehicle_type"], "automovil");
    }
}

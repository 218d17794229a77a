//! Router-level tests over a throwaway database and an in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use palisade::auth::jwt::JwtKeys;
use palisade::captcha::CaptchaService;
use palisade::config::AppConfig;
use palisade::db;
use palisade::ratelimit::RateLimiter;
use palisade::routes::create_router;
use palisade::state::AppState;
use palisade::store::{ExpiringStore, MemoryStore};

struct TestApp {
    app: Router,
    state: AppState,
    // Keeps the database directory alive for the test's duration.
    _dir: TempDir,
}

async fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let database_url = format!("sqlite://{}/test.db", dir.path().display());

    let mut config = AppConfig::default();
    config.database_url = database_url.clone();
    config.jwt.secret = "integration-test-secret".to_string();

    let store: Arc<dyn ExpiringStore> = Arc::new(MemoryStore::new());
    let db = db::connect(&database_url).await.unwrap();
    let captcha = Arc::new(CaptchaService::new(config.captcha.clone(), store.clone()).unwrap());
    let jwt = Arc::new(JwtKeys::new(&config.jwt).unwrap());
    let limiter = Arc::new(RateLimiter::new(store.clone()));

    let state = AppState {
        config,
        db,
        store,
        captcha,
        jwt,
        limiter,
    };

    TestApp {
        app: create_router(state.clone()),
        state,
        _dir: dir,
    }
}

async fn seed_user(state: &AppState, username: &str, password: &str) -> i64 {
    let hash = palisade::auth::password::hash_password(password).unwrap();
    let new_user = db::users::CreateUser {
        username: username.to_string(),
        nickname: None,
        department_id: None,
        phone_number: None,
        email: None,
        is_admin: true,
        gender: None,
        remark: None,
    };
    db::users::create(&state.db, &new_user, &hash, None)
        .await
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request_json(method: &str, uri: &str, body: &Value, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoints_respond() {
    let test = spawn_app().await;

    let response = test.app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test.app.clone().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn captcha_issue_then_login_sets_a_cookie() {
    let test = spawn_app().await;
    seed_user(&test.state, "boss", "boss-password").await;

    // Issue a challenge.
    let response = test
        .app
        .clone()
        .oneshot(post_json("/api/auth/captcha", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], 0);
    let uuid = body["data"]["uuid"].as_str().unwrap().to_string();
    assert_eq!(uuid.len(), 32);
    assert!(!body["data"]["img"].as_str().unwrap().is_empty());

    // The test owns the store, so it can read the answer back.
    let code = test
        .state
        .store
        .get(&format!("captcha:{uuid}"))
        .await
        .unwrap()
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({
                "username": "boss",
                "password": "boss-password",
                "captcha_id": uuid,
                "captcha_code": code.to_lowercase(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("access_token="));

    let body = body_json(response).await;
    assert_eq!(body["code"], 0);

    // The cookie authenticates follow-up requests.
    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header(header::COOKIE, cookie.split(';').next().unwrap())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "boss");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn wrong_captcha_answer_returns_code_1005_and_consumes_the_challenge() {
    let test = spawn_app().await;
    seed_user(&test.state, "boss", "boss-password").await;

    let response = test
        .app
        .clone()
        .oneshot(post_json("/api/auth/captcha", &json!({})))
        .await
        .unwrap();
    let body = body_json(response).await;
    let uuid = body["data"]["uuid"].as_str().unwrap().to_string();

    let code = test
        .state
        .store
        .get(&format!("captcha:{uuid}"))
        .await
        .unwrap()
        .unwrap();

    let login = |captcha_code: String| {
        post_json(
            "/api/auth/login",
            &json!({
                "username": "boss",
                "password": "boss-password",
                "captcha_id": uuid,
                "captcha_code": captcha_code,
            }),
        )
    };

    // Wrong answer: business code 1005, HTTP 200.
    let response = test
        .app
        .clone()
        .oneshot(login("????".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1005);

    // The attempt consumed the challenge: the right answer no longer works.
    let response = test.app.clone().oneshot(login(code)).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["code"], 1005);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/users/me"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn captcha_issue_is_rate_limited() {
    let test = spawn_app().await;
    let limit = test.state.config.rate_limit.captcha_per_minute;

    for _ in 0..limit {
        let response = test
            .app
            .clone()
            .oneshot(post_json("/api/auth/captcha", &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = test
        .app
        .clone()
        .oneshot(post_json("/api/auth/captcha", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn register_then_conflict_on_duplicate_username() {
    let test = spawn_app().await;

    let payload = json!({"username": "newcomer", "password": "secret123"});
    let response = test
        .app
        .clone()
        .oneshot(post_json("/api/auth/register", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], 0);
    assert!(body["data"]["id"].as_i64().unwrap() > 0);

    let response = test
        .app
        .clone()
        .oneshot(post_json("/api/auth/register", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn user_crud_roundtrip() {
    let test = spawn_app().await;
    let admin_id = seed_user(&test.state, "boss", "boss-password").await;
    let token = test.state.jwt.issue(admin_id).unwrap();

    // Create
    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/users",
            &json!({
                "username": "dev1",
                "password": "secret123",
                "nickname": "Dev One",
            }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let id = body["data"]["id"].as_i64().unwrap();

    // List includes it
    let response = test
        .app
        .clone()
        .oneshot(request_json("GET", "/api/users?page=1&page_size=50", &json!({}), &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 2);

    // Update
    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "PUT",
            &format!("/api/users/{id}"),
            &json!({"nickname": "Renamed"}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "GET",
            &format!("/api/users/{id}"),
            &json!({}),
            &token,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["nickname"], "Renamed");
    assert_eq!(body["data"]["create_by"], "boss");

    // Delete, then the row reads as code 1004
    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "DELETE",
            &format!("/api/users/{id}"),
            &json!({}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "GET",
            &format!("/api/users/{id}"),
            &json!({}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn role_menu_assignment_roundtrip() {
    let test = spawn_app().await;
    let admin_id = seed_user(&test.state, "boss", "boss-password").await;
    let token = test.state.jwt.issue(admin_id).unwrap();

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/roles",
            &json!({"role_code": "ops", "name": "Operators"}),
            &token,
        ))
        .await
        .unwrap();
    let role_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/menus",
            &json!({"name": "Dashboard", "sort_order": 1}),
            &token,
        ))
        .await
        .unwrap();
    let menu_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "PUT",
            &format!("/api/roles/{role_id}/menus"),
            &json!({"menu_ids": [menu_id]}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "GET",
            &format!("/api/roles/{role_id}/menus"),
            &json!({}),
            &token,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["name"], "Dashboard");
}

#[tokio::test]
async fn department_tree_nests_children() {
    let test = spawn_app().await;
    let admin_id = seed_user(&test.state, "boss", "boss-password").await;
    let token = test.state.jwt.issue(admin_id).unwrap();

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/departments",
            &json!({"name": "HQ"}),
            &token,
        ))
        .await
        .unwrap();
    let hq_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/departments",
            &json!({"name": "Engineering", "parent_id": hq_id}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .clone()
        .oneshot(request_json(
            "GET",
            "/api/departments/tree",
            &json!({}),
            &token,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["name"], "HQ");
    assert_eq!(body["data"][0]["children"][0]["name"], "Engineering");
}

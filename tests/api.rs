use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower::ServiceExt;

use userbase::app::build_app;
use userbase::config::AppConfig;
use userbase::state::AppState;
use userbase::users::memory::InMemoryUserStore;
use userbase::users::password::{Argon2Hasher, PasswordHasher};
use userbase::users::service::UserService;
use userbase::users::store::UserStore;

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        database_url: "postgres://unused".into(),
        app_name: "Userbase API".into(),
        host: "127.0.0.1".into(),
        port: 0,
    })
}

/// App over `AppState::fake()`, for cases that only drive the HTTP surface.
fn app() -> Router {
    build_app(AppState::fake())
}

/// App over a store the test retains a handle to, for assertions that look
/// behind the API.
fn app_with_store() -> (Router, Arc<InMemoryUserStore>) {
    let store = Arc::new(InMemoryUserStore::new());
    let users = UserService::new(store.clone(), Arc::new(Argon2Hasher));
    (
        build_app(AppState::from_parts(users, test_config())),
        store,
    )
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_user(app: &Router, body: Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn user_payload(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "password123",
    })
}

// --- root and health ---

#[tokio::test]
async fn root_returns_message_and_version() {
    let app = app();

    let res = get(&app, "/").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["message"], "Welcome to Userbase API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app();

    let res = get(&app, "/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({ "status": "healthy" }));
}

// --- registration ---

#[tokio::test]
async fn create_user_returns_created_user_without_password() {
    let app = app();

    let res = post_user(&app, user_payload("testuser", "test@example.com")).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = body_json(res).await;
    assert_eq!(body["username"], "testuser");
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["id"], 1);

    let created_at = body["created_at"].as_str().unwrap();
    OffsetDateTime::parse(created_at, &Rfc3339).expect("created_at should be RFC 3339");

    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert!(!keys.iter().any(|k| k.contains("password")));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = app();

    let res = post_user(&app, user_payload("testuser", "test@example.com")).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = post_user(&app, user_payload("testuser", "different@example.com")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["detail"], "Username already registered");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = app();

    let res = post_user(&app, user_payload("testuser", "test@example.com")).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = post_user(&app, user_payload("differentuser", "test@example.com")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["detail"], "Email already registered");
}

#[tokio::test]
async fn invalid_email_is_unprocessable() {
    let app = app();

    let res = post_user(&app, user_payload("testuser", "invalidemail")).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let detail = body_json(res).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("email"));
}

#[tokio::test]
async fn short_password_is_unprocessable() {
    let app = app();

    let res = post_user(
        &app,
        json!({"username": "testuser", "email": "test@example.com", "password": "pass"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(res).await["detail"],
        "password must be at least 8 characters"
    );
}

#[tokio::test]
async fn short_username_is_unprocessable() {
    let app = app();

    let res = post_user(&app, user_payload("ab", "test@example.com")).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn username_with_invalid_characters_is_unprocessable() {
    let app = app();

    let res = post_user(&app, user_payload("john doe", "john@example.com")).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn request_missing_a_field_is_unprocessable() {
    let app = app();

    let res = post_user(
        &app,
        json!({"username": "testuser", "email": "test@example.com"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn password_is_stored_hashed() {
    let (app, store) = app_with_store();

    let res = post_user(&app, user_payload("testuser", "test@example.com")).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let stored = store
        .find_by_username("testuser")
        .await
        .unwrap()
        .expect("user should be in the store");
    assert_ne!(stored.password_hash, "password123");
    assert!(stored.password_hash.starts_with("$argon2"));
    assert!(Argon2Hasher
        .verify("password123", &stored.password_hash)
        .unwrap());
}

// --- listing ---

#[tokio::test]
async fn empty_store_lists_no_users() {
    let app = app();

    let res = get(&app, "/users/").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!([]));
}

#[tokio::test]
async fn list_returns_users_in_creation_order() {
    let app = app();

    for name in ["user1", "user2", "user3"] {
        let res = post_user(&app, user_payload(name, &format!("{name}@example.com"))).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = get(&app, "/users/").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 3);

    let ids: Vec<i64> = users.iter().map(|u| u["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    for user in users {
        let keys: Vec<&String> = user.as_object().unwrap().keys().collect();
        assert!(!keys.iter().any(|k| k.contains("password")));
    }
}

#[tokio::test]
async fn list_pagination_skips_and_limits() {
    let app = app();

    for i in 0..5 {
        let res = post_user(
            &app,
            user_payload(&format!("user{i}"), &format!("user{i}@example.com")),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = get(&app, "/users/?skip=2&limit=2").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 4]);

    let res = get(&app, "/users/?skip=10").await;
    assert_eq!(body_json(res).await, json!([]));
}

#[tokio::test]
async fn negative_paging_values_are_normalized() {
    let app = app();

    for name in ["user1", "user2", "user3"] {
        post_user(&app, user_payload(name, &format!("{name}@example.com"))).await;
    }

    let res = get(&app, "/users/?skip=-1&limit=2").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let res = get(&app, "/users/?limit=-1").await;
    assert_eq!(body_json(res).await, json!([]));
}

// --- single user ---

#[tokio::test]
async fn get_user_by_id_returns_the_record() {
    let app = app();

    let res = post_user(&app, user_payload("testuser", "test@example.com")).await;
    let id = body_json(res).await["id"].as_i64().unwrap();

    let res = get(&app, &format!("/users/{id}")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["username"], "testuser");
    assert_eq!(body["email"], "test@example.com");

    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert!(!keys.iter().any(|k| k.contains("password")));
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let app = app();

    let res = get(&app, "/users/99999").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["detail"], "User not found");
}

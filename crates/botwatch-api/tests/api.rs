use std::path::Path;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use botwatch_api::{AppStateInner, router};
use botwatch_db::{Database, StoreOptions};

const PUBLIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../public");

fn app_with(options: StoreOptions) -> Router {
    let db = Database::open_in_memory(options).unwrap();
    router(AppStateInner::new(db), Path::new(PUBLIC_DIR))
}

fn app() -> Router {
    app_with(StoreOptions::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn create_user(app: &Router, telegram_id: i64, username: &str) -> i64 {
    let (status, body) = post(
        app,
        "/api/users",
        json!({ "telegram_id": telegram_id, "username": username, "first_name": "Nora" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn monitoring_scenario() {
    let app = app();

    let (status, user) = post(
        &app,
        "/api/users",
        json!({
            "telegram_id": 12345,
            "username": "monitor",
            "first_name": "Ada",
            "last_name": "Lovelace"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(user["id"].as_i64().unwrap() > 0);
    assert_eq!(user["telegram_id"], 12345);
    assert_eq!(user["username"], "monitor");
    assert_eq!(user["first_name"], "Ada");
    assert_eq!(user["last_name"], "Lovelace");
    assert!(user["created_at"].is_string());

    let (status, message) = post(
        &app,
        "/api/messages",
        json!({ "user_id": user["id"], "chat_id": "general", "text": "Mensaje de prueba" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(message["id"].as_i64().unwrap() > 0);
    assert_eq!(message["text"], "Mensaje de prueba");
    assert_eq!(message["chat_id"], "general");
    assert_eq!(message["user_id"], user["id"]);

    let (status, stats) = get(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["users"], 1);
    assert_eq!(stats["messages"], 1);
    assert_eq!(stats["last_message_at"], message["created_at"]);
}

#[tokio::test]
async fn listed_messages_carry_author_names() {
    let app = app();
    let user_id = create_user(&app, 54321, "reporter").await;
    post(&app, "/api/messages", json!({ "user_id": user_id, "text": "hello" })).await;

    let (status, list) = get(&app, "/api/messages").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["text"], "hello");
    assert_eq!(list[0]["username"], "reporter");
    assert_eq!(list[0]["first_name"], "Nora");
    assert_eq!(list[0]["last_name"], Value::Null);
    assert_eq!(list[0]["chat_id"], Value::Null);
}

#[tokio::test]
async fn create_user_rejects_bad_telegram_id() {
    let app = app();
    for telegram_id in [json!(0), json!(-5), json!(1.5), json!("abc"), json!(null), json!(true)] {
        let (status, body) = post(&app, "/api/users", json!({ "telegram_id": telegram_id })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "telegram_id {telegram_id}");
        assert_eq!(body["error"], "invalid telegram_id");
    }

    let (status, _) = post(&app, "/api/users", json!({ "username": "nobody" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = get(&app, "/api/stats").await;
    assert_eq!(stats["users"], 0);
}

#[tokio::test]
async fn create_user_coerces_optional_fields() {
    let app = app();
    let (status, user) = post(
        &app,
        "/api/users",
        json!({ "telegram_id": "777", "username": "", "first_name": 0, "last_name": "Smith" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["telegram_id"], 777);
    assert_eq!(user["username"], Value::Null);
    assert_eq!(user["first_name"], Value::Null);
    assert_eq!(user["last_name"], "Smith");
}

#[tokio::test]
async fn create_message_validates_input() {
    let app = app();
    let user_id = create_user(&app, 1, "monitor").await;

    let (status, body) = post(&app, "/api/messages", json!({ "user_id": 0, "text": "hi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid user_id");

    let (status, body) = post(&app, "/api/messages", json!({ "user_id": user_id, "text": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "text is required");

    let (status, _) = post(&app, "/api/messages", json!({ "user_id": user_id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, message) = post(
        &app,
        "/api/messages",
        json!({ "user_id": user_id.to_string(), "chat_id": -100123, "text": "  padded  " }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["text"], "padded");
    assert_eq!(message["chat_id"], "-100123");
    assert_eq!(message["user_id"], user_id);

    let (status, message) = post(
        &app,
        "/api/messages",
        json!({ "user_id": user_id, "chat_id": 1.0, "text": "float chat" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["chat_id"], "1");
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_object_bodies_are_client_errors() {
    let app = app();

    let (status, body) = post(&app, "/api/users", json!([12345, "arr"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let user_id = create_user(&app, 1, "monitor").await;
    let (status, _) = post(&app, "/api/messages", json!([user_id, "general", "hi"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post(&app, "/api/messages", json!("hi")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = get(&app, "/api/stats").await;
    assert_eq!(stats["users"], 1);
    assert_eq!(stats["messages"], 0);
}

#[tokio::test]
async fn unknown_user_is_accepted_unless_foreign_keys_are_enforced() {
    let lenient = app();
    let (status, _) = post(&lenient, "/api/messages", json!({ "user_id": 999, "text": "orphan" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = get(&lenient, "/api/messages").await;
    assert_eq!(list[0]["user_id"], 999);
    assert_eq!(list[0]["username"], Value::Null);

    let strict = app_with(StoreOptions {
        enforce_foreign_keys: true,
    });
    let (status, body) = post(&strict, "/api/messages", json!({ "user_id": 999, "text": "orphan" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user_id does not reference an existing user");
}

#[tokio::test]
async fn listings_respect_clamped_limits() {
    let app = app();
    let user_id = create_user(&app, 1, "monitor").await;
    for i in 1..=30 {
        let (status, _) = post(
            &app,
            "/api/messages",
            json!({ "user_id": user_id, "text": format!("message {i}") }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let count = |value: Value| value.as_array().unwrap().len();

    assert_eq!(count(get(&app, "/api/messages").await.1), 25);
    assert_eq!(count(get(&app, "/api/messages?limit=5").await.1), 5);
    assert_eq!(count(get(&app, "/api/messages?limit=0").await.1), 1);
    assert_eq!(count(get(&app, "/api/messages?limit=500").await.1), 30);
    assert_eq!(count(get(&app, "/api/messages?limit=abc").await.1), 25);
    assert_eq!(count(get(&app, "/api/messages?limit=").await.1), 25);
    assert_eq!(count(get(&app, "/api/messages?limit=5&limit=6").await.1), 5);

    let (_, newest) = get(&app, "/api/messages?limit=1").await;
    assert_eq!(newest[0]["text"], "message 30");

    for i in 2..=60 {
        create_user(&app, i, &format!("user{i}")).await;
    }
    assert_eq!(count(get(&app, "/api/users").await.1), 50);
    assert_eq!(count(get(&app, "/api/users?limit=3").await.1), 3);
    assert_eq!(count(get(&app, "/api/users?limit=-1").await.1), 1);
    assert_eq!(count(get(&app, "/api/users?limit=1000").await.1), 60);
    assert_eq!(count(get(&app, "/api/users?limit=lots").await.1), 50);
}

#[tokio::test]
async fn stats_on_empty_store() {
    let (status, stats) = get(&app(), "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "users": 0, "messages": 0, "last_message_at": null }));
}

#[tokio::test]
async fn stats_follow_latest_message() {
    let app = app();
    let first = create_user(&app, 10, "a").await;
    let second = create_user(&app, 20, "b").await;
    post(&app, "/api/messages", json!({ "user_id": first, "text": "one" })).await;
    let (_, last) = post(&app, "/api/messages", json!({ "user_id": second, "text": "two" })).await;

    let (_, stats) = get(&app, "/api/stats").await;
    assert_eq!(stats["users"], 2);
    assert_eq!(stats["messages"], 2);
    assert_eq!(stats["last_message_at"], last["created_at"]);
}

#[tokio::test]
async fn unknown_api_route_is_json_404() {
    let app = app();
    let (status, body) = get(&app, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "route not found");

    let (status, body) = get(&app, "/api/users/42/messages").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(&app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn root_serves_dashboard() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("app.js"));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/missing.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn file_backed_store_serves_requests() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("data").join("bot.db"), StoreOptions::default()).unwrap();
    let app = router(AppStateInner::new(db), Path::new(PUBLIC_DIR));

    let user_id = create_user(&app, 99, "disk").await;
    let (status, _) = post(&app, "/api/messages", json!({ "user_id": user_id, "text": "saved" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stats) = get(&app, "/api/stats").await;
    assert_eq!(stats["messages"], 1);
}

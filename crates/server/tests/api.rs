use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use ledger::Ledger;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build().await.unwrap();
    server::app(ledger)
}

async fn send(app: &Router, method: &str, uri: &str, scope: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(scope) = scope {
        builder = builder.header("x-ledger-scope", scope);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_account(app: &Router, scope: &str, name: &str, opening: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/accounts",
        Some(scope),
        Some(json!({
            "name": name,
            "currency": "EUR",
            "opening_balance_minor": opening,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_a_scope_header_are_unauthorized() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Present but malformed headers are rejected at decode time.
    let (status, _) = send(&app, "GET", "/accounts", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn accounts_are_created_and_listed_per_scope() {
    let app = app().await;
    let id = create_account(&app, "user:alice", "Main", 1000).await;

    let (status, body) = send(&app, "GET", "/accounts", Some("user:alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accounts"][0]["id"], Value::String(id.clone()));
    assert_eq!(body["accounts"][0]["balance_minor"], json!(1000));

    // Another scope sees nothing.
    let (status, body) = send(&app, "GET", "/accounts", Some("user:bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accounts"], json!([]));

    let (status, _) = send(
        &app,
        "GET",
        &format!("/accounts/{id}"),
        Some("user:bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_account_names_conflict() {
    let app = app().await;
    create_account(&app, "user:alice", "Main", 0).await;

    let (status, _) = send(
        &app,
        "POST",
        "/accounts",
        Some("user:alice"),
        Some(json!({ "name": "Main" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn transactions_move_the_balance_even_below_zero() {
    let app = app().await;
    let id = create_account(&app, "user:alice", "Main", 500).await;

    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some("user:alice"),
        Some(json!({
            "account_id": id,
            "kind": "expense",
            "amount_minor": 200,
            "occurred_at": Utc::now().to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/accounts/{id}/balance"),
        Some("user:alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance_minor"], json!(300));

    // Balances are signed, so an expense past zero is accepted.
    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some("user:alice"),
        Some(json!({
            "account_id": id,
            "kind": "expense",
            "amount_minor": 9999,
            "occurred_at": Utc::now().to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/accounts/{id}/balance"),
        Some("user:alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance_minor"], json!(-9699));

    // A non-positive amount is still invalid.
    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some("user:alice"),
        Some(json!({
            "account_id": id,
            "kind": "expense",
            "amount_minor": 0,
            "occurred_at": Utc::now().to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn transfers_and_activity_round_trip_over_http() {
    let app = app().await;
    let checking = create_account(&app, "user:alice", "Checking", 1000).await;
    let savings = create_account(&app, "user:alice", "Savings", 0).await;

    let (status, transfer) = send(
        &app,
        "POST",
        "/transfers",
        Some("user:alice"),
        Some(json!({
            "from_account_id": checking,
            "to_account_id": savings,
            "amount_minor": 400,
            "occurred_at": Utc::now().to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/activity", Some("user:alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["items"][0]["kind"], json!("transfer"));
    assert_eq!(body["items"][0]["direction"], json!("internal"));
    assert_eq!(body["items"][0]["label"], json!("Checking -> Savings"));

    let transfer_id = transfer["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/transfers/{transfer_id}"),
        Some("user:alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/accounts/{checking}/balance"),
        Some("user:alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance_minor"], json!(1000));
}

#[tokio::test]
async fn activity_rejects_unknown_kind_filters() {
    let app = app().await;
    let (status, _) = send(
        &app,
        "GET",
        "/activity?kinds=income,banana",
        Some("user:alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

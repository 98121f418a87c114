//! End-to-end tests for the `/bookmarks` endpoints.
//!
//! Every test builds the full router over a fresh in-memory database and
//! drives it with `oneshot`, so requests go through routing, extraction,
//! validation, the store and serialization exactly as in production.

mod fixtures;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use bookmarks::bookmarks::BookmarksService;
use bookmarks::db::Database;
use bookmarks::handler::AppState;
use fixtures::{make_bookmarks_array, make_malicious_bookmark};

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Value>,
}

async fn setup() -> (Router, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().await.expect("open in-memory database"));
    let app = bookmarks::app(AppState { db: db.clone() });
    (app, db)
}

async fn seed(db: &Database) -> Vec<Value> {
    let service = BookmarksService::new(db.connection());
    for (input, _) in make_bookmarks_array() {
        service.insert(input).await.expect("insert fixture");
    }
    make_bookmarks_array().into_iter().map(|(_, expected)| expected).collect()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).expect("response body is JSON"))
    };

    TestResponse { status, headers, body }
}

fn not_found_body() -> Value {
    json!({ "error": { "message": "Bookmark doesn't exist" } })
}

fn valid_payload() -> Value {
    json!({
        "title": "Test new bookmark",
        "url": "https://www.test.com",
        "rating": 4,
        "description": "Test new bookmark description",
    })
}

// ============================================================================
// GET /bookmarks
// ============================================================================

#[tokio::test]
async fn list_responds_200_and_empty_list_without_bookmarks() {
    let (app, _db) = setup().await;

    let res = send(&app, Method::GET, "/bookmarks", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, Some(json!([])));
}

#[tokio::test]
async fn list_responds_200_and_all_bookmarks() {
    let (app, db) = setup().await;
    let expected = seed(&db).await;

    let res = send(&app, Method::GET, "/bookmarks", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, Some(Value::Array(expected)));
}

#[tokio::test]
async fn list_sanitizes_malicious_bookmark() {
    let (app, db) = setup().await;
    let (malicious, expected) = make_malicious_bookmark();
    BookmarksService::new(db.connection()).insert(malicious).await.unwrap();

    let res = send(&app, Method::GET, "/bookmarks", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, Some(json!([expected])));
}

// ============================================================================
// GET /bookmarks/:id
// ============================================================================

#[tokio::test]
async fn get_unknown_id_responds_404() {
    let (app, _db) = setup().await;

    let res = send(&app, Method::GET, "/bookmarks/123456", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, Some(not_found_body()));
}

#[tokio::test]
async fn get_non_numeric_id_responds_404() {
    let (app, db) = setup().await;
    seed(&db).await;

    let res = send(&app, Method::GET, "/bookmarks/not-an-id", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, Some(not_found_body()));
}

#[tokio::test]
async fn get_responds_200_and_the_bookmark() {
    let (app, db) = setup().await;
    let expected = seed(&db).await;

    let res = send(&app, Method::GET, "/bookmarks/2", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_ref(), Some(&expected[1]));
}

#[tokio::test]
async fn get_sanitizes_malicious_bookmark() {
    let (app, db) = setup().await;
    let (malicious, expected) = make_malicious_bookmark();
    let stored = BookmarksService::new(db.connection()).insert(malicious).await.unwrap();

    let res = send(&app, Method::GET, &format!("/bookmarks/{}", stored.id), None).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.body.unwrap();
    assert_eq!(body["title"], expected["title"]);
    assert_eq!(body["description"], expected["description"]);
    assert_eq!(body["rating"], Value::Null);

    // stored bytes are untouched
    let raw = BookmarksService::new(db.connection()).get_by_id(stored.id).await.unwrap().unwrap();
    assert!(raw.title.contains("<script>"));
}

// ============================================================================
// POST /bookmarks
// ============================================================================

#[tokio::test]
async fn create_responds_400_naming_first_missing_field() {
    let (app, db) = setup().await;

    for field in ["title", "url", "rating", "description"] {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove(field);

        let res = send(&app, Method::POST, "/bookmarks", Some(payload)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "missing {field}");
        assert_eq!(
            res.body,
            Some(json!({ "error": { "message": format!("Missing '{}' in request body", field) } }))
        );
    }

    let res = send(&app, Method::POST, "/bookmarks", Some(json!({ "rating": 3 }))).await;
    assert_eq!(
        res.body,
        Some(json!({ "error": { "message": "Missing 'title' in request body" } }))
    );

    // nothing reached the store
    let all = BookmarksService::new(db.connection()).list_all().await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn create_responds_201_with_location_and_round_trips() {
    let (app, _db) = setup().await;
    let payload = valid_payload();

    let res = send(&app, Method::POST, "/bookmarks", Some(payload.clone())).await;
    assert_eq!(res.status, StatusCode::CREATED);

    let body = res.body.unwrap();
    let id = body["id"].as_i64().expect("id assigned");
    for field in ["title", "url", "rating", "description"] {
        assert_eq!(body[field], payload[field]);
    }
    assert_eq!(
        res.headers.get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("/bookmarks/{}", id)
    );

    let fetched = send(&app, Method::GET, &format!("/bookmarks/{}", id), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, Some(body));
}

#[tokio::test]
async fn create_sanitizes_response_body() {
    let (app, _db) = setup().await;
    let payload = json!({
        "title": r#"Naughty naughty very naughty <script>alert("xss");</script>"#,
        "url": "https://www.hackers.com",
        "rating": 1,
        "description": r#"Bad image <img src="https://url.to.file.which/does-not.exist" onerror="alert(document.cookie);">. But not <strong>all</strong> bad."#,
    });

    let res = send(&app, Method::POST, "/bookmarks", Some(payload)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let body = res.body.unwrap();
    assert_eq!(
        body["title"],
        r#"Naughty naughty very naughty &lt;script&gt;alert("xss");&lt;/script&gt;"#
    );
    assert_eq!(
        body["description"],
        r#"Bad image <img src="https://url.to.file.which/does-not.exist">. But not <strong>all</strong> bad."#
    );
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let (app, _db) = setup().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/bookmarks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"]["message"].is_string());
}

// ============================================================================
// DELETE /bookmarks/:id
// ============================================================================

#[tokio::test]
async fn delete_unknown_id_responds_404() {
    let (app, _db) = setup().await;

    let res = send(&app, Method::DELETE, "/bookmarks/123456", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, Some(not_found_body()));
}

#[tokio::test]
async fn delete_responds_204_and_removes_the_bookmark() {
    let (app, db) = setup().await;
    let expected = seed(&db).await;

    let res = send(&app, Method::DELETE, "/bookmarks/2", None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_none());

    let remaining: Vec<Value> = expected.into_iter().filter(|b| b["id"] != 2).collect();
    let list = send(&app, Method::GET, "/bookmarks", None).await;
    assert_eq!(list.body, Some(Value::Array(remaining)));

    let again = send(&app, Method::DELETE, "/bookmarks/2", None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// PATCH /bookmarks/:id
// ============================================================================

#[tokio::test]
async fn patch_unknown_id_responds_404() {
    let (app, _db) = setup().await;

    let res = send(&app, Method::PATCH, "/bookmarks/123456", Some(json!({ "title": "x" }))).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, Some(not_found_body()));
}

#[tokio::test]
async fn patch_without_recognized_fields_responds_400() {
    let (app, db) = setup().await;
    seed(&db).await;

    let res = send(
        &app,
        Method::PATCH,
        "/bookmarks/2",
        Some(json!({ "irrelevantField": "foo" })),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body,
        Some(json!({
            "error": {
                "message": "Request body must contain either 'title', 'url', 'rating', or 'description'"
            }
        }))
    );
}

#[tokio::test]
async fn patch_responds_204_and_updates_all_fields() {
    let (app, db) = setup().await;
    seed(&db).await;

    let update = json!({
        "title": "updated bookmark title",
        "url": "https://updated-url.com",
        "rating": 1,
        "description": "updated bookmark description",
    });
    let res = send(&app, Method::PATCH, "/bookmarks/2", Some(update.clone())).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_none());

    let mut expected = update;
    expected["id"] = json!(2);
    let fetched = send(&app, Method::GET, "/bookmarks/2", None).await;
    assert_eq!(fetched.body, Some(expected));
}

#[tokio::test]
async fn patch_subset_leaves_other_fields_unchanged() {
    let (app, db) = setup().await;
    let seeded = seed(&db).await;

    let res = send(
        &app,
        Method::PATCH,
        "/bookmarks/2",
        Some(json!({
            "title": "updated bookmark title",
            "fieldToIgnore": "should not be in GET response",
        })),
    )
    .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let mut expected = seeded[1].clone();
    expected["title"] = json!("updated bookmark title");
    let fetched = send(&app, Method::GET, "/bookmarks/2", None).await;
    assert_eq!(fetched.body, Some(expected));
}

// ============================================================================
// GET /
// ============================================================================

#[tokio::test]
async fn healthcheck_responds_ok() {
    let (app, _db) = setup().await;

    let res = send(&app, Method::GET, "/", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, Some(json!({ "status": "ok" })));
}

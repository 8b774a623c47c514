//! Router-level tests against in-memory backends

use std::{sync::Arc, time::Duration};

use api::{AppState, create_router};
use async_trait::async_trait;
use auth::{JwtConfig, JwtService, repositories::InMemoryUserRepository};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use media::{
    ApodClient, MemoryStore,
    apod::{ApodError, ApodResponse},
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct StubApod;

#[async_trait]
impl ApodClient for StubApod {
    async fn picture(&self, date: NaiveDate) -> Result<ApodResponse, ApodError> {
        Ok(ApodResponse {
            copyright: None,
            date: date.format("%Y-%m-%d").to_string(),
            explanation: "Stars.".to_string(),
            hdurl: Some("https://apod.nasa.gov/hd.jpg".to_string()),
            media_type: "image".to_string(),
            service_version: "v1".to_string(),
            title: "Stars".to_string(),
            url: "https://apod.nasa.gov/sd.jpg".to_string(),
        })
    }
}

fn app() -> Router {
    let jwt = JwtService::new(JwtConfig {
        access_secret: "access-secret".to_string(),
        refresh_secret: "refresh-secret".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 86_400,
    });

    create_router(AppState::new(
        Arc::new(InMemoryUserRepository::new()),
        jwt,
        Arc::new(MemoryStore::new("album")),
        Arc::new(StubApod),
        Duration::from_secs(5),
    ))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn profile(email: &str) -> Value {
    json!({
        "first_name": "A",
        "last_name": "B",
        "email": email,
        "password": "secret"
    })
}

async fn register(app: &Router, email: &str) -> Value {
    let (status, pair) = send_json(app, post_json("/api/v1/auth/register", profile(email), None)).await;
    assert_eq!(status, StatusCode::OK);
    pair
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send_json(&app(), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_api_docs_are_served_without_a_token() {
    let app = app();

    let (status, doc) = send_json(&app, get("/api-doc/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Astro Album API");
    assert!(doc["paths"]["/api/v1/auth/login"]["post"].is_object());
    assert!(doc["paths"]["/api/v1/users/current/albums/upload"]["post"].is_object());

    let (status, page) = send(&app, get("/swagger/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&page).contains("swagger"));
}

#[tokio::test]
async fn test_register_then_current_user() {
    let app = app();
    let pair = register(&app, "a@b.com").await;

    let access = pair["access_token"].as_str().unwrap();
    assert!(!access.is_empty());
    assert!(!pair["refresh_token"].as_str().unwrap().is_empty());

    let (status, user) = send_json(&app, get("/api/v1/users/current", Some(access))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "a@b.com");
    assert!(user.get("password_hash").is_none());

    let (status, body) = send_json(&app, get("/api/v1/users/current", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_login_refresh_and_logout() {
    let app = app();
    register(&app, "a@b.com").await;

    let (status, body) = send_json(
        &app,
        post_json("/api/v1/auth/login", json!({ "email": "a@b.com", "password": "nope" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let (status, pair) = send_json(
        &app,
        post_json("/api/v1/auth/login", json!({ "email": "a@b.com", "password": "secret" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let refresh_token = pair["refresh_token"].as_str().unwrap();
    let (status, refreshed) = send_json(
        &app,
        post_json("/api/v1/auth/refresh", json!({ "refresh_token": refresh_token }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["refresh_token"], refresh_token);

    let (status, _) = send_json(
        &app,
        post_json("/api/v1/auth/refresh", json!({ "refresh_token": "garbage" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let access = refreshed["access_token"].as_str().unwrap();
    let (status, body) = send(&app, post_json("/api/v1/auth/logout", json!({}), Some(access))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_duplicate_registration_and_bad_bodies() {
    let app = app();
    register(&app, "a@b.com").await;

    let (status, body) =
        send_json(&app, post_json("/api/v1/auth/register", profile("a@b.com"), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_user_crud() {
    let app = app();
    let pair = register(&app, "admin@b.com").await;
    let token = pair["access_token"].as_str().unwrap();

    let (status, created) =
        send_json(&app, post_json("/api/v1/users", profile("c@d.com"), Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, user) = send_json(&app, get(&format!("/api/v1/users/{}", id), Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "c@d.com");

    let (status, user) = send_json(&app, get("/api/v1/users?email=c@d.com", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], id.as_str());

    let (status, _) = send_json(&app, get("/api/v1/users", Some(token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let update = Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/users/{}", id))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(
            json!({ "first_name": "C", "last_name": "D", "email": "admin@b.com" }).to_string(),
        ))
        .unwrap();
    let (status, _) = send_json(&app, update).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let delete = |uri: String| {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&app, delete(format!("/api/v1/users/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, delete(format!("/api/v1/users/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, get(&format!("/api/v1/users/{}", id), Some(token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, get("/api/v1/users/not-a-uuid", Some(token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_album_upload_list_download() {
    let app = app();
    let pair = register(&app, "a@b.com").await;
    let token = pair["access_token"].as_str().unwrap();

    let boundary = "album-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"date\"\r\n\r\n2024-01-02\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let upload = Request::builder()
        .method("POST")
        .uri("/api/v1/users/current/albums/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();
    let (status, media) = send_json(&app, upload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(media["filename"], "a.png");
    assert_eq!(media["date"], "2024-01-02");

    let (status, all) = send_json(&app, get("/api/v1/users/current/albums", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, other_day) = send_json(
        &app,
        get("/api/v1/users/current/albums?date=2024-01-03", Some(token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(other_day.as_array().unwrap().is_empty());

    let (status, _) = send_json(
        &app,
        get("/api/v1/users/current/albums?date=Jan-2", Some(token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get(
            "/api/v1/users/current/albums/download?date=2024-01-02&filename=a.png",
            Some(token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"a.png\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.to_vec(), vec![0x89, b'P', b'N', b'G']);

    let (status, body) = send_json(
        &app,
        get(
            "/api/v1/users/current/albums/download?date=2024-01-02&filename=missing.png",
            Some(token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);

    for filename in ["say%22cheese%22.png", "back%5Cslash.png", "line%0D%0Abreak.png"] {
        let (status, body) = send_json(
            &app,
            get(
                &format!(
                    "/api/v1/users/current/albums/download?date=2024-01-02&filename={}",
                    filename
                ),
                Some(token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }
}

#[tokio::test]
async fn test_apod_requires_token_and_maps_picture() {
    let app = app();

    let (status, _) = send_json(&app, get("/api/v1/apod", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let pair = register(&app, "a@b.com").await;
    let token = pair["access_token"].as_str().unwrap();

    let (status, media) = send_json(&app, get("/api/v1/apod?date=2024-01-02", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(media["filename"], "Stars");
    assert_eq!(media["url"], "https://apod.nasa.gov/hd.jpg");
    assert_eq!(media["date"], "2024-01-02");

    let (status, _) = send_json(&app, get("/api/v1/apod?date=yesterday", Some(token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

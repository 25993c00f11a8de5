#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP tests for everything answered before the database is reached.

mod common;

use axum::http::{Method, StatusCode, header};
use serde_json::json;
use uuid::Uuid;

use common::{TestApp, body_json, body_string, expect_json, header_str};
use nwuian_test_utils::{PNG_BYTES, assert, multipart_file, test_post};

const INVALID_JSON: &str = "অনুরোধের বডি সঠিক JSON নয়";

#[tokio::test]
async fn health_reports_unreachable_database() {
    let app = TestApp::new();
    let body = expect_json(app.get("/health").await, StatusCode::SERVICE_UNAVAILABLE).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["postgres"], false);
}

#[tokio::test]
async fn create_post_joins_every_violation() {
    let app = TestApp::new();
    let body = test_post("ক").with_content("ছোট").to_json();

    let response = app.post_json("/api/admin/posts", &body).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert::message_eq(
        &json,
        "শিরোনাম কমপক্ষে ৩ অক্ষর হতে হবে | কনটেন্ট কমপক্ষে ১০ অক্ষর হতে হবে",
    );
}

#[tokio::test]
async fn create_post_rejects_bad_image_url() {
    let app = TestApp::new();
    let body = test_post("রমজানের প্রস্তুতি")
        .with_image("not a url")
        .to_json();

    let json = expect_json(
        app.post_json("/api/admin/posts", &body).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert::message_eq(&json, "সঠিক ইমেজ URL দিন");
}

#[tokio::test]
async fn create_post_title_is_trimmed_before_validation() {
    let app = TestApp::new();
    let body = test_post("   ক   ").to_json();

    let json = expect_json(
        app.post_json("/api/admin/posts", &body).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert::message_eq(&json, "শিরোনাম কমপক্ষে ৩ অক্ষর হতে হবে");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();
    let response = app
        .send_json(Method::POST, "/api/admin/posts", "{\"title\": ")
        .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert::message_eq(&json, INVALID_JSON);
}

#[tokio::test]
async fn update_rejects_unknown_fields() {
    let app = TestApp::new();
    let uri = format!("/api/admin/posts/{}", Uuid::now_v7());
    let response = app.put_json(&uri, &json!({ "slug": "hand-picked" })).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert::message_eq(&json, INVALID_JSON);
}

#[tokio::test]
async fn invalid_post_id_is_a_bad_request() {
    let app = TestApp::new();
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let response = app
            .send_json(method, "/api/admin/posts/64f1c2a9e4b0a1b2c3d4e5f6", "{}")
            .await;
        let json = expect_json(response, StatusCode::BAD_REQUEST).await;
        assert::message_eq(&json, "সঠিক পোস্ট আইডি দিন");
    }
}

#[tokio::test]
async fn update_validates_only_present_fields() {
    let app = TestApp::new();
    let uri = format!("/api/admin/posts/{}", Uuid::now_v7());
    let response = app.put_json(&uri, &json!({ "content": "ছোট" })).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert::message_eq(&json, "কনটেন্ট কমপক্ষে ১০ অক্ষর হতে হবে");
}

#[tokio::test]
async fn category_name_must_be_two_characters() {
    let app = TestApp::new();
    let response = app
        .post_json("/api/categories", &json!({ "name": "  ক " }))
        .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert::message_eq(&json, "ক্যাটাগরির নাম কমপক্ষে ২ অক্ষর হতে হবে");
}

#[tokio::test]
async fn unknown_page_slug_is_not_found() {
    let app = TestApp::new();

    let json = expect_json(app.get("/api/pages/about").await, StatusCode::NOT_FOUND).await;
    assert::message_eq(&json, "পেজ পাওয়া যায়নি");

    let json = expect_json(
        app.get("/api/admin/pages/about").await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert::message_eq(&json, "পেজ পাওয়া যায়নি");
}

#[tokio::test]
async fn saving_a_page_validates_title_and_content() {
    let app = TestApp::new();
    let response = app
        .put_json(
            "/api/admin/pages/contact",
            &json!({ "title": "য", "content": "যোগাযোগের ঠিকানা ও ইমেইল" }),
        )
        .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert::message_eq(&json, "শিরোনাম কমপক্ষে ২ অক্ষর হতে হবে");
}

#[tokio::test]
async fn upload_without_file_field() {
    let app = TestApp::new();
    let (body, content_type) = multipart_file("image", "a.png", "image/png", PNG_BYTES);
    let json = expect_json(
        app.upload(body, &content_type).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert::message_eq(&json, "file ফিল্ডে একটি ইমেজ ফাইল দিন");
}

#[tokio::test]
async fn upload_that_is_not_multipart() {
    let app = TestApp::new();
    let response = app
        .send_json(Method::POST, "/api/admin/upload", "{}")
        .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert::message_eq(&json, "file ফিল্ডে একটি ইমেজ ফাইল দিন");
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let app = TestApp::new();

    let (body, content_type) = multipart_file("file", "notes.txt", "text/plain", b"hello");
    let json = expect_json(
        app.upload(body, &content_type).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert::message_eq(&json, "শুধু ইমেজ ফাইল আপলোড করা যাবে");

    // Declared as an image but the bytes are a PDF.
    let (body, content_type) =
        multipart_file("file", "fake.png", "image/png", b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
    let json = expect_json(
        app.upload(body, &content_type).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert::message_eq(&json, "শুধু ইমেজ ফাইল আপলোড করা যাবে");
}

#[tokio::test]
async fn uploaded_image_is_served_back() {
    let app = TestApp::new();
    let (body, content_type) = multipart_file("file", "cover.png", "image/png", PNG_BYTES);

    let response = app.upload(body, &content_type).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CACHE_CONTROL),
        "no-store, max-age=0"
    );

    let json = body_json(response).await;
    assert::has_key(&json, "publicId");
    assert_eq!(json["bytes"], PNG_BYTES.len());
    assert_eq!(json["format"], "png");

    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("/files/"), "unexpected url {url}");

    let response = app.get(url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/png");
    assert::contains(
        &header_str(&response, header::CACHE_CONTROL),
        "immutable",
    );
}

#[tokio::test]
async fn unknown_api_path_is_json_not_found() {
    let app = TestApp::new();
    let json = expect_json(app.get("/api/nothing-here").await, StatusCode::NOT_FOUND).await;
    assert::message_eq(&json, "পাওয়া যায়নি");
}

#[tokio::test]
async fn unknown_page_renders_not_found_view() {
    let app = TestApp::new();
    let response = app.get("/no/such/page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert::contains(&header_str(&response, header::CONTENT_TYPE), "text/html");

    let html = body_string(response).await;
    assert::contains(&html, "পেজটি পাওয়া যায়নি");
    assert::contains(&html, "NWU IAN");
}

#[tokio::test]
async fn home_renders_error_view_when_database_is_down() {
    let app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let html = body_string(response).await;
    assert::contains(&html, "সার্ভার ত্রুটি");
    assert::not_contains(&html, "127.0.0.1");
}

#[tokio::test]
async fn cached_post_page_skips_the_database() {
    let app = TestApp::new();
    app.state
        .cache()
        .set("/posts/namaz", "<p>ক্যাশ থেকে</p>".to_string(), &[])
        .await;

    let response = app.get("/posts/namaz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<p>ক্যাশ থেকে</p>");

    let response = app.get("/posts/roza").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn database_errors_are_masked_in_json() {
    let app = TestApp::new();
    let json = expect_json(
        app.get("/api/posts").await,
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .await;
    assert::message_eq(&json, "সার্ভার ত্রুটি");
}

#[tokio::test]
async fn static_assets_are_served() {
    let app = TestApp::new();

    let response = app.get("/static/css/site.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "text/css; charset=utf-8"
    );

    let response = app.get("/static/../Cargo.toml").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

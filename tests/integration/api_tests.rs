//! Session, catalog and category endpoints

use axum::http::{Method, StatusCode};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use shelf_server::config::{AppConfig, DeployEnvironment};

use crate::common::TestApp;

#[tokio::test]
async fn test_root_liveness() {
    let app = TestApp::new();
    let response = app.request(Method::GET, "/", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "Book server running");
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
}

#[tokio::test]
async fn test_issue_session_sets_http_only_cookie() {
    let app = TestApp::new();
    let response = app
        .request(Method::POST, "/jwt", None, Some(json!({ "email": "a@x.com" })))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let cookie = response.set_cookie.unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_production_cookie_is_cross_site() {
    let config = AppConfig {
        environment: DeployEnvironment::Production,
        ..AppConfig::default()
    };
    let app = TestApp::with_config(config);
    let response = app
        .request(Method::POST, "/jwt", None, Some(json!({ "email": "a@x.com" })))
        .await;

    let cookie = response.set_cookie.unwrap();
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=None"));
}

#[tokio::test]
async fn test_session_with_audience_member_opens_protected_routes() {
    let app = TestApp::new();
    let response = app
        .request(
            Method::POST,
            "/jwt",
            None,
            Some(json!({ "email": "a@x.com", "aud": "shelf-web" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let set_cookie = response.set_cookie.unwrap();
    let cookie = set_cookie.split(';').next().unwrap().trim();

    let books = app.request(Method::GET, "/books", Some(cookie), None).await;
    assert_eq!(books.status, StatusCode::OK);

    let loans = app
        .request(Method::GET, "/borrowed-books/a@x.com", Some(cookie), None)
        .await;
    assert_eq!(loans.status, StatusCode::OK);
}

#[tokio::test]
async fn test_issue_session_requires_email() {
    let app = TestApp::new();
    let response = app
        .request(Method::POST, "/jwt", None, Some(json!({ "name": "Ada" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["code"], "InvalidRequest");
    assert!(response.set_cookie.is_none());
}

#[tokio::test]
async fn test_logout_clears_cookie_without_session() {
    let app = TestApp::new();
    let response = app.request(Method::GET, "/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let cookie = response.set_cookie.unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_protected_routes_reject_missing_cookie() {
    let app = TestApp::new();
    let id = ObjectId::new().to_hex();

    for (method, uri) in [
        (Method::GET, "/books".to_string()),
        (Method::GET, format!("/books/{}", id)),
        (Method::GET, format!("/book-details/{}", id)),
        (Method::GET, "/borrowed-books/a@x.com".to_string()),
    ] {
        let response = app.request(method, &uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(response.body["code"], "Unauthenticated");
        assert_eq!(response.body["error"], "unauthorized access");
    }
}

#[tokio::test]
async fn test_protected_write_is_not_applied_without_session() {
    let app = TestApp::new();
    let response = app
        .request(
            Method::POST,
            "/books",
            None,
            Some(json!({ "name": "Kindred", "authorName": "Octavia E. Butler", "category": "Sci-Fi" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let latest = app.request(Method::GET, "/latest-books", None, None).await;
    assert_eq!(latest.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_forged_and_garbage_tokens_are_rejected() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/books", Some("token=not-a-jwt"), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let other_config = AppConfig {
        auth: shelf_server::config::AuthConfig {
            jwt_secret: "someone-elses-secret".to_string(),
            ..AppConfig::default().auth
        },
        ..AppConfig::default()
    };
    let other_app = TestApp::with_config(other_config);
    let forged = other_app.login("a@x.com").await;

    let response = app.request(Method::GET, "/books", Some(&forged), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_book_crud() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let id = app.create_book(&cookie, "Kindred", "Sci-Fi", 3).await;

    let response = app
        .request(Method::GET, &format!("/books/{}", id), Some(&cookie), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["_id"], id.as_str());
    assert_eq!(response.body["name"], "Kindred");
    assert_eq!(response.body["authorName"], "Octavia E. Butler");
    assert_eq!(response.body["quantity"], 3);

    let details = app
        .request(Method::GET, &format!("/book-details/{}", id), Some(&cookie), None)
        .await;
    assert_eq!(details.body, response.body);

    let update = app
        .request(
            Method::PUT,
            &format!("/books/{}", id),
            Some(&cookie),
            Some(json!({ "name": "Kindred (25th anniversary)", "rating": "4.9" })),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(update.body["message"], "Book updated successfully");

    let response = app
        .request(Method::GET, &format!("/books/{}", id), Some(&cookie), None)
        .await;
    assert_eq!(response.body["name"], "Kindred (25th anniversary)");
    assert_eq!(response.body["rating"], 4.9);
    assert_eq!(response.body["quantity"], 3);

    let all = app.request(Method::GET, "/books", Some(&cookie), None).await;
    assert_eq!(all.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_book_accepts_string_quantity() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let response = app
        .request(
            Method::POST,
            "/books",
            Some(&cookie),
            Some(json!({
                "name": "Parable of the Sower",
                "authorName": "Octavia E. Butler",
                "category": "Sci-Fi",
                "quantity": "5"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "Book added successfully");

    let id = response.body["insertedId"].as_str().unwrap();
    let book = app
        .request(Method::GET, &format!("/books/{}", id), Some(&cookie), None)
        .await;
    assert_eq!(book.body["quantity"], 5);
}

#[tokio::test]
async fn test_create_book_rejects_negative_quantity() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let response = app
        .request(
            Method::POST,
            "/books",
            Some(&cookie),
            Some(json!({
                "name": "Bloodchild",
                "authorName": "Octavia E. Butler",
                "category": "Sci-Fi",
                "quantity": -2
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "InvalidRequest");
}

#[tokio::test]
async fn test_get_book_id_validation() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let malformed = app
        .request(Method::GET, "/books/not-an-id", Some(&cookie), None)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["error"], "Invalid book ID");

    let absent = app
        .request(
            Method::GET,
            &format!("/books/{}", ObjectId::new().to_hex()),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(absent.status, StatusCode::NOT_FOUND);
    assert_eq!(absent.body["error"], "Book not found");
}

#[tokio::test]
async fn test_update_missing_book_is_not_found() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let response = app
        .request(
            Method::PUT,
            &format!("/books/{}", ObjectId::new().to_hex()),
            Some(&cookie),
            Some(json!({ "name": "Ghost" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Book not found or no changes made");
}

#[tokio::test]
async fn test_malformed_json_body_uses_error_format() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let response = app
        .request(Method::POST, "/borrow-book", Some(&cookie), Some(json!([1, 2, 3])))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["code"], "InvalidRequest");
}

#[tokio::test]
async fn test_public_browsing_routes() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    app.store.seed_category("Sci-Fi").unwrap();
    app.store.seed_category("History").unwrap();

    for n in 0..5 {
        app.create_book(&cookie, &format!("Sci-Fi {}", n), "Sci-Fi", 1).await;
    }
    app.create_book(&cookie, "SPQR", "History", 1).await;

    let categories = app.request(Method::GET, "/category", None, None).await;
    assert_eq!(categories.status, StatusCode::OK);
    let labels: Vec<&str> = categories
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["category"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Sci-Fi", "History"]);

    let scifi = app
        .request(Method::GET, "/books/category/Sci-Fi", None, None)
        .await;
    assert_eq!(scifi.status, StatusCode::OK);
    assert_eq!(scifi.body.as_array().unwrap().len(), 5);

    let latest = app.request(Method::GET, "/latest-books", None, None).await;
    let names: Vec<&str> = latest
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["SPQR", "Sci-Fi 4", "Sci-Fi 3", "Sci-Fi 2"]);
}

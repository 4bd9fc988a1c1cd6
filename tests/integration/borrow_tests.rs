//! Borrow/return flow through the HTTP surface

use axum::http::{Method, StatusCode};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};

use crate::common::TestApp;

fn borrow_body(book_id: &str, email: &str) -> Value {
    json!({
        "bookId": book_id,
        "userName": "Ada",
        "userEmail": email,
        "returnDate": "2030-01-15"
    })
}

async fn quantity(app: &TestApp, cookie: &str, book_id: &str) -> i64 {
    app.request(Method::GET, &format!("/books/{}", book_id), Some(cookie), None)
        .await
        .body["quantity"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn test_borrow_return_scenario() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;
    let book_id = app.create_book(&cookie, "Kindred", "Sci-Fi", 2).await;

    let borrowed = app
        .request(
            Method::POST,
            "/borrow-book",
            Some(&cookie),
            Some(borrow_body(&book_id, "a@x.com")),
        )
        .await;
    assert_eq!(borrowed.status, StatusCode::OK);
    assert_eq!(borrowed.body["success"], true);
    assert_eq!(borrowed.body["message"], "Book borrowed successfully");
    assert_eq!(borrowed.body["updatedBook"]["quantity"], 1);
    assert_eq!(quantity(&app, &cookie, &book_id).await, 1);

    let loans = app
        .request(Method::GET, "/borrowed-books/a@x.com", Some(&cookie), None)
        .await;
    assert_eq!(loans.status, StatusCode::OK);
    let loans = loans.body.as_array().unwrap().clone();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0]["bookId"], book_id.as_str());
    assert_eq!(loans[0]["userEmail"], "a@x.com");
    assert_eq!(loans[0]["bookDetails"]["name"], "Kindred");
    assert_eq!(loans[0]["returnDate"], "2030-01-15T00:00:00Z");
    let loan_id = loans[0]["_id"].as_str().unwrap().to_string();

    let again = app
        .request(
            Method::POST,
            "/borrow-book",
            Some(&cookie),
            Some(borrow_body(&book_id, "a@x.com")),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["code"], "AlreadyBorrowed");
    assert_eq!(again.body["error"], "You have already borrowed this book");
    assert_eq!(quantity(&app, &cookie, &book_id).await, 1);

    let returned = app
        .request(
            Method::PUT,
            &format!("/borrowed-books/return/{}", loan_id),
            Some(&cookie),
            Some(json!({ "userEmail": "a@x.com" })),
        )
        .await;
    assert_eq!(returned.status, StatusCode::OK);
    assert_eq!(returned.body["message"], "Book returned successfully");
    assert_eq!(quantity(&app, &cookie, &book_id).await, 2);

    let loans = app
        .request(Method::GET, "/borrowed-books/a@x.com", Some(&cookie), None)
        .await;
    assert!(loans.body.as_array().unwrap().is_empty());

    let twice = app
        .request(
            Method::PUT,
            &format!("/borrowed-books/return/{}", loan_id),
            Some(&cookie),
            Some(json!({ "userEmail": "a@x.com" })),
        )
        .await;
    assert_eq!(twice.status, StatusCode::NOT_FOUND);
    assert_eq!(quantity(&app, &cookie, &book_id).await, 2);
}

#[tokio::test]
async fn test_borrow_out_of_stock() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;
    let book_id = app.create_book(&cookie, "Wild Seed", "Sci-Fi", 0).await;

    let response = app
        .request(
            Method::POST,
            "/borrow-book",
            Some(&cookie),
            Some(borrow_body(&book_id, "a@x.com")),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "OutOfStock");
    assert_eq!(response.body["error"], "No available copies to borrow");
    assert_eq!(app.store.loan_count().unwrap(), 0);
    assert_eq!(quantity(&app, &cookie, &book_id).await, 0);
}

#[tokio::test]
async fn test_borrow_requires_all_fields() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;
    let book_id = app.create_book(&cookie, "Dawn", "Sci-Fi", 1).await;

    let response = app
        .request(
            Method::POST,
            "/borrow-book",
            Some(&cookie),
            Some(json!({ "bookId": book_id, "userName": "Ada", "userEmail": "a@x.com" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "InvalidRequest");
    assert_eq!(quantity(&app, &cookie, &book_id).await, 1);
}

#[tokio::test]
async fn test_borrow_unknown_book() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let response = app
        .request(
            Method::POST,
            "/borrow-book",
            Some(&cookie),
            Some(borrow_body(&ObjectId::new().to_hex(), "a@x.com")),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Book not found");
}

#[tokio::test]
async fn test_borrow_without_session_changes_nothing() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;
    let book_id = app.create_book(&cookie, "Imago", "Sci-Fi", 1).await;

    let response = app
        .request(
            Method::POST,
            "/borrow-book",
            None,
            Some(borrow_body(&book_id, "a@x.com")),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(quantity(&app, &cookie, &book_id).await, 1);
    assert_eq!(app.store.loan_count().unwrap(), 0);
}

#[tokio::test]
async fn test_borrowed_list_requires_matching_email() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let response = app
        .request(Method::GET, "/borrowed-books/b@x.com", Some(&cookie), None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["code"], "Forbidden");
    assert_eq!(response.body["error"], "Forbidden: Email mismatch");
}

#[tokio::test]
async fn test_return_with_wrong_email_is_not_found() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;
    let book_id = app.create_book(&cookie, "Fledgling", "Sci-Fi", 1).await;

    app.request(
        Method::POST,
        "/borrow-book",
        Some(&cookie),
        Some(borrow_body(&book_id, "a@x.com")),
    )
    .await;
    let loans = app
        .request(Method::GET, "/borrowed-books/a@x.com", Some(&cookie), None)
        .await;
    let loan_id = loans.body[0]["_id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/borrowed-books/return/{}", loan_id),
            Some(&cookie),
            Some(json!({ "userEmail": "b@x.com" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(quantity(&app, &cookie, &book_id).await, 0);
    assert_eq!(app.store.loan_count().unwrap(), 1);
}

#[tokio::test]
async fn test_return_malformed_loan_id() {
    let app = TestApp::new();
    let cookie = app.login("a@x.com").await;

    let response = app
        .request(
            Method::PUT,
            "/borrowed-books/return/12345",
            Some(&cookie),
            Some(json!({ "userEmail": "a@x.com" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid loan ID");
}

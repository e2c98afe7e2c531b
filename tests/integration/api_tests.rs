//! API integration tests
//!
//! These run against a live server with an empty database.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Register a book with a unique ISBN and return its JSON
async fn create_book(client: &Client, isbn: &str) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Future",
            "author": "Junior",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

async fn delete_book(client: &Client, id: i64) {
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await;
}

fn unique_isbn(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}-{}", prefix, nanos)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_create_and_delete_book() {
    let client = Client::new();
    let book = create_book(&client, &unique_isbn("crud")).await;
    let id = book["id"].as_i64().expect("No book ID");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_rejected() {
    let client = Client::new();
    let isbn = unique_isbn("dup");
    let book = create_book(&client, &isbn).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({"title": "Other", "author": "Someone", "isbn": isbn}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Isbn already registered.");

    delete_book(&client, book["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();
    let isbn = unique_isbn("loan");
    let book = create_book(&client, &isbn).await;
    let book_id = book["id"].as_i64().unwrap();

    // First loan succeeds
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({"isbn": isbn, "customer": "Junior", "email": "junior@example.com"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let loan_id: i64 = response.json().await.expect("Failed to parse response");

    // Second loan of the same book is refused
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({"isbn": isbn, "customer": "Daniel"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Book already loaned");

    // Return, then the book can be loaned again
    let response = client
        .patch(format!("{}/loans/{}", BASE_URL, loan_id))
        .json(&json!({"returned": true}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({"isbn": isbn, "customer": "Daniel"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/books/{}/loans", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total_elements"], 2);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_loan_for_unknown_isbn() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({"isbn": unique_isbn("missing"), "customer": "Junior"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Book not found for passed isbn");
}

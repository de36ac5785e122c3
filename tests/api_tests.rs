use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use book_recommender::{
    api::{create_router, handlers::EMPTY_SELECTION_WARNING, AppState, Defaults},
    catalog::{Catalog, RatingTable},
    models::{BookId, BookRecord, BookTagRecord, Rating, TagRecord, UserId},
    services::RatingPredictor,
};

/// Prefers higher book ids
struct ByBookId;

impl RatingPredictor for ByBookId {
    fn predict(&self, _user_id: UserId, book_id: BookId) -> f64 {
        book_id as f64
    }
}

fn book(book_id: BookId, title: &str) -> BookRecord {
    BookRecord {
        book_id,
        goodreads_book_id: book_id * 100,
        title: Some(title.to_string()),
        authors: Some(format!("Author {}", book_id)),
    }
}

fn rating(user_id: UserId, book_id: BookId, rating: u8) -> Rating {
    Rating {
        user_id,
        book_id,
        rating,
    }
}

fn create_test_server() -> TestServer {
    let books = vec![
        book(1, "The Hobbit"),
        book(2, "The Silmarillion"),
        book(3, "Dune"),
        book(4, "Foundation"),
        book(5, "Blockbuster"),
    ];
    let tags = vec![
        TagRecord { tag_id: 1, tag_name: "fantasy".to_string() },
        TagRecord { tag_id: 2, tag_name: "dragons".to_string() },
        TagRecord { tag_id: 3, tag_name: "science-fiction".to_string() },
        TagRecord { tag_id: 4, tag_name: "to-read".to_string() },
    ];
    let links = [(100, 1), (100, 2), (200, 1), (200, 2), (300, 3), (400, 3), (400, 4)]
        .into_iter()
        .map(|(goodreads_book_id, tag_id)| BookTagRecord { goodreads_book_id, tag_id })
        .collect::<Vec<_>>();
    let catalog = Catalog::from_records(books, &tags, &links).unwrap();

    let ratings = RatingTable::new(vec![
        rating(1, 1, 5),
        rating(1, 2, 4),
        rating(1, 5, 5),
        rating(2, 1, 4),
        rating(2, 2, 5),
        rating(2, 3, 4),
        rating(2, 5, 5),
        rating(3, 3, 5),
        rating(3, 4, 2),
        rating(3, 5, 5),
    ]);

    // Book 5 has three ratings and is treated as an outlier
    let state = AppState::new(
        catalog,
        ratings,
        Arc::new(ByBookId),
        3,
        Defaults::default(),
    );
    TestServer::new(create_router(state)).unwrap()
}

fn titles(body: &Value) -> Vec<String> {
    body["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let server = create_test_server();
    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_list_books_and_users() {
    let server = create_test_server();

    let books: Vec<String> = server.get("/api/v1/books").await.json();
    assert_eq!(books.len(), 5);
    assert_eq!(books[0], "The Hobbit");

    let users: Vec<u32> = server.get("/api/v1/users").await.json();
    assert_eq!(users, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_content_recommendation() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations/content")
        .json(&json!({ "titles": ["the hobbit"], "top_n": 2 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let titles = titles(&body);
    assert_eq!(titles.len(), 2);
    assert_eq!(titles[0], "The Silmarillion");
    assert!(!titles.contains(&"The Hobbit".to_string()));
    assert_eq!(body["books"][0]["tag_name"], "fantasy dragons");
    assert!(body["warning"].is_null());
}

#[tokio::test]
async fn test_content_recommendation_unknown_title() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations/content")
        .json(&json!({ "titles": ["NO SUCH BOOK"] }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Book not found"]);
}

#[tokio::test]
async fn test_empty_selection_warns() {
    let server = create_test_server();

    for mode in ["content", "peers"] {
        let response = server
            .post(&format!("/api/v1/recommendations/{}", mode))
            .json(&json!({ "titles": [] }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert!(body["books"].as_array().unwrap().is_empty());
        assert_eq!(body["warning"], EMPTY_SELECTION_WARNING);
    }
}

#[tokio::test]
async fn test_peer_recommendation() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations/peers")
        .json(&json!({ "titles": ["The Hobbit"] }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    // The outlier book 5 was filtered out before ranking
    assert_eq!(titles(&body), vec!["The Silmarillion", "Dune"]);
}

#[tokio::test]
async fn test_peer_recommendation_rejects_bad_min_rating() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations/peers")
        .json(&json!({ "titles": ["The Hobbit"], "min_rating": 9 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "min_rating must be between 1 and 5, got 9"
    );
}

#[tokio::test]
async fn test_predicted_recommendation() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations/predicted")
        .json(&json!({ "user_id": 1 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    // User 1 rated books 1 and 2; book 5 is an outlier
    assert_eq!(titles(&body), vec!["Foundation", "Dune"]);
}

#[tokio::test]
async fn test_predicted_recommendation_unknown_user() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations/predicted")
        .json(&json!({ "user_id": 42 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "user 42");
    assert!(body.get("books").is_none());
}

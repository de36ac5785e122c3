use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{BookRow, UserId},
    services::{recommend_by_peers, recommend_for_user},
};

use super::AppState;

/// Shown when a mode is triggered with nothing selected
pub const EMPTY_SELECTION_WARNING: &str = "Please select at least one book.";

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    #[serde(default)]
    pub titles: Vec<String>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PeerRequest {
    #[serde(default)]
    pub titles: Vec<String>,
    pub top_n: Option<usize>,
    pub min_rating: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct PredictedRequest {
    pub user_id: UserId,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub books: Vec<BookRow>,
    pub warning: Option<String>,
}

impl RecommendationResponse {
    fn rows(books: Vec<BookRow>) -> Self {
        Self {
            books,
            warning: None,
        }
    }

    fn empty_selection() -> Self {
        Self {
            books: Vec::new(),
            warning: Some(EMPTY_SELECTION_WARNING.to_string()),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Distinct titles offered in the book selectors
pub async fn list_books(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.titles().into_iter().map(str::to_string).collect())
}

/// Users that can be picked for predicted-rating recommendations
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserId>> {
    Json(state.ratings.users().to_vec())
}

/// Books with tags similar to the first selected title
pub async fn recommend_by_content(
    State(state): State<AppState>,
    Json(request): Json<ContentRequest>,
) -> Json<RecommendationResponse> {
    let Some(title) = request.titles.first() else {
        tracing::warn!("Content recommendation requested without a selection");
        return Json(RecommendationResponse::empty_selection());
    };
    let top_n = request.top_n.unwrap_or(state.defaults.top_n);

    tracing::info!(title = %title, top_n, "Processing content recommendation");

    let books = state.content.similar_to(title, top_n);

    tracing::info!(results = books.len(), "Content recommendation completed");

    Json(RecommendationResponse::rows(books))
}

/// Books liked by readers who liked the selected titles
pub async fn recommend_by_peer_ratings(
    State(state): State<AppState>,
    Json(request): Json<PeerRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if request.titles.is_empty() {
        tracing::warn!("Peer recommendation requested without a selection");
        return Ok(Json(RecommendationResponse::empty_selection()));
    }

    let top_n = request.top_n.unwrap_or(state.defaults.top_n);
    let min_rating = request.min_rating.unwrap_or(state.defaults.min_rating);
    if !(1..=5).contains(&min_rating) {
        return Err(AppError::InvalidInput(format!(
            "min_rating must be between 1 and 5, got {}",
            min_rating
        )));
    }

    let seeds = state.catalog.resolve_titles(&request.titles);

    tracing::info!(
        selected = request.titles.len(),
        resolved = seeds.len(),
        top_n,
        min_rating,
        "Processing peer recommendation"
    );

    let books = recommend_by_peers(&seeds, &state.ratings, &state.catalog, top_n, min_rating);

    tracing::info!(results = books.len(), "Peer recommendation completed");

    Ok(Json(RecommendationResponse::rows(books)))
}

/// Unrated books with the highest predicted rating for a user
pub async fn recommend_by_prediction(
    State(state): State<AppState>,
    Json(request): Json<PredictedRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if !state.ratings.has_user(request.user_id) {
        return Err(AppError::NotFound(format!("user {}", request.user_id)));
    }
    let top_n = request.top_n.unwrap_or(state.defaults.top_n);

    tracing::info!(user_id = request.user_id, top_n, "Processing predicted recommendation");

    let books = recommend_for_user(
        state.predictor.as_ref(),
        &state.ratings,
        &state.catalog,
        request.user_id,
        top_n,
    );

    tracing::info!(results = books.len(), "Predicted recommendation completed");

    Ok(Json(RecommendationResponse::rows(books)))
}

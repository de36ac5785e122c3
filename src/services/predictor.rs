//! Latent-factor rating prediction
//!
//! The model is produced and versioned outside this service. It is read once
//! from a JSON artifact and only ever used for inference.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::{
    catalog::{Catalog, RatingTable},
    error::{AppError, AppResult},
    models::{distinct_rows, BookId, BookRow, UserId},
};

/// Anything that can estimate how a user would rate a book
#[cfg_attr(test, mockall::automock)]
pub trait RatingPredictor: Send + Sync {
    fn predict(&self, user_id: UserId, book_id: BookId) -> f64;
}

/// Bias and latent factors of one user or item
#[derive(Debug, Clone, Deserialize)]
pub struct LatentVector {
    #[serde(default)]
    pub bias: f64,
    pub factors: Vec<f64>,
}

fn default_rating_scale() -> (f64, f64) {
    (1.0, 5.0)
}

/// Biased matrix-factorization model (SVD-style)
///
/// `estimate = mean + b_u + b_i + q_i · p_u`, where each term is only added
/// when the user and/or item is known, clipped to the rating scale.
#[derive(Debug, Clone, Deserialize)]
pub struct SvdModel {
    pub global_mean: f64,
    #[serde(default = "default_rating_scale")]
    pub rating_scale: (f64, f64),
    #[serde(default)]
    pub users: HashMap<UserId, LatentVector>,
    #[serde(default)]
    pub items: HashMap<BookId, LatentVector>,
}

impl SvdModel {
    /// Reads and validates a model artifact
    pub fn load(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| AppError::Io {
            file: path.display().to_string(),
            source,
        })?;
        let model: SvdModel = serde_json::from_slice(&bytes)?;
        model.validate()?;

        tracing::info!(
            path = %path.display(),
            users = model.users.len(),
            items = model.items.len(),
            factors = model.factor_count(),
            "Loaded latent-factor model"
        );

        Ok(model)
    }

    fn factor_count(&self) -> usize {
        self.users
            .values()
            .chain(self.items.values())
            .map(|v| v.factors.len())
            .next()
            .unwrap_or(0)
    }

    fn validate(&self) -> AppResult<()> {
        let (low, high) = self.rating_scale;
        if low > high {
            return Err(AppError::Model(format!(
                "rating scale [{}, {}] is empty",
                low, high
            )));
        }

        let expected = self.factor_count();
        let mismatched = self
            .users
            .values()
            .chain(self.items.values())
            .any(|v| v.factors.len() != expected);
        if mismatched {
            return Err(AppError::Model(format!(
                "all factor vectors must have length {}",
                expected
            )));
        }
        Ok(())
    }
}

impl RatingPredictor for SvdModel {
    fn predict(&self, user_id: UserId, book_id: BookId) -> f64 {
        let user = self.users.get(&user_id);
        let item = self.items.get(&book_id);

        let mut estimate = self.global_mean;
        if let Some(user) = user {
            estimate += user.bias;
        }
        if let Some(item) = item {
            estimate += item.bias;
        }
        if let (Some(user), Some(item)) = (user, item) {
            estimate += user
                .factors
                .iter()
                .zip(&item.factors)
                .map(|(p, q)| p * q)
                .sum::<f64>();
        }

        let (low, high) = self.rating_scale;
        estimate.clamp(low, high)
    }
}

/// Highest-predicted books the user has not rated yet
///
/// Candidates are the distinct books of `ratings` minus the ones the user
/// rated there. Equal estimates are ordered by book id.
pub fn recommend_for_user(
    predictor: &dyn RatingPredictor,
    ratings: &RatingTable,
    catalog: &Catalog,
    user_id: UserId,
    top_n: usize,
) -> Vec<BookRow> {
    let rated = ratings.rated_by(user_id);
    let mut candidates: Vec<BookId> = ratings
        .books()
        .iter()
        .copied()
        .filter(|id| rated.map_or(true, |seen| !seen.contains(id)))
        .collect();
    candidates.sort_unstable();

    let mut scored: Vec<(BookId, f64)> = candidates
        .into_iter()
        .map(|book_id| (book_id, predictor.predict(user_id, book_id)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_n);

    tracing::debug!(
        user_id,
        already_rated = rated.map_or(0, |seen| seen.len()),
        best = ?scored.first().map(|(_, est)| *est),
        "Scored unseen books"
    );

    distinct_rows(scored.iter().filter_map(|(id, _)| catalog.by_id(*id)))
}

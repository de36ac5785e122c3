use std::sync::Arc;

use crate::{
    catalog::{Catalog, RatingTable},
    config::Config,
    error::{AppError, AppResult},
    services::{ContentIndex, RatingPredictor, SvdModel},
};

/// Default result sizes and thresholds used when a request leaves them out
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    pub top_n: usize,
    pub min_rating: u8,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_rating: 4,
        }
    }
}

/// Shared application state
///
/// Everything is built once at startup and never written afterwards, so
/// handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    /// Ratings with over-popular books removed
    pub ratings: Arc<RatingTable>,
    pub content: Arc<ContentIndex>,
    pub predictor: Arc<dyn RatingPredictor>,
    pub defaults: Defaults,
}

impl AppState {
    /// Assembles state from already loaded data
    pub fn new(
        catalog: Catalog,
        ratings: RatingTable,
        predictor: Arc<dyn RatingPredictor>,
        outlier_threshold: usize,
        defaults: Defaults,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let content = ContentIndex::build(Arc::clone(&catalog));
        let ratings = ratings.without_outliers(outlier_threshold);

        tracing::info!(
            books = catalog.len(),
            ratings = ratings.len(),
            users = ratings.users().len(),
            outlier_threshold,
            "Application state ready"
        );

        Self {
            catalog,
            ratings: Arc::new(ratings),
            content: Arc::new(content),
            predictor,
            defaults,
        }
    }

    /// Loads the datasets and model named by `config`
    pub fn load(config: &Config) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        let (catalog, ratings) = Catalog::load(&config.data_dir)?;
        let model = SvdModel::load(&config.model_path)?;

        Ok(Self::new(
            catalog,
            ratings,
            Arc::new(model),
            config.outlier_threshold,
            Defaults {
                top_n: config.top_n,
                min_rating: config.min_rating,
            },
        ))
    }
}

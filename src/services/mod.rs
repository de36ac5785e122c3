pub mod collaborative;
pub mod content;
pub mod predictor;
pub mod tfidf;

pub use collaborative::recommend_by_peers;
pub use content::{ContentIndex, SimilarityMatrix};
pub use predictor::{recommend_for_user, RatingPredictor, SvdModel};
pub use tfidf::TfidfVectorizer;

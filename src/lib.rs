//! Book recommendation service.
//!
//! Three modes share one immutable, startup-loaded dataset:
//! tag similarity (TF-IDF + cosine), peer ratings (co-occurrence counts
//! among users who liked the seed books) and predicted ratings from a
//! pretrained latent-factor model.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

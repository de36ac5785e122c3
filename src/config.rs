use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding books.csv, ratings.csv, tags.csv and book_tags.csv
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Path of the pretrained latent-factor model (JSON)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Books with this many ratings or more are left out of rating-based modes
    #[serde(default = "default_outlier_threshold")]
    pub outlier_threshold: usize,

    /// Lowest rating that counts as "liked" for peer recommendations
    #[serde(default = "default_min_rating")]
    pub min_rating: u8,

    /// Default number of rows returned by each mode
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("svd_model.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_outlier_threshold() -> usize {
    5000
}

fn default_min_rating() -> u8 {
    4
}

fn default_top_n() -> usize {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make every request fail
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=5).contains(&self.min_rating) {
            anyhow::bail!("MIN_RATING must be between 1 and 5, got {}", self.min_rating);
        }
        if self.top_n == 0 {
            anyhow::bail!("TOP_N must be at least 1");
        }
        Ok(())
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

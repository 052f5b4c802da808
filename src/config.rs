use std::env;
use std::path::PathBuf;

use crate::artifact::ArtifactSource;
use crate::error::{AppError, Result};

pub const DEFAULT_MODEL_PATH: &str = "ensemble_trees.bin";
pub const DEFAULT_DATASET_PATH: &str = "rs6_clean.csv";
pub const DEFAULT_TARGET_COLUMN: &str = "wins";

#[derive(Debug, Clone)]
pub struct Config {
	pub model_path: PathBuf,
	pub model_url: Option<String>,
	pub dataset_path: PathBuf,
	pub target_column: String,
}

impl Config {
	pub fn from_env() -> Result<Self> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|key| env::var(key).ok())
	}

	fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let model_url = lookup("RS6_MODEL_URL").filter(|url| !url.trim().is_empty());
		if let Some(url) = &model_url {
			if !(url.starts_with("http://") || url.starts_with("https://")) {
				return Err(AppError::Config(format!("RS6_MODEL_URL must be an http(s) URL, got {}", url)));
			}
		}

		let target_column = lookup("RS6_TARGET_COLUMN").unwrap_or_else(|| DEFAULT_TARGET_COLUMN.to_string());
		if target_column.trim().is_empty() {
			return Err(AppError::Config("RS6_TARGET_COLUMN is empty".to_string()));
		}

		Ok(Config {
			model_path: lookup("RS6_MODEL_PATH").map_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH), PathBuf::from),
			model_url,
			dataset_path: lookup("RS6_DATASET_PATH").map_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH), PathBuf::from),
			target_column,
		})
	}

	/// With a URL configured the model path doubles as the download cache.
	pub fn artifact_source(&self) -> ArtifactSource {
		match &self.model_url {
			Some(url) => ArtifactSource::Url {
				url: url.clone(),
				cache: self.model_path.clone(),
			},
			None => ArtifactSource::Path(self.model_path.clone()),
		}
	}
}

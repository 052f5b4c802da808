use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
	#[error("Invalid value for {feature}: {reason}")]
	Validation { feature: String, reason: String },

	#[error("Feature schema mismatch: got [{}], model expects [{}]", .input.join(", "), .expected.join(", "))]
	SchemaMismatch {
		input: Vec<String>,
		expected: Vec<String>,
	},

	#[error("Model artifact not found at {}", .0.display())]
	ArtifactNotFound(PathBuf),

	#[error("Could not read model artifact: {0}")]
	Deserialization(String),

	#[error("Failed to download model artifact: {0}")]
	NetworkFetch(String),

	#[error("Reference dataset error: {0}")]
	Dataset(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl AppError {
	pub fn validation(feature: &str, reason: impl Into<String>) -> Self {
		AppError::Validation {
			feature: feature.to_string(),
			reason: reason.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, AppError>;

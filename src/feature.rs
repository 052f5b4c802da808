use std::collections::HashMap;
use std::fmt;

use crate::error::{AppError, Result};

pub const FEATURE_COUNT: usize = 7;

/// Player statistics in the order the ensembles were trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
	Kills,
	Deaths,
	Losses,
	Xp,
	Headshots,
	GamesPlayed,
	TimePlayed,
}

impl Feature {
	pub const ALL: [Feature; FEATURE_COUNT] = [
		Feature::Kills,
		Feature::Deaths,
		Feature::Losses,
		Feature::Xp,
		Feature::Headshots,
		Feature::GamesPlayed,
		Feature::TimePlayed,
	];

	pub fn name(self) -> &'static str {
		match self {
			Feature::Kills => "kills",
			Feature::Deaths => "deaths",
			Feature::Losses => "losses",
			Feature::Xp => "xp",
			Feature::Headshots => "headshots",
			Feature::GamesPlayed => "games_played",
			Feature::TimePlayed => "time_played",
		}
	}

	/// Case-insensitive lookup. `losess` is how the source dataset spells the column.
	pub fn from_name(name: &str) -> Option<Self> {
		let name = name.trim().to_ascii_lowercase();
		if name == "losess" {
			return Some(Feature::Losses);
		}

		Self::ALL.iter().copied().find(|f| f.name() == name)
	}

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn canonical_names() -> Vec<String> {
		Self::ALL.iter().map(|f| f.name().to_string()).collect()
	}
}

impl fmt::Display for Feature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
	values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
	pub fn from_array(values: [f64; FEATURE_COUNT]) -> Result<Self> {
		for (feature, &value) in Feature::ALL.iter().zip(values.iter()) {
			check_value(*feature, value)?;
		}

		Ok(Self { values })
	}

	/// For values already checked on the way in, such as dataset rows.
	pub(crate) fn from_validated(values: [f64; FEATURE_COUNT]) -> Self {
		Self { values }
	}

	/// Missing features are zero-filled.
	pub fn build(mapping: &HashMap<String, f64>) -> Result<Self> {
		Self::build_with(mapping, |_| 0.0)
	}

	/// Missing features fall back to the given medians, untruncated.
	pub fn with_defaults(mapping: &HashMap<String, f64>, medians: &FeatureVector) -> Result<Self> {
		Self::build_with(mapping, |feature| medians.get(feature))
	}

	fn build_with<F>(mapping: &HashMap<String, f64>, default: F) -> Result<Self>
	where
		F: Fn(Feature) -> f64,
	{
		let mut values: [Option<(&str, f64)>; FEATURE_COUNT] = [None; FEATURE_COUNT];
		let mut rejected = Vec::new();

		for (name, &value) in mapping {
			match Feature::from_name(name) {
				// Two spellings of one feature, e.g. `losses` and `losess`.
				Some(feature) => match values[feature.index()] {
					Some((first, _)) => {
						rejected.push(first.to_string());
						rejected.push(name.clone());
					},
					None => values[feature.index()] = Some((name.as_str(), value)),
				},
				None => rejected.push(name.clone()),
			}
		}

		if !rejected.is_empty() {
			rejected.sort();
			rejected.dedup();
			return Err(AppError::SchemaMismatch {
				input: rejected,
				expected: Feature::canonical_names(),
			});
		}

		let mut filled = [0.0; FEATURE_COUNT];
		for feature in Feature::ALL.iter().copied() {
			filled[feature.index()] = match values[feature.index()] {
				Some((_, value)) => value,
				None => default(feature),
			};
		}

		Self::from_array(filled)
	}

	pub fn get(&self, feature: Feature) -> f64 {
		self.values[feature.index()]
	}

	pub fn as_slice(&self) -> &[f64] {
		&self.values
	}

	pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
		Feature::ALL.iter().copied().zip(self.values.iter().copied())
	}
}

fn check_value(feature: Feature, value: f64) -> Result<()> {
	if !value.is_finite() {
		return Err(AppError::validation(feature.name(), "must be a finite number"));
	}
	if value < 0.0 {
		return Err(AppError::validation(feature.name(), format!("{} is negative", value)));
	}

	Ok(())
}

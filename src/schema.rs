use crate::error::{AppError, Result};
use crate::feature::{Feature, FeatureVector};

/// Column names as declared by a model artifact, in model order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
	names: Vec<String>,
}

impl Schema {
	pub fn new(names: Vec<String>) -> Self {
		Self { names }
	}

	#[cfg(test)]
	pub fn canonical() -> Self {
		Self::new(Feature::canonical_names())
	}

	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}
}

/// Position table from model column to canonical feature, resolved once per loaded model.
#[derive(Debug, Clone)]
pub struct SchemaMapping {
	columns: Vec<Feature>,
}

impl SchemaMapping {
	pub fn resolve(schema: &Schema) -> Result<Self> {
		let mut columns = Vec::with_capacity(schema.len());
		let mismatch = || AppError::SchemaMismatch {
			input: schema.names().to_vec(),
			expected: Feature::canonical_names(),
		};

		for name in schema.names() {
			let feature = Feature::from_name(name).ok_or_else(mismatch)?;
			if columns.contains(&feature) {
				return Err(mismatch());
			}
			columns.push(feature);
		}

		Ok(Self { columns })
	}

	pub fn is_identity(&self) -> bool {
		self.columns.len() == Feature::ALL.len()
			&& self.columns.iter().zip(Feature::ALL.iter()).all(|(a, b)| a == b)
	}

	/// Reorders a canonical vector into the model's column order.
	pub fn project(&self, vector: &FeatureVector) -> Vec<f64> {
		if self.is_identity() {
			return vector.as_slice().to_vec();
		}

		self.columns.iter().map(|&f| vector.get(f)).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn names(v: &[&str]) -> Schema {
		Schema::new(v.iter().map(|s| s.to_string()).collect())
	}

	fn sample() -> FeatureVector {
		FeatureVector::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).unwrap()
	}

	#[test]
	fn canonical_order_projects_unchanged() {
		let mapping = SchemaMapping::resolve(&Schema::canonical()).unwrap();

		assert!(mapping.is_identity());
		assert_eq!(mapping.project(&sample()), sample().as_slice().to_vec());
	}

	#[test]
	fn permuted_schema_reorders_columns() {
		let schema = names(&["xp", "kills", "losess", "deaths", "time_played", "headshots", "games_played"]);
		let mapping = SchemaMapping::resolve(&schema).unwrap();

		assert!(!mapping.is_identity());
		assert_eq!(mapping.project(&sample()), vec![4.0, 1.0, 3.0, 2.0, 7.0, 5.0, 6.0]);
	}

	#[test]
	fn subset_schema_only_projects_declared_columns() {
		let mapping = SchemaMapping::resolve(&names(&["deaths", "kills"])).unwrap();

		assert_eq!(mapping.project(&sample()), vec![2.0, 1.0]);
	}

	#[test]
	fn unknown_column_is_a_mismatch() {
		match SchemaMapping::resolve(&names(&["kills", "wins"])) {
			Err(AppError::SchemaMismatch { input, expected }) => {
				assert_eq!(input, vec!["kills".to_string(), "wins".to_string()]);
				assert_eq!(expected, Feature::canonical_names());
			}
			other => panic!("expected schema mismatch, got {:?}", other),
		}
	}

	#[test]
	fn duplicate_column_is_a_mismatch() {
		assert!(SchemaMapping::resolve(&names(&["kills", "Kills"])).is_err());
	}
}

#[cfg(test)]
use std::collections::HashMap;

use tracing::debug;

use crate::artifact::LoadedModel;
use crate::ensemble::{Model, PredictionResult};
use crate::error::Result;
use crate::feature::FeatureVector;
use crate::schema::{Schema, SchemaMapping};

/// Loaded once at startup and shared read-only by every prediction.
#[derive(Debug, Clone)]
pub struct Predictor {
	model: Model,
	schema: Schema,
	mapping: SchemaMapping,
}

impl Predictor {
	pub fn new(loaded: LoadedModel) -> Result<Self> {
		let mapping = SchemaMapping::resolve(&loaded.schema)?;

		debug!(
			columns = loaded.schema.len(),
			reordered = !mapping.is_identity(),
			"Resolved model schema"
		);

		Ok(Self {
			model: loaded.model,
			schema: loaded.schema,
			mapping,
		})
	}

	pub fn model(&self) -> &Model {
		&self.model
	}

	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult> {
		let row = self.mapping.project(vector);
		Ok(self.model.predict(&row))
	}

	#[cfg(test)]
	pub fn predict_mapping(&self, mapping: &HashMap<String, f64>) -> Result<PredictionResult> {
		self.predict(&FeatureVector::build(mapping)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::classifier::Label;
	use crate::decision_tree::DecisionTree;
	use crate::ensemble::{CombinedForest, VoteTally, VotingEnsemble};
	use crate::error::AppError;
	use crate::feature::Feature;
	use crate::node::Node;

	fn stump(column: usize, value: f64) -> DecisionTree {
		DecisionTree::new(Node::split(column, value, Node::Leaf(Label::Below), Node::Leaf(Label::Above)))
	}

	// Trees keyed on kills > 4, games_played > 20, xp > 1500, deaths < 4 (inverted stump).
	fn canonical_trees() -> Vec<DecisionTree> {
		vec![
			stump(Feature::Kills.index(), 4.5),
			stump(Feature::GamesPlayed.index(), 20.0),
			stump(Feature::Xp.index(), 1500.0),
			DecisionTree::new(Node::split(
				Feature::Deaths.index(),
				4.0,
				Node::Leaf(Label::Above),
				Node::Leaf(Label::Below),
			)),
		]
	}

	fn medians() -> FeatureVector {
		FeatureVector::from_array([5.0, 3.0, 1.0, 1000.0, 2.0, 10.0, 3600.0]).unwrap()
	}

	fn predictor() -> Predictor {
		Predictor::new(LoadedModel {
			model: Model::Voting(VotingEnsemble::new(canonical_trees())),
			schema: Schema::canonical(),
		})
		.unwrap()
	}

	#[test]
	fn medians_predict_the_same_label_every_time() {
		let predictor = predictor();
		let first = predictor.predict(&medians()).unwrap();

		for _ in 0..10 {
			assert_eq!(predictor.predict(&medians()).unwrap(), first);
		}
		assert_eq!(first.votes, VoteTally { positive: 2, total: 4 });
		assert_eq!(first.label, Label::Above);
	}

	#[test]
	fn combined_model_delegates_to_its_own_rule() {
		let predictor = Predictor::new(LoadedModel {
			model: Model::Combined(CombinedForest::new(canonical_trees())),
			schema: Schema::canonical(),
		})
		.unwrap();

		assert_eq!(predictor.predict(&medians()).unwrap().label, Label::Below);
	}

	#[test]
	fn column_order_of_the_model_does_not_change_predictions() {
		// Same trees, but the artifact stores columns as [xp, games_played, deaths, kills, ...].
		let order = [
			Feature::Xp,
			Feature::GamesPlayed,
			Feature::Deaths,
			Feature::Kills,
			Feature::Losses,
			Feature::Headshots,
			Feature::TimePlayed,
		];
		let position = |f: Feature| order.iter().position(|&o| o == f).unwrap();
		let permuted = vec![
			stump(position(Feature::Kills), 4.5),
			stump(position(Feature::GamesPlayed), 20.0),
			stump(position(Feature::Xp), 1500.0),
			DecisionTree::new(Node::split(
				position(Feature::Deaths),
				4.0,
				Node::Leaf(Label::Above),
				Node::Leaf(Label::Below),
			)),
		];
		let reordered = Predictor::new(LoadedModel {
			model: Model::Voting(VotingEnsemble::new(permuted)),
			schema: Schema::new(order.iter().map(|f| f.name().to_string()).collect()),
		})
		.unwrap();

		let inputs = [
			medians(),
			FeatureVector::from_array([0.0, 9.0, 4.0, 200.0, 0.0, 1.0, 60.0]).unwrap(),
			FeatureVector::from_array([30.0, 1.0, 2.0, 9000.0, 12.0, 45.0, 50000.0]).unwrap(),
		];
		for input in inputs.iter() {
			assert_eq!(reordered.predict(input).unwrap(), predictor().predict(input).unwrap());
		}
	}

	#[test]
	fn input_mapping_order_does_not_matter() {
		let forward: HashMap<String, f64> = Feature::ALL
			.iter()
			.zip(medians().as_slice())
			.map(|(f, v)| (f.name().to_string(), *v))
			.collect();
		let mut backward = HashMap::new();
		for (f, v) in Feature::ALL.iter().zip(medians().as_slice()).rev() {
			backward.insert(f.name().to_uppercase(), *v);
		}

		assert_eq!(
			predictor().predict_mapping(&forward).unwrap(),
			predictor().predict_mapping(&backward).unwrap()
		);
	}

	#[test]
	fn unknown_model_column_fails_at_construction() {
		let result = Predictor::new(LoadedModel {
			model: Model::Voting(VotingEnsemble::new(canonical_trees())),
			schema: Schema::new(vec!["kills".to_string(), "wins".to_string()]),
		});

		assert!(matches!(result, Err(AppError::SchemaMismatch { .. })));
	}

	#[test]
	fn negative_input_never_reaches_the_model() {
		let mut mapping = HashMap::new();
		mapping.insert("deaths".to_string(), -3.0);

		assert!(matches!(predictor().predict_mapping(&mapping), Err(AppError::Validation { .. })));
	}
}

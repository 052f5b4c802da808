use rand::Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::classifier::Label;
use crate::error::{AppError, Result};
use crate::feature::{Feature, FeatureVector, FEATURE_COUNT};
use crate::functions::{median, Histogram};
use crate::predictor::Predictor;

/// Reference statistics used for input defaults, sampling and diagnostics. Never trained on.
#[derive(Clone, Debug)]
pub struct Dataset {
	columns: Vec<Vec<f64>>,
	targets: Vec<Label>,
}

impl Dataset {
	pub fn rows_len(&self) -> usize {
		self.targets.len()
	}

	pub fn column(&self, feature: Feature) -> &[f64] {
		&self.columns[feature.index()]
	}

	pub fn targets(&self) -> &[Label] {
		&self.targets
	}

	pub fn row(&self, i: usize) -> FeatureVector {
		let mut values = [0.0; FEATURE_COUNT];
		for feature in Feature::ALL.iter().copied() {
			values[feature.index()] = self.columns[feature.index()][i];
		}

		FeatureVector::from_validated(values)
	}

	pub fn medians(&self) -> FeatureVector {
		let mut values = [0.0; FEATURE_COUNT];
		for feature in Feature::ALL.iter().copied() {
			values[feature.index()] = median(self.column(feature).iter().copied()).unwrap_or(0.0);
		}

		FeatureVector::from_validated(values)
	}

	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, FeatureVector, Label) {
		let i = rng.gen_range(0, self.rows_len());
		(i, self.row(i), self.targets[i])
	}

	/// Share of rows whose stored label the predictor reproduces.
	pub fn evaluate(&self, predictor: &Predictor) -> Result<f64> {
		let hits = (0..self.rows_len())
			.into_par_iter()
			.map(|i| predictor.predict(&self.row(i)).map(|r| r.label == self.targets[i]))
			.collect::<Result<Vec<bool>>>()?
			.into_iter()
			.filter(|&hit| hit)
			.count();

		Ok(hits as f64 / self.rows_len() as f64)
	}

	pub fn histogram(&self, feature: Feature, bins: usize) -> Histogram {
		Histogram::new(self.column(feature), bins)
	}
}

#[derive(Debug)]
pub struct Builder {
	columns: Vec<Vec<f64>>,
	targets: Vec<f64>,
}

impl Builder {
	pub fn new() -> Self {
		Self {
			columns: vec![Vec::new(); FEATURE_COUNT],
			targets: Vec::new(),
		}
	}

	pub fn add(&mut self, x: &FeatureVector, y: f64) {
		for (column, value) in self.columns.iter_mut().zip(x.as_slice()) {
			column.push(*value);
		}

		self.targets.push(y);
	}

	/// Targets that are all 0/1 are taken as labels; anything else is split at its median.
	pub fn build(self) -> Result<Dataset> {
		if self.targets.is_empty() {
			return Err(AppError::Dataset("no rows".to_string()));
		}

		let binary = self.targets.iter().all(|&y| y == 0.0 || y == 1.0);
		let targets = if binary {
			self.targets.iter().map(|&y| Label::from(y == 1.0)).collect()
		} else {
			let threshold = median(self.targets.iter().copied()).unwrap_or(0.0);
			self.targets.iter().map(|&y| Label::from(y > threshold)).collect()
		};

		Ok(Dataset {
			columns: self.columns,
			targets,
		})
	}
}

impl Default for Builder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::artifact::LoadedModel;
	use crate::decision_tree::DecisionTree;
	use crate::ensemble::{Model, VotingEnsemble};
	use crate::node::Node;
	use crate::schema::Schema;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	fn row(kills: f64, xp: f64) -> FeatureVector {
		FeatureVector::from_array([kills, 3.0, 1.0, xp, 2.0, 10.0, 3600.0]).unwrap()
	}

	// Wins grow with kills, so the stored label is `kills >= 10`.
	fn dataset() -> Dataset {
		let mut builder = Builder::new();
		for kills in 0..20 {
			let wins = if kills > 10 { 100.0 + kills as f64 } else { kills as f64 };
			builder.add(&row(kills as f64, 500.0 + kills as f64 * 50.0), wins);
		}
		builder.build().unwrap()
	}

	fn kills_model() -> Predictor {
		let tree = DecisionTree::new(Node::split(0, 9.5, Node::Leaf(Label::Below), Node::Leaf(Label::Above)));
		Predictor::new(LoadedModel {
			model: Model::Voting(VotingEnsemble::new(vec![tree.clone(), tree.clone(), tree])),
			schema: Schema::canonical(),
		})
		.unwrap()
	}

	#[test]
	fn raw_wins_are_split_at_their_median() {
		let dataset = dataset();

		// Median wins is 9.5, so kills 0..=9 fall below.
		assert_eq!(dataset.targets()[9], Label::Below);
		assert_eq!(dataset.targets()[10], Label::Above);
		assert_eq!(dataset.targets().iter().filter(|&&l| l == Label::Above).count(), 10);
	}

	#[test]
	fn binary_targets_are_used_directly() {
		let mut builder = Builder::new();
		builder.add(&row(1.0, 1.0), 1.0);
		builder.add(&row(2.0, 2.0), 0.0);
		builder.add(&row(3.0, 3.0), 0.0);
		let dataset = builder.build().unwrap();

		assert_eq!(dataset.targets(), &[Label::Above, Label::Below, Label::Below]);
	}

	#[test]
	fn medians_per_feature() {
		let medians = dataset().medians();

		assert_eq!(medians.get(Feature::Kills), 9.5);
		assert_eq!(medians.get(Feature::Xp), 975.0);
		assert_eq!(medians.get(Feature::TimePlayed), 3600.0);
	}

	#[test]
	fn sampled_rows_reproduce_their_stored_label() {
		let dataset = dataset();
		let predictor = kills_model();
		let mut rng = StdRng::seed_from_u64(7);

		for _ in 0..50 {
			let (i, vector, stored) = dataset.sample(&mut rng);
			assert_eq!(vector, dataset.row(i));
			assert_eq!(predictor.predict(&vector).unwrap().label, stored);
		}
	}

	#[test]
	fn consistent_model_scores_full_accuracy() {
		assert_eq!(dataset().evaluate(&kills_model()).unwrap(), 1.0);
	}

	#[test]
	fn empty_dataset_is_an_error() {
		assert!(matches!(Builder::new().build(), Err(AppError::Dataset(_))));
	}
}

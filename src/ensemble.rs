use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::classifier::{Classifier, Label};
use crate::decision_tree::DecisionTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteTally {
	pub positive: usize,
	pub total: usize,
}

impl VoteTally {
	pub fn count<'a>(members: impl Iterator<Item = &'a DecisionTree>, x: &[f64]) -> Self {
		members.fold(Self::default(), |mut tally, tree| {
			tally.total += 1;
			if tree.predict(x) == Label::Above {
				tally.positive += 1;
			}
			tally
		})
	}
}

/// Label is `Above` iff `positive >= total / 2`. Exactly half the votes counts as positive.
pub fn majority_vote(tally: VoteTally) -> Label {
	Label::from(tally.positive * 2 >= tally.total)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
	pub label: Label,
	pub votes: VoteTally,
}

fn read_members<R: Read>(reader: &mut R) -> std::io::Result<Vec<DecisionTree>> {
	let len = reader.read_u16::<BigEndian>()?;

	(0..len)
		.map(|_| DecisionTree::deserialize(reader))
		.collect::<std::io::Result<Vec<DecisionTree>>>()
}

fn write_members<W: Write>(members: &[DecisionTree], writer: &mut W) -> std::io::Result<()> {
	if members.len() > u16::MAX as usize {
		return Err(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			format!("{} members do not fit the artifact format", members.len()),
		));
	}
	writer.write_u16::<BigEndian>(members.len() as u16)?;

	for tree in members {
		tree.serialize(writer)?;
	}

	Ok(())
}

/// Explicit list of trees combined locally by majority vote.
#[derive(Debug, Clone, PartialEq)]
pub struct VotingEnsemble {
	members: Vec<DecisionTree>,
}

impl VotingEnsemble {
	pub fn new(members: Vec<DecisionTree>) -> Self {
		Self { members }
	}

	pub fn members(&self) -> &[DecisionTree] {
		&self.members
	}

	pub fn tally(&self, x: &[f64]) -> VoteTally {
		VoteTally::count(self.members.iter(), x)
	}

	pub fn decide(&self, tally: VoteTally) -> Label {
		majority_vote(tally)
	}
}

impl Classifier for VotingEnsemble {
	fn predict(&self, x: &[f64]) -> Label {
		self.decide(self.tally(x))
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		write_members(&self.members, writer)
	}

	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		Ok(Self::new(read_members(reader)?))
	}
}

/// Pre-combined forest that decides on its own: the averaged member output must
/// exceed one half, so an even split resolves to `Below`.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedForest {
	forest: Vec<DecisionTree>,
}

impl CombinedForest {
	pub fn new(forest: Vec<DecisionTree>) -> Self {
		Self { forest }
	}

	pub fn members(&self) -> &[DecisionTree] {
		&self.forest
	}

	pub fn tally(&self, x: &[f64]) -> VoteTally {
		VoteTally::count(self.forest.iter(), x)
	}

	pub fn decide(&self, tally: VoteTally) -> Label {
		let mean = tally.positive as f64 / tally.total.max(1) as f64;

		Label::from(mean > 0.5)
	}
}

impl Classifier for CombinedForest {
	fn predict(&self, x: &[f64]) -> Label {
		self.decide(self.tally(x))
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		write_members(&self.forest, writer)
	}

	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		Ok(Self::new(read_members(reader)?))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Model {
	Voting(VotingEnsemble),
	Combined(CombinedForest),
}

impl Model {
	pub fn members(&self) -> &[DecisionTree] {
		match self {
			Model::Voting(ensemble) => ensemble.members(),
			Model::Combined(forest) => forest.members(),
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Model::Voting(_) => "voting",
			Model::Combined(_) => "combined",
		}
	}

	/// `x` must already be in the model's column order.
	/// Every member is evaluated once; the label is decided from that tally.
	pub fn predict(&self, x: &[f64]) -> PredictionResult {
		let (label, votes) = match self {
			Model::Voting(ensemble) => {
				let votes = ensemble.tally(x);
				(ensemble.decide(votes), votes)
			},
			Model::Combined(forest) => {
				let votes = forest.tally(x);
				(forest.decide(votes), votes)
			},
		};

		PredictionResult { label, votes }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::node::Node;
	use std::io::Cursor;

	fn constant(label: Label) -> DecisionTree {
		DecisionTree::new(Node::Leaf(label))
	}

	fn members(above: usize, below: usize) -> Vec<DecisionTree> {
		let mut trees = vec![constant(Label::Above); above];
		trees.extend(vec![constant(Label::Below); below]);
		trees
	}

	#[test]
	fn half_the_votes_is_positive() {
		assert_eq!(majority_vote(VoteTally { positive: 2, total: 4 }), Label::Above);
		assert_eq!(majority_vote(VoteTally { positive: 1, total: 4 }), Label::Below);
	}

	#[test]
	fn vote_matches_real_division_for_all_small_ensembles() {
		for total in 1..=25 {
			for positive in 0..=total {
				let expected = Label::from(positive as f64 >= total as f64 / 2.0);
				assert_eq!(majority_vote(VoteTally { positive, total }), expected, "{}/{}", positive, total);
			}
		}
	}

	#[test]
	fn voting_ensemble_counts_every_member() {
		let ensemble = VotingEnsemble::new(members(3, 3));
		let result = Model::Voting(ensemble).predict(&[0.0]);

		assert_eq!(result.votes, VoteTally { positive: 3, total: 6 });
		assert_eq!(result.label, Label::Above);
	}

	#[test]
	fn combined_forest_breaks_ties_low() {
		let result = Model::Combined(CombinedForest::new(members(3, 3))).predict(&[0.0]);
		assert_eq!(result.label, Label::Below);

		let result = Model::Combined(CombinedForest::new(members(4, 3))).predict(&[0.0]);
		assert_eq!(result.label, Label::Above);
	}

	#[test]
	fn reported_label_follows_from_reported_votes() {
		let split = |value| DecisionTree::new(Node::split(0, value, Node::Leaf(Label::Below), Node::Leaf(Label::Above)));
		let trees: Vec<DecisionTree> = (1..=6).map(|i| split(i as f64)).collect();
		let voting = VotingEnsemble::new(trees.clone());
		let combined = CombinedForest::new(trees);

		for x in 0..=7 {
			let row = [x as f64];

			let result = Model::Voting(voting.clone()).predict(&row);
			assert_eq!(result.votes, VoteTally { positive: x.min(6), total: 6 });
			assert_eq!(result.label, majority_vote(result.votes));
			assert_eq!(result.label, voting.predict(&row));

			let result = Model::Combined(combined.clone()).predict(&row);
			assert_eq!(result.label, combined.decide(result.votes));
			assert_eq!(result.label, combined.predict(&row));
		}
	}

	#[test]
	fn members_survive_serialization() {
		let tree = DecisionTree::new(Node::split(2, 1.5, Node::Leaf(Label::Below), Node::Leaf(Label::Above)));
		let ensemble = VotingEnsemble::new(vec![tree.clone(), constant(Label::Above)]);

		let mut bytes = Vec::new();
		ensemble.serialize(&mut bytes).unwrap();
		let restored = VotingEnsemble::deserialize(&mut Cursor::new(bytes)).unwrap();

		assert_eq!(restored, ensemble);
	}
}

use std::io::{Read, Write};

use crate::classifier::{Classifier, Label};
use crate::node::Node;

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
	root: Node,
}

impl DecisionTree {
	pub fn new(root: Node) -> Self {
		Self { root }
	}

	pub fn max_column(&self) -> Option<usize> {
		self.root.max_column()
	}

	pub fn depth(&self) -> usize {
		self.root.depth()
	}
}

impl Classifier for DecisionTree {
	fn predict(&self, x: &[f64]) -> Label {
		self.root.predict(x)
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		self.root.serialize(writer)
	}

	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let root = Node::deserialize(reader)?;

		Ok(Self {
			root
		})
	}
}

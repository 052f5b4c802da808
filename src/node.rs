use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;
use std::io::{Read, Write};

use crate::classifier::Label;

/// Deepest tree the decoder accepts. Deeper input is rejected before it can exhaust the stack.
pub const MAX_DEPTH: usize = 512;

#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq)]
enum Tag {
	Leaf = 0,
	Children = 1,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
	pub value: f64,
	pub column: usize,
}

impl Split {
	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		writer.write_f64::<BigEndian>(self.value)?;
		writer.write_u16::<BigEndian>(self.column as u16)?;

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let value = reader.read_f64::<BigEndian>()?;
		let column = reader.read_u16::<BigEndian>()? as usize;

		if !value.is_finite() {
			return Err(invalid(format!("split threshold {} on column {} is not finite", value, column)));
		}

		Ok(Self { value, column })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	Leaf(Label),
	Children {
		left: Box<Node>,
		right: Box<Node>,
		split: Split,
	},
}

impl Node {
	pub fn split(column: usize, value: f64, left: Node, right: Node) -> Self {
		Node::Children {
			left: Box::new(left),
			right: Box::new(right),
			split: Split { value, column },
		}
	}

	pub fn predict(&self, x: &[f64]) -> Label {
		match &self {
			Node::Leaf(label) => *label,
			Node::Children { left, right, split } => {
				if x[split.column] < split.value {
					left.predict(x)
				} else {
					right.predict(x)
				}
			},
		}
	}

	/// Highest column index any split reads, `None` for a bare leaf.
	pub fn max_column(&self) -> Option<usize> {
		match &self {
			Node::Leaf(_) => None,
			Node::Children { left, right, split } => [Some(split.column), left.max_column(), right.max_column()]
				.iter()
				.flatten()
				.copied()
				.max(),
		}
	}

	pub fn depth(&self) -> usize {
		match &self {
			Node::Leaf(_) => 1,
			Node::Children { left, right, .. } => 1 + left.depth().max(right.depth()),
		}
	}

	pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		match &self {
			Node::Leaf(label) => {
				writer.write_u8(Tag::Leaf as u8)?;
				writer.write_u8(label.bit())?;
			},
			Node::Children { left, right, split } => {
				writer.write_u8(Tag::Children as u8)?;
				split.serialize(writer)?;
				left.serialize(writer)?;
				right.serialize(writer)?;
			}
		}

		Ok(())
	}

	pub fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		Self::deserialize_at(reader, 1)
	}

	fn deserialize_at<R: Read>(reader: &mut R, depth: usize) -> std::io::Result<Self> {
		if depth > MAX_DEPTH {
			return Err(invalid(format!("tree is deeper than {} levels", MAX_DEPTH)));
		}

		let tag = reader.read_u8()?;

		match Tag::from_u8(tag) {
			Some(Tag::Leaf) => {
				let bit = reader.read_u8()?;
				let label = Label::from_bit(bit)
					.ok_or_else(|| invalid(format!("leaf label {} is not binary", bit)))?;

				Ok(Node::Leaf(label))
			},
			Some(Tag::Children) => {
				let split = Split::deserialize(reader)?;
				let left = Box::new(Node::deserialize_at(reader, depth + 1)?);
				let right = Box::new(Node::deserialize_at(reader, depth + 1)?);

				Ok(Node::Children { split, left, right })
			},
			None => Err(invalid(format!("unknown node tag {}", tag))),
		}
	}
}

fn invalid(message: String) -> std::io::Error {
	std::io::Error::new(std::io::ErrorKind::InvalidData, message)
}

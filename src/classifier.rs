use std::fmt;
use std::io::{Read, Write};

/// Binary outcome: wins above or below the dataset median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
	Below = 0,
	Above = 1,
}

impl Label {
	pub fn from_bit(bit: u8) -> Option<Self> {
		match bit {
			0 => Some(Label::Below),
			1 => Some(Label::Above),
			_ => None,
		}
	}

	pub fn bit(self) -> u8 {
		self as u8
	}
}

impl From<bool> for Label {
	fn from(above: bool) -> Self {
		if above { Label::Above } else { Label::Below }
	}
}

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Label::Below => f.write_str("below"),
			Label::Above => f.write_str("above"),
		}
	}
}

/// A decision function over a row already laid out in the model's column order.
pub trait Classifier: Sized {
	fn predict(&self, x: &[f64]) -> Label;

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;
	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self>;
}

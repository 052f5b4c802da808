use ordered_float::OrderedFloat;

/// Median with the two middle values averaged for even counts. `None` when empty.
pub fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
	let mut sorted = values.collect::<Vec<f64>>();
	sorted.sort_by_key(|&x| OrderedFloat(x));

	let len = sorted.len();
	match len {
		0 => None,
		_ if len % 2 == 1 => Some(sorted[len / 2]),
		_ => Some((sorted[len / 2 - 1] + sorted[len / 2]) / 2.0),
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
	pub min: f64,
	pub max: f64,
	pub counts: Vec<usize>,
}

impl Histogram {
	/// Equal-width bins over `[min, max]`; the maximum lands in the last bin.
	pub fn new(values: &[f64], bins: usize) -> Self {
		let bins = bins.max(1);
		let min = values.iter().copied().map(OrderedFloat).min().map_or(0.0, |x| x.into_inner());
		let max = values.iter().copied().map(OrderedFloat).max().map_or(0.0, |x| x.into_inner());

		let mut histogram = Self {
			min,
			max,
			counts: vec![0; bins],
		};

		for &value in values {
			if let Some(bin) = histogram.bin_of(value) {
				histogram.counts[bin] += 1;
			}
		}

		histogram
	}

	pub fn width(&self) -> f64 {
		(self.max - self.min) / self.counts.len() as f64
	}

	pub fn bin_of(&self, value: f64) -> Option<usize> {
		if value < self.min || value > self.max {
			return None;
		}
		if self.width() <= 0.0 {
			return Some(0);
		}

		let bin = ((value - self.min) / self.width()) as usize;
		Some(bin.min(self.counts.len() - 1))
	}

	pub fn bin_range(&self, bin: usize) -> (f64, f64) {
		let start = self.min + self.width() * bin as f64;
		(start, start + self.width())
	}
}

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use tracing::info;

use crate::dataset::{self, Dataset};
use crate::error::{AppError, Result};
use crate::feature::{Feature, FeatureVector, FEATURE_COUNT};

pub fn read_path(dataset_location: &Path, target_column: &str) -> Result<Dataset> {
	let file = fs::File::open(dataset_location).map_err(|e| {
		AppError::Dataset(format!("cannot open {}: {}", dataset_location.display(), e))
	})?;

	let dataset = read(io::BufReader::new(file), target_column)?;
	info!(
		path = %dataset_location.display(),
		rows = dataset.rows_len(),
		"Reference dataset loaded"
	);

	Ok(dataset)
}

/// Comma separated with a header row. Columns other than the features and the target are ignored.
pub fn read<R: BufRead>(reader: R, target_column: &str) -> Result<Dataset> {
	let mut lines = reader.lines();

	let header = match lines.next() {
		Some(line) => line?,
		None => return Err(AppError::Dataset("file is empty".to_string())),
	};
	let (positions, target) = locate_columns(&header, target_column)?;

	let mut builder = dataset::Builder::new();

	for (i, line) in lines.enumerate() {
		let line_number = i + 2;
		let line = line?;
		if line.trim().is_empty() {
			continue;
		}

		let cells = line.split(',').map(str::trim).collect::<Vec<&str>>();
		let cell = |position: usize, name: &str| -> Result<f64> {
			let raw = cells.get(position).ok_or_else(|| {
				AppError::Dataset(format!("line {}: missing value for {}", line_number, name))
			})?;
			raw.parse::<f64>().map_err(|_| {
				AppError::Dataset(format!("line {}: {:?} is not a number ({})", line_number, raw, name))
			})
		};

		let mut x = [0.0; FEATURE_COUNT];
		for feature in Feature::ALL.iter().copied() {
			x[feature.index()] = cell(positions[feature.index()], feature.name())?;
		}
		let y = cell(target, target_column)?;

		let vector = FeatureVector::from_array(x)
			.map_err(|e| AppError::Dataset(format!("line {}: {}", line_number, e)))?;
		builder.add(&vector, y);
	}

	builder.build()
}

fn locate_columns(header: &str, target_column: &str) -> Result<([usize; FEATURE_COUNT], usize)> {
	let names = header.split(',').map(str::trim).collect::<Vec<&str>>();

	let mut positions = [None; FEATURE_COUNT];
	let mut target = None;
	for (i, name) in names.iter().enumerate() {
		if name.eq_ignore_ascii_case(target_column) {
			target = Some(i);
		} else if let Some(feature) = Feature::from_name(name) {
			positions[feature.index()].get_or_insert(i);
		}
	}

	let mut found = [0; FEATURE_COUNT];
	for feature in Feature::ALL.iter().copied() {
		found[feature.index()] = positions[feature.index()]
			.ok_or_else(|| AppError::Dataset(format!("header has no {} column", feature.name())))?;
	}
	let target = target.ok_or_else(|| AppError::Dataset(format!("header has no {} column", target_column)))?;

	Ok((found, target))
}

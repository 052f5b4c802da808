use colored::*;
use tabled::{settings::Style, Table, Tabled};

use crate::classifier::Label;
use crate::dataset::Dataset;
use crate::ensemble::PredictionResult;
use crate::feature::{Feature, FeatureVector};
use crate::predictor::Predictor;

const BAR_WIDTH: usize = 40;

#[derive(Tabled)]
struct MedianRow {
	feature: String,
	median: String,
}

#[derive(Tabled)]
struct InputRow {
	feature: String,
	value: String,
}

#[derive(Tabled)]
struct InputMedianRow {
	feature: String,
	value: String,
	median: String,
}

pub fn display_medians(medians: &FeatureVector) {
	println!("\n{}", "📊 Median values per feature".bold().cyan());
	println!("{}\n", "=".repeat(40).cyan());

	let rows = medians
		.iter()
		.map(|(feature, value)| MedianRow {
			feature: capitalize(feature.name()),
			// Shown truncated; predictions use the exact median.
			median: format!("{}", value.trunc() as i64),
		})
		.collect::<Vec<_>>();

	let mut table = Table::new(rows);
	table.with(Style::rounded());
	println!("{}\n", table);
}

/// The median column is left out when no reference dataset was loaded.
pub fn display_inputs(inputs: &FeatureVector, medians: Option<&FeatureVector>) {
	println!("\n{}", input_table(inputs, medians));
}

fn input_table(inputs: &FeatureVector, medians: Option<&FeatureVector>) -> Table {
	let mut table = match medians {
		Some(medians) => Table::new(inputs.iter().map(|(feature, value)| InputMedianRow {
			feature: capitalize(feature.name()),
			value: format_value(value),
			median: format!("{}", medians.get(feature).trunc() as i64),
		})),
		None => Table::new(inputs.iter().map(|(feature, value)| InputRow {
			feature: capitalize(feature.name()),
			value: format_value(value),
		})),
	};
	table.with(Style::rounded());
	table
}

pub fn display_prediction(result: &PredictionResult, kind: &str) {
	println!();
	match result.label {
		Label::Above => println!(
			"{}",
			"🎉 Prediction: wins are probably ABOVE the median".green().bold()
		),
		Label::Below => println!(
			"{}",
			"❌ Prediction: wins are probably BELOW the median".red().bold()
		),
	}
	println!(
		"   {} of {} trees voted above ({} model)\n",
		result.votes.positive, result.votes.total, kind
	);
}

pub fn display_sample(row: usize, stored: Label, result: &PredictionResult) {
	println!("{} row #{} of the reference dataset", "🎲 Random player:".bold(), row + 1);
	println!("   Stored label: wins {} the median", stored);

	if stored == result.label {
		println!("   {}", "✓ Prediction agrees with the stored label".green());
	} else {
		println!("   {}", "⚠️ Prediction disagrees with the stored label".yellow());
	}
}

pub fn display_accuracy(accuracy: f64, dataset: &Dataset) {
	let above = dataset.targets().iter().filter(|&&label| label == Label::Above).count();

	println!(
		"\n{} {:.2}% of {} rows reproduce their stored label",
		"📈 Accuracy:".bold(),
		accuracy * 100.0,
		dataset.rows_len()
	);
	println!("   {} rows above the median, {} below\n", above, dataset.rows_len() - above);
}

/// One text histogram per feature; the bin holding the player's value is highlighted.
pub fn display_histograms(dataset: &Dataset, player: Option<&FeatureVector>, bins: usize) {
	println!("\n{}", "📉 Feature distributions".bold().cyan());
	println!("{}", "=".repeat(60).cyan());

	for feature in Feature::ALL.iter().copied() {
		let histogram = dataset.histogram(feature, bins);
		let peak = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
		let marked = player.and_then(|p| histogram.bin_of(p.get(feature)));

		println!("\n{}", capitalize(feature.name()).bold());
		for (bin, &count) in histogram.counts.iter().enumerate() {
			let (start, end) = histogram.bin_range(bin);
			let bar = "█".repeat(count * BAR_WIDTH / peak);
			let label = format!("{:>12} - {:<12}", format_value(start), format_value(end));

			if marked == Some(bin) {
				println!("{} {} {} {}", label.yellow(), bar.yellow(), count, "◀ you".yellow().bold());
			} else {
				println!("{} {} {}", label, bar.blue(), count);
			}
		}

		if let Some(p) = player {
			if marked.is_none() {
				println!("   {} {} is outside the dataset range", "◀".yellow(), format_value(p.get(feature)));
			}
		}
	}

	println!();
}

pub fn display_model(predictor: &Predictor) {
	let model = predictor.model();
	let depth = model.members().iter().map(|tree| tree.depth()).max().unwrap_or(0);

	println!("\n{}", "🌲 Model".bold().cyan());
	println!("{}", "=".repeat(40).cyan());
	println!("   Kind:    {}", model.kind());
	println!("   Trees:   {}", model.members().len());
	println!("   Depth:   {}", depth);
	println!("   Columns: {}\n", predictor.schema().names().join(", "));
}

pub fn display_error(error: &str) {
	eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
	println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
	println!("{} {}", "✓".green(), message);
}

fn capitalize(name: &str) -> String {
	let spaced = name.replace('_', " ");
	let mut chars = spaced.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

fn format_value(value: f64) -> String {
	if value.fract() == 0.0 {
		format!("{}", value as i64)
	} else {
		format!("{:.2}", value)
	}
}

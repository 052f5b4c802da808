mod artifact;
mod classifier;
mod config;
mod dataset;
mod decision_tree;
mod display;
mod ensemble;
mod error;
mod feature;
mod functions;
mod node;
mod predictor;
mod reference_data;
mod schema;

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use config::Config;
use dataset::Dataset;
use display::output::{
	display_accuracy, display_error, display_histograms, display_info, display_inputs, display_medians,
	display_model, display_prediction, display_sample, display_success,
};
use error::Result;
use feature::{Feature, FeatureVector};
use predictor::Predictor;

#[derive(Parser, Debug)]
#[command(name = "rs6-wins")]
#[command(about = "Predict whether a Rainbow Six player wins more than the median player", long_about = None)]
struct Cli {
	/// Model artifact path (also the download cache when --model-url is set)
	#[arg(long, global = true)]
	model: Option<PathBuf>,

	/// Download the model artifact from this URL if it is not cached yet
	#[arg(long, global = true)]
	model_url: Option<String>,

	/// Reference dataset (CSV) used for medians, sampling and histograms
	#[arg(long, global = true)]
	dataset: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show the median of every feature
	Medians,

	/// Predict from player statistics; unspecified ones default to the medians
	Predict {
		#[command(flatten)]
		stats: Stats,

		/// Also draw the feature distributions with the player's values marked
		#[arg(long)]
		histograms: bool,

		#[arg(long, default_value = "10")]
		bins: usize,
	},

	/// Predict a random player from the reference dataset and compare with its stored label
	Random {
		#[arg(long)]
		seed: Option<u64>,
	},

	/// Share of reference rows the model reproduces
	Evaluate,

	/// Draw the distribution of every feature
	Histograms {
		#[arg(long, default_value = "10")]
		bins: usize,
	},

	/// Describe the loaded model
	Info,

	/// Write the loaded model to a local artifact file
	Export {
		out: PathBuf,
	},
}

#[derive(Args, Debug)]
struct Stats {
	#[arg(long)]
	kills: Option<f64>,
	#[arg(long)]
	deaths: Option<f64>,
	#[arg(long)]
	losses: Option<f64>,
	#[arg(long)]
	xp: Option<f64>,
	#[arg(long)]
	headshots: Option<f64>,
	#[arg(long)]
	games_played: Option<f64>,
	#[arg(long)]
	time_played: Option<f64>,
}

impl Stats {
	fn supplied(&self) -> HashMap<String, f64> {
		let values = [
			(Feature::Kills, self.kills),
			(Feature::Deaths, self.deaths),
			(Feature::Losses, self.losses),
			(Feature::Xp, self.xp),
			(Feature::Headshots, self.headshots),
			(Feature::GamesPlayed, self.games_played),
			(Feature::TimePlayed, self.time_played),
		];

		values
			.iter()
			.filter_map(|(feature, value)| value.map(|v| (feature.name().to_string(), v)))
			.collect()
	}
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rs6_wins=info")),
		)
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();

	if let Err(e) = run(cli) {
		display_error(&e.to_string());
		std::process::exit(1);
	}
}

fn run(cli: Cli) -> Result<()> {
	let mut config = Config::from_env()?;
	if let Some(model) = cli.model {
		config.model_path = model;
	}
	if let Some(url) = cli.model_url {
		config.model_url = Some(url);
	}
	if let Some(dataset) = cli.dataset {
		config.dataset_path = dataset;
	}

	match cli.command {
		Command::Medians => {
			let dataset = load_dataset(&config)?;
			display_medians(&dataset.medians());
		},
		Command::Predict { stats, histograms, bins } => {
			let predictor = load_predictor(&config)?;
			let supplied = stats.supplied();

			let dataset = if histograms || supplied.len() < Feature::ALL.len() {
				Some(load_dataset(&config)?)
			} else {
				None
			};
			let medians = dataset.as_ref().map(Dataset::medians);

			let inputs = match &medians {
				Some(medians) => FeatureVector::with_defaults(&supplied, medians)?,
				None => FeatureVector::build(&supplied)?,
			};

			let result = predictor.predict(&inputs)?;
			info!(label = %result.label, positive = result.votes.positive, total = result.votes.total, "Prediction made");

			display_inputs(&inputs, medians.as_ref());
			display_prediction(&result, predictor.model().kind());

			if histograms {
				if let Some(dataset) = &dataset {
					display_histograms(dataset, Some(&inputs), bins);
				}
			}
		},
		Command::Random { seed } => {
			let predictor = load_predictor(&config)?;
			let dataset = load_dataset(&config)?;

			let mut rng = match seed {
				Some(seed) => StdRng::seed_from_u64(seed),
				None => StdRng::from_entropy(),
			};
			let (row, inputs, stored) = dataset.sample(&mut rng);
			let result = predictor.predict(&inputs)?;

			display_inputs(&inputs, Some(&dataset.medians()));
			display_prediction(&result, predictor.model().kind());
			display_sample(row, stored, &result);
		},
		Command::Evaluate => {
			let predictor = load_predictor(&config)?;
			let dataset = load_dataset(&config)?;

			display_info(&format!("Evaluating {} rows ...", dataset.rows_len()));
			let accuracy = dataset.evaluate(&predictor)?;
			display_accuracy(accuracy, &dataset);
		},
		Command::Histograms { bins } => {
			let dataset = load_dataset(&config)?;
			display_histograms(&dataset, None, bins);
		},
		Command::Info => {
			let predictor = load_predictor(&config)?;
			display_model(&predictor);
		},
		Command::Export { out } => {
			let predictor = load_predictor(&config)?;
			let mut file = std::io::BufWriter::new(std::fs::File::create(&out)?);
			artifact::save(predictor.model(), predictor.schema(), &mut file)?;
			file.flush()?;

			display_success(&format!("Model written to {}", out.display()));
		},
	}

	Ok(())
}

fn load_predictor(config: &Config) -> Result<Predictor> {
	let loaded = artifact::load(&config.artifact_source())?;
	Predictor::new(loaded)
}

fn load_dataset(config: &Config) -> Result<Dataset> {
	reference_data::read_path(&config.dataset_path, &config.target_column)
}

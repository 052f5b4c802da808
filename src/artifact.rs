//! Reading and writing serialized ensembles.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! magic    b"RS6W"
//! u16      format version
//! u8       kind (0 voting list, 1 combined forest)
//! u16      schema length, then per column: u16 byte length + UTF-8 name
//! u16      member count, then each tree in pre-order
//! ```

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;
use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::ensemble::{CombinedForest, Model, VotingEnsemble};
use crate::error::{AppError, Result};
use crate::schema::Schema;

pub const MAGIC: &[u8; 4] = b"RS6W";
pub const FORMAT_VERSION: u16 = 1;

#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq)]
enum Kind {
	Voting = 0,
	Combined = 1,
}

#[derive(Debug, Clone)]
pub enum ArtifactSource {
	Path(PathBuf),
	/// Downloaded once into `cache`; later runs read the cached file.
	Url { url: String, cache: PathBuf },
}

#[derive(Debug, Clone)]
pub struct LoadedModel {
	pub model: Model,
	pub schema: Schema,
}

pub fn load(source: &ArtifactSource) -> Result<LoadedModel> {
	match source {
		ArtifactSource::Path(path) => load_path(path),
		ArtifactSource::Url { url, cache } => load_url(url, cache, download),
	}
}

/// A download is cached only once it decodes, so a bad response never sticks.
fn load_url<F>(url: &str, cache: &Path, fetch: F) -> Result<LoadedModel>
where
	F: FnOnce(&str) -> Result<Vec<u8>>,
{
	if cache.exists() {
		debug!(path = %cache.display(), "Using cached model artifact");
		return load_path(cache);
	}

	let bytes = fetch(url)?;
	let loaded = decode(&bytes)?;

	match write_cache(cache, &bytes) {
		Ok(()) => info!(path = %cache.display(), bytes = bytes.len(), "Cached downloaded model artifact"),
		Err(e) => warn!(path = %cache.display(), error = %e, "Could not cache downloaded artifact"),
	}

	Ok(loaded)
}

fn write_cache(cache: &Path, bytes: &[u8]) -> std::io::Result<()> {
	let partial = cache.with_extension("part");

	fs::write(&partial, bytes)
		.and_then(|_| fs::rename(&partial, cache))
		.map_err(|e| {
			let _ = fs::remove_file(&partial);
			e
		})
}

fn load_path(path: &Path) -> Result<LoadedModel> {
	if !path.exists() {
		return Err(AppError::ArtifactNotFound(path.to_path_buf()));
	}

	let bytes = fs::read(path)?;
	let loaded = decode(&bytes)?;

	info!(
		path = %path.display(),
		kind = loaded.model.kind(),
		members = loaded.model.members().len(),
		"Model artifact loaded"
	);

	Ok(loaded)
}

fn download(url: &str) -> Result<Vec<u8>> {
	info!(url = %url, "Downloading model artifact");

	let response = ureq::get(url)
		.set("User-Agent", "rs6_wins/0.1.0")
		.call()
		.map_err(|e| AppError::NetworkFetch(e.to_string()))?;

	let mut bytes = Vec::new();
	response
		.into_reader()
		.read_to_end(&mut bytes)
		.map_err(|e| AppError::NetworkFetch(e.to_string()))?;

	Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<LoadedModel> {
	let mut reader = Cursor::new(bytes);
	let loaded = read_artifact(&mut reader).map_err(|e| AppError::Deserialization(e.to_string()))?;

	if (reader.position() as usize) < bytes.len() {
		return Err(AppError::Deserialization(format!(
			"{} trailing bytes after the last member",
			bytes.len() - reader.position() as usize
		)));
	}

	validate(&loaded)?;
	Ok(loaded)
}

fn read_artifact<R: Read>(reader: &mut R) -> std::io::Result<LoadedModel> {
	let mut magic = [0u8; 4];
	reader.read_exact(&mut magic)?;
	if &magic != MAGIC {
		return Err(invalid("not a model artifact (bad magic)".to_string()));
	}

	let version = reader.read_u16::<BigEndian>()?;
	if version != FORMAT_VERSION {
		return Err(invalid(format!(
			"artifact format version {} is not supported (expected {})",
			version, FORMAT_VERSION
		)));
	}

	let kind = reader.read_u8()?;
	let kind = Kind::from_u8(kind).ok_or_else(|| invalid(format!("unknown model kind {}", kind)))?;

	let schema = read_schema(reader)?;
	let model = match kind {
		Kind::Voting => Model::Voting(VotingEnsemble::deserialize(reader)?),
		Kind::Combined => Model::Combined(CombinedForest::deserialize(reader)?),
	};

	Ok(LoadedModel { model, schema })
}

fn read_schema<R: Read>(reader: &mut R) -> std::io::Result<Schema> {
	let len = reader.read_u16::<BigEndian>()?;

	let names = (0..len)
		.map(|_| {
			let mut name = vec![0u8; reader.read_u16::<BigEndian>()? as usize];
			reader.read_exact(&mut name)?;
			String::from_utf8(name).map_err(|e| invalid(format!("feature name is not UTF-8: {}", e)))
		})
		.collect::<std::io::Result<Vec<String>>>()?;

	Ok(Schema::new(names))
}

fn validate(loaded: &LoadedModel) -> Result<()> {
	let members = loaded.model.members();
	if members.is_empty() {
		return Err(AppError::Deserialization("artifact holds no ensemble members".to_string()));
	}
	if loaded.schema.names().is_empty() {
		return Err(AppError::Deserialization("artifact declares no feature columns".to_string()));
	}

	for (i, tree) in members.iter().enumerate() {
		if let Some(column) = tree.max_column() {
			if column >= loaded.schema.len() {
				return Err(AppError::Deserialization(format!(
					"member {} splits on column {} but the schema has {} columns",
					i,
					column,
					loaded.schema.len()
				)));
			}
		}
	}

	Ok(())
}

pub fn save<W: Write>(model: &Model, schema: &Schema, writer: &mut W) -> std::io::Result<()> {
	writer.write_all(MAGIC)?;
	writer.write_u16::<BigEndian>(FORMAT_VERSION)?;

	match model {
		Model::Voting(_) => writer.write_u8(Kind::Voting as u8)?,
		Model::Combined(_) => writer.write_u8(Kind::Combined as u8)?,
	}

	write_len(writer, schema.len(), "schema columns")?;
	for name in schema.names() {
		write_len(writer, name.len(), "bytes in a column name")?;
		writer.write_all(name.as_bytes())?;
	}

	match model {
		Model::Voting(ensemble) => ensemble.serialize(writer),
		Model::Combined(forest) => forest.serialize(writer),
	}
}

fn write_len<W: Write>(writer: &mut W, len: usize, what: &str) -> std::io::Result<()> {
	if len > u16::MAX as usize {
		return Err(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			format!("{} {} do not fit the artifact format", len, what),
		));
	}

	writer.write_u16::<BigEndian>(len as u16)
}

fn invalid(message: String) -> std::io::Error {
	std::io::Error::new(std::io::ErrorKind::InvalidData, message)
}

//! # Reference Scores
//!
//! Loader for DW-NOMINATE member lists as published by voteview.com.
//!
//! Only two columns matter:
//!
//! | Column | Content |
//! |--------|---------|
//! | `bioname` | `"LAST, First Middle"` |
//! | `dim1` | first-dimension ideology score, may be empty |
//!
//! Names are reduced to the lowercase surname, which is how senators appear
//! in the vector vocabularies (`"MOYNIHAN, Daniel Patrick"` -> `"moynihan"`).
//! Rows without a score keep their position with a score of `0.0` and a name
//! tagged `"(missing score)"`, so a name join can never pick them up.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::{PolivecError, Result};

/// Suffix appended to the normalized name of a row without a score
pub const MISSING_SCORE_TAG: &str = "(missing score)";

/// Positional score/name arrays in file row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceScores {
    /// `dim1` per row (`0.0` when missing)
    pub scores: Vec<f32>,
    /// Normalized name per row
    pub names: Vec<String>,
    /// Raw `bioname` of each row that had no score
    pub missing: Vec<String>,
}

impl ReferenceScores {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether row `index` carried a real score
    pub fn is_scored(&self, index: usize) -> bool {
        self.names
            .get(index)
            .is_some_and(|name| !name.ends_with(MISSING_SCORE_TAG))
    }

    /// Iterate `(name, score)` in row order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }
}

/// The two columns read from a member row
#[derive(Debug, Deserialize)]
struct MemberRow {
    bioname: String,
    #[serde(default)]
    dim1: Option<String>,
}

/// Reduce `"LAST, First Middle"` to `"last"`
///
/// Everything from the first comma onward is dropped; the rest is lowercased
/// and trimmed. Names without a comma are lowercased whole.
pub fn normalize_name(raw: &str) -> String {
    let surname = raw.split(',').next().unwrap_or(raw);
    surname.trim().to_lowercase()
}

/// Load a member CSV into positional score/name arrays
pub fn load(path: impl AsRef<Path>) -> Result<ReferenceScores> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| PolivecError::read(path, e))?;
    let scores = read(path, file)?;
    if !scores.missing.is_empty() {
        warn!(
            "{}: ideology scores missing for {:?}",
            path.display(),
            scores.missing
        );
    }
    debug!("{}: {} members", path.display(), scores.len());
    Ok(scores)
}

/// Read member rows from any reader; `path` is only used in diagnostics
pub fn read<R: std::io::Read>(path: &Path, reader: R) -> Result<ReferenceScores> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| csv_error(path, &e))?
        .clone();

    let mut out = ReferenceScores::default();
    for record in csv_reader.records() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let row: MemberRow = record
            .deserialize(Some(&headers))
            .map_err(|e| PolivecError::parse(path, line, e.to_string()))?;

        match row.dim1.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(score) => {
                let score = score.parse::<f32>().map_err(|_| {
                    PolivecError::parse(path, line, format!("non-numeric dim1 '{}'", score))
                })?;
                out.scores.push(score);
                out.names.push(normalize_name(&row.bioname));
            }
            None => {
                out.scores.push(0.0);
                out.names
                    .push(format!("{}{}", normalize_name(&row.bioname), MISSING_SCORE_TAG));
                out.missing.push(row.bioname);
            }
        }
    }
    Ok(out)
}

fn csv_error(path: &Path, e: &csv::Error) -> PolivecError {
    let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
    PolivecError::parse(path, line, e.to_string())
}

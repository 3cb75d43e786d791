//! Pipeline configuration
//!
//! Parses the `polivec.toml` file that describes one multi-session run:
//! which vector files to read, where the DW-NOMINATE member lists live, the
//! session range, the axis words, and plot labelling.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::cohort::CohortId;
use crate::{PolivecError, Result};

/// Full pipeline configuration (parsed from polivec.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Session range
    pub cohorts: CohortRange,

    /// Vector source
    pub embeddings: EmbeddingsConfig,

    /// DW-NOMINATE source
    pub reference: ReferenceConfig,

    /// Anchor words (dictionary mode)
    #[serde(default)]
    pub axes: AxisWords,

    /// Plot labelling
    #[serde(default)]
    pub plot: PlotConfig,
}

impl PipelineConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| PolivecError::read(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| PolivecError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Find a configuration in a project directory
    ///
    /// Looks for:
    /// 1. `polivec.toml`
    /// 2. `.polivec.toml`
    pub fn find(project_root: impl AsRef<Path>) -> Option<Self> {
        let root = project_root.as_ref();

        let candidates = [root.join("polivec.toml"), root.join(".polivec.toml")];

        for path in candidates {
            if path.exists() {
                if let Ok(config) = Self::load(&path) {
                    return Some(config);
                }
            }
        }

        None
    }

    /// Reject ranges and templates that cannot produce a run
    pub fn validate(&self) -> Result<()> {
        if self.cohorts.start >= self.cohorts.end {
            return Err(PolivecError::Config(format!(
                "empty session range {}..{}",
                self.cohorts.start, self.cohorts.end
            )));
        }
        if self.embeddings.mode == EmbeddingMode::AxisFiles && !self.embeddings.path.is_templated() {
            return Err(PolivecError::Config(format!(
                "embeddings.path '{}' needs a '{{}}' placeholder in axis_files mode",
                self.embeddings.path
            )));
        }
        if !self.reference.path.is_templated() {
            return Err(PolivecError::Config(format!(
                "reference.path '{}' needs a '{{}}' placeholder",
                self.reference.path
            )));
        }
        Ok(())
    }
}

/// Half-open session range `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortRange {
    pub start: CohortId,
    /// Exclusive
    pub end: CohortId,
}

impl CohortRange {
    pub fn as_range(&self) -> Range<CohortId> {
        self.start..self.end
    }
}

/// How the vectors for each session are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingMode {
    /// One headerless file per session with the four anchors first
    AxisFiles,
    /// One plain `.vec` file shared by every session
    Dictionary,
}

/// Vector source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_mode")]
    pub mode: EmbeddingMode,

    /// File path; `{}` is replaced with the session number
    pub path: PathTemplate,
}

fn default_mode() -> EmbeddingMode {
    EmbeddingMode::AxisFiles
}

/// Reference score configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Member CSV path; `{}` is replaced with the session number
    #[serde(default = "default_reference_path")]
    pub path: PathTemplate,
}

fn default_reference_path() -> PathTemplate {
    PathTemplate::new("./dw-nominate/S{}_members.csv")
}

/// The four words that name the axis anchors
///
/// Order matches the anchor order of a with-axes vector file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisWords {
    #[serde(default = "default_positive_x")]
    pub positive_x: String,
    #[serde(default = "default_negative_x")]
    pub negative_x: String,
    #[serde(default = "default_positive_y")]
    pub positive_y: String,
    #[serde(default = "default_negative_y")]
    pub negative_y: String,
}

impl AxisWords {
    /// `[positive_x, negative_x, positive_y, negative_y]`
    pub fn as_array(&self) -> [&str; 4] {
        [
            &self.positive_x,
            &self.negative_x,
            &self.positive_y,
            &self.negative_y,
        ]
    }
}

impl Default for AxisWords {
    fn default() -> Self {
        Self {
            positive_x: default_positive_x(),
            negative_x: default_negative_x(),
            positive_y: default_positive_y(),
            negative_y: default_negative_y(),
        }
    }
}

fn default_positive_x() -> String { "conservative".to_string() }
fn default_negative_x() -> String { "liberal".to_string() }
fn default_positive_y() -> String { "good".to_string() }
fn default_negative_y() -> String { "bad".to_string() }

/// Plot labelling and output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default = "default_x_label")]
    pub x_label: String,

    #[serde(default = "default_y_label")]
    pub y_label: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// When set, each session is saved as `S{id}.png` in this directory
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            x_label: default_x_label(),
            y_label: default_y_label(),
            font_size: default_font_size(),
            save_dir: None,
        }
    }
}

fn default_x_label() -> String { "vector projected ideology (liberal - conservative)".to_string() }
fn default_y_label() -> String { "DW-NOMINATE".to_string() }
fn default_font_size() -> u32 { 7 }

/// A file path with `{}` placeholders for the session number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTemplate(String);

impl PathTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Whether the template varies with the session
    pub fn is_templated(&self) -> bool {
        self.0.contains("{}")
    }

    /// Substitute the session number for every `{}`
    pub fn resolve(&self, cohort: CohortId) -> PathBuf {
        PathBuf::from(self.0.replace("{}", &cohort.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//! # Plot Sinks
//!
//! Scatter plots are described, not drawn. A [`ScatterPlot`] carries the
//! points, labels, and titles of one figure; a [`PlotSink`] decides what to do
//! with it (render to a window, save an image, or just log).
//!
//! The crate ships [`LogSink`] only. Renderers live outside the crate and
//! implement the trait:
//!
//! ```rust,ignore
//! struct PngSink { /* ... */ }
//!
//! impl PlotSink for PngSink {
//!     fn scatter(&mut self, plot: &ScatterPlot) -> Result<()> {
//!         // draw plot.x / plot.y, annotate with plot.labels
//!         Ok(())
//!     }
//! }
//! ```

use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::cohort::{CohortId, CohortResult};
use crate::config::PlotConfig;
use crate::{PolivecError, Result};

/// One annotated scatter plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPlot {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    /// Annotation per point
    pub labels: Vec<String>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub font_size: u32,
    /// Where to save a high-resolution image; display only when `None`
    pub save_path: Option<PathBuf>,
}

impl ScatterPlot {
    /// Build a plot, checking that every point has an `x`, `y` and label
    pub fn new(
        x: Vec<f32>,
        y: Vec<f32>,
        labels: Vec<String>,
        title: impl Into<String>,
    ) -> Result<Self> {
        if x.len() != y.len() {
            return Err(PolivecError::DimensionMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        if labels.len() != x.len() {
            return Err(PolivecError::DimensionMismatch {
                expected: x.len(),
                found: labels.len(),
            });
        }
        Ok(Self {
            x,
            y,
            labels,
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            font_size: PlotConfig::default().font_size,
            save_path: None,
        })
    }

    /// Projected ideology against DW-NOMINATE for one session
    pub fn for_cohort(result: &CohortResult, config: &PlotConfig) -> Self {
        Self {
            x: result.x_projection(),
            y: result.reference_scores(),
            labels: result.labels(),
            title: senate_title(result.cohort),
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
            font_size: config.font_size,
            save_path: config
                .save_dir
                .as_ref()
                .map(|dir| dir.join(format!("S{}.png", result.cohort))),
        }
    }

    pub fn with_axis_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Receives finished plots
pub trait PlotSink {
    fn scatter(&mut self, plot: &ScatterPlot) -> Result<()>;
}

impl<S: PlotSink + ?Sized> PlotSink for &mut S {
    fn scatter(&mut self, plot: &ScatterPlot) -> Result<()> {
        (**self).scatter(plot)
    }
}

/// Logs a one-line summary of every plot
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl PlotSink for LogSink {
    fn scatter(&mut self, plot: &ScatterPlot) -> Result<()> {
        match &plot.save_path {
            Some(path) => info!(
                "{}: {} points ({} vs {}) -> {}",
                plot.title,
                plot.len(),
                plot.x_label,
                plot.y_label,
                path.display()
            ),
            None => info!(
                "{}: {} points ({} vs {})",
                plot.title,
                plot.len(),
                plot.x_label,
                plot.y_label
            ),
        }
        Ok(())
    }
}

/// `"97th U.S. Senate"`
pub fn senate_title(cohort: CohortId) -> String {
    format!("{} U.S. Senate", ordinal(cohort))
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st, ...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

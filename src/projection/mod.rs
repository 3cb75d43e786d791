//! # Axis Projection
//!
//! Scalar projection of word vectors onto semantic axes.
//!
//! An axis is the normalized difference of two antonym vectors:
//!
//! ```text
//! x_axis = (v_conservative - v_liberal) / |v_conservative - v_liberal|
//! y_axis = (v_good - v_bad) / |v_good - v_bad|
//! ```
//!
//! The scalar component of a vector `v` along an axis is `v · axis`. All
//! vectors of a batch are projected with a single `(N, D) x (D, 1)` matmul
//! per axis.
//!
//! Projection is pure: the same vectors and anchors always give the same
//! components, and it is linear in the projected vectors.
//!
//! Both axes are built before anything is projected. An anchor set with a
//! degenerate y pair (`good == bad`) is rejected even though only the x
//! components are correlated downstream.

use candle_core::Tensor;

use crate::primitives::{cpu_device, l2_norm, row_dots, vector_tensor};
use crate::vecfile::{AxisAnchors, EmbeddingMatrix};
use crate::{Device, PolivecError, Result};

/// Difference norms below this are treated as a zero-length axis
pub const AXIS_EPSILON: f32 = 1e-8;

/// A unit-length direction
#[derive(Debug, Clone)]
pub struct UnitAxis {
    direction: Tensor,
}

impl UnitAxis {
    /// Dimension of the axis
    pub fn dim(&self) -> usize {
        self.direction.dims()[0]
    }

    /// Axis components
    pub fn to_vec(&self) -> Result<Vec<f32>> {
        self.direction
            .to_vec1::<f32>()
            .map_err(|e| PolivecError::Tensor(e.to_string()))
    }

    pub fn as_tensor(&self) -> &Tensor {
        &self.direction
    }
}

/// Scalar components of a batch along both axes, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Builds axes and projects vectors on a fixed device
#[derive(Debug, Clone)]
pub struct AxisProjector {
    device: Device,
}

impl AxisProjector {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    /// Projector on the CPU device
    pub fn cpu() -> Self {
        Self::new(cpu_device())
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Unit axis pointing from `negative` to `positive`
    ///
    /// Identical (or numerically indistinguishable) poles have no direction
    /// and fail with [`PolivecError::DegenerateAxis`]; no zero or NaN axis is
    /// ever returned.
    pub fn build_axis(&self, positive: &[f32], negative: &[f32]) -> Result<UnitAxis> {
        self.labeled_axis(("positive", positive), ("negative", negative))
    }

    /// The x and y axes of an anchor set
    pub fn axes(&self, anchors: &AxisAnchors) -> Result<(UnitAxis, UnitAxis)> {
        let (pos_x, neg_x) = anchors.x_pair();
        let (pos_y, neg_y) = anchors.y_pair();
        Ok((
            self.labeled_axis(pos_x, neg_x)?,
            self.labeled_axis(pos_y, neg_y)?,
        ))
    }

    /// Project every row of `vectors` onto both anchor axes
    ///
    /// Fails with [`PolivecError::DegenerateAxis`] if either axis is degenerate,
    /// before any vector is touched.
    pub fn project(&self, vectors: &EmbeddingMatrix, anchors: &AxisAnchors) -> Result<Projection> {
        let (x_axis, y_axis) = self.axes(anchors)?;
        if vectors.is_empty() {
            return Ok(Projection::default());
        }
        if vectors.dim() != anchors.dim() {
            return Err(PolivecError::DimensionMismatch {
                expected: anchors.dim(),
                found: vectors.dim(),
            });
        }

        let matrix = vectors.to_tensor(&self.device)?;
        Ok(Projection {
            x: row_dots(&matrix, x_axis.as_tensor())?,
            y: row_dots(&matrix, y_axis.as_tensor())?,
        })
    }

    fn labeled_axis(&self, positive: (&str, &[f32]), negative: (&str, &[f32])) -> Result<UnitAxis> {
        let (pos_label, pos) = positive;
        let (neg_label, neg) = negative;
        if pos.len() != neg.len() {
            return Err(PolivecError::DimensionMismatch {
                expected: pos.len(),
                found: neg.len(),
            });
        }

        let diff = (vector_tensor(pos, &self.device)? - vector_tensor(neg, &self.device)?)?;
        let norm = l2_norm(&diff)?;
        // NaN norms count as degenerate too
        if !(norm > AXIS_EPSILON) {
            return Err(PolivecError::DegenerateAxis {
                positive: pos_label.to_string(),
                negative: neg_label.to_string(),
            });
        }

        let direction = diff
            .affine(1.0 / norm as f64, 0.0)
            .map_err(|e| PolivecError::Tensor(format!("Axis normalization failed: {}", e)))?;
        Ok(UnitAxis { direction })
    }
}

impl Default for AxisProjector {
    fn default() -> Self {
        Self::cpu()
    }
}

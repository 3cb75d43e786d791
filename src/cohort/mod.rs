//! # Cohort Evaluation
//!
//! Evaluates one Senate session: pairs each senator's projected ideology with
//! their DW-NOMINATE score and correlates the two.
//!
//! ## Join strategies
//!
//! | Evaluator | Vectors | Join |
//! |-----------|---------|------|
//! | [`AxisFileEvaluator`] | one with-axes file per session | positional, lengths checked |
//! | [`DictionaryEvaluator`] | one mapping for all sessions | by normalized name, absentees dropped |
//!
//! In the positional mode the vector file was generated from the same member
//! list, so entry `i` belongs to reference row `i`. That is only trusted after
//! the lengths agree; otherwise the session fails with
//! [`PolivecError::JoinLengthMismatch`].
//!
//! Only the x projection is correlated (DW-NOMINATE `dim1` is one
//! dimensional); the y projection is kept on each point for plotting.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AxisWords, PathTemplate};
use crate::projection::AxisProjector;
use crate::reference::{self, ReferenceScores};
use crate::stats::Correlation;
use crate::vecfile::{self, AxisAnchors, EmbeddingMatrix, VectorDictionary};
use crate::{PolivecError, Result};

/// Session number (e.g. 97 for the 97th Senate)
pub type CohortId = u32;

/// One senator in a session result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortPoint {
    pub label: String,
    /// Projection on the `conservative - liberal` axis
    pub x: f32,
    /// Projection on the `good - bad` axis
    pub y: f32,
    /// DW-NOMINATE `dim1`
    pub reference_score: f32,
}

/// Evaluation of one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortResult {
    pub cohort: CohortId,
    /// Joined senators in reference order
    pub points: Vec<CohortPoint>,
    /// Reference rows left out: no vector (dictionary mode) or no score
    pub missing: Vec<String>,
    pub correlation: Correlation,
}

impl CohortResult {
    pub fn pearson_r(&self) -> f64 {
        self.correlation.pearson_r
    }

    pub fn spearman_rho(&self) -> f64 {
        self.correlation.spearman_rho
    }

    /// x projections in point order
    pub fn x_projection(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.x).collect()
    }

    /// Reference scores in point order
    pub fn reference_scores(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.reference_score).collect()
    }

    /// Labels in point order
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }
}

/// Something that can evaluate a session by number
pub trait CohortEvaluator {
    fn evaluate(&self, cohort: CohortId) -> Result<CohortResult>;
}

impl<E: CohortEvaluator + ?Sized> CohortEvaluator for &E {
    fn evaluate(&self, cohort: CohortId) -> Result<CohortResult> {
        (**self).evaluate(cohort)
    }
}

// ============================================================================
// Shared computation
// ============================================================================

/// Project aligned vectors and correlate them with aligned reference scores
///
/// `vectors`, `labels` and `scores` must have the same length; row `i` of
/// each belongs to the same senator.
pub fn evaluate_aligned(
    projector: &AxisProjector,
    cohort: CohortId,
    vectors: &EmbeddingMatrix,
    anchors: &AxisAnchors,
    labels: Vec<String>,
    scores: Vec<f32>,
    missing: Vec<String>,
) -> Result<CohortResult> {
    if vectors.len() != scores.len() || labels.len() != scores.len() {
        return Err(PolivecError::JoinLengthMismatch {
            cohort,
            vectors: vectors.len(),
            references: scores.len(),
        });
    }

    let projection = projector.project(vectors, anchors)?;
    let correlation = Correlation::between(&projection.x, &scores).ok_or(
        PolivecError::UndefinedCorrelation {
            cohort,
            samples: scores.len(),
        },
    )?;

    let points = labels
        .into_iter()
        .zip(projection.x)
        .zip(projection.y)
        .zip(scores)
        .map(|(((label, x), y), reference_score)| CohortPoint {
            label,
            x,
            y,
            reference_score,
        })
        .collect();

    Ok(CohortResult {
        cohort,
        points,
        missing,
        correlation,
    })
}

/// Positional join of a with-axes vector file and a member list
pub fn join_positional(
    projector: &AxisProjector,
    cohort: CohortId,
    file: &vecfile::AxisVectorFile,
    references: ReferenceScores,
) -> Result<CohortResult> {
    if file.vectors.len() != references.len() {
        return Err(PolivecError::JoinLengthMismatch {
            cohort,
            vectors: file.vectors.len(),
            references: references.len(),
        });
    }

    let disagreements = file
        .vectors
        .labels()
        .iter()
        .zip(&references.names)
        .filter(|(label, name)| label != name)
        .count();
    if disagreements > 0 {
        debug!(
            "S{}: {} vector labels differ from member names at the same position",
            cohort, disagreements
        );
    }

    // Unscored rows only hold their position; they never enter the statistics
    let mut vectors = EmbeddingMatrix::with_dim(file.vectors.dim());
    let mut labels = Vec::with_capacity(references.len());
    let mut scores = Vec::with_capacity(references.len());
    let mut unscored = Vec::new();
    for (i, ((_, vector), (name, score))) in file.vectors.rows().zip(references.iter()).enumerate() {
        if references.is_scored(i) {
            vectors.push(name, vector)?;
            labels.push(name.to_string());
            scores.push(score);
        } else {
            unscored.push(name.to_string());
        }
    }
    if !unscored.is_empty() {
        debug!("S{}: {} rows without a score left out", cohort, unscored.len());
    }

    evaluate_aligned(
        projector,
        cohort,
        &vectors,
        &file.anchors,
        labels,
        scores,
        unscored,
    )
}

/// Name join of a member list against a vector dictionary
///
/// Returns the joined vectors, their names and scores in reference order, and
/// the names with no vector.
pub fn join_dictionary(
    dictionary: &VectorDictionary,
    references: &ReferenceScores,
) -> Result<(EmbeddingMatrix, Vec<String>, Vec<f32>, Vec<String>)> {
    let mut vectors = EmbeddingMatrix::with_dim(dictionary.dim());
    let mut labels = Vec::new();
    let mut scores = Vec::new();
    let mut missing = Vec::new();

    for (name, score) in references.iter() {
        match dictionary.get(name) {
            Some(vector) => {
                vectors.push(name, vector)?;
                labels.push(name.to_string());
                scores.push(score);
            }
            None => missing.push(name.to_string()),
        }
    }
    Ok((vectors, labels, scores, missing))
}

// ============================================================================
// Evaluators
// ============================================================================

/// Per-session with-axes vector files, positionally aligned with member lists
#[derive(Debug, Clone)]
pub struct AxisFileEvaluator {
    vectors: PathTemplate,
    reference: PathTemplate,
    projector: AxisProjector,
}

impl AxisFileEvaluator {
    pub fn new(vectors: PathTemplate, reference: PathTemplate, projector: AxisProjector) -> Self {
        Self {
            vectors,
            reference,
            projector,
        }
    }
}

impl CohortEvaluator for AxisFileEvaluator {
    fn evaluate(&self, cohort: CohortId) -> Result<CohortResult> {
        let references = reference::load(self.reference.resolve(cohort))?;
        let file = vecfile::read_with_axes(self.vectors.resolve(cohort))?;
        join_positional(&self.projector, cohort, &file, references)
    }
}

/// One vector dictionary shared by every session
#[derive(Debug, Clone)]
pub struct DictionaryEvaluator {
    dictionary: VectorDictionary,
    anchors: AxisAnchors,
    reference: PathTemplate,
    projector: AxisProjector,
}

impl DictionaryEvaluator {
    /// Look up the axis words once; fails if any is absent or an axis is degenerate
    pub fn new(
        dictionary: VectorDictionary,
        words: &AxisWords,
        reference: PathTemplate,
        projector: AxisProjector,
    ) -> Result<Self> {
        let anchors = dictionary.anchors(words)?;
        projector.axes(&anchors)?;
        Ok(Self {
            dictionary,
            anchors,
            reference,
            projector,
        })
    }

    /// Evaluate against an already loaded member list
    pub fn evaluate_references(
        &self,
        cohort: CohortId,
        references: &ReferenceScores,
    ) -> Result<CohortResult> {
        let (vectors, labels, scores, missing) = join_dictionary(&self.dictionary, references)?;
        if !missing.is_empty() {
            warn!("S{}: missing from vocabulary: {:?}", cohort, missing);
        }
        evaluate_aligned(
            &self.projector,
            cohort,
            &vectors,
            &self.anchors,
            labels,
            scores,
            missing,
        )
    }
}

impl CohortEvaluator for DictionaryEvaluator {
    fn evaluate(&self, cohort: CohortId) -> Result<CohortResult> {
        let references = reference::load(self.reference.resolve(cohort))?;
        self.evaluate_references(cohort, &references)
    }
}

//! # Vector Files
//!
//! Readers for the text vector format written by word2vec and fastText.
//!
//! ## Formats
//!
//! ```text
//! 3 2                  <- header: vocab_size embed_dim (plain format only)
//! alice 1.0 0.0
//! bob 0.0 1.0
//! carol -1.0 0.0
//! ```
//!
//! The "with axes" variant, produced by fastText's `print-word-vectors` over a
//! query list, has no header. Its first four entries are the axis anchors in
//! the order `[positive_x, negative_x, positive_y, negative_y]`.
//!
//! ## Readers
//!
//! - [`read_plain`]: header + entries, shape cross-checked against the header
//! - [`read_with_axes`]: four anchors + entries
//! - [`read_as_mapping`]: plain format folded into `label -> vector`
//!   (last write wins for duplicate labels)

pub mod parser;
pub mod validation;

pub use validation::ShapeReport;

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::config::AxisWords;
use crate::primitives::matrix_tensor;
use crate::{Device, PolivecError, Result, Tensor};

// ============================================================================
// Embedding Matrix
// ============================================================================

/// Ordered labelled vectors sharing one dimension
///
/// Stored row-major. Labels are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingMatrix {
    labels: Vec<String>,
    values: Vec<f32>,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Create an empty matrix of the given dimension
    pub fn with_dim(dim: usize) -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
            dim,
        }
    }

    /// Build from `(label, vector)` rows, all of the same length
    pub fn from_rows<L, I>(rows: I) -> Result<Self>
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, Vec<f32>)>,
    {
        let mut matrix = Self::default();
        for (label, vector) in rows {
            matrix.push(label, &vector)?;
        }
        Ok(matrix)
    }

    /// Append a row; the first row of an empty matrix fixes the dimension
    pub fn push(&mut self, label: impl Into<String>, vector: &[f32]) -> Result<()> {
        if self.labels.is_empty() {
            self.dim = vector.len();
        } else if vector.len() != self.dim {
            return Err(PolivecError::DimensionMismatch {
                expected: self.dim,
                found: vector.len(),
            });
        }
        self.labels.push(label.into());
        self.values.extend_from_slice(vector);
        Ok(())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Vector dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `(rows, dim)`
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.dim)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Row `i` as a slice
    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterate `(label, vector)` in file order
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f32])> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(move |(i, label)| (label.as_str(), self.row(i)))
    }

    /// Upload as a `(rows, dim)` tensor
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        matrix_tensor(&self.values, self.len(), self.dim, device)
    }

    /// Split into the first `n` rows and the rest
    fn split_at(self, n: usize) -> (Self, Self) {
        let dim = self.dim;
        let mut labels = self.labels;
        let mut values = self.values;
        let rest_labels = labels.split_off(n);
        let rest_values = values.split_off(n * dim);
        (
            Self { labels, values, dim },
            Self {
                labels: rest_labels,
                values: rest_values,
                dim,
            },
        )
    }
}

// ============================================================================
// Axis Anchors
// ============================================================================

/// The four anchor vectors that define the projection axes
///
/// Order is significant: `[positive_x, negative_x, positive_y, negative_y]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisAnchors {
    labels: [String; 4],
    vectors: [Vec<f32>; 4],
}

impl AxisAnchors {
    /// Build from labelled anchors; all four must share a dimension
    pub fn new(labels: [String; 4], vectors: [Vec<f32>; 4]) -> Result<Self> {
        let dim = vectors[0].len();
        if let Some(v) = vectors.iter().find(|v| v.len() != dim) {
            return Err(PolivecError::DimensionMismatch {
                expected: dim,
                found: v.len(),
            });
        }
        Ok(Self { labels, vectors })
    }

    /// Take the four rows of a matrix as anchors
    fn from_matrix(matrix: &EmbeddingMatrix) -> Result<Self> {
        if matrix.len() != 4 {
            return Err(PolivecError::DimensionMismatch {
                expected: 4,
                found: matrix.len(),
            });
        }
        let label = |i: usize| matrix.labels()[i].clone();
        let row = |i: usize| matrix.row(i).to_vec();
        Self::new(
            [label(0), label(1), label(2), label(3)],
            [row(0), row(1), row(2), row(3)],
        )
    }

    /// Anchor dimension
    pub fn dim(&self) -> usize {
        self.vectors[0].len()
    }

    /// Anchor labels in order
    pub fn labels(&self) -> &[String; 4] {
        &self.labels
    }

    /// `(positive, negative)` anchors of the x axis
    pub fn x_pair(&self) -> ((&str, &[f32]), (&str, &[f32])) {
        (self.anchor(0), self.anchor(1))
    }

    /// `(positive, negative)` anchors of the y axis
    pub fn y_pair(&self) -> ((&str, &[f32]), (&str, &[f32])) {
        (self.anchor(2), self.anchor(3))
    }

    fn anchor(&self, i: usize) -> (&str, &[f32]) {
        (self.labels[i].as_str(), self.vectors[i].as_slice())
    }
}

// ============================================================================
// Parsed files
// ============================================================================

/// Result of [`read_plain`]
#[derive(Debug, Clone)]
pub struct VectorFile {
    /// Entries in file order
    pub vectors: EmbeddingMatrix,
    /// Header vs content comparison
    pub shape: ShapeReport,
}

/// Result of [`read_with_axes`]
#[derive(Debug, Clone)]
pub struct AxisVectorFile {
    /// The first four entries
    pub anchors: AxisAnchors,
    /// Remaining entries in file order
    pub vectors: EmbeddingMatrix,
}

/// Word -> vector mapping built by [`read_as_mapping`]
#[derive(Debug, Clone)]
pub struct VectorDictionary {
    entries: HashMap<String, Vec<f32>>,
    dim: usize,
    /// Header vs distinct-key count comparison
    pub shape: ShapeReport,
}

impl VectorDictionary {
    /// Look up a word
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Look up the four axis words as anchors
    pub fn anchors(&self, words: &AxisWords) -> Result<AxisAnchors> {
        let lookup = |word: &str| {
            self.get(word)
                .map(<[f32]>::to_vec)
                .ok_or_else(|| PolivecError::MissingAnchor(word.to_string()))
        };
        let [px, nx, py, ny] = words.as_array();
        AxisAnchors::new(
            [px.to_string(), nx.to_string(), py.to_string(), ny.to_string()],
            [lookup(px)?, lookup(nx)?, lookup(py)?, lookup(ny)?],
        )
    }
}

// ============================================================================
// Readers
// ============================================================================

/// Load a `.vec` file with a `<vocab_size> <embed_dim>` header
///
/// The parsed content is authoritative: a header that disagrees with it is
/// reported through [`VectorFile::shape`] and a warning, not an error.
pub fn read_plain(path: impl AsRef<Path>) -> Result<VectorFile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PolivecError::read(path, e))?;
    parse_plain(path, &content)
}

/// Parse plain-format content; `path` is only used in diagnostics
pub fn parse_plain(path: &Path, content: &str) -> Result<VectorFile> {
    let (declared, vectors) = parse_with_header(path, content)?;
    let shape = ShapeReport::check(path, declared, vectors.shape());
    Ok(VectorFile { vectors, shape })
}

/// Load a headerless `.vec` file whose first four entries are axis anchors
pub fn read_with_axes(path: impl AsRef<Path>) -> Result<AxisVectorFile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PolivecError::read(path, e))?;
    parse_with_axes(path, &content)
}

/// Parse with-axes content; `path` is only used in diagnostics
pub fn parse_with_axes(path: &Path, content: &str) -> Result<AxisVectorFile> {
    let matrix = parse_entries(path, numbered(content))?;
    if matrix.len() < 4 {
        return Err(PolivecError::parse(
            path,
            matrix.len() + 1,
            format!("expected 4 axis anchor entries, found {}", matrix.len()),
        ));
    }
    let (anchor_rows, vectors) = matrix.split_at(4);
    let anchors = AxisAnchors::from_matrix(&anchor_rows)?;
    debug!(
        "{}: anchors {:?}, {} vectors of dim {}",
        path.display(),
        anchors.labels(),
        vectors.len(),
        vectors.dim()
    );
    Ok(AxisVectorFile { anchors, vectors })
}

/// Load a plain `.vec` file as a `label -> vector` mapping
///
/// Duplicate labels are not rejected: the last entry wins.
pub fn read_as_mapping(path: impl AsRef<Path>) -> Result<VectorDictionary> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PolivecError::read(path, e))?;
    parse_as_mapping(path, &content)
}

/// Parse plain-format content into a mapping; `path` is only used in diagnostics
pub fn parse_as_mapping(path: &Path, content: &str) -> Result<VectorDictionary> {
    let (declared, matrix) = parse_with_header(path, content)?;
    let dim = matrix.dim();
    let mut entries = HashMap::with_capacity(matrix.len());
    for (label, vector) in matrix.rows() {
        entries.insert(label.to_string(), vector.to_vec());
    }
    let shape = ShapeReport::check(path, declared, (entries.len(), dim));
    Ok(VectorDictionary {
        entries,
        dim,
        shape,
    })
}

/// Lines paired with their 1-based line numbers, trailing blank lines dropped
///
/// Blank lines between entries are still parse errors.
fn numbered(content: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    content
        .trim_end()
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
}

fn parse_with_header(path: &Path, content: &str) -> Result<((usize, usize), EmbeddingMatrix)> {
    let mut lines = numbered(content);
    let declared = match lines.next() {
        Some((n, line)) => {
            parser::parse_header(line).map_err(|msg| PolivecError::parse(path, n, msg))?
        }
        None => return Err(PolivecError::parse(path, 1, "missing header line")),
    };
    let matrix = parse_entries(path, lines)?;
    Ok((declared, matrix))
}

fn parse_entries<'a>(
    path: &Path,
    lines: impl Iterator<Item = (usize, &'a str)>,
) -> Result<EmbeddingMatrix> {
    let mut matrix = EmbeddingMatrix::default();
    for (n, line) in lines {
        let (label, vector) =
            parser::parse_entry(line).map_err(|msg| PolivecError::parse(path, n, msg))?;
        let expected = matrix.dim();
        matrix.push(label, &vector).map_err(|_| {
            PolivecError::parse(
                path,
                n,
                format!("expected {} components, found {}", expected, vector.len()),
            )
        })?;
    }
    Ok(matrix)
}

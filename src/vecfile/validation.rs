//! Shape Validation
//!
//! Compares the `(vocab_size, embed_dim)` a `.vec` header declares with the
//! shape that parsing the body actually produced. The header is advisory: a
//! mismatch is reported, logged, and otherwise ignored.

use std::path::{Path, PathBuf};
use tracing::warn;

/// Declared vs parsed shape of a vector file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeReport {
    /// File the shape was read from
    pub path: PathBuf,
    /// `(vocab_size, embed_dim)` from the header line
    pub declared: (usize, usize),
    /// `(entries, dimension)` actually parsed
    pub actual: (usize, usize),
}

impl ShapeReport {
    /// Compare declared and actual shape, logging a warning on mismatch
    pub fn check(path: &Path, declared: (usize, usize), actual: (usize, usize)) -> Self {
        let report = Self {
            path: path.to_path_buf(),
            declared,
            actual,
        };
        if !report.is_consistent() {
            warn!("{}", report);
        }
        report
    }

    /// Whether the header agrees with the parsed content
    pub fn is_consistent(&self) -> bool {
        self.declared == self.actual
    }
}

impl std::fmt::Display for ShapeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: header declares vocab_size = {}, embed_dim = {}",
            self.path.display(),
            self.declared.0,
            self.declared.1
        )?;
        if !self.is_consistent() {
            write!(
                f,
                " but reading the file yielded shape ({}, {})",
                self.actual.0, self.actual.1
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistent_shape() {
        let report = ShapeReport::check(Path::new("a.vec"), (3, 2), (3, 2));
        assert!(report.is_consistent());
        assert!(!report.to_string().contains("yielded"));
    }

    #[test]
    fn test_mismatched_shape() {
        let report = ShapeReport::check(Path::new("a.vec"), (5, 2), (3, 2));
        assert!(!report.is_consistent());
        let msg = report.to_string();
        assert!(msg.contains("vocab_size = 5"));
        assert!(msg.contains("(3, 2)"));
    }
}

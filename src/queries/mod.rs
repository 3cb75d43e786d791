//! # Query Projection
//!
//! Projects arbitrary entities (policies, talking points) onto the same two
//! axes used for senators. The list comes from a plain text file, one entity
//! per line:
//!
//! ```text
//! # Salient policies
//! obamacare
//! medicare
//!
//! immigration
//! ```
//!
//! Lines containing `#` anywhere are comments; blank lines are skipped.

use std::path::Path;
use tracing::{debug, warn};

use crate::plot::ScatterPlot;
use crate::projection::AxisProjector;
use crate::vecfile::{AxisAnchors, EmbeddingMatrix, VectorDictionary};
use crate::{PolivecError, Result};

/// Axis label for query plots
pub const QUERY_X_LABEL: &str = "liberal - conservative";
/// Axis label for query plots
pub const QUERY_Y_LABEL: &str = "bad - good";

/// Read a query list file
pub fn read_queries(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PolivecError::read(path, e))?;
    let queries = parse_queries(&content);
    debug!("{}: {} queries", path.display(), queries.len());
    Ok(queries)
}

/// Trimmed query lines, comments and blanks dropped
pub fn parse_queries(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.contains('#'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Project every query found in `dictionary` onto both axes
///
/// Queries absent from the dictionary are logged and left out of the plot.
/// The returned plot keeps the found queries in list order.
pub fn project_queries<S: AsRef<str>>(
    dictionary: &VectorDictionary,
    queries: &[S],
    anchors: &AxisAnchors,
    projector: &AxisProjector,
    title: impl Into<String>,
) -> Result<ScatterPlot> {
    let mut vectors = EmbeddingMatrix::with_dim(dictionary.dim());
    let mut missing = Vec::new();
    for query in queries {
        let query = query.as_ref();
        match dictionary.get(query) {
            Some(vector) => vectors.push(query, vector)?,
            None => missing.push(query),
        }
    }
    if !missing.is_empty() {
        warn!("Queries missing from vocabulary: {:?}", missing);
    }

    let projection = projector.project(&vectors, anchors)?;
    let plot = ScatterPlot::new(
        projection.x,
        projection.y,
        vectors.labels().to_vec(),
        title,
    )?;
    Ok(plot.with_axis_labels(QUERY_X_LABEL, QUERY_Y_LABEL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisWords;
    use crate::vecfile::parse_as_mapping;
    use tempfile::TempDir;

    const POLICIES: &str = "\
# Salient policies and talking points
obamacare

  medicare
tax cuts # not a single token
immigration
";

    fn dictionary() -> VectorDictionary {
        parse_as_mapping(
            Path::new("nyt.vec"),
            "7 2\nconservative 1 0\nliberal -1 0\ngood 0 1\nbad 0 -1\n\
             obamacare -0.6 0.2\nmedicare -0.1 0.7\nimmigration 0.4 -0.3\n",
        )
        .unwrap()
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        assert_eq!(
            parse_queries(POLICIES),
            vec!["obamacare", "medicare", "immigration"]
        );
    }

    #[test]
    fn test_read_queries_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("salient_policies.md");
        std::fs::write(&path, POLICIES).unwrap();

        let queries = read_queries(&path).unwrap();
        assert_eq!(queries.len(), 3);
        let err = read_queries(temp.path().join("absent.md")).unwrap_err();
        assert!(err.to_string().contains("absent.md"));
    }

    #[test]
    fn test_project_queries() {
        let dict = dictionary();
        let anchors = dict.anchors(&AxisWords::default()).unwrap();
        let queries = ["obamacare", "carbon tax", "immigration"];

        let plot = project_queries(
            &dict,
            &queries,
            &anchors,
            &AxisProjector::cpu(),
            "Salient Policies and Talking Points (NYT)",
        )
        .unwrap();

        assert_eq!(plot.labels, vec!["obamacare", "immigration"]);
        assert!((plot.x[0] + 0.6).abs() < 1e-6);
        assert!((plot.y[0] - 0.2).abs() < 1e-6);
        assert!((plot.x[1] - 0.4).abs() < 1e-6);
        assert!((plot.y[1] + 0.3).abs() < 1e-6);
        assert_eq!(plot.x_label, QUERY_X_LABEL);
        assert_eq!(plot.y_label, QUERY_Y_LABEL);
        assert_eq!(plot.title, "Salient Policies and Talking Points (NYT)");
    }

    #[test]
    fn test_project_queries_none_found() {
        let dict = dictionary();
        let anchors = dict.anchors(&AxisWords::default()).unwrap();
        let plot = project_queries(
            &dict,
            &["carbon tax".to_string()],
            &anchors,
            &AxisProjector::cpu(),
            "empty",
        )
        .unwrap();
        assert!(plot.is_empty());
    }
}

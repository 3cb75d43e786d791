//! # Multi-Session Aggregation
//!
//! Runs a [`CohortEvaluator`] over a range of sessions and averages the
//! correlation coefficients.
//!
//! ## Lazy runs
//!
//! [`Aggregator::run`] returns a [`CohortRun`], an iterator that evaluates one
//! session per `next()` in increasing order. Each outcome can be handed to a
//! plot sink as it arrives; [`CohortRun::finish`] drains the rest and returns
//! the [`AggregateReport`]. A run cannot be restarted: aggregate the same
//! range again with a fresh `run`.
//!
//! ## Averaging
//!
//! A session that fails (unreadable file, length mismatch, undefined
//! correlation) is logged, recorded in [`AggregateReport::failures`], and left
//! out of the means. The means divide by the number of sessions actually
//! averaged, never by the size of the requested range.
//!
//! ```rust,ignore
//! let aggregator = Aggregator::new(&evaluator);
//! let mut run = aggregator.run(97..115);
//! for outcome in run.by_ref() {
//!     if let Ok(result) = &outcome.result {
//!         sink.scatter(&ScatterPlot::for_cohort(result, &plot_config))?;
//!     }
//! }
//! let report = run.finish();
//! ```

use std::ops::Range;
use tracing::{info, warn};

use crate::cohort::{CohortEvaluator, CohortId, CohortResult};
use crate::Result;

/// One evaluated session
#[derive(Debug)]
pub struct CohortOutcome {
    pub cohort: CohortId,
    pub result: Result<CohortResult>,
}

/// A session left out of the averages
#[derive(Debug, Clone, PartialEq)]
pub struct CohortFailure {
    pub cohort: CohortId,
    /// Display form of the error
    pub reason: String,
}

/// Averages over a session range
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    /// Mean Pearson's r over averaged sessions, `None` if none succeeded
    pub mean_pearson: Option<f64>,
    /// Mean Spearman's rho over averaged sessions, `None` if none succeeded
    pub mean_spearman: Option<f64>,
    /// Sessions that contributed to the means
    pub averaged: usize,
    /// Size of the requested range
    pub requested: usize,
    /// Sessions left out, in session order
    pub failures: Vec<CohortFailure>,
}

impl std::fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.mean_pearson, self.mean_spearman) {
            (Some(r), Some(rho)) => {
                writeln!(f, "Average Pearson's r = {:.4}", r)?;
                writeln!(f, "Average Spearman's rho = {:.4}", rho)?;
            }
            _ => writeln!(f, "No session produced a defined correlation")?,
        }
        write!(
            f,
            "Averaged {} of {} sessions",
            self.averaged, self.requested
        )?;
        for failure in &self.failures {
            write!(f, "\n  S{}: {}", failure.cohort, failure.reason)?;
        }
        Ok(())
    }
}

/// Runs an evaluator over session ranges
#[derive(Debug, Clone)]
pub struct Aggregator<E> {
    evaluator: E,
}

impl<E: CohortEvaluator> Aggregator<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Lazily evaluate `cohorts` (start inclusive, end exclusive)
    pub fn run(&self, cohorts: Range<CohortId>) -> CohortRun<&E> {
        CohortRun::new(&self.evaluator, cohorts)
    }

    /// Evaluate every session in `cohorts` and average
    pub fn aggregate(&self, cohorts: Range<CohortId>) -> AggregateReport {
        self.run(cohorts).finish()
    }
}

/// In-progress evaluation of a session range
pub struct CohortRun<E> {
    evaluator: E,
    cohorts: Range<CohortId>,
    requested: usize,
    sum_pearson: f64,
    sum_spearman: f64,
    averaged: usize,
    failures: Vec<CohortFailure>,
}

impl<E: CohortEvaluator> CohortRun<E> {
    fn new(evaluator: E, cohorts: Range<CohortId>) -> Self {
        let requested = cohorts.len();
        Self {
            evaluator,
            cohorts,
            requested,
            sum_pearson: 0.0,
            sum_spearman: 0.0,
            averaged: 0,
            failures: Vec::new(),
        }
    }

    /// Evaluate any remaining sessions and produce the report
    pub fn finish(mut self) -> AggregateReport {
        for _ in self.by_ref() {}

        let mean = |sum: f64| (self.averaged > 0).then(|| sum / self.averaged as f64);
        let report = AggregateReport {
            mean_pearson: mean(self.sum_pearson),
            mean_spearman: mean(self.sum_spearman),
            averaged: self.averaged,
            requested: self.requested,
            failures: self.failures,
        };
        info!(
            "Averaged {} of {} sessions: r = {:?}, rho = {:?}",
            report.averaged, report.requested, report.mean_pearson, report.mean_spearman
        );
        report
    }
}

impl<E: CohortEvaluator> Iterator for CohortRun<E> {
    type Item = CohortOutcome;

    fn next(&mut self) -> Option<CohortOutcome> {
        let cohort = self.cohorts.next()?;
        let result = self.evaluator.evaluate(cohort);

        match &result {
            Ok(r) => {
                info!("S{}: {}", cohort, r.correlation);
                self.sum_pearson += r.pearson_r();
                self.sum_spearman += r.spearman_rho();
                self.averaged += 1;
            }
            Err(e) => {
                warn!("S{} left out of the averages: {}", cohort, e);
                self.failures.push(CohortFailure {
                    cohort,
                    reason: e.to_string(),
                });
            }
        }

        Some(CohortOutcome { cohort, result })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cohorts.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PolivecError;
    use crate::config::{AxisWords, PathTemplate};
    use crate::cohort::DictionaryEvaluator;
    use crate::projection::AxisProjector;
    use crate::reference::ReferenceScores;
    use crate::vecfile::parse_as_mapping;
    use std::collections::HashMap;
    use std::path::Path;

    /// Dictionary evaluator over in-memory member lists
    struct InMemory {
        evaluator: DictionaryEvaluator,
        members: HashMap<CohortId, ReferenceScores>,
    }

    impl CohortEvaluator for InMemory {
        fn evaluate(&self, cohort: CohortId) -> Result<CohortResult> {
            let refs = self.members.get(&cohort).ok_or_else(|| {
                PolivecError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("S{}_members.csv", cohort),
                ))
            })?;
            self.evaluator.evaluate_references(cohort, refs)
        }
    }

    fn refs(names: &[&str], scores: &[f32]) -> ReferenceScores {
        ReferenceScores {
            scores: scores.to_vec(),
            names: names.iter().map(|n| n.to_string()).collect(),
            missing: Vec::new(),
        }
    }

    fn fixture() -> InMemory {
        let dict = parse_as_mapping(
            Path::new("dict.vec"),
            "8 2\nconservative 1 0\nliberal -1 0\ngood 0 1\nbad 0 -1\n\
             alice 0.9 0\nbob 0.1 0\ncarol -0.8 0\ndan -0.2 0\n",
        )
        .unwrap();
        let evaluator = DictionaryEvaluator::new(
            dict,
            &AxisWords::default(),
            PathTemplate::new("S{}.csv"),
            AxisProjector::cpu(),
        )
        .unwrap();

        let mut members = HashMap::new();
        // Perfectly ordered sessions: r and rho both positive
        members.insert(1, refs(&["alice", "bob", "carol"], &[0.7, 0.2, -0.5]));
        members.insert(2, refs(&["alice", "carol", "dan"], &[0.6, -0.6, -0.1]));
        // Only one senator in the vocabulary
        members.insert(3, refs(&["alice", "eve", "frank"], &[0.6, 0.1, -0.2]));
        // Fully reversed session
        members.insert(4, refs(&["alice", "carol"], &[-0.4, 0.4]));
        members.insert(5, refs(&["bob", "dan"], &[0.3, -0.3]));
        InMemory { evaluator, members }
    }

    #[test]
    fn test_average_excludes_undefined_session() {
        let fixture = fixture();
        let report = Aggregator::new(&fixture).aggregate(1..6);

        assert_eq!(report.requested, 5);
        assert_eq!(report.averaged, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].cohort, 3);
        assert!(report.failures[0]
            .reason
            .contains("correlation undefined over 1 paired samples"));

        // Sessions 1, 2, 5 correlate at +1, session 4 at -1
        let expected_rho = (1.0 + 1.0 - 1.0 + 1.0) / 4.0;
        assert!((report.mean_spearman.unwrap() - expected_rho).abs() < 1e-9);
        let r = report.mean_pearson.unwrap();
        assert!(r > 0.0 && r <= expected_rho + 1e-9);
    }

    #[test]
    fn test_run_is_lazy_and_ordered() {
        let fixture = fixture();
        let aggregator = Aggregator::new(&fixture);
        let mut run = aggregator.run(1..6);
        assert_eq!(run.size_hint(), (5, Some(5)));

        let first = run.next().unwrap();
        assert_eq!(first.cohort, 1);
        assert!(first.result.is_ok());
        assert_eq!(run.size_hint(), (4, Some(4)));

        let cohorts: Vec<CohortId> = run.by_ref().map(|o| o.cohort).collect();
        assert_eq!(cohorts, vec![2, 3, 4, 5]);
        assert!(run.next().is_none());

        let report = run.finish();
        assert_eq!(report.averaged, 4);
    }

    #[test]
    fn test_failed_outcome_reaches_caller() {
        let fixture = fixture();
        let aggregator = Aggregator::new(&fixture);
        let outcome = aggregator.run(3..4).next().unwrap();
        assert!(matches!(
            outcome.result,
            Err(PolivecError::UndefinedCorrelation { cohort: 3, samples: 1 })
        ));
    }

    #[test]
    fn test_missing_files_do_not_abort_run() {
        let fixture = fixture();
        let report = Aggregator::new(&fixture).aggregate(4..8);
        assert_eq!(report.requested, 4);
        assert_eq!(report.averaged, 2);
        let failed: Vec<CohortId> = report.failures.iter().map(|f| f.cohort).collect();
        assert_eq!(failed, vec![6, 7]);
        assert!(report.failures[0].reason.starts_with("IO error"));
    }

    #[test]
    fn test_failure_reason_names_missing_file() {
        use crate::cohort::AxisFileEvaluator;
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().display();
        std::fs::write(
            temp.path().join("S98_members.csv"),
            "bioname,dim1\n\"ALICE, A\",0.5\n",
        )
        .unwrap();
        let evaluator = AxisFileEvaluator::new(
            PathTemplate::new(format!("{}/S{{}}.vec", dir)),
            PathTemplate::new(format!("{}/S{{}}_members.csv", dir)),
            AxisProjector::cpu(),
        );

        let report = Aggregator::new(&evaluator).aggregate(97..99);
        assert_eq!(report.failures.len(), 2);
        // No member list for S97; member list but no vectors for S98
        assert!(report.failures[0].reason.contains("S97_members.csv"));
        assert!(report.failures[1].reason.contains("S98.vec"));
        assert!(report.to_string().contains("S98.vec"));
    }

    #[test]
    fn test_no_successful_sessions() {
        let fixture = fixture();
        let report = Aggregator::new(&fixture).aggregate(10..12);
        assert_eq!(report.averaged, 0);
        assert!(report.mean_pearson.is_none());
        assert!(report.mean_spearman.is_none());
        assert!(report.to_string().contains("Averaged 0 of 2 sessions"));
    }

    #[test]
    fn test_report_display() {
        let fixture = fixture();
        let report = Aggregator::new(&fixture).aggregate(1..6);
        let text = report.to_string();
        assert!(text.contains("Average Pearson's r"));
        assert!(text.contains("Averaged 4 of 5 sessions"));
        assert!(text.contains("S3"));
    }
}

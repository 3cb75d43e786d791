//! # Pipeline
//!
//! End-to-end run described by a [`PipelineConfig`]: build the evaluator for
//! the configured embedding mode, evaluate every session in the range, send
//! one scatter plot per successful session to a [`PlotSink`], and return the
//! averaged report.
//!
//! ```rust,ignore
//! let config = PipelineConfig::load("polivec.toml")?;
//! let report = pipeline::run(&config, &mut LogSink)?;
//! println!("{}", report);
//! ```

use tracing::{info, warn};

use crate::aggregate::{AggregateReport, Aggregator};
use crate::cohort::{AxisFileEvaluator, CohortEvaluator, DictionaryEvaluator};
use crate::config::{EmbeddingMode, PipelineConfig};
use crate::plot::{PlotSink, ScatterPlot};
use crate::projection::AxisProjector;
use crate::vecfile;
use crate::Result;

/// Run the configured sessions on the CPU
pub fn run(config: &PipelineConfig, sink: &mut dyn PlotSink) -> Result<AggregateReport> {
    run_with(config, AxisProjector::cpu(), sink)
}

/// Run the configured sessions with a specific projector
///
/// Fails only on setup errors (invalid configuration, unreadable dictionary,
/// missing or degenerate axis words). Per-session errors end up in the report.
pub fn run_with(
    config: &PipelineConfig,
    projector: AxisProjector,
    sink: &mut dyn PlotSink,
) -> Result<AggregateReport> {
    config.validate()?;
    info!(
        "Evaluating sessions {}..{} ({:?} mode)",
        config.cohorts.start, config.cohorts.end, config.embeddings.mode
    );

    match config.embeddings.mode {
        EmbeddingMode::AxisFiles => {
            let evaluator = AxisFileEvaluator::new(
                config.embeddings.path.clone(),
                config.reference.path.clone(),
                projector,
            );
            drive(evaluator, config, sink)
        }
        EmbeddingMode::Dictionary => {
            let dictionary = vecfile::read_as_mapping(config.embeddings.path.as_str())?;
            info!(
                "{}: {} words of dimension {}",
                config.embeddings.path,
                dictionary.len(),
                dictionary.dim()
            );
            let evaluator = DictionaryEvaluator::new(
                dictionary,
                &config.axes,
                config.reference.path.clone(),
                projector,
            )?;
            drive(evaluator, config, sink)
        }
    }
}

fn drive<E: CohortEvaluator>(
    evaluator: E,
    config: &PipelineConfig,
    sink: &mut dyn PlotSink,
) -> Result<AggregateReport> {
    let aggregator = Aggregator::new(evaluator);
    let mut run = aggregator.run(config.cohorts.as_range());

    for outcome in run.by_ref() {
        if let Ok(result) = &outcome.result {
            let plot = ScatterPlot::for_cohort(result, &config.plot);
            if let Err(e) = sink.scatter(&plot) {
                warn!("S{}: plot sink failed: {}", outcome.cohort, e);
            }
        }
    }

    Ok(run.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathTemplate;
    use crate::PolivecError;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        plots: Vec<ScatterPlot>,
        fail_on: Option<String>,
    }

    impl PlotSink for Recorder {
        fn scatter(&mut self, plot: &ScatterPlot) -> Result<()> {
            if self.fail_on.as_deref() == Some(plot.title.as_str()) {
                return Err(PolivecError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "display unavailable",
                )));
            }
            self.plots.push(plot.clone());
            Ok(())
        }
    }

    const AXES: &str = "conservative 1 0\nliberal -1 0\ngood 0 1\nbad 0 -1\n";

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn config(dir: &Path, mode: &str, vectors: &str) -> PipelineConfig {
        PipelineConfig::from_toml_str(&format!(
            r#"
            [cohorts]
            start = 97
            end = 100

            [embeddings]
            mode = "{mode}"
            path = "{dir}/{vectors}"

            [reference]
            path = "{dir}/S{{}}_members.csv"

            [plot]
            save_dir = "{dir}/graphs"
            "#,
            mode = mode,
            dir = dir.display(),
            vectors = vectors,
        ))
        .unwrap()
    }

    /// Sessions 97 and 98 are usable, 99 has no member list
    fn fixture(dir: &Path) {
        write(
            dir,
            "S97_members.csv",
            "bioname,dim1\n\"ALICE, A\",0.5\n\"BOB, B\",0.1\n\"CAROL, C\",-0.4\n",
        );
        write(
            dir,
            "S98_members.csv",
            "bioname,dim1\n\"ALICE, A\",-0.5\n\"CAROL, C\",0.4\n\"DAVE, D\",0.2\n",
        );
        write(dir, "S97.vec", &format!("{}alice 1 0\nbob 0 1\ncarol -1 0\n", AXES));
        write(dir, "S98.vec", &format!("{}alice 1 0\ncarol -1 0\ndave 0.3 0\n", AXES));
        write(
            dir,
            "all.vec",
            &format!("7 2\n{}alice 1 0\nbob 0 1\ncarol -1 0\n", AXES),
        );
    }

    #[test]
    fn test_axis_files_run() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        let config = config(temp.path(), "axis_files", "S{}.vec");

        let mut sink = Recorder::default();
        let report = run(&config, &mut sink).unwrap();

        assert_eq!(report.requested, 3);
        assert_eq!(report.averaged, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].cohort, 99);

        let titles: Vec<&str> = sink.plots.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["97th U.S. Senate", "98th U.S. Senate"]);
        assert_eq!(
            sink.plots[0].save_path,
            Some(temp.path().join("graphs").join("S97.png"))
        );
        // S97 agrees with DW-NOMINATE, S98 is reversed
        assert!(report.mean_spearman.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_dictionary_run_drops_absent_senators() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        let config = config(temp.path(), "dictionary", "all.vec");

        let mut sink = Recorder::default();
        let report = run(&config, &mut sink).unwrap();

        assert_eq!(report.averaged, 2);
        // dave has no vector; S98 correlates over alice and carol only
        assert_eq!(sink.plots[1].labels, vec!["alice", "carol"]);
        assert!(report.mean_spearman.unwrap().abs() < 1e-9);
        assert!(report.mean_pearson.unwrap() < 0.0);
    }

    #[test]
    fn test_sink_failure_does_not_abort() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        let config = config(temp.path(), "axis_files", "S{}.vec");

        let mut sink = Recorder {
            fail_on: Some("97th U.S. Senate".to_string()),
            ..Recorder::default()
        };
        let report = run(&config, &mut sink).unwrap();
        assert_eq!(report.averaged, 2);
        assert_eq!(sink.plots.len(), 1);
        assert_eq!(sink.plots[0].title, "98th U.S. Senate");
    }

    #[test]
    fn test_dictionary_without_anchor_words_fails_setup() {
        let temp = TempDir::new().unwrap();
        fixture(temp.path());
        write(temp.path(), "bare.vec", "2 2\nalice 1 0\nbob 0 1\n");
        let config = config(temp.path(), "dictionary", "bare.vec");

        let err = run(&config, &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, PolivecError::MissingAnchor(_)));
    }

    #[test]
    fn test_invalid_config_rejected_before_io() {
        let temp = TempDir::new().unwrap();
        let mut config = config(temp.path(), "axis_files", "S{}.vec");
        config.embeddings.path = PathTemplate::new("fixed.vec");

        let err = run(&config, &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, PolivecError::Config(_)));
    }
}

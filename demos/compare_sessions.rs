//! Multi-session comparison against DW-NOMINATE
//!
//! Demonstrates: config → per-session evaluation → plots → averaged report
//!
//! Run with:
//! ```bash
//! cargo run --example compare_sessions
//! ```

use polivec::prelude::*;
use polivec::pipeline;
use std::path::Path;

const AXES: &str = "conservative 1.0 0.1 0.0\nliberal -0.9 0.2 0.1\ngood 0.1 1.0 0.0\nbad 0.0 -1.1 0.2\n";

fn main() -> Result<()> {
    // 1. Lay out two sessions of vector files and member lists
    let temp = tempfile::TempDir::new()?;
    let dir = temp.path();

    write(dir, "S97.vec", &format!(
        "{}moynihan -0.7 0.3 0.1\nthurmond 0.9 -0.1 0.0\nbyrd -0.2 0.1 0.4\nhelms 1.1 -0.4 0.2\n",
        AXES
    ))?;
    write(dir, "S97_members.csv", "\
congress,chamber,bioname,dim1
97,Senate,\"MOYNIHAN, Daniel Patrick\",-0.331
97,Senate,\"THURMOND, James Strom\",0.511
97,Senate,\"BYRD, Robert Carlyle\",-0.288
97,Senate,\"HELMS, Jesse\",0.902
")?;

    write(dir, "S98.vec", &format!(
        "{}moynihan -0.6 0.2 0.0\nthurmond 0.4 0.0 0.3\nkennedy -1.0 0.5 0.1\n",
        AXES
    ))?;
    write(dir, "S98_members.csv", "\
congress,chamber,bioname,dim1
98,Senate,\"MOYNIHAN, Daniel Patrick\",-0.331
98,Senate,\"THURMOND, James Strom\",0.511
98,Senate,\"KENNEDY, Edward Moore\",
")?;

    // 2. Describe the run; S99 has no files and is reported as a failure
    let config = PipelineConfig::from_toml_str(&format!(
        r#"
        [cohorts]
        start = 97
        end = 100

        [embeddings]
        mode = "axis_files"
        path = "{dir}/S{{}}.vec"

        [reference]
        path = "{dir}/S{{}}_members.csv"
        "#,
        dir = dir.display()
    ))?;

    // 3. Evaluate and print
    let report = pipeline::run(&config, &mut LogSink)?;
    println!("{}", report);

    // 4. Project a few policies with a shared dictionary
    let dictionary = polivec::vecfile::parse_as_mapping(
        Path::new("policies.vec"),
        &format!(
            "7 3\n{}obamacare -0.8 0.3 0.0\ntax_cuts 0.9 0.1 0.1\nimmigration 0.2 -0.5 0.3\n",
            AXES
        ),
    )?;
    let anchors = dictionary.anchors(&AxisWords::default())?;
    let plot = project_queries(
        &dictionary,
        &["obamacare", "tax_cuts", "immigration", "carbon_tax"],
        &anchors,
        &AxisProjector::cpu(),
        "Salient Policies and Talking Points",
    )?
    .with_save_path(dir.join("policies.png"));
    LogSink.scatter(&plot)?;
    for ((label, x), y) in plot.labels.iter().zip(&plot.x).zip(&plot.y) {
        println!("{:>12}  {:+.3} ({})  {:+.3} ({})", label, x, plot.x_label, y, plot.y_label);
    }

    Ok(())
}

fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
    std::fs::write(dir.join(name), content)?;
    Ok(())
}

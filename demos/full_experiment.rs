//! Run the standard thirteen-category comparison on the reference scenario
//! and print each category's final-step metrics.
//!
//! ```text
//! cargo run --example full_experiment
//! ```

use popsim::{generate, Experiment, PopulationSpec, SimConfig};

fn main() -> Result<(), popsim::ConfigError> {
    let spec = PopulationSpec::default();
    let (truth, initial) = generate(&spec)?;

    let config = SimConfig::default();
    let experiment = Experiment::new(config, truth, initial)?;
    let results = experiment.run();

    println!(
        "{:<6} {:>14} {:>12} {:>10}",
        "cat", "availability", "accuracy", "overlap"
    );
    for r in &results {
        let last = r.aggregate.len() - 1;
        let accuracy = r
            .aggregate
            .imputation_accuracy
            .as_ref()
            .map_or("-".to_string(), |acc| format!("{:.4}", acc[last]));
        println!(
            "{:<6} {:>14.4} {:>12} {:>10.4}",
            r.name, r.aggregate.availability[last], accuracy, r.aggregate.oracle_overlap[last]
        );
        for g in &r.groups {
            println!(
                "  g{}   {:>14.4} {:>12} {:>10.4}",
                g.group,
                g.series.availability[last],
                g.series
                    .imputation_accuracy
                    .as_ref()
                    .map_or("-".to_string(), |acc| format!("{:.4}", acc[last])),
                g.series.oracle_overlap[last]
            );
        }
    }
    Ok(())
}

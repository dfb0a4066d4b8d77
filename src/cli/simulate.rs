//! Simulate command implementation

use crate::cli::output::{format_samples_json, format_samples_table, SampleRow};
use crate::cli::SimulateArgs;
use crate::source::SampleGenerator;

/// Handle `lifeline simulate` command
pub fn handle_simulate(args: &SimulateArgs) -> Result<String, Box<dyn std::error::Error>> {
    let mut generator = match args.seed {
        Some(seed) => SampleGenerator::seeded(args.kind, seed),
        None => SampleGenerator::new(args.kind),
    };

    let rows: Vec<SampleRow> = (0..args.count)
        .map(|_| SampleRow::from(&generator.next_sample()))
        .collect();

    if args.json {
        Ok(format_samples_json(&rows)?)
    } else {
        Ok(format_samples_table(&rows))
    }
}

//! Output formatting helpers for CLI commands

use crate::prediction::{PredictionOutcome, PredictionReport, Severity};
use crate::vitals::{classify_sample, Metric, MetricStatus, Sample, Status};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

/// View model for a generated sample and its classifications.
#[derive(Debug, Clone, Serialize)]
pub struct SampleRow {
    pub sample: Sample,
    pub statuses: Vec<MetricStatus>,
}

impl From<&Sample> for SampleRow {
    fn from(sample: &Sample) -> Self {
        Self {
            sample: *sample,
            statuses: classify_sample(sample),
        }
    }
}

fn colored_status(status: Status) -> String {
    match status {
        Status::Normal => status.label().green().to_string(),
        Status::Medium => status.label().yellow().to_string(),
        Status::High => status.label().bright_red().to_string(),
        Status::Critical => status.label().red().bold().to_string(),
    }
}

fn colored_severity(severity: Severity) -> String {
    match severity {
        Severity::Low => severity.label().green().to_string(),
        Severity::Medium => severity.label().yellow().to_string(),
        Severity::High => severity.label().bright_red().to_string(),
        Severity::Critical => severity.label().red().bold().to_string(),
        Severity::Unknown => severity.label().cyan().to_string(),
    }
}

/// Value, unit and colored status, or `-` when the metric is absent.
fn metric_cell(row: &SampleRow, metric: Metric) -> Cell {
    match row.statuses.iter().find(|s| s.metric == metric) {
        Some(s) => Cell::new(format!(
            "{} {}\n{}",
            s.value,
            s.metric.unit(),
            colored_status(s.status)
        )),
        None => Cell::new("-"),
    }
}

/// Format samples as a table, one row per sample.
pub fn format_samples_table(rows: &[SampleRow]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Time",
        "Heart Rate",
        "Systolic",
        "Diastolic",
        "SpO₂",
        "Glucose",
        "Temperature",
    ]);

    for row in rows {
        let mut cells = vec![Cell::new(row.sample.timestamp.format("%H:%M:%S"))];
        cells.extend(Metric::ALL.iter().map(|&metric| metric_cell(row, metric)));
        table.add_row(cells);
    }

    table.to_string()
}

/// Format samples as JSON
pub fn format_samples_json(rows: &[SampleRow]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "samples": rows }))
}

/// Format a prediction report as a table followed by its insights.
pub fn format_report_table(report: &PredictionReport) -> String {
    let mut out = String::new();

    match &report.outcome {
        PredictionOutcome::Predictions(predictions) => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Condition", "Probability", "Severity"]);

            for p in predictions {
                table.add_row(vec![
                    Cell::new(&p.condition),
                    Cell::new(format!("{:.1}%", p.probability * 100.0)),
                    Cell::new(colored_severity(p.severity)),
                ]);
            }
            out.push_str(&table.to_string());
            out.push('\n');
        }
        PredictionOutcome::NoRisk => {
            out.push_str(&format!("{}\n", "No risk detected".green()));
        }
        PredictionOutcome::ServiceError(message) => {
            out.push_str(&format!(
                "{} {}\n",
                "Prediction service reported an error:".yellow(),
                message
            ));
        }
    }

    for text in &report.insights {
        out.push_str(&format!("• {}\n", text));
    }

    if let Some(alert) = &report.emergency {
        out.push_str(&format!("\n{}\n", alert.message.red().bold()));
    }

    out
}

/// Format a prediction report as JSON
pub fn format_report_json(report: &PredictionReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

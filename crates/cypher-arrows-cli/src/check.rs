//! Batch validation of a CSV test file with `statement,schema,correct_query` columns.

use crate::CliError;
use cypher_arrows_core::{DirectionFixer, FixOptions};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Row {
    statement: String,
    schema: String,
    /// Empty means the fixer is expected to give up and return `""`.
    correct_query: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Failure {
    /// Line number as a spreadsheet shows it: the header is row 1.
    pub row: usize,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Default)]
pub(crate) struct Report {
    pub total: usize,
    pub failures: Vec<Failure>,
}

impl Report {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn print(&self, verbose: bool) {
        for failure in &self.failures {
            println!("row {}: mismatch", failure.row);
            if verbose {
                println!("  expected: {:?}", failure.expected);
                println!("  actual:   {:?}", failure.actual);
            }
        }
        println!(
            "checked {} rows: {} passed, {} failed",
            self.total,
            self.total - self.failed(),
            self.failed()
        );
    }
}

pub(crate) fn run(csv_text: &str, options: FixOptions) -> Result<Report, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());

    let mut report = Report::default();
    for (index, record) in reader.deserialize::<Row>().enumerate() {
        let row = record?;
        let row_number = index + 2;
        report.total += 1;

        let expected = row.correct_query.unwrap_or_default();
        let actual = match DirectionFixer::from_schema_str_with_options(&row.schema, options) {
            Ok(fixer) => fixer.fix(&row.statement),
            Err(err) => format!("<schema error: {err}>"),
        };
        debug!(row = row_number, ok = actual == expected, "check.row");

        if actual != expected {
            report.failures.push(Failure {
                row: row_number,
                expected,
                actual,
            });
        }
    }
    Ok(report)
}

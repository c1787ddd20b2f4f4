//! CSV export for recorded simulation time series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::SimulationResults;

/// Exports simulation results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per timestep. One column
/// per recorded output, labeled `Component.Field [unit]`. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &SimulationResults, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes simulation results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &SimulationResults, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    let mut header = vec!["timestep".to_string(), "time_hr".to_string()];
    for column in &results.columns {
        header.push(format!("{} [{}]", column.label(), column.unit));
    }
    wtr.write_record(&header)?;

    // Data rows
    for (t, row) in results.rows.iter().enumerate() {
        let mut record = Vec::with_capacity(row.len() + 2);
        record.push(t.to_string());
        record.push(format!("{:.2}", t as f32 * results.dt_hours));
        for value in row {
            record.push(format!("{value:.4}"));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

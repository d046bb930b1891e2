use crate::domain::power::StressTestResult;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADERS: [&str; 10] = [
    "id",
    "timestamp",
    "intensity",
    "duration_secs",
    "elapsed_secs",
    "operations_completed",
    "operations_failed",
    "operations_per_second",
    "error_rate",
    "grade",
];

fn record(result: &StressTestResult) -> [String; 10] {
    [
        result.id.to_string(),
        result.timestamp.to_rfc3339(),
        result.intensity.to_string(),
        result.duration_secs.to_string(),
        format!("{:.3}", result.elapsed_secs),
        result.operations_completed.to_string(),
        result.operations_failed.to_string(),
        format!("{:.2}", result.operations_per_second),
        format!("{:.6}", result.error_rate),
        result.grade.to_string(),
    ]
}

/// Write stress results as CSV with a header row
pub fn write_csv<W: Write>(results: &[StressTestResult], writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(HEADERS)?;
    for result in results {
        wtr.write_record(record(result))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(results: &[StressTestResult], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    write_csv(results, file)
}

/// Fixed-width table for terminal output
pub fn render_table(results: &[StressTestResult]) -> String {
    let mut out = format!(
        "{:<4} {:<8} {:>10} {:>14} {:>10} {:>5}\n",
        "ID", "INTENSITY", "OPS", "OPS/SEC", "ERR RATE", "GRADE"
    );
    for r in results {
        out.push_str(&format!(
            "{:<4} {:<8} {:>10} {:>14.2} {:>10.4} {:>5}\n",
            r.id,
            r.intensity,
            r.operations_completed,
            r.operations_per_second,
            r.error_rate,
            r.grade
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::power::{Grade, Intensity};
    use chrono::Utc;

    fn result() -> StressTestResult {
        StressTestResult {
            id: 3,
            timestamp: Utc::now(),
            intensity: Intensity::Heavy,
            duration_secs: 5,
            elapsed_secs: 5.01,
            operations_completed: 250_000,
            operations_failed: 500,
            operations_per_second: 49_900.2,
            error_rate: 0.002,
            grade: Grade::B,
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let mut buffer = Vec::new();
        write_csv(&[result()], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,timestamp,intensity"));
        assert!(lines[1].starts_with("3,"));
        assert!(lines[1].ends_with(",B"));
        assert!(lines[1].contains(",heavy,"));
    }

    #[test]
    fn test_table_lists_every_result() {
        let table = render_table(&[result(), result()]);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("heavy"));
    }
}

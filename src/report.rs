use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::models::{AggregationBucket, BurndownSeries};

#[derive(Serialize)]
struct SeriesRow {
    date: String,
    ideal: f64,
    actual: f64,
}

/// Writes the series as `date,ideal,actual` rows.
pub fn write_series_csv(series: &BurndownSeries, path: &Path) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))?;

    for ((date, ideal), actual) in series.dates.iter().zip(&series.ideal).zip(&series.actual) {
        writer.serialize(SeriesRow {
            date: date.format("%Y-%m-%d").to_string(),
            ideal: *ideal,
            actual: *actual,
        })?;
    }

    writer.flush()?;
    log::info!("series saved as {}", path.display());
    Ok(())
}

pub fn build_summary(
    project_title: &str,
    total_tasks: usize,
    closed_tasks: &AggregationBucket,
    estimate_field: &str,
    total_estimate: f64,
    closed_estimates: &AggregationBucket,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {project_title}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Tasks");
    let _ = writeln!(
        output,
        "Total tasks: {} ({} closed)",
        total_tasks,
        closed_total(closed_tasks)
    );
    write_bucket(&mut output, closed_tasks);

    let _ = writeln!(output);
    let _ = writeln!(output, "## {estimate_field}");
    let _ = writeln!(
        output,
        "Total {}: {} ({} closed)",
        estimate_field.to_lowercase(),
        total_estimate,
        closed_total(closed_estimates)
    );
    write_bucket(&mut output, closed_estimates);

    output
}

fn closed_total(bucket: &AggregationBucket) -> f64 {
    bucket.values().fold(0.0, |acc, v| acc + v)
}

fn write_bucket(output: &mut String, bucket: &AggregationBucket) {
    if bucket.is_empty() {
        let _ = writeln!(output, "Nothing closed yet.");
        return;
    }
    for (date, value) in bucket {
        let _ = writeln!(output, "- {date}: {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn writes_one_row_per_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("burndown_tasks.csv");
        let series = BurndownSeries {
            dates: vec![date(12), date(13), date(14)],
            ideal: vec![6.0, 4.0, 2.0],
            actual: vec![6.0, 4.5, -1.0],
        };

        write_series_csv(&series, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "date,ideal,actual");
        assert_eq!(lines[1], "2025-01-12,6.0,6.0");
        assert_eq!(lines[3], "2025-01-14,2.0,-1.0");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn summary_lists_buckets_in_date_order() {
        let mut tasks = AggregationBucket::new();
        tasks.insert(date(15), 1.0);
        tasks.insert(date(13), 2.0);

        let summary = build_summary("Palette", 5, &tasks, "Estimate", 0.0, &AggregationBucket::new());

        assert!(summary.contains("Total tasks: 5 (3 closed)"));
        let first = summary.find("2025-01-13").unwrap();
        let second = summary.find("2025-01-15").unwrap();
        assert!(first < second);
        assert!(summary.contains("Nothing closed yet."));
    }

    #[test]
    fn empty_project_summary_shows_plain_zeroes() {
        let empty = AggregationBucket::new();
        let summary = build_summary("Palette", 0, &empty, "Estimate", 0.0, &empty);

        assert!(summary.contains("Total tasks: 0 (0 closed)"));
        assert!(summary.contains("Total estimate: 0 (0 closed)"));
        assert!(!summary.contains("-0"));
    }
}

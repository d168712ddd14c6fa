use chrono::NaiveDate;

use crate::models::{AggregationBucket, BurndownSeries};

/// Every calendar date from `start` to `end`, both inclusive.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Linear decay `total - (total / n) * i`. The last point stays at `total / n`.
pub fn ideal_burndown(total: f64, days: usize) -> Vec<f64> {
    if days == 0 {
        return Vec::new();
    }
    let step = total / days as f64;
    (0..days).map(|i| total - step * i as f64).collect()
}

/// Remaining value after each day's completions. Dates missing from the
/// bucket complete nothing; the remainder may go below zero.
pub fn actual_burndown(closed_per_day: &AggregationBucket, dates: &[NaiveDate], total: f64) -> Vec<f64> {
    let mut remaining = total;
    let mut actual = Vec::with_capacity(dates.len());

    for date in dates {
        let completed_today = closed_per_day.get(date).copied().unwrap_or(0.0);
        remaining -= completed_today;
        log::debug!(
            "date: {}, completed: {}, remaining: {}",
            date,
            completed_today,
            remaining
        );
        actual.push(remaining);
    }

    actual
}

impl BurndownSeries {
    pub fn compute(closed_per_day: &AggregationBucket, start: NaiveDate, end: NaiveDate, total: f64) -> Self {
        let dates = date_range(start, end);
        let ideal = ideal_burndown(total, dates.len());
        let actual = actual_burndown(closed_per_day, &dates, total);
        Self { dates, ideal, actual }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_is_inclusive_and_gap_free() {
        let dates = date_range(date(2025, 1, 30), date(2025, 2, 2));
        assert_eq!(
            dates,
            vec![date(2025, 1, 30), date(2025, 1, 31), date(2025, 2, 1), date(2025, 2, 2)]
        );
        assert_eq!(date_range(date(2025, 1, 12), date(2025, 1, 12)), vec![date(2025, 1, 12)]);
        assert!(date_range(date(2025, 1, 12), date(2025, 1, 11)).is_empty());
    }

    #[test]
    fn ideal_line_stops_one_step_above_zero() {
        let ideal = ideal_burndown(14.0, 14);
        assert_eq!(ideal.len(), 14);
        assert_eq!(ideal[0], 14.0);
        assert_eq!(ideal[13], 1.0);

        let total = 5.0;
        let ideal = ideal_burndown(total, 3);
        for (i, value) in ideal.iter().enumerate() {
            assert_eq!(*value, total - (total / 3.0) * i as f64);
        }
        assert!((ideal[2] - total / 3.0).abs() < 1e-12);
        assert!(ideal[2] > 0.0);
    }

    #[test]
    fn actual_ignores_completions_outside_range() {
        let mut bucket = AggregationBucket::new();
        bucket.insert(date(2025, 1, 13), 2.0);
        bucket.insert(date(2025, 1, 15), 1.0);

        let series = BurndownSeries::compute(&bucket, date(2025, 1, 12), date(2025, 1, 14), 5.0);
        assert_eq!(series.actual, vec![5.0, 3.0, 3.0]);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn empty_bucket_gives_flat_actual_line() {
        let series = BurndownSeries::compute(&AggregationBucket::new(), date(2025, 1, 12), date(2025, 1, 25), 7.0);
        assert_eq!(series.len(), 14);
        assert!(series.actual.iter().all(|v| *v == 7.0));
    }

    #[test]
    fn empty_project_is_flat_zero() {
        let series = BurndownSeries::compute(&AggregationBucket::new(), date(2025, 1, 12), date(2025, 1, 14), 0.0);
        assert_eq!(series.ideal, vec![0.0, 0.0, 0.0]);
        assert_eq!(series.actual, vec![0.0, 0.0, 0.0]);
        assert!(series.actual.iter().all(|v| v.is_sign_positive()));
    }

    #[test]
    fn remainder_goes_negative_without_clamping() {
        let mut bucket = AggregationBucket::new();
        bucket.insert(date(2025, 1, 12), 3.0);
        bucket.insert(date(2025, 1, 13), 4.0);

        let actual = actual_burndown(&bucket, &date_range(date(2025, 1, 12), date(2025, 1, 14)), 5.0);
        assert_eq!(actual, vec![2.0, -2.0, -2.0]);
        assert!(actual.windows(2).all(|w| w[1] <= w[0]));
    }
}

//! Monthly VWAP aggregation.
//!
//! Folds daily samples into calendar-month buckets and derives a volume
//! weighted average price per month.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, TimeZone};
use tracing::{debug, warn};

use crate::models::Sample;

/// Calendar month a sample falls into, in the aggregator's time zone.
///
/// Ordering is chronological, which matches the lexicographic order of the
/// `YYYY-MM` rendering for four-digit years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Running sums for one month.
///
/// VWAP = Σ(price × volume) / Σ(volume), computed once on read-out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyBucket {
    sum_price_volume: f64, // Σ(price × volume)
    total_volume: i64,     // Σ(volume)
}

impl MonthlyBucket {
    pub fn add(&mut self, price: f64, volume: i64) {
        self.sum_price_volume += price * volume as f64;
        self.total_volume += volume;
    }

    /// Weighted average, or 0.0 for a month with no traded volume.
    pub fn vwap(&self) -> f64 {
        if self.total_volume > 0 {
            self.sum_price_volume / self.total_volume as f64
        } else {
            0.0
        }
    }

    pub fn total_volume(&self) -> i64 {
        self.total_volume
    }
}

/// Final per-month figures handed to the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyVwap {
    pub vwap: f64,
    pub total_volume: i64,
}

impl From<MonthlyBucket> for MonthlyVwap {
    fn from(bucket: MonthlyBucket) -> Self {
        Self {
            vwap: bucket.vwap(),
            total_volume: bucket.total_volume(),
        }
    }
}

/// Month-keyed results in ascending month order.
pub type MonthlyVwapTable = BTreeMap<MonthKey, MonthlyVwap>;

/// Groups samples by calendar month in `tz` and computes each month's VWAP.
///
/// Holds no state between calls; the zone is the only input besides the
/// samples themselves.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use monthly_vwap::indicators::monthly_vwap::{MonthKey, MonthlyVwapAggregator};
/// use monthly_vwap::models::Sample;
///
/// let agg = MonthlyVwapAggregator::new(Utc);
/// let table = agg.aggregate(vec![
///     Sample::new(1705320000, Some(10.0), Some(100)), // 2024-01-15
///     Sample::new(1705752000, Some(20.0), Some(100)), // 2024-01-20
/// ]);
/// assert_eq!(table[&MonthKey::new(2024, 1)].vwap, 15.0);
/// ```
pub struct MonthlyVwapAggregator<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> MonthlyVwapAggregator<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Month containing `timestamp` (epoch seconds), or `None` if the
    /// timestamp is outside chrono's representable range.
    pub fn month_key(&self, timestamp: i64) -> Option<MonthKey> {
        self.tz
            .timestamp_opt(timestamp, 0)
            .single()
            .map(|dt| MonthKey::new(dt.year(), dt.month()))
    }

    pub fn aggregate<I>(&self, samples: I) -> MonthlyVwapTable
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut buckets: HashMap<MonthKey, MonthlyBucket> = HashMap::new();
        let mut skipped = 0usize;

        for sample in samples {
            // Days with a null close or volume contribute nothing.
            let (Some(price), Some(volume)) = (sample.price, sample.volume) else {
                skipped += 1;
                continue;
            };

            let Some(key) = self.month_key(sample.timestamp) else {
                warn!("Skipping sample with unrepresentable timestamp {}", sample.timestamp);
                skipped += 1;
                continue;
            };

            buckets.entry(key).or_default().add(price, volume);
        }

        if skipped > 0 {
            debug!("Skipped {} incomplete samples", skipped);
        }

        buckets
            .into_iter()
            .map(|(key, bucket)| (key, MonthlyVwap::from(bucket)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, Utc};

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    fn utc() -> MonthlyVwapAggregator<Utc> {
        MonthlyVwapAggregator::new(Utc)
    }

    fn mixed_samples() -> Vec<Sample> {
        vec![
            Sample::new(ts(2024, 1, 2), Some(12.0), Some(300)),
            Sample::new(ts(2024, 1, 3), Some(11.0), Some(100)),
            Sample::new(ts(2024, 2, 5), Some(8.0), Some(40)),
            Sample::new(ts(2024, 2, 6), Some(9.0), Some(60)),
            Sample::new(ts(2024, 3, 1), Some(7.0), Some(10)),
            Sample::new(ts(2023, 12, 29), Some(13.0), Some(20)),
        ]
    }

    #[test]
    fn month_key_renders_zero_padded() {
        assert_eq!(MonthKey::new(2024, 3).to_string(), "2024-03");
        assert_eq!(MonthKey::new(999, 11).to_string(), "0999-11");
    }

    #[test]
    fn month_keys_sort_chronologically() {
        let mut keys = vec![MonthKey::new(2024, 2), MonthKey::new(2023, 12), MonthKey::new(2024, 10)];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["2023-12", "2024-02", "2024-10"]);
    }

    #[test]
    fn two_month_scenario() {
        let table = utc().aggregate(vec![
            Sample::new(ts(2024, 1, 15), Some(10.0), Some(100)),
            Sample::new(ts(2024, 1, 20), Some(20.0), Some(100)),
            Sample::new(ts(2024, 2, 1), Some(5.0), Some(50)),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(
            table[&MonthKey::new(2024, 1)],
            MonthlyVwap { vwap: 15.0, total_volume: 200 }
        );
        assert_eq!(
            table[&MonthKey::new(2024, 2)],
            MonthlyVwap { vwap: 5.0, total_volume: 50 }
        );
    }

    #[test]
    fn null_price_sample_is_excluded() {
        let table = utc().aggregate(vec![
            Sample::new(ts(2024, 1, 15), Some(10.0), Some(100)),
            Sample::new(ts(2024, 1, 16), None, Some(200)),
        ]);
        assert_eq!(table[&MonthKey::new(2024, 1)].total_volume, 100);
        assert_eq!(table[&MonthKey::new(2024, 1)].vwap, 10.0);
    }

    #[test]
    fn injected_nulls_do_not_change_result() {
        let clean = mixed_samples();
        let mut noisy = clean.clone();
        noisy.insert(1, Sample::new(ts(2024, 1, 10), None, Some(5_000)));
        noisy.insert(3, Sample::new(ts(2024, 2, 10), Some(1_000.0), None));
        noisy.push(Sample::new(ts(2024, 4, 1), None, None));

        assert_eq!(utc().aggregate(clean), utc().aggregate(noisy));
    }

    #[test]
    fn all_null_input_yields_empty_table() {
        let table = utc().aggregate(vec![
            Sample::new(ts(2024, 1, 15), None, Some(100)),
            Sample::new(ts(2024, 1, 16), Some(3.0), None),
        ]);
        assert!(table.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert!(utc().aggregate(Vec::new()).is_empty());
    }

    #[test]
    fn zero_volume_month_reports_zero_vwap() {
        let table = utc().aggregate(vec![
            Sample::new(ts(2024, 5, 1), Some(42.0), Some(0)),
            Sample::new(ts(2024, 5, 2), Some(43.0), Some(0)),
        ]);
        let may = table[&MonthKey::new(2024, 5)];
        assert_eq!(may.total_volume, 0);
        assert_eq!(may.vwap, 0.0);
    }

    #[test]
    fn vwap_lies_within_bucket_price_range() {
        let samples = mixed_samples();
        let agg = utc();
        let table = agg.aggregate(samples.clone());

        for (key, result) in &table {
            let prices: Vec<f64> = samples
                .iter()
                .filter(|s| agg.month_key(s.timestamp) == Some(*key))
                .filter_map(|s| s.price)
                .collect();
            let lo = prices.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(
                result.vwap >= lo && result.vwap <= hi,
                "{key}: vwap {} outside [{lo}, {hi}]",
                result.vwap
            );
        }
    }

    #[test]
    fn aggregation_is_repeatable() {
        let agg = utc();
        assert_eq!(agg.aggregate(mixed_samples()), agg.aggregate(mixed_samples()));
    }

    #[test]
    fn input_order_does_not_matter() {
        let forward = mixed_samples();
        let mut reversed = forward.clone();
        reversed.reverse();
        let mut rotated = forward.clone();
        rotated.rotate_left(2);

        let expected = utc().aggregate(forward);
        assert_eq!(utc().aggregate(reversed), expected);
        assert_eq!(utc().aggregate(rotated), expected);
    }

    #[test]
    fn output_is_ordered_by_month() {
        let keys: Vec<String> = utc()
            .aggregate(mixed_samples())
            .keys()
            .map(ToString::to_string)
            .collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn negative_volume_is_accepted() {
        let table = utc().aggregate(vec![
            Sample::new(ts(2024, 6, 3), Some(10.0), Some(300)),
            Sample::new(ts(2024, 6, 4), Some(10.0), Some(-100)),
        ]);
        let june = table[&MonthKey::new(2024, 6)];
        assert_eq!(june.total_volume, 200);
        assert_eq!(june.vwap, 10.0);
    }

    #[test]
    fn bucketing_follows_injected_zone() {
        // 2024-01-31 20:00 UTC is already 2024-02-01 in Tokyo (UTC+9).
        let instant = ts(2024, 1, 31) + 8 * 3600;
        let samples = vec![Sample::new(instant, Some(10.0), Some(1))];

        let utc_table = utc().aggregate(samples.clone());
        assert!(utc_table.contains_key(&MonthKey::new(2024, 1)));

        let tokyo = MonthlyVwapAggregator::new(chrono_tz::Asia::Tokyo).aggregate(samples.clone());
        assert!(tokyo.contains_key(&MonthKey::new(2024, 2)));

        let fixed = MonthlyVwapAggregator::new(FixedOffset::east_opt(9 * 3600).unwrap()).aggregate(samples);
        assert_eq!(fixed, tokyo);
    }

    #[test]
    fn unrepresentable_timestamp_is_skipped() {
        let table = utc().aggregate(vec![
            Sample::new(i64::MAX, Some(10.0), Some(100)),
            Sample::new(ts(2024, 1, 15), Some(10.0), Some(100)),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table[&MonthKey::new(2024, 1)].total_volume, 100);
    }
}

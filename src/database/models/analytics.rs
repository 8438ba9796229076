use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Star ratings accepted by the aggregator
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Round to one decimal place, half away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Submission counts per star rating. Always carries exactly the keys 1..=5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingDistribution([u64; 5]);

impl RatingDistribution {
    pub fn from_counts(counts: [u64; 5]) -> Self {
        Self(counts)
    }

    pub fn count(&self, rating: u8) -> u64 {
        if RATING_RANGE.contains(&rating) {
            self.0[usize::from(rating - 1)]
        } else {
            0
        }
    }

    /// Returns false (and changes nothing) for ratings outside 1..=5
    pub fn record(&mut self, rating: u8) -> bool {
        if !RATING_RANGE.contains(&rating) {
            return false;
        }
        self.0[usize::from(rating - 1)] += 1;
        true
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn weighted_sum(&self) -> u64 {
        self.iter().map(|(rating, count)| u64::from(rating) * count).sum()
    }

    /// Weighted mean rounded to one decimal, 0 when nothing was rated
    pub fn average(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => round1(self.weighted_sum() as f64 / total as f64),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        RATING_RANGE.map(move |rating| (rating, self.count(rating)))
    }
}

impl Serialize for RatingDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for (rating, count) in self.iter() {
            map.serialize_entry(&rating.to_string(), &count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RatingDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = RatingDistribution;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from rating 1..5 to a non-negative count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut counts = [0u64; 5];
                while let Some((key, count)) = access.next_entry::<String, u64>()? {
                    match key.parse::<u8>() {
                        Ok(rating) if RATING_RANGE.contains(&rating) => {
                            counts[usize::from(rating - 1)] = count;
                        }
                        // Foreign keys are dropped so the 1..=5 shape always holds
                        _ => {}
                    }
                }
                Ok(RatingDistribution(counts))
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewStats {
    pub total_submissions: u64,
    pub submissions_by_date: BTreeMap<NaiveDate, u64>,
    pub average_rating: f64,
    pub rating_distribution: RatingDistribution,
}

/// Per-tenant analytics block, embedded in the tenant record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analytics {
    pub total_visits: u64,
    pub visits_by_date: BTreeMap<NaiveDate, u64>,
    pub last_visit: Option<DateTime<Utc>>,
    pub reviews: ReviewStats,
}

impl Analytics {
    pub fn record_visit(&mut self, now: DateTime<Utc>) {
        self.total_visits += 1;
        *self.visits_by_date.entry(now.date_naive()).or_insert(0) += 1;
        self.last_visit = Some(now);
    }

    /// Count a review submission. Ratings outside 1..=5 still count as a
    /// submission but leave the distribution untouched.
    pub fn record_review(&mut self, rating: u8, now: DateTime<Utc>) {
        let reviews = &mut self.reviews;
        reviews.total_submissions += 1;
        *reviews.submissions_by_date.entry(now.date_naive()).or_insert(0) += 1;
        reviews.rating_distribution.record(rating);
        reviews.average_rating = reviews.rating_distribution.average();
    }
}

/// Dates at or after `today - days` are in range. Windows reaching past
/// the representable calendar include every date.
pub fn cutoff_date(now: DateTime<Utc>, days: u32) -> NaiveDate {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .map(|start| start.date_naive())
        .unwrap_or(NaiveDate::MIN)
}

/// Restrict a date-keyed bucket map to the window, returning the kept
/// buckets and their sum
pub fn buckets_since(buckets: &BTreeMap<NaiveDate, u64>, cutoff: NaiveDate) -> (BTreeMap<NaiveDate, u64>, u64) {
    let kept: BTreeMap<NaiveDate, u64> = buckets.range(cutoff..).map(|(d, c)| (*d, *c)).collect();
    let sum = kept.values().sum();
    (kept, sum)
}

//! Aggregate buckets and the clamped percentage scale.
//!
//! Accumulation happens on [`Tally`], which only holds raw sums. A tally is
//! turned into an [`AggregateBucket`] once, after the pass, so percentages
//! always derive from final totals.
//!
//! # Examples
//!
//! ```rust
//! use siteprogress::rollup::bucket::{Percentage, Tally};
//!
//! let mut tally = Tally::default();
//! tally += Tally::new(40.0, 70.0, 100.0);
//! let bucket = tally.finish();
//! assert_eq!(bucket.percentage.value(), 40.0);
//!
//! // Over-reporting is clamped
//! assert_eq!(Percentage::of(150.0, 100.0).value(), 100.0);
//! ```

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Progress on a 0-100 scale.
///
/// Values are automatically clamped to the [0.0, 100.0] range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Percentage {
    /// Create a percentage, clamping to [0.0, 100.0]. NaN becomes zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// `part` as a percentage of `whole`; zero when `whole` is not positive.
    pub fn of(part: f64, whole: f64) -> Self {
        if whole > 0.0 {
            Self::new(part / whole * 100.0)
        } else {
            Self(0.0)
        }
    }

    /// Get the raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Running sums for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tally {
    pub qc: f64,
    pub unverified: f64,
    pub scope: f64,
}

impl Tally {
    pub fn new(qc: f64, unverified: f64, scope: f64) -> Self {
        Self {
            qc,
            unverified,
            scope,
        }
    }

    /// Finalize with percentages against this tally's own scope.
    pub fn finish(self) -> AggregateBucket {
        self.finish_against(self.scope)
    }

    /// Finalize with percentages against an external scope total.
    ///
    /// Used where scope is not owned by the bucket's subject, e.g. an
    /// assignee's share of site-wide contractual scope.
    pub fn finish_against(self, scope_total: f64) -> AggregateBucket {
        AggregateBucket {
            qc: self.qc,
            unverified: self.unverified,
            scope: self.scope,
            percentage: Percentage::of(self.qc, scope_total),
            unverified_percentage: Percentage::of(self.unverified, scope_total),
        }
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.qc += rhs.qc;
        self.unverified += rhs.unverified;
        self.scope += rhs.scope;
    }
}

/// Finalized bucket as handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBucket {
    pub qc: f64,
    pub unverified: f64,
    pub scope: f64,
    pub percentage: Percentage,
    pub unverified_percentage: Percentage,
}

impl AggregateBucket {
    pub fn is_zero(&self) -> bool {
        self.qc == 0.0 && self.unverified == 0.0 && self.scope == 0.0
    }
}

/// Per-main-category running sums.
#[derive(Debug, Clone, Default)]
pub struct CategoryTallies(BTreeMap<String, Tally>);

impl CategoryTallies {
    /// Add to `main_key`'s tally; no-op for activities without a category.
    pub fn add(&mut self, main_key: Option<&str>, contribution: Tally) {
        if let Some(key) = main_key {
            *self.0.entry(key.to_string()).or_default() += contribution;
        }
    }

    pub fn get(&self, main_key: &str) -> Option<&Tally> {
        self.0.get(main_key)
    }

    pub fn finish(self) -> BTreeMap<String, AggregateBucket> {
        self.0
            .into_iter()
            .map(|(key, tally)| (key, tally.finish()))
            .collect()
    }

    /// Finalize each category against the matching category scope in
    /// `totals`; categories absent there get zero percentages.
    pub fn finish_against(self, totals: &CategoryTallies) -> BTreeMap<String, AggregateBucket> {
        self.0
            .into_iter()
            .map(|(key, tally)| {
                let scope_total = totals.get(&key).map_or(0.0, |t| t.scope);
                (key, tally.finish_against(scope_total))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_clamps_upper_bound() {
        assert_eq!(Percentage::new(150.0).value(), 100.0);
    }

    #[test]
    fn percentage_clamps_lower_bound() {
        assert_eq!(Percentage::new(-10.0).value(), 0.0);
    }

    #[test]
    fn percentage_of_zero_scope_is_zero() {
        assert_eq!(Percentage::of(10.0, 0.0).value(), 0.0);
        assert_eq!(Percentage::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn finish_derives_both_percentages() {
        let bucket = Tally::new(40.0, 70.0, 100.0).finish();
        assert_eq!(bucket.percentage.value(), 40.0);
        assert_eq!(bucket.unverified_percentage.value(), 70.0);
    }

    #[test]
    fn finish_against_uses_external_scope() {
        let bucket = Tally::new(10.0, 20.0, 25.0).finish_against(200.0);
        assert_eq!(bucket.scope, 25.0);
        assert_eq!(bucket.percentage.value(), 5.0);
        assert_eq!(bucket.unverified_percentage.value(), 10.0);
    }

    #[test]
    fn uncategorized_contribution_is_dropped() {
        let mut categories = CategoryTallies::default();
        categories.add(None, Tally::new(1.0, 1.0, 1.0));
        categories.add(Some("cabling"), Tally::new(1.0, 2.0, 4.0));
        categories.add(Some("cabling"), Tally::new(1.0, 0.0, 4.0));

        let finished = categories.finish();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished["cabling"].percentage.value(), 25.0);
    }

    #[test]
    fn bucket_serializes_camel_case() {
        let json = serde_json::to_value(Tally::new(1.0, 2.0, 4.0).finish()).unwrap();
        assert_eq!(json["unverifiedPercentage"], 50.0);
        assert_eq!(json["percentage"], 25.0);
    }
}

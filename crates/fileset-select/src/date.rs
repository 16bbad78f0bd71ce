//! Modification-time selector.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::trace;

use fileset_core::TimeComparison;

use crate::fingerprint::modified_millis;
use crate::selector::FileSelector;

/// Compares a file's modification time with a reference instant.
///
/// `Equal` accepts times within `granularity` of the reference. `Before` and
/// `After` accept times strictly outside that window on the matching side.
#[derive(Debug, Clone)]
pub struct DateSelector {
    reference_millis: i64,
    when: TimeComparison,
    granularity_millis: i64,
}

impl DateSelector {
    pub fn new(reference: DateTime<Utc>, when: TimeComparison, granularity: Duration) -> Self {
        Self {
            reference_millis: reference.timestamp_millis(),
            when,
            granularity_millis: i64::try_from(granularity.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Apply the comparison to a modification time in milliseconds.
    pub fn accepts(&self, modified_millis: i64) -> bool {
        let reference = self.reference_millis;
        let g = self.granularity_millis;
        match self.when {
            TimeComparison::Equal => modified_millis.abs_diff(reference) <= g.unsigned_abs(),
            TimeComparison::Before => modified_millis < reference.saturating_sub(g),
            TimeComparison::After => modified_millis > reference.saturating_add(g),
        }
    }
}

impl FileSelector for DateSelector {
    fn is_selected(&self, _base_dir: &Path, relative: &str, file: &Path) -> bool {
        match std::fs::metadata(file).and_then(|m| modified_millis(&m)) {
            Ok(millis) => self.accepts(millis),
            Err(e) => {
                trace!(file = relative, error = %e, "no modification time");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(when: TimeComparison, granularity_secs: u64) -> DateSelector {
        let reference = DateTime::from_timestamp(1_000_000, 0).unwrap();
        DateSelector::new(reference, when, Duration::from_secs(granularity_secs))
    }

    #[test]
    fn test_equal_within_granularity() {
        let s = selector(TimeComparison::Equal, 2);
        let t = 1_000_000_000;
        assert!(s.accepts(t));
        assert!(s.accepts(t + 2_000));
        assert!(s.accepts(t - 2_000));
        assert!(!s.accepts(t + 2_001));
    }

    #[test]
    fn test_before_and_after_are_strict() {
        let t = 1_000_000_000;
        let before = selector(TimeComparison::Before, 1);
        assert!(before.accepts(t - 1_001));
        assert!(!before.accepts(t - 1_000));
        assert!(!before.accepts(t));

        let after = selector(TimeComparison::After, 1);
        assert!(after.accepts(t + 1_001));
        assert!(!after.accepts(t + 1_000));
        assert!(!after.accepts(t - 5_000));
    }

    #[test]
    fn test_zero_granularity() {
        let t = 1_000_000_000;
        let s = selector(TimeComparison::Equal, 0);
        assert!(s.accepts(t));
        assert!(!s.accepts(t + 1));
    }
}

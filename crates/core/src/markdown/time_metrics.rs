use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Day-granularity ages for a product relative to a single sampled instant.
/// Both values may be negative: an expired product, or a shelf-entry stamp
/// later than `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeMetrics {
    pub days_to_expiry: i64,
    pub shelf_time_days: i64,
}

impl TimeMetrics {
    pub fn compute(
        expiry_date: DateTime<Utc>,
        date_added: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            days_to_expiry: ceil_days(expiry_date.signed_duration_since(now)),
            shelf_time_days: ceil_days(now.signed_duration_since(date_added)),
        }
    }
}

/// Rounds a span up to whole fixed 24-hour days.
pub fn ceil_days(span: Duration) -> i64 {
    let whole = span.num_days();
    let remainder = span - Duration::days(whole);
    if remainder > Duration::zero() {
        whole + 1
    } else {
        whole
    }
}

//! Caller-supplied expiry for liquidity and swap requests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// When a request stops being executable.
///
/// Either an absolute instant or a duration relative to the moment the
/// operation executes. A deadline is expired when its resolved instant
/// is not strictly after the execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deadline {
    /// Absolute expiry instant.
    At(DateTime<Utc>),
    /// Seconds after the execution time.
    Within(u64),
}

impl Deadline {
    /// Resolves the deadline to an absolute instant relative to `now`.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Self::At(at) => at,
            Self::Within(secs) => {
                let secs = i64::try_from(secs).unwrap_or(i64::MAX);
                Duration::try_seconds(secs)
                    .and_then(|d| now.checked_add_signed(d))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            }
        }
    }

    /// Returns `true` if the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.resolve(now) <= now
    }
}

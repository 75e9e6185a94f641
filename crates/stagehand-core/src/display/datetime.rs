//! Timestamp and duration display helpers.

use std::fmt;
use std::time::Duration;

use jiff::{tz::TimeZone, Timestamp};

/// Formats a `Timestamp` in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// Formats the span between two timestamps, e.g. `850ms` or `12.4s`.
pub struct Elapsed<'a> {
    pub from: &'a Timestamp,
    pub to: &'a Timestamp,
}

impl fmt::Display for Elapsed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.to.duration_since(*self.from);
        let elapsed = Duration::try_from(span).unwrap_or_default();
        if elapsed < Duration::from_secs(1) {
            write!(f, "{}ms", elapsed.as_millis())
        } else {
            write!(f, "{:.1}s", elapsed.as_secs_f64())
        }
    }
}

use crate::time_key::{localize, KeyError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Anything that can be resolved to an absolute instant.
///
/// Zoned values keep their own offset. Naive values carry no zone and are
/// interpreted as wall-clock time in the series' configured default zone; which
/// zone that is depends on configuration and is not inferred from the host.
pub trait AnyInstant {
    fn resolve(self, default_zone: &Tz) -> Result<DateTime<Utc>, KeyError>;
}

impl<Z: TimeZone> AnyInstant for DateTime<Z> {
    fn resolve(self, _default_zone: &Tz) -> Result<DateTime<Utc>, KeyError> {
        Ok(self.with_timezone(&Utc))
    }
}

impl AnyInstant for NaiveDateTime {
    fn resolve(self, default_zone: &Tz) -> Result<DateTime<Utc>, KeyError> {
        localize(&self, default_zone)
    }
}

/// Midnight at the start of the day.
impl AnyInstant for NaiveDate {
    fn resolve(self, default_zone: &Tz) -> Result<DateTime<Utc>, KeyError> {
        self.and_time(NaiveTime::MIN).resolve(default_zone)
    }
}

impl AnyInstant for &str {
    fn resolve(self, default_zone: &Tz) -> Result<DateTime<Utc>, KeyError> {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(self) {
            return dt.resolve(default_zone);
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(self, format) {
                return naive.resolve(default_zone);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(self, "%Y-%m-%d") {
            return date.resolve(default_zone);
        }
        Err(KeyError::Parse {
            input: self.to_string(),
        })
    }
}

impl AnyInstant for String {
    fn resolve(self, default_zone: &Tz) -> Result<DateTime<Utc>, KeyError> {
        self.as_str().resolve(default_zone)
    }
}

/// Promotes a possibly naive instant to an absolute one using `default_zone`.
pub fn ensure_zoned(instant: impl AnyInstant, default_zone: &Tz) -> Result<DateTime<Utc>, KeyError> {
    instant.resolve(default_zone)
}

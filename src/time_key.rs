//! Conversion between absolute instants and integer time-keys.
//!
//! A time-key is the number of whole seconds elapsed since the reference epoch
//! `1992-01-01T00:00:00Z`. Keys are plain `i64` values so that a series can be
//! ordered, searched and integrated without carrying time-zone information.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Whole seconds since [`epoch`].
pub type TimeKey = i64;

/// Unix timestamp of `1992-01-01T00:00:00Z`.
const EPOCH_UNIX_SECONDS: i64 = 694_224_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Malformed date-hour string '{input}', expected YYYYMMDDHH")]
    Parse { input: String },

    #[error("Local time {0} does not exist in the requested time zone")]
    NonexistentLocalTime(NaiveDateTime),

    #[error("Time-key {0} cannot be represented as a date")]
    OutOfRange(TimeKey),
}

/// The reference instant of key `0`.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(EPOCH_UNIX_SECONDS, 0).unwrap_or_default()
}

/// Maps an absolute instant to whole seconds since the epoch.
///
/// Sub-second parts are dropped, so instants within the same second share a key.
pub fn to_key<Z: TimeZone>(instant: &DateTime<Z>) -> TimeKey {
    instant.timestamp() - EPOCH_UNIX_SECONDS
}

/// Inverse of [`to_key`].
pub fn from_key(key: TimeKey) -> Result<DateTime<Utc>, KeyError> {
    key.checked_add(EPOCH_UNIX_SECONDS)
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
        .ok_or(KeyError::OutOfRange(key))
}

/// Interprets a wall-clock time in `zone`.
///
/// During the autumn DST fold the earlier of the two instants is used. Wall times
/// inside the spring gap do not exist and are rejected.
pub fn localize<Z: TimeZone>(naive: &NaiveDateTime, zone: &Z) -> Result<DateTime<Utc>, KeyError> {
    zone.from_local_datetime(naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or(KeyError::NonexistentLocalTime(*naive))
}

/// Parses a `YYYYMMDDHH` string, localizes it to `zone` and converts it to a key.
pub fn parse_and_key<Z: TimeZone>(raw: &str, zone: &Z) -> Result<TimeKey, KeyError> {
    let naive = parse_date_hour(raw)?;
    localize(&naive, zone).map(|instant| to_key(&instant))
}

/// Parses the fixed-width `YYYYMMDDHH` layout into a wall-clock time.
pub fn parse_date_hour(raw: &str) -> Result<NaiveDateTime, KeyError> {
    let parse_error = || KeyError::Parse {
        input: raw.to_string(),
    };
    if raw.len() != 10 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_error());
    }
    let date = NaiveDate::parse_from_str(&raw[..8], "%Y%m%d").map_err(|_| parse_error())?;
    let hour: u32 = raw[8..].parse().map_err(|_| parse_error())?;
    let time = NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(parse_error)?;
    Ok(date.and_time(time))
}

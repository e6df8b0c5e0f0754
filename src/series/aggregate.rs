//! Calendar-based mean temperatures on top of [`TemperatureSeries::mean_over`].

use crate::series::error::SeriesError;
use crate::series::temperature_series::TemperatureSeries;
use crate::time_key::{localize, KeyError};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

fn local_midnight<Z: TimeZone>(date: NaiveDate, zone: &Z) -> Result<DateTime<Utc>, KeyError> {
    localize(&date.and_time(NaiveTime::MIN), zone)
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, SeriesError> {
    date.succ_opt().ok_or(SeriesError::DateOutOfRange(date))
}

impl TemperatureSeries {
    /// Mean temperature from midnight to midnight of `date` in `zone`.
    ///
    /// Days with a DST switch are 23 or 25 hours long; the mean covers the real
    /// elapsed time.
    pub fn mean_over_day<Z: TimeZone>(
        &mut self,
        date: NaiveDate,
        zone: &Z,
    ) -> Result<f64, SeriesError> {
        let start = local_midnight(date, zone)?;
        let end = local_midnight(next_day(date)?, zone)?;
        self.mean_over(start, end)
    }

    /// [`Self::mean_over_day`] in the series' default zone.
    pub fn mean_over_local_day(&mut self, date: NaiveDate) -> Result<f64, SeriesError> {
        let zone = self.default_zone();
        self.mean_over_day(date, &zone)
    }

    /// Mean temperature over one calendar month in `zone`.
    pub fn mean_over_month<Z: TimeZone>(
        &mut self,
        year: i32,
        month: u32,
        zone: &Z,
    ) -> Result<f64, SeriesError> {
        let invalid = || SeriesError::InvalidMonth { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let following = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let start = local_midnight(first, zone)?;
        let end = local_midnight(following, zone)?;
        self.mean_over(start, end)
    }

    /// One day mean per calendar day from `first` to `last`, both inclusive.
    ///
    /// Returns an empty list when `last` is before `first`.
    pub fn daily_means<Z: TimeZone>(
        &mut self,
        first: NaiveDate,
        last: NaiveDate,
        zone: &Z,
    ) -> Result<Vec<(NaiveDate, f64)>, SeriesError> {
        first
            .iter_days()
            .take_while(|day| *day <= last)
            .map(|day| Ok((day, self.mean_over_day(day, zone)?)))
            .collect()
    }

    /// The twelve monthly means of `year`, keyed by month number.
    pub fn monthly_means<Z: TimeZone>(
        &mut self,
        year: i32,
        zone: &Z,
    ) -> Result<Vec<(u32, f64)>, SeriesError> {
        (1..=12)
            .map(|month| Ok((month, self.mean_over_month(year, month, zone)?)))
            .collect()
    }
}

//! The time-indexed temperature series.
//!
//! Observed samples are stored by time-key. Queries for keys that hold no sample
//! are answered by linear interpolation between the two bracketing keys (or linear
//! extrapolation from the two outermost keys), and the computed sample is cached
//! back into the series so repeated queries are plain lookups.

use crate::series::error::SeriesError;
use crate::series::sorted_map::SortedKeyMap;
use crate::time_key::{to_key, TimeKey};
use crate::types::any_instant::AnyInstant;
use crate::types::sample::Sample;
use chrono_tz::Tz;
use log::{debug, trace};

/// Piecewise-linear temperature curve over time-keys.
///
/// Built once from an ingestion pass and owned by whoever queries it. Queries take
/// `&mut self` because a miss caches an interpolated sample; existing observed
/// samples are never removed or overwritten. Every cached sample lies on the
/// curve through the observations, so adding an observation drops the cache.
///
/// Extrapolation beyond the first or last sample continues the slope of the
/// outermost pair. That is exact for the model but becomes less meaningful the
/// further a query lies outside the observed period.
///
/// # Examples
///
/// ```
/// use dwd_temperature::{Sample, TemperatureSeries};
///
/// let mut series = TemperatureSeries::from_samples(
///     [
///         Sample::observed(0, 10.0, Default::default()),
///         Sample::observed(3600, 14.0, Default::default()),
///     ],
///     chrono_tz::UTC,
/// );
/// assert_eq!(series.get_temperature(1800).unwrap(), 12.0);
/// assert_eq!(series.mean_over_keys(0, 3600).unwrap(), 12.0);
/// ```
#[derive(Debug, Clone)]
pub struct TemperatureSeries {
    samples: SortedKeyMap<Sample>,
    default_zone: Tz,
    has_cached: bool,
}

impl TemperatureSeries {
    /// Creates an empty series. `default_zone` is used for naive instants.
    pub fn new(default_zone: Tz) -> Self {
        Self {
            samples: SortedKeyMap::new(),
            default_zone,
            has_cached: false,
        }
    }

    /// Builds a series from ingested samples, keyed by their `time_key`.
    ///
    /// Later samples for an already observed key are dropped.
    pub fn from_samples(samples: impl IntoIterator<Item = Sample>, default_zone: Tz) -> Self {
        let iter = samples.into_iter();
        let mut series = Self {
            samples: SortedKeyMap::with_capacity(iter.size_hint().0),
            default_zone,
            has_cached: false,
        };
        for sample in iter {
            series.insert(sample.time_key, sample);
        }
        series
    }

    pub fn default_zone(&self) -> Tz {
        self.default_zone
    }

    /// Number of stored samples, cached interpolations included.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn observed_len(&self) -> usize {
        self.samples.iter().filter(|(_, s)| s.is_observed()).count()
    }

    pub fn first_key(&self) -> Option<TimeKey> {
        self.samples.first_key()
    }

    pub fn last_key(&self) -> Option<TimeKey> {
        self.samples.last_key()
    }

    /// Stores a sample at `time_key`.
    ///
    /// Returns `false` and keeps the existing sample when `time_key` already holds
    /// an observation. Storing an observation evicts every cached interpolation,
    /// since those were computed from the previous set of observations.
    pub fn insert(&mut self, time_key: TimeKey, sample: Sample) -> bool {
        if let Some(existing) = self.samples.get(time_key) {
            if existing.is_observed() {
                debug!("Dropping duplicate observation at key {}", time_key);
                return false;
            }
        }
        if sample.is_observed() && self.has_cached {
            let evicted = self.samples.retain(|_, s| s.is_observed());
            debug!(
                "Observation at key {} evicted {} cached interpolations",
                time_key, evicted
            );
            self.has_cached = false;
        } else if !sample.is_observed() {
            self.has_cached = true;
        }
        self.samples.insert(time_key, sample);
        true
    }

    /// The stored sample at `time_key`, without interpolating.
    pub fn sample(&self, time_key: TimeKey) -> Option<&Sample> {
        self.samples.get(time_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeKey, &Sample)> {
        self.samples.iter()
    }

    /// Number of stored keys strictly less than `time_key`.
    pub fn rank_of(&self, time_key: TimeKey) -> usize {
        self.samples.rank_of(time_key)
    }

    /// Positions of the two samples used to interpolate at `rank`.
    ///
    /// Rank `0` lies before every key and uses the first two samples, rank `len`
    /// lies after every key and uses the last two, anything else uses the pair
    /// that brackets it.
    pub fn neighbors_for_rank(&self, rank: usize) -> Result<(usize, usize), SeriesError> {
        neighbors_for_rank(rank, self.samples.len())
    }

    /// Computes the sample at `time_key` from its neighbours without storing it.
    pub fn interpolate(&self, time_key: TimeKey) -> Result<Sample, SeriesError> {
        interpolate_at(&self.samples, time_key, self.rank_of(time_key))
    }

    /// Temperature at `time_key`, interpolating and caching on a miss.
    pub fn get_temperature(&mut self, time_key: TimeKey) -> Result<f64, SeriesError> {
        let has_cached = &mut self.has_cached;
        let sample = self.samples.get_or_compute(time_key, |samples, rank| {
            let sample = interpolate_at(samples, time_key, rank)?;
            trace!(
                "Cached interpolated {:.3} °C at key {}",
                sample.temperature,
                time_key
            );
            *has_cached = true;
            Ok::<_, SeriesError>(sample)
        })?;
        Ok(sample.temperature)
    }

    /// Temperature at any instant; naive instants use the default zone.
    pub fn temperature_at(&mut self, instant: impl AnyInstant) -> Result<f64, SeriesError> {
        let instant = instant.resolve(&self.default_zone)?;
        self.get_temperature(to_key(&instant))
    }

    /// Time-weighted mean temperature between two instants.
    ///
    /// Naive instants are interpreted in the default zone. See [`Self::mean_over_keys`].
    pub fn mean_over(
        &mut self,
        start: impl AnyInstant,
        end: impl AnyInstant,
    ) -> Result<f64, SeriesError> {
        let start = start.resolve(&self.default_zone)?;
        let end = end.resolve(&self.default_zone)?;
        self.mean_over_keys(to_key(&start), to_key(&end))
    }

    /// Mean of the piecewise-linear curve over `start..=end`.
    ///
    /// Both end keys are interpolated into the series first, so the trapezoid sum
    /// over consecutive stored keys covers exactly the requested interval, even
    /// when it cuts through the middle of a sample spacing.
    pub fn mean_over_keys(&mut self, start: TimeKey, end: TimeKey) -> Result<f64, SeriesError> {
        if end <= start {
            return Err(SeriesError::InvalidRange { start, end });
        }
        let span = end
            .checked_sub(start)
            .ok_or(SeriesError::SpanOverflow { start, end })?;
        self.get_temperature(start)?;
        self.get_temperature(end)?;

        let mut points = self.samples.range(start, end);
        let Some((mut prev_key, prev)) = points.next() else {
            return Err(SeriesError::EmptySeries);
        };
        let mut prev_temperature = prev.temperature;
        let mut integral = 0.0;
        for (key, sample) in points {
            integral +=
                (sample.temperature + prev_temperature) / 2.0 * (key - prev_key) as f64;
            prev_key = key;
            prev_temperature = sample.temperature;
        }
        Ok(integral / span as f64)
    }
}

pub(crate) fn neighbors_for_rank(rank: usize, size: usize) -> Result<(usize, usize), SeriesError> {
    match size {
        0 => Err(SeriesError::EmptySeries),
        1 => Err(SeriesError::InsufficientSamples { found: 1 }),
        _ if rank == 0 => Ok((0, 1)),
        _ if rank >= size => Ok((size - 2, size - 1)),
        _ => Ok((rank - 1, rank)),
    }
}

fn interpolate_at(
    samples: &SortedKeyMap<Sample>,
    time_key: TimeKey,
    rank: usize,
) -> Result<Sample, SeriesError> {
    let (low, high) = neighbors_for_rank(rank, samples.len())?;
    let (Some((k0, s0)), Some((k1, s1))) = (samples.entry_at(low), samples.entry_at(high)) else {
        return Err(SeriesError::InsufficientSamples {
            found: samples.len(),
        });
    };
    let span = |start: TimeKey, end: TimeKey| {
        end.checked_sub(start)
            .ok_or(SeriesError::SpanOverflow { start, end })
    };
    let slope = (s1.temperature - s0.temperature) / span(k0, k1)? as f64;
    let temperature = s0.temperature + slope * span(k0, time_key)? as f64;
    Ok(Sample::interpolated(time_key, temperature))
}

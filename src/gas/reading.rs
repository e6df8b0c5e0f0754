//! Manually logged gas-meter readings and the consumption between them.

use crate::gas::error::CorrelationError;
use crate::series::temperature_series::TemperatureSeries;
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Converts metered gas volume into energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionFactors {
    /// Energy content of one cubic metre of gas, in kWh.
    pub kwh_per_m3: f64,
    /// Daily gas volume used for hot water, subtracted as a heating baseline.
    pub hot_water_m3_per_day: f64,
}

impl Default for ConversionFactors {
    fn default() -> Self {
        Self {
            kwh_per_m3: 9.82,
            hot_water_m3_per_day: 0.60,
        }
    }
}

impl ConversionFactors {
    pub fn hot_water_kwh_per_day(&self) -> f64 {
        self.hot_water_m3_per_day * self.kwh_per_m3
    }
}

/// One meter reading, taken at a local wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub taken_at: NaiveDateTime,
    /// Meter counter in m³.
    pub meter_m3: f64,
    /// Free-text note. A reading with a remark (meter swap, estimate, ...) does
    /// not close a valid interval.
    pub remark: Option<String>,
}

impl MeterReading {
    pub fn new(taken_at: NaiveDateTime, meter_m3: f64) -> Self {
        Self {
            taken_at,
            meter_m3,
            remark: None,
        }
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    /// Any present remark counts, even a blank one. Readings without a note
    /// carry `None`.
    pub fn has_remark(&self) -> bool {
        self.remark.is_some()
    }
}

/// Gas use and mean outdoor temperature between two consecutive readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub days: f64,
    pub meter_start: f64,
    pub meter_end: f64,
    pub consumed_m3: f64,
    pub mean_temperature: f64,
    /// Heating energy per day, hot water baseline removed.
    pub energy_kwh_per_day: f64,
}

/// Pairs up consecutive readings and attaches the mean temperature of each span.
///
/// Reading times are wall-clock times in the series' default zone. A pair is
/// skipped when its later reading carries a remark.
pub fn consumption_intervals(
    readings: &[MeterReading],
    series: &mut TemperatureSeries,
    factors: &ConversionFactors,
) -> Result<Vec<ConsumptionInterval>, CorrelationError> {
    let mut intervals = Vec::with_capacity(readings.len().saturating_sub(1));
    for pair in readings.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        if to.has_remark() {
            debug!(
                "Skipping interval ending {}: {}",
                to.taken_at,
                to.remark.as_deref().unwrap_or_default()
            );
            continue;
        }
        if to.taken_at <= from.taken_at {
            return Err(CorrelationError::NonIncreasingReadings {
                start: from.taken_at,
                end: to.taken_at,
            });
        }

        let seconds = (to.taken_at - from.taken_at).num_seconds() as f64;
        let consumed_m3 = to.meter_m3 - from.meter_m3;
        let mean_temperature = series.mean_over(from.taken_at, to.taken_at)?;
        let energy_kwh_per_day = consumed_m3 * factors.kwh_per_m3 * SECONDS_PER_DAY / seconds
            - factors.hot_water_kwh_per_day();

        intervals.push(ConsumptionInterval {
            start: from.taken_at,
            end: to.taken_at,
            days: seconds / SECONDS_PER_DAY,
            meter_start: from.meter_m3,
            meter_end: to.meter_m3,
            consumed_m3,
            mean_temperature,
            energy_kwh_per_day,
        });
    }
    Ok(intervals)
}

use crate::time_key::TimeKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column name to raw (trimmed) cell value, as delivered by the feed.
pub type RawFields = BTreeMap<String, String>;

/// Where a sample's temperature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleOrigin {
    /// A measurement read from the station feed.
    Observed,
    /// A value computed from neighbouring samples and cached in the series.
    Interpolated,
}

/// One temperature value at one time-key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time_key: TimeKey,
    /// Air temperature in °C.
    pub temperature: f64,
    pub origin: SampleOrigin,
    /// Passthrough columns of the source row. Empty for interpolated samples.
    pub raw: RawFields,
}

impl Sample {
    pub fn observed(time_key: TimeKey, temperature: f64, raw: RawFields) -> Self {
        Self {
            time_key,
            temperature,
            origin: SampleOrigin::Observed,
            raw,
        }
    }

    pub fn interpolated(time_key: TimeKey, temperature: f64) -> Self {
        Self {
            time_key,
            temperature,
            origin: SampleOrigin::Interpolated,
            raw: RawFields::new(),
        }
    }

    pub fn is_observed(&self) -> bool {
        self.origin == SampleOrigin::Observed
    }

    /// Looks up a passthrough column, e.g. the quality flag `QN_9`.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.raw.get(column).map(String::as_str)
    }
}

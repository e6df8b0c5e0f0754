//! Where and how to find one station's hourly air temperatures in the DWD
//! Climate Data Center open-data tree.

use chrono_tz::Tz;
use std::fmt;

/// Root of the DWD observation tree for Germany.
pub const DEFAULT_BASE_URL: &str =
    "https://opendata.dwd.de/climate_environment/CDC/observations_germany/climate";

/// Helmstedt-Emmerstedt.
pub const DEFAULT_STATION: &str = "13777";

/// Value the feed uses for a missing measurement.
pub const MISSING_SENTINEL: f64 = -999.0;

/// Describes the "recent" hourly air temperature product (`TU`) of one station.
///
/// The archive at [`HourlySource::archive_url`] holds several metadata files and
/// exactly one product file whose name contains [`HourlySource::member_tag`].
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySource {
    pub station: String,
    /// Directory of the product below the base URL.
    pub product_path: String,
    /// Leading part of the archive name, before the station id.
    pub archive_prefix: String,
    pub member_tag: String,
    pub timestamp_column: String,
    pub value_column: String,
    pub missing_sentinel: f64,
    /// Zone of the feed's `MESS_DATUM` timestamps.
    pub feed_zone: Tz,
}

impl HourlySource {
    pub fn station(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            product_path: "hourly/air_temperature/recent".to_string(),
            archive_prefix: "stundenwerte_TU".to_string(),
            member_tag: "produkt_tu_stunde_".to_string(),
            timestamp_column: "MESS_DATUM".to_string(),
            value_column: "TT_TU".to_string(),
            missing_sentinel: MISSING_SENTINEL,
            feed_zone: Tz::UTC,
        }
    }

    /// `{prefix}_{station}_akt`, the stem shared by archive and extracted CSV.
    pub fn file_stem(&self) -> String {
        format!("{}_{}_akt", self.archive_prefix, self.station)
    }

    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.file_stem())
    }

    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.file_stem())
    }

    pub fn archive_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.product_path.trim_matches('/'),
            self.archive_file_name()
        )
    }
}

impl Default for HourlySource {
    fn default() -> Self {
        Self::station(DEFAULT_STATION)
    }
}

impl fmt::Display for HourlySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hourly air temperature of station {}", self.station)
    }
}

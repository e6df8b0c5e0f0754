mod client;
mod dwd;
mod error;
mod gas;
mod series;
mod time_key;
mod types;
mod utils;

pub use client::*;
pub use error::DwdError;

pub use dwd::error::IngestError;
pub use dwd::extractor::{extract_member, parse_records, ArchiveMember, ParsedRecords};
pub use dwd::loader::ArchiveLoader;
pub use dwd::source::{HourlySource, DEFAULT_BASE_URL, DEFAULT_STATION, MISSING_SENTINEL};

pub use series::error::SeriesError;
pub use series::sorted_map::SortedKeyMap;
pub use series::temperature_series::TemperatureSeries;

pub use time_key::{
    epoch, from_key, localize, parse_and_key, parse_date_hour, to_key, KeyError, TimeKey,
};

pub use types::any_instant::{ensure_zoned, AnyInstant};
pub use types::sample::{RawFields, Sample, SampleOrigin};

pub use gas::error::CorrelationError;
pub use gas::reading::{consumption_intervals, ConsumptionInterval, ConversionFactors, MeterReading};
pub use gas::regression::LinearFit;

pub mod aggregate;
pub mod error;
pub mod sorted_map;
pub mod temperature_series;

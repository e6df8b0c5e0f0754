pub mod error;
pub mod reading;
pub mod regression;

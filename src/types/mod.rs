pub mod any_instant;
pub mod sample;

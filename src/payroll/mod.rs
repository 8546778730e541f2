pub mod aggregator;
pub mod error;
pub mod roster;

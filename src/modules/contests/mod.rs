pub mod adapters;
pub mod aggregator;

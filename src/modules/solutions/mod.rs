pub mod enricher;
pub mod matcher;

pub mod tables;
pub mod upstream;

pub mod generation;
pub mod usage;

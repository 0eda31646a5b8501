pub mod fixtures;
pub mod input;

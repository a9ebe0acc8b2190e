pub mod features;
pub mod predictions;

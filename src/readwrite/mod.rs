//! IO traits for writing outbreaks and batch results.

mod matrix;
mod outbreak;

pub use matrix::MatrixIO;
pub use outbreak::OutbreakIO;

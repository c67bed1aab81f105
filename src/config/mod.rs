//! Configuration data structures for simulation setups.

mod parameters;
mod samplers;

pub use parameters::{Parameters, ParametersError, Transmission, TransmissionPolicy};
pub use samplers::{Samplers, Transmitter};

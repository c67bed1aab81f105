//! This module contains the core datatypes of the library.

mod individual;
mod outbreak;
mod state;

pub use individual::{Individual, IndividualId, Infections, TRAJECTORY_LENGTH, Trajectory};
pub use outbreak::{Outbreak, Status};
pub use state::{N_STATES, State};

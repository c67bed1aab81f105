//! All errors that can occur in the outbreak library.

use std::fmt;

use crate::config::ParametersError;

pub type Result<T> = std::result::Result<T, OutbreakError>;

#[derive(Debug)]
pub enum OutbreakError {
    /// The configuration could not be read or does not describe valid distributions.
    Parameters(ParametersError),
    /// Results could not be written.
    Write(String),
}

impl fmt::Display for OutbreakError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutbreakError::Parameters(error) => write!(f, "ParametersError: {}", error),
            OutbreakError::Write(message) => write!(f, "WriteError: {}", message),
        }
    }
}

impl std::error::Error for OutbreakError {}

impl From<ParametersError> for OutbreakError {
    fn from(error: ParametersError) -> Self {
        OutbreakError::Parameters(error)
    }
}

impl From<std::io::Error> for OutbreakError {
    fn from(error: std::io::Error) -> Self {
        OutbreakError::Write(error.to_string())
    }
}

impl From<csv::Error> for OutbreakError {
    fn from(error: csv::Error) -> Self {
        OutbreakError::Write(error.to_string())
    }
}

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum RefinderError {
    /// Empty consensus pattern, or a zero-length expanded variant.
    InvalidPattern(String),
    /// Out-of-range threshold or otherwise unusable search parameters.
    InvalidInput(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Serde(serde_json::Error),
}

impl Error for RefinderError {}

impl fmt::Display for RefinderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RefinderError::InvalidPattern(msg) => write!(f, "Invalid consensus pattern: {msg}"),
            RefinderError::InvalidInput(msg) => write!(f, "Invalid search input: {msg}"),
            RefinderError::Io(e) => write!(f, "{e}"),
            RefinderError::Csv(e) => write!(f, "{e}"),
            RefinderError::Serde(e) => write!(f, "{e}"),
        }
    }
}

impl From<std::io::Error> for RefinderError {
    fn from(err: std::io::Error) -> Self {
        RefinderError::Io(err)
    }
}

impl From<csv::Error> for RefinderError {
    fn from(err: csv::Error) -> Self {
        RefinderError::Csv(err)
    }
}

impl From<serde_json::Error> for RefinderError {
    fn from(err: serde_json::Error) -> Self {
        RefinderError::Serde(err)
    }
}

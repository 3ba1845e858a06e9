use thiserror::Error;

use crate::sensor::SensorKind;

#[derive(Error, Debug)]
pub enum ArError {
    #[error("Permission denied for {0} sensor")]
    PermissionDenied(SensorKind),

    #[error("{0} sensor unavailable")]
    SensorUnavailable(SensorKind),

    #[error("Invalid coordinate for '{id}': lat={latitude}, lon={longitude}")]
    InvalidCoordinate {
        id: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Session error: {0}")]
    SessionState(String),
}

pub type Result<T> = std::result::Result<T, ArError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WayfinderError {
    #[error("Geocode error: {0}")]
    Geocode(#[from] wayfinder_providers::GeocodeError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Search session has shut down")]
    SessionClosed,
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),
}

pub type Result<T> = std::result::Result<T, WayfinderError>;

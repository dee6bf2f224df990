use thiserror::Error;
pub type Result<T> = std::result::Result<T, GeocodeError>;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Query is empty after trimming whitespace")]
    EmptyQuery,
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid provider endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("Provider {0} requires an access token")]
    MissingAccessToken(crate::ProviderKind),
    #[error("Unknown geocoding provider: {0}")]
    UnknownProvider(String),
}

#[cfg(feature = "http")]
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("GROQ_API_KEY is not defined in environment variables")]
    MissingApiKey,
    #[error("Prompt is required")]
    EmptyPrompt,
    #[error("Failed to generate content: {0}")]
    Upstream(#[from] reqwest::Error),
}

#[cfg(feature = "http")]
impl ChatError {
    /// HTTP status the proxy answers with for this failure.
    pub const fn status(&self) -> u16 {
        match self {
            Self::EmptyPrompt => 400,
            Self::MissingApiKey | Self::Upstream(_) => 500,
        }
    }
}

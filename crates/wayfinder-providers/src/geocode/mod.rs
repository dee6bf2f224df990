//! Geocoding: free-text query in, ranked candidate locations out.
//!
//! The [`Geocoder`] trait is the seam the search core depends on.
//! [`GeocodeClient`] is the HTTP implementation; tests and offline frontends
//! can supply their own.

use std::{fmt, future::Future, str::FromStr};

use crate::{GeocodeError, Result};

#[cfg(feature = "http")]
mod client;
mod raw;

#[cfg(feature = "http")]
pub use client::GeocodeClient;
pub use raw::{Identifier, MapboxFeature, NominatimPlace, Numeric, RawGeoResult, parse_candidates};

pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
pub const MAPBOX_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
pub const DEFAULT_RESULT_LIMIT: usize = 5;

const PROVIDER_ENV: &str = "WAYFINDER_GEOCODER";
const ENDPOINT_ENV: &str = "WAYFINDER_GEOCODER_URL";
const MAPBOX_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Source of candidate locations for a text query.
///
/// Implementations issue at most one outbound request per call and never
/// retry. Callers must not pass blank queries; implementations reject them
/// with [`GeocodeError::EmptyQuery`] without touching the network.
pub trait Geocoder: Send + Sync + 'static {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<CandidateLocation>>> + Send;
}

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and within (-90..=90, -180..=180).
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Provider-assigned identifier of a candidate, stable across repeated queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct CandidateId(String);

impl CandidateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CandidateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CandidateId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single geocoding match, normalized from whichever provider produced it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CandidateLocation {
    id: CandidateId,
    label: String,
    coordinates: Coordinates,
}

impl CandidateLocation {
    pub fn new(id: impl Into<CandidateId>, label: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            coordinates,
        }
    }

    pub const fn id(&self) -> &CandidateId {
        &self.id
    }

    /// Human-readable label, shown in the results list and on the marker.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub const fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

/// The geocoding services Wayfinder knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenStreetMap Nominatim (or any compatible mirror).
    Nominatim,
    /// Mapbox Geocoding API v5.
    Mapbox,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nominatim => f.write_str("nominatim"),
            Self::Mapbox => f.write_str("mapbox"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = GeocodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominatim" | "osm" => Ok(Self::Nominatim),
            "mapbox" => Ok(Self::Mapbox),
            other => Err(GeocodeError::UnknownProvider(other.to_owned())),
        }
    }
}

/// Connection settings for a geocoding provider.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub provider: ProviderKind,
    /// Base URL of the search endpoint.
    pub endpoint: String,
    /// Maximum number of candidates requested and returned.
    pub limit: usize,
    pub user_agent: String,
    /// Required by Mapbox, ignored by Nominatim.
    pub access_token: Option<String>,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self::nominatim()
    }
}

impl GeocodeConfig {
    pub fn nominatim() -> Self {
        Self {
            provider: ProviderKind::Nominatim,
            endpoint: NOMINATIM_ENDPOINT.to_owned(),
            limit: DEFAULT_RESULT_LIMIT,
            user_agent: concat!("wayfinder/", env!("CARGO_PKG_VERSION")).to_owned(),
            access_token: None,
        }
    }

    pub fn mapbox(access_token: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::Mapbox,
            endpoint: MAPBOX_ENDPOINT.to_owned(),
            access_token: Some(access_token.into()),
            ..Self::nominatim()
        }
    }

    /// Build a configuration from `WAYFINDER_GEOCODER`, `WAYFINDER_GEOCODER_URL`
    /// and `MAPBOX_ACCESS_TOKEN`. Defaults to public Nominatim.
    pub fn from_env() -> Result<Self> {
        let provider = match std::env::var(PROVIDER_ENV) {
            Ok(name) => name.parse()?,
            Err(_) => ProviderKind::Nominatim,
        };
        let mut config = match provider {
            ProviderKind::Nominatim => Self::nominatim(),
            ProviderKind::Mapbox => Self::mapbox(
                std::env::var(MAPBOX_TOKEN_ENV)
                    .map_err(|_| GeocodeError::MissingAccessToken(ProviderKind::Mapbox))?,
            ),
        };
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    /// Set the maximum number of candidates (at least 1)
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

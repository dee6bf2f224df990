//! Outbound provider clients for Wayfinder.
//!
//! This crate holds everything that talks to the outside world on behalf of the
//! interactive core: geocoding providers (Nominatim, Mapbox) and the
//! chat-completion proxy. Provider responses are normalized here, at the
//! boundary, so the core only ever sees [`CandidateLocation`] values with valid
//! coordinates.
//!
//! The HTTP clients live behind the default `http` feature. Without it the
//! crate still provides the data model and the response parsers.

pub mod geocode;

#[cfg(feature = "http")]
pub mod chat;

mod error;

pub use error::{GeocodeError, Result};
#[cfg(feature = "http")]
pub use error::ChatError;
#[cfg(feature = "http")]
pub use geocode::GeocodeClient;
pub use geocode::{
    CandidateId, CandidateLocation, Coordinates, GeocodeConfig, Geocoder, ProviderKind,
    RawGeoResult, parse_candidates,
};

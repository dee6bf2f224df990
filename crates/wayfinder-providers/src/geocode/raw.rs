//! Provider wire formats and their normalization into [`CandidateLocation`].
//!
//! Providers disagree on almost everything: Nominatim returns a bare array with
//! coordinates as numeric strings, Mapbox wraps GeoJSON features in an object
//! and stores `[lon, lat]` as numbers, and self-hosted mirrors mix both. Every
//! shape is decoded into [`RawGeoResult`] and normalized here so nothing
//! downstream has to care.

use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CandidateLocation, Coordinates, ProviderKind};
use crate::Result;

/// Number that may arrive as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        };
        value.filter(|v: &f64| v.is_finite())
    }
}

/// Identifier that may arrive as a JSON number or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(u64),
    Text(String),
}

impl Identifier {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// One record of a Nominatim `format=json` search response.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub place_id: Identifier,
    pub display_name: String,
    pub lat: Numeric,
    pub lon: Numeric,
}

/// One GeoJSON feature of a Mapbox geocoding response. `center` is `[lon, lat]`.
#[derive(Debug, Clone, Deserialize)]
pub struct MapboxFeature {
    pub id: Identifier,
    pub place_name: String,
    pub center: [Numeric; 2],
}

/// A provider record before normalization.
#[derive(Debug, Clone)]
pub enum RawGeoResult {
    Nominatim(NominatimPlace),
    Mapbox(MapboxFeature),
}

impl RawGeoResult {
    fn decode(kind: ProviderKind, record: serde_json::Value) -> Result<Self> {
        Ok(match kind {
            ProviderKind::Nominatim => Self::Nominatim(serde_json::from_value(record)?),
            ProviderKind::Mapbox => Self::Mapbox(serde_json::from_value(record)?),
        })
    }

    /// Normalize into a candidate. `None` when the coordinates do not parse or
    /// fall outside valid latitude/longitude ranges.
    pub fn into_candidate(self) -> Option<CandidateLocation> {
        let (id, label, lat, lon) = match self {
            Self::Nominatim(place) => (
                place.place_id,
                place.display_name,
                place.lat.value()?,
                place.lon.value()?,
            ),
            Self::Mapbox(feature) => {
                let [lon, lat] = feature.center;
                (feature.id, feature.place_name, lat.value()?, lon.value()?)
            }
        };
        let coordinates = Coordinates::new(lat, lon);
        coordinates
            .is_valid()
            .then(|| CandidateLocation::new(id.into_string(), label, coordinates))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Bare(Vec<serde_json::Value>),
    Features { features: Vec<serde_json::Value> },
    Results { results: Vec<serde_json::Value> },
}

impl Envelope {
    fn into_records(self) -> Vec<serde_json::Value> {
        match self {
            Self::Bare(records)
            | Self::Features { features: records }
            | Self::Results { results: records } => records,
        }
    }
}

/// Parse a provider response body into candidates, preserving provider rank.
///
/// A body that is not one of the known envelopes is an error. Individual
/// records that fail to decode or carry unusable coordinates are skipped, and
/// repeated ids keep only their first (highest ranked) occurrence.
pub fn parse_candidates(kind: ProviderKind, body: &[u8]) -> Result<Vec<CandidateLocation>> {
    let records = serde_json::from_slice::<Envelope>(body)?.into_records();
    let total = records.len();

    let candidates: Vec<_> = records
        .into_iter()
        .filter_map(|record| match RawGeoResult::decode(kind, record) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(provider = %kind, error = %e, "Skipping undecodable geocode record");
                None
            }
        })
        .filter_map(|raw| {
            let candidate = raw.into_candidate();
            if candidate.is_none() {
                warn!(provider = %kind, "Skipping geocode record with invalid coordinates");
            }
            candidate
        })
        .unique_by(|candidate| candidate.id().clone())
        .collect();

    debug!(provider = %kind, total, kept = candidates.len(), "Parsed geocode response");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeocodeError;

    const NOMINATIM_BODY: &str = r#"[
        {"place_id": 101, "display_name": "Golden Gate Park, San Francisco", "lat": "37.7694", "lon": "-122.4862", "class": "leisure"},
        {"place_id": 102, "display_name": "Golden Gate Bridge", "lat": "37.83", "lon": "-122.48"},
        {"place_id": 103, "display_name": "Golden Gate Heights", "lat": 37.7587, "lon": -122.4692}
    ]"#;

    #[test]
    fn test_nominatim_preserves_rank_order() {
        let candidates =
            parse_candidates(ProviderKind::Nominatim, NOMINATIM_BODY.as_bytes()).unwrap();

        let ids: Vec<_> = candidates.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, ["101", "102", "103"]);

        let bridge = &candidates[1];
        assert_eq!(bridge.label(), "Golden Gate Bridge");
        assert_eq!(bridge.coordinates(), Coordinates::new(37.83, -122.48));
    }

    #[test]
    fn test_mapbox_center_is_lon_lat() {
        let body = r#"{"type": "FeatureCollection", "features": [
            {"id": "poi.123", "place_name": "Golden Gate Bridge, San Francisco, California", "center": [-122.4786, 37.8199]}
        ]}"#;
        let candidates = parse_candidates(ProviderKind::Mapbox, body.as_bytes()).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id().as_str(), "poi.123");
        assert_eq!(candidates[0].coordinates(), Coordinates::new(37.8199, -122.4786));
    }

    #[test]
    fn test_wrapped_results_envelope() {
        let body = r#"{"results": [{"place_id": "abc", "display_name": "Somewhere", "lat": "1.5", "lon": "2.5"}]}"#;
        let candidates = parse_candidates(ProviderKind::Nominatim, body.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id().as_str(), "abc");
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let body = r#"[
            {"place_id": 1, "display_name": "No coordinates"},
            {"place_id": 2, "display_name": "Garbage latitude", "lat": "north", "lon": "0"},
            {"place_id": 3, "display_name": "Out of range", "lat": "123.0", "lon": "0"},
            {"place_id": 4, "display_name": "Fine", "lat": "10", "lon": "20"}
        ]"#;
        let candidates = parse_candidates(ProviderKind::Nominatim, body.as_bytes()).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label(), "Fine");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let body = r#"[
            {"place_id": 7, "display_name": "First", "lat": "1", "lon": "1"},
            {"place_id": 7, "display_name": "Second", "lat": "2", "lon": "2"}
        ]"#;
        let candidates = parse_candidates(ProviderKind::Nominatim, body.as_bytes()).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label(), "First");
    }

    #[test]
    fn test_empty_array_is_not_an_error() {
        let candidates = parse_candidates(ProviderKind::Nominatim, b"[]").unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_unknown_envelope_is_decode_error() {
        let err = parse_candidates(ProviderKind::Nominatim, br#"{"error": "rate limited"}"#)
            .unwrap_err();
        assert!(matches!(err, GeocodeError::Decode(_)));

        let err = parse_candidates(ProviderKind::Mapbox, b"<html>").unwrap_err();
        assert!(matches!(err, GeocodeError::Decode(_)));
    }
}

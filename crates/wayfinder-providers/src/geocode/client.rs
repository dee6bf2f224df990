use reqwest::{Client, Url};
use tracing::{debug, instrument};

use super::{CandidateLocation, GeocodeConfig, Geocoder, ProviderKind, parse_candidates};
use crate::{GeocodeError, Result};

/// HTTP geocoder backed by `reqwest`.
///
/// One GET per [`Geocoder::search`] call, no retries and no timeout beyond the
/// transport defaults.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    config: GeocodeConfig,
}

impl GeocodeClient {
    pub fn new(config: GeocodeConfig) -> Result<Self> {
        if config.provider == ProviderKind::Mapbox && config.access_token.is_none() {
            return Err(GeocodeError::MissingAccessToken(config.provider));
        }
        // Nominatim's usage policy rejects requests without an identifying agent.
        let http = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GeocodeConfig::from_env()?)
    }

    pub const fn config(&self) -> &GeocodeConfig {
        &self.config
    }

    fn request_url(&self, query: &str) -> Result<Url> {
        let limit = self.config.limit.to_string();
        match self.config.provider {
            ProviderKind::Nominatim => Url::parse_with_params(
                &self.config.endpoint,
                &[
                    ("format", "json"),
                    ("q", query),
                    ("limit", limit.as_str()),
                    ("addressdetails", "1"),
                ],
            )
            .map_err(|e| GeocodeError::InvalidEndpoint(e.to_string())),
            ProviderKind::Mapbox => {
                let mut url = Url::parse(&self.config.endpoint)
                    .map_err(|e| GeocodeError::InvalidEndpoint(e.to_string()))?;
                url.path_segments_mut()
                    .map_err(|()| GeocodeError::InvalidEndpoint(self.config.endpoint.clone()))?
                    .pop_if_empty()
                    .push(&format!("{query}.json"));
                url.query_pairs_mut()
                    .append_pair("access_token", self.config.access_token.as_deref().unwrap_or_default())
                    .append_pair("limit", &limit);
                Ok(url)
            }
        }
    }
}

impl Geocoder for GeocodeClient {
    #[instrument(name = "Geocode search", skip(self), fields(provider = %self.config.provider), level = "debug")]
    async fn search(&self, query: &str) -> Result<Vec<CandidateLocation>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let url = self.request_url(query)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        let mut candidates = parse_candidates(self.config.provider, &body)?;
        candidates.truncate(self.config.limit);
        debug!(count = candidates.len(), "Geocode search complete");
        Ok(candidates)
    }
}

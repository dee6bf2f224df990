use std::time::Duration;

use wayfinder_providers::Coordinates;

use crate::{
    error::WayfinderError,
    map::{CameraTarget, DEFAULT_CAMERA, DEFAULT_FLY_DURATION, DEFAULT_TARGET_ZOOM},
    search::DEFAULT_DEBOUNCE,
};

/// Highest zoom level tile backends commonly serve.
pub const MAX_ZOOM: f64 = 22.0;

/// Configuration of a search session.
///
/// Use [`SessionConfigBuilder`] for presets and validated overrides.
///
/// ```rust
/// use std::time::Duration;
/// use wayfinder::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .debounce(Duration::from_millis(250))
///     .target_zoom(16.0)
///     .build();
/// assert_eq!(config.target_zoom, 16.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Quiet period after the last keystroke before geocoding
    pub debounce: Duration,
    /// Zoom level used when flying to a selected location
    pub target_zoom: f64,
    /// Duration of the fly-to animation
    pub fly_duration: Duration,
    /// Camera before anything has been selected
    pub default_camera: CameraTarget,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            target_zoom: DEFAULT_TARGET_ZOOM,
            fly_duration: DEFAULT_FLY_DURATION,
            default_camera: DEFAULT_CAMERA,
        }
    }
}

/// Builder for creating session configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    /// Snappier feel for self-hosted providers without rate limits
    pub fn responsive() -> Self {
        let mut builder = Self::new();
        builder.config.debounce = Duration::from_millis(150);
        builder.config.fly_duration = Duration::from_secs(1);
        builder
    }

    /// At most about one request per second, as public Nominatim asks
    pub fn conservative() -> Self {
        let mut builder = Self::new();
        builder.config.debounce = Duration::from_secs(1);
        builder
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.config.debounce = debounce;
        self
    }

    /// Set the fly-to zoom level, clamped to `0..=MAX_ZOOM`. NaN keeps the default.
    pub fn target_zoom(mut self, zoom: f64) -> Self {
        self.config.target_zoom = if zoom.is_nan() {
            DEFAULT_TARGET_ZOOM
        } else {
            zoom.clamp(0.0, MAX_ZOOM)
        };
        self
    }

    pub fn fly_duration(mut self, duration: Duration) -> Self {
        self.config.fly_duration = duration;
        self
    }

    /// Set the initial camera (must be a valid coordinate and zoom)
    pub fn default_camera(mut self, lat: f64, lon: f64, zoom: f64) -> Result<Self, WayfinderError> {
        let center = Coordinates::new(lat, lon);
        if !center.is_valid() {
            return Err(WayfinderError::ConfigError(format!(
                "Default camera center {center} is not a valid coordinate"
            )));
        }
        if !(0.0..=MAX_ZOOM).contains(&zoom) {
            return Err(WayfinderError::ConfigError(format!(
                "Default camera zoom must be between 0 and {MAX_ZOOM}, got {zoom}"
            )));
        }
        self.config.default_camera = CameraTarget::new(center, zoom);
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

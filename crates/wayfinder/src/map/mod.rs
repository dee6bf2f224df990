//! Map navigation: camera animation and the single selection marker.
//!
//! The rendering backend is a collaborator behind [`MapSurface`]; this module
//! only decides where the camera goes and which marker exists.
//! [`MapNavigator`] owns the surface and the marker handle, so replacing the
//! marker is atomic from the caller's point of view.

use std::time::Duration;

use tracing::debug;
use wayfinder_providers::{CandidateLocation, Coordinates};

mod memory;

pub use memory::{CameraMove, MarkerId, MemoryMarker, MemorySurface};

/// Zoom level used when flying to a selected location.
pub const DEFAULT_TARGET_ZOOM: f64 = 14.0;
/// Duration of the fly-to animation.
pub const DEFAULT_FLY_DURATION: Duration = Duration::from_secs(2);
/// Initial camera when nothing is selected: San Francisco.
pub const DEFAULT_CAMERA: CameraTarget = CameraTarget {
    center: Coordinates::new(37.8, -122.4),
    zoom: DEFAULT_TARGET_ZOOM,
};

/// Camera viewport the map should animate to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CameraTarget {
    pub center: Coordinates,
    pub zoom: f64,
}

impl CameraTarget {
    pub const fn new(center: Coordinates, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

impl Default for CameraTarget {
    fn default() -> Self {
        DEFAULT_CAMERA
    }
}

/// Backing data of the marker currently on the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SelectedLocation {
    pub coordinates: Coordinates,
    pub label: String,
}

/// Drawing primitives a map backend must provide.
///
/// Tile loading, gestures and rendering are entirely the backend's business.
pub trait MapSurface {
    /// Opaque handle identifying a marker the surface has drawn.
    type Marker;

    fn set_camera(&mut self, target: CameraTarget, duration: Duration);
    fn add_marker(&mut self, at: Coordinates, label: &str) -> Self::Marker;
    fn remove_marker(&mut self, marker: Self::Marker);
}

struct PlacedMarker<M> {
    handle: M,
    location: SelectedLocation,
}

/// Owns a [`MapSurface`] and keeps at most one selection marker on it.
pub struct MapNavigator<S: MapSurface> {
    surface: S,
    marker: Option<PlacedMarker<S::Marker>>,
    camera: CameraTarget,
    target_zoom: f64,
    fly_duration: Duration,
}

impl<S: MapSurface> MapNavigator<S> {
    /// Take ownership of `surface` and jump (without animation) to `initial`.
    pub fn new(mut surface: S, initial: CameraTarget) -> Self {
        surface.set_camera(initial, Duration::ZERO);
        Self {
            surface,
            marker: None,
            camera: initial,
            target_zoom: DEFAULT_TARGET_ZOOM,
            fly_duration: DEFAULT_FLY_DURATION,
        }
    }

    pub fn with_target_zoom(mut self, zoom: f64) -> Self {
        self.target_zoom = zoom;
        self
    }

    pub fn with_fly_duration(mut self, duration: Duration) -> Self {
        self.fly_duration = duration;
        self
    }

    /// Fly to `candidate` and replace the marker with one labelled after it.
    ///
    /// Exactly one marker exists when this returns, whatever existed before.
    pub fn select_location(&mut self, candidate: &CandidateLocation) -> CameraTarget {
        let target = CameraTarget::new(candidate.coordinates(), self.target_zoom);
        self.surface.set_camera(target, self.fly_duration);
        self.camera = target;

        if let Some(previous) = self.marker.take() {
            self.surface.remove_marker(previous.handle);
        }
        let handle = self
            .surface
            .add_marker(candidate.coordinates(), candidate.label());
        self.marker = Some(PlacedMarker {
            handle,
            location: SelectedLocation {
                coordinates: candidate.coordinates(),
                label: candidate.label().to_owned(),
            },
        });

        debug!(
            id = %candidate.id(),
            center = %target.center,
            zoom = target.zoom,
            "Navigated to selected location"
        );
        target
    }

    pub const fn camera(&self) -> CameraTarget {
        self.camera
    }

    pub fn selected(&self) -> Option<&SelectedLocation> {
        self.marker.as_ref().map(|marker| &marker.location)
    }

    /// Read-only view of the backend, e.g. for inspection in tests.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Tear down the navigator and hand the backend back.
    pub fn into_surface(self) -> S {
        self.surface
    }
}

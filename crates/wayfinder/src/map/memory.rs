use std::{collections::BTreeMap, time::Duration};

use wayfinder_providers::Coordinates;

use super::{CameraTarget, MapSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMarker {
    pub at: Coordinates,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMove {
    pub target: CameraTarget,
    pub duration: Duration,
}

/// Headless [`MapSurface`] that records what it was asked to draw.
///
/// Useful for server-side rendering of map state and for tests.
#[derive(Debug, Default)]
pub struct MemorySurface {
    moves: Vec<CameraMove>,
    markers: BTreeMap<MarkerId, MemoryMarker>,
    next_marker: u64,
    removed: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every camera request, oldest first.
    pub fn camera_moves(&self) -> &[CameraMove] {
        &self.moves
    }

    pub fn camera(&self) -> Option<CameraTarget> {
        self.moves.last().map(|m| m.target)
    }

    /// Markers currently drawn, in creation order.
    pub fn markers(&self) -> impl Iterator<Item = &MemoryMarker> {
        self.markers.values()
    }

    /// How many markers have been removed over the surface's lifetime.
    pub const fn removed_count(&self) -> usize {
        self.removed
    }
}

impl MapSurface for MemorySurface {
    type Marker = MarkerId;

    fn set_camera(&mut self, target: CameraTarget, duration: Duration) {
        self.moves.push(CameraMove { target, duration });
    }

    fn add_marker(&mut self, at: Coordinates, label: &str) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(
            id,
            MemoryMarker {
                at,
                label: label.to_owned(),
            },
        );
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if self.markers.remove(&marker).is_some() {
            self.removed += 1;
        }
    }
}

//! Geometry handed to whatever draws the globe.
//!
//! Nothing here knows how things are drawn: the session pushes pass lists,
//! flyover paths, orbit tracks and live positions into a [`RenderSink`].

mod orbit;
mod path;

use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::DisplayPass;
use crate::propagator::GeoPoint;
use crate::tracker::TrackedPosition;

pub use orbit::ground_track;
pub use path::build_flyover_scene;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TrajectorySample {
    pub time: DateTime<Utc>,
    pub position: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DirectionIndicator {
    pub position: GeoPoint,
    pub heading_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Marker {
    pub position: GeoPoint,
    pub altitude_km: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ObserverMarker {
    pub marker: Marker,
    pub viewing_circle: Vec<GeoPoint>,
}

/// Everything drawn for one selected pass.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FlyoverScene {
    pub trajectory: Vec<TrajectorySample>,
    pub altitude_km: f64,
    pub direction_indicators: Vec<DirectionIndicator>,
    pub visible_start: Option<Marker>,
    pub visible_end: Option<Marker>,
    pub satellite_marker: Option<Marker>,
    pub observer: Option<ObserverMarker>,
}

/// Consumer of the geometry the session produces.
pub trait RenderSink: Send + Sync {
    fn show_passes(&self, passes: &[DisplayPass]);
    fn show_flyover(&self, scene: &FlyoverScene);
    fn show_orbit(&self, track: &[GeoPoint]);
    fn update_position(&self, position: &TrackedPosition);
    fn clear_position(&self);
    /// Drop the flyover path, its markers and the observer marker.
    fn reset_view(&self);
    /// Drop everything tied to the tracked satellite.
    fn clear_satellite(&self);
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct Scene {
    pub passes: Vec<DisplayPass>,
    pub flyover: Option<FlyoverScene>,
    pub orbit: Vec<GeoPoint>,
    pub position: Option<TrackedPosition>,
}

/// Keeps the latest drawable state so HTTP clients can poll it.
#[derive(Debug, Default)]
pub struct SceneStore {
    scene: StdMutex<Scene>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Scene {
        self.scene.lock().unwrap().clone()
    }
}

impl RenderSink for SceneStore {
    fn show_passes(&self, passes: &[DisplayPass]) {
        self.scene.lock().unwrap().passes = passes.to_vec();
    }

    fn show_flyover(&self, scene: &FlyoverScene) {
        self.scene.lock().unwrap().flyover = Some(scene.clone());
    }

    fn show_orbit(&self, track: &[GeoPoint]) {
        self.scene.lock().unwrap().orbit = track.to_vec();
    }

    fn update_position(&self, position: &TrackedPosition) {
        self.scene.lock().unwrap().position = Some(position.clone());
    }

    fn clear_position(&self) {
        self.scene.lock().unwrap().position = None;
    }

    fn reset_view(&self) {
        self.scene.lock().unwrap().flyover = None;
    }

    fn clear_satellite(&self) {
        let mut locked = self.scene.lock().unwrap();
        *locked = Scene::default();
    }
}

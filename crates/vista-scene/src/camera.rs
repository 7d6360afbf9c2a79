//! Orbit camera: yaw, pitch, distance and height around the world origin.
//!
//! All rates are per millisecond so motion is frame-rate independent.
//! Angles are stored in degrees.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const MIN_DISTANCE: f32 = 5.0;
pub const MAX_DISTANCE: f32 = 80.0;
pub const MIN_PITCH_DEG: f32 = -85.0;
pub const MAX_PITCH_DEG: f32 = 85.0;

/// Start pose, input rates and projection parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub start_distance: f32,
    pub start_height: f32,
    pub start_angle_deg: f32,
    pub start_pitch_deg: f32,
    /// Distance units per ms.
    pub zoom_rate: f32,
    /// Degrees of yaw per ms.
    pub orbit_rate: f32,
    /// Height units per ms.
    pub height_rate: f32,
    /// Degrees of pitch per ms.
    pub pitch_rate: f32,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            start_distance: 5.0,
            start_height: 3.0,
            start_angle_deg: 0.0,
            start_pitch_deg: -10.0,
            zoom_rate: 0.05,
            orbit_rate: 0.1,
            height_rate: 0.01,
            pitch_rate: 0.08,
            fov_deg: 90.0,
            near: 0.1,
            far: 5000.0,
        }
    }
}

/// Which movement keys are held this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraIntents {
    pub zoom_out: bool,
    pub zoom_in: bool,
    pub orbit_left: bool,
    pub orbit_right: bool,
    pub raise: bool,
    pub lower: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
}

impl CameraIntents {
    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub angle_deg: f32,
    pub pitch_deg: f32,
    pub distance: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct CameraController {
    state: CameraState,
    settings: CameraSettings,
}

impl CameraController {
    pub fn new(settings: CameraSettings) -> Self {
        let state = CameraState {
            angle_deg: settings.start_angle_deg,
            pitch_deg: settings.start_pitch_deg.clamp(MIN_PITCH_DEG, MAX_PITCH_DEG),
            distance: settings.start_distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            height: settings.start_height,
        };
        Self { state, settings }
    }

    /// Apply held intents over `delta_ms`, then clamp pitch and distance.
    /// Opposing intents cancel.
    pub fn update(&mut self, intents: CameraIntents, delta_ms: f32) {
        let s = &self.settings;
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        let state = &mut self.state;

        state.height += axis(intents.raise, intents.lower) * s.height_rate * delta_ms;
        state.angle_deg += axis(intents.orbit_right, intents.orbit_left) * s.orbit_rate * delta_ms;
        state.distance += axis(intents.zoom_out, intents.zoom_in) * s.zoom_rate * delta_ms;
        state.pitch_deg += axis(intents.pitch_up, intents.pitch_down) * s.pitch_rate * delta_ms;

        state.pitch_deg = state.pitch_deg.clamp(MIN_PITCH_DEG, MAX_PITCH_DEG);
        state.distance = state.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// `(sin(yaw) * distance, height, cos(yaw) * distance)`.
    pub fn position(&self) -> Vec3 {
        let yaw = self.state.angle_deg.to_radians();
        Vec3::new(
            yaw.sin() * self.state.distance,
            self.state.height,
            yaw.cos() * self.state.distance,
        )
    }

    /// Unit view direction from yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        let yaw = self.state.angle_deg.to_radians();
        let pitch = self.state.pitch_deg.to_radians();
        Vec3::new(yaw.sin() * pitch.cos(), pitch.sin(), yaw.cos() * pitch.cos())
    }

    /// One unit along [`Self::forward`] from the camera position.
    pub fn target(&self) -> Vec3 {
        self.position() + self.forward()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target(), Vec3::Y)
    }

    /// Perspective projection for a surface aspect ratio (width / height).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(
            self.settings.fov_deg.to_radians(),
            aspect,
            self.settings.near,
            self.settings.far,
        )
    }
}

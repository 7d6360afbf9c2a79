//! Sun and moon on antipodal orbits.
//!
//! A single orbital angle grows with time; the moon always sits at
//! `angle + PI`. Time of day only affects the sun's height: at sunset it is
//! dropped toward the horizon but never below a floor.

use std::f64::consts::PI;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::model::{MeshHandle, Model};
use crate::sky::TimeOfDay;

/// Circular orbit with a height that bobs with the same angle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitParams {
    pub radius: f32,
    pub base_height: f32,
    pub height_amplitude: f32,
    /// Uniform model scale for the body's mesh.
    pub scale: f32,
}

impl OrbitParams {
    /// `(cos(a) * r, base + sin(a) * amp, sin(a) * r)`.
    pub fn position(&self, angle: f64) -> Vec3 {
        let (sin, cos) = angle.sin_cos();
        Vec3::new(
            cos as f32 * self.radius,
            self.base_height + sin as f32 * self.height_amplitude,
            sin as f32 * self.radius,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CelestialSettings {
    /// Radians per millisecond.
    pub orbit_speed: f64,
    pub sun: OrbitParams,
    pub moon: OrbitParams,
    /// How far the sun is lowered at sunset.
    pub sunset_drop: f32,
    /// The sun never drops below this height.
    pub sunset_floor: f32,
}

impl Default for CelestialSettings {
    fn default() -> Self {
        Self {
            orbit_speed: 0.0002,
            sun: OrbitParams {
                radius: 120.0,
                base_height: 2000.0,
                height_amplitude: 60.0,
                scale: 0.03,
            },
            moon: OrbitParams {
                radius: 140.0 * 1.1,
                base_height: 1000.0,
                height_amplitude: 60.0 * 0.7,
                scale: 0.04,
            },
            sunset_drop: 2000.0,
            sunset_floor: 150.0,
        }
    }
}

pub struct CelestialSimulator {
    settings: CelestialSettings,
    sun_angle: f64,
    sun_position: Vec3,
    moon_position: Vec3,
    sun: Option<Model>,
    moon: Option<Model>,
}

impl CelestialSimulator {
    pub fn new(settings: CelestialSettings, time_of_day: TimeOfDay) -> Self {
        let mut sim = Self {
            settings,
            sun_angle: 0.0,
            sun_position: Vec3::ZERO,
            moon_position: Vec3::ZERO,
            sun: None,
            moon: None,
        };
        sim.derive(time_of_day);
        sim
    }

    /// Grow the orbital angle by `orbit_speed * delta_ms` and re-derive
    /// positions and transforms.
    pub fn advance(&mut self, delta_ms: f64, time_of_day: TimeOfDay) {
        self.sun_angle += self.settings.orbit_speed * delta_ms;
        self.derive(time_of_day);
    }

    /// Give the bodies geometry. Until this is called they have positions but
    /// nothing to draw and cast no light.
    pub fn attach_models(&mut self, sun: MeshHandle, moon: MeshHandle) {
        self.sun = Some(Model::new(sun));
        self.moon = Some(Model::new(moon));
        self.update_transforms();
    }

    pub fn sun_angle(&self) -> f64 {
        self.sun_angle
    }

    pub fn moon_angle(&self) -> f64 {
        self.sun_angle + PI
    }

    pub fn sun_position(&self) -> Vec3 {
        self.sun_position
    }

    pub fn moon_position(&self) -> Vec3 {
        self.moon_position
    }

    pub fn sun(&self) -> Option<&Model> {
        self.sun.as_ref()
    }

    pub fn moon(&self) -> Option<&Model> {
        self.moon.as_ref()
    }

    /// Light source for the current time of day, if the bodies are loaded.
    pub fn light_position(&self, time_of_day: TimeOfDay) -> Option<Vec3> {
        active_light(
            time_of_day,
            self.sun.map(|_| self.sun_position),
            self.moon.map(|_| self.moon_position),
        )
    }

    fn derive(&mut self, time_of_day: TimeOfDay) {
        let mut sun = self.settings.sun.position(self.sun_angle);
        if time_of_day == TimeOfDay::Sunset {
            sun.y = (sun.y - self.settings.sunset_drop).max(self.settings.sunset_floor);
        }
        self.sun_position = sun;
        self.moon_position = self.settings.moon.position(self.moon_angle());
        self.update_transforms();
    }

    fn update_transforms(&mut self) {
        if let Some(sun) = &mut self.sun {
            sun.transform = body_transform(self.sun_position, self.settings.sun.scale);
        }
        if let Some(moon) = &mut self.moon {
            moon.transform = body_transform(self.moon_position, self.settings.moon.scale);
        }
    }
}

fn body_transform(position: Vec3, scale: f32) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(scale))
}

/// The moon lights the night and the sun lights everything else; whichever is
/// missing defers to the other.
pub fn active_light(time_of_day: TimeOfDay, sun: Option<Vec3>, moon: Option<Vec3>) -> Option<Vec3> {
    if time_of_day.is_night() {
        moon.or(sun)
    } else {
        sun.or(moon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BufferHandle;

    const EPS: f32 = 1e-3;

    fn mesh(id: u32) -> MeshHandle {
        MeshHandle {
            buffer: BufferHandle(id),
            vertex_count: 36,
        }
    }

    fn simulator(time_of_day: TimeOfDay) -> CelestialSimulator {
        CelestialSimulator::new(CelestialSettings::default(), time_of_day)
    }

    #[test]
    fn test_angle_grows_with_orbit_speed() {
        let mut sim = simulator(TimeOfDay::Day);
        sim.advance(1000.0, TimeOfDay::Day);
        assert!((sim.sun_angle() - 0.2).abs() < 1e-12, "angle {}", sim.sun_angle());
    }

    #[test]
    fn test_moon_is_always_antipodal() {
        let mut sim = simulator(TimeOfDay::Day);
        for delta in [0.0, 16.7, 1_000.0, 123_456.0] {
            sim.advance(delta, TimeOfDay::Night);
            assert_eq!(sim.moon_angle(), sim.sun_angle() + PI);
        }
    }

    #[test]
    fn test_day_positions_at_zero_angle() {
        let sim = simulator(TimeOfDay::Day);
        assert!((sim.sun_position() - Vec3::new(120.0, 2000.0, 0.0)).length() < EPS);
        // Moon at angle PI: cos = -1, sin ~ 0.
        assert!((sim.moon_position() - Vec3::new(-154.0, 1000.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_sunset_lowers_sun_to_floor() {
        let sim = simulator(TimeOfDay::Sunset);
        // 2000 - 2000 = 0, raised to the 150 floor.
        assert!((sim.sun_position().y - 150.0).abs() < EPS, "y {}", sim.sun_position().y);
    }

    #[test]
    fn test_sunset_drop_above_floor() {
        let settings = CelestialSettings {
            sunset_drop: 500.0,
            ..Default::default()
        };
        let sim = CelestialSimulator::new(settings, TimeOfDay::Sunset);
        assert!((sim.sun_position().y - 1500.0).abs() < EPS);
    }

    #[test]
    fn test_moon_ignores_time_of_day() {
        let day = simulator(TimeOfDay::Day);
        let sunset = simulator(TimeOfDay::Sunset);
        assert_eq!(day.moon_position(), sunset.moon_position());
    }

    #[test]
    fn test_transforms_follow_attached_models() {
        let mut sim = simulator(TimeOfDay::Day);
        assert!(sim.sun().is_none());
        sim.attach_models(mesh(1), mesh(2));
        sim.advance(500.0, TimeOfDay::Day);

        let sun = sim.sun().unwrap();
        let moved = sun.transform.transform_point3(Vec3::ZERO);
        assert!((moved - sim.sun_position()).length() < EPS);
        let scaled = sun.transform.transform_vector3(Vec3::X);
        assert!((scaled.x - 0.03).abs() < 1e-6, "sun scale {}", scaled.x);

        let moon = sim.moon().unwrap();
        let scaled = moon.transform.transform_vector3(Vec3::Y);
        assert!((scaled.y - 0.04).abs() < 1e-6, "moon scale {}", scaled.y);
    }

    #[test]
    fn test_no_light_until_models_attached() {
        let mut sim = simulator(TimeOfDay::Day);
        assert_eq!(sim.light_position(TimeOfDay::Day), None);
        sim.attach_models(mesh(1), mesh(2));
        assert_eq!(sim.light_position(TimeOfDay::Day), Some(sim.sun_position()));
        assert_eq!(sim.light_position(TimeOfDay::Night), Some(sim.moon_position()));
    }

    #[test]
    fn test_active_light_fallbacks() {
        let sun = Vec3::new(1.0, 0.0, 0.0);
        let moon = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(active_light(TimeOfDay::Night, Some(sun), Some(moon)), Some(moon));
        assert_eq!(active_light(TimeOfDay::Night, Some(sun), None), Some(sun));
        assert_eq!(active_light(TimeOfDay::Sunset, Some(sun), Some(moon)), Some(sun));
        assert_eq!(active_light(TimeOfDay::Day, None, Some(moon)), Some(moon));
        assert_eq!(active_light(TimeOfDay::Day, None, None), None);
    }
}

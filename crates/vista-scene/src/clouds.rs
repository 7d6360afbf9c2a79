//! Drifting cloud puffs.
//!
//! Each cloud gets a random personality at creation. Its position, scale and
//! opacity are then pure functions of elapsed seconds and the wind, so the
//! field itself never mutates after generation.

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::{Mat4, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::MeshHandle;

const MIN_RING_RADIUS: f32 = 180.0;
const MAX_RING_RADIUS: f32 = 320.0;
const BASE_HEIGHT: f32 = 800.0;
const HEIGHT_RANGE: f32 = 300.0;
const PULSE_AMP: f32 = 0.08;
const MIN_ALPHA: f32 = 0.15;
const MAX_ALPHA: f32 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindState {
    /// Heading in radians in the XZ plane.
    pub direction: f32,
    /// Units per second.
    pub speed: f32,
}

impl Default for WindState {
    fn default() -> Self {
        Self {
            direction: FRAC_PI_4,
            speed: 12.0,
        }
    }
}

impl WindState {
    /// Total drift after `t` seconds.
    pub fn offset(&self, t: f32) -> (f32, f32) {
        let distance = self.speed * t;
        (self.direction.cos() * distance, self.direction.sin() * distance)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cloud {
    pub base_x: f32,
    pub base_z: f32,
    pub height: f32,
    pub scale: f32,
    pub wobble_amp: f32,
    pub wobble_freq: f32,
    pub phase_x: f32,
    pub phase_z: f32,
    pub pulse_amp: f32,
    pub pulse_freq: f32,
    pub pulse_phase: f32,
    pub alpha_base: f32,
    pub alpha_amp: f32,
}

impl Cloud {
    pub fn random(rng: &mut impl Rng) -> Self {
        let angle = rng.random::<f32>() * TAU;
        let radius = MIN_RING_RADIUS + rng.random::<f32>() * (MAX_RING_RADIUS - MIN_RING_RADIUS);
        let height = BASE_HEIGHT + (rng.random::<f32>() - 0.5) * HEIGHT_RANGE;
        let scale = 0.5 + rng.random::<f32>() * 0.4;

        Self {
            base_x: angle.cos() * radius,
            base_z: angle.sin() * radius,
            height,
            scale,
            wobble_amp: 6.0 + rng.random::<f32>() * 10.0,
            wobble_freq: 0.05 + rng.random::<f32>() * 0.10,
            phase_x: rng.random::<f32>() * TAU,
            phase_z: rng.random::<f32>() * TAU,
            pulse_amp: PULSE_AMP,
            pulse_freq: 0.15 + rng.random::<f32>() * 0.25,
            pulse_phase: rng.random::<f32>() * TAU,
            alpha_base: 0.50 + rng.random::<f32>() * 0.10,
            alpha_amp: 0.12 + rng.random::<f32>() * 0.08,
        }
    }

    /// Base ring position plus wind drift plus a lissajous wobble.
    pub fn position(&self, t: f32, wind: &WindState) -> Vec3 {
        let (wind_x, wind_z) = wind.offset(t);
        let wobble_x = self.wobble_amp * (t * self.wobble_freq + self.phase_x).sin();
        let wobble_z = 0.6 * self.wobble_amp * (t * self.wobble_freq * 0.8 + self.phase_z).cos();
        Vec3::new(
            self.base_x + wind_x + wobble_x,
            self.height,
            self.base_z + wind_z + wobble_z,
        )
    }

    /// Slow "breathing"; the puff is squashed vertically.
    pub fn scale_at(&self, t: f32) -> Vec3 {
        let breath = 1.0 + self.pulse_amp * (t * self.pulse_freq + self.pulse_phase).sin();
        let s = self.scale * breath;
        Vec3::new(s, s * 0.8, s)
    }

    pub fn alpha_at(&self, t: f32) -> f32 {
        let flicker = (t * self.pulse_freq * 1.3 + self.pulse_phase * 1.7).sin();
        (self.alpha_base + self.alpha_amp * flicker).clamp(MIN_ALPHA, MAX_ALPHA)
    }
}

/// One cloud's draw parameters for a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudInstance {
    pub transform: Mat4,
    pub alpha: f32,
}

/// Every cloud shares one template mesh.
pub struct CloudField {
    template: MeshHandle,
    clouds: Vec<Cloud>,
}

impl CloudField {
    pub fn generate(count: usize, template: MeshHandle, rng: &mut impl Rng) -> Self {
        let clouds = (0..count).map(|_| Cloud::random(rng)).collect();
        Self { template, clouds }
    }

    pub fn template(&self) -> MeshHandle {
        self.template
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }

    pub fn instances(&self, t: f32, wind: WindState) -> impl Iterator<Item = CloudInstance> + '_ {
        self.clouds.iter().map(move |cloud| CloudInstance {
            transform: Mat4::from_translation(cloud.position(t, &wind))
                * Mat4::from_scale(cloud.scale_at(t)),
            alpha: cloud.alpha_at(t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BufferHandle;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn template() -> MeshHandle {
        MeshHandle {
            buffer: BufferHandle(7),
            vertex_count: 120,
        }
    }

    fn field(seed: u64) -> CloudField {
        CloudField::generate(8, template(), &mut ChaCha8Rng::seed_from_u64(seed))
    }

    fn still_cloud() -> Cloud {
        Cloud {
            base_x: 100.0,
            base_z: -50.0,
            height: 800.0,
            scale: 0.7,
            wobble_amp: 0.0,
            wobble_freq: 0.1,
            phase_x: 0.0,
            phase_z: 0.0,
            pulse_amp: 0.0,
            pulse_freq: 0.2,
            pulse_phase: 0.0,
            alpha_base: 0.55,
            alpha_amp: 0.0,
        }
    }

    #[test]
    fn test_personalities_within_ranges() {
        for cloud in field(11).clouds() {
            let radius = cloud.base_x.hypot(cloud.base_z);
            assert!((179.9..=320.1).contains(&radius), "ring radius {radius}");
            assert!((650.0..=950.0).contains(&cloud.height), "height {}", cloud.height);
            assert!((0.5..0.9).contains(&cloud.scale), "scale {}", cloud.scale);
            assert!((6.0..16.0).contains(&cloud.wobble_amp));
            assert!((0.05..0.15).contains(&cloud.wobble_freq));
            assert!((0.15..0.40).contains(&cloud.pulse_freq));
            assert!((0.50..0.60).contains(&cloud.alpha_base));
            assert!((0.12..0.20).contains(&cloud.alpha_amp));
            assert_eq!(cloud.pulse_amp, PULSE_AMP);
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        assert_eq!(field(3).clouds(), field(3).clouds());
        assert_ne!(field(3).clouds(), field(4).clouds());
    }

    #[test]
    fn test_wind_drift_is_linear_in_time() {
        let cloud = still_cloud();
        let wind = WindState {
            direction: 0.0,
            speed: 12.0,
        };
        let at0 = cloud.position(0.0, &wind);
        let at10 = cloud.position(10.0, &wind);
        assert!((at10.x - at0.x - 120.0).abs() < 1e-3, "drift {}", at10.x - at0.x);
        assert!((at10.z - at0.z).abs() < 1e-3);
        assert_eq!(at10.y, 800.0);
    }

    #[test]
    fn test_default_wind_heads_diagonally() {
        let (dx, dz) = WindState::default().offset(1.0);
        assert!((dx - dz).abs() < 1e-4, "45 degree wind should drift equally: {dx} {dz}");
        assert!((dx.hypot(dz) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_alpha_always_clamped() {
        let mut cloud = still_cloud();
        cloud.alpha_amp = 5.0;
        for i in 0..500 {
            let alpha = cloud.alpha_at(i as f32 * 0.37);
            assert!((MIN_ALPHA..=MAX_ALPHA).contains(&alpha), "alpha {alpha}");
        }
    }

    #[test]
    fn test_scale_is_vertically_squashed() {
        let s = still_cloud().scale_at(3.0);
        assert!((s.x - 0.7).abs() < 1e-6);
        assert!((s.y - 0.56).abs() < 1e-6);
        assert_eq!(s.x, s.z);
    }

    #[test]
    fn test_instances_one_per_cloud() {
        let field = field(5);
        let instances: Vec<_> = field.instances(42.0, WindState::default()).collect();
        assert_eq!(instances.len(), 8);
        for (instance, cloud) in instances.iter().zip(field.clouds()) {
            let origin = instance.transform.transform_point3(Vec3::ZERO);
            assert!((origin - cloud.position(42.0, &WindState::default())).length() < 1e-3);
            assert_eq!(instance.alpha, cloud.alpha_at(42.0));
        }
        assert_eq!(field.template(), template());
    }
}

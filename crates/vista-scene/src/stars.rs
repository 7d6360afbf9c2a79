//! Twinkling stars shown at night.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::model::MeshHandle;

const MIN_RING_RADIUS: f32 = 120.0;
const MAX_RING_RADIUS: f32 = 350.0;
const MIN_HEIGHT: f32 = 140.0;
const MAX_HEIGHT: f32 = 260.0;

const SPARKLE_THRESHOLD: f32 = 0.985;
const SPARKLE_BOOST: f32 = 0.35;
const MIN_ALPHA: f32 = 0.08;
const BOB_AMPLITUDE: f32 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub phase: f32,
    pub speed: f32,
    pub base: f32,
    pub amp: f32,
}

impl Star {
    pub fn random(rng: &mut impl Rng) -> Self {
        let angle = rng.random::<f32>() * TAU;
        let radius = MIN_RING_RADIUS + rng.random::<f32>() * (MAX_RING_RADIUS - MIN_RING_RADIUS);
        let height = MIN_HEIGHT + rng.random::<f32>() * (MAX_HEIGHT - MIN_HEIGHT);
        Self {
            position: Vec3::new(angle.cos() * radius, height, angle.sin() * radius),
            phase: rng.random::<f32>() * TAU,
            speed: 0.6 + rng.random::<f32>() * 1.2,
            base: 0.55 + rng.random::<f32>() * 0.25,
            amp: 0.20 + rng.random::<f32>() * 0.25,
        }
    }

    /// Unclamped brightness at `t` seconds.
    pub fn twinkle(&self, t: f32) -> f32 {
        self.base + self.amp * (self.speed * t + self.phase).sin()
    }

    /// Rare brief spike in brightness.
    pub fn sparkle(&self, t: f32) -> f32 {
        let hash = (self.phase * 43758.5453 + t * 8.0).sin() * 0.5 + 0.5;
        if hash > SPARKLE_THRESHOLD { SPARKLE_BOOST } else { 0.0 }
    }

    pub fn alpha(&self, t: f32) -> f32 {
        (self.twinkle(t) + self.sparkle(t)).clamp(MIN_ALPHA, 1.0)
    }

    pub fn size(&self, t: f32) -> f32 {
        0.18 + 0.07 * self.twinkle(t)
    }
}

/// Vertical offset shared by every star.
pub fn bob(elapsed_ms: f64) -> f32 {
    (elapsed_ms * 0.002).sin() as f32 * BOB_AMPLITUDE
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarInstance {
    pub transform: Mat4,
    pub alpha: f32,
}

/// Every star shares one template mesh.
pub struct StarField {
    template: MeshHandle,
    stars: Vec<Star>,
}

impl StarField {
    pub fn generate(count: usize, template: MeshHandle, rng: &mut impl Rng) -> Self {
        let stars = (0..count).map(|_| Star::random(rng)).collect();
        Self { template, stars }
    }

    pub fn template(&self) -> MeshHandle {
        self.template
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn instances(&self, elapsed_ms: f64) -> impl Iterator<Item = StarInstance> + '_ {
        let t = (elapsed_ms * 0.001) as f32;
        let lift = Vec3::new(0.0, bob(elapsed_ms), 0.0);
        self.stars.iter().map(move |star| StarInstance {
            transform: Mat4::from_translation(star.position + lift)
                * Mat4::from_scale(Vec3::splat(star.size(t))),
            alpha: star.alpha(t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BufferHandle;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn field(count: usize, seed: u64) -> StarField {
        let template = MeshHandle {
            buffer: BufferHandle(3),
            vertex_count: 60,
        };
        StarField::generate(count, template, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn test_personalities_within_ranges() {
        let field = field(120, 9);
        assert_eq!(field.len(), 120);
        for star in field.stars() {
            let ring = star.position.x.hypot(star.position.z);
            assert!((119.9..350.1).contains(&ring), "ring radius {ring}");
            assert!((MIN_HEIGHT..MAX_HEIGHT).contains(&star.position.y));
            assert!((0.6..1.8).contains(&star.speed));
            assert!((0.55..0.80).contains(&star.base));
            assert!((0.20..0.45).contains(&star.amp));
        }
    }

    #[test]
    fn test_alpha_clamped_over_time() {
        let field = field(120, 2);
        for step in 0..200 {
            let t = step as f32 * 0.173;
            for star in field.stars() {
                let alpha = star.alpha(t);
                assert!((MIN_ALPHA..=1.0).contains(&alpha), "alpha {alpha} at t={t}");
            }
        }
    }

    #[test]
    fn test_sparkle_is_rare_and_fixed_size() {
        let star = field(1, 4).stars()[0].clone();
        let samples = 20_000;
        let mut hits = 0;
        for i in 0..samples {
            let s = star.sparkle(i as f32 * 0.01);
            assert!(s == 0.0 || s == SPARKLE_BOOST, "sparkle {s}");
            if s > 0.0 {
                hits += 1;
            }
        }
        assert!(hits < samples / 10, "sparkle fired {hits} times out of {samples}");
    }

    #[test]
    fn test_size_tracks_twinkle() {
        let star = field(1, 8).stars()[0].clone();
        let t = 1.25;
        assert!((star.size(t) - (0.18 + 0.07 * star.twinkle(t))).abs() < 1e-6);
    }

    #[test]
    fn test_bob_amplitude() {
        assert_eq!(bob(0.0), 0.0);
        let peak = bob(std::f64::consts::FRAC_PI_2 / 0.002);
        assert!((peak - 5.0).abs() < 1e-4, "peak {peak}");
        for ms in (0..10_000).step_by(37) {
            assert!(bob(ms as f64).abs() <= 5.0 + 1e-6);
        }
    }

    #[test]
    fn test_instances_apply_shared_bob() {
        let field = field(4, 1);
        let elapsed_ms = 785.0;
        for (instance, star) in field.instances(elapsed_ms).zip(field.stars()) {
            let origin = instance.transform.transform_point3(Vec3::ZERO);
            assert!((origin.x - star.position.x).abs() < 1e-3);
            assert!((origin.y - (star.position.y + bob(elapsed_ms))).abs() < 1e-3);
        }
    }
}

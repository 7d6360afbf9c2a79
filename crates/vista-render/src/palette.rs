//! Fixed colors per time of day.

use glam::Vec3;
use vista_scene::TimeOfDay;

/// Per-draw tint multipliers for one time of day.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tints {
    pub terrain: Vec3,
    pub sun: Vec3,
    pub moon: Vec3,
}

pub const STAR_TINT: Vec3 = Vec3::new(0.95, 0.97, 1.0);

const DAY_SKY: Vec3 = Vec3::new(0.53, 0.81, 0.98);
const SUNSET_SKY: Vec3 = Vec3::new(0.99, 0.55, 0.25);
const NIGHT_SKY: Vec3 = Vec3::new(0.02, 0.02, 0.08);

const MOON_TINT: Vec3 = Vec3::new(0.9, 0.9, 1.0);
const LOW_SUN_TINT: Vec3 = Vec3::new(1.0, 0.8, 0.3);

pub fn sky_color(time_of_day: TimeOfDay) -> Vec3 {
    match time_of_day {
        TimeOfDay::Day => DAY_SKY,
        TimeOfDay::Sunset => SUNSET_SKY,
        TimeOfDay::Night => NIGHT_SKY,
    }
}

pub fn tints(time_of_day: TimeOfDay) -> Tints {
    match time_of_day {
        TimeOfDay::Day => Tints {
            terrain: Vec3::ONE,
            sun: Vec3::new(1.0, 0.95, 0.5),
            moon: MOON_TINT,
        },
        TimeOfDay::Sunset => Tints {
            terrain: Vec3::new(1.0, 0.95, 0.85),
            sun: LOW_SUN_TINT,
            moon: MOON_TINT,
        },
        TimeOfDay::Night => Tints {
            terrain: Vec3::new(0.4, 0.45, 0.6),
            sun: LOW_SUN_TINT,
            moon: MOON_TINT,
        },
    }
}

/// Clouds pick up 30% of the sky color over white.
pub fn cloud_tint(sky: Vec3) -> Vec3 {
    sky * 0.3 + Vec3::splat(0.7)
}

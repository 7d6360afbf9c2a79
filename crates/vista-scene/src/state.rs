//! The scene aggregate every subsystem updates through.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::camera::{CameraController, CameraIntents, CameraSettings};
use crate::celestial::{CelestialSettings, CelestialSimulator};
use crate::clock::FrameTime;
use crate::clouds::{CloudField, WindState};
use crate::model::MeshHandle;
use crate::sky::{LightingMode, SceneEvent, TimeOfDay};
use crate::stars::StarField;

#[derive(Clone, Debug, PartialEq)]
pub struct SceneSettings {
    pub camera: CameraSettings,
    pub celestial: CelestialSettings,
    pub wind: WindState,
    pub time_of_day: TimeOfDay,
    pub lighting_mode: LightingMode,
    pub cloud_count: usize,
    pub star_count: usize,
    /// Seeds cloud and star personalities.
    pub field_seed: u64,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            celestial: CelestialSettings::default(),
            wind: WindState::default(),
            time_of_day: TimeOfDay::Day,
            lighting_mode: LightingMode::BlinnPhong,
            cloud_count: 8,
            star_count: 120,
            field_seed: 0,
        }
    }
}

/// Meshes that arrive from the background loader as one batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneModels {
    pub sun: MeshHandle,
    pub moon: MeshHandle,
    pub star: MeshHandle,
}

/// Everything the renderer reads to draw one frame.
pub struct SceneState {
    pub time_of_day: TimeOfDay,
    pub lighting_mode: LightingMode,
    pub wind: WindState,
    pub camera: CameraController,
    pub celestial: CelestialSimulator,
    /// `None` until the model batch resolves.
    pub clouds: Option<CloudField>,
    pub stars: Option<StarField>,
    frame: FrameTime,
    cloud_count: usize,
    star_count: usize,
    field_seed: u64,
}

impl SceneState {
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            time_of_day: settings.time_of_day,
            lighting_mode: settings.lighting_mode,
            wind: settings.wind,
            camera: CameraController::new(settings.camera),
            celestial: CelestialSimulator::new(settings.celestial, settings.time_of_day),
            clouds: None,
            stars: None,
            frame: FrameTime::default(),
            cloud_count: settings.cloud_count,
            star_count: settings.star_count,
            field_seed: settings.field_seed,
        }
    }

    /// Advance every subsystem by one frame.
    pub fn update(&mut self, frame: FrameTime, intents: CameraIntents) {
        self.frame = frame;
        self.camera.update(intents, frame.delta_ms as f32);
        self.celestial.advance(frame.delta_ms, self.time_of_day);
    }

    pub fn apply_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::SetTimeOfDay(time_of_day) => {
                self.time_of_day = time_of_day;
                info!("Switched to {}", time_of_day.label());
            }
            SceneEvent::ToggleLighting => {
                self.lighting_mode = self.lighting_mode.toggled();
                info!("Lighting mode: {}", self.lighting_mode.label());
            }
        }
    }

    /// Hand the loaded meshes to the sun, moon, clouds and stars. Clouds reuse
    /// the sun mesh.
    pub fn attach_models(&mut self, models: SceneModels) {
        self.celestial.attach_models(models.sun, models.moon);

        let mut rng = ChaCha8Rng::seed_from_u64(self.field_seed);
        self.stars = Some(StarField::generate(self.star_count, models.star, &mut rng));
        self.clouds = Some(CloudField::generate(self.cloud_count, models.sun, &mut rng));
        info!(
            stars = self.star_count,
            clouds = self.cloud_count,
            "sky models attached"
        );
    }

    /// The frame most recently passed to [`Self::update`].
    pub fn frame(&self) -> FrameTime {
        self.frame
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.frame.elapsed_secs() as f32
    }
}

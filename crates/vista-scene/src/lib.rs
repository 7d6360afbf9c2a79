//! Per-frame scene simulation for the Vista viewer.
//!
//! [`SceneState`] aggregates every time-driven subsystem: the orbit camera,
//! the sun and moon, clouds and stars. Each subsystem only sees the slice of
//! frame input it needs. Rendering reads the state and never writes it.

pub mod camera;
pub mod celestial;
pub mod clock;
pub mod clouds;
pub mod model;
pub mod sky;
pub mod stars;
pub mod state;

pub use camera::{CameraController, CameraIntents, CameraSettings, CameraState};
pub use celestial::{CelestialSettings, CelestialSimulator, OrbitParams, active_light};
pub use clock::{FrameClock, FrameTime, MAX_FRAME_MS};
pub use clouds::{Cloud, CloudField, CloudInstance, WindState};
pub use model::{BufferHandle, MeshHandle, Model};
pub use sky::{LightingMode, SceneEvent, TimeOfDay};
pub use stars::{Star, StarField, StarInstance};
pub use state::{SceneModels, SceneSettings, SceneState};

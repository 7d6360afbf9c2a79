use serde::{Deserialize, Serialize};

/// Discrete sky mode. Changed only by input, never by simulated time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[default]
    Day,
    Sunset,
    Night,
}

impl TimeOfDay {
    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Sunset => "SUNSET",
            Self::Night => "NIGHT",
        }
    }

    pub fn is_night(self) -> bool {
        self == Self::Night
    }
}

/// Shading model selected in the fragment shader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightingMode {
    #[default]
    BlinnPhong,
    Toon,
}

impl LightingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::BlinnPhong => Self::Toon,
            Self::Toon => Self::BlinnPhong,
        }
    }

    /// Value uploaded as `u_LightingMode`.
    pub fn as_uniform(self) -> f32 {
        match self {
            Self::BlinnPhong => 0.0,
            Self::Toon => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BlinnPhong => "Blinn-Phong",
            Self::Toon => "Toon",
        }
    }
}

/// One-shot state changes produced by key presses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    SetTimeOfDay(TimeOfDay),
    ToggleLighting,
}

//! Key bindings for the orbit camera and the sky controls.

use vista_scene::{CameraIntents, SceneEvent, TimeOfDay};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::keyboard::KeyboardState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlMap {
    pub zoom_out: KeyCode,
    pub zoom_in: KeyCode,
    pub orbit_left: KeyCode,
    pub orbit_right: KeyCode,
    pub raise: KeyCode,
    pub lower: KeyCode,
    pub pitch_up: KeyCode,
    pub pitch_down: KeyCode,
    pub day: KeyCode,
    pub sunset: KeyCode,
    pub night: KeyCode,
    pub toggle_lighting: KeyCode,
    pub quit: KeyCode,
}

impl Default for ControlMap {
    fn default() -> Self {
        Self {
            zoom_out: KeyCode::KeyW,
            zoom_in: KeyCode::KeyS,
            orbit_left: KeyCode::KeyA,
            orbit_right: KeyCode::KeyD,
            raise: KeyCode::KeyR,
            lower: KeyCode::KeyF,
            pitch_up: KeyCode::ArrowUp,
            pitch_down: KeyCode::ArrowDown,
            day: KeyCode::Digit1,
            sunset: KeyCode::Digit2,
            night: KeyCode::Digit3,
            toggle_lighting: KeyCode::KeyT,
            quit: KeyCode::Escape,
        }
    }
}

impl ControlMap {
    /// Continuous camera motion for every held binding.
    pub fn held_intents(&self, keyboard: &KeyboardState) -> CameraIntents {
        let held = |code| keyboard.is_pressed(PhysicalKey::Code(code));
        CameraIntents {
            zoom_out: held(self.zoom_out),
            zoom_in: held(self.zoom_in),
            orbit_left: held(self.orbit_left),
            orbit_right: held(self.orbit_right),
            raise: held(self.raise),
            lower: held(self.lower),
            pitch_up: held(self.pitch_up),
            pitch_down: held(self.pitch_down),
        }
    }

    /// One event per binding pressed this frame. Time-of-day keys come first
    /// in 1, 2, 3 order so the highest pressed one wins.
    pub fn discrete_events(&self, keyboard: &KeyboardState) -> Vec<SceneEvent> {
        let pressed = |code| keyboard.just_pressed(PhysicalKey::Code(code));
        let mut events: Vec<SceneEvent> = [
            (self.day, TimeOfDay::Day),
            (self.sunset, TimeOfDay::Sunset),
            (self.night, TimeOfDay::Night),
        ]
        .into_iter()
        .filter(|&(code, _)| pressed(code))
        .map(|(_, time_of_day)| SceneEvent::SetTimeOfDay(time_of_day))
        .collect();

        if pressed(self.toggle_lighting) {
            events.push(SceneEvent::ToggleLighting);
        }
        events
    }

    pub fn quit_requested(&self, keyboard: &KeyboardState) -> bool {
        keyboard.just_pressed(PhysicalKey::Code(self.quit))
    }
}

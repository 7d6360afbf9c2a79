//! Keyboard handling for the Vista viewer.
//!
//! Window events feed a [`KeyboardState`]; once per frame the
//! [`ControlMap`] turns it into held camera intents and one-shot scene
//! events.

mod controls;
mod keyboard;

pub use controls::ControlMap;
pub use keyboard::{KeyboardState, RawKeyEvent};

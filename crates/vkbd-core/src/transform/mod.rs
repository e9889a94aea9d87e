// Vkbd Transform Module
// Turns virtual key transitions into logical key events

pub mod capslock;
pub mod deadkeys;
pub mod engine;

pub use capslock::CapsLockState;
pub use deadkeys::{compose, undead_key, Composition, DeadKeyState};
pub use engine::{EventSynthesizer, KeyEvent, KeyboardConfig};

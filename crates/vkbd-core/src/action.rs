// Vkbd Actions
// Press/release actions and widget activation events

use std::fmt;

/// Type of a synthesized key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Release,
    Press,
}

impl Action {
    /// Returns true if the action is PRESS
    pub fn is_pressed(self) -> bool {
        matches!(self, Action::Press)
    }

    /// Returns true if this is a RELEASE event
    pub fn is_released(self) -> bool {
        matches!(self, Action::Release)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
        }
    }
}

/// Interaction a virtual key widget reports to the keyboard.
///
/// Pointer input comes from clicks on the key itself, key input from
/// physical key events the host forwards to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetEvent {
    PointerPress,
    PointerDoubleClick,
    PointerRelease,
    KeyPress,
    KeyRelease,
}

impl WidgetEvent {
    /// Whether this interaction activates (true) or deactivates (false) a key
    pub fn is_activation(self) -> bool {
        matches!(
            self,
            WidgetEvent::PointerPress | WidgetEvent::PointerDoubleClick | WidgetEvent::KeyPress
        )
    }
}

// Vkbd Core Library
// Virtual keyboard engine: key bindings, modifier roles, dead keys and event synthesis

pub mod action;
pub mod binding;
pub mod key;
pub mod keyboard;
pub mod modifier;
pub mod state;
pub mod transform;

#[cfg(feature = "layout-files")]
pub mod layout;

#[cfg(feature = "layout-files")]
pub mod settings;

pub use action::{Action, WidgetEvent};
pub use binding::{BoundKey, KeyBinding, KeySlot, Layer, VirtualKey};
pub use key::{key_from_name, key_from_name_or_unknown, KeyCode, SPECIAL_KEY_BASE};
pub use keyboard::{
    EventRecorder, KeyEventReceiver, KeyboardError, ReceiverId, SharedKeyboard, VirtualKeyboard,
};
pub use modifier::{ModifierError, ModifierRole, ModifierTracker, Modifiers};
pub use state::KeyRegistry;
pub use transform::{EventSynthesizer, KeyEvent, KeyboardConfig};

#[cfg(feature = "layout-files")]
pub use layout::{KeyLayout, Layout, LayoutError, LayoutReport};

#[cfg(feature = "layout-files")]
pub use settings::{Settings, SettingsError};

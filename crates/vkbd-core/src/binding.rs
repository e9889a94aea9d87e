// Vkbd Key Bindings
// The four logical codes a virtual key carries, plus the key record itself

use std::fmt;

use crate::KeyCode;

/// One of the four binding layers of a virtual key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Default,
    Shift,
    Alt,
    AltShift,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Default, Layer::Shift, Layer::Alt, Layer::AltShift];

    /// Name of the layer as used in layout documents
    pub fn name(self) -> &'static str {
        match self {
            Layer::Default => "default",
            Layer::Shift => "shift",
            Layer::Alt => "alt",
            Layer::AltShift => "altshift",
        }
    }

    pub fn from_name(name: &str) -> Option<Layer> {
        Layer::ALL.into_iter().find(|layer| layer.name() == name)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key code and face content of one layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySlot {
    pub key: KeyCode,
    pub text: String,
    pub icon: Option<String>,
}

impl KeySlot {
    pub fn new(key: KeyCode, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
            icon: None,
        }
    }

    /// Slot whose face text is the key's own character
    pub fn from_key(key: KeyCode) -> Self {
        Self::new(key, key.to_char().map(String::from).unwrap_or_default())
    }
}

/// Logical codes and display content bound to one virtual key.
///
/// Any layer may be left at [`KeyCode::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBinding {
    pub default: KeySlot,
    pub shift: KeySlot,
    pub alt: KeySlot,
    pub alt_shift: KeySlot,
}

impl KeyBinding {
    /// Binding with only the default layer set
    pub fn new(key: KeyCode) -> Self {
        Self {
            default: KeySlot::from_key(key),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self, key: KeyCode) -> Self {
        self.shift = KeySlot::from_key(key);
        self
    }

    pub fn with_alt(mut self, key: KeyCode) -> Self {
        self.alt = KeySlot::from_key(key);
        self
    }

    pub fn with_alt_shift(mut self, key: KeyCode) -> Self {
        self.alt_shift = KeySlot::from_key(key);
        self
    }

    pub fn slot(&self, layer: Layer) -> &KeySlot {
        match layer {
            Layer::Default => &self.default,
            Layer::Shift => &self.shift,
            Layer::Alt => &self.alt,
            Layer::AltShift => &self.alt_shift,
        }
    }

    pub fn slot_mut(&mut self, layer: Layer) -> &mut KeySlot {
        match layer {
            Layer::Default => &mut self.default,
            Layer::Shift => &mut self.shift,
            Layer::Alt => &mut self.alt,
            Layer::AltShift => &mut self.alt_shift,
        }
    }

    pub fn key(&self, layer: Layer) -> KeyCode {
        self.slot(layer).key
    }

    pub fn default_key(&self) -> KeyCode {
        self.default.key
    }

    pub fn shift_key(&self) -> KeyCode {
        self.shift.key
    }

    pub fn alt_key(&self) -> KeyCode {
        self.alt.key
    }

    pub fn alt_shift_key(&self) -> KeyCode {
        self.alt_shift.key
    }
}

/// Read-only view of a virtual key, as the keyboard engine needs it.
///
/// Widget layers implement this for their own key type; [`VirtualKey`] is the
/// plain record used when the keyboard owns its keys.
pub trait BoundKey {
    fn binding(&self) -> &KeyBinding;

    fn is_checkable(&self) -> bool {
        false
    }

    fn is_checked(&self) -> bool {
        false
    }

    fn auto_repeat(&self) -> bool {
        false
    }
}

/// A named virtual key record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualKey {
    name: String,
    binding: KeyBinding,
    checkable: bool,
    checked: bool,
    auto_repeat: bool,
}

impl VirtualKey {
    pub fn new(name: impl Into<String>, binding: KeyBinding) -> Self {
        Self {
            name: name.into(),
            binding,
            ..Self::default()
        }
    }

    /// Make this a toggle key
    pub fn checkable(mut self) -> Self {
        self.checkable = true;
        self
    }

    pub fn with_auto_repeat(mut self, auto_repeat: bool) -> Self {
        self.auto_repeat = auto_repeat;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_auto_repeat(&mut self, auto_repeat: bool) {
        self.auto_repeat = auto_repeat;
    }

    pub fn binding_mut(&mut self) -> &mut KeyBinding {
        &mut self.binding
    }

    pub fn set_checkable(&mut self, checkable: bool) {
        self.checkable = checkable;
        if !checkable {
            self.checked = false;
        }
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = self.checkable && checked;
    }

    /// Flip the checked state of a checkable key
    pub fn toggle(&mut self) {
        if self.checkable {
            self.checked = !self.checked;
        }
    }
}

impl BoundKey for VirtualKey {
    fn binding(&self) -> &KeyBinding {
        &self.binding
    }

    fn is_checkable(&self) -> bool {
        self.checkable
    }

    fn is_checked(&self) -> bool {
        self.checked
    }

    fn auto_repeat(&self) -> bool {
        self.auto_repeat
    }
}

impl BoundKey for KeyBinding {
    fn binding(&self) -> &KeyBinding {
        self
    }
}

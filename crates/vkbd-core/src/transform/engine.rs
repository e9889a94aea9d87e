// Vkbd Event Synthesizer
// Turns a press or release on a bound virtual key into a logical key event
//
// Every notification runs the same fixed pipeline:
// - role keys feed the modifier tracker and resolve to Key_unknown
// - the binding layer is picked from the held roles (alt+shift, shift, alt, none)
// - standard modifiers (Shift/Control/Alt/Meta) bound to ordinary keys are remembered
// - caps lock places or removes a virtual hold on the shift role
// - dead keys compose with the next press
// - text is derived from the final key and case folded for auto-shifting

use std::fmt;

use crate::binding::{BoundKey, Layer};
use crate::modifier::{ModifierError, ModifierRole, ModifierTracker, Modifiers};
use crate::transform::capslock::CapsLockState;
use crate::transform::deadkeys::{Composition, DeadKeyState};
use crate::{Action, KeyCode};

/// Configuration for the event synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardConfig {
    shift_modifier: KeyCode,
    alt_modifier: KeyCode,
    /// Derive upper/lower case from a single default binding
    pub auto_shifting: bool,
    /// Let dead keys combine with the next key
    pub dead_keys: bool,
    /// Let caps lock hold the shift role
    pub caps_lock: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            shift_modifier: KeyCode::Shift,
            alt_modifier: KeyCode::AltGr,
            auto_shifting: true,
            dead_keys: true,
            caps_lock: true,
        }
    }
}

impl KeyboardConfig {
    /// Create a configuration with the given role keys and every behavior on
    pub fn new(shift_modifier: KeyCode, alt_modifier: KeyCode) -> Result<Self, ModifierError> {
        if shift_modifier == alt_modifier {
            return Err(ModifierError::RoleConflict {
                role: ModifierRole::Alt,
                other: ModifierRole::Shift,
                key: alt_modifier,
            });
        }
        Ok(Self {
            shift_modifier,
            alt_modifier,
            ..Self::default()
        })
    }

    pub fn with_auto_shifting(mut self, enabled: bool) -> Self {
        self.auto_shifting = enabled;
        self
    }

    pub fn with_dead_keys(mut self, enabled: bool) -> Self {
        self.dead_keys = enabled;
        self
    }

    pub fn with_caps_lock(mut self, enabled: bool) -> Self {
        self.caps_lock = enabled;
        self
    }

    pub fn shift_modifier(&self) -> KeyCode {
        self.shift_modifier
    }

    pub fn alt_modifier(&self) -> KeyCode {
        self.alt_modifier
    }

    /// The key configured for `role`
    pub fn role_key(&self, role: ModifierRole) -> KeyCode {
        match role {
            ModifierRole::Shift => self.shift_modifier,
            ModifierRole::Alt => self.alt_modifier,
        }
    }

    /// Set the key that unlocks the shift layer.
    ///
    /// Rejected if it is the current alt modifier; the previous value stays.
    pub fn set_shift_modifier(&mut self, key: KeyCode) -> Result<(), ModifierError> {
        self.set_role_key(ModifierRole::Shift, key)
    }

    /// Set the key that unlocks the alt layer.
    ///
    /// Rejected if it is the current shift modifier; the previous value stays.
    pub fn set_alt_modifier(&mut self, key: KeyCode) -> Result<(), ModifierError> {
        self.set_role_key(ModifierRole::Alt, key)
    }

    pub fn set_role_key(&mut self, role: ModifierRole, key: KeyCode) -> Result<(), ModifierError> {
        let other = match role {
            ModifierRole::Shift => ModifierRole::Alt,
            ModifierRole::Alt => ModifierRole::Shift,
        };
        if self.role_key(other) == key {
            log::warn!("Refusing to use {} as {} modifier, it is the {} modifier", key, role, other);
            return Err(ModifierError::RoleConflict { role, other, key });
        }
        match role {
            ModifierRole::Shift => self.shift_modifier = key,
            ModifierRole::Alt => self.alt_modifier = key,
        }
        Ok(())
    }
}

/// A synthesized logical key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub action: Action,
    pub key: KeyCode,
    pub modifiers: Modifiers,
    pub text: String,
    pub auto_repeat: bool,
}

impl KeyEvent {
    pub fn new(action: Action, key: KeyCode, modifiers: Modifiers, text: impl Into<String>) -> Self {
        Self {
            action,
            key,
            modifiers,
            text: text.into(),
            auto_repeat: false,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {:?}",
            self.action, self.key, self.modifiers, self.text
        )?;
        if self.auto_repeat {
            write!(f, " autorepeat")?;
        }
        Ok(())
    }
}

/// Layer picked for a key, and how its text should be case folded
#[derive(Debug, Clone, Copy)]
struct Resolution {
    key: KeyCode,
    modifiers: Modifiers,
    fold: CaseFold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseFold {
    /// Default binding used in place of a missing shift binding
    Upper,
    /// Default binding with no role held, or an alt layer binding
    Lower,
    /// An explicit shift binding or a role key, text is kept as is
    Keep,
}

/// Key event synthesizer.
///
/// Owns all per-keyboard state: role key counts, the pending dead key, the
/// caps lock hold and the remembered standard modifiers. Notifications must
/// be delivered one at a time.
#[derive(Debug, Clone, Default)]
pub struct EventSynthesizer {
    config: KeyboardConfig,
    modifiers: ModifierTracker,
    deadkeys: DeadKeyState,
    capslock: CapsLockState,
    remembered: Modifiers,
}

impl EventSynthesizer {
    /// Create a new synthesizer with given configuration
    pub fn new(config: KeyboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    /// Mutable access to the configuration; role keys stay validated by its setters
    pub fn config_mut(&mut self) -> &mut KeyboardConfig {
        &mut self.config
    }

    /// Whether the key configured for `role` is currently held
    pub fn is_role_active(&self, role: ModifierRole) -> bool {
        self.modifiers.is_active(self.config.role_key(role))
    }

    pub fn modifier_tracker(&self) -> &ModifierTracker {
        &self.modifiers
    }

    pub fn pending_dead_key(&self) -> Option<KeyCode> {
        self.deadkeys.pending()
    }

    pub fn is_caps_lock_engaged(&self) -> bool {
        self.capslock.is_engaged()
    }

    /// Standard modifiers currently held through ordinary keys
    pub fn remembered_modifiers(&self) -> Modifiers {
        self.remembered
    }

    /// Drop all held modifiers and any pending dead key
    pub fn reset(&mut self) {
        self.modifiers.clear();
        self.deadkeys.clear();
        self.capslock.clear();
        self.remembered = Modifiers::empty();
    }

    /// Process a single press or release of a bound key.
    ///
    /// Returns `None` only when a dead key was swallowed to await the next
    /// key; every other notification yields an event, possibly for
    /// [`KeyCode::Unknown`] with empty text.
    pub fn process(&mut self, key: &dyn BoundKey, action: Action) -> Option<KeyEvent> {
        let binding = key.binding();
        let pressed = action.is_pressed();

        let mut resolution = self.resolve(key, pressed);

        // Remember standard modifiers bound to keys outside the role system
        let standard = Modifiers::from_key(resolution.key);
        if pressed {
            self.remembered |= standard;
        } else {
            self.remembered.remove(standard);
        }

        if self.config.caps_lock {
            if pressed && resolution.key == KeyCode::CapsLock {
                self.capslock
                    .on_caps_lock_struck(true, self.config.shift_modifier, &mut self.modifiers);
            } else if !pressed
                && self.capslock.is_engaged()
                && (resolution.key == KeyCode::CapsLock
                    || binding.default_key() == KeyCode::CapsLock)
            {
                self.capslock
                    .on_caps_lock_struck(false, self.config.shift_modifier, &mut self.modifiers);
            }
        }

        if self.config.dead_keys && pressed {
            match self.deadkeys.on_key_press(resolution.key) {
                Composition::Suppressed => {
                    log::debug!("Dead key {} pending", resolution.key);
                    return None;
                }
                Composition::Resolved(composed) => resolution.key = composed,
            }
        }

        let mut text = resolution.key.text();
        if self.config.auto_shifting {
            match resolution.fold {
                CaseFold::Upper => text = text.to_uppercase(),
                CaseFold::Lower => text = text.to_lowercase(),
                CaseFold::Keep => {}
            }
        }

        let event = KeyEvent {
            action,
            key: resolution.key,
            modifiers: resolution.modifiers | self.remembered,
            text,
            auto_repeat: key.auto_repeat(),
        };
        log::debug!("Synthesized {}", event);
        Some(event)
    }

    /// Pick the layer for `key` from the held roles
    fn resolve(&mut self, key: &dyn BoundKey, pressed: bool) -> Resolution {
        let binding = key.binding();
        let shift_role = self.config.shift_modifier;
        let alt_role = self.config.alt_modifier;
        let default_key = binding.default_key();

        // Role keys only change the counts, they never produce a key
        if default_key == shift_role || default_key == alt_role {
            self.modifiers.on_key_event(default_key, pressed);
            return Resolution {
                key: KeyCode::Unknown,
                modifiers: Modifiers::empty(),
                fold: CaseFold::Keep,
            };
        }

        let shift = self.modifiers.is_active(shift_role);
        let alt = self.modifiers.is_active(alt_role);

        match (shift, alt) {
            (true, true) => Resolution {
                key: binding.key(Layer::AltShift),
                modifiers: Modifiers::from_key(alt_role) | Modifiers::from_key(shift_role),
                fold: CaseFold::Lower,
            },
            (true, false) => {
                let shift_key = binding.key(Layer::Shift);
                let (key, fold) = if self.config.auto_shifting && shift_key.is_unknown() {
                    (default_key, CaseFold::Upper)
                } else {
                    (shift_key, CaseFold::Keep)
                };
                Resolution {
                    key,
                    modifiers: Modifiers::from_key(shift_role),
                    fold,
                }
            }
            (false, true) => Resolution {
                key: binding.key(Layer::Alt),
                modifiers: Modifiers::from_key(alt_role),
                fold: CaseFold::Lower,
            },
            (false, false) => Resolution {
                key: default_key,
                modifiers: Modifiers::empty(),
                fold: CaseFold::Lower,
            },
        }
    }
}

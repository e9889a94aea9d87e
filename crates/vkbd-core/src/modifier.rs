// Vkbd Modifier System
// Standard modifier flags and role-based modifier counting

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::KeyCode;

bitflags! {
    /// Standard keyboard modifier flags carried on synthesized events
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const SHIFT = 0x0200_0000;
        const CONTROL = 0x0400_0000;
        const ALT = 0x0800_0000;
        const META = 0x1000_0000;
    }
}

impl Modifiers {
    /// Map a key to the standard modifier it stands for.
    ///
    /// Only Shift, Control, Alt and Meta map to a flag; every other key,
    /// including AltGr, yields an empty set.
    pub fn from_key(key: KeyCode) -> Modifiers {
        match key {
            KeyCode::Shift => Modifiers::SHIFT,
            KeyCode::Control => Modifiers::CONTROL,
            KeyCode::Alt => Modifiers::ALT,
            KeyCode::Meta => Modifiers::META,
            _ => Modifiers::empty(),
        }
    }

    pub fn shift_key(&self) -> bool {
        self.intersects(Self::SHIFT)
    }

    pub fn control_key(&self) -> bool {
        self.intersects(Self::CONTROL)
    }

    pub fn alt_key(&self) -> bool {
        self.intersects(Self::ALT)
    }

    pub fn meta_key(&self) -> bool {
        self.intersects(Self::META)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Which alternate layer a configured modifier key unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierRole {
    Shift,
    Alt,
}

impl fmt::Display for ModifierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierRole::Shift => write!(f, "shift"),
            ModifierRole::Alt => write!(f, "alt"),
        }
    }
}

/// Errors raised when configuring modifier roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModifierError {
    #[error("{role} modifier cannot be {key}, it is already the {other} modifier")]
    RoleConflict {
        role: ModifierRole,
        other: ModifierRole,
        key: KeyCode,
    },
}

/// Counts how many virtual keys are currently holding each role key.
///
/// Layouts may expose the same role twice (left and right shift), so a
/// plain boolean would clear the role while the other key is still down.
/// Uses SmallVec since only a handful of role keys are ever tracked.
#[derive(Debug, Clone, Default)]
pub struct ModifierTracker {
    counts: SmallVec<[(KeyCode, u32); 4]>,
}

impl ModifierTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release of `key`
    pub fn on_key_event(&mut self, key: KeyCode, pressed: bool) {
        let index = match self.counts.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                self.counts.push((key, 0));
                self.counts.len() - 1
            }
        };
        let slot = &mut self.counts[index].1;

        if pressed {
            *slot += 1;
        } else if *slot == 0 {
            log::warn!("Release of {} without a matching press, ignoring", key);
        } else {
            *slot -= 1;
        }
    }

    /// Number of concurrently held occurrences of `key`
    pub fn count(&self, key: KeyCode) -> u32 {
        self.counts
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn is_active(&self, key: KeyCode) -> bool {
        self.count(key) > 0
    }

    /// Forget every held key
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

// Vkbd Dead Keys
// Dead-key classification and composition tables

use crate::KeyCode;

/// Classification of a key for dead-key composition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadKeyKind {
    Normal,
    Dead,
}

impl DeadKeyKind {
    pub fn classify(key: KeyCode) -> Self {
        if key.is_dead() {
            Self::Dead
        } else {
            Self::Normal
        }
    }
}

/// Result of feeding a key press through the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// A dead key is now pending, nothing should be emitted
    Suppressed,
    /// Emit this key (possibly [`KeyCode::Unknown`])
    Resolved(KeyCode),
}

/// Single-slot dead key state machine.
///
/// `Idle --dead--> Pending`, `Pending --same dead--> Idle` (emits the undead
/// form), `Pending --normal--> Idle` (emits the composed letter),
/// `Pending --other dead--> Pending` (replaces the pending key).
#[derive(Debug, Clone, Default)]
pub struct DeadKeyState {
    pending: Option<KeyCode>,
}

impl DeadKeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<KeyCode> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Feed a key press through the composer.
    ///
    /// [`KeyCode::Unknown`] passes through without touching a pending dead
    /// key, so role keys pressed between the accent and the letter do not
    /// cancel the composition.
    pub fn on_key_press(&mut self, key: KeyCode) -> Composition {
        match DeadKeyKind::classify(key) {
            DeadKeyKind::Dead => {
                if self.pending == Some(key) {
                    self.pending = None;
                    Composition::Resolved(undead_key(key).unwrap_or(KeyCode::Unknown))
                } else {
                    if let Some(previous) = self.pending {
                        log::debug!("Dead key {} replaces pending {}", key, previous);
                    }
                    self.pending = Some(key);
                    Composition::Suppressed
                }
            }
            DeadKeyKind::Normal => match self.pending {
                Some(dead) if !key.is_unknown() => {
                    self.pending = None;
                    Composition::Resolved(compose(dead, key).unwrap_or(KeyCode::Unknown))
                }
                _ => Composition::Resolved(key),
            },
        }
    }
}

/// The standalone character a dead key produces when struck twice.
///
/// Only acute, circumflex, tilde, macron, diaeresis and cedilla have one.
pub fn undead_key(dead: KeyCode) -> Option<KeyCode> {
    let undead = match dead {
        KeyCode::DeadAcute => KeyCode::Acute,
        KeyCode::DeadCircumflex => KeyCode::AsciiCircum,
        KeyCode::DeadTilde => KeyCode::AsciiTilde,
        KeyCode::DeadMacron => KeyCode::Macron,
        KeyCode::DeadDiaeresis => KeyCode::Diaeresis,
        KeyCode::DeadCedilla => KeyCode::Cedilla,
        _ => return None,
    };
    Some(undead)
}

/// Combine a dead key with a base key into a precomposed key.
///
/// Order does not matter, but exactly one of the two must be dead.
pub fn compose(first: KeyCode, second: KeyCode) -> Option<KeyCode> {
    let (dead, base) = match (first.is_dead(), second.is_dead()) {
        (true, false) => (first, second),
        (false, true) => (second, first),
        _ => return None,
    };

    let out = match dead {
        KeyCode::DeadGrave => match base {
            KeyCode::A => KeyCode::Agrave,
            KeyCode::E => KeyCode::Egrave,
            KeyCode::I => KeyCode::Igrave,
            KeyCode::O => KeyCode::Ograve,
            KeyCode::U => KeyCode::Ugrave,
            _ => return None,
        },
        KeyCode::DeadAcute => match base {
            KeyCode::A => KeyCode::Aacute,
            KeyCode::E => KeyCode::Eacute,
            KeyCode::I => KeyCode::Iacute,
            KeyCode::O => KeyCode::Oacute,
            KeyCode::U => KeyCode::Uacute,
            KeyCode::Y => KeyCode::Yacute,
            _ => return None,
        },
        KeyCode::DeadCircumflex => match base {
            KeyCode::A => KeyCode::Acircumflex,
            KeyCode::E => KeyCode::Ecircumflex,
            KeyCode::I => KeyCode::Icircumflex,
            KeyCode::O => KeyCode::Ocircumflex,
            KeyCode::U => KeyCode::Ucircumflex,
            _ => return None,
        },
        KeyCode::DeadTilde => match base {
            KeyCode::A => KeyCode::Atilde,
            KeyCode::N => KeyCode::Ntilde,
            KeyCode::O => KeyCode::Otilde,
            _ => return None,
        },
        KeyCode::DeadDiaeresis => match base {
            KeyCode::A => KeyCode::Adiaeresis,
            KeyCode::E => KeyCode::Ediaeresis,
            KeyCode::I => KeyCode::Idiaeresis,
            KeyCode::O => KeyCode::Odiaeresis,
            KeyCode::U => KeyCode::Udiaeresis,
            KeyCode::Y => KeyCode::Ydiaeresis,
            _ => return None,
        },
        KeyCode::DeadAbovering => match base {
            KeyCode::A => KeyCode::Aring,
            _ => return None,
        },
        KeyCode::DeadCedilla => match base {
            KeyCode::C => KeyCode::Ccedilla,
            _ => return None,
        },
        _ => return None,
    };

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_dead_key_activation() {
        let mut state = DeadKeyState::new();
        assert_eq!(state.on_key_press(KeyCode::DeadAcute), Composition::Suppressed);
        assert!(state.is_active());
        assert_eq!(state.pending(), Some(KeyCode::DeadAcute));
    }

    #[test]
    fn test_compose_acute() {
        let mut state = DeadKeyState::new();
        state.on_key_press(KeyCode::DeadAcute);
        assert_eq!(
            state.on_key_press(KeyCode::E),
            Composition::Resolved(KeyCode::Eacute)
        );
        assert!(!state.is_active());
    }

    #[test]
    fn test_compose_without_table_entry_is_unknown() {
        let mut state = DeadKeyState::new();
        state.on_key_press(KeyCode::DeadTilde);
        assert_eq!(
            state.on_key_press(KeyCode::Q),
            Composition::Resolved(KeyCode::Unknown)
        );
        assert!(!state.is_active());
    }

    #[test]
    fn test_same_dead_key_twice_gives_undead() {
        let mut state = DeadKeyState::new();
        state.on_key_press(KeyCode::DeadCircumflex);
        assert_eq!(
            state.on_key_press(KeyCode::DeadCircumflex),
            Composition::Resolved(KeyCode::AsciiCircum)
        );

        state.on_key_press(KeyCode::DeadGrave);
        assert_eq!(
            state.on_key_press(KeyCode::DeadGrave),
            Composition::Resolved(KeyCode::Unknown)
        );
        assert!(!state.is_active());
    }

    #[test]
    fn test_different_dead_key_replaces_pending() {
        let mut state = DeadKeyState::new();
        state.on_key_press(KeyCode::DeadAcute);
        assert_eq!(state.on_key_press(KeyCode::DeadGrave), Composition::Suppressed);
        assert_eq!(state.pending(), Some(KeyCode::DeadGrave));
        assert_eq!(
            state.on_key_press(KeyCode::A),
            Composition::Resolved(KeyCode::Agrave)
        );
    }

    #[test]
    fn test_unknown_keeps_pending() {
        let mut state = DeadKeyState::new();
        state.on_key_press(KeyCode::DeadCedilla);
        assert_eq!(
            state.on_key_press(KeyCode::Unknown),
            Composition::Resolved(KeyCode::Unknown)
        );
        assert_eq!(
            state.on_key_press(KeyCode::C),
            Composition::Resolved(KeyCode::Ccedilla)
        );
    }

    #[test]
    fn test_normal_key_passes_through_when_idle() {
        let mut state = DeadKeyState::new();
        assert_eq!(state.on_key_press(KeyCode::Z), Composition::Resolved(KeyCode::Z));
    }

    #[test]
    fn test_compose_is_order_independent_and_rejects_pairs() {
        assert_eq!(compose(KeyCode::A, KeyCode::DeadAbovering), Some(KeyCode::Aring));
        assert_eq!(compose(KeyCode::DeadAcute, KeyCode::DeadGrave), None);
        assert_eq!(compose(KeyCode::A, KeyCode::B), None);
    }

    #[test]
    fn test_every_composed_key_is_a_printable_letter() {
        for dead in KeyCode::iter().filter(|k| k.is_dead()) {
            for base in KeyCode::iter().filter(|k| !k.is_dead()) {
                if let Some(out) = compose(dead, base) {
                    let ch = out.to_char().expect("composed keys are characters");
                    assert!(ch.is_alphabetic(), "{} + {} -> {}", dead, base, out);
                }
            }
        }
    }

    #[test]
    fn test_undead_forms_are_printable() {
        let with_undead: Vec<KeyCode> = KeyCode::iter()
            .filter(|k| k.is_dead())
            .filter_map(undead_key)
            .collect();
        assert_eq!(with_undead.len(), 6);
        assert!(with_undead.iter().all(|k| !k.text().is_empty()));
    }
}

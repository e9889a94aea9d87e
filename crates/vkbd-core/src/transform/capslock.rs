// Vkbd Caps Lock
// Caps lock as virtual holds on the shift role

use smallvec::SmallVec;

use crate::modifier::ModifierTracker;
use crate::KeyCode;

/// Models caps lock as a virtual hold on the shift-role key.
///
/// Every caps lock press adds one hold to the shift-role counter, exactly as
/// a held shift key would, and every release removes one. Each hold records
/// the key it was placed on, so a release never takes away a hold belonging
/// to a real shift key.
#[derive(Debug, Clone, Default)]
pub struct CapsLockState {
    holds: SmallVec<[KeyCode; 2]>,
}

impl CapsLockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        !self.holds.is_empty()
    }

    /// Number of caps lock holds currently placed
    pub fn holds(&self) -> usize {
        self.holds.len()
    }

    /// Apply a caps lock strike to the shift-role count.
    ///
    /// A release goes to the key its hold was placed on, even if the shift
    /// role was reassigned in between.
    pub fn on_caps_lock_struck(
        &mut self,
        pressed: bool,
        shift_key: KeyCode,
        tracker: &mut ModifierTracker,
    ) {
        if pressed {
            self.holds.push(shift_key);
            tracker.on_key_event(shift_key, true);
        } else if let Some(held) = self.holds.pop() {
            tracker.on_key_event(held, false);
        } else {
            log::debug!("Caps lock released without a hold, ignoring");
        }
    }

    pub fn clear(&mut self) {
        self.holds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_lock_holds_shift() {
        let mut caps = CapsLockState::new();
        let mut tracker = ModifierTracker::new();

        caps.on_caps_lock_struck(true, KeyCode::Shift, &mut tracker);
        assert!(caps.is_engaged());
        assert!(tracker.is_active(KeyCode::Shift));

        caps.on_caps_lock_struck(false, KeyCode::Shift, &mut tracker);
        assert!(!caps.is_engaged());
        assert!(!tracker.is_active(KeyCode::Shift));
    }

    #[test]
    fn test_release_goes_to_engaged_key() {
        let mut caps = CapsLockState::new();
        let mut tracker = ModifierTracker::new();

        caps.on_caps_lock_struck(true, KeyCode::Shift, &mut tracker);
        caps.on_caps_lock_struck(false, KeyCode::Control, &mut tracker);
        assert!(!tracker.is_active(KeyCode::Shift));
        assert_eq!(tracker.count(KeyCode::Control), 0);
    }

    #[test]
    fn test_caps_lock_stacks_with_real_shift() {
        let mut caps = CapsLockState::new();
        let mut tracker = ModifierTracker::new();

        tracker.on_key_event(KeyCode::Shift, true);
        caps.on_caps_lock_struck(true, KeyCode::Shift, &mut tracker);
        caps.on_caps_lock_struck(false, KeyCode::Shift, &mut tracker);
        caps.on_caps_lock_struck(false, KeyCode::Shift, &mut tracker);

        assert_eq!(tracker.count(KeyCode::Shift), 1);
    }

    #[test]
    fn test_each_strike_adds_one_hold() {
        let mut caps = CapsLockState::new();
        let mut tracker = ModifierTracker::new();

        caps.on_caps_lock_struck(true, KeyCode::Shift, &mut tracker);
        caps.on_caps_lock_struck(true, KeyCode::Shift, &mut tracker);
        assert_eq!(caps.holds(), 2);
        assert_eq!(tracker.count(KeyCode::Shift), 2);

        caps.on_caps_lock_struck(false, KeyCode::Shift, &mut tracker);
        assert!(caps.is_engaged());
        assert!(tracker.is_active(KeyCode::Shift));

        caps.on_caps_lock_struck(false, KeyCode::Shift, &mut tracker);
        assert!(!caps.is_engaged());
        assert_eq!(tracker.count(KeyCode::Shift), 0);
    }

    #[test]
    fn test_holds_remember_their_shift_key() {
        let mut caps = CapsLockState::new();
        let mut tracker = ModifierTracker::new();

        caps.on_caps_lock_struck(true, KeyCode::Shift, &mut tracker);
        caps.on_caps_lock_struck(true, KeyCode::Control, &mut tracker);
        caps.on_caps_lock_struck(false, KeyCode::Control, &mut tracker);
        caps.on_caps_lock_struck(false, KeyCode::Control, &mut tracker);

        assert_eq!(tracker.count(KeyCode::Shift), 0);
        assert_eq!(tracker.count(KeyCode::Control), 0);
    }
}

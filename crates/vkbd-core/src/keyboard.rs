// Vkbd Virtual Keyboard
// Registered keys, event synthesis and receiver dispatch in one place

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::binding::{BoundKey, VirtualKey};
use crate::modifier::{ModifierError, Modifiers};
use crate::state::KeyRegistry;
use crate::transform::{EventSynthesizer, KeyEvent, KeyboardConfig};
use crate::{Action, KeyCode, WidgetEvent};

#[cfg(feature = "layout-files")]
use crate::layout::{Layout, LayoutError, LayoutReport};

/// Errors raised by keyboard operations
#[derive(Debug, thiserror::Error)]
pub enum KeyboardError {
    #[error("Invalid key container id: {0:?}")]
    InvalidContainer(String),

    #[error("Unknown key container: {0}")]
    UnknownContainer(String),

    #[error("Key '{0}' is not registered")]
    UnknownKey(String),

    #[error(transparent)]
    Modifier(#[from] ModifierError),
}

/// Receives synthesized key events.
///
/// `key_event` sees every event; the press/release hooks get the same event
/// split into its parts and default to doing nothing.
pub trait KeyEventReceiver {
    fn key_event(&mut self, event: &KeyEvent);

    fn key_pressed(&mut self, _key: KeyCode, _modifiers: Modifiers, _text: &str) {}

    fn key_released(&mut self, _key: KeyCode, _modifiers: Modifiers, _text: &str) {}
}

impl<F> KeyEventReceiver for F
where
    F: FnMut(&KeyEvent),
{
    fn key_event(&mut self, event: &KeyEvent) {
        self(event)
    }
}

/// Receiver that stores every event it gets, for inspection elsewhere
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<KeyEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all recorded events
    pub fn take(&self) -> Vec<KeyEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl KeyEventReceiver for EventRecorder {
    fn key_event(&mut self, event: &KeyEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Handle returned when registering a receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverId(u64);

/// Translate an activation or deactivation of `key` into a transition.
///
/// Checkable keys only react to activations: an unchecked key is pressed, a
/// checked one released. Returns `None` for ignored deactivations.
fn transition_for(key: &dyn BoundKey, activation: bool) -> Option<Action> {
    match (key.is_checkable(), activation) {
        (true, true) if key.is_checked() => Some(Action::Release),
        (true, true) => Some(Action::Press),
        (true, false) => None,
        (false, true) => Some(Action::Press),
        (false, false) => Some(Action::Release),
    }
}

/// A virtual keyboard.
///
/// Owns the key containers, the synthesizer state and the event receivers.
/// All mutation goes through `&mut self`; wrap it in a [`SharedKeyboard`] to
/// drive it from several threads.
pub struct VirtualKeyboard {
    synthesizer: EventSynthesizer,
    registry: KeyRegistry,
    receivers: Vec<(ReceiverId, Box<dyn KeyEventReceiver + Send>)>,
    next_receiver: u64,
    layout_name: String,
    layout_version: i64,
}

impl Default for VirtualKeyboard {
    fn default() -> Self {
        Self::new(KeyboardConfig::default())
    }
}

impl std::fmt::Debug for VirtualKeyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualKeyboard")
            .field("synthesizer", &self.synthesizer)
            .field("registry", &self.registry)
            .field("receivers", &self.receivers.len())
            .field("layout_name", &self.layout_name)
            .field("layout_version", &self.layout_version)
            .finish()
    }
}

impl VirtualKeyboard {
    pub const DEFAULT_LAYOUT_NAME: &'static str = "Custom";
    pub const DEFAULT_LAYOUT_VERSION: i64 = 1;

    /// Create a keyboard with no registered keys
    pub fn new(config: KeyboardConfig) -> Self {
        Self {
            synthesizer: EventSynthesizer::new(config),
            registry: KeyRegistry::new(),
            receivers: Vec::new(),
            next_receiver: 0,
            layout_name: Self::DEFAULT_LAYOUT_NAME.to_string(),
            layout_version: Self::DEFAULT_LAYOUT_VERSION,
        }
    }

    // Configuration

    pub fn config(&self) -> &KeyboardConfig {
        self.synthesizer.config()
    }

    pub fn synthesizer(&self) -> &EventSynthesizer {
        &self.synthesizer
    }

    pub fn set_shift_modifier(&mut self, key: KeyCode) -> Result<(), KeyboardError> {
        Ok(self.synthesizer.config_mut().set_shift_modifier(key)?)
    }

    pub fn shift_modifier(&self) -> KeyCode {
        self.config().shift_modifier()
    }

    pub fn set_alt_modifier(&mut self, key: KeyCode) -> Result<(), KeyboardError> {
        Ok(self.synthesizer.config_mut().set_alt_modifier(key)?)
    }

    pub fn alt_modifier(&self) -> KeyCode {
        self.config().alt_modifier()
    }

    pub fn set_auto_shifting(&mut self, enabled: bool) {
        self.synthesizer.config_mut().auto_shifting = enabled;
    }

    pub fn auto_shifting(&self) -> bool {
        self.config().auto_shifting
    }

    pub fn set_dead_keys(&mut self, enabled: bool) {
        self.synthesizer.config_mut().dead_keys = enabled;
    }

    pub fn dead_keys(&self) -> bool {
        self.config().dead_keys
    }

    pub fn set_caps_lock(&mut self, enabled: bool) {
        self.synthesizer.config_mut().caps_lock = enabled;
    }

    pub fn caps_lock(&self) -> bool {
        self.config().caps_lock
    }

    pub fn layout_name(&self) -> &str {
        &self.layout_name
    }

    pub fn set_layout_name(&mut self, name: impl Into<String>) {
        self.layout_name = name.into();
    }

    pub fn layout_version(&self) -> i64 {
        self.layout_version
    }

    pub fn set_layout_version(&mut self, version: i64) {
        self.layout_version = version;
    }

    // Key containers

    /// Register a container of keys, merging into an existing one of the same id
    pub fn add_key_container(
        &mut self,
        id: &str,
        keys: impl IntoIterator<Item = VirtualKey>,
    ) -> Result<(), KeyboardError> {
        if id.is_empty() {
            log::warn!("Attempt to register a key container without an id");
            return Err(KeyboardError::InvalidContainer(id.to_string()));
        }
        let added = self.registry.add_container(id, keys);
        log::debug!("Registered {} key(s) in container '{}'", added, id);
        Ok(())
    }

    /// Unregister a container; its keys stop producing events
    pub fn remove_key_container(&mut self, id: &str) -> Result<Vec<VirtualKey>, KeyboardError> {
        if id.is_empty() {
            log::warn!("Attempt to unregister a key container without an id");
            return Err(KeyboardError::InvalidContainer(id.to_string()));
        }
        self.registry
            .remove_container(id)
            .ok_or_else(|| KeyboardError::UnknownContainer(id.to_string()))
    }

    /// Add a key to a registered container.
    ///
    /// A key whose name the container already holds is ignored.
    pub fn add_key(&mut self, container: &str, key: VirtualKey) -> Result<(), KeyboardError> {
        if !self.registry.has_container(container) {
            return Err(KeyboardError::UnknownContainer(container.to_string()));
        }
        if !self.registry.add_key(container, key) {
            log::debug!("Key already present in container '{}'", container);
        }
        Ok(())
    }

    pub fn remove_key(&mut self, container: &str, name: &str) -> Option<VirtualKey> {
        self.registry.remove_key(container, name)
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Find a registered key by name; the first registered match wins
    pub fn find_key(&self, name: &str) -> Option<&VirtualKey> {
        let found = self.registry.find(name);
        if found.is_none() {
            log::warn!("Unable to find virtual key '{}'", name);
        }
        found
    }

    pub fn find_key_mut(&mut self, name: &str) -> Option<&mut VirtualKey> {
        let found = self.registry.find_mut(name);
        if found.is_none() {
            log::warn!("Unable to find virtual key '{}'", name);
        }
        found
    }

    // Receivers

    /// Register a receiver; events are delivered in registration order
    pub fn add_receiver(&mut self, receiver: Box<dyn KeyEventReceiver + Send>) -> ReceiverId {
        let id = ReceiverId(self.next_receiver);
        self.next_receiver += 1;
        self.receivers.push((id, receiver));
        id
    }

    pub fn remove_receiver(&mut self, id: ReceiverId) -> bool {
        let before = self.receivers.len();
        self.receivers.retain(|(rid, _)| *rid != id);
        self.receivers.len() != before
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers.len()
    }

    // Input

    /// Deliver an interaction on a registered key.
    ///
    /// Checkable keys flip their checked state on every activation.
    pub fn handle_widget_event(
        &mut self,
        name: &str,
        event: WidgetEvent,
    ) -> Result<Option<KeyEvent>, KeyboardError> {
        let key = self
            .registry
            .find_mut(name)
            .ok_or_else(|| KeyboardError::UnknownKey(name.to_string()))?;

        let activation = event.is_activation();
        let Some(action) = transition_for(&*key, activation) else {
            log::trace!("Ignoring {:?} on checkable key '{}'", event, name);
            return Ok(None);
        };
        let synthesized = self.synthesizer.process(&*key, action);
        if activation {
            key.toggle();
        }

        if let Some(ev) = &synthesized {
            self.dispatch(ev);
        }
        Ok(synthesized)
    }

    /// Press a registered key as if it was clicked
    pub fn press(&mut self, name: &str) -> Result<Option<KeyEvent>, KeyboardError> {
        self.handle_widget_event(name, WidgetEvent::PointerPress)
    }

    pub fn release(&mut self, name: &str) -> Result<Option<KeyEvent>, KeyboardError> {
        self.handle_widget_event(name, WidgetEvent::PointerRelease)
    }

    /// Press and release a registered key
    pub fn tap(&mut self, name: &str) -> Result<Vec<KeyEvent>, KeyboardError> {
        let pressed = self.press(name)?;
        let released = self.release(name)?;
        Ok(pressed.into_iter().chain(released).collect())
    }

    /// Activate a key the host keeps outside the registry.
    ///
    /// The host owns the key's checked state and flips it afterwards.
    pub fn activate(&mut self, key: &dyn BoundKey) -> Option<KeyEvent> {
        let action = transition_for(key, true)?;
        self.process(key, action)
    }

    pub fn deactivate(&mut self, key: &dyn BoundKey) -> Option<KeyEvent> {
        let action = transition_for(key, false)?;
        self.process(key, action)
    }

    /// Synthesize and deliver an event for an explicit transition
    pub fn process(&mut self, key: &dyn BoundKey, action: Action) -> Option<KeyEvent> {
        let event = self.synthesizer.process(key, action)?;
        self.dispatch(&event);
        Some(event)
    }

    /// Release every held modifier and forget a pending dead key
    pub fn reset(&mut self) {
        self.synthesizer.reset();
        for key in self.registry.iter_mut() {
            key.set_checked(false);
        }
    }

    fn dispatch(&mut self, event: &KeyEvent) {
        for (_, receiver) in self.receivers.iter_mut() {
            receiver.key_event(event);
            match event.action {
                Action::Press => receiver.key_pressed(event.key, event.modifiers, &event.text),
                Action::Release => receiver.key_released(event.key, event.modifiers, &event.text),
            }
        }
    }

    // Layouts

    /// Apply a parsed layout to the registered keys
    #[cfg(feature = "layout-files")]
    pub fn apply_layout(&mut self, layout: &Layout) -> LayoutReport {
        self.layout_name = layout.name.clone();
        self.layout_version = layout.version;
        layout.apply_to(&mut self.registry)
    }

    /// Load a layout file and apply it.
    ///
    /// A file that fails to parse leaves every key untouched.
    #[cfg(feature = "layout-files")]
    pub fn load_layout(
        &mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<LayoutReport, LayoutError> {
        let layout = Layout::from_path(path)?;
        Ok(self.apply_layout(&layout))
    }
}

/// Thread-safe handle to a [`VirtualKeyboard`]
#[derive(Debug, Clone)]
pub struct SharedKeyboard {
    inner: Arc<Mutex<VirtualKeyboard>>,
}

impl SharedKeyboard {
    pub fn new(keyboard: VirtualKeyboard) -> Self {
        Self {
            inner: Arc::new(Mutex::new(keyboard)),
        }
    }

    /// Lock the keyboard for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, VirtualKeyboard> {
        self.inner.lock()
    }

    pub fn handle_widget_event(
        &self,
        name: &str,
        event: WidgetEvent,
    ) -> Result<Option<KeyEvent>, KeyboardError> {
        self.inner.lock().handle_widget_event(name, event)
    }

    pub fn press(&self, name: &str) -> Result<Option<KeyEvent>, KeyboardError> {
        self.inner.lock().press(name)
    }

    pub fn release(&self, name: &str) -> Result<Option<KeyEvent>, KeyboardError> {
        self.inner.lock().release(name)
    }
}

impl Default for SharedKeyboard {
    fn default() -> Self {
        Self::new(VirtualKeyboard::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::KeyBinding;

    fn keyboard_with(keys: Vec<VirtualKey>) -> VirtualKeyboard {
        let mut keyboard = VirtualKeyboard::default();
        keyboard.add_key_container("main", keys).unwrap();
        keyboard
    }

    #[test]
    fn test_defaults() {
        let keyboard = VirtualKeyboard::default();
        assert_eq!(keyboard.shift_modifier(), KeyCode::Shift);
        assert_eq!(keyboard.alt_modifier(), KeyCode::AltGr);
        assert!(keyboard.auto_shifting());
        assert!(keyboard.dead_keys());
        assert!(keyboard.caps_lock());
        assert_eq!(keyboard.layout_name(), "Custom");
        assert_eq!(keyboard.layout_version(), 1);
    }

    #[test]
    fn test_role_conflict_keeps_previous_value() {
        let mut keyboard = VirtualKeyboard::default();
        let err = keyboard.set_alt_modifier(KeyCode::Shift).unwrap_err();
        assert!(matches!(err, KeyboardError::Modifier(_)));
        assert_eq!(keyboard.alt_modifier(), KeyCode::AltGr);
    }

    #[test]
    fn test_empty_container_id_is_rejected() {
        let mut keyboard = VirtualKeyboard::default();
        assert!(matches!(
            keyboard.add_key_container("", Vec::new()),
            Err(KeyboardError::InvalidContainer(_))
        ));
        assert!(matches!(
            keyboard.remove_key_container(""),
            Err(KeyboardError::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_unregistered_key_produces_nothing() {
        let mut keyboard = keyboard_with(vec![VirtualKey::new("q", KeyBinding::new(KeyCode::Q))]);
        let recorder = EventRecorder::new();
        keyboard.add_receiver(Box::new(recorder.clone()));

        assert!(matches!(keyboard.press("w"), Err(KeyboardError::UnknownKey(_))));
        keyboard.remove_key_container("main").unwrap();
        assert!(keyboard.press("q").is_err());
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_checkable_key_toggles_on_activation() {
        let caps = VirtualKey::new("caps", KeyBinding::new(KeyCode::CapsLock)).checkable();
        let mut keyboard = keyboard_with(vec![caps]);

        let first = keyboard.press("caps").unwrap().unwrap();
        assert_eq!(first.action, Action::Press);
        assert!(keyboard.find_key("caps").unwrap().is_checked());

        assert_eq!(keyboard.release("caps").unwrap(), None);
        assert!(keyboard.synthesizer().is_caps_lock_engaged());

        let second = keyboard
            .handle_widget_event("caps", WidgetEvent::PointerDoubleClick)
            .unwrap()
            .unwrap();
        assert_eq!(second.action, Action::Release);
        assert!(!keyboard.find_key("caps").unwrap().is_checked());
        assert!(!keyboard.synthesizer().is_caps_lock_engaged());
    }

    #[test]
    fn test_receivers_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut keyboard = keyboard_with(vec![VirtualKey::new("a", KeyBinding::new(KeyCode::A))]);

        let first = order.clone();
        keyboard.add_receiver(Box::new(move |_: &KeyEvent| first.lock().push(1)));
        let second = order.clone();
        let id = keyboard.add_receiver(Box::new(move |_: &KeyEvent| second.lock().push(2)));

        keyboard.tap("a").unwrap();
        assert_eq!(*order.lock(), vec![1, 2, 1, 2]);

        assert!(keyboard.remove_receiver(id));
        assert!(!keyboard.remove_receiver(id));
        keyboard.press("a").unwrap();
        assert_eq!(*order.lock(), vec![1, 2, 1, 2, 1]);
    }

    #[test]
    fn test_press_release_hooks() {
        #[derive(Default)]
        struct Split {
            pressed: Vec<String>,
            released: Vec<String>,
            shared: Arc<Mutex<(usize, usize)>>,
        }

        impl KeyEventReceiver for Split {
            fn key_event(&mut self, _event: &KeyEvent) {}

            fn key_pressed(&mut self, _key: KeyCode, _modifiers: Modifiers, text: &str) {
                self.pressed.push(text.to_string());
                self.shared.lock().0 = self.pressed.len();
            }

            fn key_released(&mut self, _key: KeyCode, _modifiers: Modifiers, text: &str) {
                self.released.push(text.to_string());
                self.shared.lock().1 = self.released.len();
            }
        }

        let counts = Arc::new(Mutex::new((0, 0)));
        let mut keyboard = keyboard_with(vec![VirtualKey::new("b", KeyBinding::new(KeyCode::B))]);
        keyboard.add_receiver(Box::new(Split {
            shared: counts.clone(),
            ..Split::default()
        }));

        keyboard.tap("b").unwrap();
        keyboard.press("b").unwrap();
        assert_eq!(*counts.lock(), (2, 1));
    }

    #[test]
    fn test_host_owned_key() {
        let mut keyboard = VirtualKeyboard::default();
        let recorder = EventRecorder::new();
        keyboard.add_receiver(Box::new(recorder.clone()));

        let mut toggle = VirtualKey::new("lock", KeyBinding::new(KeyCode::CapsLock)).checkable();
        assert_eq!(keyboard.activate(&toggle).unwrap().action, Action::Press);
        toggle.toggle();
        assert_eq!(keyboard.deactivate(&toggle), None);
        assert_eq!(keyboard.activate(&toggle).unwrap().action, Action::Release);
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_shared_keyboard_across_threads() {
        let shared = SharedKeyboard::default();
        shared
            .lock()
            .add_key_container("main", vec![VirtualKey::new("x", KeyBinding::new(KeyCode::X))])
            .unwrap();
        let recorder = EventRecorder::new();
        shared.lock().add_receiver(Box::new(recorder.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let kb = shared.clone();
                std::thread::spawn(move || {
                    kb.press("x").unwrap();
                    kb.release("x").unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(recorder.len(), 8);
    }
}

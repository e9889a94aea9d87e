// Vkbd Key Registry
// Named containers of virtual keys, looked up by key name

use indexmap::IndexMap;

use crate::binding::VirtualKey;

type Container = IndexMap<String, VirtualKey>;

/// Registry of key containers.
///
/// Containers and the keys inside them keep their registration order, so
/// lookups by name always return the first registered match.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    containers: IndexMap<String, Container>,
}

impl KeyRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of registered keys
    pub fn len(&self) -> usize {
        self.containers.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.values().all(|c| c.is_empty())
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn has_container(&self, id: &str) -> bool {
        self.containers.contains_key(id)
    }

    /// Register a container, or merge `keys` into an existing one.
    ///
    /// Keys whose name is already present in the container are skipped.
    /// Returns the number of keys actually added.
    pub fn add_container(&mut self, id: &str, keys: impl IntoIterator<Item = VirtualKey>) -> usize {
        let container = self.containers.entry(id.to_string()).or_default();
        let mut added = 0;
        for key in keys {
            if container.contains_key(key.name()) {
                log::debug!("Key '{}' already registered in '{}'", key.name(), id);
                continue;
            }
            container.insert(key.name().to_string(), key);
            added += 1;
        }
        added
    }

    /// Unregister a container and all of its keys
    pub fn remove_container(&mut self, id: &str) -> Option<Vec<VirtualKey>> {
        self.containers
            .shift_remove(id)
            .map(|container| container.into_values().collect())
    }

    /// Add a single key to an existing container.
    ///
    /// Returns false if the container is unknown or already has a key of that name.
    pub fn add_key(&mut self, id: &str, key: VirtualKey) -> bool {
        match self.containers.get_mut(id) {
            Some(container) if !container.contains_key(key.name()) => {
                container.insert(key.name().to_string(), key);
                true
            }
            _ => false,
        }
    }

    /// Remove a key from a container
    pub fn remove_key(&mut self, id: &str, name: &str) -> Option<VirtualKey> {
        self.containers.get_mut(id)?.shift_remove(name)
    }

    /// Find a key by name across all containers
    pub fn find(&self, name: &str) -> Option<&VirtualKey> {
        self.containers.values().find_map(|c| c.get(name))
    }

    /// Get a mutable reference to a key by name
    pub fn find_mut(&mut self, name: &str) -> Option<&mut VirtualKey> {
        self.containers.values_mut().find_map(|c| c.get_mut(name))
    }

    /// Names of the keys in one container, in registration order
    pub fn container_keys(&self, id: &str) -> Option<impl Iterator<Item = &str>> {
        self.containers
            .get(id)
            .map(|container| container.keys().map(String::as_str))
    }

    /// Iterate over all registered keys
    pub fn iter(&self) -> impl Iterator<Item = &VirtualKey> {
        self.containers.values().flat_map(|c| c.values())
    }

    /// Iterate over all registered keys mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut VirtualKey> {
        self.containers.values_mut().flat_map(|c| c.values_mut())
    }

    pub fn clear(&mut self) {
        self.containers.clear();
    }
}

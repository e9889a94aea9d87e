// Vkbd Layout Loader
// Parses TOML layout documents and applies them to registered virtual keys

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::binding::{KeyBinding, KeySlot, Layer, VirtualKey};
use crate::key::key_from_name_or_unknown;
use crate::state::KeyRegistry;

/// Layout loader errors
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("The file is not a virtual keyboard layout file (missing [layout] table)")]
    NotALayout,
}

/// Root of a layout document
#[derive(Debug, Deserialize)]
struct LayoutToml {
    layout: Option<LayoutHeaderToml>,

    #[serde(default)]
    keys: IndexMap<String, KeyToml>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
struct LayoutHeaderToml {
    name: Option<String>,
    version: Option<i64>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

/// One `[keys.<name>]` table
#[derive(Debug, Deserialize)]
struct KeyToml {
    default: Option<SlotToml>,
    shift: Option<SlotToml>,
    alt: Option<SlotToml>,
    altshift: Option<SlotToml>,
    checkable: Option<bool>,
    auto_repeat: Option<bool>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
struct SlotToml {
    key: Option<String>,
    text: Option<String>,
    icon: Option<String>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

fn warn_unknown(context: &str, unknown: &BTreeMap<String, toml::Value>) {
    for name in unknown.keys() {
        log::warn!("Skipping unknown layout entry '{}' in {}", name, context);
    }
}

impl SlotToml {
    fn to_slot(&self, context: &str) -> KeySlot {
        warn_unknown(context, &self.unknown);

        let key = match &self.key {
            Some(name) => key_from_name_or_unknown(name),
            None => {
                log::warn!("No key given in {}, using Key_unknown", context);
                crate::KeyCode::Unknown
            }
        };

        let mut slot = KeySlot::from_key(key);
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            slot.text = text.to_string();
        }
        slot.icon = self.icon.clone().filter(|i| !i.is_empty());
        slot
    }
}

/// Layer contents for one named key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    pub name: String,
    /// Only the layers the document mentions, in document order
    pub slots: Vec<(Layer, KeySlot)>,
    pub checkable: Option<bool>,
    pub auto_repeat: Option<bool>,
}

impl KeyLayout {
    /// Overwrite the mentioned layers of `key`; other layers are kept
    pub fn apply_to_key(&self, key: &mut VirtualKey) {
        let binding = key.binding_mut();
        for (layer, slot) in &self.slots {
            *binding.slot_mut(*layer) = slot.clone();
        }
        if let Some(checkable) = self.checkable {
            key.set_checkable(checkable);
        }
        if let Some(auto_repeat) = self.auto_repeat {
            key.set_auto_repeat(auto_repeat);
        }
    }

    /// Build a fresh virtual key from this entry
    pub fn instantiate(&self) -> VirtualKey {
        let mut key = VirtualKey::new(self.name.clone(), KeyBinding::default());
        self.apply_to_key(&mut key);
        key
    }
}

/// Outcome of applying a layout to a set of keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Number of keys that were updated
    pub applied: usize,
    /// Layout entries with no registered key of that name
    pub missing: Vec<String>,
}

/// A parsed keyboard layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub name: String,
    pub version: i64,
    pub keys: Vec<KeyLayout>,
}

impl Layout {
    pub const DEFAULT_NAME: &'static str = "Custom";
    pub const DEFAULT_VERSION: i64 = 1;

    /// Parse a layout file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a layout from TOML text.
    ///
    /// Unknown tables and fields are skipped with a warning, as are key
    /// names that do not parse (they become [`crate::KeyCode::Unknown`]).
    pub fn from_toml(content: &str) -> Result<Self, LayoutError> {
        let toml_layout: LayoutToml =
            toml::from_str(content).map_err(|e| LayoutError::TomlParse(e.to_string()))?;

        let header = toml_layout.layout.ok_or(LayoutError::NotALayout)?;
        warn_unknown("the document root", &toml_layout.unknown);
        warn_unknown("[layout]", &header.unknown);

        let keys = toml_layout
            .keys
            .iter()
            .map(|(name, entry)| {
                warn_unknown(&format!("[keys.{}]", name), &entry.unknown);
                let slots = [
                    (Layer::Default, &entry.default),
                    (Layer::Shift, &entry.shift),
                    (Layer::Alt, &entry.alt),
                    (Layer::AltShift, &entry.altshift),
                ]
                .into_iter()
                .filter_map(|(layer, slot)| {
                    let context = format!("[keys.{}.{}]", name, layer);
                    slot.as_ref().map(|s| (layer, s.to_slot(&context)))
                })
                .collect();

                KeyLayout {
                    name: name.clone(),
                    slots,
                    checkable: entry.checkable,
                    auto_repeat: entry.auto_repeat,
                }
            })
            .collect::<Vec<_>>();

        let layout = Layout {
            name: header.name.unwrap_or_else(|| Self::DEFAULT_NAME.to_string()),
            version: header.version.unwrap_or(Self::DEFAULT_VERSION),
            keys,
        };
        log::debug!(
            "Parsed layout '{}' v{} with {} key(s)",
            layout.name,
            layout.version,
            layout.keys.len()
        );
        Ok(layout)
    }

    pub fn key(&self, name: &str) -> Option<&KeyLayout> {
        self.keys.iter().find(|k| k.name == name)
    }

    /// Update the registered keys named in this layout.
    ///
    /// Keys the layout does not mention stay unchanged.
    pub fn apply_to(&self, registry: &mut KeyRegistry) -> LayoutReport {
        let mut report = LayoutReport::default();
        for entry in &self.keys {
            match registry.find_mut(&entry.name) {
                Some(key) => {
                    entry.apply_to_key(key);
                    report.applied += 1;
                }
                None => {
                    log::warn!("Layout '{}' names unknown key '{}'", self.name, entry.name);
                    report.missing.push(entry.name.clone());
                }
            }
        }
        report
    }

    /// Create one virtual key per layout entry
    pub fn instantiate(&self) -> Vec<VirtualKey> {
        self.keys.iter().map(KeyLayout::instantiate).collect()
    }
}

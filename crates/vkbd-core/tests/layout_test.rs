// Vkbd Layout File Tests
//
// Loads layout documents from disk and applies them to a live keyboard.
//
// Run with: cargo test --features layout-files --test layout_test

#![cfg(feature = "layout-files")]

use std::fs;

use pretty_assertions::assert_eq;

use vkbd_core::{
    BoundKey, EventRecorder, KeyBinding, KeyCode, KeySlot, Layer, Layout, LayoutError,
    VirtualKey, VirtualKeyboard,
};

const GERMAN: &str = r#"
[layout]
name = "Deutsch"
version = 3

[keys.q]
default = { key = "Key_Q", text = "q" }
shift = { key = "Key_Q", text = "Q" }
alt = { key = "Key_At" }

[keys.acute]
default = { key = "Key_Dead_Acute", text = "´" }
shift = { key = "Key_Dead_Grave", text = "`" }

[keys."ß"]
default = { key = "Key_ssharp" }
shift = { key = "Key_Question" }
alt = { key = "Key_Backslash" }

[keys.ghost]
default = { key = "Key_G" }
"#;

fn keyboard_with_blank_keys(names: &[&str]) -> VirtualKeyboard {
    let mut keyboard = VirtualKeyboard::default();
    let keys = names
        .iter()
        .map(|name| VirtualKey::new(*name, KeyBinding::default()));
    keyboard.add_key_container("main", keys).unwrap();
    keyboard
}

#[test]
fn test_load_layout_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("de.toml");
    fs::write(&path, GERMAN).unwrap();

    let mut keyboard = keyboard_with_blank_keys(&["q", "acute", "ß"]);
    let report = keyboard.load_layout(&path).unwrap();

    assert_eq!(report.applied, 3);
    assert_eq!(report.missing, vec!["ghost".to_string()]);
    assert_eq!(keyboard.layout_name(), "Deutsch");
    assert_eq!(keyboard.layout_version(), 3);

    let q = keyboard.find_key("q").unwrap().binding();
    assert_eq!(q.slot(Layer::Default), &KeySlot::new(KeyCode::Q, "q"));
    assert_eq!(q.slot(Layer::Shift), &KeySlot::new(KeyCode::Q, "Q"));
    assert_eq!(q.slot(Layer::Alt), &KeySlot::new(KeyCode::At, "@"));
    assert_eq!(q.alt_shift_key(), KeyCode::Unknown);

    let sharp = keyboard.find_key("ß").unwrap().binding();
    assert_eq!(sharp.default.text, "ß");
    assert_eq!(sharp.alt_key(), KeyCode::Backslash);
}

#[test]
fn test_loaded_layout_drives_events() {
    let mut keyboard = keyboard_with_blank_keys(&["q", "acute", "ß", "shift"]);
    keyboard
        .find_key_mut("shift")
        .unwrap()
        .binding_mut()
        .default = KeySlot::from_key(KeyCode::Shift);
    keyboard.apply_layout(&Layout::from_toml(GERMAN).unwrap());

    let recorder = EventRecorder::new();
    keyboard.add_receiver(Box::new(recorder.clone()));

    keyboard.press("shift").unwrap();
    keyboard.tap("acute").unwrap();
    keyboard.release("shift").unwrap();
    keyboard.tap("q").unwrap();
    keyboard.tap("ß").unwrap();

    let typed: String = recorder
        .take()
        .into_iter()
        .filter(|e| e.action.is_pressed())
        .map(|e| e.text)
        .collect();
    // Dead grave on the shift layer has no composition with Q
    assert_eq!(typed, "ß");
}

#[test]
fn test_malformed_file_leaves_keys_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[layout]\nname = \"Broken\"\n[keys.q\ndefault = {").unwrap();

    let mut keyboard = VirtualKeyboard::default();
    keyboard
        .add_key_container("main", vec![VirtualKey::new("q", KeyBinding::new(KeyCode::Q))])
        .unwrap();

    let err = keyboard.load_layout(&path).unwrap_err();
    assert!(matches!(err, LayoutError::TomlParse(_)));
    assert_eq!(keyboard.layout_name(), "Custom");
    assert_eq!(
        keyboard.find_key("q").unwrap().binding(),
        &KeyBinding::new(KeyCode::Q)
    );
}

#[test]
fn test_missing_file() {
    let mut keyboard = VirtualKeyboard::default();
    let err = keyboard.load_layout("/nonexistent/vkbd/layout.toml").unwrap_err();
    assert!(matches!(err, LayoutError::Io(_)));
}

#[test]
fn test_not_a_layout_document() {
    let err = Layout::from_toml("[keyboard]\ndead_keys = true\n").unwrap_err();
    assert!(matches!(err, LayoutError::NotALayout));
}

#[test]
fn test_instantiate_keeps_document_order() {
    let layout = Layout::from_toml(GERMAN).unwrap();
    let names: Vec<String> = layout
        .instantiate()
        .iter()
        .map(|k| k.name().to_string())
        .collect();
    assert_eq!(names, vec!["q", "acute", "ß", "ghost"]);
}

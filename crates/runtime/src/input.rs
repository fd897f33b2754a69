//! Synthetic keyboard input.
use std::collections::BTreeMap;
use std::fmt;

use bot_core::Key;

use crate::error::{Result, RuntimeError};

/// Windows virtual-key code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VirtualKey(pub u8);

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Key-down / key-up emitter; timing is composed by the caller.
pub trait InputInjector {
    fn key_down(&mut self, key: VirtualKey);
    fn key_up(&mut self, key: VirtualKey);
}

/// Mapping from bot keys to virtual keys.
///
/// Defaults to the numpad arrows (8/4/2/6) and Ctrl for attacking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    keys: BTreeMap<Key, VirtualKey>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = Key::ALL
            .into_iter()
            .map(|key| (key, default_code(key)))
            .collect();
        Self { keys }
    }
}

const fn default_code(key: Key) -> VirtualKey {
    match key {
        Key::Up => VirtualKey(0x68),
        Key::Left => VirtualKey(0x64),
        Key::Down => VirtualKey(0x62),
        Key::Right => VirtualKey(0x66),
        Key::Attack => VirtualKey(0x11),
    }
}

impl KeyBindings {
    pub fn get(&self, key: Key) -> VirtualKey {
        self.keys
            .get(&key)
            .copied()
            .unwrap_or_else(|| default_code(key))
    }

    pub fn bind(&mut self, key: Key, code: VirtualKey) {
        self.keys.insert(key, code);
    }

    /// Applies overrides of the form `up=0x68,attack=0x11`.
    ///
    /// Unknown key names fail with [`bot_core::CoreError::UnknownKey`].
    pub fn apply_overrides(&mut self, overrides: &str) -> Result<()> {
        for entry in overrides.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (name, code) = entry
                .split_once('=')
                .ok_or_else(|| invalid_keymap(entry))?;
            let key = Key::from_name(name)?;
            let code = parse_code(code.trim()).ok_or_else(|| invalid_keymap(entry))?;
            self.bind(key, VirtualKey(code));
        }
        Ok(())
    }
}

fn parse_code(text: &str) -> Option<u8> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn invalid_keymap(entry: &str) -> RuntimeError {
    RuntimeError::InvalidSetting {
        name: "EOBOT_KEYMAP".to_string(),
        value: entry.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_numpad_and_ctrl() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.get(Key::Up), VirtualKey(0x68));
        assert_eq!(bindings.get(Key::Left), VirtualKey(0x64));
        assert_eq!(bindings.get(Key::Down), VirtualKey(0x62));
        assert_eq!(bindings.get(Key::Right), VirtualKey(0x66));
        assert_eq!(bindings.get(Key::Attack), VirtualKey(0x11));
    }

    #[test]
    fn overrides_accept_hex_and_decimal() {
        let mut bindings = KeyBindings::default();
        bindings.apply_overrides("up=0x26, ctrl=32").unwrap();
        assert_eq!(bindings.get(Key::Up), VirtualKey(0x26));
        assert_eq!(bindings.get(Key::Attack), VirtualKey(32));
        assert_eq!(bindings.get(Key::Down), VirtualKey(0x62));
    }

    #[test]
    fn unknown_key_name_surfaces_core_error() {
        let mut bindings = KeyBindings::default();
        let err = bindings.apply_overrides("jump=0x20").unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Core(bot_core::CoreError::UnknownKey(name)) if name == "jump"
        ));
    }

    #[test]
    fn malformed_entry_is_invalid_setting() {
        let mut bindings = KeyBindings::default();
        assert!(matches!(
            bindings.apply_overrides("up:0x26"),
            Err(RuntimeError::InvalidSetting { .. })
        ));
        assert!(matches!(
            bindings.apply_overrides("up=0x1FF"),
            Err(RuntimeError::InvalidSetting { .. })
        ));
    }
}

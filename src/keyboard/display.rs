//! Display names for keys and lesson symbols.
//!
//! Rendering code goes through these helpers instead of matching on key ids or
//! whitespace characters itself.

use crate::keyboard::key::KeyId;
use crate::keyboard::layout::KeyboardLayout;

/// Human-readable name for a whitespace symbol in the lesson text.
/// Returns `""` for printable chars; the caller uses `ch.to_string()` for those.
pub fn symbol_display_name(ch: char) -> &'static str {
    match ch {
        '\t' => "Tab",
        '\n' => "Enter",
        ' ' => "Space",
        _ => "",
    }
}

/// Single-cell glyph for whitespace symbols in the typing area.
pub fn symbol_glyph(ch: char) -> char {
    match ch {
        '\t' => '→',
        '\n' => '⏎',
        _ => ch,
    }
}

/// Short label for keys that do not type a visible character.
/// Returns `""` for character keys.
pub fn key_short_label(key: KeyId) -> &'static str {
    match key {
        KeyId::Backspace => "Bksp",
        KeyId::Tab => "Tab",
        KeyId::CapsLock => "Caps",
        KeyId::Enter => "Ent",
        KeyId::ShiftLeft | KeyId::ShiftRight => "Shft",
        KeyId::ControlLeft | KeyId::ControlRight => "Ctrl",
        KeyId::AltLeft | KeyId::AltRight => "Alt",
        KeyId::MetaLeft | KeyId::MetaRight => "Meta",
        KeyId::ContextMenu => "Menu",
        KeyId::Space => "Spc",
        _ => "",
    }
}

/// Label drawn on a key cap: the named label for special keys, otherwise the
/// upper-case base character the layout puts on that key.
pub fn key_cap_label(key: KeyId, layout: &KeyboardLayout) -> String {
    let short = key_short_label(key);
    if !short.is_empty() {
        return short.to_string();
    }
    base_char(key, layout)
        .map(|ch| ch.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

fn base_char(key: KeyId, layout: &KeyboardLayout) -> Option<char> {
    // Base characters are the ones that need no modifier.
    (' '..='~').find(|&ch| {
        let required = layout.required_keys(ch);
        required.len() == 1 && required.contains(&key)
    })
}

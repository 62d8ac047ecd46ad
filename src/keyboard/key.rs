use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Physical key identifier, named after the key's position on a US ANSI board
/// (the same names browsers report as `KeyboardEvent.code`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyId {
    Backquote,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Digit0,
    Minus,
    Equal,
    Backspace,
    Tab,
    KeyQ,
    KeyW,
    KeyE,
    KeyR,
    KeyT,
    KeyY,
    KeyU,
    KeyI,
    KeyO,
    KeyP,
    BracketLeft,
    BracketRight,
    Backslash,
    CapsLock,
    KeyA,
    KeyS,
    KeyD,
    KeyF,
    KeyG,
    KeyH,
    KeyJ,
    KeyK,
    KeyL,
    Semicolon,
    Quote,
    Enter,
    ShiftLeft,
    KeyZ,
    KeyX,
    KeyC,
    KeyV,
    KeyB,
    KeyN,
    KeyM,
    Comma,
    Period,
    Slash,
    ShiftRight,
    ControlLeft,
    MetaLeft,
    AltLeft,
    Space,
    AltRight,
    MetaRight,
    ContextMenu,
    ControlRight,
}

impl KeyId {
    pub const ALL: &'static [KeyId] = &[
        KeyId::Backquote,
        KeyId::Digit1,
        KeyId::Digit2,
        KeyId::Digit3,
        KeyId::Digit4,
        KeyId::Digit5,
        KeyId::Digit6,
        KeyId::Digit7,
        KeyId::Digit8,
        KeyId::Digit9,
        KeyId::Digit0,
        KeyId::Minus,
        KeyId::Equal,
        KeyId::Backspace,
        KeyId::Tab,
        KeyId::KeyQ,
        KeyId::KeyW,
        KeyId::KeyE,
        KeyId::KeyR,
        KeyId::KeyT,
        KeyId::KeyY,
        KeyId::KeyU,
        KeyId::KeyI,
        KeyId::KeyO,
        KeyId::KeyP,
        KeyId::BracketLeft,
        KeyId::BracketRight,
        KeyId::Backslash,
        KeyId::CapsLock,
        KeyId::KeyA,
        KeyId::KeyS,
        KeyId::KeyD,
        KeyId::KeyF,
        KeyId::KeyG,
        KeyId::KeyH,
        KeyId::KeyJ,
        KeyId::KeyK,
        KeyId::KeyL,
        KeyId::Semicolon,
        KeyId::Quote,
        KeyId::Enter,
        KeyId::ShiftLeft,
        KeyId::KeyZ,
        KeyId::KeyX,
        KeyId::KeyC,
        KeyId::KeyV,
        KeyId::KeyB,
        KeyId::KeyN,
        KeyId::KeyM,
        KeyId::Comma,
        KeyId::Period,
        KeyId::Slash,
        KeyId::ShiftRight,
        KeyId::ControlLeft,
        KeyId::MetaLeft,
        KeyId::AltLeft,
        KeyId::Space,
        KeyId::AltRight,
        KeyId::MetaRight,
        KeyId::ContextMenu,
        KeyId::ControlRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KeyId::Backquote => "Backquote",
            KeyId::Digit1 => "Digit1",
            KeyId::Digit2 => "Digit2",
            KeyId::Digit3 => "Digit3",
            KeyId::Digit4 => "Digit4",
            KeyId::Digit5 => "Digit5",
            KeyId::Digit6 => "Digit6",
            KeyId::Digit7 => "Digit7",
            KeyId::Digit8 => "Digit8",
            KeyId::Digit9 => "Digit9",
            KeyId::Digit0 => "Digit0",
            KeyId::Minus => "Minus",
            KeyId::Equal => "Equal",
            KeyId::Backspace => "Backspace",
            KeyId::Tab => "Tab",
            KeyId::KeyQ => "KeyQ",
            KeyId::KeyW => "KeyW",
            KeyId::KeyE => "KeyE",
            KeyId::KeyR => "KeyR",
            KeyId::KeyT => "KeyT",
            KeyId::KeyY => "KeyY",
            KeyId::KeyU => "KeyU",
            KeyId::KeyI => "KeyI",
            KeyId::KeyO => "KeyO",
            KeyId::KeyP => "KeyP",
            KeyId::BracketLeft => "BracketLeft",
            KeyId::BracketRight => "BracketRight",
            KeyId::Backslash => "Backslash",
            KeyId::CapsLock => "CapsLock",
            KeyId::KeyA => "KeyA",
            KeyId::KeyS => "KeyS",
            KeyId::KeyD => "KeyD",
            KeyId::KeyF => "KeyF",
            KeyId::KeyG => "KeyG",
            KeyId::KeyH => "KeyH",
            KeyId::KeyJ => "KeyJ",
            KeyId::KeyK => "KeyK",
            KeyId::KeyL => "KeyL",
            KeyId::Semicolon => "Semicolon",
            KeyId::Quote => "Quote",
            KeyId::Enter => "Enter",
            KeyId::ShiftLeft => "ShiftLeft",
            KeyId::KeyZ => "KeyZ",
            KeyId::KeyX => "KeyX",
            KeyId::KeyC => "KeyC",
            KeyId::KeyV => "KeyV",
            KeyId::KeyB => "KeyB",
            KeyId::KeyN => "KeyN",
            KeyId::KeyM => "KeyM",
            KeyId::Comma => "Comma",
            KeyId::Period => "Period",
            KeyId::Slash => "Slash",
            KeyId::ShiftRight => "ShiftRight",
            KeyId::ControlLeft => "ControlLeft",
            KeyId::MetaLeft => "MetaLeft",
            KeyId::AltLeft => "AltLeft",
            KeyId::Space => "Space",
            KeyId::AltRight => "AltRight",
            KeyId::MetaRight => "MetaRight",
            KeyId::ContextMenu => "ContextMenu",
            KeyId::ControlRight => "ControlRight",
        }
    }

    /// Modifiers are held to build a chord; pressing one never completes a chord.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            KeyId::ShiftLeft
                | KeyId::ShiftRight
                | KeyId::ControlLeft
                | KeyId::ControlRight
                | KeyId::AltLeft
                | KeyId::AltRight
                | KeyId::MetaLeft
                | KeyId::MetaRight
        )
    }

    /// Platform command keys. Releasing one swallows the key-up events of
    /// whatever was pressed underneath it on some platforms.
    pub fn is_meta(self) -> bool {
        matches!(self, KeyId::MetaLeft | KeyId::MetaRight)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, KeyId::ShiftLeft | KeyId::ShiftRight)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown key id: {0:?}")]
pub struct UnknownKeyId(pub String);

impl FromStr for KeyId {
    type Err = UnknownKeyId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyId::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownKeyId(s.to_string()))
    }
}

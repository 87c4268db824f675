// src/keys.rs

//! Platform-neutral key symbols and modifier state, plus the translation to
//! the legacy DOM key codes (`KeyboardEvent.which`) the simulation expects.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Represents a keyboard modifier.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2; // Also known as Option on macOS
        const SUPER = 1 << 3; // Also known as Windows key or Command key
        const CAPS_LOCK = 1 << 4;
        const NUM_LOCK = 1 << 5;
    }
}

/// Represents a key symbol.
///
/// `Char` holds the character the key produced, already shifted (e.g. `'!'`
/// for shift+1); the key code translation maps it back to the physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KeySymbol {
    // Printable keys, including space
    Char(char),

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    // Modifier keys (when pressed on their own)
    Shift,
    Control,
    Alt,
    Super,
    CapsLock,
    NumLock,

    // Navigation keys
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,

    // Other common keys
    Enter,
    Backspace,
    Tab,
    Escape,
    PrintScreen,
    ScrollLock,
    Pause,

    // Keypad keys
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,
    KeypadEnter,
    KeypadPlus,
    KeypadMinus,
    KeypadMultiply,
    KeypadDivide,
    KeypadDecimal,

    Menu, // Context menu key

    #[default]
    Unknown,
}

impl KeySymbol {
    /// The legacy DOM key code for this key (US layout). `0` when unknown.
    pub fn dom_key_code(&self) -> u32 {
        use KeySymbol::*;
        match *self {
            Char(c) => char_key_code(c),
            F1 => 112,
            F2 => 113,
            F3 => 114,
            F4 => 115,
            F5 => 116,
            F6 => 117,
            F7 => 118,
            F8 => 119,
            F9 => 120,
            F10 => 121,
            F11 => 122,
            F12 => 123,
            F13 => 124,
            F14 => 125,
            F15 => 126,
            F16 => 127,
            F17 => 128,
            F18 => 129,
            F19 => 130,
            F20 => 131,
            F21 => 132,
            F22 => 133,
            F23 => 134,
            F24 => 135,
            Shift => 16,
            Control => 17,
            Alt => 18,
            Super => 91,
            CapsLock => 20,
            NumLock => 144,
            Left => 37,
            Up => 38,
            Right => 39,
            Down => 40,
            PageUp => 33,
            PageDown => 34,
            End => 35,
            Home => 36,
            Insert => 45,
            Delete => 46,
            Enter | KeypadEnter => 13,
            Backspace => 8,
            Tab => 9,
            Escape => 27,
            PrintScreen => 44,
            ScrollLock => 145,
            Pause => 19,
            Keypad0 => 96,
            Keypad1 => 97,
            Keypad2 => 98,
            Keypad3 => 99,
            Keypad4 => 100,
            Keypad5 => 101,
            Keypad6 => 102,
            Keypad7 => 103,
            Keypad8 => 104,
            Keypad9 => 105,
            KeypadMultiply => 106,
            KeypadPlus => 107,
            KeypadMinus => 109,
            KeypadDecimal => 110,
            KeypadDivide => 111,
            Menu => 93,
            Unknown => 0,
        }
    }
}

fn char_key_code(c: char) -> u32 {
    match c {
        'a'..='z' => c.to_ascii_uppercase() as u32,
        'A'..='Z' | '0'..='9' => c as u32,
        ' ' => 32,
        '\r' | '\n' => 13,
        '\t' => 9,
        ')' => '0' as u32,
        '!' => '1' as u32,
        '@' => '2' as u32,
        '#' => '3' as u32,
        '$' => '4' as u32,
        '%' => '5' as u32,
        '^' => '6' as u32,
        '&' => '7' as u32,
        '*' => '8' as u32,
        '(' => '9' as u32,
        ';' | ':' => 186,
        '=' | '+' => 187,
        ',' | '<' => 188,
        '-' | '_' => 189,
        '.' | '>' => 190,
        '/' | '?' => 191,
        '`' | '~' => 192,
        '[' | '{' => 219,
        '\\' | '|' => 220,
        ']' | '}' => 221,
        '\'' | '"' => 222,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn it_should_report_letters_as_uppercase_ascii() {
        assert_eq!(KeySymbol::Char('a').dom_key_code(), 65);
        assert_eq!(KeySymbol::Char('Z').dom_key_code(), 90);
        assert_eq!(KeySymbol::Char('7').dom_key_code(), 55);
    }

    #[test]
    fn it_should_map_shifted_punctuation_back_to_the_physical_key() {
        assert_eq!(KeySymbol::Char('!').dom_key_code(), 49);
        assert_eq!(KeySymbol::Char(')').dom_key_code(), 48);
        assert_eq!(KeySymbol::Char('?').dom_key_code(), 191);
        assert_eq!(
            KeySymbol::Char('{').dom_key_code(),
            KeySymbol::Char('[').dom_key_code()
        );
    }

    #[test]
    fn it_should_map_navigation_and_function_keys() {
        assert_eq!(KeySymbol::Left.dom_key_code(), 37);
        assert_eq!(KeySymbol::Down.dom_key_code(), 40);
        assert_eq!(KeySymbol::Escape.dom_key_code(), 27);
        assert_eq!(KeySymbol::Enter.dom_key_code(), 13);
        assert_eq!(KeySymbol::F1.dom_key_code(), 112);
        assert_eq!(KeySymbol::F12.dom_key_code(), 123);
        assert_eq!(KeySymbol::Keypad5.dom_key_code(), 101);
    }

    #[test]
    fn it_should_report_unknown_keys_as_zero() {
        assert_eq!(KeySymbol::Unknown.dom_key_code(), 0);
        assert_eq!(KeySymbol::Char('é').dom_key_code(), 0);
    }
}

use std::fmt;
use std::time::Instant;

/// Platform virtual-key code identifying one physical key.
///
/// Modifier codes are normalized with [`KeyId::normalized`] so the left and
/// right variants of Ctrl/Alt/Shift/Win share one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(pub u32);

impl KeyId {
    pub const BACKSPACE: KeyId = KeyId(0x08);
    pub const TAB: KeyId = KeyId(0x09);
    pub const ENTER: KeyId = KeyId(0x0D);
    pub const SHIFT: KeyId = KeyId(0x10);
    pub const CONTROL: KeyId = KeyId(0x11);
    pub const ALT: KeyId = KeyId(0x12);
    pub const CAPSLOCK: KeyId = KeyId(0x14);
    pub const ESCAPE: KeyId = KeyId(0x1B);
    pub const SPACE: KeyId = KeyId(0x20);
    pub const PAGEUP: KeyId = KeyId(0x21);
    pub const PAGEDOWN: KeyId = KeyId(0x22);
    pub const END: KeyId = KeyId(0x23);
    pub const HOME: KeyId = KeyId(0x24);
    pub const LEFT: KeyId = KeyId(0x25);
    pub const UP: KeyId = KeyId(0x26);
    pub const RIGHT: KeyId = KeyId(0x27);
    pub const DOWN: KeyId = KeyId(0x28);
    pub const INSERT: KeyId = KeyId(0x2D);
    pub const DELETE: KeyId = KeyId(0x2E);
    pub const WIN: KeyId = KeyId(0x5B);
    pub const F1: KeyId = KeyId(0x70);

    const RWIN: u32 = 0x5C;
    const LSHIFT: u32 = 0xA0;
    const RSHIFT: u32 = 0xA1;
    const LCONTROL: u32 = 0xA2;
    const RCONTROL: u32 = 0xA3;
    const LMENU: u32 = 0xA4;
    const RMENU: u32 = 0xA5;

    /// Id of an ASCII letter or digit key.
    pub fn from_char(c: char) -> Option<KeyId> {
        if c.is_ascii_alphabetic() {
            Some(KeyId(c.to_ascii_uppercase() as u32))
        } else if c.is_ascii_digit() {
            Some(KeyId(c as u32))
        } else {
            None
        }
    }

    /// Id of function key `F{n}` for `n` in 1..=24.
    pub fn function(n: u8) -> Option<KeyId> {
        (1..=24)
            .contains(&n)
            .then(|| KeyId(Self::F1.0 + u32::from(n) - 1))
    }

    /// Collapse side-specific modifier codes into one id.
    pub fn normalized(self) -> KeyId {
        match self.0 {
            Self::LSHIFT | Self::RSHIFT => Self::SHIFT,
            Self::LCONTROL | Self::RCONTROL => Self::CONTROL,
            Self::LMENU | Self::RMENU => Self::ALT,
            Self::RWIN => Self::WIN,
            _ => self,
        }
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self.normalized(),
            Self::SHIFT | Self::CONTROL | Self::ALT | Self::WIN
        )
    }

    /// The letter or digit this key types, if any.
    pub fn alphanumeric(self) -> Option<char> {
        match self.0 {
            0x30..=0x39 | 0x41..=0x5A => char::from_u32(self.0),
            _ => None,
        }
    }

    /// The function key number (1..=24), if any.
    pub fn function_number(self) -> Option<u8> {
        match self.0 {
            0x70..=0x87 => Some((self.0 - Self::F1.0 + 1) as u8),
            _ => None,
        }
    }

    /// Human readable name, e.g. `ctrl`, `u`, `f5`.
    pub fn name(self) -> String {
        if let Some(c) = self.alphanumeric() {
            return c.to_ascii_lowercase().to_string();
        }
        if let Some(n) = self.function_number() {
            return format!("f{n}");
        }
        let named = match self.normalized() {
            Self::BACKSPACE => "backspace",
            Self::TAB => "tab",
            Self::ENTER => "enter",
            Self::SHIFT => "shift",
            Self::CONTROL => "ctrl",
            Self::ALT => "alt",
            Self::CAPSLOCK => "capslock",
            Self::ESCAPE => "esc",
            Self::SPACE => "space",
            Self::PAGEUP => "pageup",
            Self::PAGEDOWN => "pagedown",
            Self::END => "end",
            Self::HOME => "home",
            Self::LEFT => "left",
            Self::UP => "up",
            Self::RIGHT => "right",
            Self::DOWN => "down",
            Self::INSERT => "insert",
            Self::DELETE => "delete",
            Self::WIN => "win",
            _ => return format!("key{}", self.0),
        };
        named.to_string()
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parse a key token such as `Ctrl`, `windows`, `F5`, `u` or a raw code `85`.
pub fn parse_key(token: &str) -> Option<KeyId> {
    let t = token.trim();
    if t.is_empty() {
        return None;
    }
    if t.chars().all(|c| c.is_ascii_digit()) && t.len() > 1 {
        return t.parse::<u32>().ok().map(|code| KeyId(code).normalized());
    }

    let upper = t.to_ascii_uppercase();
    match upper.as_str() {
        "CTRL" | "CONTROL" | "LEFT CTRL" | "RIGHT CTRL" => Some(KeyId::CONTROL),
        "ALT" | "MENU" | "LEFT ALT" | "RIGHT ALT" | "ALTGR" => Some(KeyId::ALT),
        "SHIFT" | "LEFT SHIFT" | "RIGHT SHIFT" => Some(KeyId::SHIFT),
        "WIN" | "WINDOWS" | "LWIN" | "RWIN" | "LEFT WINDOWS" | "RIGHT WINDOWS" | "CMD"
        | "SUPER" | "META" => Some(KeyId::WIN),
        "SPACE" => Some(KeyId::SPACE),
        "TAB" => Some(KeyId::TAB),
        "ENTER" | "RETURN" => Some(KeyId::ENTER),
        "ESC" | "ESCAPE" => Some(KeyId::ESCAPE),
        "DELETE" | "DEL" => Some(KeyId::DELETE),
        "INSERT" | "INS" => Some(KeyId::INSERT),
        "BACKSPACE" => Some(KeyId::BACKSPACE),
        "CAPSLOCK" => Some(KeyId::CAPSLOCK),
        "HOME" => Some(KeyId::HOME),
        "END" => Some(KeyId::END),
        "PAGEUP" | "PGUP" => Some(KeyId::PAGEUP),
        "PAGEDOWN" | "PGDN" => Some(KeyId::PAGEDOWN),
        "LEFT" => Some(KeyId::LEFT),
        "RIGHT" => Some(KeyId::RIGHT),
        "UP" => Some(KeyId::UP),
        "DOWN" => Some(KeyId::DOWN),
        _ if upper.len() > 1 && upper.starts_with('F') => {
            upper[1..].parse::<u8>().ok().and_then(KeyId::function)
        }
        _ => {
            let mut chars = upper.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyId::from_char(c),
                _ => None,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Down,
    Up,
}

/// One physical key transition delivered by the global hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyId,
    pub transition: Transition,
    pub at: Instant,
}

impl KeyEvent {
    pub fn down(key: KeyId) -> Self {
        Self {
            key,
            transition: Transition::Down,
            at: Instant::now(),
        }
    }

    pub fn up(key: KeyId) -> Self {
        Self {
            key,
            transition: Transition::Up,
            at: Instant::now(),
        }
    }
}

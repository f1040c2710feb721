//! Key model: X11 keysyms, modifier states and key bindings.
//!
//! Hosts translate their platform events into a [`Key`] before handing them
//! to the engine. Bindings in the configuration use the textual form produced
//! by the `Display` impl of [`Key`] (`Control+Alt+h`, `Alt+1`, `minus`), and
//! the same form parses back through `FromStr`.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An X11 keysym value.
///
/// Printable Latin-1 symbols use their code point directly, other Unicode
/// characters live at `0x0100_0000 + code point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeySym(pub u32);

const UNICODE_KEYSYM_OFFSET: u32 = 0x0100_0000;

impl KeySym {
    pub const NONE: KeySym = KeySym(0);
    pub const SPACE: KeySym = KeySym(0x0020);
    pub const APOSTROPHE: KeySym = KeySym(0x0027);
    pub const PLUS: KeySym = KeySym(0x002b);
    pub const MINUS: KeySym = KeySym(0x002d);
    pub const KEY_0: KeySym = KeySym(0x0030);
    pub const KEY_1: KeySym = KeySym(0x0031);
    pub const KEY_2: KeySym = KeySym(0x0032);
    pub const KEY_3: KeySym = KeySym(0x0033);
    pub const KEY_4: KeySym = KeySym(0x0034);
    pub const KEY_5: KeySym = KeySym(0x0035);
    pub const KEY_6: KeySym = KeySym(0x0036);
    pub const KEY_7: KeySym = KeySym(0x0037);
    pub const KEY_8: KeySym = KeySym(0x0038);
    pub const KEY_9: KeySym = KeySym(0x0039);
    pub const BACKSPACE: KeySym = KeySym(0xff08);
    pub const TAB: KeySym = KeySym(0xff09);
    pub const RETURN: KeySym = KeySym(0xff0d);
    pub const ESCAPE: KeySym = KeySym(0xff1b);
    pub const DELETE: KeySym = KeySym(0xffff);
    pub const SHIFT_L: KeySym = KeySym(0xffe1);
    pub const CONTROL_L: KeySym = KeySym(0xffe3);
    pub const CAPS_LOCK: KeySym = KeySym(0xffe5);
    pub const ALT_L: KeySym = KeySym(0xffe9);
    pub const SUPER_L: KeySym = KeySym(0xffeb);
    pub const ISO_LEVEL3_SHIFT: KeySym = KeySym(0xfe03);
    pub const MODE_SWITCH: KeySym = KeySym(0xff7e);
    pub const DEAD_GRAVE: KeySym = KeySym(0xfe50);
    pub const DEAD_ACUTE: KeySym = KeySym(0xfe51);
    pub const DEAD_CIRCUMFLEX: KeySym = KeySym(0xfe52);
    pub const DEAD_TILDE: KeySym = KeySym(0xfe53);
    pub const DEAD_DIAERESIS: KeySym = KeySym(0xfe57);

    /// Keysym that types `ch`.
    pub fn from_char(ch: char) -> Self {
        let cp = u32::from(ch);
        match cp {
            0x20..=0x7e | 0xa0..=0xff => KeySym(cp),
            _ => KeySym(cp + UNICODE_KEYSYM_OFFSET),
        }
    }

    /// Character typed by this keysym, if it types one.
    pub fn to_unicode(self) -> Option<char> {
        match self.0 {
            cp @ (0x20..=0x7e | 0xa0..=0xff) => char::from_u32(cp),
            sym @ 0x0100_0100..=0x0110_ffff => char::from_u32(sym - UNICODE_KEYSYM_OFFSET),
            _ => None,
        }
    }

    /// Shift, Control, Alt, Meta, Super, Hyper, lock keys and level shifters.
    pub fn is_modifier(self) -> bool {
        matches!(self.0, 0xffe1..=0xffee)
            || self == Self::ISO_LEVEL3_SHIFT
            || self == Self::MODE_SWITCH
    }

    pub fn is_dead(self) -> bool {
        (0xfe50..=0xfe8f).contains(&self.0)
    }

    /// Symbolic name, for keysyms that have one.
    pub fn name(self) -> Option<&'static str> {
        SYM_NAMES
            .entries()
            .find(|(_, &value)| value == self.0)
            .map(|(name, _)| *name)
    }

    /// Keysym for a symbolic name such as `BackSpace` or `dead_acute`.
    pub fn from_name(name: &str) -> Option<Self> {
        SYM_NAMES.get(name).copied().map(KeySym)
    }
}

static SYM_NAMES: phf::Map<&'static str, u32> = phf_map! {
    "space" => 0x0020,
    "apostrophe" => 0x0027,
    "plus" => 0x002b,
    "comma" => 0x002c,
    "minus" => 0x002d,
    "period" => 0x002e,
    "slash" => 0x002f,
    "semicolon" => 0x003b,
    "equal" => 0x003d,
    "grave" => 0x0060,
    "BackSpace" => 0xff08,
    "Tab" => 0xff09,
    "Return" => 0xff0d,
    "Escape" => 0xff1b,
    "Home" => 0xff50,
    "Left" => 0xff51,
    "Up" => 0xff52,
    "Right" => 0xff53,
    "Down" => 0xff54,
    "Page_Up" => 0xff55,
    "Page_Down" => 0xff56,
    "End" => 0xff57,
    "Insert" => 0xff63,
    "Mode_switch" => 0xff7e,
    "Num_Lock" => 0xff7f,
    "Shift_L" => 0xffe1,
    "Shift_R" => 0xffe2,
    "Control_L" => 0xffe3,
    "Control_R" => 0xffe4,
    "Caps_Lock" => 0xffe5,
    "Shift_Lock" => 0xffe6,
    "Meta_L" => 0xffe7,
    "Meta_R" => 0xffe8,
    "Alt_L" => 0xffe9,
    "Alt_R" => 0xffea,
    "Super_L" => 0xffeb,
    "Super_R" => 0xffec,
    "Hyper_L" => 0xffed,
    "Hyper_R" => 0xffee,
    "Delete" => 0xffff,
    "ISO_Level3_Shift" => 0xfe03,
    "dead_grave" => 0xfe50,
    "dead_acute" => 0xfe51,
    "dead_circumflex" => 0xfe52,
    "dead_tilde" => 0xfe53,
    "dead_diaeresis" => 0xfe57,
};

bitflags! {
    /// Modifier and lock state carried by a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyStates: u32 {
        const SHIFT = 1 << 0;
        const CAPS_LOCK = 1 << 1;
        const CTRL = 1 << 2;
        const ALT = 1 << 3;
        const NUM_LOCK = 1 << 4;
        const SUPER = 1 << 6;
        const HYPER = 1 << 7;
        const META = 1 << 8;
    }
}

impl KeyStates {
    /// Lock states, ignored when comparing keys.
    pub const LOCKS: KeyStates = KeyStates::CAPS_LOCK.union(KeyStates::NUM_LOCK);

    /// Modifiers that turn a printable key into a command.
    pub const COMMAND: KeyStates = KeyStates::CTRL
        .union(KeyStates::ALT)
        .union(KeyStates::SUPER)
        .union(KeyStates::HYPER)
        .union(KeyStates::META);
}

const MODIFIER_NAMES: [(KeyStates, &str); 6] = [
    (KeyStates::CTRL, "Control"),
    (KeyStates::ALT, "Alt"),
    (KeyStates::SHIFT, "Shift"),
    (KeyStates::SUPER, "Super"),
    (KeyStates::HYPER, "Hyper"),
    (KeyStates::META, "Meta"),
];

/// Error returned when a key description cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key description")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key symbol `{0}`")]
    UnknownSym(String),
}

/// A keysym together with the modifier state it was pressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    sym: KeySym,
    states: KeyStates,
}

impl Key {
    pub const fn new(sym: KeySym, states: KeyStates) -> Self {
        Self { sym, states }
    }

    /// Key without any modifier.
    pub const fn from_sym(sym: KeySym) -> Self {
        Self::new(sym, KeyStates::empty())
    }

    /// Unmodified key typing `ch`.
    pub fn from_char(ch: char) -> Self {
        Self::from_sym(KeySym::from_char(ch))
    }

    pub fn sym(&self) -> KeySym {
        self.sym
    }

    pub fn states(&self) -> KeyStates {
        self.states
    }

    /// Canonical form used for every comparison.
    ///
    /// Lock states are dropped and Shift with a lower-case Latin letter is
    /// folded into the upper-case keysym. Shift is then cleared from every
    /// character keysym except space.
    pub fn normalize(self) -> Self {
        let mut states = self.states.difference(KeyStates::LOCKS);
        let mut sym = self.sym;
        if states.contains(KeyStates::SHIFT) {
            if (0x61..=0x7a).contains(&sym.0) {
                sym = KeySym(sym.0 - 0x20);
            }
            if sym != KeySym::SPACE && sym.to_unicode().is_some() {
                states.remove(KeyStates::SHIFT);
            }
        }
        Self { sym, states }
    }

    pub fn is_modifier(&self) -> bool {
        self.sym.is_modifier()
    }

    /// Printable ASCII other than space, without command modifiers.
    pub fn is_simple(&self) -> bool {
        !self.states.intersects(KeyStates::COMMAND) && (0x21..=0x7e).contains(&self.sym.0)
    }

    /// Lower-case ASCII letter with no modifier.
    pub fn is_laz(&self) -> bool {
        (0x61..=0x7a).contains(&self.sym.0) && self.states.is_empty()
    }

    /// Upper-case ASCII letter with at most Shift held.
    pub fn is_uaz(&self) -> bool {
        (0x41..=0x5a).contains(&self.sym.0) && self.states.difference(KeyStates::SHIFT).is_empty()
    }

    /// Whether both keys name the same binding.
    pub fn check(&self, other: &Key) -> bool {
        self.normalize() == other.normalize()
    }

    pub fn check_sym(&self, sym: KeySym) -> bool {
        self.check(&Key::from_sym(sym))
    }

    pub fn key_list_index(&self, keys: &[Key]) -> Option<usize> {
        keys.iter().position(|key| self.check(key))
    }

    pub fn matches_any(&self, keys: &[Key]) -> bool {
        self.key_list_index(keys).is_some()
    }

    /// Parse a whitespace separated list such as `"minus apostrophe"`.
    pub fn parse_list(s: &str) -> Result<Vec<Key>, KeyParseError> {
        s.split_whitespace().map(str::parse).collect()
    }
}

fn parse_sym(name: &str) -> Result<KeySym, KeyParseError> {
    if let Some(sym) = KeySym::from_name(name) {
        return Ok(sym);
    }
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(KeySym::from_char(ch));
    }
    let parsed = if let Some(hex) = name.strip_prefix("U+") {
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(KeySym::from_char)
    } else if let Some(hex) = name.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).ok().map(KeySym)
    } else {
        None
    };
    parsed.ok_or_else(|| KeyParseError::UnknownSym(name.to_owned()))
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }

        // A trailing "++" binds the plus key itself.
        let (modifiers, name) = match s.rsplit_once('+') {
            Some(("", "")) => ("", "+"),
            Some((head, "")) => match head.strip_suffix('+') {
                Some(modifiers) => (modifiers, "+"),
                None => return Err(KeyParseError::UnknownSym(String::new())),
            },
            Some((head, name)) => (head, name),
            None => ("", s),
        };

        let mut states = KeyStates::empty();
        for part in modifiers.split('+').filter(|part| !part.is_empty()) {
            states |= match part {
                "Control" | "Ctrl" => KeyStates::CTRL,
                "Alt" => KeyStates::ALT,
                "Shift" => KeyStates::SHIFT,
                "Super" => KeyStates::SUPER,
                "Hyper" => KeyStates::HYPER,
                "Meta" => KeyStates::META,
                other => return Err(KeyParseError::UnknownModifier(other.to_owned())),
            };
        }

        Ok(Key::new(parse_sym(name)?, states))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in MODIFIER_NAMES {
            if self.states.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        if let Some(name) = self.sym.name() {
            return f.write_str(name);
        }
        match self.sym.to_unicode() {
            Some(ch) if !ch.is_control() && !ch.is_whitespace() => write!(f, "{ch}"),
            _ => write!(f, "0x{:04x}", self.sym.0),
        }
    }
}

impl TryFrom<String> for Key {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

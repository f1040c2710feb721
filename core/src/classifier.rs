//! Predicates deciding which keys and characters may enter the edit buffer.

use std::ops::RangeInclusive;

use crate::key::Key;

/// Sentinel a compose resolver reports for an aborted sequence.
pub const INVALID_COMPOSE_RESULT: u32 = u32::MAX;

/// Latin-1 letter keysyms that layouts deliver directly (à, ß, ø, ...).
const SELECTABLE_SYMBOLS: &[RangeInclusive<u32>] =
    &[0x00c0..=0x00d6, 0x00d8..=0x00f6, 0x00f8..=0x00ff];

/// Letters usable in word lookups.
const BUFFERABLE_CHARACTERS: &[RangeInclusive<u32>] = &[
    0x0041..=0x005a,
    0x0061..=0x007a,
    0x00c0..=0x00d6,
    0x00d8..=0x00f6,
    0x00f8..=0x024f,
    0x0386..=0x0386,
    0x0388..=0x03ce,
    0x0400..=0x045f,
    0x1e00..=0x1eff,
];

/// A symbol key pressed without modifiers whose keysym is a whitelisted letter.
pub fn is_selectable_symbol(key: &Key) -> bool {
    if !key.states().is_empty() {
        return false;
    }
    let sym = key.sym().0;
    SELECTABLE_SYMBOLS.iter().any(|range| range.contains(&sym))
}

/// A composed code point that may be appended to the edit buffer.
pub fn is_bufferable_character(cp: u32) -> bool {
    if cp == 0 || cp == INVALID_COMPOSE_RESULT {
        return false;
    }
    BUFFERABLE_CHARACTERS.iter().any(|range| range.contains(&cp))
}

//! Dead-key composition.
//!
//! `DeadKeyComposer` resolves the common Latin dead keys (grave, acute,
//! circumflex, tilde and diaeresis) against static tables. Sequences are
//! tracked per session so two input contexts never share a pending accent.

use ahash::AHashMap;
use libkeyboard_core::{ComposeResolver, ComposeResult, KeySym, SessionId};
use phf::phf_map;
use tracing::trace;

static GRAVE: phf::Map<char, char> = phf_map! {
    'a' => 'à', 'e' => 'è', 'i' => 'ì', 'o' => 'ò', 'u' => 'ù',
    'A' => 'À', 'E' => 'È', 'I' => 'Ì', 'O' => 'Ò', 'U' => 'Ù',
};

static ACUTE: phf::Map<char, char> = phf_map! {
    'a' => 'á', 'e' => 'é', 'i' => 'í', 'o' => 'ó', 'u' => 'ú', 'y' => 'ý',
    'c' => 'ć', 'n' => 'ń', 's' => 'ś', 'z' => 'ź',
    'A' => 'Á', 'E' => 'É', 'I' => 'Í', 'O' => 'Ó', 'U' => 'Ú', 'Y' => 'Ý',
    'C' => 'Ć', 'N' => 'Ń', 'S' => 'Ś', 'Z' => 'Ź',
};

static CIRCUMFLEX: phf::Map<char, char> = phf_map! {
    'a' => 'â', 'e' => 'ê', 'i' => 'î', 'o' => 'ô', 'u' => 'û',
    'A' => 'Â', 'E' => 'Ê', 'I' => 'Î', 'O' => 'Ô', 'U' => 'Û',
};

static TILDE: phf::Map<char, char> = phf_map! {
    'a' => 'ã', 'n' => 'ñ', 'o' => 'õ',
    'A' => 'Ã', 'N' => 'Ñ', 'O' => 'Õ',
};

static DIAERESIS: phf::Map<char, char> = phf_map! {
    'a' => 'ä', 'e' => 'ë', 'i' => 'ï', 'o' => 'ö', 'u' => 'ü', 'y' => 'ÿ',
    'A' => 'Ä', 'E' => 'Ë', 'I' => 'Ï', 'O' => 'Ö', 'U' => 'Ü',
};

/// Composition table and spacing form of a supported dead key.
fn dead_key_table(sym: KeySym) -> Option<(&'static phf::Map<char, char>, char)> {
    match sym {
        KeySym::DEAD_GRAVE => Some((&GRAVE, '`')),
        KeySym::DEAD_ACUTE => Some((&ACUTE, '´')),
        KeySym::DEAD_CIRCUMFLEX => Some((&CIRCUMFLEX, '^')),
        KeySym::DEAD_TILDE => Some((&TILDE, '~')),
        KeySym::DEAD_DIAERESIS => Some((&DIAERESIS, '¨')),
        _ => None,
    }
}

/// Per-session dead-key resolver.
#[derive(Debug, Default)]
pub struct DeadKeyComposer {
    pending: AHashMap<SessionId, KeySym>,
}

impl DeadKeyComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `session` waits for the second key of a sequence.
    pub fn is_pending(&self, session: SessionId) -> bool {
        self.pending.contains_key(&session)
    }
}

impl ComposeResolver for DeadKeyComposer {
    fn resolve(&mut self, session: SessionId, sym: KeySym) -> ComposeResult {
        if let Some((_, spacing)) = dead_key_table(sym) {
            if self.pending.insert(session, sym) == Some(sym) {
                self.pending.remove(&session);
                return ComposeResult::Char(spacing);
            }
            trace!(session = session.0, dead = sym.0, "compose sequence started");
            return ComposeResult::Invalid;
        }

        let Some(dead) = self.pending.remove(&session) else {
            return ComposeResult::None;
        };
        let Some((table, spacing)) = dead_key_table(dead) else {
            return ComposeResult::Invalid;
        };
        if sym == KeySym::SPACE {
            return ComposeResult::Char(spacing);
        }
        match sym.to_unicode().and_then(|ch| table.get(&ch)) {
            Some(&composed) => ComposeResult::Char(composed),
            None => {
                trace!(session = session.0, sym = sym.0, "compose sequence aborted");
                ComposeResult::Invalid
            }
        }
    }

    fn reset(&mut self, session: SessionId) {
        self.pending.remove(&session);
    }
}

//! Hotkeys that pick a candidate by position.

use serde::{Deserialize, Serialize};

use crate::key::{Key, KeyStates, KeySym};

/// Modifier held together with a digit to choose a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChooseModifier {
    None,
    #[default]
    Alt,
    Control,
    Super,
}

impl ChooseModifier {
    pub fn states(self) -> KeyStates {
        match self {
            ChooseModifier::None => KeyStates::empty(),
            ChooseModifier::Alt => KeyStates::ALT,
            ChooseModifier::Control => KeyStates::CTRL,
            ChooseModifier::Super => KeyStates::SUPER,
        }
    }
}

/// Digit order of the bindings: `1` picks the first candidate, `0` the tenth.
const SELECTION_SYMS: [KeySym; 10] = [
    KeySym::KEY_1,
    KeySym::KEY_2,
    KeySym::KEY_3,
    KeySym::KEY_4,
    KeySym::KEY_5,
    KeySym::KEY_6,
    KeySym::KEY_7,
    KeySym::KEY_8,
    KeySym::KEY_9,
    KeySym::KEY_0,
];

/// Ten digit bindings sharing one modifier.
///
/// Built once per configuration load and swapped wholesale on reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionKeySet {
    keys: Vec<Key>,
}

impl SelectionKeySet {
    pub fn new(modifier: ChooseModifier) -> Self {
        let states = modifier.states();
        Self {
            keys: SELECTION_SYMS.iter().map(|&sym| Key::new(sym, states)).collect(),
        }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position of the binding matching `key`.
    pub fn index_of(&self, key: &Key) -> Option<usize> {
        key.key_list_index(&self.keys)
    }

    /// Label shown next to the candidate at `index`.
    pub fn label(&self, index: usize) -> Option<String> {
        self.keys.get(index).map(Key::to_string)
    }
}

impl Default for SelectionKeySet {
    fn default() -> Self {
        Self::new(ChooseModifier::default())
    }
}

//! libkeyboard crate root
//!
//! Frontend pieces around `libkeyboard-core`: a dead-key composer, an
//! fst-backed word list for hints, XKB rules lookup and the helpers the
//! `libkeyboard` binary uses to wire them into a `KeyboardEngine`.
//!
//! Public API exported here:
//! - `DeadKeyComposer` from `compose`
//! - `WordList` from `wordlist`
//! - `RulesResolver`, `RulesSource`, `layout_from_name` from `rules`

use std::sync::Arc;

pub mod compose;
pub mod rules;
pub mod wordlist;

pub use libkeyboard_core::{
    Candidate, CandidateList, ChooseModifier, ComposeResolver, ComposeResult, Config, EditBuffer,
    HintProvider, ImeContext, Key, KeyParseError, KeyResult, KeyStates, KeySym, KeyboardEngine,
    NoCompose, Notification, Notifier, Preedit, SelectionKeySet, SessionId, SessionState,
};

pub use compose::DeadKeyComposer;
pub use rules::{
    layout_from_name, rules_sources, ResolvedRules, RulesResolver, RulesSource, DEFAULT_RULES,
};
pub use wordlist::{normalize_word, WordList};

/// Notifier that reports tips through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            category = %notification.category,
            title = %notification.title,
            "{}",
            notification.message
        );
    }
}

/// Engine with dead-key composition and word hints from `words`.
pub fn keyboard_engine(config: Config, words: Arc<WordList>) -> KeyboardEngine {
    KeyboardEngine::new(config, DeadKeyComposer::new()).with_hint_provider(words)
}

/// Small built-in English list for trying the engine without data files.
pub fn demo_word_list() -> WordList {
    const WORDS: &[&str] = &[
        "about", "above", "after", "again", "apple", "application", "because", "before",
        "between", "cafe", "could", "different", "dictionary", "example", "family", "follow",
        "hello", "help", "important", "keyboard", "language", "little", "mother", "number",
        "people", "question", "rock-solid", "should", "something", "spelling", "thank",
        "through", "together", "world", "would", "writing",
    ];
    let mut list = WordList::new();
    if let Err(err) = list.insert_language("en", WORDS) {
        tracing::warn!("demo word list unavailable: {err:#}");
    }
    list
}

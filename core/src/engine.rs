//! Keyboard engine with per-session key event processing.
//!
//! `KeyboardEngine` owns one [`SessionState`] per input session and decides,
//! key by key, whether a keystroke is forwarded, edits the word buffer, picks
//! a candidate or commits text. After each call the host reads the session's
//! [`ImeContext`] to update preedit, candidates and deliver commit text.

use std::num::NonZeroUsize;
use std::sync::Arc;

use ahash::AHashMap;
use lru::LruCache;
use tracing::{debug, trace};

use crate::candidate::{Candidate, CandidateList, SelectionEffect};
use crate::classifier::{is_bufferable_character, is_selectable_symbol};
use crate::context::{ImeContext, Preedit};
use crate::key::{Key, KeySym};
use crate::provider::{ComposeResolver, ComposeResult, HintProvider, Notification, Notifier};
use crate::selection::SelectionKeySet;
use crate::session::SessionState;
use crate::Config;

/// Identifier of one input session, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was consumed by the engine
    Consumed,
    /// Key was not handled (pass through to application)
    Forwarded,
}

/// Keys accepted only in the middle of a word.
const HYPHEN_APOSTROPHE: [Key; 2] = [
    Key::from_sym(KeySym::MINUS),
    Key::from_sym(KeySym::APOSTROPHE),
];

const HINT_CATEGORY: &str = "keyboard-hint";

#[derive(Debug, Default)]
struct SessionSlot {
    state: SessionState,
    context: ImeContext,
}

/// (language, buffer text)
type HintKey = (String, String);

fn hint_cache(capacity: usize) -> Option<LruCache<HintKey, Vec<String>>> {
    NonZeroUsize::new(capacity).map(LruCache::new)
}

/// Word-hint keyboard engine.
///
/// Events are processed one at a time through `&mut self`; each runs to its
/// consumed or forwarded outcome before the next is accepted. Sessions are
/// independent and created lazily on first use.
pub struct KeyboardEngine {
    config: Config,
    selection_keys: Arc<SelectionKeySet>,
    sessions: AHashMap<SessionId, SessionSlot>,
    compose: Box<dyn ComposeResolver>,
    hints: Option<Arc<dyn HintProvider>>,
    notifier: Option<Box<dyn Notifier>>,
    hint_cache: Option<LruCache<HintKey, Vec<String>>>,
}

impl KeyboardEngine {
    pub fn new<C: ComposeResolver + 'static>(config: Config, compose: C) -> Self {
        let config = config.normalized();
        Self {
            selection_keys: Arc::new(SelectionKeySet::new(config.choose_modifier)),
            hint_cache: hint_cache(config.hint_cache_size),
            config,
            sessions: AHashMap::new(),
            compose: Box::new(compose),
            hints: None,
            notifier: None,
        }
    }

    pub fn with_hint_provider(mut self, hints: Arc<dyn HintProvider>) -> Self {
        self.set_hint_provider(Some(hints));
        self
    }

    pub fn with_notifier<N: Notifier + 'static>(mut self, notifier: N) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Replace the dictionary backend. Cached hints are dropped.
    pub fn set_hint_provider(&mut self, hints: Option<Arc<dyn HintProvider>>) {
        self.hints = hints;
        if let Some(cache) = self.hint_cache.as_mut() {
            cache.clear();
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selection_keys(&self) -> &SelectionKeySet {
        &self.selection_keys
    }

    pub fn session(&self, session: SessionId) -> Option<&SessionState> {
        self.sessions.get(&session).map(|slot| &slot.state)
    }

    pub fn context(&self, session: SessionId) -> Option<&ImeContext> {
        self.sessions.get(&session).map(|slot| &slot.context)
    }

    /// Context of `session`, creating the session if needed.
    ///
    /// Hosts use this to set the language and capabilities before typing.
    pub fn context_mut(&mut self, session: SessionId) -> &mut ImeContext {
        let hint_enabled = self.config.enable_hint_by_default;
        &mut self
            .sessions
            .entry(session)
            .or_insert_with(|| new_slot(session, hint_enabled))
            .context
    }

    /// Drop all state of a session that ended.
    pub fn close_session(&mut self, session: SessionId) -> bool {
        self.compose.reset(session);
        self.sessions.remove(&session).is_some()
    }

    /// Process a key event.
    ///
    /// Returns `KeyResult::Consumed` if the engine used the key, or
    /// `KeyResult::Forwarded` if it should pass through to the application.
    pub fn handle_key_event(
        &mut self,
        session: SessionId,
        key: Key,
        is_release: bool,
    ) -> KeyResult {
        if is_release || key.is_modifier() {
            return KeyResult::Forwarded;
        }
        let key = key.normalize();

        let mut slot = self.take_slot(session);
        slot.context.commit_text.clear();
        let result = self.process_key(session, &mut slot, key);
        trace!(session = session.0, %key, ?result, "key processed");
        self.sessions.insert(session, slot);
        result
    }

    /// Select a displayed candidate by index, e.g. from a mouse click.
    ///
    /// Returns false when the session shows no candidate at `index`.
    pub fn select_candidate(&mut self, session: SessionId, index: usize) -> bool {
        let Some(mut slot) = self.sessions.remove(&session) else {
            return false;
        };
        slot.context.commit_text.clear();
        let selected = self.apply_selection(session, &mut slot, index);
        self.sessions.insert(session, slot);
        selected
    }

    /// Drop buffer, candidates and compose state without committing.
    pub fn reset_session(&mut self, session: SessionId) {
        if let Some(slot) = self.sessions.get_mut(&session) {
            slot.state.reset();
            slot.context.clear_display();
        }
        self.compose.reset(session);
    }

    /// Swap in a new configuration.
    ///
    /// Selection keys, trigger keys and buffer size change at once. Displayed
    /// candidate lists are bound to the new selection keys and relabelled;
    /// buffers of running sessions are left alone until their next event.
    pub fn reload_configuration(&mut self, config: Config) {
        let config = config.normalized();
        debug!(?config, "reloading configuration");
        self.selection_keys = Arc::new(SelectionKeySet::new(config.choose_modifier));
        self.hint_cache = hint_cache(config.hint_cache_size);
        self.config = config;

        for slot in self.sessions.values_mut() {
            let Some(list) = slot.state.candidates() else {
                continue;
            };
            let list = list.rekeyed(Arc::clone(&self.selection_keys));
            slot.context.candidate_labels = list.labels();
            slot.state.set_candidates(list);
        }
    }

    fn take_slot(&mut self, session: SessionId) -> SessionSlot {
        let hint_enabled = self.config.enable_hint_by_default;
        self.sessions
            .remove(&session)
            .unwrap_or_else(|| new_slot(session, hint_enabled))
    }

    fn process_key(&mut self, session: SessionId, slot: &mut SessionSlot, key: Key) -> KeyResult {
        let compose = self.compose.resolve(session, key.sym());
        if compose == ComposeResult::Invalid {
            trace!(session = session.0, %key, "key swallowed by compose");
            return KeyResult::Consumed;
        }

        let has_dictionary = self.has_dictionary(&slot.context.language);
        if has_dictionary && key.matches_any(&self.config.hint_trigger) {
            let enabled = slot.state.toggle_hint();
            debug!(session = session.0, enabled, "word hint toggled");
            self.commit_buffer(session, slot);
            self.notify_hint(enabled);
            return KeyResult::Consumed;
        }

        if has_dictionary && slot.state.is_hint_enabled() {
            if let Some(result) = self.process_hint_key(session, slot, key, compose) {
                return result;
            }
        }

        self.commit_buffer(session, slot);
        match compose {
            ComposeResult::Char(ch) => {
                slot.context.commit(ch.encode_utf8(&mut [0; 4]));
                KeyResult::Consumed
            }
            _ => KeyResult::Forwarded,
        }
    }

    /// Candidate hotkeys, word characters and backspace.
    /// `None` falls through to commit-and-forward.
    fn process_hint_key(
        &mut self,
        session: SessionId,
        slot: &mut SessionSlot,
        key: Key,
        compose: ComposeResult,
    ) -> Option<KeyResult> {
        let selected = slot
            .state
            .candidates()
            .and_then(|list| list.index_for_key(&key));
        if let Some(index) = selected {
            self.apply_selection(session, slot, index);
            return Some(KeyResult::Consumed);
        }

        let composed = match compose {
            ComposeResult::Char(ch) => Some(ch),
            _ => None,
        };
        let valid_character = composed.is_some_and(|ch| is_bufferable_character(u32::from(ch)));
        let valid_symbol = is_selectable_symbol(&key);

        if valid_character || key.is_simple() || valid_symbol {
            let mid_word = !slot.state.buffer().is_empty() && key.matches_any(&HYPHEN_APOSTROPHE);
            let accepted = valid_character
                || key.is_laz()
                || key.is_uaz()
                || valid_symbol
                || mid_word;
            let typed = composed
                .or_else(|| key.sym().to_unicode())
                .filter(|_| accepted);
            if let Some(ch) = typed {
                slot.state.buffer_mut().append(ch);
                if slot.state.buffer().len() >= self.config.max_buffer_size {
                    debug!(session = session.0, "buffer full, committing");
                    self.commit_buffer(session, slot);
                } else {
                    self.update_candidates(slot);
                }
                return Some(KeyResult::Consumed);
            }
        } else if key.check_sym(KeySym::BACKSPACE) && slot.state.buffer_mut().backspace() {
            self.update_candidates(slot);
            return Some(KeyResult::Consumed);
        }

        None
    }

    fn apply_selection(
        &mut self,
        session: SessionId,
        slot: &mut SessionSlot,
        index: usize,
    ) -> bool {
        let Some(candidate) = slot.state.candidates().and_then(|list| list.candidate(index)) else {
            return false;
        };
        match candidate.select() {
            SelectionEffect::CommitAndReset(text) => {
                debug!(session = session.0, index, "candidate selected");
                slot.context.clear_display();
                slot.context.commit(&text);
                self.reset_state(session, slot);
            }
        }
        true
    }

    fn update_candidates(&mut self, slot: &mut SessionSlot) {
        if slot.state.buffer().is_empty() {
            slot.state.clear_candidates();
            slot.context.clear_display();
            return;
        }

        let text = slot.state.buffer().text().to_owned();
        let words = self.suggest(&slot.context.language, &text);
        let list = CandidateList::new(
            words.into_iter().map(Candidate::new).collect(),
            Arc::clone(&self.selection_keys),
        );
        let cursor = slot.state.buffer().cursor_by_char();
        slot.context.show(Preedit::new(text, cursor), &list);
        slot.state.set_candidates(list);
    }

    fn suggest(&mut self, language: &str, text: &str) -> Vec<String> {
        let Some(hints) = self.hints.as_ref() else {
            return Vec::new();
        };

        let cache_key = (language.to_owned(), text.to_owned());
        if let Some(words) = self.hint_cache.as_mut().and_then(|cache| cache.get(&cache_key)) {
            trace!(language, text, "hint cache hit");
            return words.clone();
        }

        let page_size = self.config.page_size;
        let mut words = hints.suggest(language, text, page_size);
        words.truncate(page_size);
        if let Some(cache) = self.hint_cache.as_mut() {
            cache.put(cache_key, words.clone());
        }
        words
    }

    fn has_dictionary(&self, language: &str) -> bool {
        self.hints
            .as_ref()
            .is_some_and(|hints| hints.has_dictionary(language))
    }

    fn commit_buffer(&mut self, session: SessionId, slot: &mut SessionSlot) {
        if slot.state.buffer().is_empty() {
            return;
        }
        debug!(session = session.0, chars = slot.state.buffer().len(), "committing buffer");
        slot.context.commit(slot.state.buffer().text());
        self.reset_state(session, slot);
        slot.context.clear_display();
    }

    fn reset_state(&mut self, session: SessionId, slot: &mut SessionSlot) {
        slot.state.reset();
        self.compose.reset(session);
    }

    fn notify_hint(&self, enabled: bool) {
        let Some(notifier) = self.notifier.as_ref() else {
            return;
        };
        let message = if enabled {
            "Spell hint is enabled."
        } else {
            "Spell hint is disabled."
        };
        notifier.notify(Notification {
            category: HINT_CATEGORY.to_string(),
            title: "Spell hint".to_string(),
            message: message.to_string(),
        });
    }
}

fn new_slot(session: SessionId, hint_enabled: bool) -> SessionSlot {
    debug!(session = session.0, hint_enabled, "creating session state");
    SessionSlot {
        state: SessionState::new(hint_enabled),
        context: ImeContext::new(),
    }
}

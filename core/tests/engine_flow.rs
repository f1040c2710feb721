//! End-to-end tests for the keyboard engine state machine.
//!
//! Tests cover:
//! - Hint toggling with and without a dictionary
//! - Buffer accumulation, hyphen/apostrophe rules and backspace
//! - Forced commit at the buffer limit
//! - Candidate selection by hotkey and by index
//! - Dead-key compose results (aborted and finished sequences)
//! - Configuration reload and per-session independence

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use libkeyboard_core::{
    ComposeResolver, ComposeResult, Config, HintProvider, Key, KeyResult, KeyStates, KeySym,
    KeyboardEngine, Notification, Notifier, SessionId,
};

const EN: SessionId = SessionId(1);

const WORDS: &[&str] = &["cat", "catalog", "caterpillar", "hello", "help", "rock-solid"];

#[derive(Default)]
struct FakeDictionary {
    queries: Mutex<Vec<String>>,
}

impl FakeDictionary {
    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl HintProvider for FakeDictionary {
    fn has_dictionary(&self, language: &str) -> bool {
        language == "en"
    }

    fn suggest(&self, _language: &str, text: &str, max: usize) -> Vec<String> {
        self.queries.lock().unwrap().push(text.to_string());
        WORDS
            .iter()
            .filter(|word| word.starts_with(text))
            .take(max)
            .map(|word| word.to_string())
            .collect()
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier(Arc<Mutex<Vec<Notification>>>);

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.lock().unwrap().push(notification);
    }
}

// dead_acute + a/e composes, anything else after it aborts
#[derive(Clone, Default)]
struct AcuteCompose {
    pending: Arc<Mutex<HashSet<SessionId>>>,
    resets: Arc<Mutex<usize>>,
}

impl ComposeResolver for AcuteCompose {
    fn resolve(&mut self, session: SessionId, sym: KeySym) -> ComposeResult {
        let mut pending = self.pending.lock().unwrap();
        if sym == KeySym::DEAD_ACUTE {
            pending.insert(session);
            return ComposeResult::Invalid;
        }
        if !pending.remove(&session) {
            return ComposeResult::None;
        }
        match sym.to_unicode() {
            Some('a') => ComposeResult::Char('á'),
            Some('e') => ComposeResult::Char('é'),
            _ => ComposeResult::Invalid,
        }
    }

    fn reset(&mut self, session: SessionId) {
        self.pending.lock().unwrap().remove(&session);
        *self.resets.lock().unwrap() += 1;
    }
}

struct Harness {
    engine: KeyboardEngine,
    dictionary: Arc<FakeDictionary>,
    notes: RecordingNotifier,
    compose: AcuteCompose,
}

impl Harness {
    fn new(config: Config) -> Self {
        let dictionary = Arc::new(FakeDictionary::default());
        let notes = RecordingNotifier::default();
        let compose = AcuteCompose::default();
        let mut engine = KeyboardEngine::new(config, compose.clone())
            .with_hint_provider(dictionary.clone())
            .with_notifier(notes.clone());
        engine.context_mut(EN).language = "en".to_string();
        Self {
            engine,
            dictionary,
            notes,
            compose,
        }
    }

    fn press(&mut self, key: Key) -> KeyResult {
        self.engine.handle_key_event(EN, key, false)
    }

    fn type_str(&mut self, text: &str) {
        for ch in text.chars() {
            assert_eq!(self.press(Key::from_char(ch)), KeyResult::Consumed, "typing {ch:?}");
        }
    }

    fn toggle(&mut self) -> KeyResult {
        self.press(trigger())
    }

    fn buffer(&self) -> String {
        self.engine.session(EN).unwrap().buffer().text().to_string()
    }

    fn commit(&self) -> String {
        self.engine.context(EN).unwrap().commit_text.clone()
    }

    fn candidates(&self) -> Vec<String> {
        self.engine.context(EN).unwrap().candidates.clone()
    }

    fn notifications(&self) -> Vec<Notification> {
        self.notes.0.lock().unwrap().clone()
    }
}

fn trigger() -> Key {
    "Control+Alt+h".parse().unwrap()
}

fn alt(digit: char) -> Key {
    Key::new(KeySym::from_char(digit), KeyStates::ALT)
}

fn hinting() -> Harness {
    let mut harness = Harness::new(Config::default());
    assert_eq!(harness.toggle(), KeyResult::Consumed);
    harness
}

#[test]
fn test_toggle_type_and_select() {
    let mut h = Harness::new(Config::default());

    assert_eq!(h.toggle(), KeyResult::Consumed);
    assert!(h.engine.session(EN).unwrap().is_hint_enabled());
    let notes = h.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].category, "keyboard-hint");
    assert_eq!(notes[0].message, "Spell hint is enabled.");

    h.type_str("cat");
    assert_eq!(h.dictionary.queries().last().map(String::as_str), Some("cat"));
    assert_eq!(h.candidates(), vec!["cat", "catalog", "caterpillar"]);
    let context = h.engine.context(EN).unwrap();
    assert_eq!(context.client_preedit.text, "cat");
    assert_eq!(context.client_preedit.cursor, Some(3));
    assert_eq!(context.candidate_labels, vec!["Alt+1", "Alt+2", "Alt+3"]);

    assert_eq!(h.press(alt('1')), KeyResult::Consumed);
    assert_eq!(h.commit(), "cat");
    assert_eq!(h.buffer(), "");
    assert!(h.engine.session(EN).unwrap().candidates().is_none());
    assert!(!h.engine.context(EN).unwrap().has_visible_state());
}

#[test]
fn test_buffer_is_concatenation_of_keys() {
    let mut h = hinting();
    h.type_str("HelLo");
    assert_eq!(h.buffer(), "HelLo");
    assert_eq!(h.commit(), "");
}

#[test]
fn test_backspace_shortens_by_one() {
    let mut h = hinting();
    h.type_str("help");

    assert_eq!(h.press(Key::from_sym(KeySym::BACKSPACE)), KeyResult::Consumed);
    assert_eq!(h.buffer(), "hel");
    assert_eq!(h.candidates(), vec!["hello", "help"]);
    assert_eq!(h.engine.context(EN).unwrap().client_preedit.cursor, Some(3));
}

#[test]
fn test_backspace_to_empty_clears_display() {
    let mut h = hinting();
    h.type_str("h");

    assert_eq!(h.press(Key::from_sym(KeySym::BACKSPACE)), KeyResult::Consumed);
    assert_eq!(h.buffer(), "");
    assert!(h.engine.session(EN).unwrap().candidates().is_none());
    assert!(!h.engine.context(EN).unwrap().has_visible_state());

    // nothing left to edit: the host must see the key
    assert_eq!(h.press(Key::from_sym(KeySym::BACKSPACE)), KeyResult::Forwarded);
    assert_eq!(h.commit(), "");
}

#[test]
fn test_buffer_limit_forces_commit() {
    let mut h = Harness::new(Config {
        max_buffer_size: 3,
        ..Config::default()
    });
    h.toggle();

    h.type_str("ab");
    assert_eq!(h.commit(), "");
    assert_eq!(h.press(Key::from_char('c')), KeyResult::Consumed);

    assert_eq!(h.commit(), "abc");
    assert_eq!(h.buffer(), "");
    assert!(h.engine.session(EN).unwrap().candidates().is_none());
    assert!(!h.engine.context(EN).unwrap().has_visible_state());
    // the full buffer is never looked up
    assert_eq!(h.dictionary.queries(), vec!["a", "ab"]);
}

#[test]
fn test_hyphen_and_apostrophe_need_a_word() {
    let mut h = hinting();

    assert_eq!(h.press(Key::from_sym(KeySym::MINUS)), KeyResult::Forwarded);
    assert_eq!(h.press(Key::from_sym(KeySym::APOSTROPHE)), KeyResult::Forwarded);
    assert_eq!(h.buffer(), "");

    h.type_str("rock-");
    assert_eq!(h.buffer(), "rock-");
    assert_eq!(h.candidates(), vec!["rock-solid"]);

    h.type_str("n'");
    assert_eq!(h.buffer(), "rock-n'");
}

#[test]
fn test_toggle_without_dictionary_is_ignored() {
    let mut h = Harness::new(Config::default());
    h.engine.context_mut(EN).language = "tlh".to_string();

    assert_eq!(h.toggle(), KeyResult::Forwarded);
    assert!(!h.engine.session(EN).unwrap().is_hint_enabled());
    assert!(h.notifications().is_empty());

    // without hints letters go straight to the application
    assert_eq!(h.press(Key::from_char('q')), KeyResult::Forwarded);
    assert_eq!(h.buffer(), "");
}

#[test]
fn test_toggle_off_commits_pending_word() {
    let mut h = hinting();
    h.type_str("hel");

    assert_eq!(h.toggle(), KeyResult::Consumed);

    assert_eq!(h.commit(), "hel");
    assert_eq!(h.buffer(), "");
    assert!(!h.engine.session(EN).unwrap().is_hint_enabled());
    assert_eq!(h.notifications()[1].message, "Spell hint is disabled.");
}

#[test]
fn test_aborted_compose_leaves_buffer_untouched() {
    let mut h = hinting();
    h.type_str("ca");

    assert_eq!(h.press(Key::from_sym(KeySym::DEAD_ACUTE)), KeyResult::Consumed);
    assert_eq!(h.buffer(), "ca");
    assert_eq!(h.press(Key::from_char('x')), KeyResult::Consumed);
    assert_eq!(h.buffer(), "ca");
    assert_eq!(h.commit(), "");
    assert_eq!(h.dictionary.queries(), vec!["c", "ca"]);
}

#[test]
fn test_composed_letter_joins_the_word() {
    let mut h = hinting();
    h.type_str("caf");
    h.press(Key::from_sym(KeySym::DEAD_ACUTE));

    assert_eq!(h.press(Key::from_char('e')), KeyResult::Consumed);
    assert_eq!(h.buffer(), "café");
    assert_eq!(h.engine.context(EN).unwrap().client_preedit.cursor, Some(4));
}

#[test]
fn test_composed_letter_without_hints_is_committed() {
    let mut h = Harness::new(Config::default());
    h.press(Key::from_sym(KeySym::DEAD_ACUTE));

    assert_eq!(h.press(Key::from_char('a')), KeyResult::Consumed);
    assert_eq!(h.commit(), "á");
}

#[test]
fn test_command_key_commits_word_and_forwards() {
    let mut h = hinting();
    h.type_str("hel");

    let copy = Key::new(KeySym::from_char('c'), KeyStates::CTRL);
    assert_eq!(h.press(copy), KeyResult::Forwarded);
    assert_eq!(h.commit(), "hel");
    assert_eq!(h.buffer(), "");
}

#[test]
fn test_commit_resets_compose_state() {
    let mut h = hinting();
    h.type_str("ca");
    let before = *h.compose.resets.lock().unwrap();

    h.press(Key::from_sym(KeySym::SPACE));

    assert_eq!(*h.compose.resets.lock().unwrap(), before + 1);
}

#[test]
fn test_selection_key_out_of_range() {
    let mut h = hinting();
    h.type_str("hel");
    assert_eq!(h.candidates().len(), 2);

    // Alt+5 has no candidate: the word is committed and the key forwarded
    assert_eq!(h.press(alt('5')), KeyResult::Forwarded);
    assert_eq!(h.commit(), "hel");
}

#[test]
fn test_external_selection_matches_hotkey() {
    let mut h = hinting();
    h.type_str("cat");

    assert!(h.engine.select_candidate(EN, 1));
    assert_eq!(h.commit(), "catalog");
    assert_eq!(h.buffer(), "");
    assert!(!h.engine.select_candidate(EN, 0));
}

#[test]
fn test_reload_relabels_shown_candidates() {
    let mut h = hinting();
    h.type_str("cat");

    let mut config = h.engine.config().clone();
    config.choose_modifier = libkeyboard_core::ChooseModifier::Control;
    h.engine.reload_configuration(config);

    assert_eq!(h.buffer(), "cat");
    let context = h.engine.context(EN).unwrap();
    assert_eq!(context.candidate_labels, vec!["Control+1", "Control+2", "Control+3"]);

    let control_three = Key::new(KeySym::KEY_3, KeyStates::CTRL);
    assert_eq!(h.press(control_three), KeyResult::Consumed);
    assert_eq!(h.commit(), "caterpillar");
}

#[test]
fn test_old_hotkey_after_reload_commits_and_forwards() {
    let mut h = hinting();
    h.type_str("cat");

    let mut config = h.engine.config().clone();
    config.choose_modifier = libkeyboard_core::ChooseModifier::Control;
    h.engine.reload_configuration(config);

    assert_eq!(h.press(alt('1')), KeyResult::Forwarded);
    assert_eq!(h.commit(), "cat");
}

#[test]
fn test_plain_digits_select_when_candidates_shown() {
    let mut h = Harness::new(Config {
        choose_modifier: libkeyboard_core::ChooseModifier::None,
        ..Config::default()
    });
    h.toggle();
    h.type_str("hel");
    assert_eq!(h.engine.context(EN).unwrap().candidate_labels, vec!["1", "2"]);

    assert_eq!(h.press(Key::from_char('2')), KeyResult::Consumed);
    assert_eq!(h.commit(), "help");
    assert_eq!(h.buffer(), "");

    // no candidates left: the digit is an ordinary key again
    assert_eq!(h.press(Key::from_char('1')), KeyResult::Forwarded);
    assert_eq!(h.commit(), "");
}

#[test]
fn test_plain_digit_out_of_range_commits_and_forwards() {
    let mut h = Harness::new(Config {
        choose_modifier: libkeyboard_core::ChooseModifier::None,
        ..Config::default()
    });
    h.toggle();
    h.type_str("hel");

    assert_eq!(h.press(Key::from_char('5')), KeyResult::Forwarded);
    assert_eq!(h.commit(), "hel");
    assert_eq!(h.buffer(), "");
}

#[test]
fn test_shifted_latin1_capital_joins_word() {
    let mut h = hinting();
    h.type_str("x");

    let u_diaeresis = Key::new(KeySym(0x00dc), KeyStates::SHIFT);
    assert_eq!(h.press(u_diaeresis), KeyResult::Consumed);
    assert_eq!(h.buffer(), "xÜ");

    let mut h = hinting();
    assert_eq!(h.press(u_diaeresis), KeyResult::Consumed);
    h.type_str("ber");
    assert_eq!(h.buffer(), "Über");
}

#[test]
fn test_reload_swaps_selection_keys() {
    let mut h = hinting();
    h.type_str("ca");

    let mut config = h.engine.config().clone();
    config.choose_modifier = libkeyboard_core::ChooseModifier::Control;
    h.engine.reload_configuration(config);
    assert_eq!(h.buffer(), "ca");

    h.type_str("t");
    let control_two = Key::new(KeySym::KEY_2, KeyStates::CTRL);
    assert_eq!(h.press(control_two), KeyResult::Consumed);
    assert_eq!(h.commit(), "catalog");
}

#[test]
fn test_without_inline_preedit_panel_shows_it() {
    let mut h = hinting();
    h.engine.context_mut(EN).supports_preedit = false;
    h.type_str("he");

    let context = h.engine.context(EN).unwrap();
    assert_eq!(context.panel_preedit.text, "he");
    assert_eq!(context.panel_preedit, context.client_preedit);
}

#[test]
fn test_hint_cache_serves_revisited_prefix() {
    let mut h = Harness::new(Config {
        hint_cache_size: 64,
        ..Config::default()
    });
    h.toggle();
    h.type_str("ca");
    h.press(Key::from_sym(KeySym::BACKSPACE));

    assert_eq!(h.buffer(), "c");
    assert_eq!(h.dictionary.queries(), vec!["c", "ca"]);
}

#[test]
fn test_every_refresh_queries_dictionary_by_default() {
    let mut h = hinting();
    h.type_str("ca");
    h.press(Key::from_sym(KeySym::BACKSPACE));

    assert_eq!(h.dictionary.queries(), vec!["c", "ca", "c"]);
}

#[test]
fn test_retyped_word_is_looked_up_again() {
    let mut h = hinting();
    for _ in 0..2 {
        h.type_str("cat");
        assert!(h.engine.select_candidate(EN, 0));
        assert_eq!(h.commit(), "cat");
    }

    assert_eq!(h.dictionary.queries(), vec!["c", "ca", "cat", "c", "ca", "cat"]);
}

#[test]
fn test_reset_session_discards_without_commit() {
    let mut h = hinting();
    h.type_str("hel");

    h.engine.reset_session(EN);

    assert_eq!(h.buffer(), "");
    assert_eq!(h.commit(), "");
    assert!(h.engine.session(EN).unwrap().is_hint_enabled());
    assert!(!h.engine.context(EN).unwrap().has_visible_state());
}

#[test]
fn test_sessions_are_independent() {
    let mut h = hinting();
    let other = SessionId(2);
    h.engine.context_mut(other).language = "en".to_string();

    h.type_str("he");
    assert_eq!(h.engine.handle_key_event(other, Key::from_char('c'), false), KeyResult::Forwarded);
    assert_eq!(h.buffer(), "he");
    assert!(h.engine.session(other).unwrap().buffer().is_empty());

    assert!(h.engine.close_session(other));
    assert!(h.engine.session(other).is_none());
}

#[test]
fn test_hint_on_by_default() {
    let mut h = Harness::new(Config {
        enable_hint_by_default: true,
        ..Config::default()
    });
    h.type_str("he");
    assert_eq!(h.candidates(), vec!["hello", "help"]);
}

//! Prefix word hints backed by `fst` sets.
//!
//! Each language owns one immutable `fst::Set` of NFC-normalized, lower-case
//! words. A hint query is normalized the same way and answered with the words
//! that start with it, in lexicographic order. When the typed text starts
//! with a capital letter the suggestions do too.

use std::collections::BTreeSet;
use std::path::Path;

use ahash::AHashMap;
use anyhow::Context;
use fst::automaton::{Automaton, Str};
use fst::{IntoStreamer, Set, Streamer};
use libkeyboard_core::HintProvider;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Canonical form words are stored and looked up in.
pub fn normalize_word(word: &str) -> String {
    word.trim().nfc().collect::<String>().to_lowercase()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Word sets for any number of languages.
#[derive(Default)]
pub struct WordList {
    sets: AHashMap<String, Set<Vec<u8>>>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set for `language` from `words`, replacing any previous one.
    ///
    /// Returns the number of distinct words stored.
    pub fn insert_language<I, S>(&mut self, language: &str, words: I) -> anyhow::Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = words
            .into_iter()
            .map(|word| normalize_word(word.as_ref()))
            .filter(|word| !word.is_empty())
            .collect();
        let set = Set::from_iter(&sorted)
            .with_context(|| format!("build word set for {language}"))?;
        debug!(language, words = sorted.len(), "word list loaded");
        self.sets.insert(language.to_string(), set);
        Ok(sorted.len())
    }

    /// Load a plain text word list, one word per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn load_language<P: AsRef<Path>>(
        &mut self,
        language: &str,
        path: P,
    ) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read word list {}", path.display()))?;
        let words = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        self.insert_language(language, words)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Number of words stored for `language`.
    pub fn word_count(&self, language: &str) -> usize {
        self.sets.get(language).map_or(0, |set| set.len())
    }

    pub fn contains(&self, language: &str, word: &str) -> bool {
        self.sets
            .get(language)
            .is_some_and(|set| set.contains(normalize_word(word)))
    }
}

impl HintProvider for WordList {
    fn has_dictionary(&self, language: &str) -> bool {
        self.sets.contains_key(language)
    }

    fn suggest(&self, language: &str, text: &str, max: usize) -> Vec<String> {
        let Some(set) = self.sets.get(language) else {
            return Vec::new();
        };
        let query = normalize_word(text);
        if query.is_empty() || max == 0 {
            return Vec::new();
        }
        let upper = text.chars().next().is_some_and(char::is_uppercase);

        let mut stream = set.search(Str::new(&query).starts_with()).into_stream();
        let mut words = Vec::new();
        while let Some(bytes) = stream.next() {
            let Ok(word) = std::str::from_utf8(bytes) else {
                continue;
            };
            words.push(if upper { capitalize(word) } else { word.to_string() });
            if words.len() >= max {
                break;
            }
        }
        words
    }
}

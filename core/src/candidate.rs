//! Candidate types for word hints.
//!
//! This module provides:
//! - `Candidate`: A single selectable text proposal
//! - `SelectionEffect`: What selecting a candidate does to its session
//! - `CandidateList`: The ordered proposals for the current buffer

use std::sync::Arc;

use crate::key::Key;
use crate::selection::SelectionKeySet;

/// Effect of selecting a candidate, applied by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEffect {
    /// Drop candidates and preedit, commit the text, reset the session.
    CommitAndReset(String),
}

/// A single text proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Candidate { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn select(&self) -> SelectionEffect {
        SelectionEffect::CommitAndReset(self.text.clone())
    }
}

/// Candidates shown for the current buffer, in provider order.
///
/// Each list carries the selection keys its labels are drawn from, and
/// hotkeys are matched against those same keys.
#[derive(Debug, Clone)]
pub struct CandidateList {
    candidates: Vec<Candidate>,
    selection_keys: Arc<SelectionKeySet>,
}

impl CandidateList {
    pub fn new(candidates: Vec<Candidate>, selection_keys: Arc<SelectionKeySet>) -> Self {
        Self {
            candidates,
            selection_keys,
        }
    }

    /// Get all candidates.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn selection_keys(&self) -> &SelectionKeySet {
        &self.selection_keys
    }

    /// Index of the candidate bound to `key`, if it exists in this list.
    pub fn index_for_key(&self, key: &Key) -> Option<usize> {
        self.selection_keys
            .index_of(key)
            .filter(|&index| index < self.len())
    }

    /// Same candidates bound to another key set.
    pub fn rekeyed(&self, selection_keys: Arc<SelectionKeySet>) -> Self {
        Self::new(self.candidates.clone(), selection_keys)
    }

    pub fn texts(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.text.clone()).collect()
    }

    /// Display labels, one per candidate that has a selection key.
    pub fn labels(&self) -> Vec<String> {
        (0..self.len())
            .map_while(|index| self.selection_keys.label(index))
            .collect()
    }
}

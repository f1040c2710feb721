//! Per-session editing state.
//!
//! A `SessionState` belongs to exactly one input session. It holds the word
//! being typed, whether word hints are on, and the candidates offered for the
//! current buffer.

use crate::candidate::CandidateList;
use crate::edit_buffer::EditBuffer;

/// Editing state of one input session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    buffer: EditBuffer,
    hint_enabled: bool,
    candidates: Option<CandidateList>,
}

impl SessionState {
    pub fn new(hint_enabled: bool) -> Self {
        Self {
            hint_enabled,
            ..Self::default()
        }
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.buffer
    }

    pub fn is_hint_enabled(&self) -> bool {
        self.hint_enabled
    }

    pub fn set_hint_enabled(&mut self, enabled: bool) {
        self.hint_enabled = enabled;
    }

    /// Flip the hint flag and return the new value.
    pub fn toggle_hint(&mut self) -> bool {
        self.hint_enabled = !self.hint_enabled;
        self.hint_enabled
    }

    pub fn candidates(&self) -> Option<&CandidateList> {
        self.candidates.as_ref()
    }

    pub fn set_candidates(&mut self, candidates: CandidateList) {
        self.candidates = Some(candidates);
    }

    pub fn clear_candidates(&mut self) {
        self.candidates = None;
    }

    /// Hinting with a non-empty buffer.
    pub fn is_accumulating(&self) -> bool {
        self.hint_enabled && !self.buffer.is_empty()
    }

    /// Clear the buffer and drop candidates. The hint flag is kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.candidates = None;
    }
}

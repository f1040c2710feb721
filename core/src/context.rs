//! IME context for platform communication.
//!
//! The `ImeContext` struct is a plain data container with public fields. The
//! host fills in what it knows about the session (language, capabilities) and,
//! after each call into the engine, reads back preedit, candidates and commit
//! text to update its display and deliver typed text.
//!
//! No callbacks, no traits: the host reads and writes fields directly.

use crate::candidate::CandidateList;

/// Text shown in place before it is committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preedit {
    pub text: String,
    /// Cursor position in characters, `None` hides the cursor.
    pub cursor: Option<usize>,
}

impl Preedit {
    pub fn new<T: Into<String>>(text: T, cursor: usize) -> Self {
        Self {
            text: text.into(),
            cursor: Some(cursor),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Per-session state exchanged with the host.
#[derive(Debug, Clone)]
pub struct ImeContext {
    /// Language tag of the active input method (e.g. "en", "de")
    pub language: String,

    /// Whether the client application renders preedit inline
    pub supports_preedit: bool,

    /// Preedit rendered inside the client application
    pub client_preedit: Preedit,

    /// Preedit rendered in the input panel, set only without inline support
    pub panel_preedit: Preedit,

    /// Candidate strings to display
    pub candidates: Vec<String>,

    /// Selection key label for each displayed candidate
    pub candidate_labels: Vec<String>,

    /// Text committed to the application during the last event
    pub commit_text: String,
}

impl ImeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language<T: Into<String>>(language: T) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    /// Clear preedit and candidates.
    /// Does NOT clear commit_text (platform should consume it first).
    pub fn clear_display(&mut self) {
        self.client_preedit = Preedit::default();
        self.panel_preedit = Preedit::default();
        self.candidates.clear();
        self.candidate_labels.clear();
    }

    /// Show a refreshed preedit and candidate list.
    pub fn show(&mut self, preedit: Preedit, candidates: &CandidateList) {
        self.panel_preedit = if self.supports_preedit {
            Preedit::default()
        } else {
            preedit.clone()
        };
        self.client_preedit = preedit;
        self.candidates = candidates.texts();
        self.candidate_labels = candidates.labels();
    }

    /// Append text for delivery to the application.
    pub fn commit(&mut self, text: &str) {
        self.commit_text.push_str(text);
    }

    /// Take the commit text, leaving it empty.
    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit_text)
    }

    /// Check if there's any visible state (preedit or candidates).
    pub fn has_visible_state(&self) -> bool {
        !self.client_preedit.is_empty()
            || !self.panel_preedit.is_empty()
            || !self.candidates.is_empty()
    }

    /// Check if there's text to commit.
    pub fn has_commit(&self) -> bool {
        !self.commit_text.is_empty()
    }
}

impl Default for ImeContext {
    fn default() -> Self {
        Self {
            language: String::new(),
            supports_preedit: true,
            client_preedit: Preedit::default(),
            panel_preedit: Preedit::default(),
            candidates: Vec::new(),
            candidate_labels: Vec::new(),
            commit_text: String::new(),
        }
    }
}

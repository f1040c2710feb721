//! Edit buffer accumulating the word being typed.
//!
//! The buffer only grows and shrinks at its end: the cursor always trails the
//! last character, so there is no mid-buffer editing. Its size limit is owned
//! by the engine, which checks `len()` after every append.

/// Ordered code points typed since the last commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    chars: usize,
}

impl EditBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a character at the end.
    pub fn append(&mut self, ch: char) {
        self.text.push(ch);
        self.chars += 1;
    }

    /// Remove the last character.
    /// Returns false when the buffer was already empty.
    pub fn backspace(&mut self) -> bool {
        if self.text.pop().is_some() {
            self.chars -= 1;
            true
        } else {
            false
        }
    }

    /// Number of code points in the buffer.
    pub fn len(&self) -> usize {
        self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.chars == 0
    }

    /// Cursor position in code points.
    pub fn cursor_by_char(&self) -> usize {
        self.chars
    }

    /// Cursor position as a byte offset into `text()`.
    pub fn cursor(&self) -> usize {
        self.text.len()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.chars = 0;
    }
}

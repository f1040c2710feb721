//! Collaborators the engine calls while processing a key.
//!
//! Compose resolution, dictionaries and notifications live outside this
//! crate. Hosts plug them in through these traits; every call is synchronous
//! and completes before the triggering key event finishes.

use crate::engine::SessionId;
use crate::key::KeySym;

/// Outcome of feeding one keysym to the compose resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeResult {
    /// Not part of a composition, use the raw key.
    None,
    /// A composition finished with this character.
    Char(char),
    /// The key was absorbed by a sequence or aborted it; swallow the event.
    Invalid,
}

/// Dead-key and compose-sequence handling, tracked per session.
pub trait ComposeResolver {
    fn resolve(&mut self, session: SessionId, sym: KeySym) -> ComposeResult;

    /// Forget any partial sequence for `session`.
    fn reset(&mut self, session: SessionId);
}

/// Resolver for hosts that do their own composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompose;

impl ComposeResolver for NoCompose {
    fn resolve(&mut self, _session: SessionId, _sym: KeySym) -> ComposeResult {
        ComposeResult::None
    }

    fn reset(&mut self, _session: SessionId) {}
}

/// Dictionary-backed word hints.
pub trait HintProvider {
    fn has_dictionary(&self, language: &str) -> bool;

    /// Up to `max` ranked completions of `text`, best first.
    fn suggest(&self, language: &str, text: &str, max: usize) -> Vec<String>;
}

/// A tip shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub category: String,
    pub title: String,
    pub message: String,
}

/// Fire-and-forget notification sink.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

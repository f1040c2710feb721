//! libkeyboard-core
//!
//! Event-processing core of a keyboard input method with dictionary-backed
//! word hints. Raw key events become forwarded keys, edits of a small word
//! buffer that drives candidate lookups, or committed text.
//!
//! Public API:
//! - `KeyboardEngine` - Per-session key event state machine
//! - `Key`, `KeySym`, `KeyStates` - Key model and binding syntax
//! - `EditBuffer`, `SessionState` - Word buffer and session state
//! - `CandidateList`, `SelectionKeySet` - Candidates and their hotkeys
//! - `ImeContext` - Data exchanged with the host after each event
//! - `ComposeResolver`, `HintProvider`, `Notifier` - Pluggable collaborators
//! - `Config` - Configuration, loadable from TOML
//!
//! ## Usage
//!
//! ```rust,ignore
//! use libkeyboard_core::{Config, Key, KeyboardEngine, NoCompose, SessionId};
//!
//! let mut engine = KeyboardEngine::new(Config::default(), NoCompose)
//!     .with_hint_provider(dictionary);
//! let session = SessionId(1);
//! engine.context_mut(session).language = "en".into();
//!
//! engine.handle_key_event(session, "Control+Alt+h".parse()?, false);
//! engine.handle_key_event(session, Key::from_char('c'), false);
//! println!("{:?}", engine.context(session).map(|c| &c.candidates));
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub mod key;
pub use key::{Key, KeyParseError, KeyStates, KeySym};

pub mod classifier;
pub use classifier::{is_bufferable_character, is_selectable_symbol, INVALID_COMPOSE_RESULT};

pub mod edit_buffer;
pub use edit_buffer::EditBuffer;

pub mod selection;
pub use selection::{ChooseModifier, SelectionKeySet};

pub mod candidate;
pub use candidate::{Candidate, CandidateList, SelectionEffect};

pub mod context;
pub use context::{ImeContext, Preedit};

pub mod session;
pub use session::SessionState;

pub mod provider;
pub use provider::{ComposeResolver, ComposeResult, HintProvider, NoCompose, Notification, Notifier};

pub mod engine;
pub use engine::{KeyResult, KeyboardEngine, SessionId};

/// Engine configuration.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Keys that toggle word hints (default: Control+Alt+h)
    pub hint_trigger: Vec<Key>,

    /// Modifier held with digits 1..0 to pick a candidate
    pub choose_modifier: ChooseModifier,

    /// Maximum number of candidates requested per refresh
    pub page_size: usize,

    /// Buffer length that forces an immediate commit
    pub max_buffer_size: usize,

    /// Whether new sessions start with word hints enabled
    pub enable_hint_by_default: bool,

    /// Number of cached hint lookups, 0 (the default) disables the cache.
    /// Only useful with dictionaries whose answers never change.
    pub hint_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hint_trigger: vec![Key::new(
                KeySym::from_char('h'),
                KeyStates::CTRL.union(KeyStates::ALT),
            )],
            choose_modifier: ChooseModifier::Alt,
            page_size: 5,
            max_buffer_size: 20,
            enable_hint_by_default: false,
            hint_cache_size: 0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).with_context(|| format!("write config {}", path.display()))
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Replace the hint trigger with a whitespace separated key list.
    pub fn set_hint_trigger(&mut self, keys: &str) -> Result<(), KeyParseError> {
        self.hint_trigger = Key::parse_list(keys)?;
        Ok(())
    }

    /// Clamp sizes the engine cannot work with.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.max_buffer_size = self.max_buffer_size.max(1);
        self
    }
}

//! XKB rules file selection and keyboard input method names.
//!
//! Rules are looked up from an ordered list of sources. The first source whose
//! file is accepted wins, so an explicit override beats the rules name reported
//! by the display server, which beats the built-in default.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Rules used when nothing else is available.
pub const DEFAULT_RULES: &str = "evdev";

/// Prefix of keyboard input method names, e.g. `keyboard-us-intl`.
pub const IM_NAME_PREFIX: &str = "keyboard-";

/// One place the rules file may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    /// A rules file path given by the user.
    Explicit(PathBuf),
    /// A rules name reported by the display server, absolute or bare.
    Detected(String),
    /// The built-in default rules.
    Default,
}

/// The rules file that was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRules {
    pub path: PathBuf,
    /// Name reported to users: the file path, or the default rules name.
    pub name: String,
    pub source: RulesSource,
}

/// Maps rules sources to files under an XKB base directory.
#[derive(Debug, Clone)]
pub struct RulesResolver {
    base_dir: PathBuf,
}

impl Default for RulesResolver {
    fn default() -> Self {
        Self::new("/usr/share/X11/xkb")
    }
}

impl RulesResolver {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The file a source points at.
    ///
    /// A detected absolute name gets `.xml` appended; a bare name is looked up
    /// under `<base>/rules/`.
    pub fn path_for(&self, source: &RulesSource) -> PathBuf {
        match source {
            RulesSource::Explicit(path) => path.clone(),
            RulesSource::Detected(name) if name.starts_with('/') => {
                PathBuf::from(format!("{name}.xml"))
            }
            RulesSource::Detected(name) => self.rules_file(name),
            RulesSource::Default => self.rules_file(DEFAULT_RULES),
        }
    }

    fn rules_file(&self, name: &str) -> PathBuf {
        self.base_dir.join("rules").join(format!("{name}.xml"))
    }

    /// Pick the first source whose file `accept` takes.
    ///
    /// Empty detected names are skipped without consulting `accept`.
    pub fn resolve<F>(&self, sources: &[RulesSource], mut accept: F) -> Option<ResolvedRules>
    where
        F: FnMut(&Path) -> bool,
    {
        for source in sources {
            if matches!(source, RulesSource::Detected(name) if name.is_empty()) {
                continue;
            }
            let path = self.path_for(source);
            if !accept(&path) {
                debug!(path = %path.display(), "rules file rejected");
                continue;
            }
            let name = match source {
                RulesSource::Default => DEFAULT_RULES.to_string(),
                _ => path.display().to_string(),
            };
            debug!(%name, "rules file selected");
            return Some(ResolvedRules {
                path,
                name,
                source: source.clone(),
            });
        }
        None
    }

    /// Resolve against the filesystem: a source is accepted if its file exists.
    pub fn resolve_existing(&self, sources: &[RulesSource]) -> Option<ResolvedRules> {
        self.resolve(sources, |path| path.is_file())
    }
}

/// Standard source order: explicit override, detected name, default.
pub fn rules_sources(explicit: Option<PathBuf>, detected: Option<String>) -> Vec<RulesSource> {
    explicit
        .map(RulesSource::Explicit)
        .into_iter()
        .chain(detected.map(RulesSource::Detected))
        .chain(std::iter::once(RulesSource::Default))
        .collect()
}

/// Split a keyboard input method name into layout and variant.
///
/// `keyboard-us-intl` gives `("us", "intl")`, `keyboard-de` gives
/// `("de", "")`. Names without the `keyboard-` prefix give `None`.
pub fn layout_from_name(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix(IM_NAME_PREFIX)?;
    Some(rest.split_once('-').unwrap_or((rest, "")))
}

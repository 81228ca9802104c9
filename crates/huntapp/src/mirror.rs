//! Text-file mirror for streaming overlays.
//!
//! After each commit the store notifies its [`CommitObserver`]. [`TextMirror`]
//! answers by writing one small text file per displayed value into the folder
//! configured as `obsTextFolder`, which streaming software polls:
//!
//! | File                          | Content                                   |
//! |-------------------------------|-------------------------------------------|
//! | `count.txt`                   | the counter                               |
//! | `target.txt`                  | target species, or `—`                    |
//! | `phase.txt`                   | `Phase #N — <species> at <count>`         |
//! | `encounters_since_shiny.txt`  | the milestone clock                       |
//! | `odds.txt`                    | `1 in <denominator>`, digits grouped      |

use crate::error::Result;
use crate::model::Hunt;
use crate::settings::{NumberSeparator, SettingsStore};
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const PROBE_FILE: &str = "test_write.tmp";

/// Notified after every successful commit, with the committed state.
/// Errors are logged by the store and otherwise ignored.
pub trait CommitObserver {
    fn on_commit(&self, hunt: &Hunt) -> Result<()>;
}

pub struct TextMirror {
    settings: Arc<SettingsStore>,
}

impl TextMirror {
    /// The folder and separator are read from `settings` on every commit, so
    /// changes take effect with the next save.
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }
}

impl CommitObserver for TextMirror {
    fn on_commit(&self, hunt: &Hunt) -> Result<()> {
        let settings = self.settings.get();
        let folder = settings.obs_text_folder.trim();
        if folder.is_empty() {
            return Ok(());
        }
        write_text_files(Path::new(folder), hunt, settings.number_separator)
    }
}

pub fn text_files(hunt: &Hunt, separator: NumberSeparator) -> Vec<(&'static str, String)> {
    let target = if hunt.target_species.is_empty() {
        "—".to_string()
    } else {
        hunt.target_species.clone()
    };
    let phase = match hunt.last_phase() {
        Some(last) => format!(
            "Phase #{} — {} at {}",
            hunt.phases.len(),
            last.species,
            last.at_count
        ),
        None => "No phases yet".to_string(),
    };

    vec![
        ("count.txt", hunt.count.to_string()),
        ("target.txt", target),
        ("phase.txt", phase),
        (
            "encounters_since_shiny.txt",
            hunt.encounters_since_milestone.to_string(),
        ),
        (
            "odds.txt",
            format!("1 in {}", format_number(hunt.base_odds.denominator, separator)),
        ),
    ]
}

/// Creates `dir` if needed, then writes every file. A failed file is logged
/// and the rest are still written.
pub fn write_text_files(dir: &Path, hunt: &Hunt, separator: NumberSeparator) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (name, content) in text_files(hunt, separator) {
        if let Err(e) = fs::write(dir.join(name), content) {
            warn!("could not write {} in {}: {}", name, dir.display(), e);
        }
    }
    debug!("mirrored {} into {}", hunt.id, dir.display());
    Ok(())
}

/// `4096` → `4,096`; `1234567` → `1.234.567` with [`NumberSeparator::Dot`].
pub fn format_number(n: u64, separator: NumberSeparator) -> String {
    let digits = n.to_string();
    let group = separator.as_char();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(group);
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FolderCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn fail(error: impl ToString) -> Self {
        Self {
            valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Checks that `path` can serve as the mirror folder: it is created if
/// missing, then a probe file is written and removed.
pub fn validate_output_folder(path: &Path) -> FolderCheck {
    if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
        return FolderCheck::fail("Folder path is empty");
    }
    if let Err(e) = fs::create_dir_all(path) {
        return FolderCheck::fail(e);
    }
    let probe = path.join(PROBE_FILE);
    if let Err(e) = fs::write(&probe, b"test") {
        return FolderCheck::fail(e);
    }
    if let Err(e) = fs::remove_file(&probe) {
        return FolderCheck::fail(e);
    }
    FolderCheck::ok()
}

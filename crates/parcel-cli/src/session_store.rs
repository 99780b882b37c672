//! # Session File
//!
//! The logged-in session lives in a single JSON file, by default
//! `<config_dir>/parcel-declare/session.json`. Only this shell writes it;
//! library crates receive the loaded [`SessionToken`] as a value.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parcel_core::SessionToken;

/// Directory under the platform config dir holding the session file.
pub const APP_DIR: &str = "parcel-declare";
/// Session file name.
pub const SESSION_FILE: &str = "session.json";

/// Reads and writes the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `explicit`, or at the platform default location.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Ok(Self::new(path)),
            None => {
                let dir = dirs::config_dir()
                    .context("no configuration directory on this platform; pass --session-file")?;
                Ok(Self::new(dir.join(APP_DIR).join(SESSION_FILE)))
            }
        }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved session, or `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<SessionToken>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let session = serde_json::from_str(&text)
            .with_context(|| format!("session file {} is corrupt", self.path.display()))?;
        Ok(Some(session))
    }

    /// Persist `session`, replacing any previous one.
    pub fn save(&self, session: &SessionToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(session)?;
        let mut file = open_private(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("writing {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Remove the saved session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

/// Open for writing, owner-only from the first byte. A file left by an
/// older build with wider permissions is narrowed before it is truncated.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.set_len(0)?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

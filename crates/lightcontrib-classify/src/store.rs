//! Classification keyword store
//!
//! An ordered, pipe-delimited keyword list kept in a single-line text file
//! under the project's scripts directory. The in-memory copy is re-read from
//! disk after every write.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Built-in keywords written to a fresh store and restored by a reset
pub const DEFAULT_KEYWORDS: [&str; 6] = ["key", "bounce", "rim", "background", "wall", "kick"];

/// Keyword separator in the backing file
pub const SEPARATOR: char = '|';

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Keyword file not found: {0}")]
    Missing(PathBuf),

    #[error("Reset requires confirmation")]
    ConfirmationRequired,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Location of the backing file relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory under the project root
    pub scripts_dir: PathBuf,
    /// Keyword file name
    pub file_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("scripts"),
            file_name: "lightTypesDB.txt".to_string(),
        }
    }
}

impl StoreConfig {
    /// Full path of the keyword file for a project
    pub fn path_in(&self, project_root: impl AsRef<Path>) -> PathBuf {
        project_root
            .as_ref()
            .join(&self.scripts_dir)
            .join(&self.file_name)
    }
}

/// File-backed keyword list
#[derive(Debug, Clone)]
pub struct KeywordStore {
    path: PathBuf,
    keywords: Vec<String>,
}

impl KeywordStore {
    /// Open the store for a project, creating the file with the defaults if absent
    pub fn open(project_root: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        Self::open_path(config.path_in(project_root))
    }

    /// Open a store at an explicit file path
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self {
            path: path.into(),
            keywords: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Read the keyword list, creating the backing file with the defaults first if needed
    pub fn load(&mut self) -> Result<&[String]> {
        if !self.path.exists() {
            if let Some(dir) = self.path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&self.path, default_line())?;
            info!(path = %self.path.display(), "Created keyword file");
        }
        self.resync()?;
        Ok(&self.keywords)
    }

    /// Append keywords given as a comma- or pipe-separated string.
    ///
    /// The separator is always written, so an empty addition leaves one
    /// empty trailing segment in the file.
    pub fn append(&mut self, additions: &str) -> Result<()> {
        if !self.path.exists() {
            return Err(StoreError::Missing(self.path.clone()));
        }
        let additions = additions.trim().replace(',', "|");

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        write!(file, "{}{}", SEPARATOR, additions)?;
        drop(file);

        debug!(additions = additions.as_str(), "Appended keywords");
        self.resync()
    }

    /// Restore the built-in defaults. Destructive, so the caller must confirm.
    pub fn reset(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(StoreError::ConfirmationRequired);
        }
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, default_line())?;
        info!(path = %self.path.display(), "Reset keywords to defaults");
        self.resync()
    }

    /// Current keywords, in priority order
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Keywords joined with commas, for display
    pub fn display(&self) -> String {
        self.keywords.join(",")
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    fn resync(&mut self) -> Result<()> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        self.keywords = parse_keywords(&content);
        Ok(())
    }
}

/// Split a stored line into keywords, keeping empty segments
pub fn parse_keywords(content: &str) -> Vec<String> {
    content
        .trim_end_matches(['\r', '\n'])
        .split(SEPARATOR)
        .map(|k| k.trim().to_lowercase())
        .collect()
}

fn default_line() -> String {
    DEFAULT_KEYWORDS.join("|")
}

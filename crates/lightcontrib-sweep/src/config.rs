//! Sweep configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Isolation sweep configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Write every captured frame to disk
    pub save_images: bool,
    /// One unit per classification group instead of one per light
    pub use_groups: bool,
    /// Capture directory, relative to the project root
    pub capture_dir: PathBuf,
    /// Label placed between the scene name and the light names in capture files
    pub capture_prefix: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            save_images: false,
            use_groups: false,
            capture_dir: PathBuf::from("images").join("tmp"),
            capture_prefix: "contributionOf".to_string(),
        }
    }
}

impl SweepConfig {
    /// One render per classification group
    pub fn grouped() -> Self {
        Self {
            use_groups: true,
            ..Default::default()
        }
    }

    pub fn with_save_images(mut self, save: bool) -> Self {
        self.save_images = save;
        self
    }

    pub fn with_groups(mut self, use_groups: bool) -> Self {
        self.use_groups = use_groups;
        self
    }
}

//! CLI commands

pub mod edit;
pub mod keywords;
pub mod layers;
pub mod lights;
pub mod probe;
pub mod sweep;

use crate::config::ToolConfig;
use lightcontrib_classify::{Classifier, KeywordStore};
use lightcontrib_core::{KindCatalog, MemoryScene, SceneHost};
use std::path::{Path, PathBuf};
use tracing::info;

/// A loaded scene with its probed kinds and the tool configuration
pub struct Session {
    pub scene: MemoryScene,
    pub scene_file: PathBuf,
    pub catalog: KindCatalog,
    pub config: ToolConfig,
}

impl Session {
    pub fn open(scene_file: &Path, config: ToolConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let scene = MemoryScene::load(scene_file)?;
        let catalog = KindCatalog::probe(&scene);
        Ok(Self {
            scene,
            scene_file: scene_file.to_path_buf(),
            catalog,
            config,
        })
    }

    /// Keyword store of the scene's project
    pub fn keyword_store(&self) -> Result<KeywordStore, Box<dyn std::error::Error>> {
        Ok(KeywordStore::open(
            self.scene.project_root(),
            &self.config.store,
        )?)
    }

    pub fn classifier(&self) -> Result<Classifier, Box<dyn std::error::Error>> {
        let store = self.keyword_store()?;
        Ok(Classifier::from_store(&store)?)
    }

    /// Write the scene back to its file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.scene.save(&self.scene_file)?;
        info!(path = %self.scene_file.display(), "Scene written");
        Ok(())
    }
}

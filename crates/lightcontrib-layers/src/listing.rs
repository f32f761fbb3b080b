//! Light list views
//!
//! The visible lights of the scene, presented either one entry per light or
//! one entry per classification group.

use lightcontrib_classify::{Classifier, LightGroups};
use lightcontrib_core::{
    HostError, KindCatalog, LightInstance, NodeFilter, SceneHost, scene_lights,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How list entries are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListMode {
    /// One entry per light shape
    #[default]
    Lights,
    /// One entry per classification key
    Groups,
}

/// Snapshot of the visible lights and their groups
#[derive(Debug, Clone)]
pub struct LightList {
    lights: Vec<LightInstance>,
    groups: LightGroups<LightInstance>,
}

impl LightList {
    /// Query the visible lights and group them
    pub fn query<H: SceneHost + ?Sized>(
        host: &H,
        catalog: &KindCatalog,
        classifier: &Classifier,
    ) -> Result<Self, HostError> {
        let lights = scene_lights(host, catalog, NodeFilter::Visible)?;
        let groups = classifier.group(lights.iter().cloned());
        Ok(Self { lights, groups })
    }

    pub fn lights(&self) -> &[LightInstance] {
        &self.lights
    }

    pub fn groups(&self) -> &LightGroups<LightInstance> {
        &self.groups
    }

    /// List entries for the given mode
    pub fn entries(&self, mode: ListMode) -> Vec<String> {
        match mode {
            ListMode::Lights => self.lights.iter().map(|l| l.name.clone()).collect(),
            ListMode::Groups => self.groups.keys().map(str::to_string).collect(),
        }
    }

    /// Turn selected entries back into light names.
    ///
    /// Group keys expand to every member of the group; unknown keys are
    /// skipped. Light entries pass through unchanged.
    pub fn expand<S: AsRef<str>>(&self, selected: &[S], mode: ListMode) -> Vec<String> {
        match mode {
            ListMode::Lights => selected.iter().map(|s| s.as_ref().to_string()).collect(),
            ListMode::Groups => {
                let mut lights = Vec::new();
                for key in selected {
                    match self.groups.get(key.as_ref()) {
                        Some(members) => lights.extend(members.iter().map(|l| l.name.clone())),
                        None => debug!(key = key.as_ref(), "Unknown group, skipping"),
                    }
                }
                lights
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightcontrib_classify::DEFAULT_KEYWORDS;
    use lightcontrib_core::{MemoryScene, VISIBILITY};

    fn list(host: &MemoryScene) -> LightList {
        let classifier = Classifier::new(&DEFAULT_KEYWORDS).unwrap();
        LightList::query(host, &KindCatalog::base(), &classifier).unwrap()
    }

    fn scene() -> MemoryScene {
        let mut scene = MemoryScene::new("/project");
        scene.add_light("keyMainShape", "keyMain", "spotLight");
        scene.add_light("rimShape", "rim", "spotLight");
        scene.add_light("keyFillShape", "keyFill", "areaLight");
        scene.add_light("hiddenKeyShape", "hiddenKey", "spotLight");
        scene.set_bool("hiddenKey", VISIBILITY, false).unwrap();
        scene
    }

    #[test]
    fn test_entries_by_mode() {
        let list = list(&scene());

        assert_eq!(
            list.entries(ListMode::Lights),
            vec!["keyMainShape", "rimShape", "keyFillShape"]
        );
        assert_eq!(list.entries(ListMode::Groups), vec!["key", "rim"]);
    }

    #[test]
    fn test_expand_groups() {
        let list = list(&scene());

        assert_eq!(
            list.expand(&["key", "nope"], ListMode::Groups),
            vec!["keyMainShape", "keyFillShape"]
        );
        assert_eq!(list.expand(&["rimShape"], ListMode::Lights), vec!["rimShape"]);
        assert!(list.expand::<&str>(&[], ListMode::Groups).is_empty());
    }
}

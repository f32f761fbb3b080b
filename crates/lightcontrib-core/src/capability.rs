//! Rendering subsystem detection
//!
//! Detects which optional rendering subsystems are installed in the host and
//! derives the light-casting and non-geometry node kinds that are in play.

use crate::host::SceneHost;
use crate::kind::{LightKind, Subsystem};
use serde::Serialize;
use tracing::{debug, info};

/// Check whether a subsystem is installed.
///
/// Case-insensitive substring search of the subsystem's alias across the
/// host's node-kind catalog. The base subsystem is always present.
pub fn probe<H: SceneHost + ?Sized>(host: &H, subsystem: Subsystem) -> bool {
    if subsystem == Subsystem::Base {
        return true;
    }
    let found = catalog_contains(&host.node_kind_catalog(), subsystem.alias());
    if !found {
        debug!(subsystem = %subsystem, alias = subsystem.alias(), "Subsystem not found");
    }
    found
}

fn catalog_contains(catalog: &[String], alias: &str) -> bool {
    let alias = alias.to_lowercase();
    catalog.iter().any(|kind| kind.to_lowercase().contains(&alias))
}

/// A light node kind the current session recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightNodeKind {
    pub kind: LightKind,
    pub subsystem: Subsystem,
}

/// Active light and non-geometry kinds for this session
#[derive(Debug, Clone, Serialize)]
pub struct KindCatalog {
    /// Subsystems detected as present, in probing order
    pub subsystems: Vec<Subsystem>,
    /// Light-casting kinds, base kind first
    pub light_kinds: Vec<LightNodeKind>,
    /// Kinds never counted as geometry
    pub non_geometry: Vec<String>,
}

impl KindCatalog {
    /// Probe every subsystem against the host
    pub fn probe<H: SceneHost + ?Sized>(host: &H) -> Self {
        let catalog = host.node_kind_catalog();
        let present = Subsystem::ALL
            .into_iter()
            .filter(|s| *s == Subsystem::Base || catalog_contains(&catalog, s.alias()));

        let kinds = Self::from_subsystems(present);
        for subsystem in kinds.subsystems.iter().filter(|s| **s != Subsystem::Base) {
            info!(subsystem = %subsystem, "Rendering subsystem detected");
        }
        debug!(
            light_kinds = ?kinds.light_kind_names(),
            non_geometry = ?kinds.non_geometry,
            "Kind catalog ready"
        );
        kinds
    }

    /// Build the catalog for a known set of subsystems
    pub fn from_subsystems(subsystems: impl IntoIterator<Item = Subsystem>) -> Self {
        let mut present: Vec<Subsystem> = vec![Subsystem::Base];
        for subsystem in subsystems {
            if !present.contains(&subsystem) {
                present.push(subsystem);
            }
        }

        let light_kinds = present
            .iter()
            .flat_map(|s| {
                s.light_kinds().into_iter().map(move |kind| LightNodeKind {
                    kind,
                    subsystem: *s,
                })
            })
            .collect();

        let non_geometry = present
            .iter()
            .flat_map(|s| s.non_geometry_kinds())
            .map(str::to_string)
            .collect();

        Self {
            subsystems: present,
            light_kinds,
            non_geometry,
        }
    }

    /// Catalog with only the base subsystem
    pub fn base() -> Self {
        Self::from_subsystems([])
    }

    /// Whether a subsystem was detected
    pub fn has(&self, subsystem: Subsystem) -> bool {
        self.subsystems.contains(&subsystem)
    }

    /// Light kind names, for host queries
    pub fn light_kind_names(&self) -> Vec<String> {
        self.light_kinds
            .iter()
            .map(|k| k.kind.node_kind().to_string())
            .collect()
    }

    /// Subsystem-specific kinds first, so a node deriving from several kinds
    /// resolves to the most specific one
    pub fn resolution_order(&self) -> impl Iterator<Item = LightKind> + '_ {
        self.light_kinds
            .iter()
            .filter(|k| k.kind != LightKind::Standard)
            .chain(
                self.light_kinds
                    .iter()
                    .filter(|k| k.kind == LightKind::Standard),
            )
            .map(|k| k.kind)
    }
}

impl Default for KindCatalog {
    fn default() -> Self {
        Self::base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryScene;

    fn host_with_catalog(kinds: &[&str]) -> MemoryScene {
        let mut scene = MemoryScene::new("/project");
        scene.node_kinds = kinds.iter().map(|k| k.to_string()).collect();
        scene
    }

    #[test]
    fn test_probe_is_case_insensitive() {
        let host = host_with_catalog(&["transform", "VRayMtl", "mesh"]);
        assert!(probe(&host, Subsystem::VRay));
        assert!(!probe(&host, Subsystem::Arnold));
    }

    #[test]
    fn test_mental_ray_helpers_do_not_count() {
        let host = host_with_catalog(&["mentalrayTexture", "mentalrayOptions"]);
        assert!(!probe(&host, Subsystem::MentalRay));

        let host = host_with_catalog(&["mentalrayTexture", "mentalrayIblShape"]);
        assert!(probe(&host, Subsystem::MentalRay));
    }

    #[test]
    fn test_base_always_present() {
        let host = host_with_catalog(&[]);
        assert!(probe(&host, Subsystem::Base));

        let catalog = KindCatalog::probe(&host);
        assert_eq!(catalog.subsystems, vec![Subsystem::Base]);
        assert_eq!(catalog.light_kind_names(), vec!["light"]);
        assert_eq!(catalog.non_geometry.len(), 4);
    }

    #[test]
    fn test_catalog_grows_with_subsystems() {
        let host = host_with_catalog(&["aiStandard", "VRayLightRectShape", "mentalrayIblShape"]);
        let catalog = KindCatalog::probe(&host);

        assert!(catalog.has(Subsystem::Arnold));
        assert!(catalog.has(Subsystem::VRay));
        assert!(catalog.has(Subsystem::MentalRay));
        assert!(!catalog.has(Subsystem::RenderMan));

        // 1 base + 1 mental ray + 7 V-Ray + 2 Arnold
        assert_eq!(catalog.light_kinds.len(), 11);
        assert!(catalog.non_geometry.contains(&"VRayEnvironmentPreview".to_string()));
        assert!(catalog.non_geometry.contains(&"aiSkyDomeLight".to_string()));
    }

    #[test]
    fn test_resolution_order_puts_standard_last() {
        let catalog = KindCatalog::from_subsystems([Subsystem::MentalRay]);
        let order: Vec<_> = catalog.resolution_order().collect();
        assert_eq!(order, vec![LightKind::MentalRayIbl, LightKind::Standard]);
    }
}

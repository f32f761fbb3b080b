//! Light instances resolved from the live scene

use crate::capability::KindCatalog;
use crate::host::{HostError, NodeFilter, SceneHost};
use crate::kind::LightKind;
use serde::Serialize;
use tracing::debug;

/// A light-casting node in the current scene.
///
/// Holds identity only. Visibility and participation flags are read from the
/// host whenever they are needed, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightInstance {
    /// Light shape name
    pub name: String,
    /// Owning transform name
    pub transform: String,
    pub kind: LightKind,
}

impl LightInstance {
    pub fn new(name: impl Into<String>, transform: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            transform: transform.into(),
            kind,
        }
    }

    /// Resolve a node into a light, or `None` if it is not of any active light kind
    pub fn resolve<H: SceneHost + ?Sized>(
        host: &H,
        catalog: &KindCatalog,
        node: &str,
    ) -> Result<Option<Self>, HostError> {
        for kind in catalog.resolution_order() {
            if host.is_kind(node, kind.node_kind())? {
                let transform = host.parent(node)?.unwrap_or_else(|| node.to_string());
                return Ok(Some(Self::new(node, transform, kind)));
            }
        }
        Ok(None)
    }

    /// Resolve many nodes, skipping the ones that are not lights
    pub fn resolve_all<H: SceneHost + ?Sized>(
        host: &H,
        catalog: &KindCatalog,
        nodes: &[String],
    ) -> Result<Vec<Self>, HostError> {
        let mut lights = Vec::with_capacity(nodes.len());
        for node in nodes {
            match Self::resolve(host, catalog, node)? {
                Some(light) => lights.push(light),
                None => debug!(node = node.as_str(), "Not a light, skipping"),
            }
        }
        Ok(lights)
    }
}

impl AsRef<str> for LightInstance {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// Query and resolve the lights of every active kind
pub fn scene_lights<H: SceneHost + ?Sized>(
    host: &H,
    catalog: &KindCatalog,
    filter: NodeFilter,
) -> Result<Vec<LightInstance>, HostError> {
    let nodes = host.nodes_of_kinds(&catalog.light_kind_names(), filter);
    LightInstance::resolve_all(host, catalog, &nodes)
}

/// Stable sort pushing environment lights to the end
pub fn sort_environment_last(lights: &mut [LightInstance]) {
    lights.sort_by_key(|light| light.kind.sort_rank());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Subsystem, VRayLight};
    use crate::memory::MemoryScene;

    fn scene() -> MemoryScene {
        let mut scene = MemoryScene::new("/project");
        scene.add_light("keyShape", "key", "spotLight");
        scene.add_light("iblShape", "ibl", "mentalrayIblShape");
        scene.add_light("rectShape", "rect", "VRayLightRectShape");
        scene.add_geometry("groundShape", "ground");
        scene
    }

    #[test]
    fn test_resolve_kinds() {
        let host = scene();
        let catalog = KindCatalog::from_subsystems([Subsystem::MentalRay, Subsystem::VRay]);

        let key = LightInstance::resolve(&host, &catalog, "keyShape").unwrap().unwrap();
        assert_eq!(key.kind, LightKind::Standard);
        assert_eq!(key.transform, "key");

        let ibl = LightInstance::resolve(&host, &catalog, "iblShape").unwrap().unwrap();
        assert_eq!(ibl.kind, LightKind::MentalRayIbl);

        let rect = LightInstance::resolve(&host, &catalog, "rectShape").unwrap().unwrap();
        assert_eq!(rect.kind, LightKind::VRay(VRayLight::Rect));

        assert!(
            LightInstance::resolve(&host, &catalog, "groundShape")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_absent_subsystem_kinds_are_not_lights() {
        let host = scene();
        let catalog = KindCatalog::base();

        let lights = scene_lights(&host, &catalog, NodeFilter::All).unwrap();
        let names: Vec<_> = lights.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["keyShape"]);
    }

    #[test]
    fn test_sort_environment_last_is_stable() {
        let mut lights = vec![
            LightInstance::new("a", "a_t", LightKind::Standard),
            LightInstance::new("ibl", "ibl_t", LightKind::MentalRayIbl),
            LightInstance::new("b", "b_t", LightKind::Standard),
            LightInstance::new("c", "c_t", LightKind::VRay(VRayLight::Dome)),
        ];
        sort_environment_last(&mut lights);

        let names: Vec<_> = lights.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "ibl"]);
    }
}

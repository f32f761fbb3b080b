//! Render layers and light-select elements from light sets
//!
//! Without an explicit light selection every classification group becomes
//! its own aggregation. With one, a single aggregation is built for the
//! selected lights' transforms.

use lightcontrib_classify::Classifier;
use lightcontrib_core::{
    HostError, KindCatalog, LightInstance, NodeFilter, SceneHost, Subsystem, scene_lights,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Materializer errors
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Creation stopped partway. Aggregations listed in `created` stay in the scene.
    #[error("Aggregation '{failed}' could not be created ({} created before): {source}", .created.len())]
    Partial {
        created: Vec<String>,
        failed: String,
        source: HostError,
    },
}

impl MaterializeError {
    /// Aggregations that exist despite the failure
    pub fn created(&self) -> &[String] {
        match self {
            Self::Host(_) => &[],
            Self::Partial { created, .. } => created,
        }
    }
}

/// What gets created for each light set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationKind {
    /// Host render layer holding geometry and lights
    RenderLayer,
    /// V-Ray light-select render element holding lights only
    LightSelectElement,
}

impl AggregationKind {
    /// Subsystem that has to be present for this kind to be offered
    pub fn required_subsystem(&self) -> Subsystem {
        match self {
            Self::RenderLayer => Subsystem::Base,
            Self::LightSelectElement => Subsystem::VRay,
        }
    }
}

/// Aggregation naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializeConfig {
    /// Appended to the group key of per-group render layers
    pub layer_group_suffix: String,
    /// Prepended to the group key of light-select element nodes
    pub element_prefix: String,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            layer_group_suffix: "_Light".to_string(),
            element_prefix: "vrayRE_".to_string(),
        }
    }
}

/// An aggregation about to be created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationPlan {
    pub kind: AggregationKind,
    /// Requested node name; the host may make it unique
    pub name: String,
    /// Light-select name, for elements
    pub display_name: Option<String>,
    pub members: Vec<String>,
}

/// Builds aggregations from the scene's lights and geometry
pub struct Materializer<'a> {
    catalog: &'a KindCatalog,
    classifier: &'a Classifier,
    config: MaterializeConfig,
}

impl<'a> Materializer<'a> {
    pub fn new(
        catalog: &'a KindCatalog,
        classifier: &'a Classifier,
        config: MaterializeConfig,
    ) -> Self {
        Self {
            catalog,
            classifier,
            config,
        }
    }

    /// Whether the kind can be created in this session
    pub fn is_available(&self, kind: AggregationKind) -> bool {
        self.catalog.has(kind.required_subsystem())
    }

    /// Resolve the geometry set.
    ///
    /// Uses `explicit` when given, else the selected geometry, else every
    /// geometry shape. Light shapes and non-geometry kinds are always removed.
    pub fn geometry<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        explicit: &[String],
    ) -> Vec<String> {
        let excluded = self.excluded(host);
        let keep = |nodes: Vec<String>| -> Vec<String> {
            let mut seen = HashSet::new();
            nodes
                .into_iter()
                .filter(|n| !excluded.contains(n) && seen.insert(n.clone()))
                .collect()
        };

        if !explicit.is_empty() {
            return keep(explicit.to_vec());
        }
        let selected = keep(host.geometry(NodeFilter::Selected));
        if !selected.is_empty() {
            return selected;
        }
        keep(host.geometry(NodeFilter::All))
    }

    fn excluded<H: SceneHost + ?Sized>(&self, host: &H) -> HashSet<String> {
        let mut excluded: HashSet<String> = host
            .nodes_of_kinds(&self.catalog.light_kind_names(), NodeFilter::All)
            .into_iter()
            .collect();
        excluded.extend(host.nodes_of_kinds(&self.catalog.non_geometry, NodeFilter::All));
        excluded
    }

    /// Work out the aggregations to create, without touching the scene
    pub fn plan<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        kind: AggregationKind,
        geometry: &[String],
        lights: &[String],
    ) -> Result<Vec<AggregationPlan>, HostError> {
        let geometry = self.geometry(host, geometry);

        let selected = if lights.is_empty() {
            scene_lights(host, self.catalog, NodeFilter::Selected)?
        } else {
            let resolved = LightInstance::resolve_all(host, self.catalog, lights)?;
            if resolved.is_empty() {
                debug!(requested = lights.len(), "No requested node is a light");
                return Ok(Vec::new());
            }
            resolved
        };

        if selected.is_empty() {
            let all = scene_lights(host, self.catalog, NodeFilter::All)?;
            let groups = self.classifier.group(all);
            let plans = groups
                .into_iter()
                .filter_map(|(_, members)| {
                    let key = self.classifier.group_name(&members)?;
                    let names: Vec<String> = members.into_iter().map(|l| l.name).collect();
                    Some(self.group_plan(kind, &key, &geometry, names))
                })
                .collect();
            return Ok(plans);
        }

        let transforms: Vec<String> = selected.into_iter().map(|l| l.transform).collect();
        let Some(key) = self.classifier.group_name(&transforms) else {
            return Ok(Vec::new());
        };
        Ok(vec![self.selection_plan(kind, &key, &geometry, transforms)])
    }

    fn group_plan(
        &self,
        kind: AggregationKind,
        key: &str,
        geometry: &[String],
        lights: Vec<String>,
    ) -> AggregationPlan {
        match kind {
            AggregationKind::RenderLayer => AggregationPlan {
                kind,
                name: format!("{}{}", key, self.config.layer_group_suffix),
                display_name: None,
                members: geometry.iter().cloned().chain(lights).collect(),
            },
            AggregationKind::LightSelectElement => self.element_plan(key, lights),
        }
    }

    fn selection_plan(
        &self,
        kind: AggregationKind,
        key: &str,
        geometry: &[String],
        transforms: Vec<String>,
    ) -> AggregationPlan {
        match kind {
            AggregationKind::RenderLayer => AggregationPlan {
                kind,
                name: key.to_string(),
                display_name: None,
                members: geometry.iter().cloned().chain(transforms).collect(),
            },
            AggregationKind::LightSelectElement => self.element_plan(key, transforms),
        }
    }

    fn element_plan(&self, key: &str, lights: Vec<String>) -> AggregationPlan {
        AggregationPlan {
            kind: AggregationKind::LightSelectElement,
            name: format!("{}{}", self.config.element_prefix, key),
            display_name: Some(key.to_string()),
            members: lights,
        }
    }

    /// Create the aggregations, returning the names the host assigned.
    ///
    /// An empty scene yields an empty list. Creation stops at the first
    /// failure; nothing already created is removed.
    pub fn materialize<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        kind: AggregationKind,
        geometry: &[String],
        lights: &[String],
    ) -> Result<Vec<String>, MaterializeError> {
        let plans = self.plan(host, kind, geometry, lights)?;
        debug!(kind = ?kind, count = plans.len(), "Aggregations planned");

        let mut created = Vec::with_capacity(plans.len());
        for plan in plans {
            let result = match plan.kind {
                AggregationKind::RenderLayer => {
                    host.create_render_layer(&plan.members, &plan.name)
                }
                AggregationKind::LightSelectElement => host.create_light_select_element(
                    &plan.name,
                    plan.display_name.as_deref().unwrap_or(&plan.name),
                    &plan.members,
                ),
            };
            match result {
                Ok(name) => {
                    info!(
                        name = name.as_str(),
                        members = plan.members.len(),
                        "Aggregation created"
                    );
                    created.push(name);
                }
                Err(source) => {
                    return Err(MaterializeError::Partial {
                        created,
                        failed: plan.name,
                        source,
                    });
                }
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightcontrib_classify::DEFAULT_KEYWORDS;
    use lightcontrib_core::MemoryScene;

    fn classifier() -> Classifier {
        Classifier::new(&DEFAULT_KEYWORDS).unwrap()
    }

    fn scene() -> MemoryScene {
        let mut scene = MemoryScene::new("/project");
        scene.add_geometry("G1", "G1_t");
        scene.add_geometry("G2", "G2_t");
        scene.add_light("keyLight1Shape", "keyLight1", "spotLight");
        scene.add_light("keyLight2Shape", "keyLight2", "spotLight");
        scene.add_light("rimShape", "rimLight", "pointLight");
        scene
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_explicit_selection_scenario() {
        let mut host = scene();
        let catalog = KindCatalog::base();
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());

        let created = materializer
            .materialize(
                &mut host,
                AggregationKind::RenderLayer,
                &names(&["G1", "G2", "keyLight1Shape"]),
                &names(&["keyLight1Shape"]),
            )
            .unwrap();

        assert_eq!(created, vec!["key".to_string()]);
        assert_eq!(host.layers.len(), 1);
        assert_eq!(host.layers[0].members, names(&["G1", "G2", "keyLight1"]));
    }

    #[test]
    fn test_one_layer_per_group() {
        let mut host = scene();
        let catalog = KindCatalog::base();
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());

        let created = materializer
            .materialize(&mut host, AggregationKind::RenderLayer, &[], &[])
            .unwrap();

        assert_eq!(created, names(&["key_Light", "rim_Light"]));
        assert_eq!(
            host.layers[0].members,
            names(&["G1", "G2", "keyLight1Shape", "keyLight2Shape"])
        );
        assert_eq!(host.layers[1].members, names(&["G1", "G2", "rimShape"]));
    }

    #[test]
    fn test_geometry_falls_back_and_drops_non_geometry() {
        let mut host = scene();
        host.add_locator("rectLocShape", "rectLoc", "rectangularLightLocator");
        let catalog = KindCatalog::base();
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());

        assert_eq!(materializer.geometry(&host, &[]), names(&["G1", "G2"]));

        host.select("G2_t");
        assert_eq!(materializer.geometry(&host, &[]), names(&["G2"]));

        let explicit = names(&["G1", "rimShape", "rectLocShape", "G1"]);
        assert_eq!(materializer.geometry(&host, &explicit), names(&["G1"]));
    }

    #[test]
    fn test_selected_lights_used_when_none_given() {
        let mut host = scene();
        host.select("rimLight");
        let catalog = KindCatalog::base();
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());

        let plans = materializer
            .plan(&host, AggregationKind::RenderLayer, &[], &[])
            .unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "rim");
        assert_eq!(plans[0].members, names(&["G1", "G2", "rimLight"]));
    }

    #[test]
    fn test_light_select_elements() {
        let mut host = scene();
        host.register_kind("VRayLightRectShape");
        host.add_light("bounceRectShape", "bounceRect", "VRayLightRectShape");
        let catalog = KindCatalog::probe(&host);
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());
        assert!(materializer.is_available(AggregationKind::LightSelectElement));

        let created = materializer
            .materialize(&mut host, AggregationKind::LightSelectElement, &[], &[])
            .unwrap();

        assert_eq!(created, names(&["vrayRE_key", "vrayRE_rim", "vrayRE_bounce"]));
        assert_eq!(host.elements[0].display_name.as_deref(), Some("key"));
        assert_eq!(
            host.elements[0].members,
            names(&["keyLight1Shape", "keyLight2Shape"])
        );
    }

    #[test]
    fn test_requested_lights_that_are_not_lights_create_nothing() {
        let mut host = scene();
        let catalog = KindCatalog::base();
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());

        let plans = materializer
            .plan(&host, AggregationKind::RenderLayer, &[], &names(&["G1", "G2_t"]))
            .unwrap();
        assert!(plans.is_empty());

        let created = materializer
            .materialize(&mut host, AggregationKind::RenderLayer, &[], &names(&["G1"]))
            .unwrap();
        assert!(created.is_empty());
        assert!(host.layers.is_empty());
    }

    #[test]
    fn test_elements_unavailable_without_vray() {
        let catalog = KindCatalog::base();
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());

        assert!(materializer.is_available(AggregationKind::RenderLayer));
        assert!(!materializer.is_available(AggregationKind::LightSelectElement));
    }

    #[test]
    fn test_empty_scene_creates_nothing() {
        let mut host = MemoryScene::new("/project");
        let catalog = KindCatalog::base();
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());

        let created = materializer
            .materialize(&mut host, AggregationKind::RenderLayer, &[], &[])
            .unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn test_partial_failure_keeps_created() {
        let mut host = scene();
        host.fail_aggregation_at = Some(1);
        let catalog = KindCatalog::base();
        let classifier = classifier();
        let materializer = Materializer::new(&catalog, &classifier, MaterializeConfig::default());

        let err = materializer
            .materialize(&mut host, AggregationKind::RenderLayer, &[], &[])
            .unwrap_err();

        assert_eq!(err.created(), names(&["key_Light"]).as_slice());
        match err {
            MaterializeError::Partial { failed, .. } => assert_eq!(failed, "rim_Light"),
            other => panic!("expected partial failure, got {:?}", other),
        }
        assert_eq!(host.layers.len(), 1);
    }
}

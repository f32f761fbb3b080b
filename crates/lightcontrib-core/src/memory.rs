//! In-memory scene host
//!
//! A small serde-loadable scene graph implementing [`SceneHost`]. The CLI runs
//! against it, and every render it performs is recorded with a snapshot of
//! light visibility so tests can check what each isolated pass actually saw.

use crate::host::{HostError, NodeFilter, SceneHost, VISIBILITY};
use crate::kind::Subsystem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Node kinds that derive from the host's generic light kind
const STANDARD_LIGHT_KINDS: &[&str] = &[
    "ambientLight",
    "areaLight",
    "directionalLight",
    "pointLight",
    "spotLight",
    "volumeLight",
];

/// Attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Float(f64),
    Text(String),
}

impl AttrValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
        }
    }
}

/// A node in the scene graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub kind: String,
    /// Kinds this node derives from
    #[serde(default)]
    pub inherits: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub geometry: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrValue>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            inherits: Vec::new(),
            parent: None,
            geometry: false,
            selected: false,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_attr(mut self, attr: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(attr.into(), value);
        self
    }

    fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind || self.inherits.iter().any(|k| k == kind)
    }
}

/// A render layer or render element created in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub members: Vec<String>,
}

/// What the scene looked like when a render was triggered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRecord {
    /// Shapes visible through their whole ancestor chain
    pub visible: Vec<String>,
    /// Every boolean attribute other than visibility, keyed `node.attr`
    pub flags: BTreeMap<String, bool>,
    /// Caption applied after the render
    pub caption: Option<String>,
}

impl RenderRecord {
    pub fn is_visible(&self, node: &str) -> bool {
        self.visible.iter().any(|n| n == node)
    }

    pub fn flag(&self, node: &str, attr: &str) -> Option<bool> {
        self.flags.get(&format!("{}.{}", node, attr)).copied()
    }
}

/// In-memory scene host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryScene {
    /// Node kinds registered with the host (the probe searches these)
    pub node_kinds: Vec<String>,
    pub nodes: Vec<SceneNode>,
    /// Current renderer name
    pub renderer: String,
    pub scene_path: Option<PathBuf>,
    pub project_root: PathBuf,
    /// Review window caption
    pub caption: String,
    pub layers: Vec<Aggregation>,
    pub elements: Vec<Aggregation>,

    #[serde(skip)]
    pub renders: Vec<RenderRecord>,
    #[serde(skip)]
    pub kept_images: usize,
    #[serde(skip)]
    pub saved_images: Vec<PathBuf>,
    #[serde(skip)]
    pub buffer_clones: Vec<Subsystem>,
    /// Fail the render with this zero-based index
    #[serde(skip)]
    pub fail_render_at: Option<usize>,
    /// Fail the layer or element creation with this zero-based index
    #[serde(skip)]
    pub fail_aggregation_at: Option<usize>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new(".")
    }
}

impl MemoryScene {
    /// Create an empty scene in the given project
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            node_kinds: vec!["transform".to_string(), "mesh".to_string(), "light".to_string()],
            nodes: Vec::new(),
            renderer: Subsystem::Base.renderer_name().to_string(),
            scene_path: None,
            project_root: project_root.into(),
            caption: String::new(),
            layers: Vec::new(),
            elements: Vec::new(),
            renders: Vec::new(),
            kept_images: 0,
            saved_images: Vec::new(),
            buffer_clones: Vec::new(),
            fail_render_at: None,
            fail_aggregation_at: None,
        }
    }

    /// Parse a scene from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a scene from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| HostError::Io(std::io::Error::other(e)))
    }

    /// Save the scene as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HostError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| HostError::Io(std::io::Error::other(e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn with_scene_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scene_path = Some(path.into());
        self
    }

    /// Register a node kind in the host catalog
    pub fn register_kind(&mut self, kind: impl Into<String>) {
        let kind = kind.into();
        if !self.node_kinds.contains(&kind) {
            self.node_kinds.push(kind);
        }
    }

    pub fn add_node(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Add a transform with a light shape under it
    pub fn add_light(&mut self, shape: &str, transform: &str, kind: &str) {
        self.register_kind(kind);
        self.add_node(SceneNode::new(transform, "transform"));

        let mut node = SceneNode::new(shape, kind).with_parent(transform);
        if STANDARD_LIGHT_KINDS.contains(&kind) {
            node.inherits.push("light".to_string());
        }
        let intensity = if kind.starts_with("VRay") {
            "intensityMult"
        } else {
            "intensity"
        };
        node.attrs.insert(intensity.to_string(), AttrValue::Float(1.0));
        if kind == "mentalrayIblShape" {
            node.attrs
                .insert("visibleInEnvironment".to_string(), AttrValue::Bool(true));
            node.attrs
                .insert("visibleInFinalGather".to_string(), AttrValue::Bool(true));
        }
        self.add_node(node);
    }

    /// Add a transform with a mesh shape under it
    pub fn add_geometry(&mut self, shape: &str, transform: &str) {
        self.add_node(SceneNode::new(transform, "transform"));
        let mut node = SceneNode::new(shape, "mesh").with_parent(transform);
        node.geometry = true;
        self.add_node(node);
    }

    /// Add a non-light, non-transform shape that the host still reports as geometry
    pub fn add_locator(&mut self, shape: &str, transform: &str, kind: &str) {
        self.register_kind(kind);
        self.add_node(SceneNode::new(transform, "transform"));
        let mut node = SceneNode::new(shape, kind).with_parent(transform);
        node.geometry = true;
        self.add_node(node);
    }

    /// Mark a node selected
    pub fn select(&mut self, name: &str) {
        if let Some(node) = self.node_mut(name) {
            node.selected = true;
        }
    }

    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    fn node_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    fn require(&self, name: &str) -> Result<&SceneNode, HostError> {
        self.node(name)
            .ok_or_else(|| HostError::NodeNotFound(name.to_string()))
    }

    fn require_mut(&mut self, name: &str) -> Result<&mut SceneNode, HostError> {
        self.node_mut(name)
            .ok_or_else(|| HostError::NodeNotFound(name.to_string()))
    }

    fn set_attr(&mut self, node: &str, attr: &str, value: AttrValue) -> Result<(), HostError> {
        self.require_mut(node)?.attrs.insert(attr.to_string(), value);
        Ok(())
    }

    fn ancestors_visible(&self, node: &SceneNode) -> bool {
        let own = !matches!(node.attrs.get(VISIBILITY), Some(AttrValue::Bool(false)));
        own && match node.parent.as_deref().and_then(|p| self.node(p)) {
            Some(parent) => self.ancestors_visible(parent),
            None => true,
        }
    }

    fn selected_through_ancestors(&self, node: &SceneNode) -> bool {
        node.selected
            || node
                .parent
                .as_deref()
                .and_then(|p| self.node(p))
                .is_some_and(|parent| self.selected_through_ancestors(parent))
    }

    fn passes(&self, node: &SceneNode, filter: NodeFilter) -> bool {
        match filter {
            NodeFilter::All => true,
            NodeFilter::Visible => self.ancestors_visible(node),
            NodeFilter::Selected => self.selected_through_ancestors(node),
        }
    }

    fn name_taken(&self, name: &str) -> bool {
        self.node(name).is_some()
            || self
                .layers
                .iter()
                .chain(&self.elements)
                .any(|a| a.name == name)
    }

    fn unique_name(&self, wanted: &str) -> String {
        if !self.name_taken(wanted) {
            return wanted.to_string();
        }
        let stem = wanted.trim_end_matches(|c: char| c.is_ascii_digit());
        (1..)
            .map(|n| format!("{}{}", stem, n))
            .find(|candidate| !self.name_taken(candidate))
            .unwrap_or_else(|| wanted.to_string())
    }

    fn check_members(&self, members: &[String]) -> Result<(), HostError> {
        if self.fail_aggregation_at == Some(self.layers.len() + self.elements.len()) {
            return Err(HostError::Unsupported("aggregation rejected".to_string()));
        }
        for member in members {
            self.require(member)?;
        }
        Ok(())
    }

    fn snapshot(&self) -> RenderRecord {
        let visible = self
            .nodes
            .iter()
            .filter(|n| n.parent.is_some() && self.ancestors_visible(n))
            .map(|n| n.name.clone())
            .collect();

        let flags = self
            .nodes
            .iter()
            .flat_map(|n| {
                n.attrs.iter().filter_map(move |(attr, value)| match value {
                    AttrValue::Bool(b) if attr != VISIBILITY => {
                        Some((format!("{}.{}", n.name, attr), *b))
                    }
                    _ => None,
                })
            })
            .collect();

        RenderRecord {
            visible,
            flags,
            caption: None,
        }
    }
}

impl SceneHost for MemoryScene {
    fn node_kind_catalog(&self) -> Vec<String> {
        self.node_kinds.clone()
    }

    fn nodes_of_kinds(&self, kinds: &[String], filter: NodeFilter) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| kinds.iter().any(|k| n.is_kind(k)))
            .filter(|n| self.passes(n, filter))
            .map(|n| n.name.clone())
            .collect()
    }

    fn geometry(&self, filter: NodeFilter) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.geometry && self.passes(n, filter))
            .map(|n| n.name.clone())
            .collect()
    }

    fn is_kind(&self, node: &str, kind: &str) -> Result<bool, HostError> {
        Ok(self.require(node)?.is_kind(kind))
    }

    fn parent(&self, node: &str) -> Result<Option<String>, HostError> {
        Ok(self.require(node)?.parent.clone())
    }

    fn get_bool(&self, node: &str, attr: &str) -> Result<bool, HostError> {
        match self.require(node)?.attrs.get(attr) {
            Some(AttrValue::Bool(b)) => Ok(*b),
            Some(other) => Err(HostError::AttributeType {
                node: node.to_string(),
                attr: attr.to_string(),
                expected: "bool",
                actual: other.type_name(),
            }),
            None if attr == VISIBILITY => Ok(true),
            None => Err(HostError::AttributeNotFound {
                node: node.to_string(),
                attr: attr.to_string(),
            }),
        }
    }

    fn set_bool(&mut self, node: &str, attr: &str, value: bool) -> Result<(), HostError> {
        self.set_attr(node, attr, AttrValue::Bool(value))
    }

    fn set_float(&mut self, node: &str, attr: &str, value: f64) -> Result<(), HostError> {
        self.set_attr(node, attr, AttrValue::Float(value))
    }

    fn set_string(&mut self, node: &str, attr: &str, value: &str) -> Result<(), HostError> {
        self.set_attr(node, attr, AttrValue::Text(value.to_string()))
    }

    fn rename(&mut self, node: &str, new_name: &str) -> Result<String, HostError> {
        self.require(node)?;
        if node == new_name {
            return Ok(new_name.to_string());
        }
        let assigned = self.unique_name(new_name);
        for n in &mut self.nodes {
            if n.name == node {
                n.name = assigned.clone();
            }
            if n.parent.as_deref() == Some(node) {
                n.parent = Some(assigned.clone());
            }
        }
        Ok(assigned)
    }

    fn create_light(&mut self, kind: &str) -> Result<String, HostError> {
        if !self.node_kinds.iter().any(|k| k == kind) && !STANDARD_LIGHT_KINDS.contains(&kind) {
            return Err(HostError::Unsupported(format!("unknown light kind {}", kind)));
        }
        let stem = kind.strip_suffix("Shape").unwrap_or(kind);
        let index = (1..)
            .find(|n| {
                self.node(&format!("{}{}", stem, n)).is_none()
                    && self.node(&format!("{}Shape{}", stem, n)).is_none()
            })
            .unwrap_or(1);
        let transform = format!("{}{}", stem, index);
        let shape = format!("{}Shape{}", stem, index);
        self.add_light(&shape, &transform, kind);
        Ok(shape)
    }

    fn render(&mut self) -> Result<(), HostError> {
        if self.fail_render_at == Some(self.renders.len()) {
            self.fail_render_at = None;
            return Err(HostError::RenderFailed("renderer aborted".to_string()));
        }
        let record = self.snapshot();
        self.renders.push(record);
        self.caption = format!("Frame {} ({})", self.renders.len(), self.renderer);
        Ok(())
    }

    fn current_renderer(&self) -> Result<String, HostError> {
        Ok(self.renderer.clone())
    }

    fn clone_frame_buffer(&mut self, subsystem: Subsystem) -> Result<(), HostError> {
        self.buffer_clones.push(subsystem);
        Ok(())
    }

    fn render_caption(&self) -> Result<String, HostError> {
        Ok(self.caption.clone())
    }

    fn set_render_caption(&mut self, caption: &str) -> Result<(), HostError> {
        self.caption = caption.to_string();
        if let Some(last) = self.renders.last_mut() {
            last.caption = Some(caption.to_string());
        }
        Ok(())
    }

    fn keep_image(&mut self) -> Result<(), HostError> {
        self.kept_images += 1;
        Ok(())
    }

    fn write_image(&mut self, path: &Path) -> Result<(), HostError> {
        self.saved_images.push(path.to_path_buf());
        Ok(())
    }

    fn scene_path(&self) -> Option<PathBuf> {
        self.scene_path.clone()
    }

    fn project_root(&self) -> PathBuf {
        self.project_root.clone()
    }

    fn create_render_layer(
        &mut self,
        members: &[String],
        name: &str,
    ) -> Result<String, HostError> {
        self.check_members(members)?;
        let name = self.unique_name(name);
        self.layers.push(Aggregation {
            name: name.clone(),
            display_name: None,
            members: members.to_vec(),
        });
        Ok(name)
    }

    fn create_light_select_element(
        &mut self,
        node_name: &str,
        display_name: &str,
        members: &[String],
    ) -> Result<String, HostError> {
        self.check_members(members)?;
        let name = self.unique_name(node_name);
        self.elements.push(Aggregation {
            name: name.clone(),
            display_name: Some(display_name.to_string()),
            members: members.to_vec(),
        });
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_visibility_defaults_and_filters() {
        let mut scene = MemoryScene::new("/project");
        scene.add_light("keyShape", "key", "spotLight");
        scene.add_light("rimShape", "rim", "pointLight");
        scene.set_bool("rim", VISIBILITY, false).unwrap();

        let kinds = vec!["light".to_string()];
        assert_eq!(scene.nodes_of_kinds(&kinds, NodeFilter::All).len(), 2);
        assert_eq!(
            scene.nodes_of_kinds(&kinds, NodeFilter::Visible),
            vec!["keyShape".to_string()]
        );
        assert!(scene.get_bool("rimShape", VISIBILITY).unwrap());
        assert!(!scene.is_effectively_visible("rimShape").unwrap());
    }

    #[test]
    fn test_selection_includes_children() {
        let mut scene = MemoryScene::new("/project");
        scene.add_light("keyShape", "key", "spotLight");
        scene.add_light("rimShape", "rim", "pointLight");
        scene.select("key");

        let kinds = vec!["light".to_string()];
        assert_eq!(
            scene.nodes_of_kinds(&kinds, NodeFilter::Selected),
            vec!["keyShape".to_string()]
        );
    }

    #[test]
    fn test_attribute_errors() {
        let mut scene = MemoryScene::new("/project");
        scene.add_light("keyShape", "key", "spotLight");

        assert!(matches!(
            scene.get_bool("keyShape", "visibleInFinalGather"),
            Err(HostError::AttributeNotFound { .. })
        ));
        assert!(matches!(
            scene.get_bool("keyShape", "intensity"),
            Err(HostError::AttributeType { .. })
        ));
        assert!(matches!(
            scene.get_bool("missing", VISIBILITY),
            Err(HostError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_rename_updates_children() {
        let mut scene = MemoryScene::new("/project");
        scene.add_light("keyShape", "key", "spotLight");
        scene.add_geometry("groundShape", "ground");

        let name = scene.rename("key", "ground").unwrap();
        assert_eq!(name, "ground1");
        assert_eq!(scene.parent("keyShape").unwrap().as_deref(), Some("ground1"));
    }

    #[test]
    fn test_create_light() {
        let mut scene = MemoryScene::new("/project");
        let first = scene.create_light("areaLight").unwrap();
        let second = scene.create_light("areaLight").unwrap();

        assert_eq!(first, "areaLightShape1");
        assert_eq!(second, "areaLightShape2");
        assert!(scene.is_kind(&first, "light").unwrap());
        assert!(scene.create_light("VRayLightRectShape").is_err());
    }

    #[test]
    fn test_injected_render_failure() {
        let mut scene = MemoryScene::new("/project");
        scene.fail_render_at = Some(1);

        assert!(scene.render().is_ok());
        assert!(matches!(scene.render(), Err(HostError::RenderFailed(_))));
        assert!(scene.render().is_ok());
        assert_eq!(scene.renders.len(), 2);
    }

    #[test]
    fn test_scene_base_name() {
        let scene = MemoryScene::new("/project").with_scene_path("/project/scenes/shot010.v002.mb");
        assert_eq!(scene.scene_base_name(), "shot010");
        assert_eq!(MemoryScene::new("/project").scene_base_name(), "untitled");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scene.json");

        let mut scene = MemoryScene::new(temp_dir.path());
        scene.add_light("iblShape", "ibl", "mentalrayIblShape");
        scene.save(&path).unwrap();

        let loaded = MemoryScene::load(&path).unwrap();
        assert!(loaded.get_bool("iblShape", "visibleInFinalGather").unwrap());
        assert!(loaded.node_kinds.contains(&"mentalrayIblShape".to_string()));
    }

    #[test]
    fn test_minimal_json() {
        let scene = MemoryScene::from_json(
            r#"{
                "project_root": "/p",
                "nodes": [
                    {"name": "key", "kind": "transform"},
                    {"name": "keyShape", "kind": "spotLight", "inherits": ["light"],
                     "parent": "key", "attrs": {"intensity": 2.0, "visibility": false}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scene.renderer, "mayaSoftware");
        assert!(!scene.get_bool("keyShape", VISIBILITY).unwrap());
    }
}

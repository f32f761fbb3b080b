//! Scene host contract
//!
//! Everything that touches the live scene goes through [`SceneHost`]. The
//! host application (or [`crate::MemoryScene`] in tests and the CLI) owns the
//! scene graph, the renderer and the review buffer; this crate only drives it.

use crate::kind::Subsystem;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Visibility attribute present on every DAG node
pub const VISIBILITY: &str = "visibility";

/// Host errors
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Attribute not found: {node}.{attr}")]
    AttributeNotFound { node: String, attr: String },

    #[error("Attribute {node}.{attr} has type {actual}, expected {expected}")]
    AttributeType {
        node: String,
        attr: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which nodes a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeFilter {
    /// Every matching node
    #[default]
    All,
    /// Only nodes that are visible along with all their ancestors
    Visible,
    /// Only nodes in the current selection
    Selected,
}

/// Scene-graph, render and review-buffer primitives provided by the host
pub trait SceneHost {
    /// Every node kind registered with the host
    fn node_kind_catalog(&self) -> Vec<String>;

    /// Nodes whose kind is, or derives from, any of `kinds`
    fn nodes_of_kinds(&self, kinds: &[String], filter: NodeFilter) -> Vec<String>;

    /// Renderable geometry shapes
    fn geometry(&self, filter: NodeFilter) -> Vec<String>;

    /// Whether `node` is of `kind` or derives from it
    fn is_kind(&self, node: &str, kind: &str) -> Result<bool, HostError>;

    /// Owning transform of `node`
    fn parent(&self, node: &str) -> Result<Option<String>, HostError>;

    fn get_bool(&self, node: &str, attr: &str) -> Result<bool, HostError>;

    fn set_bool(&mut self, node: &str, attr: &str, value: bool) -> Result<(), HostError>;

    fn set_float(&mut self, node: &str, attr: &str, value: f64) -> Result<(), HostError>;

    fn set_string(&mut self, node: &str, attr: &str, value: &str) -> Result<(), HostError>;

    /// Rename a node, returning the name the host actually assigned
    fn rename(&mut self, node: &str, new_name: &str) -> Result<String, HostError>;

    /// Create a light of the given node kind, returning its shape
    fn create_light(&mut self, kind: &str) -> Result<String, HostError>;

    /// Render the current scene state into the review window. Blocks until done.
    fn render(&mut self) -> Result<(), HostError>;

    /// Name of the renderer currently selected in the render globals
    fn current_renderer(&self) -> Result<String, HostError>;

    /// Copy a subsystem's own frame buffer into the host's review window
    fn clone_frame_buffer(&mut self, subsystem: Subsystem) -> Result<(), HostError>;

    fn render_caption(&self) -> Result<String, HostError>;

    fn set_render_caption(&mut self, caption: &str) -> Result<(), HostError>;

    /// Keep the current frame in the review buffer
    fn keep_image(&mut self) -> Result<(), HostError>;

    /// Write the current frame to disk
    fn write_image(&mut self, path: &Path) -> Result<(), HostError>;

    /// Path of the open scene file, if it has been saved
    fn scene_path(&self) -> Option<PathBuf>;

    /// Root directory of the active project
    fn project_root(&self) -> PathBuf;

    /// Create a render layer holding `members`, returning its name
    fn create_render_layer(&mut self, members: &[String], name: &str)
    -> Result<String, HostError>;

    /// Create a light-select render element holding `members`, returning its node name
    fn create_light_select_element(
        &mut self,
        node_name: &str,
        display_name: &str,
        members: &[String],
    ) -> Result<String, HostError>;

    /// Visible on its own and through its owning transform
    fn is_effectively_visible(&self, node: &str) -> Result<bool, HostError> {
        if !self.get_bool(node, VISIBILITY)? {
            return Ok(false);
        }
        match self.parent(node)? {
            Some(parent) => self.get_bool(&parent, VISIBILITY),
            None => Ok(true),
        }
    }

    /// Base name of the scene file without directory or extension
    fn scene_base_name(&self) -> String {
        self.scene_path()
            .and_then(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.split('.').next())
                    .map(str::to_string)
            })
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "untitled".to_string())
    }
}

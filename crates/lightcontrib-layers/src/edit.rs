//! Multi-light parameter edits
//!
//! Each editable parameter describes the value it needs as a
//! [`ParamRequest`]. The validated [`ParamValue`] is then applied to every
//! target light.

use lightcontrib_core::{
    HostError, KindCatalog, LightInstance, NodeFilter, ParamRequest, ParamValue, SceneHost,
    Validation, ValidationError, ValueType, scene_lights,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Edit errors
#[derive(Debug, Error)]
pub enum EditError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Invalid value: {0}")]
    Invalid(#[from] ValidationError),

    #[error("{param} expects a {expected:?} value")]
    WrongType {
        param: LightParam,
        expected: ValueType,
    },
}

/// Light parameters editable across a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightParam {
    /// Light intensity; V-Ray lights store it as `intensityMult`
    Intensity,
    /// Name of the owning transform
    Rename,
}

impl LightParam {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Intensity => "intensity",
            Self::Rename => "rename",
        }
    }

    /// The value this parameter needs from the user
    pub fn request(&self) -> ParamRequest {
        match self {
            Self::Intensity => {
                ParamRequest::new(self.name(), ValueType::Float, Validation::AtLeast(0.0))
            }
            Self::Rename => ParamRequest::new(self.name(), ValueType::Text, Validation::NodeName),
        }
    }
}

impl fmt::Display for LightParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome for one edited light
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditedLight {
    pub light: String,
    /// Node actually changed (the shape for intensity, the transform for rename)
    pub node: String,
    /// Transform name after a rename
    pub renamed_to: Option<String>,
    /// Shape name after a rename
    pub shape_renamed_to: Option<String>,
}

/// Applies parameter edits to lights
pub struct LightEditor<'a> {
    catalog: &'a KindCatalog,
}

impl<'a> LightEditor<'a> {
    pub fn new(catalog: &'a KindCatalog) -> Self {
        Self { catalog }
    }

    /// Lights to edit: `explicit` when given, else the host selection
    pub fn targets<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        explicit: &[String],
    ) -> Result<Vec<LightInstance>, HostError> {
        if explicit.is_empty() {
            scene_lights(host, self.catalog, NodeFilter::Selected)
        } else {
            LightInstance::resolve_all(host, self.catalog, explicit)
        }
    }

    /// Parse a raw response and apply it
    pub fn apply_input<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        param: LightParam,
        input: &str,
        lights: &[LightInstance],
    ) -> Result<Vec<EditedLight>, EditError> {
        let value = param.request().parse(input)?;
        self.apply(host, param, &value, lights)
    }

    /// Apply a validated value to every light. No lights, no changes.
    pub fn apply<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        param: LightParam,
        value: &ParamValue,
        lights: &[LightInstance],
    ) -> Result<Vec<EditedLight>, EditError> {
        let mut edited = Vec::with_capacity(lights.len());
        match param {
            LightParam::Intensity => {
                let intensity = value.as_float().ok_or(EditError::WrongType {
                    param,
                    expected: ValueType::Float,
                })?;
                for light in lights {
                    host.set_float(&light.name, light.kind.intensity_attr(), intensity)?;
                    edited.push(EditedLight {
                        light: light.name.clone(),
                        node: light.name.clone(),
                        renamed_to: None,
                        shape_renamed_to: None,
                    });
                }
            }
            LightParam::Rename => {
                let name = value.as_text().ok_or(EditError::WrongType {
                    param,
                    expected: ValueType::Text,
                })?;
                for light in lights {
                    let assigned = host.rename(&light.transform, name)?;
                    // Shapes follow their transform; a light without its own
                    // transform is already renamed
                    let shape = if light.name == light.transform {
                        assigned.clone()
                    } else {
                        host.rename(&light.name, &format!("{}Shape", assigned))?
                    };
                    edited.push(EditedLight {
                        light: light.name.clone(),
                        node: light.transform.clone(),
                        renamed_to: Some(assigned),
                        shape_renamed_to: Some(shape),
                    });
                }
            }
        }
        if !edited.is_empty() {
            info!(param = %param, lights = edited.len(), "Lights edited");
        }
        Ok(edited)
    }
}

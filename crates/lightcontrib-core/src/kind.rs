//! Typed light and subsystem kinds
//!
//! The host reports node kinds as strings. They are resolved once into
//! [`LightKind`] so the rest of the crate can match on variants instead of
//! comparing kind names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendering subsystem that may own light-casting node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// The host's built-in renderer and light kinds, always present
    Base,
    /// mental ray
    MentalRay,
    /// RenderMan
    RenderMan,
    /// V-Ray
    VRay,
    /// Arnold
    Arnold,
}

impl Subsystem {
    /// All subsystems in probing order
    pub const ALL: [Subsystem; 5] = [
        Subsystem::Base,
        Subsystem::MentalRay,
        Subsystem::RenderMan,
        Subsystem::VRay,
        Subsystem::Arnold,
    ];

    /// Substring searched for in the host's node-kind catalog.
    ///
    /// None of the subsystems can be asked whether it is installed, so the
    /// probe looks for a node kind only that subsystem registers. mental ray
    /// uses its IBL shape kind because the host ships `mentalray*` helper
    /// kinds even when the plugin is not loaded.
    pub fn alias(&self) -> &'static str {
        match self {
            Self::Base => "light",
            Self::MentalRay => "mentalrayIblShape",
            Self::RenderMan => "renderman",
            Self::VRay => "vray",
            Self::Arnold => "aiStandard",
        }
    }

    /// Name the host uses for this subsystem as its current renderer
    pub fn renderer_name(&self) -> &'static str {
        match self {
            Self::Base => "mayaSoftware",
            Self::MentalRay => "mentalRay",
            Self::RenderMan => "renderman",
            Self::VRay => "vray",
            Self::Arnold => "arnold",
        }
    }

    /// Light-casting node kinds owned by this subsystem
    pub fn light_kinds(&self) -> Vec<LightKind> {
        match self {
            Self::Base => vec![LightKind::Standard],
            Self::MentalRay => vec![LightKind::MentalRayIbl],
            Self::RenderMan => Vec::new(),
            Self::VRay => VRayLight::ALL.iter().copied().map(LightKind::VRay).collect(),
            Self::Arnold => ArnoldLight::ALL
                .iter()
                .copied()
                .map(LightKind::Arnold)
                .collect(),
        }
    }

    /// Node kinds that must never be treated as geometry once this subsystem is present
    pub fn non_geometry_kinds(&self) -> Vec<&'static str> {
        match self {
            Self::Base => vec![
                "cylindricalLightLocator",
                "discLightLocator",
                "rectangularLightLocator",
                "sphericalLightLocator",
            ],
            Self::MentalRay | Self::RenderMan => Vec::new(),
            Self::VRay => vec!["VRayEnvironmentPreview"],
            Self::Arnold => ArnoldLight::ALL.iter().map(|l| l.node_kind()).collect(),
        }
    }

    /// `(node, attribute)` holding the subsystem's own frame-buffer switch, if it has one
    pub fn frame_buffer_switch(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::VRay => Some(("vraySettings", "vfbOn")),
            _ => None,
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::MentalRay => "mental ray",
            Self::RenderMan => "RenderMan",
            Self::VRay => "V-Ray",
            Self::Arnold => "Arnold",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// V-Ray light node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VRayLight {
    Ies,
    Mesh,
    MeshLightLinking,
    Mtl,
    Rect,
    Sphere,
    Dome,
}

impl VRayLight {
    pub const ALL: [VRayLight; 7] = [
        VRayLight::Ies,
        VRayLight::Mesh,
        VRayLight::MeshLightLinking,
        VRayLight::Mtl,
        VRayLight::Rect,
        VRayLight::Sphere,
        VRayLight::Dome,
    ];

    pub fn node_kind(&self) -> &'static str {
        match self {
            Self::Ies => "VRayLightIESShape",
            Self::Mesh => "VRayLightMesh",
            Self::MeshLightLinking => "VRayLightMeshLightLinking",
            Self::Mtl => "VRayLightMtl",
            Self::Rect => "VRayLightRectShape",
            Self::Sphere => "VRayLightSphereShape",
            Self::Dome => "VRayLightDomeShape",
        }
    }
}

/// Arnold light node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArnoldLight {
    Area,
    SkyDome,
}

impl ArnoldLight {
    pub const ALL: [ArnoldLight; 2] = [ArnoldLight::Area, ArnoldLight::SkyDome];

    pub fn node_kind(&self) -> &'static str {
        match self {
            Self::Area => "aiAreaLight",
            Self::SkyDome => "aiSkyDomeLight",
        }
    }
}

/// Attributes that switch an environment light's contribution on and off
/// beyond plain visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentToggles {
    /// Participation in the visible environment
    pub environment: &'static str,
    /// Participation in global illumination (final gather)
    pub global_illumination: &'static str,
}

/// A light-casting node kind, resolved once at probe time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    /// Any light derived from the host's generic light kind
    Standard,
    /// mental ray image-based light
    MentalRayIbl,
    VRay(VRayLight),
    Arnold(ArnoldLight),
}

impl LightKind {
    /// Node kind name as registered with the host
    pub fn node_kind(&self) -> &'static str {
        match self {
            Self::Standard => "light",
            Self::MentalRayIbl => "mentalrayIblShape",
            Self::VRay(light) => light.node_kind(),
            Self::Arnold(light) => light.node_kind(),
        }
    }

    /// Owning subsystem
    pub fn subsystem(&self) -> Subsystem {
        match self {
            Self::Standard => Subsystem::Base,
            Self::MentalRayIbl => Subsystem::MentalRay,
            Self::VRay(_) => Subsystem::VRay,
            Self::Arnold(_) => Subsystem::Arnold,
        }
    }

    /// Extra toggles needed to fully suppress this light, if it is an environment light
    pub fn environment_toggles(&self) -> Option<EnvironmentToggles> {
        match self {
            Self::MentalRayIbl => Some(EnvironmentToggles {
                environment: "visibleInEnvironment",
                global_illumination: "visibleInFinalGather",
            }),
            _ => None,
        }
    }

    /// Whether this is an environment (IBL) light
    pub fn is_environment(&self) -> bool {
        self.environment_toggles().is_some()
    }

    /// Sort rank used to push environment lights to the end of a sweep
    pub fn sort_rank(&self) -> u8 {
        if self.is_environment() { 2 } else { 1 }
    }

    /// Attribute holding the light's intensity
    pub fn intensity_attr(&self) -> &'static str {
        match self {
            Self::VRay(_) => "intensityMult",
            _ => "intensity",
        }
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_kind())
    }
}

//! Light creation presets

use lightcontrib_core::{HostError, KindCatalog, SceneHost, Subsystem, VRayLight};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Preset errors
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("Unknown light preset: {0}")]
    Unknown(String),

    #[error("Preset {preset} needs {subsystem}, which is not installed")]
    Unavailable {
        preset: LightPreset,
        subsystem: Subsystem,
    },

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Preset attribute value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresetValue {
    Flag(bool),
    Number(f64),
}

/// A light kind plus the attributes set right after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightPreset {
    Area,
    /// Area light tuned for mental ray: physical decay, area sampling
    AreaMentalRay,
    Spot,
    SpotMentalRay,
    VRayRect,
    VRayDome,
    VRayIes,
}

impl LightPreset {
    pub const ALL: [LightPreset; 7] = [
        LightPreset::Area,
        LightPreset::AreaMentalRay,
        LightPreset::Spot,
        LightPreset::SpotMentalRay,
        LightPreset::VRayRect,
        LightPreset::VRayDome,
        LightPreset::VRayIes,
    ];

    /// Short name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::AreaMentalRay => "areaMR",
            Self::Spot => "spot",
            Self::SpotMentalRay => "spotMR",
            Self::VRayRect => "vrayRect",
            Self::VRayDome => "vrayDome",
            Self::VRayIes => "vrayIES",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Area => "Area Light",
            Self::AreaMentalRay => "Area Light (MR)",
            Self::Spot => "Spot Light",
            Self::SpotMentalRay => "Spot Light (MR)",
            Self::VRayRect => "Rect Light (VRay)",
            Self::VRayDome => "Dome Light (VRay)",
            Self::VRayIes => "IES Light (VRay)",
        }
    }

    /// Node kind created by the host
    pub fn node_kind(&self) -> &'static str {
        match self {
            Self::Area | Self::AreaMentalRay => "areaLight",
            Self::Spot | Self::SpotMentalRay => "spotLight",
            Self::VRayRect => VRayLight::Rect.node_kind(),
            Self::VRayDome => VRayLight::Dome.node_kind(),
            Self::VRayIes => VRayLight::Ies.node_kind(),
        }
    }

    /// Subsystem that has to be present for the preset to be offered
    pub fn subsystem(&self) -> Subsystem {
        match self {
            Self::Area | Self::Spot => Subsystem::Base,
            Self::AreaMentalRay | Self::SpotMentalRay => Subsystem::MentalRay,
            Self::VRayRect | Self::VRayDome | Self::VRayIes => Subsystem::VRay,
        }
    }

    /// Attributes applied after creation, in order
    pub fn attributes(&self) -> Vec<(&'static str, PresetValue)> {
        use PresetValue::{Flag, Number};
        match self {
            Self::Area | Self::Spot => vec![("useRayTraceShadows", Flag(true))],
            Self::AreaMentalRay => vec![
                ("intensity", Number(100.0)),
                ("decayRate", Number(2.0)),
                ("useRayTraceShadows", Flag(true)),
                ("areaLight", Flag(true)),
                ("rayDepthLimit", Number(2.0)),
            ],
            Self::SpotMentalRay => vec![
                ("intensity", Number(100.0)),
                ("decayRate", Number(2.0)),
                ("useRayTraceShadows", Flag(true)),
                ("areaLight", Flag(true)),
                ("areaType", Number(1.0)),
                ("rayDepthLimit", Number(2.0)),
            ],
            Self::VRayRect | Self::VRayDome | Self::VRayIes => Vec::new(),
        }
    }

    /// Presets offered for the detected subsystems
    pub fn available(catalog: &KindCatalog) -> Vec<LightPreset> {
        Self::ALL
            .into_iter()
            .filter(|p| catalog.has(p.subsystem()))
            .collect()
    }

    /// Create the light and apply the preset attributes, returning the shape name
    pub fn create<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        catalog: &KindCatalog,
    ) -> Result<String, PresetError> {
        let subsystem = self.subsystem();
        if !catalog.has(subsystem) {
            return Err(PresetError::Unavailable {
                preset: *self,
                subsystem,
            });
        }

        let shape = host.create_light(self.node_kind())?;
        for (attr, value) in self.attributes() {
            match value {
                PresetValue::Flag(v) => host.set_bool(&shape, attr, v)?,
                PresetValue::Number(v) => host.set_float(&shape, attr, v)?,
            }
        }
        info!(preset = self.name(), light = shape.as_str(), "Light created");
        Ok(shape)
    }
}

impl fmt::Display for LightPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LightPreset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PresetError::Unknown(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightcontrib_core::{AttrValue, MemoryScene};

    #[test]
    fn test_parse_names() {
        assert_eq!("areaMR".parse::<LightPreset>().unwrap(), LightPreset::AreaMentalRay);
        assert_eq!("vrayies".parse::<LightPreset>().unwrap(), LightPreset::VRayIes);
        assert!("torch".parse::<LightPreset>().is_err());
    }

    #[test]
    fn test_available_follows_subsystems() {
        let base = LightPreset::available(&KindCatalog::base());
        assert_eq!(base, vec![LightPreset::Area, LightPreset::Spot]);

        let all = LightPreset::available(&KindCatalog::from_subsystems([
            Subsystem::MentalRay,
            Subsystem::VRay,
        ]));
        assert_eq!(all.len(), LightPreset::ALL.len());
    }

    #[test]
    fn test_create_applies_attributes() {
        let mut host = MemoryScene::new("/project");
        let catalog = KindCatalog::from_subsystems([Subsystem::MentalRay]);

        let shape = LightPreset::SpotMentalRay.create(&mut host, &catalog).unwrap();
        let node = host.node(&shape).unwrap();

        assert_eq!(node.kind, "spotLight");
        assert_eq!(node.attrs.get("intensity"), Some(&AttrValue::Float(100.0)));
        assert_eq!(node.attrs.get("areaType"), Some(&AttrValue::Float(1.0)));
        assert_eq!(node.attrs.get("useRayTraceShadows"), Some(&AttrValue::Bool(true)));
    }

    #[test]
    fn test_create_requires_subsystem() {
        let mut host = MemoryScene::new("/project");
        let err = LightPreset::VRayRect
            .create(&mut host, &KindCatalog::base())
            .unwrap_err();

        assert!(matches!(
            err,
            PresetError::Unavailable {
                subsystem: Subsystem::VRay,
                ..
            }
        ));
        assert!(host.nodes.is_empty());
    }

    #[test]
    fn test_create_vray_light() {
        let mut host = MemoryScene::new("/project");
        host.register_kind("VRayLightRectShape");
        let catalog = KindCatalog::probe(&host);

        let shape = LightPreset::VRayRect.create(&mut host, &catalog).unwrap();
        assert_eq!(shape, "VRayLightRectShape1");
    }
}

//! lightcontrib core - light kinds, subsystem probing and the scene host contract
//!
//! lightcontrib renders each light (or group of lights) of a scene in
//! isolation so an artist can inspect its individual contribution, and turns
//! detected light sets into render layers and light-select render elements.
//!
//! # Architecture
//!
//! ```text
//! SceneHost ──► KindCatalog::probe ──► LightKind / LightInstance
//!     ▲                                       │
//!     │                  Classifier ◄─────────┤
//!     │                      │                ▼
//!     └──────── IsolationSweep / Materializer
//! ```
//!
//! The host application owns the scene graph and the renderer. Everything in
//! this workspace talks to it through [`SceneHost`]; [`MemoryScene`] is a
//! self-contained implementation used by the CLI and the test suites.

pub mod capability;
pub mod host;
pub mod kind;
pub mod light;
pub mod memory;
pub mod progress;
pub mod request;

// Re-export commonly used types
pub use capability::{KindCatalog, LightNodeKind, probe};
pub use host::{HostError, NodeFilter, SceneHost, VISIBILITY};
pub use kind::{ArnoldLight, EnvironmentToggles, LightKind, Subsystem, VRayLight};
pub use light::{LightInstance, scene_lights, sort_environment_last};
pub use memory::{Aggregation, AttrValue, MemoryScene, RenderRecord, SceneNode};
pub use progress::{LogProgress, NullProgress, ProgressSink, RecordingProgress};
pub use request::{ParamRequest, ParamValue, Validation, ValidationError, ValueType};

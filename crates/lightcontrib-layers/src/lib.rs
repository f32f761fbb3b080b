//! lightcontrib layers - organizing lights outside the isolation sweep
//!
//! - [`Materializer`] turns light groups or a light selection into render
//!   layers or V-Ray light-select elements
//! - [`LightList`] presents the visible lights by name or by group
//! - [`LightEditor`] applies typed parameter edits to several lights at once
//! - [`LightPreset`] creates lights with renderer-specific attribute presets

pub mod edit;
pub mod listing;
pub mod materialize;
pub mod presets;

pub use edit::{EditError, EditedLight, LightEditor, LightParam};
pub use listing::{LightList, ListMode};
pub use materialize::{
    AggregationKind, AggregationPlan, MaterializeConfig, MaterializeError, Materializer,
};
pub use presets::{LightPreset, PresetError, PresetValue};

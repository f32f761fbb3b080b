//! lightcontrib classify - keyword store and light classification
//!
//! Lights are sorted into semantic roles (key, rim, bounce, ...) by finding a
//! user-extensible keyword in their names. The keyword list lives in a
//! per-project text file; the [`Classifier`] is built from it and passed to
//! whatever needs grouping.

pub mod classifier;
pub mod store;

pub use classifier::{ClassifyError, Classifier, LightGroups};
pub use store::{DEFAULT_KEYWORDS, KeywordStore, StoreConfig, StoreError};

//! lightcontrib sweep - isolation renders of individual lights
//!
//! [`IsolationSweep`] hides every light in the scene, then renders each light
//! (or classification group) on its own and captures the frame for review.
//! All scene changes go through a [`StateGuard`], so visibility and
//! participation flags come back exactly as they were even when a render
//! fails halfway through.

pub mod config;
pub mod guard;
pub mod sweep;

pub use config::SweepConfig;
pub use guard::StateGuard;
pub use sweep::{IsolationSweep, RenderCapture, SweepError, SweepReport, SweepState, SweepUnit};

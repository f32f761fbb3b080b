//! Isolation render sweep
//!
//! Renders each light (or light group) on its own:
//!
//! ```text
//! Idle ──► Prepared ──► Rendering ──► Restored
//!           hide all     per unit:
//!           lights       show → render → caption/keep/save → re-hide
//! ```
//!
//! The whole sweep runs inside one [`StateGuard`] and every unit inside a
//! nested one, so scene visibility is restored on every exit path.

use crate::config::SweepConfig;
use crate::guard::StateGuard;
use lightcontrib_classify::Classifier;
use lightcontrib_core::{
    HostError, KindCatalog, LightInstance, NodeFilter, ProgressSink, SceneHost, VISIBILITY,
    scene_lights, sort_environment_last,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{Level, debug, info, span};

/// Sweep errors
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Render of '{unit}' failed: {source}")]
    Render { unit: String, source: HostError },
}

/// Sweep lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SweepState {
    Idle,
    /// All lights hidden, environment light switched off
    Prepared,
    Rendering,
    /// Scene state put back; terminal
    Restored,
}

/// One light or light group rendered in a single pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepUnit {
    /// Group key, or the light name when rendering lights one by one
    pub label: String,
    pub lights: Vec<LightInstance>,
}

impl SweepUnit {
    /// Owning transform names, in unit order
    pub fn transforms(&self) -> Vec<String> {
        self.lights.iter().map(|l| l.transform.clone()).collect()
    }
}

/// A captured isolation render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderCapture {
    pub label: String,
    /// Contributing light transforms
    pub lights: Vec<String>,
    /// Caption applied to the review window
    pub caption: String,
    /// Where the frame was written, if saving was enabled
    pub saved_to: Option<PathBuf>,
}

/// Result of a completed sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub captures: Vec<RenderCapture>,
}

impl SweepReport {
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

/// Renders lights in isolation, one unit at a time
pub struct IsolationSweep<'a> {
    catalog: &'a KindCatalog,
    classifier: &'a Classifier,
    config: SweepConfig,
    state: SweepState,
}

impl<'a> IsolationSweep<'a> {
    pub fn new(catalog: &'a KindCatalog, classifier: &'a Classifier, config: SweepConfig) -> Self {
        Self {
            catalog,
            classifier,
            config,
            state: SweepState::Idle,
        }
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Render every target unit in isolation.
    ///
    /// `targets` are light node names. When empty, the host's selected lights
    /// are used, falling back to every visible light. A render failure aborts
    /// the remaining units; scene state is restored either way.
    pub fn run<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        targets: &[String],
        progress: &mut dyn ProgressSink,
    ) -> Result<SweepReport, SweepError> {
        let span = span!(Level::DEBUG, "isolation_sweep", groups = self.config.use_groups);
        let _enter = span.enter();

        self.state = SweepState::Idle;

        let mut universe = scene_lights(host, self.catalog, NodeFilter::Visible)?;
        sort_environment_last(&mut universe);
        let mut targets = self.resolve_targets(host, targets, &universe)?;
        if targets.is_empty() {
            info!("No lights to render");
            self.transition(SweepState::Restored);
            return Ok(SweepReport::default());
        }
        sort_environment_last(&mut targets);

        let units = self.plan(targets);
        let labels: Vec<String> = units.iter().map(|u| u.label.clone()).collect();
        info!(units = units.len(), lights = universe.len(), "Starting isolation sweep");
        progress.begin(units.len(), &labels);

        let mut guard = StateGuard::new(host, "sweep");
        let outcome = self
            .prepare(&mut guard, &universe)
            .and_then(|()| self.render_units(&mut guard, &units, progress));
        let restored = guard.restore();
        self.transition(SweepState::Restored);
        progress.finish();

        let captures = outcome?;
        restored?;

        info!(captures = captures.len(), "Isolation sweep finished");
        Ok(SweepReport { captures })
    }

    /// Split targets into render units
    pub fn plan(&self, targets: Vec<LightInstance>) -> Vec<SweepUnit> {
        if self.config.use_groups {
            self.classifier
                .group(targets)
                .into_iter()
                .map(|(label, lights)| SweepUnit { label, lights })
                .collect()
        } else {
            targets
                .into_iter()
                .map(|light| SweepUnit {
                    label: light.name.clone(),
                    lights: vec![light],
                })
                .collect()
        }
    }

    fn resolve_targets<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        targets: &[String],
        universe: &[LightInstance],
    ) -> Result<Vec<LightInstance>, HostError> {
        if !targets.is_empty() {
            return LightInstance::resolve_all(host, self.catalog, targets);
        }
        let selected = scene_lights(host, self.catalog, NodeFilter::Selected)?;
        if !selected.is_empty() {
            return Ok(selected);
        }
        Ok(universe.to_vec())
    }

    /// Hide every light and switch off the trailing environment light
    fn prepare<H: SceneHost + ?Sized>(
        &mut self,
        guard: &mut StateGuard<'_, H>,
        universe: &[LightInstance],
    ) -> Result<(), SweepError> {
        if let Some(last) = universe.last() {
            if let Some(toggles) = last.kind.environment_toggles() {
                debug!(light = last.name.as_str(), "Switching off environment light");
                guard.set_bool(&last.name, toggles.global_illumination, false)?;
                guard.set_bool(&last.name, toggles.environment, false)?;
            }
        }
        for light in universe {
            guard.set_bool(&light.name, VISIBILITY, false)?;
        }
        self.transition(SweepState::Prepared);
        Ok(())
    }

    fn render_units<H: SceneHost + ?Sized>(
        &mut self,
        guard: &mut StateGuard<'_, H>,
        units: &[SweepUnit],
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<RenderCapture>, SweepError> {
        self.transition(SweepState::Rendering);

        let mut captures = Vec::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            let capture = self.render_unit(guard.host(), unit)?;
            captures.push(capture);
            progress.advance(i + 1, units.len());
        }
        Ok(captures)
    }

    fn render_unit<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        unit: &SweepUnit,
    ) -> Result<RenderCapture, SweepError> {
        let mut guard = StateGuard::new(host, "unit");

        for light in &unit.lights {
            guard.set_bool(&light.transform, VISIBILITY, true)?;
            guard.set_bool(&light.name, VISIBILITY, true)?;
            if let Some(toggles) = light.kind.environment_toggles() {
                guard.set_bool(&light.name, toggles.global_illumination, true)?;
            }
        }
        debug!(unit = unit.label.as_str(), isolated = guard.pending(), "Unit isolated");

        let host = guard.host();
        host.render().map_err(|source| SweepError::Render {
            unit: unit.label.clone(),
            source,
        })?;
        self.mirror_frame_buffer(host)?;

        let lights = unit.transforms();
        let caption = caption_for(&host.render_caption()?, &lights);
        host.set_render_caption(&caption)?;
        host.keep_image()?;

        let saved_to = if self.config.save_images {
            let path = self.capture_path(host, &lights);
            debug!(path = %path.display(), "Saving capture");
            host.write_image(&path)?;
            Some(path)
        } else {
            None
        };

        guard.restore()?;

        Ok(RenderCapture {
            label: unit.label.clone(),
            lights,
            caption,
            saved_to,
        })
    }

    /// Copy the active subsystem's own frame buffer into the review window
    fn mirror_frame_buffer<H: SceneHost + ?Sized>(&self, host: &mut H) -> Result<(), HostError> {
        let renderer = host.current_renderer()?;
        for subsystem in &self.catalog.subsystems {
            if subsystem.renderer_name() != renderer {
                continue;
            }
            let Some((node, attr)) = subsystem.frame_buffer_switch() else {
                continue;
            };
            match host.get_bool(node, attr) {
                Ok(true) => host.clone_frame_buffer(*subsystem)?,
                Ok(false) => {}
                Err(HostError::NodeNotFound(_) | HostError::AttributeNotFound { .. }) => {
                    debug!(subsystem = %subsystem, "No frame buffer switch, skipping clone");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn capture_path<H: SceneHost + ?Sized>(&self, host: &H, lights: &[String]) -> PathBuf {
        let file_name = format!(
            "{}_{}_{}",
            host.scene_base_name(),
            self.config.capture_prefix,
            lights.join("_")
        );
        host.project_root()
            .join(&self.config.capture_dir)
            .join(file_name)
    }

    fn transition(&mut self, next: SweepState) {
        debug!(from = ?self.state, to = ?next, "Sweep state");
        self.state = next;
    }
}

fn caption_for(current: &str, lights: &[String]) -> String {
    let names = lights.join(" ");
    if current.is_empty() {
        format!("contribution of {}", names)
    } else {
        format!("{} contribution of {}", current, names)
    }
}

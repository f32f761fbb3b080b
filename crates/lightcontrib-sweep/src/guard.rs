//! Scoped scene-state guard
//!
//! Every attribute change made through a [`StateGuard`] records the previous
//! value. The changes are undone in reverse order when the guard is restored
//! or dropped, so a failed render still leaves the scene as it was found.

use lightcontrib_core::{HostError, SceneHost};
use tracing::warn;

#[derive(Debug, Clone)]
struct Undo {
    node: String,
    attr: String,
    previous: bool,
}

/// Borrows the host and undoes every change made through it on exit
pub struct StateGuard<'h, H: SceneHost + ?Sized> {
    host: &'h mut H,
    undo: Vec<Undo>,
    label: &'static str,
}

impl<'h, H: SceneHost + ?Sized> StateGuard<'h, H> {
    pub fn new(host: &'h mut H, label: &'static str) -> Self {
        Self {
            host,
            undo: Vec::new(),
            label,
        }
    }

    /// Set a boolean attribute, remembering its value for restoration.
    ///
    /// Returns whether the value actually changed. Unchanged attributes are
    /// not recorded.
    pub fn set_bool(&mut self, node: &str, attr: &str, value: bool) -> Result<bool, HostError> {
        let previous = self.host.get_bool(node, attr)?;
        if previous == value {
            return Ok(false);
        }
        self.host.set_bool(node, attr, value)?;
        self.undo.push(Undo {
            node: node.to_string(),
            attr: attr.to_string(),
            previous,
        });
        Ok(true)
    }

    /// Direct host access for operations that do not need restoring
    pub fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    /// Read-only host access
    pub fn host_ref(&self) -> &H {
        &*self.host
    }

    /// Number of recorded changes still pending restoration
    pub fn pending(&self) -> usize {
        self.undo.len()
    }

    /// Undo every change now, reporting the first failure
    pub fn restore(mut self) -> Result<(), HostError> {
        self.unwind()
    }

    fn unwind(&mut self) -> Result<(), HostError> {
        let mut first_error = None;
        while let Some(undo) = self.undo.pop() {
            if let Err(e) = self.host.set_bool(&undo.node, &undo.attr, undo.previous) {
                warn!(
                    guard = self.label,
                    node = undo.node.as_str(),
                    attr = undo.attr.as_str(),
                    error = %e,
                    "Failed to restore attribute"
                );
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<H: SceneHost + ?Sized> Drop for StateGuard<'_, H> {
    fn drop(&mut self) {
        // Errors were already logged in unwind
        let _ = self.unwind();
    }
}

//! Route table and the renderer contract.

use std::collections::HashMap;
use std::fmt;

use crate::error::RenderError;
use crate::path::normalize;

/// Returned by a renderer: what to run when the view is unmounted.
pub enum Mount {
    NoCleanup,
    Cleanup(Box<dyn FnOnce()>),
}

impl Mount {
    pub fn cleanup(f: impl FnOnce() + 'static) -> Self {
        Mount::Cleanup(Box::new(f))
    }

    pub(crate) fn into_cleanup(self) -> Option<Box<dyn FnOnce()>> {
        match self {
            Mount::NoCleanup => None,
            Mount::Cleanup(f) => Some(f),
        }
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mount::NoCleanup => f.write_str("NoCleanup"),
            Mount::Cleanup(_) => f.write_str("Cleanup(..)"),
        }
    }
}

/// Populates the outlet synchronously and hands back its cleanup.
pub type Renderer<O> = Box<dyn Fn(&O) -> Result<Mount, RenderError>>;

/// Path of the route unknown paths fall back to.
pub const FALLBACK: &str = "/";

/// Mapping from normalized path to renderer.
pub struct Routes<O> {
    table: HashMap<String, Renderer<O>>,
}

impl<O> Default for Routes<O> {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
        }
    }
}

impl<O> Routes<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route, replacing any renderer registered for the same path.
    pub fn route<F>(mut self, path: &str, renderer: F) -> Self
    where
        F: Fn(&O) -> Result<Mount, RenderError> + 'static,
    {
        self.insert(path, renderer);
        self
    }

    pub fn insert<F>(&mut self, path: &str, renderer: F)
    where
        F: Fn(&O) -> Result<Mount, RenderError> + 'static,
    {
        self.table.insert(normalize(path), Box::new(renderer));
    }

    pub fn contains(&self, path: &str) -> bool {
        self.table.contains_key(&normalize(path))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Find the renderer for `path`, falling back to `/`.
    ///
    /// Returns the path actually resolved. The renderer is `None` only when
    /// neither `path` nor `/` is registered.
    pub fn resolve(&self, path: &str) -> (String, Option<&Renderer<O>>) {
        let path = normalize(path);
        if let Some(renderer) = self.table.get(&path) {
            return (path, Some(renderer));
        }
        tracing::debug!(%path, "no route, falling back to {}", FALLBACK);
        (FALLBACK.to_string(), self.table.get(FALLBACK))
    }
}

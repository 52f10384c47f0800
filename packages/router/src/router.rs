//! The router: one outlet, one mounted view at a time.

use crate::error::RouterError;
use crate::host::{Dispatch, Document, NavEvent, Outlet};
use crate::path::normalize;
use crate::routes::{Mount, Routes};

/// State that only exists between `init` and `teardown`.
struct Session<O> {
    routes: Routes<O>,
    outlet: O,
    current_path: Option<String>,
    cleanup: Option<Box<dyn FnOnce()>>,
    mounted: bool,
}

/// Client-side router.
///
/// Owns the host [`Document`] for its whole life and the [`Outlet`] while
/// initialized. Dropping an initialized router tears it down.
pub struct Router<D: Document, O: Outlet> {
    document: D,
    session: Option<Session<O>>,
}

impl<D: Document, O: Outlet> Router<D, O> {
    pub fn new(document: D) -> Self {
        Self {
            document,
            session: None,
        }
    }

    /// Install navigation listeners and render the current location.
    ///
    /// An initialized router is torn down first.
    pub fn init(&mut self, routes: Routes<O>, outlet: O) -> Result<(), RouterError> {
        if self.session.is_some() {
            tracing::debug!("re-initializing router");
            self.teardown();
        }

        self.document.add_navigation_listeners();
        self.session = Some(Session {
            routes,
            outlet,
            current_path: None,
            cleanup: None,
            mounted: false,
        });

        let path = self.document.location_path();
        self.render_path(&path)
    }

    /// Navigate to `path`, pushing a history entry.
    ///
    /// Navigating to the current path does nothing.
    pub fn navigate(&mut self, path: &str) -> Result<(), RouterError> {
        let session = self.session.as_ref().ok_or(RouterError::NotInitialized)?;
        let target = normalize(path);
        if session.current_path.as_deref() == Some(target.as_str()) {
            tracing::debug!(path = %target, "already at path");
            return Ok(());
        }

        self.document.push_state(path);
        self.render_path(path)
    }

    /// Replace the mounted view with the one for `path`, without touching
    /// history. Unknown paths render `/`.
    ///
    /// The outgoing cleanup always runs before the incoming renderer.
    pub fn render_path(&mut self, path: &str) -> Result<(), RouterError> {
        let session = self.session.as_mut().ok_or(RouterError::NotInitialized)?;

        if let Some(cleanup) = session.cleanup.take() {
            cleanup();
        }
        session.mounted = false;

        let (resolved, renderer) = session.routes.resolve(path);
        tracing::debug!(requested = %path, path = %resolved, "rendering route");
        session.outlet.clear();
        let result = match renderer {
            Some(renderer) => renderer(&session.outlet).map(Some),
            None => {
                tracing::warn!(path = %resolved, "no route registered");
                Ok(None)
            }
        };
        session.current_path = Some(resolved.clone());

        let outcome = match result {
            Ok(mount) => {
                session.mounted = mount.is_some();
                session.cleanup = mount.and_then(Mount::into_cleanup);
                Ok(())
            }
            Err(source) => Err(RouterError::Render {
                path: resolved.clone(),
                source,
            }),
        };

        mark_active_links(&mut self.document, &resolved);
        outcome
    }

    /// Entry point for events forwarded by the host.
    ///
    /// Events arriving while the router is not initialized are ignored.
    pub fn dispatch(&mut self, event: NavEvent) -> Result<Dispatch, RouterError> {
        let Some(session) = self.session.as_ref() else {
            tracing::debug!(?event, "router not initialized, ignoring event");
            return Ok(Dispatch::Ignored);
        };

        match event {
            NavEvent::PopState => {
                let location = self.document.location_path();
                if session.current_path.as_deref() == Some(normalize(&location).as_str()) {
                    return Ok(Dispatch::Ignored);
                }
                self.render_path(&location)?;
                Ok(Dispatch::Handled)
            }
            NavEvent::Click(click) => match click.intercepted_href() {
                Some(href) => {
                    self.navigate(href)?;
                    Ok(Dispatch::Handled)
                }
                None => Ok(Dispatch::Ignored),
            },
        }
    }

    /// Remove listeners, run the active cleanup and hand the outlet back.
    ///
    /// Returns `None` if the router was not initialized. The router can be
    /// initialized again afterwards.
    pub fn teardown(&mut self) -> Option<O> {
        let mut session = self.session.take()?;
        self.document.remove_navigation_listeners();
        if let Some(cleanup) = session.cleanup.take() {
            cleanup();
        }
        tracing::debug!(path = ?session.current_path, "router torn down");
        Some(session.outlet)
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// True while a renderer's output occupies the outlet.
    pub fn is_mounted(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.mounted)
    }

    pub fn current_path(&self) -> Option<&str> {
        self.session.as_ref()?.current_path.as_deref()
    }

    pub fn outlet(&self) -> Option<&O> {
        self.session.as_ref().map(|s| &s.outlet)
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }
}

impl<D: Document, O: Outlet> Drop for Router<D, O> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.teardown();
        }
    }
}

fn mark_active_links(document: &mut impl Document, current: &str) {
    for href in document.nav_link_targets() {
        let active = normalize(&href) == current;
        document.set_link_active(&href, active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDocument, MemoryOutlet};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn view(name: &'static str, log: &Log) -> impl Fn(&MemoryOutlet) -> Result<Mount, crate::RenderError> {
        let log = log.clone();
        move |outlet: &MemoryOutlet| {
            log.borrow_mut().push(format!("mount {}", name));
            outlet.push_line(name);
            let log = log.clone();
            Ok(Mount::cleanup(move || log.borrow_mut().push(format!("cleanup {}", name))))
        }
    }

    fn router(log: &Log) -> Router<MemoryDocument, MemoryOutlet> {
        let routes = Routes::new()
            .route("/", view("home", log))
            .route("/users", view("users", log));
        let mut router = Router::new(MemoryDocument::new("/"));
        router.init(routes, MemoryOutlet::new()).unwrap();
        router
    }

    #[test]
    fn navigate_before_init_fails() {
        let mut router: Router<MemoryDocument, MemoryOutlet> =
            Router::new(MemoryDocument::new("/"));
        assert!(matches!(router.navigate("/users"), Err(RouterError::NotInitialized)));
        assert_eq!(
            router.dispatch(NavEvent::PopState).unwrap(),
            Dispatch::Ignored
        );
    }

    #[test]
    fn init_renders_current_location() {
        let log = Log::default();
        let router = router(&log);
        assert_eq!(router.current_path(), Some("/"));
        assert!(router.is_mounted());
        assert_eq!(*log.borrow(), vec!["mount home"]);
    }

    #[test]
    fn cleanup_runs_before_next_mount() {
        let log = Log::default();
        let mut router = router(&log);
        router.navigate("/users").unwrap();
        assert_eq!(*log.borrow(), vec!["mount home", "cleanup home", "mount users"]);
    }

    #[test]
    fn renderer_error_leaves_router_unmounted() {
        let log = Log::default();
        let routes = Routes::new()
            .route("/", view("home", &log))
            .route("/broken", |_: &MemoryOutlet| Err("no data".into()));
        let mut router = Router::new(MemoryDocument::new("/"));
        router.init(routes, MemoryOutlet::new()).unwrap();

        let error = router.navigate("/broken").unwrap_err();

        assert!(matches!(error, RouterError::Render { ref path, .. } if path == "/broken"));
        assert_eq!(router.current_path(), Some("/broken"));
        assert!(!router.is_mounted());
        assert_eq!(*log.borrow(), vec!["mount home", "cleanup home"]);
    }

    #[test]
    fn drop_runs_cleanup() {
        let log = Log::default();
        drop(router(&log));
        assert_eq!(*log.borrow(), vec!["mount home", "cleanup home"]);
    }
}

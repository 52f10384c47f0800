//! # timetrack-router
//!
//! A client-side router that mounts one view at a time into a single outlet.
//!
//! The router never touches a real DOM. It talks to its environment through
//! two traits:
//!
//! - [`Document`]: location, history and the navigation links to highlight.
//! - [`Outlet`]: the container views render into.
//!
//! Hosts forward link clicks and back/forward events to
//! [`Router::dispatch`]. The [`memory`] module provides in-memory hosts for
//! tests and headless use.
//!
//! ```ignore
//! use timetrack_router::{Mount, Router, Routes};
//! use timetrack_router::memory::{MemoryDocument, MemoryOutlet};
//!
//! let routes = Routes::new()
//!     .route("/", |outlet: &MemoryOutlet| {
//!         outlet.push_line("Dashboard");
//!         Ok(Mount::NoCleanup)
//!     });
//!
//! let mut router = Router::new(MemoryDocument::new("/"));
//! router.init(routes, MemoryOutlet::new())?;
//! router.navigate("/users")?;
//! ```

pub mod error;
pub mod host;
pub mod memory;
pub mod path;
pub mod routes;
pub mod router;

pub use error::{RenderError, RouterError};
pub use host::{Dispatch, Document, LinkClick, NavEvent, Outlet};
pub use path::normalize;
pub use router::Router;
pub use routes::{Mount, Renderer, Routes};

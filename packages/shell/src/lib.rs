//! # timetrack-shell
//!
//! Application root for the time tracker.
//!
//! [`App`] owns the [`timetrack_store::Store`] and a
//! [`timetrack_router::Router`], and mounts text views for `/`, `/users`,
//! `/activities`, `/tracks` and `/recap` into an in-memory outlet.
//!
//! ## Usage
//!
//! ```bash
//! # Dashboard
//! timetrack
//!
//! # One route, for a given day
//! timetrack --date 2024-05-01 show /tracks
//! timetrack --date 2024-05-01 --mode weekly show /recap
//!
//! # Edit
//! timetrack add-user Ada
//! timetrack delete-track 12
//! ```
//!
//! The API location comes from `--api-url` or `TIMETRACK_API_URL`.

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod render;
pub mod views;

pub use app::App;
pub use config::{Cli, Command, ShellConfig};
pub use context::{Selection, ViewContext};
pub use error::ShellError;
pub use logging::init_tracing;

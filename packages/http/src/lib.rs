//! # timetrack-http
//!
//! HTTP client for the time tracking REST API.
//!
//! ## Layers
//!
//! - [`HttpExecutor`]: sends one [`HttpRequest`] and returns the raw
//!   [`HttpResponse`]. [`ReqwestExecutor`] talks to a real server; the
//!   `test-utils` feature adds [`executor::mock::MockExecutor`].
//! - [`ApiClient`]: typed operations for users, activities, tracks and recap,
//!   translating non-2xx responses into [`Error::Status`].
//!
//! ```ignore
//! use timetrack_http::{ApiClient, TrackQuery};
//!
//! let api = ApiClient::connect("http://localhost:8000", Duration::from_secs(10))?;
//! let users = api.list_users().await?;
//! let today = api.list_tracks(&TrackQuery::for_date(date)).await?;
//! ```

pub mod api;
pub mod error;
pub mod executor;
pub mod models;
pub mod types;

pub use api::ApiClient;
pub use error::Error;
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use models::{
    Activity, EntityId, Named, NewActivity, NewTrack, NewUser, Page, Recap, RecapEntry,
    RecapMode, RecapQuery, Related, Track, TrackQuery, User, YearMonth,
};
pub use types::{HttpRequest, HttpResponse, Method};

//! # timetrack-store
//!
//! Reactive store for the time tracking resources.
//!
//! The store keeps one [`Slice`] per [`ResourceKey`] (users, activities,
//! tracks, recap), fills it through [`timetrack_http::ApiClient`], and tells
//! subscribers whenever a slice changes.
//!
//! - Loads are cached (`force = false` serves non-empty data fetched with the
//!   same query) and de-duplicated (an identical load in flight is not
//!   repeated).
//! - Failed reads land in `slice.error`; failed writes land there too and are
//!   returned to the caller.
//! - Each load is tagged with a generation. [`StaleResponses`] decides whether
//!   a superseded response is dropped or applied.
//!
//! ```ignore
//! use timetrack_store::{listener, ResourceKey, Store, StoreConfig};
//!
//! let store = Store::new(api, StoreConfig::default());
//! let on_change = listener(move |key| println!("{} changed", key));
//! store.subscribe(ResourceKey::Users, &on_change);
//! store.load_users(false).await;
//! ```
//!
//! All state lives behind `Rc`/`RefCell`: the store belongs to one thread
//! and its futures are not `Send`.

mod config;
mod merge;
mod slice;
mod store;
mod subscriptions;

pub use config::{StaleResponses, StoreConfig};
pub use slice::{CachedData, Slice};
pub use store::{
    ActivitiesSlice, EntityKind, RecapSlice, Store, TracksSlice, UsersSlice,
};
pub use subscriptions::{listener, Listener, ResourceKey, Subscriptions};

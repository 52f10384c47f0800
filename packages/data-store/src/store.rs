//! The reactive resource store.
//!
//! Every operation follows the same shape: mutate the slice, notify, await
//! the API, mutate again, notify. Reads keep their failures in the slice;
//! writes also hand them back to the caller.

use std::cell::RefCell;
use std::fmt::Debug;
use std::future::Future;
use std::rc::Rc;

use timetrack_http::{
    Activity, ApiClient, EntityId, Error, NewActivity, NewTrack, NewUser, Page, Recap,
    RecapQuery, Track, TrackQuery, User,
};

use crate::config::StoreConfig;
use crate::merge;
use crate::slice::{CachedData, Skip, Slice, Slot};
use crate::subscriptions::{Listener, ResourceKey, Subscriptions};

pub type UsersSlice = Slice<Vec<User>, ()>;
pub type ActivitiesSlice = Slice<Vec<Activity>, ()>;
pub type TracksSlice = Slice<Page<Track>, TrackQuery>;
pub type RecapSlice = Slice<Option<Recap>, RecapQuery>;

/// Which kind of entity a name lookup is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Activity,
}

impl EntityKind {
    fn placeholder(&self, id: EntityId) -> String {
        match self {
            EntityKind::User => format!("User #{}", id),
            EntityKind::Activity => format!("Activity #{}", id),
        }
    }
}

#[derive(Default)]
struct State {
    users: Slot<Vec<User>, ()>,
    activities: Slot<Vec<Activity>, ()>,
    tracks: Slot<Page<Track>, TrackQuery>,
    recap: Slot<Option<Recap>, RecapQuery>,
}

type Select<T, Q> = fn(&mut State) -> &mut Slot<T, Q>;

struct Inner {
    api: ApiClient,
    config: StoreConfig,
    state: RefCell<State>,
    subscriptions: Subscriptions,
}

/// Shared handle to the store. Clones refer to the same state.
#[derive(Clone)]
pub struct Store {
    inner: Rc<Inner>,
}

impl Store {
    pub fn new(api: ApiClient, config: StoreConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                api,
                config,
                state: RefCell::new(State::default()),
                subscriptions: Subscriptions::new(),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn subscribe(&self, key: ResourceKey, listener: &Listener) -> bool {
        self.inner.subscriptions.subscribe(key, listener)
    }

    pub fn unsubscribe(&self, key: ResourceKey, listener: &Listener) -> bool {
        self.inner.subscriptions.unsubscribe(key, listener)
    }

    /// Run the listeners for `key`. Never called with the state borrowed.
    pub fn notify(&self, key: ResourceKey) {
        self.inner.subscriptions.notify(key);
    }

    pub fn listener_count(&self, key: ResourceKey) -> usize {
        self.inner.subscriptions.listener_count(key)
    }

    pub fn users(&self) -> UsersSlice {
        self.inner.state.borrow().users.slice.clone()
    }

    pub fn activities(&self) -> ActivitiesSlice {
        self.inner.state.borrow().activities.slice.clone()
    }

    pub fn tracks(&self) -> TracksSlice {
        self.inner.state.borrow().tracks.slice.clone()
    }

    pub fn recap(&self) -> RecapSlice {
        self.inner.state.borrow().recap.slice.clone()
    }

    /// True while any slice has a fetch in flight.
    pub fn is_busy(&self) -> bool {
        let state = self.inner.state.borrow();
        state.users.slice.is_loading
            || state.activities.slice.is_loading
            || state.tracks.slice.is_loading
            || state.recap.slice.is_loading
    }

    pub async fn load_users(&self, force: bool) {
        let fetch = self.inner.api.list_users();
        self.load(ResourceKey::Users, |s| &mut s.users, (), force, fetch)
            .await;
    }

    pub async fn load_activities(&self, force: bool) {
        let fetch = self.inner.api.list_activities();
        self.load(
            ResourceKey::Activities,
            |s| &mut s.activities,
            (),
            force,
            fetch,
        )
        .await;
    }

    /// Load tracks for `query`. A cached page only satisfies the same query.
    pub async fn load_tracks(&self, query: TrackQuery, force: bool) {
        let fetch = self.inner.api.list_tracks(&query);
        self.load(
            ResourceKey::Tracks,
            |s| &mut s.tracks,
            query.clone(),
            force,
            fetch,
        )
        .await;
    }

    /// Load a recap. Always fetches unless the same query is in flight.
    pub async fn load_recap(&self, query: RecapQuery) {
        let fetch = async { self.inner.api.recap(&query).await.map(Some) };
        self.load(
            ResourceKey::Recap,
            |s| &mut s.recap,
            query.clone(),
            true,
            fetch,
        )
        .await;
    }

    pub async fn create_user(&self, payload: NewUser) -> Result<User, Error> {
        let write = self.inner.api.create_user(&payload);
        self.write(ResourceKey::Users, |s| &mut s.users, write, |slice, user| {
            merge::upsert_by_name(&mut slice.data, user.clone());
        })
        .await
    }

    pub async fn create_activity(&self, payload: NewActivity) -> Result<Activity, Error> {
        let write = self.inner.api.create_activity(&payload);
        self.write(
            ResourceKey::Activities,
            |s| &mut s.activities,
            write,
            |slice, activity| {
                merge::upsert_by_name(&mut slice.data, activity.clone());
            },
        )
        .await
    }

    /// Create a track. It joins the cached page only if the page's query
    /// would list it; otherwise it shows up on the next `load_tracks`.
    pub async fn create_track(&self, payload: NewTrack) -> Result<Track, Error> {
        let write = self.inner.api.create_track(&payload);
        self.write(ResourceKey::Tracks, |s| &mut s.tracks, write, |slice, track| {
            let belongs = slice.query.as_ref().is_some_and(|q| q.admits(track));
            if belongs {
                merge::upsert_track(&mut slice.data, track.clone());
            } else {
                tracing::debug!(track = track.id, "created track outside the loaded window");
            }
        })
        .await
    }

    /// Delete a user. Cached tracks of that user go with it.
    pub async fn delete_user(&self, id: EntityId) -> Result<(), Error> {
        let write = self.inner.api.delete_user(id);
        self.write(ResourceKey::Users, |s| &mut s.users, write, |slice, _| {
            merge::remove_by_id(&mut slice.data, id);
        })
        .await?;
        self.purge_tracks(|t| t.user.id() == id);
        Ok(())
    }

    /// Delete an activity. Cached tracks of that activity go with it.
    pub async fn delete_activity(&self, id: EntityId) -> Result<(), Error> {
        let write = self.inner.api.delete_activity(id);
        self.write(
            ResourceKey::Activities,
            |s| &mut s.activities,
            write,
            |slice, _| {
                merge::remove_by_id(&mut slice.data, id);
            },
        )
        .await?;
        self.purge_tracks(|t| t.activity.id() == id);
        Ok(())
    }

    pub async fn delete_track(&self, id: EntityId) -> Result<(), Error> {
        let write = self.inner.api.delete_track(id);
        self.write(ResourceKey::Tracks, |s| &mut s.tracks, write, |slice, _| {
            merge::remove_tracks(&mut slice.data, |t| t.id == id);
        })
        .await
    }

    /// Display name for an entity id, from cache only.
    pub fn name_of(&self, kind: EntityKind, id: EntityId) -> String {
        let state = self.inner.state.borrow();
        let found = match kind {
            EntityKind::User => state
                .users
                .slice
                .data
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.name.clone()),
            EntityKind::Activity => state
                .activities
                .slice
                .data
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.name.clone()),
        };
        found.unwrap_or_else(|| kind.placeholder(id))
    }

    /// User and activity names for a track, preferring names the server
    /// embedded in the track itself.
    pub fn track_names(&self, track: &Track) -> (String, String) {
        let user = match track.user.name() {
            Some(name) => name.to_string(),
            None => self.name_of(EntityKind::User, track.user.id()),
        };
        let activity = match track.activity.name() {
            Some(name) => name.to_string(),
            None => self.name_of(EntityKind::Activity, track.activity.id()),
        };
        (user, activity)
    }

    async fn load<T, Q, F>(&self, key: ResourceKey, select: Select<T, Q>, query: Q, force: bool, fetch: F)
    where
        T: CachedData,
        Q: Clone + PartialEq + Debug,
        F: Future<Output = Result<T, Error>>,
    {
        let generation = {
            let mut state = self.inner.state.borrow_mut();
            let slot = select(&mut state);
            match slot.should_skip(&query, force) {
                Some(Skip::InFlight) => {
                    tracing::debug!(resource = %key, ?query, "load already in flight");
                    return;
                }
                Some(Skip::Cached) => {
                    tracing::debug!(resource = %key, ?query, "serving cached data");
                    return;
                }
                None => slot.begin_load(query.clone()),
            }
        };
        self.notify(key);

        let pending = PendingLoad {
            store: self,
            key,
            select,
            generation,
            settled: false,
        };
        let result = fetch.await;
        pending.settle(query, result);
    }

    async fn write<T, Q, R, F>(
        &self,
        key: ResourceKey,
        select: Select<T, Q>,
        write: F,
        apply: impl FnOnce(&mut Slice<T, Q>, &R),
    ) -> Result<R, Error>
    where
        F: Future<Output = Result<R, Error>>,
    {
        select(&mut self.inner.state.borrow_mut()).slice.error = None;
        self.notify(key);

        let _notify = NotifyOnDrop { store: self, key };
        let result = write.await;

        let mut state = self.inner.state.borrow_mut();
        let slice = &mut select(&mut state).slice;
        match &result {
            Ok(value) => apply(slice, value),
            Err(error) => {
                tracing::warn!(resource = %key, %error, "write failed");
                slice.error = Some(error.to_string());
            }
        }
        result
    }

    fn purge_tracks(&self, pred: impl Fn(&Track) -> bool) {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            merge::remove_tracks(&mut state.tracks.slice.data, pred)
        };
        if removed > 0 {
            tracing::debug!(removed, "dropped cached tracks of deleted entity");
            self.notify(ResourceKey::Tracks);
        }
    }
}

/// Settles a started load. If the load future is dropped first, the slice
/// is released from loading instead.
struct PendingLoad<'a, T, Q> {
    store: &'a Store,
    key: ResourceKey,
    select: Select<T, Q>,
    generation: u64,
    settled: bool,
}

impl<T: CachedData, Q: Clone + PartialEq> PendingLoad<'_, T, Q> {
    fn settle(mut self, query: Q, result: Result<T, Error>) {
        let generation = self.generation;
        if let Err(error) = &result {
            tracing::warn!(resource = %self.key, %error, "load failed");
        }
        let applied = {
            let mut state = self.store.inner.state.borrow_mut();
            (self.select)(&mut state).finish_load(
                generation,
                query,
                result,
                self.store.inner.config.stale_responses,
            )
        };
        if !applied {
            tracing::debug!(resource = %self.key, generation, "discarded stale response");
        }
        self.settled = true;
        self.store.notify(self.key);
    }
}

impl<T, Q> Drop for PendingLoad<'_, T, Q> {
    fn drop(&mut self) {
        if self.settled || std::thread::panicking() {
            return;
        }
        if let Ok(mut state) = self.store.inner.state.try_borrow_mut() {
            (self.select)(&mut state).abandon_load(self.generation);
        }
        self.store.notify(self.key);
    }
}

/// Notifies when a write settles, including when its future is dropped.
struct NotifyOnDrop<'a> {
    store: &'a Store,
    key: ResourceKey,
}

impl Drop for NotifyOnDrop<'_> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.store.notify(self.key);
        }
    }
}

//! Per-resource state and its load bookkeeping.

use timetrack_http::{Error, Page};

use crate::config::StaleResponses;

/// Data that can satisfy a non-forced load from cache.
pub trait CachedData {
    /// True when the value is worth serving without a fetch.
    fn is_cached(&self) -> bool;
}

impl<T> CachedData for Vec<T> {
    fn is_cached(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> CachedData for Option<T> {
    fn is_cached(&self) -> bool {
        self.is_some()
    }
}

impl<T> CachedData for Page<T> {
    fn is_cached(&self) -> bool {
        !self.results.is_empty()
    }
}

/// The observable state of one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<T, Q> {
    pub data: T,
    /// True while a fetch for this slice is in flight.
    pub is_loading: bool,
    /// Message of the last failed operation; cleared when the next starts.
    pub error: Option<String>,
    /// The query `data` was fetched with.
    pub query: Option<Q>,
}

impl<T: Default, Q> Default for Slice<T, Q> {
    fn default() -> Self {
        Self {
            data: T::default(),
            is_loading: false,
            error: None,
            query: None,
        }
    }
}

/// A slice plus the generation counter used to spot superseded loads.
pub(crate) struct Slot<T, Q> {
    pub(crate) slice: Slice<T, Q>,
    generation: u64,
    pending: usize,
    /// Query of the newest load, until that load settles.
    in_flight: Option<Q>,
}

impl<T: Default, Q> Default for Slot<T, Q> {
    fn default() -> Self {
        Self {
            slice: Slice::default(),
            generation: 0,
            pending: 0,
            in_flight: None,
        }
    }
}

/// Why a load returned without fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Skip {
    InFlight,
    Cached,
}

impl<T: CachedData, Q: PartialEq + Clone> Slot<T, Q> {
    /// Decide whether a load for `query` should go to the network.
    pub(crate) fn should_skip(&self, query: &Q, force: bool) -> Option<Skip> {
        if self.in_flight.as_ref() == Some(query) {
            return Some(Skip::InFlight);
        }
        if !force && self.slice.data.is_cached() && self.slice.query.as_ref() == Some(query) {
            return Some(Skip::Cached);
        }
        None
    }

    /// Mark a load as started and return its generation.
    pub(crate) fn begin_load(&mut self, query: Q) -> u64 {
        self.generation += 1;
        self.pending += 1;
        self.in_flight = Some(query);
        self.slice.is_loading = true;
        self.slice.error = None;
        self.generation
    }

    /// Record the outcome of the load tagged `generation`.
    ///
    /// Returns true if the outcome was applied to the slice.
    pub(crate) fn finish_load(
        &mut self,
        generation: u64,
        query: Q,
        result: Result<T, Error>,
        policy: StaleResponses,
    ) -> bool {
        self.pending = self.pending.saturating_sub(1);
        let stale = generation != self.generation;
        if !stale {
            self.in_flight = None;
        }
        let apply = !stale || policy == StaleResponses::Apply;

        if apply {
            match result {
                Ok(data) => {
                    self.slice.data = data;
                    self.slice.query = Some(query);
                }
                Err(error) => {
                    self.slice.error = Some(error.to_string());
                }
            }
        }

        self.settle_if_idle();
        apply
    }
}

impl<T, Q> Slot<T, Q> {
    /// Forget a load whose future was dropped before it resolved.
    pub(crate) fn abandon_load(&mut self, generation: u64) {
        self.pending = self.pending.saturating_sub(1);
        if generation == self.generation {
            self.in_flight = None;
        }
        self.settle_if_idle();
    }

    fn settle_if_idle(&mut self) {
        if self.pending == 0 {
            self.slice.is_loading = false;
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(message: &str) -> Error {
        Error::Transport {
            message: message.to_string(),
        }
    }

    #[test]
    fn empty_collections_are_not_cached() {
        assert!(!Vec::<u8>::new().is_cached());
        assert!(vec![1].is_cached());
        assert!(!None::<u8>.is_cached());
        assert!(!Page::<u8>::default().is_cached());
    }

    #[test]
    fn skip_when_same_query_in_flight() {
        let mut slot: Slot<Vec<u8>, u8> = Slot::default();
        slot.begin_load(1);

        assert_eq!(slot.should_skip(&1, true), Some(Skip::InFlight));
        assert_eq!(slot.should_skip(&2, true), None);
    }

    #[test]
    fn skip_cached_only_for_matching_query_without_force() {
        let mut slot: Slot<Vec<u8>, u8> = Slot::default();
        let generation = slot.begin_load(1);
        slot.finish_load(generation, 1, Ok(vec![9]), StaleResponses::Discard);

        assert_eq!(slot.should_skip(&1, false), Some(Skip::Cached));
        assert_eq!(slot.should_skip(&1, true), None);
        assert_eq!(slot.should_skip(&2, false), None);
    }

    #[test]
    fn failure_keeps_data_and_sets_error() {
        let mut slot: Slot<Vec<u8>, ()> = Slot::default();
        let generation = slot.begin_load(());
        slot.finish_load(generation, (), Ok(vec![1, 2]), StaleResponses::Discard);

        let generation = slot.begin_load(());
        assert!(slot.slice.is_loading);
        slot.finish_load(generation, (), Err(failure("boom")), StaleResponses::Discard);

        assert_eq!(slot.slice.data, vec![1, 2]);
        assert_eq!(slot.slice.error.as_deref(), Some("Network error: boom"));
        assert!(!slot.slice.is_loading);
    }

    #[test]
    fn begin_clears_previous_error() {
        let mut slot: Slot<Vec<u8>, ()> = Slot::default();
        let generation = slot.begin_load(());
        slot.finish_load(generation, (), Err(failure("x")), StaleResponses::Discard);
        assert!(slot.slice.error.is_some());

        slot.begin_load(());
        assert!(slot.slice.error.is_none());
    }

    #[test]
    fn stale_outcome_discarded_and_loading_held_until_newest_settles() {
        let mut slot: Slot<Vec<u8>, u8> = Slot::default();
        let first = slot.begin_load(1);
        let second = slot.begin_load(2);

        assert!(!slot.finish_load(first, 1, Ok(vec![1]), StaleResponses::Discard));
        assert!(slot.slice.is_loading);
        assert!(slot.slice.data.is_empty());

        assert!(slot.finish_load(second, 2, Ok(vec![2]), StaleResponses::Discard));
        assert!(!slot.slice.is_loading);
        assert_eq!(slot.slice.data, vec![2]);
        assert_eq!(slot.slice.query, Some(2));
    }

    #[test]
    fn stale_outcome_applied_under_apply_policy() {
        let mut slot: Slot<Vec<u8>, u8> = Slot::default();
        let first = slot.begin_load(1);
        let second = slot.begin_load(2);

        slot.finish_load(second, 2, Ok(vec![2]), StaleResponses::Apply);
        slot.finish_load(first, 1, Ok(vec![1]), StaleResponses::Apply);

        assert_eq!(slot.slice.data, vec![1]);
        assert_eq!(slot.slice.query, Some(1));
    }

    #[test]
    fn newest_settling_ends_dedup_while_stale_load_pending() {
        let mut slot: Slot<Vec<u8>, u8> = Slot::default();
        let _first = slot.begin_load(1);
        let second = slot.begin_load(2);
        slot.finish_load(second, 2, Ok(vec![2]), StaleResponses::Discard);

        assert!(slot.slice.is_loading);
        assert_eq!(slot.should_skip(&2, true), None);
    }

    #[test]
    fn abandoned_load_clears_loading() {
        let mut slot: Slot<Vec<u8>, ()> = Slot::default();
        let generation = slot.begin_load(());
        slot.abandon_load(generation);

        assert!(!slot.slice.is_loading);
        assert_eq!(slot.should_skip(&(), false), None);
    }
}

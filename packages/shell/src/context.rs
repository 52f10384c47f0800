//! State shared by every view.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use tokio::task::{JoinHandle, LocalSet};
use timetrack_http::{RecapMode, RecapQuery, TrackQuery};
use timetrack_store::Store;

use crate::error::ShellError;

/// What the tracks and recap views show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Day to show; all tracks and the current recap period when unset.
    pub date: Option<NaiveDate>,
    pub recap_mode: RecapMode,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            date: None,
            recap_mode: RecapMode::Daily,
        }
    }
}

impl Selection {
    pub fn track_query(&self) -> TrackQuery {
        match self.date {
            Some(date) => TrackQuery::for_date(date),
            None => TrackQuery::all(),
        }
    }

    /// Recap query for the period containing the selected day.
    pub fn recap_query(&self) -> RecapQuery {
        let Some(date) = self.date else {
            return RecapQuery::current(self.recap_mode);
        };
        match self.recap_mode {
            RecapMode::Daily => RecapQuery::daily(date),
            RecapMode::Weekly => {
                let offset = date.weekday().num_days_from_monday();
                let monday = date - chrono::Duration::days(i64::from(offset));
                RecapQuery::weekly(monday)
            }
            RecapMode::Monthly => RecapQuery::monthly(date.year(), date.month()),
        }
    }
}

/// Handle views use to reach the store and schedule loads.
///
/// Loads run on a [`LocalSet`] owned here, so renderers can start them
/// synchronously and the app can wait for them later.
#[derive(Clone)]
pub struct ViewContext {
    store: Store,
    selection: Rc<RefCell<Selection>>,
    tasks: Rc<LocalSet>,
    pending: Rc<RefCell<Vec<JoinHandle<()>>>>,
}

impl ViewContext {
    pub fn new(store: Store, selection: Selection) -> Self {
        Self {
            store,
            selection: Rc::new(RefCell::new(selection)),
            tasks: Rc::new(LocalSet::new()),
            pending: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn selection(&self) -> Selection {
        *self.selection.borrow()
    }

    pub fn set_selection(&self, selection: Selection) {
        *self.selection.borrow_mut() = selection;
    }

    /// Schedule `task` on the view task set. It runs once the set is driven.
    pub fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        let handle = self.tasks.spawn_local(task);
        self.pending.borrow_mut().push(handle);
    }

    /// Drive scheduled tasks until all of them, including ones scheduled
    /// meanwhile, have finished.
    pub async fn settle(&self, timeout: Duration) -> Result<(), ShellError> {
        let drain = async {
            loop {
                let batch: Vec<_> = self.pending.borrow_mut().drain(..).collect();
                if batch.is_empty() {
                    return Ok::<(), ShellError>(());
                }
                for handle in batch {
                    handle.await?;
                }
            }
        };
        tokio::time::timeout(timeout, self.tasks.run_until(drain))
            .await
            .map_err(|_| ShellError::Timeout(timeout))?
    }
}

//! The application root.

use std::time::Duration;

use timetrack_http::{ApiClient, NewActivity, NewTrack, NewUser};
use timetrack_router::memory::{MemoryDocument, MemoryOutlet};
use timetrack_router::{Dispatch, NavEvent, Router};
use timetrack_store::Store;

use crate::config::{Command, ShellConfig};
use crate::context::{Selection, ViewContext};
use crate::error::ShellError;
use crate::views;

/// Owns the store and the router, and wires the views between them.
pub struct App {
    context: ViewContext,
    router: Router<MemoryDocument, MemoryOutlet>,
    settle_timeout: Duration,
}

impl App {
    pub fn new(api: ApiClient, config: &ShellConfig) -> Self {
        let store = Store::new(api, config.store.clone());
        Self {
            context: ViewContext::new(store, config.selection),
            router: Router::new(document(views::HOME)),
            settle_timeout: config.timeout * 3,
        }
    }

    /// Build an app talking to the API at `config.api_url`.
    pub fn connect(config: &ShellConfig) -> Result<Self, ShellError> {
        let api = ApiClient::connect(&config.api_url, config.timeout)?;
        Ok(Self::new(api, config))
    }

    pub fn store(&self) -> &Store {
        self.context.store()
    }

    pub fn router(&self) -> &Router<MemoryDocument, MemoryOutlet> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router<MemoryDocument, MemoryOutlet> {
        &mut self.router
    }

    /// Start routing with the location at `path`.
    ///
    /// A running session is torn down first.
    pub fn start(&mut self, path: &str) -> Result<(), ShellError> {
        self.router.teardown();
        self.router = Router::new(document(path));
        let routes = views::routes(&self.context);
        self.router.init(routes, MemoryOutlet::new())?;
        Ok(())
    }

    /// Tear the router down, running the mounted view's cleanup.
    pub fn stop(&mut self) -> Option<MemoryOutlet> {
        self.router.teardown()
    }

    pub fn navigate(&mut self, path: &str) -> Result<(), ShellError> {
        self.router.navigate(path)?;
        Ok(())
    }

    pub fn dispatch(&mut self, event: NavEvent) -> Result<Dispatch, ShellError> {
        Ok(self.router.dispatch(event)?)
    }

    /// Change what the tracks and recap views show and redraw the current
    /// view with it.
    pub fn select(&mut self, selection: Selection) -> Result<(), ShellError> {
        self.context.set_selection(selection);
        let current = self
            .router
            .current_path()
            .map(str::to_string)
            .ok_or(ShellError::NotStarted)?;
        self.router.render_path(&current)?;
        Ok(())
    }

    /// Wait until every load scheduled by the views has finished.
    pub async fn settle(&self) -> Result<(), ShellError> {
        self.context.settle(self.settle_timeout).await
    }

    /// Text currently in the outlet.
    pub fn screen(&self) -> Result<String, ShellError> {
        self.router
            .outlet()
            .map(MemoryOutlet::text)
            .ok_or(ShellError::NotStarted)
    }

    /// Run one command and return the screen it leaves behind.
    pub async fn run(&mut self, command: Command) -> Result<String, ShellError> {
        let path = match command {
            Command::Show { path } => path,
            Command::AddUser { name } => {
                let user = self.store().create_user(NewUser { name }).await?;
                tracing::info!(id = user.id, "created user");
                views::USERS.to_string()
            }
            Command::AddActivity { name } => {
                let activity = self.store().create_activity(NewActivity { name }).await?;
                tracing::info!(id = activity.id, "created activity");
                views::ACTIVITIES.to_string()
            }
            Command::AddTrack {
                user,
                activity,
                start,
                end,
                comment,
            } => {
                let payload = NewTrack {
                    user,
                    activity,
                    start_time: start,
                    end_time: end,
                    comment,
                };
                let track = self.store().create_track(payload).await?;
                tracing::info!(id = track.id, "created track");
                let mut selection = self.context.selection();
                selection.date.get_or_insert(track.start_date());
                self.context.set_selection(selection);
                views::TRACKS.to_string()
            }
            Command::DeleteUser { id } => {
                self.store().delete_user(id).await?;
                views::USERS.to_string()
            }
            Command::DeleteActivity { id } => {
                self.store().delete_activity(id).await?;
                views::ACTIVITIES.to_string()
            }
            Command::DeleteTrack { id } => {
                self.store().delete_track(id).await?;
                views::TRACKS.to_string()
            }
        };

        self.start(&path)?;
        self.settle().await?;
        self.screen()
    }
}

fn document(path: &str) -> MemoryDocument {
    MemoryDocument::new(path).with_links(views::NAV_LINKS)
}

//! Command line and environment configuration.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{Parser, Subcommand};
use timetrack_http::{EntityId, RecapMode};
use timetrack_store::{StaleResponses, StoreConfig};

use crate::context::Selection;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// timetrack - Browse and edit time tracks from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "timetrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the time tracking API
    #[arg(long, env = "TIMETRACK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "TIMETRACK_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// What to do with responses of superseded loads (discard or apply)
    #[arg(long, env = "TIMETRACK_STALE", default_value = "discard")]
    pub stale: StaleResponses,

    /// Day shown by the tracks and recap views (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Recap period (daily, weekly or monthly)
    #[arg(long, default_value = "daily")]
    pub mode: RecapMode,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Render a route and print it
    Show {
        /// Route path, e.g. /users or /tracks
        #[arg(default_value = "/")]
        path: String,
    },
    /// Create a user
    AddUser { name: String },
    /// Create an activity
    AddActivity { name: String },
    /// Record a track
    AddTrack {
        #[arg(long)]
        user: EntityId,
        #[arg(long)]
        activity: EntityId,
        /// RFC 3339 start time, e.g. 2024-05-01T09:00:00+02:00
        #[arg(long)]
        start: DateTime<FixedOffset>,
        #[arg(long)]
        end: DateTime<FixedOffset>,
        #[arg(long)]
        comment: Option<String>,
    },
    DeleteUser { id: EntityId },
    DeleteActivity { id: EntityId },
    DeleteTrack { id: EntityId },
}

/// Settings the app is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub store: StoreConfig,
    pub selection: Selection,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            store: StoreConfig::default(),
            selection: Selection::default(),
        }
    }
}

impl Cli {
    pub fn config(&self) -> ShellConfig {
        ShellConfig {
            api_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            store: StoreConfig::default().with_stale_responses(self.stale),
            selection: Selection {
                date: self.date,
                recap_mode: self.mode,
            },
        }
    }

    /// The subcommand, defaulting to showing the dashboard.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Show {
            path: "/".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["timetrack"]).unwrap();
        let config = cli.config();

        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.store.stale_responses, StaleResponses::Discard);
        assert_eq!(config.selection, Selection::default());
        assert_eq!(cli.command(), Command::Show { path: "/".to_string() });
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "timetrack",
            "--api-url",
            "http://tracker.local:9000",
            "--stale",
            "apply",
            "--date",
            "2024-05-01",
            "--mode",
            "weekly",
            "show",
            "/recap",
        ])
        .unwrap();
        let config = cli.config();

        assert_eq!(config.api_url, "http://tracker.local:9000");
        assert_eq!(config.store.stale_responses, StaleResponses::Apply);
        assert_eq!(config.selection.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(config.selection.recap_mode, RecapMode::Weekly);
        assert_eq!(cli.command(), Command::Show { path: "/recap".to_string() });
    }

    #[test]
    fn invalid_policy_is_rejected() {
        assert!(Cli::try_parse_from(["timetrack", "--stale", "sometimes"]).is_err());
    }

    #[test]
    fn add_track_parses_timestamps() {
        let cli = Cli::try_parse_from([
            "timetrack",
            "add-track",
            "--user",
            "1",
            "--activity",
            "2",
            "--start",
            "2024-05-01T09:00:00+02:00",
            "--end",
            "2024-05-01T10:00:00+02:00",
        ])
        .unwrap();

        match cli.command() {
            Command::AddTrack { user, activity, start, comment, .. } => {
                assert_eq!((user, activity), (1, 2));
                assert_eq!(start.offset().local_minus_utc(), 7200);
                assert!(comment.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}

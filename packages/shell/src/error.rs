use std::time::Duration;

use timetrack_router::RouterError;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Api(#[from] timetrack_http::Error),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error("app has not been started")]
    NotStarted,

    #[error("views still loading after {0:?}")]
    Timeout(Duration),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

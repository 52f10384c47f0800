/// Error a view renderer may return.
pub type RenderError = Box<dyn std::error::Error>;

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("router is not initialized")]
    NotInitialized,

    /// The renderer for `path` failed. The previous view was already
    /// cleaned up, so the router is left unmounted at `path`.
    #[error("failed to render {path}: {source}")]
    Render {
        path: String,
        #[source]
        source: RenderError,
    },
}

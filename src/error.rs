/// Error types for the page side and the popup side
use thiserror::Error;

/// A fault raised by the page while a run is scrolling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PageError {
    #[error("scroll container is no longer attached to the document")]
    ContainerDetached,

    #[error("page script error: {0}")]
    Js(String),
}

/// Failures the popup surfaces to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("no active page")]
    NoActivePage,

    #[error("failed to run on page: {0}")]
    Injection(String),

    #[error("failed to reload page: {0}")]
    Reload(String),

    #[error("unreadable message: {0}")]
    Decode(String),
}

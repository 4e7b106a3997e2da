//! Page access errors.

use thiserror::Error;

use crate::page::NodeId;

/// Errors raised while reading or writing the player page.
#[derive(Debug, Error)]
pub enum PageError {
    /// The connection to the page failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A node handle no longer refers to a live element.
    #[error("Stale node: {0}")]
    StaleNode(NodeId),

    /// A script evaluated in the page threw or returned garbage.
    #[error("Script error: {0}")]
    Script(String),

    /// The page was closed or detached.
    #[error("Page closed")]
    Closed,
}

impl PageError {
    /// Whether the failure is expected to clear up on a later tick.
    ///
    /// Stale nodes and script failures happen routinely while the host page
    /// re-renders; a closed page or broken transport does not recover.
    pub fn is_transient(&self) -> bool {
        matches!(self, PageError::StaleNode(_) | PageError::Script(_))
    }
}

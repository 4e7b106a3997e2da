//! Engine error taxonomy.
//!
//! None of these are fatal. Every tick that fails is abandoned and the next
//! notice or poll tick starts from scratch.

use skipramp_protocols::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Container or media element absent. Expected while the page renders.
    #[error("Playback target not found")]
    TargetNotFound,

    /// No visible, actionable skip control. Expected most of the time.
    #[error("No visible skip control")]
    ControlNotFound,

    #[error("Page error: {0}")]
    Page(#[from] PageError),
}

impl EngineError {
    /// Whether this is the normal "nothing to do yet" outcome of a tick.
    pub fn is_expected(&self) -> bool {
        match self {
            EngineError::TargetNotFound | EngineError::ControlNotFound => true,
            EngineError::Page(e) => e.is_transient(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skipramp_protocols::NodeId;

    #[test]
    fn test_expected_errors() {
        assert!(EngineError::TargetNotFound.is_expected());
        assert!(EngineError::ControlNotFound.is_expected());
        assert!(EngineError::from(PageError::StaleNode(NodeId(3))).is_expected());
        assert!(!EngineError::from(PageError::Closed).is_expected());
    }

    #[test]
    fn test_page_error_display() {
        let err = EngineError::from(PageError::Transport("reset by peer".to_string()));
        assert!(err.to_string().contains("reset by peer"));
    }
}

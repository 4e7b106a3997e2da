//! CDP error types.

use skipramp_protocols::PageError;
use thiserror::Error;

/// Error code Chrome uses for most DOM and runtime failures.
pub const SERVER_ERROR: i64 = -32000;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JavaScript execution error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("Session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the error says a node id no longer refers to a live node.
    pub fn is_missing_node(&self) -> bool {
        match self {
            CdpError::Protocol { code, message } if *code == SERVER_ERROR => {
                message.contains("given id") || message.contains("does not belong to the document")
            }
            _ => false,
        }
    }

    /// Whether the error says the node exists but has no layout box.
    pub fn is_layout_missing(&self) -> bool {
        matches!(
            self,
            CdpError::Protocol { code, message }
                if *code == SERVER_ERROR && message.contains("box model")
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for PageError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::SessionClosed => PageError::Closed,
            CdpError::Protocol { message, .. } => PageError::Script(message),
            CdpError::JavaScript(message) => PageError::Script(message),
            CdpError::InvalidResponse(message) => PageError::Script(message),
            other => PageError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(message: &str) -> CdpError {
        CdpError::Protocol {
            code: SERVER_ERROR,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_missing_node_detection() {
        assert!(protocol("Could not find node with given id").is_missing_node());
        assert!(protocol("No node with given id found").is_missing_node());
        assert!(!protocol("Could not compute box model.").is_missing_node());
        assert!(!CdpError::SessionClosed.is_missing_node());
    }

    #[test]
    fn test_layout_missing_detection() {
        assert!(protocol("Could not compute box model.").is_layout_missing());
        assert!(!protocol("No node with given id found").is_layout_missing());
        let other_code = CdpError::Protocol {
            code: -32602,
            message: "box model".to_string(),
        };
        assert!(!other_code.is_layout_missing());
    }

    #[test]
    fn test_into_page_error() {
        assert!(matches!(
            PageError::from(CdpError::SessionClosed),
            PageError::Closed
        ));
        assert!(matches!(
            PageError::from(CdpError::JavaScript("boom".to_string())),
            PageError::Script(_)
        ));
        assert!(matches!(
            PageError::from(CdpError::Timeout("DOM.getBoxModel".to_string())),
            PageError::Transport(_)
        ));
    }
}

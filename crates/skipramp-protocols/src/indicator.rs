//! On-screen feedback protocol.

use async_trait::async_trait;

use crate::error::PageError;
use crate::geometry::Point;

/// Visual feedback drawn over the player.
///
/// Purely cosmetic: failures are logged by callers and never change what the
/// engine does next.
#[async_trait]
pub trait SpeedIndicator: Send + Sync {
    /// Show the current playback rate for a short while.
    ///
    /// Rapid successive calls coalesce: the latest rate wins and the hide
    /// timer restarts.
    async fn show_rate(&self, rate: f64) -> Result<(), PageError>;

    /// Draw a transient cursor marker where a synthesized click lands.
    async fn show_cursor(&self, at: Point) -> Result<(), PageError>;
}

/// Text shown by indicators for a given rate.
pub fn rate_label(rate: f64) -> String {
    format!("Speed: {}x", rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_label() {
        assert_eq!(rate_label(1.25), "Speed: 1.25x");
        assert_eq!(rate_label(2.0), "Speed: 2x");
        assert_eq!(rate_label(0.5), "Speed: 0.5x");
    }
}

//! On-page overlay for rate changes and synthesized clicks.

use std::sync::Arc;

use async_trait::async_trait;
use skipramp_protocols::{PageError, Point, SpeedIndicator};

use crate::cdp::PageSession;
use crate::scripts;

/// Draws the speed label and the cursor cue into the tab's document.
///
/// Coalescing happens page-side: each call restarts the element's hide timer.
pub struct OverlayIndicator {
    session: Arc<PageSession>,
}

impl OverlayIndicator {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl SpeedIndicator for OverlayIndicator {
    async fn show_rate(&self, rate: f64) -> Result<(), PageError> {
        self.session.evaluate(&scripts::show_rate(rate)).await?;
        Ok(())
    }

    async fn show_cursor(&self, at: Point) -> Result<(), PageError> {
        self.session.evaluate(&scripts::show_cursor(at)).await?;
        Ok(())
    }
}

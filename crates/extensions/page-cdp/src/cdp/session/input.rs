//! Mouse input for CDP page session.

use serde_json::json;
use skipramp_protocols::Point;
use tracing::trace;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{MouseButton, MouseEventType};

use super::core::PageSession;

impl PageSession {
    /// Dispatch one trusted mouse event at viewport coordinates.
    pub async fn mouse_event(&self, event_type: MouseEventType, at: Point) -> Result<(), CdpError> {
        let (button, click_count) = match event_type {
            MouseEventType::MouseMoved => (MouseButton::None, 0),
            MouseEventType::MousePressed | MouseEventType::MouseReleased => (MouseButton::Left, 1),
        };

        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": event_type,
                "x": at.x,
                "y": at.y,
                "button": button,
                "clickCount": click_count,
            })),
        )
        .await?;

        trace!("Mouse {:?} at ({}, {})", event_type, at.x, at.y);
        Ok(())
    }
}

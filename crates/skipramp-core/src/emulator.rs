//! Human-like interaction emulation on a skip control.

use skipramp_protocols::{
    InteractionPlan, NodeId, PageError, PlayerPage, Point, PointerEventKind, Rect, SkipMethod,
    SpeedIndicator,
};
use tracing::{debug, warn};

/// Events that move the pointer onto the control.
pub const HOVER_SEQUENCE: [PointerEventKind; 6] = [
    PointerEventKind::PointerOver,
    PointerEventKind::PointerEnter,
    PointerEventKind::MouseOver,
    PointerEventKind::MouseEnter,
    PointerEventKind::PointerMove,
    PointerEventKind::MouseMove,
];

/// Events that press and activate the control.
pub const PRESS_SEQUENCE: [PointerEventKind; 3] = [
    PointerEventKind::PointerDown,
    PointerEventKind::PointerUp,
    PointerEventKind::Click,
];

/// Result of one invocation.
///
/// `Dismissed` only means the events were delivered. Whether the host
/// actually dismissed the ad shows up as the next state change, if at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionOutcome {
    Dismissed { at: Point },
    NoOp,
}

/// Emits the hover and press sequence at a control's center.
#[derive(Debug, Clone)]
pub struct InteractionEmulator {
    method: SkipMethod,
    cursor_cue: bool,
}

impl Default for InteractionEmulator {
    fn default() -> Self {
        Self::new(SkipMethod::default())
    }
}

impl InteractionEmulator {
    pub fn new(method: SkipMethod) -> Self {
        Self {
            method,
            cursor_cue: true,
        }
    }

    pub fn with_cursor_cue(mut self, enabled: bool) -> Self {
        self.cursor_cue = enabled;
        self
    }

    /// The full event sequence for a control occupying `rect`.
    pub fn plan_for(rect: Rect) -> InteractionPlan {
        let at = rect.center();
        HOVER_SEQUENCE
            .iter()
            .chain(PRESS_SEQUENCE.iter())
            .fold(InteractionPlan::new(), |plan, kind| plan.push(*kind, at))
    }

    /// Deliver the plan to `control`.
    ///
    /// Coordinates come from the control's box at call time. A control that
    /// lost its box since it was found yields `NoOp` and nothing is sent.
    pub async fn invoke<P, I>(
        &self,
        page: &P,
        indicator: &I,
        control: NodeId,
    ) -> Result<InteractionOutcome, PageError>
    where
        P: PlayerPage + ?Sized,
        I: SpeedIndicator + ?Sized,
    {
        let Some(rect) = page.bounding_box(control).await? else {
            debug!(%control, "Skip control has no box, not invoking");
            return Ok(InteractionOutcome::NoOp);
        };
        let plan = Self::plan_for(rect);
        let at = rect.center();

        if self.cursor_cue {
            if let Err(e) = indicator.show_cursor(at).await {
                warn!("Failed to show cursor cue: {}", e);
            }
        }

        page.dispatch_interaction(control, &plan, self.method).await?;
        debug!(%control, x = at.x, y = at.y, method = %self.method, "Skip interaction dispatched");

        Ok(InteractionOutcome::Dismissed { at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeElement, FakePage, RecordingIndicator};
    use skipramp_protocols::InteractionPhase;

    #[test]
    fn test_plan_order_and_coordinates() {
        let plan = InteractionEmulator::plan_for(Rect::new(100.0, 50.0, 40.0, 20.0));
        assert_eq!(plan.len(), 9);

        let phases: Vec<_> = plan.steps().iter().map(|s| s.kind.phase()).collect();
        let first_press = phases
            .iter()
            .position(|p| *p != InteractionPhase::Hover)
            .unwrap();
        assert_eq!(first_press, 6);
        assert!(phases[..6].iter().all(|p| *p == InteractionPhase::Hover));
        assert_eq!(
            &phases[6..],
            &[
                InteractionPhase::Press,
                InteractionPhase::Release,
                InteractionPhase::Activate
            ]
        );

        assert!(plan.steps().iter().all(|s| s.at == Point::new(120.0, 60.0)));
    }

    #[tokio::test]
    async fn test_invoke_dispatches_plan() {
        let page = FakePage::new("www.youtube.com");
        let indicator = RecordingIndicator::new();
        let control = page.insert(
            FakeElement::new("button").visible(Rect::new(0.0, 0.0, 100.0, 40.0)),
        );

        let outcome = InteractionEmulator::new(SkipMethod::Input)
            .invoke(page.as_ref(), indicator.as_ref(), control)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            InteractionOutcome::Dismissed {
                at: Point::new(50.0, 20.0)
            }
        );
        let dispatched = page.dispatched();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].control, control);
        assert_eq!(dispatched[0].method, SkipMethod::Input);
        assert_eq!(dispatched[0].plan.len(), 9);
        assert_eq!(indicator.cursors(), vec![Point::new(50.0, 20.0)]);
    }

    #[tokio::test]
    async fn test_invoke_without_box_is_noop() {
        let page = FakePage::new("www.youtube.com");
        let indicator = RecordingIndicator::new();
        let control = page.insert(FakeElement::new("button"));

        let outcome = InteractionEmulator::default()
            .invoke(page.as_ref(), indicator.as_ref(), control)
            .await
            .unwrap();

        assert_eq!(outcome, InteractionOutcome::NoOp);
        assert!(page.dispatched().is_empty());
        assert!(indicator.cursors().is_empty());
    }

    #[tokio::test]
    async fn test_cursor_cue_disabled() {
        let page = FakePage::new("www.youtube.com");
        let indicator = RecordingIndicator::new();
        let control = page.insert(
            FakeElement::new("button").visible(Rect::new(0.0, 0.0, 10.0, 10.0)),
        );

        InteractionEmulator::default()
            .with_cursor_cue(false)
            .invoke(page.as_ref(), indicator.as_ref(), control)
            .await
            .unwrap();

        assert_eq!(page.dispatched().len(), 1);
        assert!(indicator.cursors().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_removed_control() {
        let page = FakePage::new("www.youtube.com");
        let indicator = RecordingIndicator::new();
        let control = page.insert(FakeElement::new("button"));
        page.remove(control);

        let result = InteractionEmulator::default()
            .invoke(page.as_ref(), indicator.as_ref(), control)
            .await;
        assert!(matches!(result, Err(PageError::StaleNode(_))));
    }
}

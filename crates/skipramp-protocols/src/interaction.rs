//! Synthesized pointer interaction types.
//!
//! An [`InteractionPlan`] is an ordered list of (event kind, coordinates)
//! pairs. Backends deliver the whole plan from a single call and must keep
//! its order.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// What a synthesized event does from the host page's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionPhase {
    Hover,
    Press,
    Release,
    Activate,
}

/// A single DOM event kind in an interaction plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    PointerOver,
    PointerEnter,
    MouseOver,
    MouseEnter,
    PointerMove,
    MouseMove,
    PointerDown,
    PointerUp,
    Click,
}

impl PointerEventKind {
    /// DOM event type name.
    pub fn dom_type(&self) -> &'static str {
        match self {
            PointerEventKind::PointerOver => "pointerover",
            PointerEventKind::PointerEnter => "pointerenter",
            PointerEventKind::MouseOver => "mouseover",
            PointerEventKind::MouseEnter => "mouseenter",
            PointerEventKind::PointerMove => "pointermove",
            PointerEventKind::MouseMove => "mousemove",
            PointerEventKind::PointerDown => "pointerdown",
            PointerEventKind::PointerUp => "pointerup",
            PointerEventKind::Click => "click",
        }
    }

    /// Whether the event is constructed as a `PointerEvent` (else `MouseEvent`).
    pub fn is_pointer_event(&self) -> bool {
        matches!(
            self,
            PointerEventKind::PointerOver
                | PointerEventKind::PointerEnter
                | PointerEventKind::PointerMove
                | PointerEventKind::PointerDown
                | PointerEventKind::PointerUp
        )
    }

    pub fn phase(&self) -> InteractionPhase {
        match self {
            PointerEventKind::PointerDown => InteractionPhase::Press,
            PointerEventKind::PointerUp => InteractionPhase::Release,
            PointerEventKind::Click => InteractionPhase::Activate,
            _ => InteractionPhase::Hover,
        }
    }
}

/// One event of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionStep {
    pub kind: PointerEventKind,
    pub at: Point,
}

/// Ordered list of events to dispatch against one control.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InteractionPlan {
    steps: Vec<InteractionStep>,
}

impl InteractionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event at the given coordinates.
    pub fn push(mut self, kind: PointerEventKind, at: Point) -> Self {
        self.steps.push(InteractionStep { kind, at });
        self
    }

    pub fn steps(&self) -> &[InteractionStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// How an interaction plan reaches the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipMethod {
    /// Untrusted DOM events constructed and dispatched inside the page.
    #[default]
    Pointer,
    /// Trusted input events routed through the browser's input pipeline.
    Input,
}

impl SkipMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipMethod::Pointer => "pointer",
            SkipMethod::Input => "input",
        }
    }
}

impl std::fmt::Display for SkipMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkipMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pointer" => Ok(SkipMethod::Pointer),
            "input" => Ok(SkipMethod::Input),
            other => Err(format!("unknown skip method '{}'", other)),
        }
    }
}

#[cfg(test)]
#[path = "interaction_tests.rs"]
mod tests;

//! # SkipRamp Protocols
//!
//! Core protocol definitions (traits) for the SkipRamp engine.
//! Contains only interface definitions and the value types that cross them.
//!
//! ## Core Traits
//!
//! - [`PlayerPage`] - The document a controller reads and writes
//! - [`SpeedIndicator`] - On-screen feedback for rate changes and synthesized clicks

pub mod error;
pub mod geometry;
pub mod indicator;
pub mod interaction;
pub mod page;

pub use error::PageError;
pub use geometry::{Point, Rect};
pub use indicator::{rate_label, SpeedIndicator};
pub use interaction::{
    InteractionPhase, InteractionPlan, InteractionStep, PointerEventKind, SkipMethod,
};
pub use page::{MutationNotice, MutationScope, MutationStream, NodeId, PlayerPage};

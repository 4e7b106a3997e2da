//! Player page protocol definitions.
//!
//! A [`PlayerPage`] is the document hosting the video player. Controllers
//! never cache what they read through it: every node handle may go stale
//! between two calls because the host page owns the document.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::PageError;
use crate::geometry::Rect;
use crate::interaction::{InteractionPlan, SkipMethod};

/// Opaque handle to an element in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Part of the document a mutation subscription covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationScope {
    /// Child list, subtree and attribute changes anywhere in the document.
    Document,
    /// Class attribute changes on one element.
    Element(NodeId),
}

/// A structural or attribute change was observed.
///
/// Carries no state: receivers recompute whatever they derive from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationNotice {
    /// Node the change was reported on, when the backend knows it.
    pub node: Option<NodeId>,
}

/// Receiving end of a mutation subscription. Dropping it unsubscribes.
pub type MutationStream = mpsc::UnboundedReceiver<MutationNotice>;

/// Core trait for the page a controller drives.
#[async_trait]
pub trait PlayerPage: Send + Sync {
    /// Hostname of the page's current URL.
    fn hostname(&self) -> &str;

    /// All elements matching a CSS selector, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError>;

    /// Rendered box of a node, or `None` when it is not laid out.
    /// A laid-out box of zero size is still `Some`.
    async fn bounding_box(&self, node: NodeId) -> Result<Option<Rect>, PageError>;

    /// The node itself or its nearest ancestor matching `selector`.
    async fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, PageError>;

    /// Current class list of a node.
    async fn class_list(&self, node: NodeId) -> Result<Vec<String>, PageError>;

    /// Current playback rate of a media element.
    async fn playback_rate(&self, media: NodeId) -> Result<f64, PageError>;

    /// Set the playback rate, returning the rate the element reports afterwards.
    async fn set_playback_rate(&self, media: NodeId, rate: f64) -> Result<f64, PageError>;

    /// Deliver an interaction plan against a control, in order, from one call.
    async fn dispatch_interaction(
        &self,
        control: NodeId,
        plan: &InteractionPlan,
        method: SkipMethod,
    ) -> Result<(), PageError>;

    /// Subscribe to change notifications for a part of the document.
    async fn watch_mutations(&self, scope: MutationScope) -> Result<MutationStream, PageError>;

    /// Whether keyboard focus is currently in a text-entry field.
    async fn focus_is_text_entry(&self) -> Result<bool, PageError>;
}

//! [`PlayerPage`] over a CDP page session.
//!
//! Node ids are CDP DOM node ids. They survive until the document is
//! replaced, which the router learns from `DOM.documentUpdated`. Mutation
//! watches are page-side `MutationObserver`s reporting through a runtime
//! binding; the router fans binding calls out to subscriber channels.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use skipramp_protocols::{
    InteractionPhase, InteractionPlan, MutationNotice, MutationScope, MutationStream, NodeId,
    PageError, PlayerPage, Point, Rect, SkipMethod,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::cdp::{BoxModel, CdpError, CdpResponse, MouseEventType, PageSession};
use crate::events::{classify, PageEvent};
use crate::scripts::{
    self, CLOSEST_FN, COALESCE_MS, DISPATCH_FN, GET_RATE_FN, KEY_BINDING, MUTATION_BINDING,
    OBSERVE_FN, SET_RATE_FN, TEXT_ENTRY_FOCUSED,
};

/// Object group for remote objects created by page operations.
const OBJECT_GROUP: &str = "skipramp";

struct Watcher {
    scope: MutationScope,
    tx: mpsc::UnboundedSender<MutationNotice>,
}

impl Watcher {
    fn notice(&self) -> MutationNotice {
        match self.scope {
            MutationScope::Document => MutationNotice { node: None },
            MutationScope::Element(node) => MutationNotice { node: Some(node) },
        }
    }
}

struct PageState {
    session: Arc<PageSession>,
    hostname: String,
    root: Mutex<Option<i64>>,
    watchers: Mutex<HashMap<u64, Watcher>>,
    next_watch: AtomicU64,
}

/// A browser tab hosting a video player.
pub struct CdpPlayerPage {
    state: Arc<PageState>,
    keys: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    router: JoinHandle<()>,
}

impl CdpPlayerPage {
    /// Wrap an attached session. Takes over the session's event stream.
    pub async fn attach(session: Arc<PageSession>, hostname: String) -> Result<Self, CdpError> {
        let events = session
            .take_events()
            .ok_or_else(|| CdpError::InvalidResponse("Session events already taken".to_string()))?;

        session.add_binding(MUTATION_BINDING).await?;
        session.add_binding(KEY_BINDING).await?;

        let state = Arc::new(PageState {
            session,
            hostname,
            root: Mutex::new(None),
            watchers: Mutex::new(HashMap::new()),
            next_watch: AtomicU64::new(1),
        });

        let (key_tx, key_rx) = mpsc::unbounded_channel();
        let router = tokio::spawn(route(state.clone(), events, key_tx));

        debug!(host = %state.hostname, target = %state.session.target_id(), "Player page attached");

        Ok(Self {
            state,
            keys: Mutex::new(Some(key_rx)),
            router,
        })
    }

    /// Forward presses of `keys` from this tab and every later document in it.
    pub async fn install_key_bridge(&self, keys: &[String]) -> Result<(), CdpError> {
        let script = scripts::key_bridge(keys);
        self.state.session.add_script_on_new_document(&script).await?;
        self.state.session.evaluate(&script).await?;
        Ok(())
    }

    /// Stream of lowercased key names. Only the first caller gets it.
    pub fn take_key_events(&self) -> Option<mpsc::UnboundedReceiver<String>> {
        self.keys.lock().take()
    }

    pub fn session(&self) -> Arc<PageSession> {
        self.state.session.clone()
    }

    /// Whether the router is still receiving events for this tab.
    pub fn is_attached(&self) -> bool {
        !self.router.is_finished() && self.state.session.is_connected()
    }
}

impl Drop for CdpPlayerPage {
    fn drop(&mut self) {
        self.router.abort();
    }
}

fn node_error(node: NodeId, e: CdpError) -> PageError {
    if e.is_missing_node() {
        PageError::StaleNode(node)
    } else {
        e.into()
    }
}

impl PageState {
    async fn root(&self) -> Result<i64, CdpError> {
        let cached = *self.root.lock();
        if let Some(root) = cached {
            return Ok(root);
        }
        let root = self.session.document_root().await?;
        *self.root.lock() = Some(root);
        Ok(root)
    }

    fn forget_root(&self) {
        *self.root.lock() = None;
    }

    async fn object_for(&self, node: NodeId) -> Result<String, PageError> {
        let object = self
            .session
            .resolve_node(node.0, OBJECT_GROUP)
            .await
            .map_err(|e| node_error(node, e))?;
        object
            .object_id
            .ok_or_else(|| PageError::Script(format!("{} has no runtime object", node)))
    }

    async fn release(&self) {
        if let Err(e) = self.session.release_object_group(OBJECT_GROUP).await {
            trace!("Failed to release object group: {}", e);
        }
    }

    /// Call a function on a node and return its by-value result.
    async fn call_on(&self, node: NodeId, function: &str, args: Vec<Value>) -> Result<Value, PageError> {
        let object_id = self.object_for(node).await?;
        let result = self
            .session
            .call_function_on(&object_id, function, Some(args))
            .await;
        self.release().await;
        result.map_err(|e| node_error(node, e))
    }

    async fn closest_of(&self, object_id: &str, selector: &str) -> Result<Option<i64>, CdpError> {
        let found = self
            .session
            .call_function_on_handle(object_id, CLOSEST_FN, Some(vec![json!(selector)]), OBJECT_GROUP)
            .await?;
        match (found.subtype.as_deref(), found.object_id) {
            (Some("null"), _) | (_, None) => Ok(None),
            (_, Some(found_id)) => self.session.request_node(&found_id).await.map(Some),
        }
    }

    async fn install(&self, id: u64, scope: MutationScope) -> Result<(), PageError> {
        let (node, document_wide) = match scope {
            MutationScope::Document => (NodeId(self.root().await?), true),
            MutationScope::Element(node) => (node, false),
        };
        self.call_on(node, OBSERVE_FN, vec![json!(id), json!(COALESCE_MS), json!(document_wide)])
            .await?;
        Ok(())
    }

    async fn uninstall(&self, id: u64) {
        if let Err(e) = self.session.evaluate(&scripts::unobserve(id)).await {
            trace!(watch = id, "Failed to remove observer: {}", e);
        }
    }

    async fn notify(&self, id: u64) {
        let closed = {
            let watchers = self.watchers.lock();
            match watchers.get(&id) {
                Some(watcher) => watcher.tx.send(watcher.notice()).is_err(),
                None => false,
            }
        };
        if closed {
            self.watchers.lock().remove(&id);
            self.uninstall(id).await;
            trace!(watch = id, "Subscriber gone, observer removed");
        }
    }

    /// Re-arm document watches on the new document and end element watches.
    async fn on_document_updated(&self) {
        self.forget_root();
        let document_watches: Vec<u64> = {
            let mut watchers = self.watchers.lock();
            watchers.retain(|_, w| w.scope == MutationScope::Document);
            watchers.keys().copied().collect()
        };
        debug!(
            host = %self.hostname,
            rearmed = document_watches.len(),
            "Document replaced"
        );
        for id in document_watches {
            match self.install(id, MutationScope::Document).await {
                Ok(()) => self.notify(id).await,
                Err(e) => {
                    warn!(watch = id, "Failed to re-arm document observer: {}", e);
                    self.watchers.lock().remove(&id);
                }
            }
        }
    }
}

async fn route(
    state: Arc<PageState>,
    mut events: mpsc::UnboundedReceiver<CdpResponse>,
    keys: mpsc::UnboundedSender<String>,
) {
    while let Some(event) = events.recv().await {
        match classify(&event) {
            Some(PageEvent::Mutation(id)) => state.notify(id).await,
            Some(PageEvent::Key(key)) => {
                if keys.send(key).is_err() {
                    trace!("Key event dropped, nobody listening");
                }
            }
            Some(PageEvent::DocumentUpdated) => state.on_document_updated().await,
            Some(PageEvent::Detached) => {
                debug!(host = %state.hostname, "Page detached");
                break;
            }
            None => {}
        }
    }
    state.watchers.lock().clear();
}

/// Values of the `class` attribute in a flat CDP attribute list.
fn parse_class_attribute(attributes: &[String]) -> Vec<String> {
    attributes
        .chunks(2)
        .find(|pair| pair[0] == "class")
        .and_then(|pair| pair.get(1))
        .map(|value| value.split_whitespace().map(|c| c.to_string()).collect())
        .unwrap_or_default()
}

/// Border box of a laid-out node. Zero-size boxes still count as rendered;
/// only nodes without layout (`display: none`, detached) have no box.
fn rendered_rect(model: Option<BoxModel>) -> Option<Rect> {
    model.and_then(|m| m.border_rect())
}

/// Steps in the shape [`DISPATCH_FN`] expects.
fn plan_payload(plan: &InteractionPlan) -> Value {
    Value::Array(
        plan.steps()
            .iter()
            .map(|step| {
                json!({
                    "type": step.kind.dom_type(),
                    "pointer": step.kind.is_pointer_event(),
                    "x": step.at.x,
                    "y": step.at.y,
                })
            })
            .collect(),
    )
}

/// Trusted input events for a plan.
///
/// The browser derives enter/over/move events from one pointer move, and a
/// click from press plus release, so hover runs collapse to one move and
/// activation steps produce nothing.
fn input_events(plan: &InteractionPlan) -> Vec<(MouseEventType, Point)> {
    let mut events: Vec<(MouseEventType, Point)> = Vec::new();
    for step in plan.steps() {
        let event_type = match step.kind.phase() {
            InteractionPhase::Hover => MouseEventType::MouseMoved,
            InteractionPhase::Press => MouseEventType::MousePressed,
            InteractionPhase::Release => MouseEventType::MouseReleased,
            InteractionPhase::Activate => continue,
        };
        if event_type == MouseEventType::MouseMoved
            && events.last() == Some(&(MouseEventType::MouseMoved, step.at))
        {
            continue;
        }
        events.push((event_type, step.at));
    }
    events
}

#[async_trait]
impl PlayerPage for CdpPlayerPage {
    fn hostname(&self) -> &str {
        &self.state.hostname
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError> {
        let root = self.state.root().await?;
        let ids = match self.state.session.query_selector_all(root, selector).await {
            Ok(ids) => ids,
            Err(e) if e.is_missing_node() => {
                self.state.forget_root();
                let root = self.state.root().await?;
                self.state.session.query_selector_all(root, selector).await?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(ids.into_iter().map(NodeId).collect())
    }

    async fn bounding_box(&self, node: NodeId) -> Result<Option<Rect>, PageError> {
        let model = self
            .state
            .session
            .get_box_model(node.0)
            .await
            .map_err(|e| node_error(node, e))?;
        Ok(rendered_rect(model))
    }

    async fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, PageError> {
        let object_id = self.state.object_for(node).await?;
        let result = self.state.closest_of(&object_id, selector).await;
        self.state.release().await;
        result
            .map(|id| id.map(NodeId))
            .map_err(|e| node_error(node, e))
    }

    async fn class_list(&self, node: NodeId) -> Result<Vec<String>, PageError> {
        let attributes = self
            .state
            .session
            .get_attributes(node.0)
            .await
            .map_err(|e| node_error(node, e))?;
        Ok(parse_class_attribute(&attributes))
    }

    async fn playback_rate(&self, media: NodeId) -> Result<f64, PageError> {
        let value = self.state.call_on(media, GET_RATE_FN, Vec::new()).await?;
        value
            .as_f64()
            .ok_or_else(|| PageError::Script(format!("playbackRate is not a number: {}", value)))
    }

    async fn set_playback_rate(&self, media: NodeId, rate: f64) -> Result<f64, PageError> {
        let value = self.state.call_on(media, SET_RATE_FN, vec![json!(rate)]).await?;
        value
            .as_f64()
            .ok_or_else(|| PageError::Script(format!("playbackRate is not a number: {}", value)))
    }

    async fn dispatch_interaction(
        &self,
        control: NodeId,
        plan: &InteractionPlan,
        method: SkipMethod,
    ) -> Result<(), PageError> {
        match method {
            SkipMethod::Pointer => {
                self.state
                    .call_on(control, DISPATCH_FN, vec![plan_payload(plan)])
                    .await?;
            }
            SkipMethod::Input => {
                for (event_type, at) in input_events(plan) {
                    self.state.session.mouse_event(event_type, at).await?;
                }
            }
        }
        trace!(%control, method = method.as_str(), steps = plan.len(), "Interaction dispatched");
        Ok(())
    }

    async fn watch_mutations(&self, scope: MutationScope) -> Result<MutationStream, PageError> {
        let id = self.state.next_watch.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.watchers.lock().insert(id, Watcher { scope, tx });

        if let Err(e) = self.state.install(id, scope).await {
            self.state.watchers.lock().remove(&id);
            return Err(e);
        }
        debug!(watch = id, ?scope, "Mutation observer installed");
        Ok(rx)
    }

    async fn focus_is_text_entry(&self) -> Result<bool, PageError> {
        let value = self.state.session.evaluate(TEXT_ENTRY_FOCUSED).await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;

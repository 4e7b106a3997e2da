//! In-memory page and indicator doubles for engine tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use skipramp_protocols::{
    InteractionPlan, MutationNotice, MutationScope, MutationStream, NodeId, PageError, PlayerPage,
    Point, Rect, SkipMethod, SpeedIndicator,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub id: String,
    pub classes: Vec<String>,
    pub aria_label: Option<String>,
    pub parent: Option<NodeId>,
    pub rect: Option<Rect>,
    pub playback_rate: f64,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            playback_rate: 1.0,
            ..Default::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn aria_label(mut self, label: &str) -> Self {
        self.aria_label = Some(label.to_string());
        self
    }

    pub fn child_of(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn visible(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "class" => Some(self.classes.join(" ")),
            "aria-label" => self.aria_label.clone(),
            _ => None,
        }
    }
}

/// A dispatched interaction, as the page received it.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub control: NodeId,
    pub plan: InteractionPlan,
    pub method: SkipMethod,
}

#[derive(Default)]
struct FakeState {
    nodes: BTreeMap<NodeId, FakeElement>,
    next_id: i64,
    queries: Vec<String>,
    rate_writes: Vec<(Instant, f64)>,
    dispatched: Vec<Dispatch>,
    watchers: Vec<(MutationScope, mpsc::UnboundedSender<MutationNotice>)>,
    watch_calls: usize,
    text_focus: bool,
    rate_read_failures: usize,
}

pub struct FakePage {
    hostname: String,
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new(hostname: &str) -> Arc<Self> {
        Arc::new(Self {
            hostname: hostname.to_string(),
            state: Mutex::new(FakeState {
                next_id: 1,
                ..Default::default()
            }),
        })
    }

    /// Add an element without notifying watchers.
    pub fn insert(&self, element: FakeElement) -> NodeId {
        let mut state = self.state.lock();
        let id = NodeId(state.next_id);
        state.next_id += 1;
        state.nodes.insert(id, element);
        id
    }

    /// Add an element and notify watchers covering it.
    pub fn append(&self, element: FakeElement) -> NodeId {
        let id = self.insert(element);
        self.notify(id);
        id
    }

    pub fn remove(&self, node: NodeId) {
        let parent = {
            let mut state = self.state.lock();
            state.nodes.remove(&node).and_then(|e| e.parent)
        };
        if let Some(parent) = parent {
            self.notify(parent);
        }
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.state.lock().nodes.get_mut(&node) {
            element.classes.push(class.to_string());
        }
        self.notify(node);
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.state.lock().nodes.get_mut(&node) {
            element.classes.retain(|c| c != class);
        }
        self.notify(node);
    }

    /// Change a class without emitting a notice, as if the change were missed.
    pub fn add_class_silently(&self, node: NodeId, class: &str) {
        if let Some(element) = self.state.lock().nodes.get_mut(&node) {
            element.classes.push(class.to_string());
        }
    }

    pub fn set_rect(&self, node: NodeId, rect: Option<Rect>) {
        if let Some(element) = self.state.lock().nodes.get_mut(&node) {
            element.rect = rect;
        }
    }

    pub fn set_rate(&self, node: NodeId, rate: f64) {
        if let Some(element) = self.state.lock().nodes.get_mut(&node) {
            element.playback_rate = rate;
        }
    }

    pub fn rate(&self, node: NodeId) -> f64 {
        self.state
            .lock()
            .nodes
            .get(&node)
            .map(|e| e.playback_rate)
            .unwrap_or(f64::NAN)
    }

    pub fn set_text_focus(&self, focused: bool) {
        self.state.lock().text_focus = focused;
    }

    pub fn fail_next_rate_reads(&self, count: usize) {
        self.state.lock().rate_read_failures = count;
    }

    pub fn rate_writes(&self) -> Vec<(Instant, f64)> {
        self.state.lock().rate_writes.clone()
    }

    pub fn written_rates(&self) -> Vec<f64> {
        self.state.lock().rate_writes.iter().map(|(_, r)| *r).collect()
    }

    pub fn dispatched(&self) -> Vec<Dispatch> {
        self.state.lock().dispatched.clone()
    }

    pub fn watch_calls(&self) -> usize {
        self.state.lock().watch_calls
    }

    pub fn query_count(&self, selector: &str) -> usize {
        self.state
            .lock()
            .queries
            .iter()
            .filter(|q| q.as_str() == selector)
            .count()
    }

    fn notify(&self, node: NodeId) {
        let mut state = self.state.lock();
        let mut covered = Vec::new();
        for (i, (scope, _)) in state.watchers.iter().enumerate() {
            let hit = match scope {
                MutationScope::Document => true,
                MutationScope::Element(target) => *target == node,
            };
            if hit {
                covered.push(i);
            }
        }
        let mut closed = Vec::new();
        for i in covered {
            if state.watchers[i]
                .1
                .send(MutationNotice { node: Some(node) })
                .is_err()
            {
                closed.push(i);
            }
        }
        for i in closed.into_iter().rev() {
            state.watchers.remove(i);
        }
    }
}

/// Supports `.class`, `[attr*="value" i]` and bare tag selectors.
fn matches_selector(element: &FakeElement, selector: &str) -> bool {
    if let Some(class) = selector.strip_prefix('.') {
        return element.classes.iter().any(|c| c == class);
    }
    if let Some(inner) = selector.strip_prefix('[') {
        let Some((name, rest)) = inner.split_once("*=") else {
            return false;
        };
        let needle = rest.split('"').nth(1).unwrap_or_default().to_lowercase();
        return element
            .attribute(name)
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false);
    }
    element.tag.eq_ignore_ascii_case(selector)
}

#[async_trait]
impl PlayerPage for FakePage {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError> {
        let mut state = self.state.lock();
        state.queries.push(selector.to_string());
        Ok(state
            .nodes
            .iter()
            .filter(|(_, e)| matches_selector(e, selector))
            .map(|(id, _)| *id)
            .collect())
    }

    async fn bounding_box(&self, node: NodeId) -> Result<Option<Rect>, PageError> {
        let state = self.state.lock();
        let element = state.nodes.get(&node).ok_or(PageError::StaleNode(node))?;
        Ok(element.rect)
    }

    async fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, PageError> {
        let state = self.state.lock();
        if !state.nodes.contains_key(&node) {
            return Err(PageError::StaleNode(node));
        }
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(element) = state.nodes.get(&id) else {
                break;
            };
            if matches_selector(element, selector) {
                return Ok(Some(id));
            }
            current = element.parent;
        }
        Ok(None)
    }

    async fn class_list(&self, node: NodeId) -> Result<Vec<String>, PageError> {
        let state = self.state.lock();
        let element = state.nodes.get(&node).ok_or(PageError::StaleNode(node))?;
        Ok(element.classes.clone())
    }

    async fn playback_rate(&self, media: NodeId) -> Result<f64, PageError> {
        let mut state = self.state.lock();
        if state.rate_read_failures > 0 {
            state.rate_read_failures -= 1;
            return Err(PageError::Script("media not ready".to_string()));
        }
        let element = state.nodes.get(&media).ok_or(PageError::StaleNode(media))?;
        Ok(element.playback_rate)
    }

    async fn set_playback_rate(&self, media: NodeId, rate: f64) -> Result<f64, PageError> {
        let mut state = self.state.lock();
        let element = state
            .nodes
            .get_mut(&media)
            .ok_or(PageError::StaleNode(media))?;
        element.playback_rate = rate;
        state.rate_writes.push((Instant::now(), rate));
        Ok(rate)
    }

    async fn dispatch_interaction(
        &self,
        control: NodeId,
        plan: &InteractionPlan,
        method: SkipMethod,
    ) -> Result<(), PageError> {
        let mut state = self.state.lock();
        if !state.nodes.contains_key(&control) {
            return Err(PageError::StaleNode(control));
        }
        state.dispatched.push(Dispatch {
            control,
            plan: plan.clone(),
            method,
        });
        Ok(())
    }

    async fn watch_mutations(&self, scope: MutationScope) -> Result<MutationStream, PageError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        state.watch_calls += 1;
        state.watchers.push((scope, tx));
        Ok(rx)
    }

    async fn focus_is_text_entry(&self) -> Result<bool, PageError> {
        Ok(self.state.lock().text_focus)
    }
}

/// Records every indicator call.
#[derive(Default)]
pub struct RecordingIndicator {
    rates: Mutex<Vec<f64>>,
    cursors: Mutex<Vec<Point>>,
}

impl RecordingIndicator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rates(&self) -> Vec<f64> {
        self.rates.lock().clone()
    }

    pub fn cursors(&self) -> Vec<Point> {
        self.cursors.lock().clone()
    }
}

#[async_trait]
impl SpeedIndicator for RecordingIndicator {
    async fn show_rate(&self, rate: f64) -> Result<(), PageError> {
        self.rates.lock().push(rate);
        Ok(())
    }

    async fn show_cursor(&self, at: Point) -> Result<(), PageError> {
        self.cursors.lock().push(at);
        Ok(())
    }
}

/// A player page with a container, its media element and nothing else.
pub struct PlayerFixture {
    pub page: Arc<FakePage>,
    pub container: NodeId,
    pub media: NodeId,
}

impl PlayerFixture {
    pub fn new(hostname: &str) -> Self {
        let page = FakePage::new(hostname);
        let container = page.insert(
            FakeElement::new("div")
                .class("html5-video-player")
                .visible(Rect::new(0.0, 0.0, 1280.0, 720.0)),
        );
        let media = page.insert(
            FakeElement::new("video")
                .child_of(container)
                .visible(Rect::new(0.0, 0.0, 1280.0, 720.0)),
        );
        Self {
            page,
            container,
            media,
        }
    }

    /// Append a visible skip button inside the player.
    pub fn add_skip_button(&self) -> NodeId {
        self.page.append(
            FakeElement::new("button")
                .class("ytp-skip-ad-button")
                .child_of(self.container)
                .visible(Rect::new(1100.0, 600.0, 100.0, 40.0)),
        )
    }
}

//! Skip control discovery.
//!
//! Strategies are tried in order and the first visible, actionable match
//! wins. Each strategy is plain data so new player markups only need a new
//! entry.

use std::collections::HashSet;

use skipramp_protocols::{NodeId, PageError, PlayerPage};
use tracing::trace;

/// Tag a matched element is promoted to when it is not itself a button.
pub const ACTIONABLE_SELECTOR: &str = "button";

/// One way of recognizing a skip control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipStrategy {
    pub name: String,
    pub selector: String,
}

impl SkipStrategy {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
        }
    }
}

/// Built-in strategies, most specific first.
pub fn default_strategies() -> Vec<SkipStrategy> {
    vec![
        SkipStrategy::new("skip-ad-button", ".ytp-skip-ad-button"),
        SkipStrategy::new("ad-skip-button", ".ytp-ad-skip-button"),
        SkipStrategy::new("id-contains-skip", r#"[id*="skip" i]"#),
        SkipStrategy::new("class-contains-skip", r#"[class*="skip" i]"#),
        SkipStrategy::new("label-contains-skip", r#"[aria-label*="skip" i]"#),
    ]
}

/// Locates the currently visible skip control.
#[derive(Debug, Clone)]
pub struct SkipControlFinder {
    strategies: Vec<SkipStrategy>,
}

impl Default for SkipControlFinder {
    fn default() -> Self {
        Self::new(default_strategies())
    }
}

impl SkipControlFinder {
    pub fn new(strategies: Vec<SkipStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[SkipStrategy] {
        &self.strategies
    }

    /// Search the whole document for a visible, actionable skip control.
    ///
    /// Candidates without a rendered box are ignored. A visible candidate
    /// resolves to itself when it is a button, otherwise to its nearest
    /// button ancestor; with neither it is ignored. Elements already
    /// evaluated by an earlier strategy are not evaluated again.
    pub async fn find<P>(&self, page: &P) -> Result<Option<NodeId>, PageError>
    where
        P: PlayerPage + ?Sized,
    {
        let mut seen = HashSet::new();

        for strategy in &self.strategies {
            for candidate in page.query_all(&strategy.selector).await? {
                if !seen.insert(candidate) {
                    continue;
                }
                match self.actionable(page, candidate).await {
                    Ok(Some(control)) => {
                        trace!(strategy = %strategy.name, %candidate, %control, "Skip control found");
                        return Ok(Some(control));
                    }
                    Ok(None) | Err(PageError::StaleNode(_)) => continue,
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(None)
    }

    async fn actionable<P>(&self, page: &P, candidate: NodeId) -> Result<Option<NodeId>, PageError>
    where
        P: PlayerPage + ?Sized,
    {
        if page.bounding_box(candidate).await?.is_none() {
            return Ok(None);
        }
        page.closest(candidate, ACTIONABLE_SELECTOR).await
    }
}

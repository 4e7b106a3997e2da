//! Classification of session events the page adapter cares about.

use tracing::trace;

use crate::cdp::{BindingCalled, CdpResponse};
use crate::scripts::{KEY_BINDING, MUTATION_BINDING};

/// A session event, reduced to what the page adapter acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// An observer registered under this watch id fired.
    Mutation(u64),
    /// A bound key was pressed outside text entry.
    Key(String),
    /// The document was replaced; every node id is invalid.
    DocumentUpdated,
    /// The target went away.
    Detached,
}

/// Map a raw CDP event to a [`PageEvent`], or `None` for everything else.
pub fn classify(event: &CdpResponse) -> Option<PageEvent> {
    match event.method.as_deref()? {
        "Runtime.bindingCalled" => {
            let params = event.params.clone()?;
            let call: BindingCalled = match serde_json::from_value(params) {
                Ok(call) => call,
                Err(e) => {
                    trace!("Malformed bindingCalled: {}", e);
                    return None;
                }
            };
            if call.name == MUTATION_BINDING {
                call.payload.parse().ok().map(PageEvent::Mutation)
            } else if call.name == KEY_BINDING {
                Some(PageEvent::Key(call.payload.to_lowercase()))
            } else {
                None
            }
        }
        "DOM.documentUpdated" => Some(PageEvent::DocumentUpdated),
        "Inspector.detached" | "Inspector.targetCrashed" => Some(PageEvent::Detached),
        _ => None,
    }
}

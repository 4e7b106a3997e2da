//! JavaScript run inside the player page.
//!
//! Function declarations (`*_FN`) are called with `Runtime.callFunctionOn`
//! on a resolved node, so `this` is the element. Builders return complete
//! expressions for `Runtime.evaluate`; values are embedded as JSON literals.

use serde_json::{json, Value};
use skipramp_protocols::{rate_label, Point};

/// Binding the page calls with a watch id when an observer fires.
pub const MUTATION_BINDING: &str = "__skiprampMutation";

/// Binding the page calls with a lowercased key name.
pub const KEY_BINDING: &str = "__skiprampKey";

/// Observer callbacks within this window collapse into one binding call.
pub const COALESCE_MS: u64 = 100;

/// How long the speed label stays up after the last change.
pub const RATE_LABEL_MS: u64 = 1000;

/// How long the cursor cue stays up.
pub const CURSOR_CUE_MS: u64 = 600;

/// Install a `MutationObserver` on `this` under `id`.
///
/// Arguments: `(id, delayMs, documentWide)`. Document-wide watches see child
/// list and attribute changes in the whole subtree; element watches see
/// only the element's `class` attribute.
pub const OBSERVE_FN: &str = r#"function(id, delay, documentWide) {
  const registry = (window.__skiprampObservers = window.__skiprampObservers || {});
  if (registry[id]) registry[id].disconnect();
  let timer = null;
  const observer = new MutationObserver(() => {
    if (timer !== null) return;
    timer = setTimeout(() => {
      timer = null;
      if (typeof window.__skiprampMutation === 'function') {
        window.__skiprampMutation(String(id));
      }
    }, delay);
  });
  const options = documentWide
    ? { childList: true, subtree: true, attributes: true }
    : { attributes: true, attributeFilter: ['class'] };
  observer.observe(this, options);
  registry[id] = observer;
  return true;
}"#;

pub const CLOSEST_FN: &str = "function(selector) { return this.closest(selector); }";

pub const GET_RATE_FN: &str = "function() { return this.playbackRate; }";

pub const SET_RATE_FN: &str =
    "function(rate) { this.playbackRate = rate; return this.playbackRate; }";

/// Dispatch a list of `{type, pointer, x, y}` steps on `this`, in order.
pub const DISPATCH_FN: &str = r#"function(steps) {
  for (const step of steps) {
    const init = {
      bubbles: true,
      cancelable: true,
      composed: true,
      view: window,
      clientX: step.x,
      clientY: step.y,
      button: 0,
      buttons: step.type === 'pointerdown' ? 1 : 0,
    };
    let event;
    if (step.pointer && typeof PointerEvent === 'function') {
      event = new PointerEvent(step.type, Object.assign(init, {
        pointerId: 1,
        pointerType: 'mouse',
        isPrimary: true,
      }));
    } else {
      event = new MouseEvent(step.type, init);
    }
    this.dispatchEvent(event);
  }
  return steps.length;
}"#;

/// Whether keyboard focus is in an input, a textarea or editable content.
pub const TEXT_ENTRY_FOCUSED: &str = r#"(() => {
  const el = document.activeElement;
  return !!el && (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA' || el.isContentEditable);
})()"#;

/// Drop the observer registered under `id`, if any.
pub fn unobserve(id: u64) -> String {
    format!(
        "(() => {{ const r = window.__skiprampObservers; if (r && r[{id}]) {{ r[{id}].disconnect(); delete r[{id}]; }} return true; }})()"
    )
}

/// Forward bound keys to [`KEY_BINDING`], ignoring keys typed into text entry.
///
/// Idempotent per document, so it can be both evaluated now and registered
/// for future documents.
pub fn key_bridge(keys: &[String]) -> String {
    let keys: Vec<String> = keys
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| k.to_lowercase())
        .collect();
    let keys = Value::from(keys);
    format!(
        r#"(() => {{
  if (window.__skiprampKeyBridge) return false;
  window.__skiprampKeyBridge = true;
  const keys = new Set({keys});
  document.addEventListener('keydown', (event) => {{
    const target = event.target;
    if (target && (target.tagName === 'INPUT' || target.tagName === 'TEXTAREA' || target.isContentEditable)) return;
    const key = String(event.key || '').toLowerCase();
    if (!keys.has(key) || typeof window.{binding} !== 'function') return;
    window.{binding}(key);
  }}, true);
  return true;
}})()"#,
        binding = KEY_BINDING,
    )
}

/// Show the speed label in the bottom-right corner and restart its timer.
pub fn show_rate(rate: f64) -> String {
    let label = Value::from(rate_label(rate));
    format!(
        r#"(() => {{
  let el = document.getElementById('skipramp-speed-indicator');
  if (!el) {{
    el = document.createElement('div');
    el.id = 'skipramp-speed-indicator';
    Object.assign(el.style, {{
      position: 'fixed',
      bottom: '10%',
      right: '5%',
      padding: '4px 8px',
      background: 'rgba(0,0,0,0.7)',
      color: '#fff',
      fontSize: '20px',
      borderRadius: '4px',
      zIndex: 9999,
      pointerEvents: 'none'
    }});
    (document.body || document.documentElement).appendChild(el);
  }}
  el.textContent = {label};
  el.style.display = 'block';
  clearTimeout(window.__skiprampRateTimer);
  window.__skiprampRateTimer = setTimeout(() => {{ el.style.display = 'none'; }}, {RATE_LABEL_MS});
  return true;
}})()"#
    )
}

/// Draw a small marker centered on `at` and remove it shortly after.
pub fn show_cursor(at: Point) -> String {
    let position = json!({"x": at.x, "y": at.y});
    format!(
        r#"(() => {{
  const at = {position};
  let el = document.getElementById('skipramp-cursor-cue');
  if (!el) {{
    el = document.createElement('div');
    el.id = 'skipramp-cursor-cue';
    Object.assign(el.style, {{
      position: 'fixed',
      width: '16px',
      height: '16px',
      marginLeft: '-8px',
      marginTop: '-8px',
      borderRadius: '50%',
      border: '2px solid #fff',
      background: 'rgba(255,0,0,0.6)',
      zIndex: 10000,
      pointerEvents: 'none'
    }});
    (document.body || document.documentElement).appendChild(el);
  }}
  el.style.left = at.x + 'px';
  el.style.top = at.y + 'px';
  el.style.display = 'block';
  clearTimeout(window.__skiprampCursorTimer);
  window.__skiprampCursorTimer = setTimeout(() => {{ el.style.display = 'none'; }}, {CURSOR_CUE_MS});
  return true;
}})()"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bridge_embeds_lowercased_keys() {
        let script = key_bridge(&["A".to_string(), "s".to_string(), String::new()]);
        assert!(script.contains(r#"new Set(["a","s"])"#));
        assert!(script.contains("window.__skiprampKey(key)"));
        assert!(script.contains("isContentEditable"));
    }

    #[test]
    fn test_show_rate_embeds_label() {
        let script = show_rate(1.25);
        assert!(script.contains(r#"el.textContent = "Speed: 1.25x";"#));
        assert!(script.contains("}, 1000);"));
    }

    #[test]
    fn test_show_cursor_embeds_position() {
        let script = show_cursor(Point::new(1150.0, 620.0));
        assert!(script.contains(r#"const at = {"x":1150.0,"y":620.0};"#));
        assert!(script.contains("}, 600);"));
    }

    #[test]
    fn test_unobserve_targets_id() {
        let script = unobserve(7);
        assert!(script.contains("r[7].disconnect()"));
        assert!(script.contains("delete r[7]"));
    }

    #[test]
    fn test_observe_reports_through_binding() {
        assert!(OBSERVE_FN.contains(MUTATION_BINDING));
        assert!(OBSERVE_FN.contains("attributeFilter: ['class']"));
    }
}

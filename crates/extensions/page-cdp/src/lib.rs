//! Player page backend over the Chrome DevTools Protocol.
//!
//! Drives video tabs in a browser the user already runs, so the engine sees
//! the same sessions, logins and players the user does.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐    WebSocket     ┌──────────────────┐
//! │ PlayerController │                  │   Chrome/Edge    │
//! │   CdpPlayerPage  │ ◄──────────────► │  (video tab with │
//! │ OverlayIndicator │       CDP        │   page scripts)  │
//! └──────────────────┘                  └──────────────────┘
//! ```
//!
//! ## Setup
//!
//! Start Chrome with remote debugging enabled:
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222
//! ```
//!
//! Change notifications and key presses come back from the page through
//! `Runtime.addBinding` callbacks; see [`scripts`] for the page side.

pub mod cdp;
pub mod events;
pub mod indicator;
pub mod page;
pub mod scripts;

pub use cdp::{CdpClient, CdpError, PageInfo, PageSession};
pub use indicator::OverlayIndicator;
pub use page::CdpPlayerPage;

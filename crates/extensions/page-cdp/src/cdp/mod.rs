//! Chrome DevTools Protocol (CDP) client.
//!
//! Connects to Chrome/Chromium via WebSocket and speaks the CDP JSON-RPC
//! protocol. One [`CdpClient`] owns the browser connection; every attached
//! tab gets a [`PageSession`] multiplexed over it.
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Attach to an open tab:
//!    ```rust,ignore
//!    let client = CdpClient::connect("http://localhost:9222").await?;
//!    let pages = client.list_pages().await?;
//!    let session = client.attach_page(&pages[0].id).await?;
//!    ```

mod client;
mod error;
mod protocol;
mod session;
mod transport;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;

//! Browser supervisor: one controller per player tab.
//!
//! Rescans the browser's page list, attaches a [`PlayerController`] to every
//! tab it should drive and drops controllers whose tab closed or moved to
//! another host. Reconnects when the browser goes away.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use skipramp_config::{is_known_video_host, Config, KeyBindings, Settings};
use skipramp_core::{Command, PlayerController};
use skipramp_page_cdp::{CdpClient, CdpError, CdpPlayerPage, OverlayIndicator, PageInfo};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Wait between failed connection attempts.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Floor for the rescan period.
const MIN_SCAN_INTERVAL: Duration = Duration::from_millis(100);

/// Whether a tab on `hostname` gets a controller at all.
pub(crate) fn should_attach(hostname: &str, settings: &Settings) -> bool {
    is_known_video_host(hostname) || settings.is_site_allowed(hostname)
}

/// Page targets worth driving, keyed by target id.
pub(crate) fn wanted_pages(pages: &[PageInfo], settings: &Settings) -> HashMap<String, String> {
    pages
        .iter()
        .filter(|page| page.is_page())
        .filter_map(|page| {
            page.hostname()
                .filter(|host| should_attach(host, settings))
                .map(|host| (page.id.clone(), host))
        })
        .collect()
}

/// Map key presses to commands until either side goes away.
pub(crate) async fn forward_keys(
    mut keys: mpsc::UnboundedReceiver<String>,
    bindings: Arc<KeyBindings>,
    commands: mpsc::UnboundedSender<Command>,
) {
    while let Some(key) = keys.recv().await {
        match Command::from_key(&key, &bindings) {
            Some(command) => {
                if commands.send(command).is_err() {
                    break;
                }
            }
            None => trace!(key = %key, "Unbound key"),
        }
    }
}

struct Attached {
    hostname: String,
    page: Arc<CdpPlayerPage>,
    cancel: CancellationToken,
    controller: JoinHandle<()>,
    keys: Option<JoinHandle<()>>,
}

impl Attached {
    fn is_finished(&self) -> bool {
        self.controller.is_finished() || !self.page.is_attached()
    }

    fn stop(&self) {
        self.cancel.cancel();
        if let Some(keys) = &self.keys {
            keys.abort();
        }
    }
}

pub(crate) struct Supervisor {
    endpoint: String,
    scan_interval: Duration,
    settings: Arc<Settings>,
    bindings: Arc<KeyBindings>,
    attached: HashMap<String, Attached>,
}

impl Supervisor {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            endpoint: config.browser.endpoint.clone(),
            scan_interval: config.browser.scan_interval().max(MIN_SCAN_INTERVAL),
            settings: Arc::new(config.settings),
            bindings: Arc::new(config.keys),
            attached: HashMap::new(),
        }
    }

    /// Run until `shutdown` fires.
    pub(crate) async fn run(mut self, shutdown: CancellationToken) {
        while let Some(client) = self.connect(&shutdown).await {
            info!(endpoint = %self.endpoint, "Connected to browser");
            let mut scan = interval(self.scan_interval);
            scan.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        self.detach_all();
                        return;
                    }
                    _ = scan.tick() => {
                        if !client.is_connected() {
                            warn!(endpoint = %self.endpoint, "Browser connection lost");
                            self.detach_all();
                            break;
                        }
                        if let Err(e) = self.scan(&client, &shutdown).await {
                            warn!("Page scan failed: {}", e);
                        }
                    }
                }
            }
        }
        self.detach_all();
    }

    async fn connect(&self, shutdown: &CancellationToken) -> Option<CdpClient> {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return None,
                result = CdpClient::connect(&self.endpoint) => match result {
                    Ok(client) => return Some(client),
                    Err(e) => warn!("{}; retrying in {:?}", e, RECONNECT_DELAY),
                },
            }
            tokio::select! {
                _ = shutdown.cancelled() => return None,
                _ = sleep(RECONNECT_DELAY) => {}
            }
        }
    }

    async fn scan(&mut self, client: &CdpClient, shutdown: &CancellationToken) -> Result<(), CdpError> {
        let pages = client.list_pages().await?;
        let wanted = wanted_pages(&pages, &self.settings);

        let stale: Vec<String> = self
            .attached
            .iter()
            .filter(|(id, attached)| {
                wanted.get(id.as_str()) != Some(&attached.hostname) || attached.is_finished()
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in stale {
            if let Some(attached) = self.attached.remove(&id) {
                info!(target_id = %id, host = %attached.hostname, "Dropping player controller");
                attached.stop();
                if let Err(e) = client.detach_page(&attached.page.session()).await {
                    debug!(target_id = %id, "Detach failed: {}", e);
                }
            }
        }

        for (id, hostname) in wanted {
            if self.attached.contains_key(&id) {
                continue;
            }
            match self.attach(client, &id, hostname.clone(), shutdown).await {
                Ok(attached) => {
                    info!(target_id = %id, host = %hostname, "Player controller attached");
                    self.attached.insert(id, attached);
                }
                Err(e) => warn!(target_id = %id, host = %hostname, "Attach failed: {}", e),
            }
        }
        Ok(())
    }

    async fn attach(
        &self,
        client: &CdpClient,
        target_id: &str,
        hostname: String,
        shutdown: &CancellationToken,
    ) -> Result<Attached, CdpError> {
        let session = Arc::new(client.attach_page(target_id).await?);
        let page = Arc::new(CdpPlayerPage::attach(session.clone(), hostname.clone()).await?);
        let indicator = Arc::new(OverlayIndicator::new(session));

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let mut keys = None;
        if self.settings.is_site_allowed(&hostname) {
            let bound: Vec<String> = self.bindings.all().iter().map(|k| k.to_string()).collect();
            match page.install_key_bridge(&bound).await {
                Ok(()) => {
                    keys = page.take_key_events().map(|rx| {
                        tokio::spawn(forward_keys(rx, self.bindings.clone(), command_tx))
                    });
                }
                Err(e) => warn!(host = %hostname, "Key bridge unavailable: {}", e),
            }
        }

        let cancel = shutdown.child_token();
        let controller = PlayerController::new(page.clone(), indicator, self.settings.clone());
        let controller = tokio::spawn(controller.run(command_rx, cancel.clone()));

        Ok(Attached {
            hostname,
            page,
            cancel,
            controller,
            keys,
        })
    }

    fn detach_all(&mut self) {
        for (_, attached) in self.attached.drain() {
            attached.stop();
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;

//! Request/response plumbing shared by the client and its sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{CdpRequest, CdpResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Upper bound on a single command round trip.
pub(crate) const CALL_TIMEOUT: Duration = Duration::from_secs(10);

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;
type EventHandlers = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<CdpResponse>>>>;

/// Sending half of the browser connection plus response bookkeeping.
pub(crate) struct Transport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: Pending,
    event_handlers: EventHandlers,
    connected: Arc<AtomicBool>,
}

impl Transport {
    /// Split a connected socket, returning the transport and its receive task.
    pub(crate) fn start(stream: WsStream) -> (Arc<Self>, tokio::task::JoinHandle<()>) {
        let (ws_sink, ws_source) = stream.split();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let event_handlers: EventHandlers = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));

        let recv_task = {
            let pending = pending.clone();
            let event_handlers = event_handlers.clone();
            let connected = connected.clone();
            tokio::spawn(async move {
                receive_loop(ws_source, &pending, &event_handlers).await;
                connected.store(false, Ordering::SeqCst);
                // Dropping the senders fails every waiter and ends every event stream.
                pending.lock().clear();
                event_handlers.lock().clear();
            })
        };

        let transport = Arc::new(Self {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            request_id: AtomicU64::new(1),
            pending,
            event_handlers,
            connected,
        });
        (transport, recv_task)
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send a command and wait for its response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        if !self.is_connected() {
            return Err(CdpError::SessionClosed);
        }
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// Route events for `session_id` into a new channel.
    pub(crate) fn subscribe(&self, session_id: &str) -> mpsc::UnboundedReceiver<CdpResponse> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_handlers.lock().insert(session_id.to_string(), tx);
        rx
    }

    pub(crate) fn unsubscribe(&self, session_id: &str) {
        self.event_handlers.lock().remove(session_id);
    }
}

async fn receive_loop(mut ws_source: WsSource, pending: &Pending, event_handlers: &EventHandlers) {
    while let Some(msg) = ws_source.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                trace!("CDP recv: {}", text);
                match serde_json::from_str::<CdpResponse>(&text) {
                    Ok(resp) => dispatch(resp, pending, event_handlers),
                    Err(e) => warn!("Failed to parse CDP message: {}", e),
                }
            }
            Ok(Message::Close(_)) => {
                debug!("WebSocket closed");
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }
}

fn dispatch(resp: CdpResponse, pending: &Pending, event_handlers: &EventHandlers) {
    if let Some(id) = resp.id {
        let waiter = pending.lock().remove(&id);
        if let Some(tx) = waiter {
            let result = match resp.error {
                Some(error) => Err(CdpError::Protocol {
                    code: error.code,
                    message: error.message,
                }),
                None => Ok(resp.result.unwrap_or(Value::Null)),
            };
            let _ = tx.send(result);
        }
    } else if resp.method.is_some() {
        let session_id = resp.session_id.clone().unwrap_or_default();
        let mut handlers = event_handlers.lock();
        let closed = match handlers.get(&session_id) {
            Some(tx) => tx.send(resp).is_err(),
            None => false,
        };
        if closed {
            handlers.remove(&session_id);
        }
    }
}

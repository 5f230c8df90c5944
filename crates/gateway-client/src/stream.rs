//! Self-healing connection to the raw sentence stream.
//!
//! The gateway pushes newline-delimited protocol sentences as individual
//! WebSocket text frames on `/ws/nmea`. [`StreamConnection`] owns one such
//! connection, fans incoming frames out to subscribers in registration
//! order, and schedules a single reconnect attempt after a fixed delay
//! whenever the transport drops. `disconnect()` releases every timer and
//! transport handle; after it returns, no further events are delivered even
//! if the underlying socket fires late callbacks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::ClientError;

/// Connection lifecycle, mutated only by the connection's own task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Events delivered to stream subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Connected,
    Disconnected,
    /// One raw sentence, exactly as received. No decoding is performed.
    Message(String),
    TransportError(String),
}

/// What a live transport link reports back to the connection.
#[derive(Debug)]
pub enum LinkEvent {
    /// One inbound text frame.
    Frame(String),
    /// The link failed; a `Closed` follows.
    Error(String),
    /// The link is gone.
    Closed,
}

/// A dialed, live link. Dropping the link releases the underlying socket.
pub struct TransportLink {
    pub events: mpsc::UnboundedReceiver<LinkEvent>,
    /// Held open for the lifetime of the link; dropping it tells the pump
    /// to close the socket.
    _closer: oneshot::Sender<()>,
}

impl TransportLink {
    pub fn new(events: mpsc::UnboundedReceiver<LinkEvent>, closer: oneshot::Sender<()>) -> Self {
        Self {
            events,
            _closer: closer,
        }
    }
}

/// Dialing seam so failure sequences can be scripted in tests.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn dial(&self) -> Result<TransportLink, ClientError>;
}

/// Real transport over `tokio-tungstenite`.
pub struct WebSocketTransport {
    url: String,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl StreamTransport for WebSocketTransport {
    async fn dial(&self) -> Result<TransportLink, ClientError> {
        let (ws, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (closer_tx, mut closer_rx) = oneshot::channel::<()>();

        // Pump inbound frames into the link channel until the socket dies or
        // the link is dropped.
        tokio::spawn(async move {
            let (mut ws_tx, mut ws_rx) = ws.split();
            loop {
                tokio::select! {
                    _ = &mut closer_rx => {
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                    frame = ws_rx.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            if event_tx.send(LinkEvent::Frame(text)).is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_tx.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            let _ = event_tx.send(LinkEvent::Closed);
                            break;
                        }
                        Some(Err(e)) => {
                            let _ = event_tx.send(LinkEvent::Error(e.to_string()));
                            let _ = event_tx.send(LinkEvent::Closed);
                            break;
                        }
                        Some(Ok(_)) => {} // Ignore other frame types
                    }
                }
            }
        });

        Ok(TransportLink::new(event_rx, closer_tx))
    }
}

/// Handle returned from `subscribe`, used to unregister the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle(u64);

type Listener = Box<dyn Fn(&StreamEvent) + Send + 'static>;

struct SubscriberSet {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    /// Set by `disconnect()`; silences delivery even if the connection task
    /// has not been reaped yet.
    closed: bool,
}

impl SubscriberSet {
    fn emit(&self, event: &StreamEvent) {
        if self.closed {
            return;
        }
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }
}

struct RunHandle {
    task: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

/// One persistent duplex connection to the gateway's sentence stream.
///
/// The connection is an explicitly owned resource: the view that needs the
/// stream creates it, consumers only subscribe/unsubscribe, and only the
/// owner calls `disconnect()`.
pub struct StreamConnection {
    transport: Arc<dyn StreamTransport>,
    reconnect_delay: Duration,
    state: Arc<Mutex<ConnectionState>>,
    subscribers: Arc<Mutex<SubscriberSet>>,
    run: Mutex<Option<RunHandle>>,
}

impl StreamConnection {
    pub fn new(transport: Arc<dyn StreamTransport>, reconnect_delay: Duration) -> Self {
        Self {
            transport,
            reconnect_delay,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            subscribers: Arc::new(Mutex::new(SubscriberSet {
                next_id: 0,
                listeners: Vec::new(),
                closed: false,
            })),
            run: Mutex::new(None),
        }
    }

    /// Connection over a real WebSocket to the given `ws://` URL.
    pub fn over_websocket(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self::new(Arc::new(WebSocketTransport::new(url)), reconnect_delay)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    /// Register a listener. Events are delivered synchronously with receipt,
    /// in subscription order across listeners.
    pub fn subscribe(&self, listener: impl Fn(&StreamEvent) + Send + 'static) -> SubscriptionHandle {
        let mut subs = self.subscribers.lock().unwrap();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.listeners.push((id, Box::new(listener)));
        SubscriptionHandle(id)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut subs = self.subscribers.lock().unwrap();
        subs.listeners.retain(|(id, _)| *id != handle.0);
    }

    /// Begin connecting unless an attempt is already underway. A pending
    /// reconnect timer counts as an attempt, so at most one exists at a time.
    pub fn connect(&self) {
        let mut run = self.run.lock().unwrap();
        if let Some(handle) = run.as_ref() {
            if !handle.task.is_finished() {
                debug!("connect() ignored; connection already active");
                return;
            }
        }

        self.subscribers.lock().unwrap().closed = false;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_connection(
            self.transport.clone(),
            self.reconnect_delay,
            self.state.clone(),
            self.subscribers.clone(),
            shutdown_rx,
        ));

        *run = Some(RunHandle {
            task,
            shutdown: shutdown_tx,
        });
    }

    /// Tear the connection down: cancel any pending reconnect timer, close
    /// the active transport, and suppress all further event delivery until
    /// `connect()` is called again.
    pub fn disconnect(&self) {
        self.subscribers.lock().unwrap().closed = true;

        if let Some(handle) = self.run.lock().unwrap().take() {
            let _ = handle.shutdown.send(true);
            handle.task.abort();
        }

        *self.state.lock().unwrap() = ConnectionState::Disconnected;
        info!("stream disconnected");
    }
}

impl Drop for StreamConnection {
    fn drop(&mut self) {
        if let Some(handle) = self.run.lock().unwrap().take() {
            handle.task.abort();
        }
    }
}

/// The connection task: dial, pump, reconnect after a fixed delay. Exits
/// only on shutdown.
async fn run_connection(
    transport: Arc<dyn StreamTransport>,
    reconnect_delay: Duration,
    state: Arc<Mutex<ConnectionState>>,
    subscribers: Arc<Mutex<SubscriberSet>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let set_state = |next: ConnectionState| {
        *state.lock().unwrap() = next;
    };
    let emit = |event: StreamEvent| {
        subscribers.lock().unwrap().emit(&event);
    };

    loop {
        set_state(ConnectionState::Connecting);

        let dialed = tokio::select! {
            _ = shutdown.changed() => return,
            dialed = transport.dial() => dialed,
        };

        match dialed {
            Ok(mut link) => {
                set_state(ConnectionState::Connected);
                emit(StreamEvent::Connected);

                loop {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            set_state(ConnectionState::Disconnected);
                            return;
                        }
                        event = link.events.recv() => match event {
                            Some(LinkEvent::Frame(text)) => emit(StreamEvent::Message(text)),
                            Some(LinkEvent::Error(detail)) => {
                                warn!("stream transport error: {}", detail);
                                emit(StreamEvent::TransportError(detail));
                            }
                            Some(LinkEvent::Closed) | None => {
                                set_state(ConnectionState::Disconnected);
                                emit(StreamEvent::Disconnected);
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                warn!("stream dial failed: {}", e);
                emit(StreamEvent::TransportError(e.to_string()));
                set_state(ConnectionState::Disconnected);
                emit(StreamEvent::Disconnected);
            }
        }

        // Exactly one reconnect attempt is pending from here until the next
        // dial; shutdown cancels it.
        debug!("reconnecting in {:?}", reconnect_delay);
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}

//! Real-time notification channel.
//!
//! Frames are JSON envelopes `{type, data, timestamp}`. The client keeps every
//! parsed message, raises a toast per kind, and on a lost connection retries at
//! a fixed interval until `max_reconnect_attempts` consecutive failures. A
//! successful open resets the counter.

use crate::domain::ports::{Connection, Connector, Toast, ToastSink};
use crate::utils::error::{RentalError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    BookingCreated,
    BookingUpdated,
    BookingCancelled,
    CarStatusChanged,
    PaymentReceived,
    SystemNotification,
    /// Kinds this client does not know yet; kept in history, never toasted.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub timestamp: String,
}

impl NotificationMessage {
    /// Reads `data.<key>` as display text; numbers are rendered as-is.
    pub fn field(&self, key: &str) -> String {
        match self.data.get(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Headline and body text for this message.
    pub fn describe(&self) -> (String, String) {
        match self.kind {
            MessageKind::BookingCreated => (
                "New booking".to_string(),
                format!(
                    "Customer {} booked {}",
                    self.field("customerName"),
                    self.field("carName")
                ),
            ),
            MessageKind::BookingUpdated => (
                "Booking updated".to_string(),
                format!("Booking #{} was changed", self.field("id")),
            ),
            MessageKind::BookingCancelled => (
                "Booking cancelled".to_string(),
                format!("Booking #{} was cancelled", self.field("id")),
            ),
            MessageKind::PaymentReceived => (
                "Payment received".to_string(),
                format!(
                    "Payment of {} ₽ for booking #{}",
                    self.field("amount"),
                    self.field("bookingId")
                ),
            ),
            MessageKind::SystemNotification => {
                let title = self.field("title");
                let title = if title.is_empty() {
                    "System notification".to_string()
                } else {
                    title
                };
                (title, self.field("message"))
            }
            MessageKind::CarStatusChanged => (
                "Car status changed".to_string(),
                format!("Car #{} is now {}", self.field("carId"), self.field("status")),
            ),
            MessageKind::Unknown => ("New notification".to_string(), String::new()),
        }
    }

    /// The toast raised on arrival, if this kind raises one.
    pub fn toast(&self) -> Option<Toast> {
        let (title, description) = self.describe();
        match self.kind {
            MessageKind::BookingCreated | MessageKind::BookingUpdated | MessageKind::PaymentReceived => {
                Some(Toast::new(title, description))
            }
            MessageKind::BookingCancelled => Some(Toast::destructive(title, description)),
            MessageKind::SystemNotification => {
                if self.field("variant") == "destructive" {
                    Some(Toast::destructive(title, description))
                } else {
                    Some(Toast::new(title, description))
                }
            }
            MessageKind::CarStatusChanged | MessageKind::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub auto_reconnect: bool,
    pub reconnect_interval: Duration,
    pub max_reconnect_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_interval: Duration::from_millis(5000),
            max_reconnect_attempts: 5,
        }
    }
}

/// Why [`NotificationClient::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// `disconnect()` was called.
    Disconnected,
    /// The connection ended and auto-reconnect is off.
    Closed,
    /// Reconnect attempts are exhausted.
    GaveUp,
}

#[derive(Debug)]
enum Command {
    Send(String),
    Disconnect,
}

type MessageHook = Box<dyn Fn(&NotificationMessage) + Send + Sync>;
type EventHook = Box<dyn Fn() + Send + Sync>;
type ErrorHook = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Hooks {
    on_open: Option<EventHook>,
    on_close: Option<EventHook>,
    on_error: Option<ErrorHook>,
    on_message: Option<MessageHook>,
}

#[derive(Default)]
struct SharedState {
    connected: AtomicBool,
    dropped_sends: AtomicUsize,
    messages: Mutex<Vec<NotificationMessage>>,
}

/// Cheap, cloneable control surface for a running client.
#[derive(Clone)]
pub struct NotificationHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: Arc<SharedState>,
}

impl NotificationHandle {
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.state.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Queues a frame for the open connection. `Ok` means the frame was queued,
    /// not delivered: if the connection drops before it is written the frame is
    /// discarded and counted in `dropped_sends`.
    pub fn send_message<T: Serialize>(&self, message: &T) -> Result<()> {
        if !self.is_connected() {
            tracing::error!("WebSocket is not connected.");
            return Err(RentalError::NotConnected);
        }
        let text = serde_json::to_string(message)?;
        self.commands
            .send(Command::Send(text))
            .map_err(|_| RentalError::NotConnected)
    }

    /// Frames accepted by `send_message` that never reached the wire.
    pub fn dropped_sends(&self) -> usize {
        self.state.dropped_sends.load(Ordering::SeqCst)
    }

    /// Closes the connection and stops the reconnect loop.
    pub fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect);
    }
}

pub struct NotificationClient {
    url: String,
    policy: ReconnectPolicy,
    show_toasts: bool,
    connector: Arc<dyn Connector>,
    toasts: Arc<dyn ToastSink>,
    hooks: Hooks,
    handle: NotificationHandle,
    commands: Mutex<Option<mpsc::UnboundedReceiver<Command>>>,
}

impl NotificationClient {
    pub fn new(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        connector: Arc<dyn Connector>,
        toasts: Arc<dyn ToastSink>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            url: url.into(),
            policy,
            show_toasts: true,
            connector,
            toasts,
            hooks: Hooks::default(),
            handle: NotificationHandle {
                commands: tx,
                state: Arc::new(SharedState::default()),
            },
            commands: Mutex::new(Some(rx)),
        }
    }

    pub fn show_toasts(mut self, enabled: bool) -> Self {
        self.show_toasts = enabled;
        self
    }

    pub fn on_open(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_open = Some(Box::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_close = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hooks.on_error = Some(Box::new(hook));
        self
    }

    pub fn on_message(mut self, hook: impl Fn(&NotificationMessage) + Send + Sync + 'static) -> Self {
        self.hooks.on_message = Some(Box::new(hook));
        self
    }

    pub fn handle(&self) -> NotificationHandle {
        self.handle.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_connected()
    }

    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.handle.messages()
    }

    fn toast(&self, toast: Toast) {
        if self.show_toasts {
            self.toasts.show(toast);
        }
    }

    fn report_error(&self, error: &str) {
        tracing::error!("WebSocket error: {}", error);
        if let Some(hook) = &self.hooks.on_error {
            hook(error);
        }
    }

    fn handle_frame(&self, text: &str) {
        let message: NotificationMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Error parsing WebSocket message: {}", e);
                return;
            }
        };
        tracing::debug!("📨 {:?} received", message.kind);

        if let Ok(mut messages) = self.handle.state.messages.lock() {
            messages.push(message.clone());
        }
        if let Some(hook) = &self.hooks.on_message {
            hook(&message);
        }
        if let Some(toast) = message.toast() {
            self.toast(toast);
        }
    }

    /// Drives one open connection until it ends or a disconnect is requested.
    async fn pump(
        &self,
        connection: &mut dyn Connection,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) -> bool {
        loop {
            tokio::select! {
                frame = connection.recv() => match frame {
                    Some(text) => self.handle_frame(&text),
                    None => return false,
                },
                command = commands.recv() => match command {
                    Some(Command::Send(text)) => {
                        if let Err(e) = connection.send(text).await {
                            self.report_error(&e.to_string());
                        }
                    }
                    Some(Command::Disconnect) | None => return true,
                },
            }
        }
    }

    fn drop_send(&self) {
        let dropped = self.handle.state.dropped_sends.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::warn!("WebSocket is not connected, queued frame discarded ({} so far)", dropped);
    }

    /// Empties the command queue after the peer went away; `true` if a
    /// disconnect was among the queued commands.
    fn discard_pending(&self, commands: &mut mpsc::UnboundedReceiver<Command>) -> bool {
        let mut disconnect = false;
        while let Ok(command) = commands.try_recv() {
            match command {
                Command::Send(_) => self.drop_send(),
                Command::Disconnect => disconnect = true,
            }
        }
        disconnect
    }

    /// Waits out the reconnect interval; `true` if a disconnect arrived meanwhile.
    async fn wait_before_retry(&self, commands: &mut mpsc::UnboundedReceiver<Command>) -> bool {
        let sleep = tokio::time::sleep(self.policy.reconnect_interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                command = commands.recv() => match command {
                    Some(Command::Send(_)) => self.drop_send(),
                    Some(Command::Disconnect) | None => return true,
                },
            }
        }
    }

    /// Connects and keeps the channel alive according to the reconnect policy.
    /// Can be driven once per client.
    pub async fn run(&self) -> Result<RunOutcome> {
        let mut commands = self
            .commands
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or_else(|| RentalError::ConfigError {
                message: "notification client is already running".to_string(),
            })?;

        let state = self.handle.state.clone();
        let mut attempts: u32 = 0;

        loop {
            match self.connector.connect(&self.url).await {
                Ok(mut connection) => {
                    state.connected.store(true, Ordering::SeqCst);
                    attempts = 0;
                    tracing::info!("🔌 Connected to {}", self.url);
                    if let Some(hook) = &self.hooks.on_open {
                        hook();
                    }
                    self.toast(Toast::new(
                        "Connected to server",
                        "You will now receive real-time notifications",
                    ));

                    let mut disconnect_requested = self.pump(connection.as_mut(), &mut commands).await;

                    state.connected.store(false, Ordering::SeqCst);
                    if !disconnect_requested {
                        disconnect_requested = self.discard_pending(&mut commands);
                    }
                    if disconnect_requested {
                        if let Err(e) = connection.close().await {
                            tracing::debug!("Close handshake failed: {}", e);
                        }
                        if let Some(hook) = &self.hooks.on_close {
                            hook();
                        }
                        tracing::info!("Notification channel disconnected");
                        return Ok(RunOutcome::Disconnected);
                    }
                    tracing::warn!("Notification channel closed by peer");
                }
                Err(e) => self.report_error(&e.to_string()),
            }

            if let Some(hook) = &self.hooks.on_close {
                hook();
            }

            if self.policy.auto_reconnect && attempts < self.policy.max_reconnect_attempts {
                self.toast(Toast::destructive(
                    "Connection lost",
                    format!(
                        "Reconnecting in {} seconds...",
                        self.policy.reconnect_interval.as_secs_f64()
                    ),
                ));
                attempts += 1;
                tracing::info!(
                    "Reconnect attempt {}/{} in {:?}",
                    attempts,
                    self.policy.max_reconnect_attempts,
                    self.policy.reconnect_interval
                );
                if self.wait_before_retry(&mut commands).await {
                    return Ok(RunOutcome::Disconnected);
                }
            } else if attempts >= self.policy.max_reconnect_attempts {
                self.toast(Toast::destructive(
                    "Connection error",
                    "Could not connect to the notification server. Try again later.",
                ));
                tracing::error!("❌ Giving up after {} reconnect attempts", attempts);
                return Ok(RunOutcome::GaveUp);
            } else {
                return Ok(RunOutcome::Closed);
            }
        }
    }
}

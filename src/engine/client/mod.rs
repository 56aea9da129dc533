#[cfg(test)]
mod tests;

use std::{
    cell::RefCell,
    collections::HashMap,
    mem::take,
    rc::{Rc, Weak},
    time::{Duration, Instant},
};

use crossbeam::channel::{Receiver, Sender, TryRecvError, bounded};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::{
    error::ClientError,
    link::{Connector, Link, LinkEvent},
    protocol::{EngineCommand, EngineEvent, EngineResponse, Envelope, StateUpdate},
};

pub const DEFAULT_ENGINE_URL: &str = "ws://localhost:9001";
pub const RECONNECT_INTERVAL: Duration = Duration::from_millis(2000);
pub const COMMAND_TIMEOUT: Duration = Duration::from_millis(10000);

/// What happens to commands still awaiting a response when the connection drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPolicy {
    /// Leave them pending, only their own timeout fails them
    #[default]
    KeepUntilTimeout,
    /// Fail them with `ClientError::Disconnected` as soon as the link closes
    FailOnDisconnect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub url: String,
    pub reconnect_interval: Duration,
    pub command_timeout: Duration,
    pub pending_policy: PendingPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_URL.to_string(),
            reconnect_interval: RECONNECT_INTERVAL,
            command_timeout: COMMAND_TIMEOUT,
            pending_policy: PendingPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Inbound traffic as seen by subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Response(EngineResponse),
    State(StateUpdate),
    Event(EngineEvent),
}

pub type CommandResult = Result<EngineResponse, ClientError>;

/// Handle on an issued command. Resolves once, with the engine's response or a failure.
pub struct CommandTicket {
    id: String,
    command: &'static str,
    result: Receiver<CommandResult>,
}

impl CommandTicket {
    fn resolved(command: &'static str, result: CommandResult) -> Self {
        let (tx, rx) = bounded(1);
        let _ = tx.send(result);
        Self {
            id: String::new(),
            command,
            result: rx,
        }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn command(&self) -> &'static str {
        self.command
    }
    /// Non blocking. `None` while the command is still in flight.
    pub fn try_take(&self) -> Option<CommandResult> {
        match self.result.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ClientError::Shutdown)),
        }
    }
}

/// Handle on a `connect()` call
pub struct ConnectTicket {
    result: Receiver<Result<(), ClientError>>,
}

impl ConnectTicket {
    pub fn try_take(&self) -> Option<Result<(), ClientError>> {
        match self.result.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ClientError::Shutdown)),
        }
    }
}

type Handler = Box<dyn FnMut(&InboundMessage)>;

#[derive(Default)]
struct Subscribers {
    handlers: Vec<(u64, Handler)>,
    next_id: u64,
    dispatching: bool,
    removed: Vec<u64>,
}

/// Registration returned by `EngineClient::on_message`
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Subscribers>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            if registry.dispatching {
                registry.removed.push(self.id);
            }
            registry.handlers.retain(|(id, _)| *id != self.id);
        }
    }
}

struct PendingCommand {
    command: &'static str,
    deadline: Instant,
    reply: Sender<CommandResult>,
}

/// Command waiting for the connection to open
struct QueuedCommand {
    id: String,
    command: &'static str,
    frame: String,
    reply: Sender<CommandResult>,
}

/// Client side of the engine protocol.
///
/// Cooperative: every state change happens inside `poll`, `connect`,
/// `send_command` or `shutdown`, all called from the owning thread. The socket
/// itself is serviced by the connector, which only reports `LinkEvent`s.
pub struct EngineClient {
    settings: ClientSettings,
    connector: Box<dyn Connector>,
    state: ConnectionState,
    link: Option<Link>,
    stopped: bool,
    reconnect_at: Option<Instant>,
    connect_waiters: Vec<Sender<Result<(), ClientError>>>,
    queued: Vec<QueuedCommand>,
    pending: HashMap<String, PendingCommand>,
    subscribers: Rc<RefCell<Subscribers>>,
}

impl EngineClient {
    pub fn new(connector: impl Connector + 'static, settings: ClientSettings) -> Self {
        Self {
            settings,
            connector: Box::new(connector),
            state: ConnectionState::Disconnected,
            link: None,
            stopped: false,
            reconnect_at: None,
            connect_waiters: Vec::new(),
            queued: Vec::new(),
            pending: HashMap::new(),
            subscribers: Rc::new(RefCell::new(Subscribers::default())),
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
    pub fn state(&self) -> ConnectionState {
        self.state
    }
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
    /// Commands transmitted and still waiting for their response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
    /// Time of the next scheduled reconnect attempt, if any
    pub fn reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Begin the connection lifecycle. Lost connections are retried until `shutdown`.
    pub fn start(&mut self) -> ConnectTicket {
        self.stopped = false;
        info!("Starting engine client for {}", self.settings.url);
        self.connect()
    }

    /// Close the connection and stop reconnecting. Everything in flight fails with `Shutdown`.
    pub fn shutdown(&mut self) {
        self.stopped = true;
        self.reconnect_at = None;
        if let Some(link) = self.link.take() {
            link.close();
        }
        if self.state != ConnectionState::Disconnected {
            info!("Engine client shut down");
        }
        self.state = ConnectionState::Disconnected;
        self.fail_connecting(ClientError::Shutdown);
        for (_, pending) in self.pending.drain() {
            let _ = pending.reply.send(Err(ClientError::Shutdown));
        }
    }

    /// Idempotent: resolves at once when connected and joins the running attempt when connecting.
    pub fn connect(&mut self) -> ConnectTicket {
        let (tx, rx) = bounded(1);
        match self.state {
            ConnectionState::Connected => {
                let _ = tx.send(Ok(()));
            }
            ConnectionState::Connecting => self.connect_waiters.push(tx),
            ConnectionState::Disconnected => {
                if self.stopped {
                    let _ = tx.send(Err(ClientError::Shutdown));
                } else {
                    self.connect_waiters.push(tx);
                    self.open_link();
                }
            }
        }
        ConnectTicket { result: rx }
    }

    /// Issue a command. The ticket resolves with the matching response,
    /// or fails after `command_timeout` without one.
    pub fn send_command(&mut self, command: EngineCommand) -> CommandTicket {
        let name = command.name();
        if self.stopped {
            return CommandTicket::resolved(name, Err(ClientError::Shutdown));
        }
        let id = uuid::Uuid::new_v4().to_string();
        let frame = command
            .to_frame(id.clone())
            .and_then(|frame| Envelope::Command(frame).encode());
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => return CommandTicket::resolved(name, Err(ClientError::Encode(err.to_string()))),
        };
        let (tx, rx) = bounded(1);
        let queued = QueuedCommand {
            id: id.clone(),
            command: name,
            frame,
            reply: tx,
        };
        if self.state == ConnectionState::Connected {
            self.transmit(queued, Instant::now());
        } else {
            debug!("Queueing {} until the engine connection opens", name);
            self.queued.push(queued);
            if self.state == ConnectionState::Disconnected {
                self.open_link();
            }
        }
        CommandTicket {
            id,
            command: name,
            result: rx,
        }
    }

    // Transport shortcuts
    pub fn play(&mut self) -> CommandTicket {
        self.send_command(EngineCommand::Play)
    }
    pub fn stop(&mut self) -> CommandTicket {
        self.send_command(EngineCommand::Stop)
    }
    pub fn set_tempo(&mut self, tempo: f32) -> CommandTicket {
        self.send_command(EngineCommand::SetTempo { tempo })
    }
    pub fn set_playhead(&mut self, beat: f32) -> CommandTicket {
        self.send_command(EngineCommand::SetPlayhead { beat })
    }
    pub fn set_loop(&mut self, enabled: bool, start: Option<f32>, end: Option<f32>) -> CommandTicket {
        self.send_command(EngineCommand::SetLoop {
            enabled,
            start,
            end,
        })
    }
    pub fn toggle_metronome(&mut self) -> CommandTicket {
        self.send_command(EngineCommand::ToggleMetronome)
    }

    /// Register a handler called for every state update, event and response
    /// (matched or not), in arrival order.
    pub fn on_message(&mut self, handler: impl FnMut(&InboundMessage) + 'static) -> Subscription {
        let mut registry = self.subscribers.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, Box::new(handler)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.subscribers),
        }
    }

    /// Process link events, expire timed out commands and run due reconnects.
    pub fn poll(&mut self, now: Instant) {
        let events = self.link.as_ref().map(Link::drain).unwrap_or_default();
        for event in events {
            self.handle_event(event, now);
        }
        self.expire_pending(now);
        if let Some(at) = self.reconnect_at
            && now >= at
        {
            self.reconnect_at = None;
            if self.state == ConnectionState::Disconnected && !self.stopped {
                info!("Attempting to reconnect to engine...");
                self.open_link();
            }
        }
    }

    fn open_link(&mut self) {
        debug!("Opening engine connection to {}", self.settings.url);
        self.state = ConnectionState::Connecting;
        self.link = Some(self.connector.open(&self.settings.url));
    }

    fn handle_event(&mut self, event: LinkEvent, now: Instant) {
        match event {
            LinkEvent::Opened => {
                info!("Connected to engine at {}", self.settings.url);
                self.state = ConnectionState::Connected;
                for waiter in take(&mut self.connect_waiters) {
                    let _ = waiter.send(Ok(()));
                }
                for queued in take(&mut self.queued) {
                    self.transmit(queued, now);
                }
            }
            LinkEvent::Frame(text) => self.handle_frame(&text),
            LinkEvent::Failed(reason) => {
                warn!("Engine connection error: {}", reason);
                if self.state == ConnectionState::Connecting {
                    self.fail_connecting(ClientError::Connection(reason));
                }
            }
            LinkEvent::Closed => self.handle_close(now),
        }
    }

    fn handle_close(&mut self, now: Instant) {
        if self.state == ConnectionState::Connected {
            info!("Disconnected from engine");
        }
        self.state = ConnectionState::Disconnected;
        self.link = None;
        self.fail_connecting(ClientError::Connection(
            "connection closed before it opened".into(),
        ));
        if self.settings.pending_policy == PendingPolicy::FailOnDisconnect {
            for (_, pending) in self.pending.drain() {
                let _ = pending.reply.send(Err(ClientError::Disconnected));
            }
        }
        if !self.stopped {
            self.reconnect_at = Some(now + self.settings.reconnect_interval);
        }
    }

    fn handle_frame(&mut self, text: &str) {
        let envelope = match Envelope::decode(text) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!("Dropping engine message: {}", err);
                return;
            }
        };
        let message = match envelope {
            Envelope::Response(response) => {
                match self.pending.remove(&response.id) {
                    Some(pending) => {
                        if !response.success {
                            debug!(
                                "{} rejected by engine: {}",
                                pending.command,
                                response.error.as_deref().unwrap_or("unknown error")
                            );
                        }
                        let _ = pending.reply.send(Ok(response.clone()));
                    }
                    None => debug!("Unmatched response {}", response.id),
                }
                InboundMessage::Response(response)
            }
            Envelope::State(update) => InboundMessage::State(update),
            Envelope::Event(event) => {
                if event.event == "error" {
                    warn!("Engine reported an error: {}", event.message);
                }
                InboundMessage::Event(event)
            }
            Envelope::Command(frame) => {
                warn!("Ignoring command '{}' sent by the engine", frame.command);
                return;
            }
        };
        self.dispatch(&message);
    }

    fn transmit(&mut self, queued: QueuedCommand, now: Instant) {
        let Some(link) = &self.link else {
            let _ = queued.reply.send(Err(ClientError::Disconnected));
            return;
        };
        if !link.send(queued.frame) {
            debug!("Engine link is gone, {} stays pending", queued.command);
        }
        self.pending.insert(
            queued.id,
            PendingCommand {
                command: queued.command,
                deadline: now + self.settings.command_timeout,
                reply: queued.reply,
            },
        );
    }

    fn expire_pending(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, pending)| now >= pending.deadline)
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            if let Some(pending) = self.pending.remove(&id) {
                warn!("Command {} ({}) timed out", pending.command, id);
                let _ = pending.reply.send(Err(ClientError::Timeout {
                    command: pending.command.to_string(),
                    timeout_ms: self.settings.command_timeout.as_millis() as u64,
                }));
            }
        }
    }

    /// Fail `connect()` callers and commands queued behind the current attempt
    fn fail_connecting(&mut self, error: ClientError) {
        for waiter in take(&mut self.connect_waiters) {
            let _ = waiter.send(Err(error.clone()));
        }
        for queued in take(&mut self.queued) {
            let _ = queued.reply.send(Err(error.clone()));
        }
    }

    fn dispatch(&self, message: &InboundMessage) {
        let mut handlers = {
            let mut registry = self.subscribers.borrow_mut();
            registry.dispatching = true;
            take(&mut registry.handlers)
        };
        for (id, handler) in handlers.iter_mut() {
            if self.subscribers.borrow().removed.contains(id) {
                continue;
            }
            handler(message);
        }
        let mut registry = self.subscribers.borrow_mut();
        registry.dispatching = false;
        let removed = take(&mut registry.removed);
        handlers.retain(|(id, _)| !removed.contains(id));
        // Handlers registered while dispatching
        handlers.append(&mut registry.handlers);
        registry.handlers = handlers;
    }
}

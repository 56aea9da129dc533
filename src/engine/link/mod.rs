#[cfg(test)]
pub mod memory;
mod websocket;

use crossbeam::channel::{Receiver, Sender};

pub use websocket::WebSocketConnector;

/// What the socket side reports back to the client
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Opened,
    Frame(String),
    /// Connection-level error. Always followed by `Closed`.
    Failed(String),
    Closed,
}

/// Instructions from the client to the socket side
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Frame(String),
    Close,
}

/// Client end of one connection attempt
pub struct Link {
    outbound: Sender<Outbound>,
    events: Receiver<LinkEvent>,
}

impl Link {
    pub fn new(outbound: Sender<Outbound>, events: Receiver<LinkEvent>) -> Self {
        Self { outbound, events }
    }
    /// Queue a text frame. Returns false when the socket side is gone.
    pub fn send(&self, frame: String) -> bool {
        self.outbound.send(Outbound::Frame(frame)).is_ok()
    }
    pub fn close(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }
    /// Everything reported since the last call, in arrival order
    pub fn drain(&self) -> Vec<LinkEvent> {
        self.events.try_iter().collect()
    }
}

/// Opens connections to the engine. Each call is a fresh attempt.
pub trait Connector {
    fn open(&self, url: &str) -> Link;
}

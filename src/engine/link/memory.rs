//! In-process connector used by unit tests to play the engine side.

use std::{cell::RefCell, rc::Rc};

use crossbeam::channel::{Receiver, Sender, unbounded};
use serde_json::Value;

use crate::engine::{
    link::{Connector, Link, LinkEvent, Outbound},
    protocol::{CommandFrame, EngineResponse, Envelope, StateUpdate},
};

#[derive(Clone, Default)]
pub struct MemoryConnector {
    ends: Rc<RefCell<Vec<MemoryEnd>>>,
    urls: Rc<RefCell<Vec<String>>>,
}

/// Engine end of one connection attempt
#[derive(Clone)]
pub struct MemoryEnd {
    events: Sender<LinkEvent>,
    outbound: Receiver<Outbound>,
}

impl Connector for MemoryConnector {
    fn open(&self, url: &str) -> Link {
        let (outbound_tx, outbound_rx) = unbounded();
        let (events_tx, events_rx) = unbounded();
        self.ends.borrow_mut().push(MemoryEnd {
            events: events_tx,
            outbound: outbound_rx,
        });
        self.urls.borrow_mut().push(url.to_string());
        Link::new(outbound_tx, events_rx)
    }
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }
    /// Number of connection attempts made so far
    pub fn attempts(&self) -> usize {
        self.ends.borrow().len()
    }
    pub fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }
    /// Most recent attempt
    pub fn last(&self) -> MemoryEnd {
        self.ends
            .borrow()
            .last()
            .cloned()
            .expect("no connection attempt was made")
    }
}

impl MemoryEnd {
    pub fn open(&self) {
        self.emit(LinkEvent::Opened);
    }
    /// Connection-level error, reported the way sockets do: error then close
    pub fn fail(&self, reason: &str) {
        self.emit(LinkEvent::Failed(reason.to_string()));
        self.emit(LinkEvent::Closed);
    }
    pub fn close(&self) {
        self.emit(LinkEvent::Closed);
    }
    pub fn push(&self, text: &str) {
        self.emit(LinkEvent::Frame(text.to_string()));
    }
    pub fn push_envelope(&self, envelope: &Envelope) {
        self.push(&envelope.encode().expect("encodable envelope"));
    }
    pub fn push_state(&self, scope: &str, data: Value) {
        self.push_envelope(&Envelope::State(StateUpdate {
            scope: scope.to_string(),
            data,
        }));
    }
    pub fn respond(&self, id: &str, data: Value) {
        self.push_envelope(&Envelope::Response(EngineResponse::ok(id, data)));
    }
    /// Everything the client sent since the last call
    pub fn sent(&self) -> Vec<Outbound> {
        self.outbound.try_iter().collect()
    }
    /// Command frames the client sent since the last call
    pub fn sent_commands(&self) -> Vec<CommandFrame> {
        self.sent()
            .into_iter()
            .filter_map(|outbound| match outbound {
                Outbound::Frame(text) => match Envelope::decode(&text) {
                    Ok(Envelope::Command(frame)) => Some(frame),
                    other => panic!("client sent a non command frame: {:?}", other),
                },
                Outbound::Close => None,
            })
            .collect()
    }

    fn emit(&self, event: LinkEvent) {
        let _ = self.events.send(event);
    }
}

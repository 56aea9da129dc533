
use std::{cell::RefCell, rc::Rc};

use log::debug;

use crate::{
    core::transport::{TransportPatch, TransportState},
    engine::{
        client::{EngineClient, InboundMessage, Subscription},
        protocol::TRANSPORT_SCOPE,
    },
};

/// Fold one inbound message into the transport. Returns true when something was applied.
///
/// Transport state pushes are merged field by field. Successful responses
/// whose data looks like transport state count as updates too.
pub fn project(transport: &mut TransportState, message: &InboundMessage) -> bool {
    let data = match message {
        InboundMessage::State(update) if update.scope == TRANSPORT_SCOPE => &update.data,
        InboundMessage::Response(response) if response.success => match &response.data {
            Some(data) => data,
            None => return false,
        },
        _ => return false,
    };
    if !data.is_object() {
        return false;
    }
    match serde_json::from_value::<TransportPatch>(data.clone()) {
        Ok(patch) if !patch.is_empty() => {
            transport.apply(&patch);
            true
        }
        Ok(_) => false,
        Err(err) => {
            debug!("Ignoring non transport payload: {}", err);
            false
        }
    }
}

/// Keeps a local `TransportState` in step with the engine
pub struct StateProjector {
    transport: Rc<RefCell<TransportState>>,
    subscription: Subscription,
}

impl StateProjector {
    pub fn attach(client: &mut EngineClient) -> Self {
        let transport = Rc::new(RefCell::new(TransportState::default()));
        let target = transport.clone();
        let subscription = client.on_message(move |message| {
            project(&mut target.borrow_mut(), message);
        });
        Self {
            transport,
            subscription,
        }
    }

    /// Snapshot of the projected transport
    pub fn transport(&self) -> TransportState {
        *self.transport.borrow()
    }

    pub fn detach(self) {
        self.subscription.unsubscribe();
    }
}

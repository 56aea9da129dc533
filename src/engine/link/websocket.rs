use std::{io::ErrorKind, net::TcpStream, thread, time::Duration};

use crossbeam::channel::{Receiver, Sender, TryRecvError, unbounded};
use log::{debug, warn};
use tungstenite::{Error as WsError, Message, WebSocket, client::IntoClientRequest};

use crate::engine::link::{Connector, Link, LinkEvent, Outbound};

/// How long a read may block before outbound frames get a turn
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connector speaking WebSocket text frames over plain TCP.
/// Each connection runs on its own I/O thread which only forwards events.
pub struct WebSocketConnector {
    poll_interval: Duration,
}

impl Default for WebSocketConnector {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WebSocketConnector {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Connector for WebSocketConnector {
    fn open(&self, url: &str) -> Link {
        let (outbound_tx, outbound_rx) = unbounded();
        let (events_tx, events_rx) = unbounded();
        let url = url.to_string();
        let poll_interval = self.poll_interval;
        let thread_events = events_tx.clone();
        let spawned = thread::Builder::new()
            .name("engine-link".into())
            .spawn(move || run_link(&url, poll_interval, outbound_rx, thread_events));
        if let Err(err) = spawned {
            let _ = events_tx.send(LinkEvent::Failed(err.to_string()));
            let _ = events_tx.send(LinkEvent::Closed);
        }
        Link::new(outbound_tx, events_rx)
    }
}

fn open_socket(url: &str, poll_interval: Duration) -> Result<WebSocket<TcpStream>, String> {
    let request = url.into_client_request().map_err(|e| e.to_string())?;
    let host = request
        .uri()
        .host()
        .ok_or_else(|| format!("no host in '{}'", url))?
        .trim_matches(|c| c == '[' || c == ']')
        .to_string();
    let port = request.uri().port_u16().unwrap_or(80);

    let stream = TcpStream::connect((host.as_str(), port)).map_err(|e| e.to_string())?;
    stream.set_nodelay(true).map_err(|e| e.to_string())?;
    stream
        .set_read_timeout(Some(HANDSHAKE_TIMEOUT))
        .map_err(|e| e.to_string())?;

    let (socket, _) = tungstenite::client(request, stream).map_err(|e| e.to_string())?;
    socket
        .get_ref()
        .set_read_timeout(Some(poll_interval))
        .map_err(|e| e.to_string())?;
    Ok(socket)
}

fn run_link(
    url: &str,
    poll_interval: Duration,
    outbound: Receiver<Outbound>,
    events: Sender<LinkEvent>,
) {
    let mut socket = match open_socket(url, poll_interval) {
        Ok(socket) => socket,
        Err(err) => {
            let _ = events.send(LinkEvent::Failed(err));
            let _ = events.send(LinkEvent::Closed);
            return;
        }
    };
    let _ = events.send(LinkEvent::Opened);

    loop {
        // Outbound first, then block on read for at most one poll interval
        loop {
            match outbound.try_recv() {
                Ok(Outbound::Frame(text)) => {
                    if let Err(err) = socket.send(Message::Text(text)) {
                        warn!("Failed to send frame to engine: {}", err);
                        let _ = events.send(LinkEvent::Closed);
                        return;
                    }
                }
                Ok(Outbound::Close) | Err(TryRecvError::Disconnected) => {
                    let _ = socket.close(None);
                    let _ = socket.flush();
                    let _ = events.send(LinkEvent::Closed);
                    return;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                let _ = events.send(LinkEvent::Frame(text));
            }
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => {
                    let _ = events.send(LinkEvent::Frame(text));
                }
                Err(_) => warn!("Dropping non UTF-8 binary frame from engine"),
            },
            Ok(Message::Close(_)) => debug!("Engine started closing the connection"),
            Ok(_) => {}
            Err(WsError::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                let _ = events.send(LinkEvent::Closed);
                return;
            }
            Err(err) => {
                warn!("Engine connection dropped: {}", err);
                let _ = events.send(LinkEvent::Closed);
                return;
            }
        }
    }
}

//! Outbound message transports
//!
//! Every transport is blocking: a send returns once the message has been
//! handed to the OS. There is no timeout and no reconnect; a failed send is
//! reported to the caller and the connection is left as is.

use crate::error::{BridgeError, BridgeResult};
use std::net::{SocketAddr, TcpStream, UdpSocket};
use tracing::{debug, info};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

/// Default rosbridge websocket endpoint
pub const DEFAULT_ROSBRIDGE_URL: &str = "ws://localhost:9090";

/// Default target for the Unity frame receiver
pub const DEFAULT_UDP_TARGET: &str = "127.0.0.1:8080";

/// Text message sink
pub trait MessageTransport {
    /// Send one complete message
    fn send_text(&mut self, text: &str) -> BridgeResult<()>;

    /// Close the connection. Calling it again is a no-op.
    fn close(&mut self) -> BridgeResult<()>;

    /// Endpoint description for logs
    fn describe(&self) -> String;
}

impl<T: MessageTransport + ?Sized> MessageTransport for Box<T> {
    fn send_text(&mut self, text: &str) -> BridgeResult<()> {
        (**self).send_text(text)
    }

    fn close(&mut self) -> BridgeResult<()> {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Persistent websocket client, one text frame per message
pub struct WebSocketTransport {
    url: String,
    socket: Option<WebSocket<MaybeTlsStream<TcpStream>>>,
}

impl WebSocketTransport {
    /// Open the websocket (blocking handshake)
    pub fn connect(url: &str) -> BridgeResult<Self> {
        let (socket, response) =
            tungstenite::connect(url).map_err(|e| BridgeError::transport(url, e))?;
        info!("Connected to {} (HTTP {})", url, response.status());

        Ok(Self {
            url: url.to_string(),
            socket: Some(socket),
        })
    }
}

impl MessageTransport for WebSocketTransport {
    fn send_text(&mut self, text: &str) -> BridgeResult<()> {
        let socket = self.socket.as_mut().ok_or_else(|| {
            BridgeError::transport(self.url.as_str(), "connection already closed")
        })?;
        socket
            .send(Message::text(text))
            .map_err(|e| BridgeError::transport(self.url.as_str(), e))
    }

    fn close(&mut self) -> BridgeResult<()> {
        let Some(mut socket) = self.socket.take() else {
            return Ok(());
        };

        socket
            .close(None)
            .map_err(|e| BridgeError::transport(self.url.as_str(), e))?;
        if let Err(e) = socket.flush() {
            debug!("Flush after close on {} failed: {}", self.url, e);
        }
        info!("Closed connection to {}", self.url);
        Ok(())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            debug!("{}", e);
        }
    }
}

/// One datagram per message to a fixed target
///
/// The socket stays unconnected so an ICMP port-unreachable from a receiver
/// that is not up yet does not surface as an error on later sends.
pub struct UdpTransport {
    target: SocketAddr,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    pub fn connect(target: &str) -> BridgeResult<Self> {
        let target: SocketAddr = target
            .parse()
            .map_err(|e| BridgeError::transport(target, format!("invalid address: {}", e)))?;

        let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).map_err(|e| {
            BridgeError::transport(target.to_string(), format!("bind failed: {}", e))
        })?;
        info!("Sending UDP frames to {}", target);

        Ok(Self {
            target,
            socket: Some(socket),
        })
    }
}

impl MessageTransport for UdpTransport {
    fn send_text(&mut self, text: &str) -> BridgeResult<()> {
        let socket = self.socket.as_ref().ok_or_else(|| {
            BridgeError::transport(self.target.to_string(), "socket already closed")
        })?;
        socket
            .send_to(text.as_bytes(), self.target)
            .map_err(|e| BridgeError::transport(self.target.to_string(), e))?;
        Ok(())
    }

    fn close(&mut self) -> BridgeResult<()> {
        if self.socket.take().is_some() {
            info!("Closed UDP socket for {}", self.target);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("udp://{}", self.target)
    }
}

//! Delivery seam between the core and the wire
//!
//! The core never touches sockets. Every session is handed in with a
//! [`Transport`], and the broadcast engine calls [`Transport::deliver`] for
//! each recipient. The trait is object-safe so tests can inject failing
//! transports and the registry can hold heterogeneous connections.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::protocol::ServerEvent;

/// Error delivering an event to one recipient
///
/// Delivery failures are terminal for the recipient's session: the broadcast
/// engine treats them as an implicit disconnect. They are never surfaced to
/// the sender or to other recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The receiving side of the transport is gone.
    Closed,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Closed => write!(f, "transport closed by peer"),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// An already-open, outbound-capable channel to one connected participant
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one event to the peer.
    ///
    /// Must not block other sessions; awaiting backpressure on this
    /// recipient's own buffer is fine.
    async fn deliver(&self, event: ServerEvent) -> Result<(), DeliveryError>;
}

/// [`Transport`] backed by a bounded `tokio::sync::mpsc` channel
///
/// The collaborator owns the receiving half and drains it into the actual
/// socket. Dropping the receiver makes every subsequent delivery fail with
/// [`DeliveryError::Closed`], which is how socket death propagates back into
/// the core.
pub struct ChannelTransport {
    tx: mpsc::Sender<ServerEvent>,
}

impl ChannelTransport {
    /// Create a transport and the receiver the collaborator drains.
    pub fn channel(capacity: usize) -> (Arc<Self>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn deliver(&self, event: ServerEvent) -> Result<(), DeliveryError> {
        self.tx.send(event).await.map_err(|_| DeliveryError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_transport_delivers() {
        let (transport, mut rx) = ChannelTransport::channel(4);

        transport.deliver(ServerEvent::error("oops")).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event, ServerEvent::error("oops"));
    }

    #[tokio::test]
    async fn test_dropped_receiver_fails_delivery() {
        let (transport, rx) = ChannelTransport::channel(4);
        drop(rx);

        let result = transport.deliver(ServerEvent::error("oops")).await;
        assert_eq!(result, Err(DeliveryError::Closed));
    }
}

//! Tokio channel-based transport for single-process mode
//!
//! Requests and events are passed directly, with no serialization. A peer
//! adapter (or a test double) owns the far ends of both channels.

use relay_ports::{OutboundRequest, Transport, TransportError, TransportResult};
use tokio::sync::mpsc;

use crate::messages::Event;

/// Outbound side: requests from the request components to the peer
#[derive(Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<OutboundRequest>,
}

impl ChannelTransport {
    /// Create a transport and the receiver the peer adapter drains
    pub fn pair() -> (Self, OutboundReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, OutboundReceiver { rx })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Transport for ChannelTransport {
    fn send(&self, request: OutboundRequest) -> TransportResult<()> {
        self.tx
            .send(request)
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn name(&self) -> &str {
        "ChannelTransport"
    }
}

/// Peer side of [`ChannelTransport`]
pub struct OutboundReceiver {
    rx: mpsc::UnboundedReceiver<OutboundRequest>,
}

impl OutboundReceiver {
    /// Wait for the next request
    pub async fn next(&mut self) -> Option<OutboundRequest> {
        self.rx.recv().await
    }

    /// Block the current (non-async) thread for the next request
    pub fn blocking_next(&mut self) -> Option<OutboundRequest> {
        self.rx.blocking_recv()
    }

    /// Try to receive without blocking (returns None if nothing is queued)
    pub fn try_next(&mut self) -> Result<Option<OutboundRequest>, TransportError> {
        match self.rx.try_recv() {
            Ok(request) => Ok(Some(request)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TransportError::ChannelClosed),
        }
    }
}

/// Create the inbound event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Peer side of the inbound channel
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    pub fn send(&self, event: Event) -> TransportResult<()> {
        self.tx
            .send(event)
            .map_err(|_| TransportError::ChannelClosed)
    }
}

/// Delivery side of the inbound channel
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventReceiver {
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Block the current (non-async) thread for the next event.
    ///
    /// Returns None once every sender is dropped and the queue is drained.
    pub fn blocking_next(&mut self) -> Option<Event> {
        self.rx.blocking_recv()
    }

    pub fn try_next(&mut self) -> Result<Option<Event>, TransportError> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TransportError::ChannelClosed),
        }
    }

    /// Stop accepting new events; queued ones can still be drained
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_and_receive_request() {
        let (transport, mut receiver) = ChannelTransport::pair();

        transport.send(OutboundRequest::RequestIds { count: 1 }).unwrap();
        transport.send(OutboundRequest::GlobalCancel).unwrap();

        assert_eq!(
            receiver.try_next().unwrap(),
            Some(OutboundRequest::RequestIds { count: 1 })
        );
        assert_eq!(receiver.blocking_next(), Some(OutboundRequest::GlobalCancel));
        assert_eq!(receiver.try_next().unwrap(), None);
    }

    #[test]
    fn test_send_after_peer_dropped() {
        let (transport, receiver) = ChannelTransport::pair();
        drop(receiver);

        assert!(transport.is_closed());
        assert_eq!(
            transport.send(OutboundRequest::RequestCurrentTime),
            Err(TransportError::ChannelClosed)
        );
    }

    #[tokio::test]
    async fn test_event_channel() {
        let (sender, mut receiver) = event_channel();

        sender.send(Event::ConnectAck).unwrap();
        assert_eq!(receiver.next().await, Some(Event::ConnectAck));

        drop(sender);
        assert_eq!(receiver.next().await, None);
        assert!(receiver.try_next().is_err());
    }
}

use thiserror::Error;

/// Errors raised while handing a request to the peer connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Not connected to peer")]
    NotConnected,

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Channel closed")]
    ChannelClosed,
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

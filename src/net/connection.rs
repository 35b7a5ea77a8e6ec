// WebSocket connection to the aircraft feed
// Wraps one socket and turns frames into feed-level events

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::{DecodeError, FeedError};

/// What the socket produced next
#[derive(Debug)]
pub enum Inbound {
    /// Application payload (text frame, or binary frame decoded as UTF-8)
    Payload(Result<String, DecodeError>),
    /// Peer sent a close frame or the stream ended
    Closed,
    /// Transport failure; the socket is unusable afterwards
    Error(tungstenite::Error),
}

/// A single open feed connection
pub struct FeedConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    url: String,
}

impl FeedConnection {
    /// Open a connection to `url` (ws:// or wss://)
    pub async fn open(url: &str) -> Result<Self, FeedError> {
        let (stream, response) = connect_async(url).await?;
        debug!("Feed handshake complete: HTTP {}", response.status());
        Ok(FeedConnection {
            stream,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait for the next application-level event.
    ///
    /// Control frames are consumed here; the transport answers pings itself.
    pub async fn next_inbound(&mut self) -> Inbound {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Inbound::Payload(Ok(text)),
                Some(Ok(Message::Binary(bytes))) => {
                    return Inbound::Payload(String::from_utf8(bytes).map_err(DecodeError::from))
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!("Close frame received: {:?}", frame);
                    return Inbound::Closed;
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {
                    continue
                }
                Some(Err(e)) => return Inbound::Error(e),
                None => return Inbound::Closed,
            }
        }
    }

    /// Close the socket politely
    pub async fn close(mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Error while closing feed connection: {}", e);
        }
    }
}

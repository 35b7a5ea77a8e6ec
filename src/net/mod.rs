// Network layer module
// WebSocket feed connection, message decoding and reconnect policy

pub mod backoff;
pub mod connection;
pub mod feed_client;
pub mod messages;

pub use backoff::ReconnectPolicy;
pub use connection::{FeedConnection, Inbound};
pub use feed_client::{ConnectionState, FeedClient, FeedStatus};
pub use messages::FeedMessage;

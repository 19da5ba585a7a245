pub mod client;
pub mod normalize;
pub mod transport;

pub use client::{CallContext, DelayFn, RemoteClient};
pub use normalize::{normalize, RemoteResponse, TokenUsage};
pub use transport::{HttpTransport, RemoteTransport, TransportReply};

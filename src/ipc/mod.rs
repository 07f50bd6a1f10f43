//! Control channel and wire protocol
//!
//! A SOCK_SEQPACKET unix socket carries fixed-size request/response records;
//! the transport itself preserves message boundaries, so there is no length
//! prefix and no fragmentation handling. One accepted peer per bot lifetime.

pub mod channel;
pub mod protocol;

pub use channel::ControlChannel;
pub use protocol::{Request, Response, REQUEST_BYTES, RESPONSE_BYTES};

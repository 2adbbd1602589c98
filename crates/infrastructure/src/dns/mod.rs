pub mod client;
pub mod transport;
pub mod wire;

pub use client::{DnsClient, SendOptions};
pub use transport::{DatagramTransport, UdpTransport};
pub use wire::{decode_message, encode_message, encode_message_with, EncodeOptions};

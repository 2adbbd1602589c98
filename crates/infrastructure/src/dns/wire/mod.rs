//! DNS wire format (RFC 1035 §4).

pub mod cursor;
pub mod message;
pub mod name;
pub mod rdata;

pub use cursor::{WireReader, WireWriter};
pub use message::{decode_message, encode_message, encode_message_with, EncodeOptions, HEADER_LEN};
pub use name::{read_name, write_name, CompressionTable, MAX_LABEL_LEN, MAX_NAME_LEN};
pub use rdata::{decode_rdata, decoder_for, encode_rdata, is_registered, RDataDecoder};

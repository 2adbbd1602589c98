//! wiredns Domain Layer
//!
//! Plain data types for DNS messages, the error type shared by every layer,
//! and client configuration. Nothing in this crate performs I/O except
//! configuration file loading.
pub mod config;
pub mod dns_message;
pub mod dns_record;
pub mod errors;

pub use config::{CliOverrides, ClientConfig, Config, ConfigError, LogFormat, LoggingConfig};
pub use dns_message::{Flags, Message, Question, ResponseCode};
pub use dns_record::{RData, RecordType, ResourceRecord, Soa, CLASS_IN, MAX_TTL};
pub use errors::DomainError;

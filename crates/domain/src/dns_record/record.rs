use super::{RData, RecordType};
use std::fmt;

/// The Internet class.
pub const CLASS_IN: u16 = 1;

/// Largest TTL that survives the signed 32-bit wire field (RFC 2181 §8).
pub const MAX_TTL: u32 = i32::MAX as u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,

    pub class: u16,

    /// Seconds. Never negative: the decoder clamps negative wire values to 0.
    pub ttl: u32,

    pub data: RData,
}

impl ResourceRecord {
    pub fn new(name: impl Into<String>, ttl: u32, data: RData) -> Self {
        Self {
            name: name.into(),
            class: CLASS_IN,
            ttl,
            data,
        }
    }

    pub fn with_class(mut self, class: u16) -> Self {
        self.class = class;
        self
    }

    /// Type code, derived from the payload variant.
    pub fn rtype(&self) -> u16 {
        self.data.type_code()
    }

    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.rtype())
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = if self.class == CLASS_IN {
            "IN".to_string()
        } else {
            format!("CLASS{}", self.class)
        };
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name,
            self.ttl,
            class,
            RecordType::name_of(self.rtype()),
            self.data
        )
    }
}

use crate::dns_record::{RecordType, ResourceRecord, CLASS_IN};
use std::fmt;

/// Header flag bits (RFC 1035 §4.1.1), unpacked.
///
/// The three reserved `Z` bits are not represented: they are always written
/// as zero and ignored on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub response: bool,
    /// 4-bit opcode; higher bits are masked off when encoding.
    pub opcode: u8,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    /// 4-bit response code; higher bits are masked off when encoding.
    pub rcode: u8,
}

impl Flags {
    pub fn to_u16(&self) -> u16 {
        let mut bits = 0u16;
        if self.response {
            bits |= 0x8000;
        }
        bits |= u16::from(self.opcode & 0x0F) << 11;
        if self.authoritative {
            bits |= 0x0400;
        }
        if self.truncated {
            bits |= 0x0200;
        }
        if self.recursion_desired {
            bits |= 0x0100;
        }
        if self.recursion_available {
            bits |= 0x0080;
        }
        bits | u16::from(self.rcode & 0x0F)
    }

    pub fn from_u16(bits: u16) -> Self {
        Self {
            response: bits & 0x8000 != 0,
            opcode: ((bits >> 11) & 0x0F) as u8,
            authoritative: bits & 0x0400 != 0,
            truncated: bits & 0x0200 != 0,
            recursion_desired: bits & 0x0100 != 0,
            recursion_available: bits & 0x0080 != 0,
            rcode: (bits & 0x0F) as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

impl Question {
    pub fn new(name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            qtype: record_type.to_u16(),
            qclass: CLASS_IN,
        }
    }
}

/// A complete DNS message.
///
/// Section counts are not stored: they are the lengths of the four vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub id: u16,
    pub flags: Flags,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl Message {
    /// A standard recursive query with a single question.
    ///
    /// The id is left at 0; the client assigns one when the query is sent.
    pub fn query(name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            flags: Flags {
                recursion_desired: true,
                ..Flags::default()
            },
            questions: vec![Question::new(name, record_type)],
            ..Self::default()
        }
    }

    pub fn is_response(&self) -> bool {
        self.flags.response
    }

    pub fn response_code(&self) -> ResponseCode {
        ResponseCode::from_u8(self.flags.rcode)
    }

    /// All records of the answer, authority and additional sections in order.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(self.authorities.iter())
            .chain(self.additionals.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,
    Unknown(u8),
}

impl ResponseCode {
    pub fn from_u8(code: u8) -> Self {
        match code & 0x0F {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NXDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            other => ResponseCode::Unknown(other),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NXDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Unknown(code) => *code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Unknown(code) => write!(f, "RCODE{}", code),
            known => f.write_str(known.as_str()),
        }
    }
}

use super::RecordType;
use crate::errors::DomainError;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Start of authority payload (RFC 1035 §3.3.13).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soa {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: i32,
}

/// Type-specific payload of a resource record.
///
/// The variant determines the record's type code. Codes without a
/// structured variant are carried as [`RData::Raw`], which keeps both the
/// code and the exact payload bytes so the record re-encodes unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    NS(String),
    CNAME(String),
    SOA(Soa),
    PTR(String),
    MX { preference: u16, exchange: String },
    /// One or more character-strings, each at most 255 bytes.
    TXT(Vec<Vec<u8>>),
    AAAA(Ipv6Addr),
    Raw { rtype: u16, data: Vec<u8> },
}

impl RData {
    /// Parses dotted-decimal text into an A payload.
    pub fn a(text: &str) -> Result<Self, DomainError> {
        text.parse::<Ipv4Addr>()
            .map(RData::A)
            .map_err(|_| DomainError::InvalidIpAddress(text.to_string()))
    }

    /// Parses IPv6 text (any RFC 4291 form) into an AAAA payload.
    pub fn aaaa(text: &str) -> Result<Self, DomainError> {
        text.parse::<Ipv6Addr>()
            .map(RData::AAAA)
            .map_err(|_| DomainError::InvalidIpAddress(text.to_string()))
    }

    pub fn txt(text: impl Into<Vec<u8>>) -> Self {
        RData::TXT(vec![text.into()])
    }

    pub fn type_code(&self) -> u16 {
        match self {
            RData::A(_) => RecordType::A.to_u16(),
            RData::NS(_) => RecordType::NS.to_u16(),
            RData::CNAME(_) => RecordType::CNAME.to_u16(),
            RData::SOA(_) => RecordType::SOA.to_u16(),
            RData::PTR(_) => RecordType::PTR.to_u16(),
            RData::MX { .. } => RecordType::MX.to_u16(),
            RData::TXT(_) => RecordType::TXT.to_u16(),
            RData::AAAA(_) => RecordType::AAAA.to_u16(),
            RData::Raw { rtype, .. } => *rtype,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, RData::Raw { .. })
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for &b in bytes {
        match b {
            b'"' | b'\\' => write!(f, "\\{}", b as char)?,
            0x20..=0x7e => write!(f, "{}", b as char)?,
            _ => write!(f, "\\{:03}", b)?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{}", addr),
            RData::AAAA(addr) => {
                let s = addr.segments();
                write!(
                    f,
                    "{:x}:{:x}:{:x}:{:x}:{:x}:{:x}:{:x}:{:x}",
                    s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]
                )
            }
            RData::NS(name) | RData::CNAME(name) | RData::PTR(name) => write!(f, "{}", name),
            RData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RData::SOA(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            RData::TXT(strings) => {
                for (i, s) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_quoted(f, s)?;
                }
                Ok(())
            }
            // RFC 3597 generic encoding
            RData::Raw { data, .. } => {
                write!(f, "\\# {}", data.len())?;
                if !data.is_empty() {
                    f.write_str(" ")?;
                    for b in data {
                        write!(f, "{:02x}", b)?;
                    }
                }
                Ok(())
            }
        }
    }
}

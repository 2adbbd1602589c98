//! Domain name encoding with message compression (RFC 1035 §4.1.4).
//!
//! Names are handled in presentation form: labels joined by `.`, with `\.`,
//! `\\` and `\DDD` escapes for bytes that would otherwise be ambiguous or
//! unprintable. Encoding requires every byte outside printable ASCII to be
//! escaped, and decoding always produces that form, so any label bytes
//! survive a decode/encode cycle.

use super::cursor::{WireReader, WireWriter};
use std::collections::HashMap;
use wiredns_domain::DomainError;

pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_NAME_LEN: usize = 255;

const POINTER_TAG: u8 = 0xC0;
const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// Suffix → offset map for a single message serialization.
///
/// Keys are the exact presentation text of each written suffix. Suffixes
/// written past offset `0x3FFF` are not recorded since a pointer cannot
/// reach them.
#[derive(Debug)]
pub struct CompressionTable {
    offsets: HashMap<String, u16>,
    enabled: bool,
}

impl CompressionTable {
    pub fn new() -> Self {
        Self {
            offsets: HashMap::new(),
            enabled: true,
        }
    }

    /// A table that never records anything: every name is written in full.
    pub fn disabled() -> Self {
        Self {
            offsets: HashMap::new(),
            enabled: false,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.offsets.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    fn lookup(&self, suffix: &str) -> Option<u16> {
        self.offsets.get(suffix).copied()
    }

    fn record(&mut self, suffix: &str, offset: usize) {
        if !self.enabled || offset > MAX_POINTER_OFFSET {
            return;
        }
        self.offsets
            .entry(suffix.to_string())
            .or_insert(offset as u16);
    }
}

impl Default for CompressionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One parsed label: its raw bytes and where it starts in the name text.
struct Label {
    start: usize,
    bytes: Vec<u8>,
}

fn invalid(name: &str, reason: &str) -> DomainError {
    DomainError::InvalidDomainName(format!("{:?}: {}", name, reason))
}

/// Splits presentation text into labels. Returns the labels and the end of
/// the last label in `name` (a trailing root dot is not part of any suffix).
fn parse_labels(name: &str) -> Result<(Vec<Label>, usize), DomainError> {
    if name.is_empty() || name == "." {
        return Ok((Vec::new(), 0));
    }

    let text = name.as_bytes();
    let mut labels = Vec::new();
    let mut current = Vec::new();
    let mut start = 0;
    let mut end = 0;
    let mut i = 0;

    while i < text.len() {
        match text[i] {
            b'.' => {
                if current.is_empty() {
                    return Err(invalid(name, "empty label"));
                }
                labels.push(Label {
                    start,
                    bytes: std::mem::take(&mut current),
                });
                end = i;
                i += 1;
                start = i;
                continue;
            }
            b'\\' => match text.get(i + 1..i + 4) {
                Some(digits) if digits.iter().all(u8::is_ascii_digit) => {
                    let value = digits
                        .iter()
                        .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
                    let byte = u8::try_from(value)
                        .map_err(|_| invalid(name, "escape value above 255"))?;
                    current.push(byte);
                    i += 4;
                }
                _ => {
                    let escaped = text
                        .get(i + 1)
                        .ok_or_else(|| invalid(name, "dangling escape"))?;
                    current.push(*escaped);
                    i += 2;
                }
            },
            byte @ 0x21..=0x7e => {
                current.push(byte);
                i += 1;
            }
            byte => {
                return Err(invalid(
                    name,
                    &format!("byte 0x{:02x} must be written as a \\DDD escape", byte),
                ));
            }
        }

        if current.len() > MAX_LABEL_LEN {
            return Err(invalid(name, "label longer than 63 bytes"));
        }
    }

    if !current.is_empty() {
        labels.push(Label {
            start,
            bytes: current,
        });
        end = text.len();
    }

    let wire_len: usize = labels.iter().map(|l| l.bytes.len() + 1).sum::<usize>() + 1;
    if wire_len > MAX_NAME_LEN {
        return Err(invalid(name, "name longer than 255 bytes"));
    }

    Ok((labels, end))
}

/// Writes `name`, replacing the longest already-written suffix with a
/// pointer.
pub fn write_name(
    writer: &mut WireWriter,
    table: &mut CompressionTable,
    name: &str,
) -> Result<(), DomainError> {
    let (labels, end) = parse_labels(name)?;

    for label in &labels {
        let suffix = &name[label.start..end];
        if let Some(offset) = table.lookup(suffix) {
            writer.write_u16(u16::from(POINTER_TAG) << 8 | offset);
            return Ok(());
        }
        table.record(suffix, writer.position());
        writer.write_u8(label.bytes.len() as u8);
        writer.write_bytes(&label.bytes);
    }

    writer.write_u8(0);
    Ok(())
}

fn push_escaped(out: &mut String, label: &[u8]) {
    for &b in label {
        match b {
            b'.' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x21..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:03}", b)),
        }
    }
}

fn malformed(reason: String) -> DomainError {
    DomainError::MalformedPacket(reason)
}

/// Reads a possibly compressed name at the cursor.
///
/// Every pointer must land strictly before the segment it was found in, so
/// each jump moves backwards and decoding always terminates. The cursor ends
/// just past the first pointer, or past the terminating zero octet when the
/// name had no pointer.
pub fn read_name(reader: &mut WireReader<'_>) -> Result<String, DomainError> {
    let buf = reader.buffer();
    let mut pos = reader.position();
    let mut floor = pos;
    let mut resume = None;
    let mut wire_len = 1;
    let mut name = String::new();

    loop {
        let len = *buf
            .get(pos)
            .ok_or_else(|| malformed(format!("name runs past end of packet at offset {}", pos)))?;

        match len & POINTER_TAG {
            0x00 if len == 0 => {
                pos += 1;
                break;
            }
            0x00 => {
                let start = pos + 1;
                let label = buf
                    .get(start..start + len as usize)
                    .ok_or_else(|| malformed(format!("label at offset {} is truncated", pos)))?;
                wire_len += label.len() + 1;
                if wire_len > MAX_NAME_LEN {
                    return Err(malformed(format!(
                        "name at offset {} exceeds 255 bytes",
                        reader.position()
                    )));
                }
                if !name.is_empty() {
                    name.push('.');
                }
                push_escaped(&mut name, label);
                pos = start + label.len();
            }
            POINTER_TAG => {
                let low = *buf.get(pos + 1).ok_or_else(|| {
                    malformed(format!("compression pointer at offset {} is truncated", pos))
                })?;
                let target = usize::from(len & !POINTER_TAG) << 8 | usize::from(low);
                if target >= floor {
                    return Err(malformed(format!(
                        "compression pointer at offset {} to {} does not point backwards",
                        pos, target
                    )));
                }
                resume.get_or_insert(pos + 2);
                floor = target;
                pos = target;
            }
            other => {
                return Err(malformed(format!(
                    "invalid label type 0x{:02x} at offset {}",
                    other, pos
                )));
            }
        }
    }

    reader.seek(resume.unwrap_or(pos))?;
    Ok(name)
}

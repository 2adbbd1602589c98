//! Whole-message framing: header, section counts and the four sections.

use super::cursor::{WireReader, WireWriter};
use super::name::{read_name, write_name, CompressionTable};
use super::rdata::{decode_rdata, encode_rdata};
use wiredns_domain::{DomainError, Flags, Message, Question, ResourceRecord, MAX_TTL};

pub const HEADER_LEN: usize = 12;

/// Smallest possible question or record: root name plus fixed fields.
const MIN_QUESTION_LEN: usize = 5;
const MIN_RECORD_LEN: usize = 11;

#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// Replace repeated name suffixes with pointers.
    pub compress: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

pub fn encode_message(message: &Message) -> Result<Vec<u8>, DomainError> {
    encode_message_with(message, EncodeOptions::default())
}

pub fn encode_message_with(
    message: &Message,
    options: EncodeOptions,
) -> Result<Vec<u8>, DomainError> {
    let mut writer = WireWriter::with_capacity(512);
    let mut table = if options.compress {
        CompressionTable::new()
    } else {
        CompressionTable::disabled()
    };

    writer.write_u16(message.id);
    writer.write_u16(message.flags.to_u16());
    writer.write_u16(section_count("question", message.questions.len())?);
    writer.write_u16(section_count("answer", message.answers.len())?);
    writer.write_u16(section_count("authority", message.authorities.len())?);
    writer.write_u16(section_count("additional", message.additionals.len())?);

    for question in &message.questions {
        write_question(&mut writer, &mut table, question)?;
    }
    for record in message.records() {
        write_record(&mut writer, &mut table, record)?;
    }

    Ok(writer.into_bytes())
}

fn section_count(section: &str, len: usize) -> Result<u16, DomainError> {
    u16::try_from(len).map_err(|_| {
        DomainError::InvalidRecord(format!("{} {} entries do not fit a 16-bit count", len, section))
    })
}

pub fn write_question(
    writer: &mut WireWriter,
    table: &mut CompressionTable,
    question: &Question,
) -> Result<(), DomainError> {
    write_name(writer, table, &question.name)?;
    writer.write_u16(question.qtype);
    writer.write_u16(question.qclass);
    Ok(())
}

/// Writes one record, backpatching rdlength once the payload size is known.
pub fn write_record(
    writer: &mut WireWriter,
    table: &mut CompressionTable,
    record: &ResourceRecord,
) -> Result<(), DomainError> {
    write_name(writer, table, &record.name)?;
    writer.write_u16(record.rtype());
    writer.write_u16(record.class);
    writer.write_u32(record.ttl.min(MAX_TTL));

    let length_at = writer.position();
    writer.write_u16(0);
    encode_rdata(writer, table, &record.data)?;

    let rdlength = writer.position() - length_at - 2;
    let rdlength = u16::try_from(rdlength).map_err(|_| {
        DomainError::InvalidRecord(format!(
            "payload of {} bytes for {} exceeds 65535",
            rdlength, record.name
        ))
    })?;
    writer.patch_u16(length_at, rdlength)
}

pub fn decode_message(bytes: &[u8]) -> Result<Message, DomainError> {
    if bytes.len() < HEADER_LEN {
        return Err(DomainError::MalformedPacket(format!(
            "packet of {} bytes is shorter than the {}-byte header",
            bytes.len(),
            HEADER_LEN
        )));
    }

    let mut reader = WireReader::new(bytes);
    let id = reader.read_u16()?;
    let flags = Flags::from_u16(reader.read_u16()?);
    let qdcount = reader.read_u16()?;
    let ancount = reader.read_u16()?;
    let nscount = reader.read_u16()?;
    let arcount = reader.read_u16()?;

    let mut questions = Vec::with_capacity(capacity(qdcount, &reader, MIN_QUESTION_LEN));
    for _ in 0..qdcount {
        questions.push(read_question(&mut reader)?);
    }

    let answers = read_records(&mut reader, ancount)?;
    let authorities = read_records(&mut reader, nscount)?;
    let additionals = read_records(&mut reader, arcount)?;

    Ok(Message {
        id,
        flags,
        questions,
        answers,
        authorities,
        additionals,
    })
}

/// Reserves the declared count, but never more than the remaining bytes
/// could possibly hold.
fn capacity(count: u16, reader: &WireReader<'_>, min_len: usize) -> usize {
    usize::from(count).min(reader.remaining() / min_len)
}

pub fn read_question(reader: &mut WireReader<'_>) -> Result<Question, DomainError> {
    Ok(Question {
        name: read_name(reader)?,
        qtype: reader.read_u16()?,
        qclass: reader.read_u16()?,
    })
}

fn read_records(
    reader: &mut WireReader<'_>,
    count: u16,
) -> Result<Vec<ResourceRecord>, DomainError> {
    let mut records = Vec::with_capacity(capacity(count, reader, MIN_RECORD_LEN));
    for _ in 0..count {
        records.push(read_record(reader)?);
    }
    Ok(records)
}

pub fn read_record(reader: &mut WireReader<'_>) -> Result<ResourceRecord, DomainError> {
    let name = read_name(reader)?;
    let rtype = reader.read_u16()?;
    let class = reader.read_u16()?;
    // RFC 2181 §8: negative TTLs are treated as zero
    let ttl = u32::try_from(reader.read_i32()?).unwrap_or(0);
    let rdlength = usize::from(reader.read_u16()?);
    let data = decode_rdata(reader, rtype, rdlength)?;

    Ok(ResourceRecord {
        name,
        class,
        ttl,
        data,
    })
}

//! Per-type payload codecs and the decode-time type registry.

use super::cursor::{WireReader, WireWriter};
use super::name::{read_name, write_name, CompressionTable};
use std::net::{Ipv4Addr, Ipv6Addr};
use wiredns_domain::{DomainError, RData, RecordType, Soa};

/// Decodes one payload whose bytes start at the cursor. The declared
/// rdlength is passed in; the caller verifies it was consumed exactly.
pub type RDataDecoder = fn(&mut WireReader<'_>, u16, usize) -> Result<RData, DomainError>;

/// Type code → payload decoder. Codes without a structured variant map to
/// the opaque decoder, which keeps the payload bytes verbatim.
pub fn decoder_for(rtype: u16) -> RDataDecoder {
    match RecordType::from_u16(rtype) {
        Some(RecordType::A) => decode_a,
        Some(RecordType::NS) => decode_ns,
        Some(RecordType::CNAME) => decode_cname,
        Some(RecordType::SOA) => decode_soa,
        Some(RecordType::PTR) => decode_ptr,
        Some(RecordType::MX) => decode_mx,
        Some(RecordType::TXT) => decode_txt,
        Some(RecordType::AAAA) => decode_aaaa,
        _ => decode_raw,
    }
}

/// Codes that decode to a structured variant. An opaque payload carrying
/// one of these would come back as that variant, so it cannot be encoded.
pub fn is_registered(rtype: u16) -> bool {
    matches!(
        RecordType::from_u16(rtype),
        Some(
            RecordType::A
                | RecordType::NS
                | RecordType::CNAME
                | RecordType::SOA
                | RecordType::PTR
                | RecordType::MX
                | RecordType::TXT
                | RecordType::AAAA
        )
    )
}

/// Decodes a payload of `rdlength` bytes and checks that the type's decoder
/// consumed exactly that many.
pub fn decode_rdata(
    reader: &mut WireReader<'_>,
    rtype: u16,
    rdlength: usize,
) -> Result<RData, DomainError> {
    if rdlength > reader.remaining() {
        return Err(DomainError::MalformedPacket(format!(
            "{} record declares {} payload bytes but only {} remain",
            RecordType::name_of(rtype),
            rdlength,
            reader.remaining()
        )));
    }

    let start = reader.position();
    let data = decoder_for(rtype)(reader, rtype, rdlength)?;
    let consumed = reader.position() - start;

    if consumed != rdlength {
        return Err(DomainError::MalformedPacket(format!(
            "invalid {} record: rdlength is {} but payload used {} bytes",
            RecordType::name_of(rtype),
            rdlength,
            consumed
        )));
    }
    Ok(data)
}

fn expect_len(rtype: u16, rdlength: usize, expected: usize) -> Result<(), DomainError> {
    if rdlength != expected {
        return Err(DomainError::MalformedPacket(format!(
            "invalid {} record: rdlength {} (expected {})",
            RecordType::name_of(rtype),
            rdlength,
            expected
        )));
    }
    Ok(())
}

fn decode_a(reader: &mut WireReader<'_>, rtype: u16, rdlength: usize) -> Result<RData, DomainError> {
    expect_len(rtype, rdlength, 4)?;
    let octets: [u8; 4] = reader
        .read_bytes(4)?
        .try_into()
        .map_err(|_| DomainError::MalformedPacket("short A record".to_string()))?;
    Ok(RData::A(Ipv4Addr::from(octets)))
}

fn decode_aaaa(
    reader: &mut WireReader<'_>,
    rtype: u16,
    rdlength: usize,
) -> Result<RData, DomainError> {
    expect_len(rtype, rdlength, 16)?;
    let octets: [u8; 16] = reader
        .read_bytes(16)?
        .try_into()
        .map_err(|_| DomainError::MalformedPacket("short AAAA record".to_string()))?;
    Ok(RData::AAAA(Ipv6Addr::from(octets)))
}

fn decode_ns(reader: &mut WireReader<'_>, _: u16, _: usize) -> Result<RData, DomainError> {
    read_name(reader).map(RData::NS)
}

fn decode_cname(reader: &mut WireReader<'_>, _: u16, _: usize) -> Result<RData, DomainError> {
    read_name(reader).map(RData::CNAME)
}

fn decode_ptr(reader: &mut WireReader<'_>, _: u16, _: usize) -> Result<RData, DomainError> {
    read_name(reader).map(RData::PTR)
}

fn decode_mx(reader: &mut WireReader<'_>, _: u16, _: usize) -> Result<RData, DomainError> {
    let preference = reader.read_u16()?;
    let exchange = read_name(reader)?;
    Ok(RData::MX {
        preference,
        exchange,
    })
}

fn decode_soa(reader: &mut WireReader<'_>, _: u16, _: usize) -> Result<RData, DomainError> {
    Ok(RData::SOA(Soa {
        mname: read_name(reader)?,
        rname: read_name(reader)?,
        serial: reader.read_u32()?,
        refresh: reader.read_i32()?,
        retry: reader.read_i32()?,
        expire: reader.read_i32()?,
        minimum: reader.read_i32()?,
    }))
}

fn decode_txt(reader: &mut WireReader<'_>, _: u16, rdlength: usize) -> Result<RData, DomainError> {
    let end = reader.position() + rdlength;
    let mut strings = Vec::new();
    while reader.position() < end {
        let len = reader.read_u8()? as usize;
        strings.push(reader.read_bytes(len)?.to_vec());
    }
    Ok(RData::TXT(strings))
}

fn decode_raw(reader: &mut WireReader<'_>, rtype: u16, rdlength: usize) -> Result<RData, DomainError> {
    Ok(RData::Raw {
        rtype,
        data: reader.read_bytes(rdlength)?.to_vec(),
    })
}

/// Writes the payload only; the caller owns the rdlength field.
pub fn encode_rdata(
    writer: &mut WireWriter,
    table: &mut CompressionTable,
    data: &RData,
) -> Result<(), DomainError> {
    match data {
        RData::A(addr) => writer.write_bytes(&addr.octets()),
        RData::AAAA(addr) => writer.write_bytes(&addr.octets()),
        RData::NS(name) | RData::CNAME(name) | RData::PTR(name) => {
            write_name(writer, table, name)?
        }
        RData::MX {
            preference,
            exchange,
        } => {
            writer.write_u16(*preference);
            write_name(writer, table, exchange)?;
        }
        RData::SOA(soa) => {
            write_name(writer, table, &soa.mname)?;
            write_name(writer, table, &soa.rname)?;
            writer.write_u32(soa.serial);
            writer.write_i32(soa.refresh);
            writer.write_i32(soa.retry);
            writer.write_i32(soa.expire);
            writer.write_i32(soa.minimum);
        }
        RData::TXT(strings) => {
            for s in strings {
                let len = u8::try_from(s.len()).map_err(|_| {
                    DomainError::InvalidRecord(format!(
                        "TXT string of {} bytes exceeds 255",
                        s.len()
                    ))
                })?;
                writer.write_u8(len);
                writer.write_bytes(s);
            }
        }
        RData::Raw { rtype, data } => {
            if is_registered(*rtype) {
                return Err(DomainError::InvalidRecord(format!(
                    "opaque payload uses registered type {}",
                    RecordType::name_of(*rtype)
                )));
            }
            writer.write_bytes(data);
        }
    }
    Ok(())
}

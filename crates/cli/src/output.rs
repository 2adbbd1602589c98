//! dig-style rendering of a response.

use std::fmt::Write;
use wiredns_domain::{Message, RecordType, ResourceRecord, CLASS_IN};

fn opcode_name(opcode: u8) -> String {
    match opcode {
        0 => "QUERY".to_string(),
        1 => "IQUERY".to_string(),
        2 => "STATUS".to_string(),
        4 => "NOTIFY".to_string(),
        5 => "UPDATE".to_string(),
        other => format!("OPCODE{}", other),
    }
}

fn class_name(class: u16) -> String {
    if class == CLASS_IN {
        "IN".to_string()
    } else {
        format!("CLASS{}", class)
    }
}

fn flag_list(message: &Message) -> String {
    let flags = &message.flags;
    [
        (flags.response, "qr"),
        (flags.authoritative, "aa"),
        (flags.truncated, "tc"),
        (flags.recursion_desired, "rd"),
        (flags.recursion_available, "ra"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| *name)
    .collect::<Vec<_>>()
    .join(" ")
}

fn section(out: &mut String, title: &str, records: &[ResourceRecord]) {
    if records.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n;; {} SECTION:", title);
    for record in records {
        let _ = writeln!(out, "{}", record);
    }
}

pub fn render(message: &Message) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        ";; ->>HEADER<<- opcode: {}, status: {}, id: {}",
        opcode_name(message.flags.opcode),
        message.response_code(),
        message.id
    );
    let _ = writeln!(
        out,
        ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
        flag_list(message),
        message.questions.len(),
        message.answers.len(),
        message.authorities.len(),
        message.additionals.len()
    );

    if !message.questions.is_empty() {
        let _ = writeln!(out, "\n;; QUESTION SECTION:");
        for q in &message.questions {
            let _ = writeln!(
                out,
                ";{}\t\t{}\t{}",
                q.name,
                class_name(q.qclass),
                RecordType::name_of(q.qtype)
            );
        }
    }

    section(&mut out, "ANSWER", &message.answers);
    section(&mut out, "AUTHORITY", &message.authorities);
    section(&mut out, "ADDITIONAL", &message.additionals);
    out
}

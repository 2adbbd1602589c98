#![allow(dead_code)]
use std::net::SocketAddr;
use wiredns_domain::{
    ClientConfig, Flags, Message, Question, RData, RecordType, ResourceRecord, Soa,
};

pub struct DnsServerBuilder;

impl DnsServerBuilder {
    pub fn mock_upstream() -> SocketAddr {
        "192.0.2.53:53".parse().unwrap()
    }

    pub fn other_host() -> SocketAddr {
        "198.51.100.7:53".parse().unwrap()
    }

    pub fn google_dns() -> SocketAddr {
        "8.8.8.8:53".parse().unwrap()
    }
}

pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    pub fn server(mut self, server: SocketAddr) -> Self {
        self.config.server = Some(server.to_string());
        self
    }

    pub fn bind_loopback(mut self) -> Self {
        self.config.bind_address = Some("127.0.0.1:0".to_string());
        self
    }

    pub fn verify_responder(mut self) -> Self {
        self.config.verify_responder = true;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn query(name: &str, rtype: RecordType) -> Self {
        Self {
            message: Message::query(name, rtype),
        }
    }

    /// A response to `request`: same id and question, QR and RA set.
    pub fn response_to(request: &Message) -> Self {
        let mut message = request.clone();
        message.flags.response = true;
        message.flags.recursion_available = true;
        Self { message }
    }

    pub fn id(mut self, id: u16) -> Self {
        self.message.id = id;
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.message.flags = flags;
        self
    }

    pub fn question(mut self, name: &str, rtype: RecordType) -> Self {
        self.message.questions.push(Question::new(name, rtype));
        self
    }

    pub fn answer(mut self, record: ResourceRecord) -> Self {
        self.message.answers.push(record);
        self
    }

    pub fn authority(mut self, record: ResourceRecord) -> Self {
        self.message.authorities.push(record);
        self
    }

    pub fn additional(mut self, record: ResourceRecord) -> Self {
        self.message.additionals.push(record);
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}

pub struct RecordBuilder;

impl RecordBuilder {
    pub fn a(name: &str, addr: &str) -> ResourceRecord {
        ResourceRecord::new(name, 300, RData::a(addr).unwrap())
    }

    pub fn aaaa(name: &str, addr: &str) -> ResourceRecord {
        ResourceRecord::new(name, 300, RData::aaaa(addr).unwrap())
    }

    pub fn cname(name: &str, target: &str) -> ResourceRecord {
        ResourceRecord::new(name, 300, RData::CNAME(target.to_string()))
    }

    pub fn ns(name: &str, host: &str) -> ResourceRecord {
        ResourceRecord::new(name, 172800, RData::NS(host.to_string()))
    }

    pub fn mx(name: &str, preference: u16, exchange: &str) -> ResourceRecord {
        ResourceRecord::new(
            name,
            3600,
            RData::MX {
                preference,
                exchange: exchange.to_string(),
            },
        )
    }

    pub fn txt(name: &str, text: &str) -> ResourceRecord {
        ResourceRecord::new(name, 60, RData::txt(text))
    }

    pub fn soa(zone: &str) -> ResourceRecord {
        ResourceRecord::new(
            zone,
            900,
            RData::SOA(Soa {
                mname: format!("ns1.{}", zone),
                rname: format!("hostmaster.{}", zone),
                serial: 2024010101,
                refresh: 7200,
                retry: 3600,
                expire: 1209600,
                minimum: 300,
            }),
        )
    }

    pub fn raw(name: &str, rtype: u16, data: &[u8]) -> ResourceRecord {
        ResourceRecord::new(
            name,
            120,
            RData::Raw {
                rtype,
                data: data.to_vec(),
            },
        )
    }
}

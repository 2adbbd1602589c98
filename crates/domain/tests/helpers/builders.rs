#![allow(dead_code)]
use wiredns_domain::{RData, ResourceRecord, CLASS_IN};

pub struct ResourceRecordBuilder {
    name: String,
    class: u16,
    ttl: u32,
    data: RData,
}

impl ResourceRecordBuilder {
    pub fn new() -> Self {
        Self {
            name: "example.com".to_string(),
            class: CLASS_IN,
            ttl: 300,
            data: RData::a("192.0.2.1").unwrap(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.data = RData::a(address).unwrap();
        self
    }

    pub fn data(mut self, data: RData) -> Self {
        self.data = data;
        self
    }

    pub fn class(mut self, class: u16) -> Self {
        self.class = class;
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn build(self) -> ResourceRecord {
        ResourceRecord::new(self.name, self.ttl, self.data).with_class(self.class)
    }
}

impl Default for ResourceRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

mod rdata;
mod record;
mod record_type;

pub use rdata::{RData, Soa};
pub use record::{ResourceRecord, CLASS_IN, MAX_TTL};
pub use record_type::RecordType;

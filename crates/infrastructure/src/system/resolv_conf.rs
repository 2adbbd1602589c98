//! Host resolver discovery from resolv.conf(5).

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Addresses of the `nameserver` lines, in file order.
///
/// Comments (`#`, `;`) and other directives are skipped. IPv6 addresses
/// with a zone suffix (`fe80::1%eth0`) are skipped as well since the zone
/// cannot be carried in the address alone.
pub fn parse_nameservers(text: &str) -> Vec<IpAddr> {
    text.lines()
        .map(|line| line.split(['#', ';']).next().unwrap_or("").trim())
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(addr)) => Some(addr),
                _ => None,
            }
        })
        .filter_map(|addr| match addr.parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                debug!(nameserver = addr, "Skipping unusable nameserver entry");
                None
            }
        })
        .collect()
}

pub async fn read_nameservers(path: impl AsRef<Path>) -> Vec<IpAddr> {
    let path = path.as_ref();
    match fs::read_to_string(path).await {
        Ok(text) => parse_nameservers(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read resolver configuration");
            Vec::new()
        }
    }
}

/// First nameserver of the host's resolver configuration, on `port`.
pub async fn system_nameserver(port: u16) -> Option<SocketAddr> {
    read_nameservers(RESOLV_CONF_PATH)
        .await
        .into_iter()
        .next()
        .map(|ip| SocketAddr::new(ip, port))
}

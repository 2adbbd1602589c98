//! Queries real public resolvers. Run with `--ignored` on a host with
//! outbound UDP/53.

use std::net::SocketAddr;
use wiredns_domain::{ClientConfig, Message, RData, RecordType, ResponseCode};
use wiredns_infrastructure::dns::{DnsClient, SendOptions};

const RESOLVERS: &[&str] = &["1.1.1.1:53", "8.8.8.8:53", "9.9.9.9:53"];

async fn client() -> DnsClient {
    let config = ClientConfig {
        server: Some(RESOLVERS[0].to_string()),
        retry: 2,
        timeout_ms: 1500,
        ..ClientConfig::default()
    };
    DnsClient::bind(&config).await.unwrap()
}

#[tokio::test]
#[ignore]
async fn test_a_record_from_each_resolver() {
    let client = client().await;

    for resolver in RESOLVERS {
        let server: SocketAddr = resolver.parse().unwrap();
        let response = client
            .send(
                Message::query("example.com", RecordType::A),
                SendOptions::new().server(server),
            )
            .await
            .unwrap_or_else(|e| panic!("{}: {}", resolver, e));

        assert_eq!(response.response_code(), ResponseCode::NoError, "{}", resolver);
        assert!(
            response
                .answers
                .iter()
                .any(|r| matches!(r.data, RData::A(_))),
            "{} returned no A record",
            resolver
        );
    }
}

#[tokio::test]
#[ignore]
async fn test_nxdomain() {
    let client = client().await;
    let response = client
        .send(
            Message::query("does-not-exist.invalid", RecordType::A),
            SendOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(response.response_code(), ResponseCode::NXDomain);
    assert!(response.answers.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_concurrent_queries_share_one_socket() {
    let client = std::sync::Arc::new(client().await);
    let names = ["example.com", "example.net", "example.org", "iana.org"];

    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            let client = client.clone();
            let message = Message::query(*name, RecordType::NS);
            tokio::spawn(async move { client.send(message, SendOptions::new()).await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert!(!response.answers.is_empty());
    }
    assert_eq!(client.pending_queries(), 0);
}

#[tokio::test]
#[ignore]
async fn test_unreachable_server_times_out() {
    let client = client().await;
    // TEST-NET-1, never routed
    let server: SocketAddr = "192.0.2.1:53".parse().unwrap();
    let err = client
        .send(
            Message::query("example.com", RecordType::A),
            SendOptions::new().server(server).retry(1).timeout_ms(300),
        )
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "{:?}", err);
}

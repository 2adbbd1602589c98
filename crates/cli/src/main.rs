use clap::Parser;
use std::time::Duration;
use tracing::debug;
use wiredns_domain::{CliOverrides, Message, RecordType};
use wiredns_infrastructure::dns::{DnsClient, SendOptions};

mod bootstrap;
mod output;

#[derive(Parser)]
#[command(name = "wiredns")]
#[command(version)]
#[command(about = "Send one DNS query over UDP and print the response")]
struct Cli {
    /// Domain name to look up
    name: String,

    /// Record type (A, AAAA, MX, TXT, NS, SOA, ...)
    #[arg(short = 't', long = "type", default_value = "A")]
    record_type: String,

    /// Server to query (ip or ip:port); defaults to the host resolver
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Port used when the server carries none
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Extra attempts after a timeout
    #[arg(long)]
    retry: Option<u32>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let record_type: RecordType = cli
        .record_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let cli_overrides = CliOverrides {
        server: cli.server.clone(),
        port: cli.port,
        retry: cli.retry,
        timeout_ms: cli.timeout,
        log_level: cli.log_level.clone(),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    let client = DnsClient::bind(&config.client).await?;
    let server = client
        .default_server()
        .ok_or_else(|| anyhow::anyhow!("no DNS server configured and none found in /etc/resolv.conf"))?;
    debug!(server = %server, name = %cli.name, record_type = %record_type, "Querying");

    let started = std::time::Instant::now();
    let response = client
        .send(Message::query(cli.name.as_str(), record_type), SendOptions::new())
        .await?;
    let elapsed: Duration = started.elapsed();
    client.close();

    print!("{}", output::render(&response));
    println!("\n;; Query time: {} msec", elapsed.as_millis());
    println!(";; SERVER: {}", server);
    Ok(())
}

use clap::Parser;
use log::info;
use relay::Relay;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the client-facing socket to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Client-facing relay port
    #[arg(short, long, default_value_t = shared::protocol::DEFAULT_RELAY_PORT)]
    port: u16,

    /// Address of the authoritative server
    #[arg(short, long, default_value = "127.0.0.1:6000")]
    server: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let server_addr: SocketAddr = args.server.parse()?;

    let relay = Relay::bind(&format!("{}:{}", args.host, args.port), server_addr).await?;
    info!(
        "Relay listening for clients on {}, forwarding to {}",
        relay.client_addr()?,
        server_addr
    );

    relay.run().await?;
    Ok(())
}

use clap::Parser;
use log::info;
use rand::Rng;
use server::network::Backend;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the server socket to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = shared::protocol::DEFAULT_SERVER_PORT)]
    port: u16,

    /// Number of loot items scattered at startup
    #[arg(short, long, default_value = "8")]
    loot: u32,

    /// Half-width of the square area the loot is scattered over
    #[arg(long, default_value = "20")]
    spread: i32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let mut backend = Backend::bind(&format!("{}:{}", args.host, args.port)).await?;

    let mut rng = rand::thread_rng();
    for id in 0..args.loot {
        let x = rng.gen_range(-args.spread..=args.spread);
        let y = rng.gen_range(-args.spread..=args.spread);
        backend.game_mut().spawn_loot(id, x, y);
    }
    info!("Scattered {} loot items across ±{}", args.loot, args.spread);

    backend.run().await?;
    Ok(())
}

use clap::Parser;
use client::console;
use log::info;
use shared::channel::AckChannel;
use shared::protocol::{Command, QUIT};
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:5000")]
    relay: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let relay_addr: SocketAddr = args.relay.parse()?;

    let channel = AckChannel::bind("0.0.0.0:0").await?;
    info!("Client socket on {}", channel.local_addr()?);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let name = loop {
        println!("Enter your player name:");
        match lines.next() {
            Some(line) => {
                let line = line?;
                let name = line.trim().to_string();
                if !name.is_empty() {
                    break name;
                }
            }
            None => return Ok(()),
        }
    };

    let joined = rpc(&channel, relay_addr, &Command::Join { name }.encode()).await?;
    let Some(player_id) = console::parse_joined(&joined) else {
        return Err(format!("could not join: {}", joined).into());
    };
    println!("Joined game with playerId = {}", player_id);

    loop {
        println!("\nCommands: MOVE dx dy | PICKUP lootId | STATE | QUIT");
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let Some(wire) = console::to_wire(&line?, player_id) else {
            println!("Could not read that command, try again.");
            continue;
        };

        if wire == QUIT {
            // The quit propagates through the relay; no response comes back.
            channel.send_and_await_ack(&wire, relay_addr).await?;
            println!("Client closed.");
            return Ok(());
        }

        let response = rpc(&channel, relay_addr, &wire).await?;
        println!("Server says: {}", response);
    }
}

/// One full round trip: send, await the relay's acknowledgment, then
/// treat the next real payload as the response.
async fn rpc(
    channel: &AckChannel,
    relay_addr: SocketAddr,
    payload: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    channel.send_and_await_ack(payload, relay_addr).await?;
    let (response, _) = channel.recv_message().await?;
    Ok(response)
}

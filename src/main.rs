//////////////////////////
// main.rs
//////////////////////////

use std::net::SocketAddr;

use clap::Parser;

use chess_duet::server::{start_server, SeatPolicy};

#[derive(Parser, Debug)]
#[command(name = "chess_duet", about = "Authoritative two-player chess server")]
struct Args {
    /// Address to serve the WebSocket endpoint on
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Admit extra connections as read-only spectators instead of
    /// refusing them once both player slots are taken
    #[arg(long)]
    allow_spectators: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let policy = if args.allow_spectators {
        SeatPolicy::AllowSpectators
    } else {
        SeatPolicy::RefuseExtra
    };

    start_server(args.bind, policy).await;
}

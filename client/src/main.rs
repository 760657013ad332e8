use clap::Parser;
use client::game::ClientGameState;
use client::input::InputManager;
use client::network::NetworkHandle;
use client::rendering::Renderer;
use log::{error, info, warn};
use macroquad::prelude::*;
use shared::{now_millis, Packet};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "car combat".to_string(),
        window_width: 1024,
        window_height: 768,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("connecting to {}", args.server);
    if args.fake_ping > 0 {
        info!("simulating {}ms latency", args.fake_ping);
    }
    info!("controls: W/S accelerate/brake, A/D steer, Space fire, Esc quit");

    let mut network = match NetworkHandle::connect(&args.server, args.fake_ping) {
        Ok(network) => network,
        Err(e) => {
            error!("failed to start networking: {}", e);
            return;
        }
    };
    network.send(Packet::Connect { client_version: 1 });

    let mut game = ClientGameState::new();
    let input = InputManager::new();
    let renderer = Renderer::new();

    loop {
        let now = now_millis();

        while let Some(packet) = network.poll() {
            game.handle_packet(packet, now);
        }

        if let Some(reason) = game.rejected.take() {
            warn!("server rejected connection: {}", reason);
            break;
        }

        let inputs = input.sample();
        // Cap the frame delta so a stalled frame cannot slingshot the vehicle.
        let dt = get_frame_time().min(0.05);

        for packet in game.tick(&inputs, dt, now) {
            network.send(packet);
        }

        renderer.render(&game);

        if input.quit_requested() {
            network.send(Packet::Disconnect);
            break;
        }

        next_frame().await;
    }
}

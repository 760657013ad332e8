//! Headless smoke client: connects, drives a circle, fires periodically and
//! prints everything the server sends back. Useful for poking at a running
//! server without a window.

use bincode::{deserialize, serialize};
use shared::{heading_forward, now_millis, Packet, ShotId, Vec3, BULLET_DAMAGE, MUZZLE_OFFSET};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::interval;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(&server_addr).await?;
    println!("connecting to {}", server_addr);

    socket
        .send(&serialize(&Packet::Connect { client_version: 1 })?)
        .await?;

    let mut client_id: Option<u32> = None;
    let mut position = Vec3::default();
    let mut yaw: f32 = 0.0;
    let mut shot_seq: u32 = 0;
    let mut last_fire: u64 = 0;

    let mut tick = interval(Duration::from_millis(50));
    let mut buffer = [0u8; 2048];

    loop {
        tokio::select! {
            result = socket.recv(&mut buffer) => {
                match result {
                    Ok(len) => match deserialize::<Packet>(&buffer[0..len]) {
                        Ok(Packet::Welcome { client_id: id, position: spawn, players }) => {
                            println!("welcome: id {} at ({:.0}, {:.0}), {} players",
                                id, spawn.x, spawn.z, players.len());
                            client_id = Some(id);
                            position = spawn;
                        }
                        Ok(Packet::Rejected { reason }) => {
                            println!("rejected: {}", reason);
                            return Ok(());
                        }
                        Ok(packet) => println!("recv: {:?}", packet),
                        Err(_) => println!("recv: unparseable packet"),
                    },
                    Err(e) => {
                        eprintln!("recv error: {}", e);
                        break;
                    }
                }
            },

            _ = tick.tick() => {
                let Some(id) = client_id else { continue };

                // Drive a lazy circle.
                yaw += 0.02;
                position = position.add(heading_forward(yaw).scale(2.0));
                socket.send(&serialize(&Packet::Movement {
                    position,
                    rotation: yaw,
                })?).await?;

                // Fire a twin burst every two seconds.
                let now = now_millis();
                if now.saturating_sub(last_fire) >= 2000 {
                    last_fire = now;
                    for side in [-1.0f32, 1.0] {
                        shot_seq += 1;
                        let muzzle = position.add(
                            shared::heading_right(yaw).scale(side * MUZZLE_OFFSET));
                        socket.send(&serialize(&Packet::Fire {
                            shot_id: ShotId { owner: id, seq: shot_seq },
                            position: muzzle,
                            direction: heading_forward(yaw),
                        })?).await?;
                    }
                    println!("fired pair (seq {}, damage {})", shot_seq, BULLET_DAMAGE);
                }
            },

            _ = tokio::signal::ctrl_c() => {
                println!("disconnecting");
                socket.send(&serialize(&Packet::Disconnect)?).await?;
                break;
            },
        }
    }

    Ok(())
}

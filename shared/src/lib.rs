//! Wire protocol, gameplay constants and collision predicates shared by the
//! relay server and the client simulation.
//!
//! Clients are authoritative over their own vehicle transform; the server is
//! authoritative over health, death and respawn. Everything that both sides
//! must agree on byte-for-byte (packet shapes) or number-for-number (movement
//! bounds, hit radii, timing windows) lives here.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Top forward speed in world units per second.
pub const MAX_SPEED: f32 = 200.0;
/// Reverse gear is limited to half of the forward bound.
pub const MAX_REVERSE_SPEED: f32 = MAX_SPEED / 2.0;
/// Speed gained per second while accelerating.
pub const ACCEL_RATE: f32 = 120.0;
/// Speed shed per second while braking (also drives reverse).
pub const BRAKE_RATE: f32 = 220.0;
/// Speed shed per second while coasting with no pedal held.
pub const COAST_RATE: f32 = 60.0;
/// Yaw rate in radians per second at full speed. Actual turn rate scales
/// with the speed fraction, so a crawling vehicle barely steers.
pub const BASE_TURN_RATE: f32 = 1.8;

/// Vehicle footprint half-sizes (the car mesh is 2 x 1 x 4).
pub const VEHICLE_HALF_WIDTH: f32 = 1.0;
pub const VEHICLE_HALF_LENGTH: f32 = 2.0;
/// Planar center distance below which two vehicles are in contact.
pub const VEHICLE_COLLISION_RADIUS: f32 = 4.0;
/// Push-out distance applied along the collision normal on a bounce.
pub const BOUNCE_PUSH: f32 = 1.5;

pub const BULLET_SPEED: f32 = 400.0;
pub const BULLET_TTL_MS: u64 = 2000;
pub const BULLET_DAMAGE: u32 = 10;
/// Planar distance between projectile and vehicle center that counts as a hit.
pub const HIT_RADIUS: f32 = 3.0;
/// Minimum interval between shots; held fire inputs inside the window are
/// ignored, not queued.
pub const FIRE_COOLDOWN_MS: u64 = 400;
/// Lateral offset of the twin muzzles from the vehicle centerline.
pub const MUZZLE_OFFSET: f32 = 1.2;

pub const MAX_HEALTH: u32 = 100;
pub const RESPAWN_DELAY_MS: u64 = 3000;
/// Duplicate-shot ledger entries outlive the projectile ttl by this much
/// before eviction, covering late redelivery.
pub const SHOT_SEEN_GRACE_MS: u64 = 1000;

/// Spawn points form a SPAWN_GRID_SIZE x SPAWN_GRID_SIZE grid with
/// SPAWN_SPACING units between neighbors, centered on the origin.
pub const SPAWN_GRID_SIZE: usize = 5;
pub const SPAWN_SPACING: f32 = 200.0;
/// Vehicles are clamped to a square arena of this half-extent.
pub const ARENA_HALF_EXTENT: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn add(&self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(&self, scalar: f32) -> Vec3 {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }

    /// Distance in the ground plane; the y axis never participates in
    /// collision or hit checks.
    pub fn planar_distance(&self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn planar_normalized(&self) -> Vec3 {
        let mag = (self.x * self.x + self.z * self.z).sqrt();
        if mag == 0.0 {
            Vec3::default()
        } else {
            Vec3::new(self.x / mag, 0.0, self.z / mag)
        }
    }
}

/// Unit vector the vehicle travels along for a given yaw. Yaw zero faces +z,
/// positive yaw turns toward +x, matching the original scene's convention.
pub fn heading_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Unit vector pointing out the right-hand side of the vehicle.
pub fn heading_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Identifier of one logical shot. Sequences increase monotonically per
/// shooter and are never reused, so the pair is unique for the lifetime of a
/// connection and safe to key idempotency ledgers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShotId {
    pub owner: u32,
    pub seq: u32,
}

/// One participant's state as carried in snapshots and join notices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: u32,
    pub position: Vec3,
    pub rotation: f32,
    pub health: u32,
    pub alive: bool,
}

impl PlayerState {
    pub fn new(id: u32, position: Vec3) -> Self {
        Self {
            id,
            position,
            rotation: 0.0,
            health: MAX_HEALTH,
            alive: true,
        }
    }
}

/// Every message on the wire, both directions. The sender of client->server
/// variants is resolved from the socket address on the server, never from a
/// payload field, so one connection cannot mutate another's record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // client -> server
    Connect {
        client_version: u32,
    },
    Movement {
        position: Vec3,
        rotation: f32,
    },
    Fire {
        shot_id: ShotId,
        position: Vec3,
        direction: Vec3,
    },
    HitClaim {
        shot_id: ShotId,
        victim_id: u32,
        damage: u32,
    },
    CollisionReport {
        other_id: u32,
        impulse: Vec3,
        spin: f32,
    },
    Disconnect,

    // server -> client
    Welcome {
        client_id: u32,
        position: Vec3,
        players: Vec<PlayerState>,
    },
    PlayerJoined {
        player: PlayerState,
    },
    PlayerMoved {
        id: u32,
        position: Vec3,
        rotation: f32,
    },
    BulletSpawned {
        shot_id: ShotId,
        position: Vec3,
        direction: Vec3,
    },
    HealthUpdate {
        victim_id: u32,
        shooter_id: u32,
        shot_id: ShotId,
        health: u32,
        alive: bool,
    },
    Respawned {
        id: u32,
        position: Vec3,
    },
    CollisionImpulse {
        from_id: u32,
        impulse: Vec3,
        spin: f32,
    },
    PlayerLeft {
        id: u32,
    },
    Rejected {
        reason: String,
    },
}

/// A static axis-aligned obstacle in the ground plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Vec3,
    pub half_width: f32,
    pub half_depth: f32,
}

impl Obstacle {
    pub fn new(x: f32, z: f32, half_width: f32, half_depth: f32) -> Self {
        Self {
            center: Vec3::new(x, 0.0, z),
            half_width,
            half_depth,
        }
    }

    /// A vehicle at `position` intersects when both planar axis distances are
    /// under the obstacle half-extent plus the vehicle's half-size margin.
    pub fn overlaps_vehicle(&self, position: Vec3) -> bool {
        let dx = (position.x - self.center.x).abs();
        let dz = (position.z - self.center.z).abs();
        dx < self.half_width + VEHICLE_HALF_WIDTH && dz < self.half_depth + VEHICLE_HALF_LENGTH
    }

    /// Push-out normal for an intersecting vehicle: the sign of the center
    /// delta on whichever axis penetrates least.
    pub fn push_normal(&self, position: Vec3) -> Vec3 {
        let dx = position.x - self.center.x;
        let dz = position.z - self.center.z;
        let pen_x = (self.half_width + VEHICLE_HALF_WIDTH) - dx.abs();
        let pen_z = (self.half_depth + VEHICLE_HALF_LENGTH) - dz.abs();

        if pen_x < pen_z {
            Vec3::new(dx.signum(), 0.0, 0.0)
        } else {
            Vec3::new(0.0, 0.0, dz.signum())
        }
    }
}

/// The fixed arena layout: a handful of blocks between the spawn rows.
pub fn default_obstacles() -> Vec<Obstacle> {
    vec![
        Obstacle::new(0.0, 0.0, 30.0, 30.0),
        Obstacle::new(-300.0, 150.0, 20.0, 60.0),
        Obstacle::new(300.0, -150.0, 20.0, 60.0),
        Obstacle::new(150.0, 300.0, 60.0, 20.0),
        Obstacle::new(-150.0, -300.0, 60.0, 20.0),
    ]
}

/// Planar contact test between two vehicle centers.
pub fn vehicles_collide(a: Vec3, b: Vec3) -> bool {
    a.planar_distance(b) < VEHICLE_COLLISION_RADIUS
}

/// Milliseconds since the Unix epoch. All deadlines (projectile ttl, fire
/// cooldown, respawn, ledger eviction) are compared against this clock.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

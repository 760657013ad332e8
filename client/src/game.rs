//! Client-side game state: the locally-simulated vehicle, read-only mirrors
//! of every remote participant, and the projectiles in flight.
//!
//! Mirrors are purely reactive: network events set their transform and
//! health verbatim, nothing here ever simulates them. Projectiles are
//! simulated on every client (the shooter spawns them locally, everyone else
//! from the relayed creation event) and any client that observes an
//! intersection sends a hit claim. The server is the only authority that
//! turns claims into health changes, so duplicate and crossed claims are
//! harmless here by construction.

use crate::vehicle::{Vehicle, VehicleInputs};
use log::{debug, warn};
use shared::{
    default_obstacles, heading_forward, heading_right, vehicles_collide, Obstacle, Packet,
    PlayerState, ShotId, Vec3, BOUNCE_PUSH, BULLET_DAMAGE, BULLET_SPEED, BULLET_TTL_MS,
    FIRE_COOLDOWN_MS, HIT_RADIUS, MAX_HEALTH, MUZZLE_OFFSET, SHOT_SEEN_GRACE_MS,
    VEHICLE_HALF_LENGTH,
};
use std::collections::HashMap;

/// Heading perturbation applied to both parties of a vehicle collision.
const COLLISION_SPIN: f32 = 0.15;

/// Last-received state of one remote participant.
#[derive(Debug, Clone)]
pub struct Mirror {
    pub position: Vec3,
    pub rotation: f32,
    pub health: u32,
    pub alive: bool,
}

impl Default for Mirror {
    fn default() -> Self {
        Self {
            position: Vec3::default(),
            rotation: 0.0,
            health: MAX_HEALTH,
            alive: true,
        }
    }
}

impl From<PlayerState> for Mirror {
    fn from(player: PlayerState) -> Self {
        Self {
            position: player.position,
            rotation: player.rotation,
            health: player.health,
            alive: player.alive,
        }
    }
}

/// A bullet in flight, simulated locally whether ours or mirrored.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub shot_id: ShotId,
    pub position: Vec3,
    pub direction: Vec3,
    pub spawned_at: u64,
}

impl Projectile {
    pub fn expired(&self, now: u64) -> bool {
        now.saturating_sub(self.spawned_at) >= BULLET_TTL_MS
    }

    pub fn advance(&mut self, dt: f32) {
        self.position = self.position.add(self.direction.scale(BULLET_SPEED * dt));
    }
}

pub struct ClientGameState {
    pub local_id: Option<u32>,
    pub vehicle: Vehicle,
    pub health: u32,
    pub alive: bool,
    pub mirrors: HashMap<u32, Mirror>,
    pub projectiles: Vec<Projectile>,
    pub obstacles: Vec<Obstacle>,
    /// Set when the server refused the connection.
    pub rejected: Option<String>,

    next_shot_seq: u32,
    last_fire_at: Option<u64>,
    /// Mirrored shot ids already spawned -> eviction deadline. Guards
    /// against replayed creation events spawning a bullet twice.
    seen_shots: HashMap<ShotId, u64>,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            local_id: None,
            vehicle: Vehicle::at(Vec3::default()),
            health: MAX_HEALTH,
            alive: true,
            mirrors: HashMap::new(),
            projectiles: Vec::new(),
            obstacles: default_obstacles(),
            rejected: None,
            next_shot_seq: 0,
            last_fire_at: None,
            seen_shots: HashMap::new(),
        }
    }

    pub fn connected(&self) -> bool {
        self.local_id.is_some()
    }

    /// Applies one server packet. Events referencing unknown participants
    /// create the mirror entry (a movement event can outrun the join notice
    /// from a different sender); events referencing the departed are no-ops.
    pub fn handle_packet(&mut self, packet: Packet, now: u64) {
        match packet {
            Packet::Welcome {
                client_id,
                position,
                players,
            } => {
                self.local_id = Some(client_id);
                self.vehicle = Vehicle::at(position);
                self.health = MAX_HEALTH;
                self.alive = true;
                self.mirrors = players
                    .into_iter()
                    .filter(|p| p.id != client_id)
                    .map(|p| (p.id, Mirror::from(p)))
                    .collect();
            }

            Packet::PlayerJoined { player } => {
                if Some(player.id) != self.local_id {
                    self.mirrors.insert(player.id, Mirror::from(player));
                }
            }

            Packet::PlayerMoved {
                id,
                position,
                rotation,
            } => {
                if Some(id) == self.local_id {
                    return;
                }
                let mirror = self.mirrors.entry(id).or_default();
                mirror.position = position;
                mirror.rotation = rotation;
            }

            Packet::BulletSpawned {
                shot_id,
                position,
                direction,
            } => {
                // Our own shots were spawned locally at fire time.
                if Some(shot_id.owner) == self.local_id {
                    return;
                }
                if self.seen_shots.contains_key(&shot_id) {
                    debug!("duplicate bullet event for {:?}, ignoring", shot_id);
                    return;
                }
                self.seen_shots
                    .insert(shot_id, now + BULLET_TTL_MS + SHOT_SEEN_GRACE_MS);
                self.projectiles.push(Projectile {
                    shot_id,
                    position,
                    direction: direction.planar_normalized(),
                    spawned_at: now,
                });
            }

            Packet::HealthUpdate {
                victim_id,
                health,
                alive,
                ..
            } => {
                if Some(victim_id) == self.local_id {
                    self.health = health;
                    if self.alive && !alive {
                        // Dead vehicles leave the simulation immediately.
                        self.alive = false;
                        self.vehicle.speed = 0.0;
                    }
                } else {
                    let mirror = self.mirrors.entry(victim_id).or_default();
                    mirror.health = health;
                    mirror.alive = alive;
                }
            }

            Packet::Respawned { id, position } => {
                if Some(id) == self.local_id {
                    self.vehicle.reset_at(position);
                    self.health = MAX_HEALTH;
                    self.alive = true;
                } else {
                    let mirror = self.mirrors.entry(id).or_default();
                    mirror.position = position;
                    mirror.rotation = 0.0;
                    mirror.health = MAX_HEALTH;
                    mirror.alive = true;
                }
            }

            Packet::CollisionImpulse { impulse, spin, .. } => {
                if self.alive {
                    self.vehicle.apply_impulse(impulse, spin);
                }
            }

            Packet::PlayerLeft { id } => {
                self.mirrors.remove(&id);
                debug!("mirror for {} removed", id);
            }

            Packet::Rejected { reason } => {
                self.rejected = Some(reason);
            }

            other => {
                warn!("unexpected packet on client: {:?}", other);
            }
        }
    }

    /// Advances one frame and returns the packets to send. While dead the
    /// vehicle neither moves, fires nor reports movement; projectiles keep
    /// flying and mirrored state keeps applying.
    pub fn tick(&mut self, inputs: &VehicleInputs, dt: f32, now: u64) -> Vec<Packet> {
        let mut outbound = Vec::new();

        self.seen_shots.retain(|_, deadline| *deadline > now);

        if !self.connected() {
            return outbound;
        }

        if self.alive {
            if let Some(report) = self.step_vehicle(inputs, dt) {
                outbound.push(report);
            }
            outbound.extend(self.try_fire(inputs, now));
        }

        outbound.extend(self.step_projectiles(dt, now));

        if self.alive {
            outbound.push(Packet::Movement {
                position: self.vehicle.position,
                rotation: self.vehicle.heading,
            });
        }

        outbound
    }

    /// Candidate/commit movement with collision arbitration. Returns the
    /// collision report to relay when the vehicle ran into another one.
    fn step_vehicle(&mut self, inputs: &VehicleInputs, dt: f32) -> Option<Packet> {
        let candidate = self.vehicle.integrate(inputs, dt);

        for obstacle in &self.obstacles {
            if obstacle.overlaps_vehicle(candidate) {
                let normal = obstacle.push_normal(candidate);
                self.vehicle.bounce(normal);
                return None;
            }
        }

        for (id, mirror) in &self.mirrors {
            if !mirror.alive {
                continue;
            }
            if vehicles_collide(candidate, mirror.position) {
                // Push away from the other vehicle, and relay the inverse
                // impulse so both sides resolve consistently.
                let away = Vec3::new(
                    candidate.x - mirror.position.x,
                    0.0,
                    candidate.z - mirror.position.z,
                )
                .planar_normalized();

                self.vehicle.bounce(away);
                self.vehicle.heading += COLLISION_SPIN;

                return Some(Packet::CollisionReport {
                    other_id: *id,
                    impulse: away.scale(-BOUNCE_PUSH),
                    spin: -COLLISION_SPIN,
                });
            }
        }

        self.vehicle.commit(candidate);
        None
    }

    /// Spawns the twin-muzzle pair when fire is held and the cooldown window
    /// has elapsed. Held inputs inside the window are ignored, not queued.
    fn try_fire(&mut self, inputs: &VehicleInputs, now: u64) -> Vec<Packet> {
        if !inputs.fire {
            return Vec::new();
        }
        if let Some(last) = self.last_fire_at {
            if now.saturating_sub(last) < FIRE_COOLDOWN_MS {
                return Vec::new();
            }
        }
        let Some(owner) = self.local_id else {
            return Vec::new();
        };

        self.last_fire_at = Some(now);

        let forward = heading_forward(self.vehicle.heading);
        let right = heading_right(self.vehicle.heading);
        let nose = self
            .vehicle
            .position
            .add(forward.scale(VEHICLE_HALF_LENGTH + 0.5));

        let mut packets = Vec::with_capacity(2);
        for side in [-1.0f32, 1.0] {
            self.next_shot_seq += 1;
            let shot_id = ShotId {
                owner,
                seq: self.next_shot_seq,
            };
            let muzzle = nose.add(right.scale(side * MUZZLE_OFFSET));

            self.projectiles.push(Projectile {
                shot_id,
                position: muzzle,
                direction: forward,
                spawned_at: now,
            });
            packets.push(Packet::Fire {
                shot_id,
                position: muzzle,
                direction: forward,
            });
        }
        packets
    }

    /// Advances every projectile, expires the old ones and turns observed
    /// intersections into hit claims. First vehicle within the hit radius
    /// wins; a projectile never tests against its own owner.
    fn step_projectiles(&mut self, dt: f32, now: u64) -> Vec<Packet> {
        let mut claims = Vec::new();
        let local_id = self.local_id;
        let local_position = self.vehicle.position;
        let local_alive = self.alive;
        let mirrors = &self.mirrors;

        self.projectiles.retain_mut(|projectile| {
            if projectile.expired(now) {
                return false;
            }
            projectile.advance(dt);

            let owner = projectile.shot_id.owner;

            if local_alive && Some(owner) != local_id {
                if let Some(id) = local_id {
                    if projectile.position.planar_distance(local_position) < HIT_RADIUS {
                        claims.push(Packet::HitClaim {
                            shot_id: projectile.shot_id,
                            victim_id: id,
                            damage: BULLET_DAMAGE,
                        });
                        return false;
                    }
                }
            }

            for (id, mirror) in mirrors {
                if *id == owner || !mirror.alive {
                    continue;
                }
                if projectile.position.planar_distance(mirror.position) < HIT_RADIUS {
                    claims.push(Packet::HitClaim {
                        shot_id: projectile.shot_id,
                        victim_id: *id,
                        damage: BULLET_DAMAGE,
                    });
                    return false;
                }
            }

            true
        });

        claims
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn connected_state() -> ClientGameState {
        let mut state = ClientGameState::new();
        state.obstacles.clear(); // keep movement tests on open ground
        state.handle_packet(
            Packet::Welcome {
                client_id: 1,
                position: Vec3::default(),
                players: vec![PlayerState::new(1, Vec3::default())],
            },
            0,
        );
        state
    }

    fn mirror_at(state: &mut ClientGameState, id: u32, position: Vec3) {
        state.handle_packet(
            Packet::PlayerJoined {
                player: PlayerState::new(id, position),
            },
            0,
        );
    }

    fn fire_inputs() -> VehicleInputs {
        VehicleInputs {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_welcome_seeds_mirrors_without_self() {
        let mut state = ClientGameState::new();
        state.handle_packet(
            Packet::Welcome {
                client_id: 2,
                position: Vec3::new(500.0, 0.0, 0.0),
                players: vec![
                    PlayerState::new(1, Vec3::new(-500.0, 0.0, 0.0)),
                    PlayerState::new(2, Vec3::new(500.0, 0.0, 0.0)),
                ],
            },
            0,
        );

        assert_eq!(state.local_id, Some(2));
        assert_eq!(state.mirrors.len(), 1);
        assert!(state.mirrors.contains_key(&1));
        assert_eq!(state.vehicle.position, Vec3::new(500.0, 0.0, 0.0));
    }

    #[test]
    fn test_mirror_tracks_exact_received_transform() {
        let mut state = connected_state();
        mirror_at(&mut state, 2, Vec3::default());

        state.handle_packet(
            Packet::PlayerMoved {
                id: 2,
                position: Vec3::new(10.0, 0.0, 5.0),
                rotation: 0.5,
            },
            0,
        );

        let mirror = &state.mirrors[&2];
        assert_eq!(mirror.position, Vec3::new(10.0, 0.0, 5.0));
        assert_eq!(mirror.rotation, 0.5);
    }

    #[test]
    fn test_movement_before_join_notice_creates_mirror() {
        let mut state = connected_state();

        state.handle_packet(
            Packet::PlayerMoved {
                id: 9,
                position: Vec3::new(1.0, 0.0, 1.0),
                rotation: 0.0,
            },
            0,
        );

        assert!(state.mirrors.contains_key(&9));
    }

    #[test]
    fn test_own_movement_echo_is_ignored() {
        let mut state = connected_state();
        state.handle_packet(
            Packet::PlayerMoved {
                id: 1,
                position: Vec3::new(99.0, 0.0, 99.0),
                rotation: 2.0,
            },
            0,
        );

        assert_eq!(state.vehicle.position, Vec3::default());
        assert!(!state.mirrors.contains_key(&1));
    }

    #[test]
    fn test_fire_spawns_pair_and_respects_cooldown() {
        let mut state = connected_state();

        let packets = state.tick(&fire_inputs(), DT, 1000);
        let fires = packets
            .iter()
            .filter(|p| matches!(p, Packet::Fire { .. }))
            .count();
        assert_eq!(fires, 2);
        assert_eq!(state.projectiles.len(), 2);

        // Held inside the window: nothing.
        let packets = state.tick(&fire_inputs(), DT, 1000 + FIRE_COOLDOWN_MS - 1);
        assert!(!packets.iter().any(|p| matches!(p, Packet::Fire { .. })));

        // Window elapsed: next pair, fresh sequences.
        let packets = state.tick(&fire_inputs(), DT, 1000 + FIRE_COOLDOWN_MS);
        let seqs: Vec<u32> = packets
            .iter()
            .filter_map(|p| match p {
                Packet::Fire { shot_id, .. } => Some(shot_id.seq),
                _ => None,
            })
            .collect();
        assert_eq!(seqs, vec![3, 4]);
    }

    #[test]
    fn test_own_projectile_never_hits_self() {
        let mut state = connected_state();

        // Worst case: an own bullet sitting exactly on the vehicle.
        state.projectiles.push(Projectile {
            shot_id: ShotId { owner: 1, seq: 1 },
            position: state.vehicle.position,
            direction: Vec3::new(0.0, 0.0, 1.0),
            spawned_at: 0,
        });

        let packets = state.tick(&VehicleInputs::default(), DT, 10);
        assert!(!packets.iter().any(|p| matches!(p, Packet::HitClaim { .. })));
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_mirrored_projectile_claims_local_hit() {
        let mut state = connected_state();
        mirror_at(&mut state, 2, Vec3::new(300.0, 0.0, 0.0));

        // One frame of travel away from our vehicle, flying straight at it.
        state.handle_packet(
            Packet::BulletSpawned {
                shot_id: ShotId { owner: 2, seq: 1 },
                position: Vec3::new(0.0, 0.0, -6.0),
                direction: Vec3::new(0.0, 0.0, 1.0),
            },
            10,
        );

        let packets = state.tick(&VehicleInputs::default(), DT, 20);
        let claim = packets.iter().find_map(|p| match p {
            Packet::HitClaim {
                shot_id, victim_id, ..
            } => Some((*shot_id, *victim_id)),
            _ => None,
        });

        assert_eq!(claim, Some((ShotId { owner: 2, seq: 1 }, 1)));
        // The projectile is consumed by the hit.
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_own_projectile_claims_mirror_hit() {
        let mut state = connected_state();
        mirror_at(&mut state, 2, Vec3::new(0.0, 0.0, 20.0));

        // Fire straight at the mirror and step until the bullet arrives.
        let mut claimed = None;
        let mut now = 1000;
        state.tick(&fire_inputs(), DT, now);
        for _ in 0..60 {
            now += 16;
            let packets = state.tick(&VehicleInputs::default(), DT, now);
            if let Some(Packet::HitClaim { victim_id, .. }) = packets
                .iter()
                .find(|p| matches!(p, Packet::HitClaim { .. }))
            {
                claimed = Some(*victim_id);
                break;
            }
        }

        assert_eq!(claimed, Some(2));
    }

    #[test]
    fn test_projectile_hits_first_vehicle_only() {
        let mut state = connected_state();
        mirror_at(&mut state, 2, Vec3::new(0.0, 0.0, 10.0));
        mirror_at(&mut state, 3, Vec3::new(0.0, 0.0, 11.0));

        // After one frame of travel the bullet sits between both mirrors,
        // within the hit radius of each.
        state.handle_packet(
            Packet::BulletSpawned {
                shot_id: ShotId { owner: 4, seq: 1 },
                position: Vec3::new(0.0, 0.0, 3.8),
                direction: Vec3::new(0.0, 0.0, 1.0),
            },
            0,
        );

        let packets = state.tick(&VehicleInputs::default(), DT, 10);
        let claims = packets
            .iter()
            .filter(|p| matches!(p, Packet::HitClaim { .. }))
            .count();
        assert_eq!(claims, 1);
    }

    #[test]
    fn test_dead_mirror_not_a_valid_victim() {
        let mut state = connected_state();
        mirror_at(&mut state, 2, Vec3::new(0.0, 0.0, 10.0));
        state.handle_packet(
            Packet::HealthUpdate {
                victim_id: 2,
                shooter_id: 3,
                shot_id: ShotId { owner: 3, seq: 1 },
                health: 0,
                alive: false,
            },
            0,
        );

        state.handle_packet(
            Packet::BulletSpawned {
                shot_id: ShotId { owner: 3, seq: 2 },
                position: Vec3::new(0.0, 0.0, 10.0),
                direction: Vec3::new(0.0, 0.0, 1.0),
            },
            0,
        );

        let packets = state.tick(&VehicleInputs::default(), DT, 10);
        assert!(!packets.iter().any(|p| matches!(p, Packet::HitClaim { .. })));
    }

    #[test]
    fn test_duplicate_bullet_event_spawns_once() {
        let mut state = connected_state();

        let spawn = Packet::BulletSpawned {
            shot_id: ShotId { owner: 2, seq: 7 },
            position: Vec3::new(50.0, 0.0, 50.0),
            direction: Vec3::new(0.0, 0.0, 1.0),
        };
        state.handle_packet(spawn.clone(), 100);
        state.handle_packet(spawn, 100);

        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_projectile_expires_after_ttl() {
        let mut state = connected_state();
        state.handle_packet(
            Packet::BulletSpawned {
                shot_id: ShotId { owner: 2, seq: 1 },
                position: Vec3::new(50.0, 0.0, 50.0),
                direction: Vec3::new(0.0, 0.0, 1.0),
            },
            1000,
        );

        state.tick(&VehicleInputs::default(), DT, 1000 + BULLET_TTL_MS - 1);
        assert_eq!(state.projectiles.len(), 1);

        state.tick(&VehicleInputs::default(), DT, 1000 + BULLET_TTL_MS);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_death_halts_simulation_and_emission() {
        let mut state = connected_state();
        state.handle_packet(
            Packet::HealthUpdate {
                victim_id: 1,
                shooter_id: 2,
                shot_id: ShotId { owner: 2, seq: 1 },
                health: 0,
                alive: false,
            },
            0,
        );

        assert!(!state.alive);
        assert_eq!(state.vehicle.speed, 0.0);

        let inputs = VehicleInputs {
            accelerate: true,
            fire: true,
            ..Default::default()
        };
        let packets = state.tick(&inputs, DT, 100);

        assert!(packets.is_empty());
        assert_eq!(state.vehicle.position, Vec3::default());
    }

    #[test]
    fn test_respawn_restores_local_vehicle() {
        let mut state = connected_state();
        state.vehicle.speed = 120.0;
        state.handle_packet(
            Packet::HealthUpdate {
                victim_id: 1,
                shooter_id: 2,
                shot_id: ShotId { owner: 2, seq: 1 },
                health: 0,
                alive: false,
            },
            0,
        );

        state.handle_packet(
            Packet::Respawned {
                id: 1,
                position: Vec3::new(200.0, 0.0, -200.0),
            },
            5000,
        );

        assert!(state.alive);
        assert_eq!(state.health, MAX_HEALTH);
        assert_eq!(state.vehicle.position, Vec3::new(200.0, 0.0, -200.0));
        assert_eq!(state.vehicle.speed, 0.0);

        let packets = state.tick(&VehicleInputs::default(), DT, 5100);
        assert!(packets
            .iter()
            .any(|p| matches!(p, Packet::Movement { .. })));
    }

    #[test]
    fn test_health_update_applies_to_mirror() {
        let mut state = connected_state();
        mirror_at(&mut state, 2, Vec3::new(10.0, 0.0, 0.0));

        state.handle_packet(
            Packet::HealthUpdate {
                victim_id: 2,
                shooter_id: 1,
                shot_id: ShotId { owner: 1, seq: 1 },
                health: 90,
                alive: true,
            },
            0,
        );

        assert_eq!(state.mirrors[&2].health, 90);
        assert!(state.mirrors[&2].alive);
        // Local state untouched.
        assert_eq!(state.health, MAX_HEALTH);
    }

    #[test]
    fn test_player_left_removes_mirror() {
        let mut state = connected_state();
        mirror_at(&mut state, 2, Vec3::new(10.0, 0.0, 0.0));

        state.handle_packet(Packet::PlayerLeft { id: 2 }, 0);
        assert!(state.mirrors.is_empty());

        // Stale removal is a no-op.
        state.handle_packet(Packet::PlayerLeft { id: 2 }, 0);
    }

    #[test]
    fn test_obstacle_collision_reverts_and_bounces() {
        let mut state = connected_state();
        state.obstacles = vec![Obstacle::new(0.0, 10.0, 5.0, 5.0)];
        state.vehicle.position = Vec3::new(0.0, 0.0, 2.0);
        state.vehicle.speed = 100.0; // heading +z, straight at the box

        let before = state.vehicle.position;
        state.tick(&VehicleInputs::default(), DT, 10);

        // Bounced back: speed inverted and dampened, pushed away on -z.
        assert!(state.vehicle.speed < 0.0);
        assert!(state.vehicle.position.z < before.z + 0.001);
    }

    #[test]
    fn test_vehicle_collision_reports_inverse_impulse() {
        let mut state = connected_state();
        mirror_at(&mut state, 2, Vec3::new(0.0, 0.0, 5.0));
        state.vehicle.speed = 100.0;

        let packets = state.tick(&VehicleInputs::default(), DT, 10);
        let report = packets.iter().find_map(|p| match p {
            Packet::CollisionReport {
                other_id, impulse, ..
            } => Some((*other_id, *impulse)),
            _ => None,
        });

        let (other_id, impulse) = report.expect("collision should be reported");
        assert_eq!(other_id, 2);
        // Inverse impulse pushes the other vehicle away from us: +z.
        assert!(impulse.z > 0.0);
        assert!(state.vehicle.speed < 0.0);
    }

    #[test]
    fn test_relayed_impulse_applies_to_local_vehicle() {
        let mut state = connected_state();
        state.vehicle.speed = 60.0;

        state.handle_packet(
            Packet::CollisionImpulse {
                from_id: 2,
                impulse: Vec3::new(0.0, 0.0, 3.0),
                spin: -0.15,
            },
            0,
        );

        assert_eq!(state.vehicle.position.z, 3.0);
        assert_eq!(state.vehicle.heading, -0.15);
        assert_eq!(state.vehicle.speed, -30.0);
    }

    #[test]
    fn test_not_connected_emits_nothing() {
        let mut state = ClientGameState::new();
        let packets = state.tick(&fire_inputs(), DT, 100);
        assert!(packets.is_empty());
    }
}

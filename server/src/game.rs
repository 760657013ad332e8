//! Authoritative participant state: transforms, health, death and respawn.
//!
//! Clients simulate their own movement and report it; they also report hits
//! they observe. This module is the single authority that turns hit claims
//! into health changes. Both the shooter's and the victim's client may claim
//! the same hit independently, and the transport may replay any claim, so
//! every (shot, victim) pair is applied at most once via a deadline-evicted
//! ledger.

use crate::spawn::SpawnPool;
use log::{debug, info, warn};
use shared::{
    PlayerState, ShotId, Vec3, BULLET_TTL_MS, MAX_HEALTH, RESPAWN_DELAY_MS, SHOT_SEEN_GRACE_MS,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: u32,
    pub position: Vec3,
    pub rotation: f32,
    pub health: u32,
    pub alive: bool,
    /// Deadline for coming back, checked once per tick. A deadline whose
    /// participant has disconnected simply never fires.
    pub respawn_at: Option<u64>,
}

impl Participant {
    fn new(id: u32, position: Vec3) -> Self {
        Self {
            id,
            position,
            rotation: 0.0,
            health: MAX_HEALTH,
            alive: true,
            respawn_at: None,
        }
    }

    pub fn snapshot(&self) -> PlayerState {
        PlayerState {
            id: self.id,
            position: self.position,
            rotation: self.rotation,
            health: self.health,
            alive: self.alive,
        }
    }
}

/// Result of an accepted hit claim, ready for broadcast.
#[derive(Debug, Clone, Copy)]
pub struct HitApplied {
    pub victim_id: u32,
    pub shooter_id: u32,
    pub shot_id: ShotId,
    pub health: u32,
    pub alive: bool,
}

pub struct GameState {
    pub participants: HashMap<u32, Participant>,
    spawn_pool: SpawnPool,
    /// (shot, victim) pairs already applied -> eviction deadline.
    hit_ledger: HashMap<(ShotId, u32), u64>,
    /// Shots already relayed -> eviction deadline. A replayed Fire packet
    /// must not spawn a second mirrored projectile anywhere.
    relayed_shots: HashMap<ShotId, u64>,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_pool(SpawnPool::new())
    }

    pub fn with_pool(spawn_pool: SpawnPool) -> Self {
        Self {
            participants: HashMap::new(),
            spawn_pool,
            hit_ledger: HashMap::new(),
            relayed_shots: HashMap::new(),
        }
    }

    /// Inserts a participant at a freshly allocated spawn point.
    pub fn add_participant(&mut self, id: u32) -> Vec3 {
        let position = self.spawn_pool.allocate(id);
        info!(
            "participant {} spawned at ({:.0}, {:.0})",
            id, position.x, position.z
        );
        self.participants.insert(id, Participant::new(id, position));
        position
    }

    /// Removes a participant and releases its spawn point.
    pub fn remove_participant(&mut self, id: &u32) -> bool {
        self.spawn_pool.release(*id);
        if self.participants.remove(id).is_some() {
            info!("participant {} removed", id);
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> Vec<PlayerState> {
        self.participants.values().map(|p| p.snapshot()).collect()
    }

    /// Stores a transform reported by the participant itself. Updates for
    /// unknown or dead participants are dropped; a dead vehicle is excluded
    /// from simulation until it respawns.
    pub fn update_transform(&mut self, id: u32, position: Vec3, rotation: f32) -> bool {
        match self.participants.get_mut(&id) {
            Some(p) if p.alive => {
                p.position = position;
                p.rotation = rotation;
                true
            }
            Some(_) => false,
            None => false,
        }
    }

    /// Admits a shot for relay. Returns false when the claimed owner does not
    /// match the sending connection, the shooter is missing or dead, or the
    /// shot was already relayed (transport replay).
    pub fn register_shot(&mut self, shot_id: ShotId, sender: u32, now: u64) -> bool {
        if shot_id.owner != sender {
            warn!(
                "connection {} sent a shot owned by {}, dropping",
                sender, shot_id.owner
            );
            return false;
        }

        match self.participants.get(&sender) {
            Some(p) if p.alive => {}
            _ => return false,
        }

        if self.relayed_shots.contains_key(&shot_id) {
            debug!("duplicate fire event for shot {:?}, ignoring", shot_id);
            return false;
        }

        self.relayed_shots
            .insert(shot_id, now + BULLET_TTL_MS + SHOT_SEEN_GRACE_MS);
        true
    }

    /// Applies a hit claim. Exactly one health decrement can ever happen per
    /// (shot, victim) pair, no matter how many clients observed the hit or
    /// how often the transport replays a claim.
    pub fn apply_hit(
        &mut self,
        shot_id: ShotId,
        victim_id: u32,
        damage: u32,
        now: u64,
    ) -> Option<HitApplied> {
        let shooter_id = shot_id.owner;

        if shooter_id == victim_id {
            warn!(
                "hit claim with shooter {} as its own victim, dropping",
                shooter_id
            );
            return None;
        }

        // A dead vehicle is neither a valid shooter nor a valid victim.
        match self.participants.get(&shooter_id) {
            Some(shooter) if shooter.alive => {}
            _ => {
                debug!("hit claim from missing or dead shooter {}", shooter_id);
                return None;
            }
        }

        let key = (shot_id, victim_id);
        if self.hit_ledger.contains_key(&key) {
            debug!("duplicate hit claim for {:?}, ignoring", key);
            return None;
        }

        let victim = match self.participants.get_mut(&victim_id) {
            Some(v) if v.alive => v,
            _ => {
                debug!("hit claim for missing or dead victim {}", victim_id);
                return None;
            }
        };

        self.hit_ledger
            .insert(key, now + BULLET_TTL_MS + SHOT_SEEN_GRACE_MS);

        victim.health = victim.health.saturating_sub(damage);
        if victim.health == 0 {
            victim.alive = false;
            victim.respawn_at = Some(now + RESPAWN_DELAY_MS);
            info!(
                "participant {} destroyed by {} (shot {:?})",
                victim_id, shooter_id, shot_id
            );
        }

        Some(HitApplied {
            victim_id,
            shooter_id,
            shot_id,
            health: victim.health,
            alive: victim.alive,
        })
    }

    /// Advances timed state: evicts stale ledger entries and performs due
    /// respawns. Returns the (id, new position) of every respawned
    /// participant for broadcasting.
    pub fn tick(&mut self, now: u64) -> Vec<(u32, Vec3)> {
        self.hit_ledger.retain(|_, deadline| *deadline > now);
        self.relayed_shots.retain(|_, deadline| *deadline > now);

        let due: Vec<u32> = self
            .participants
            .values()
            .filter(|p| !p.alive && p.respawn_at.map_or(false, |at| at <= now))
            .map(|p| p.id)
            .collect();

        let mut respawned = Vec::new();
        for id in due {
            let position = self.spawn_pool.allocate(id);
            if let Some(p) = self.participants.get_mut(&id) {
                p.position = position;
                p.rotation = 0.0;
                p.health = MAX_HEALTH;
                p.alive = true;
                p.respawn_at = None;
                info!(
                    "participant {} respawned at ({:.0}, {:.0})",
                    id, position.x, position.z
                );
                respawned.push((id, position));
            }
        }

        respawned
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BULLET_DAMAGE;

    fn state_with_two() -> GameState {
        let pool = SpawnPool::with_points(vec![
            Vec3::new(-500.0, 0.0, 0.0),
            Vec3::new(500.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 500.0),
            Vec3::new(0.0, 0.0, -500.0),
        ]);
        let mut state = GameState::with_pool(pool);
        state.add_participant(1);
        state.add_participant(2);
        state
    }

    fn shot(owner: u32, seq: u32) -> ShotId {
        ShotId { owner, seq }
    }

    #[test]
    fn test_hit_decrements_health_once() {
        let mut state = state_with_two();

        let applied = state.apply_hit(shot(1, 1), 2, BULLET_DAMAGE, 1000);
        assert_eq!(applied.unwrap().health, MAX_HEALTH - BULLET_DAMAGE);

        // Replays of the same claim change nothing, no matter how many.
        for _ in 0..10 {
            assert!(state.apply_hit(shot(1, 1), 2, BULLET_DAMAGE, 1000).is_none());
        }
        assert_eq!(state.participants[&2].health, MAX_HEALTH - BULLET_DAMAGE);
    }

    #[test]
    fn test_shooter_cannot_be_own_victim() {
        let mut state = state_with_two();
        assert!(state.apply_hit(shot(1, 1), 1, BULLET_DAMAGE, 1000).is_none());
        assert_eq!(state.participants[&1].health, MAX_HEALTH);
    }

    #[test]
    fn test_distinct_shots_each_apply() {
        let mut state = state_with_two();
        state.apply_hit(shot(1, 1), 2, BULLET_DAMAGE, 1000);
        state.apply_hit(shot(1, 2), 2, BULLET_DAMAGE, 1100);
        assert_eq!(
            state.participants[&2].health,
            MAX_HEALTH - 2 * BULLET_DAMAGE
        );
    }

    #[test]
    fn test_health_never_goes_negative() {
        let mut state = state_with_two();
        let mut seq = 0;

        // 60 + 60 overshoots 100; the second hit clamps at zero.
        let outcome = loop {
            seq += 1;
            match state.apply_hit(shot(1, seq), 2, 60, 1000) {
                Some(applied) if !applied.alive => break applied,
                Some(_) => continue,
                None => panic!("live victim rejected a fresh shot"),
            }
        };

        assert_eq!(outcome.health, 0);
        assert!(state
            .apply_hit(shot(1, seq + 1), 2, BULLET_DAMAGE, 1000)
            .is_none());
        assert_eq!(state.participants[&2].health, 0);
    }

    #[test]
    fn test_death_sets_respawn_deadline_not_timer() {
        let mut state = state_with_two();
        state.apply_hit(shot(1, 1), 2, MAX_HEALTH, 5000);

        let p = &state.participants[&2];
        assert!(!p.alive);
        assert_eq!(p.respawn_at, Some(5000 + RESPAWN_DELAY_MS));
    }

    #[test]
    fn test_respawn_waits_for_the_full_delay() {
        let mut state = state_with_two();
        state.apply_hit(shot(1, 1), 2, MAX_HEALTH, 5000);

        assert!(state.tick(5000 + RESPAWN_DELAY_MS - 1).is_empty());

        let respawned = state.tick(5000 + RESPAWN_DELAY_MS);
        assert_eq!(respawned.len(), 1);
        assert_eq!(respawned[0].0, 2);

        let p = &state.participants[&2];
        assert!(p.alive);
        assert_eq!(p.health, MAX_HEALTH);
        assert_eq!(p.respawn_at, None);
    }

    #[test]
    fn test_respawn_point_not_occupied_by_the_living() {
        let mut state = state_with_two();
        let other = state.participants[&1].position;

        state.apply_hit(shot(1, 1), 2, MAX_HEALTH, 0);
        let respawned = state.tick(RESPAWN_DELAY_MS);

        assert_ne!(respawned[0].1.x as i32, other.x as i32);
    }

    #[test]
    fn test_respawn_deadline_after_disconnect_is_noop() {
        let mut state = state_with_two();
        state.apply_hit(shot(1, 1), 2, MAX_HEALTH, 0);
        state.remove_participant(&2);

        assert!(state.tick(RESPAWN_DELAY_MS + 1).is_empty());
        assert!(!state.participants.contains_key(&2));
    }

    #[test]
    fn test_dead_shooter_claims_dropped() {
        let mut state = state_with_two();
        state.apply_hit(shot(2, 1), 1, MAX_HEALTH, 0);

        // Participant 1 is dead; its in-flight bullets die with it.
        assert!(state.apply_hit(shot(1, 7), 2, BULLET_DAMAGE, 100).is_none());
        assert_eq!(state.participants[&2].health, MAX_HEALTH);
    }

    #[test]
    fn test_stale_victim_claim_is_noop() {
        let mut state = state_with_two();
        state.remove_participant(&2);
        assert!(state.apply_hit(shot(1, 1), 2, BULLET_DAMAGE, 0).is_none());
    }

    #[test]
    fn test_register_shot_rejects_spoofed_owner() {
        let mut state = state_with_two();
        assert!(!state.register_shot(shot(2, 1), 1, 0));
        assert!(state.register_shot(shot(1, 1), 1, 0));
    }

    #[test]
    fn test_register_shot_deduplicates_replays() {
        let mut state = state_with_two();
        assert!(state.register_shot(shot(1, 1), 1, 0));
        assert!(!state.register_shot(shot(1, 1), 1, 0));
        assert!(state.register_shot(shot(1, 2), 1, 0));
    }

    #[test]
    fn test_register_shot_rejects_dead_shooter() {
        let mut state = state_with_two();
        state.apply_hit(shot(2, 1), 1, MAX_HEALTH, 0);
        assert!(!state.register_shot(shot(1, 5), 1, 100));
    }

    #[test]
    fn test_ledger_eviction_after_ttl_and_grace() {
        let mut state = state_with_two();
        state.apply_hit(shot(1, 1), 2, BULLET_DAMAGE, 0);
        assert_eq!(state.hit_ledger.len(), 1);

        state.tick(BULLET_TTL_MS + SHOT_SEEN_GRACE_MS - 1);
        assert_eq!(state.hit_ledger.len(), 1);

        state.tick(BULLET_TTL_MS + SHOT_SEEN_GRACE_MS);
        assert!(state.hit_ledger.is_empty());
    }

    #[test]
    fn test_movement_for_dead_participant_dropped() {
        let mut state = state_with_two();
        state.apply_hit(shot(1, 1), 2, MAX_HEALTH, 0);

        let before = state.participants[&2].position;
        assert!(!state.update_transform(2, Vec3::new(9.0, 0.0, 9.0), 1.0));
        assert_eq!(state.participants[&2].position, before);
    }

    #[test]
    fn test_movement_for_unknown_participant_dropped() {
        let mut state = state_with_two();
        assert!(!state.update_transform(42, Vec3::default(), 0.0));
    }

    #[test]
    fn test_update_transform_stores_exact_values() {
        let mut state = state_with_two();
        assert!(state.update_transform(1, Vec3::new(10.0, 0.0, 5.0), 0.5));

        let p = &state.participants[&1];
        assert_eq!(p.position, Vec3::new(10.0, 0.0, 5.0));
        assert_eq!(p.rotation, 0.5);
    }
}

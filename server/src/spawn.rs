//! Spawn-point arbitration.
//!
//! Points come from a fixed grid sized to comfortably exceed the expected
//! peer count. Allocation never hands out a point currently held by a live
//! participant; when the pool is genuinely exhausted it degrades by reusing
//! the least-recently-used point instead of failing the connection.

use log::warn;
use rand::seq::SliceRandom;
use shared::{Vec3, SPAWN_GRID_SIZE, SPAWN_SPACING};
use std::collections::HashMap;

pub struct SpawnPool {
    points: Vec<Vec3>,
    /// participant id -> index of the point it currently holds
    occupied: HashMap<u32, usize>,
    /// monotone allocation stamp per point, for least-recently-used ordering
    last_used: Vec<u64>,
    counter: u64,
}

impl SpawnPool {
    /// Builds the standard shuffled grid centered on the origin.
    pub fn new() -> Self {
        let half = (SPAWN_GRID_SIZE / 2) as i32;
        let mut points = Vec::with_capacity(SPAWN_GRID_SIZE * SPAWN_GRID_SIZE);

        for i in 0..SPAWN_GRID_SIZE as i32 {
            for j in 0..SPAWN_GRID_SIZE as i32 {
                points.push(Vec3::new(
                    (i - half) as f32 * SPAWN_SPACING,
                    0.0,
                    (j - half) as f32 * SPAWN_SPACING,
                ));
            }
        }

        points.shuffle(&mut rand::thread_rng());
        Self::with_points(points)
    }

    /// Pool over an explicit point list, in order. Used by tests that need
    /// deterministic assignments or tiny pools.
    pub fn with_points(points: Vec<Vec3>) -> Self {
        let last_used = vec![0; points.len()];
        Self {
            points,
            occupied: HashMap::new(),
            last_used,
            counter: 0,
        }
    }

    /// Assigns a point to `id` and returns it. A participant that already
    /// holds a point keeps exactly one: the old one is released first.
    pub fn allocate(&mut self, id: u32) -> Vec3 {
        self.release(id);

        let free = (0..self.points.len())
            .filter(|idx| !self.occupied.values().any(|held| held == idx))
            .min_by_key(|idx| self.last_used[*idx]);

        let idx = match free {
            Some(idx) => idx,
            None => {
                // Exhausted: fall back to the least-recently-used point.
                let idx = (0..self.points.len())
                    .min_by_key(|idx| self.last_used[*idx])
                    .unwrap_or(0);
                warn!("spawn pool exhausted, reusing point {}", idx);
                idx
            }
        };

        self.counter += 1;
        self.last_used[idx] = self.counter;
        self.occupied.insert(id, idx);
        self.points[idx]
    }

    /// Releases whatever point `id` holds. No-op for unknown ids.
    pub fn release(&mut self, id: u32) {
        self.occupied.remove(&id);
    }

    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }
}

impl Default for SpawnPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_pool(n: usize) -> SpawnPool {
        let points = (0..n)
            .map(|i| Vec3::new(i as f32 * 100.0, 0.0, 0.0))
            .collect();
        SpawnPool::with_points(points)
    }

    #[test]
    fn test_grid_dimensions() {
        let pool = SpawnPool::new();
        assert_eq!(pool.capacity(), SPAWN_GRID_SIZE * SPAWN_GRID_SIZE);
        assert_eq!(pool.occupied_count(), 0);
    }

    #[test]
    fn test_no_two_live_participants_share_a_point() {
        let mut pool = small_pool(8);
        let mut assigned = Vec::new();

        for id in 0..8 {
            let point = pool.allocate(id);
            assert!(
                !assigned.contains(&(point.x as i32)),
                "point {} handed out twice",
                point.x
            );
            assigned.push(point.x as i32);
        }
    }

    #[test]
    fn test_release_makes_point_reusable() {
        let mut pool = small_pool(2);
        let a = pool.allocate(1);
        let _b = pool.allocate(2);

        pool.release(1);
        assert_eq!(pool.occupied_count(), 1);

        let c = pool.allocate(3);
        assert_eq!(a.x as i32, c.x as i32);
    }

    #[test]
    fn test_reallocate_moves_the_participant() {
        let mut pool = small_pool(3);
        let first = pool.allocate(1);
        let second = pool.allocate(1);

        // Still only one point held, and it is a different one.
        assert_eq!(pool.occupied_count(), 1);
        assert_ne!(first.x as i32, second.x as i32);
    }

    #[test]
    fn test_exhaustion_degrades_to_lru_reuse() {
        let mut pool = small_pool(2);
        let a = pool.allocate(1);
        let _b = pool.allocate(2);

        // Third participant with a full pool gets the oldest assignment.
        let c = pool.allocate(3);
        assert_eq!(a.x as i32, c.x as i32);
        assert_eq!(pool.occupied_count(), 3);
    }

    #[test]
    fn test_lru_prefers_longest_idle_point() {
        let mut pool = small_pool(2);
        let a = pool.allocate(1);
        let b = pool.allocate(2);
        pool.release(1);
        pool.release(2);

        // Point a has the older stamp of the two released ones.
        let next = pool.allocate(3);
        assert_eq!(next.x as i32, a.x as i32);
        let next = pool.allocate(4);
        assert_eq!(next.x as i32, b.x as i32);
    }
}

//! Local vehicle kinematics.
//!
//! Deliberately not real vehicle dynamics: speed integrates toward a signed
//! bound with independent acceleration and braking rates, and the turn rate
//! scales with the current speed fraction so a crawling vehicle barely
//! steers. Frame intervals vary; all rates are per-second and multiplied by
//! the frame delta, so long frames cannot slingshot the speed past its
//! bounds.

use shared::{
    heading_forward, Vec3, ACCEL_RATE, ARENA_HALF_EXTENT, BASE_TURN_RATE, BOUNCE_PUSH,
    BRAKE_RATE, COAST_RATE, MAX_REVERSE_SPEED, MAX_SPEED,
};

/// Boolean intents sampled once per frame from the input surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleInputs {
    pub accelerate: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub fire: bool,
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub position: Vec3,
    /// Yaw about +y; zero faces +z.
    pub heading: f32,
    /// Signed scalar speed along the heading; negative is reverse.
    pub speed: f32,
}

impl Vehicle {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            heading: 0.0,
            speed: 0.0,
        }
    }

    /// Advances speed and heading from the frame's inputs and returns the
    /// candidate position. The caller runs collision checks on the candidate
    /// and then either [`commit`](Self::commit)s it or reverts with
    /// [`bounce`](Self::bounce).
    pub fn integrate(&mut self, inputs: &VehicleInputs, dt: f32) -> Vec3 {
        if inputs.accelerate {
            self.speed += ACCEL_RATE * dt;
        }
        if inputs.brake {
            self.speed -= BRAKE_RATE * dt;
        }
        if !inputs.accelerate && !inputs.brake {
            let drop = COAST_RATE * dt;
            if self.speed > 0.0 {
                self.speed = (self.speed - drop).max(0.0);
            } else {
                self.speed = (self.speed + drop).min(0.0);
            }
        }
        self.speed = self.speed.clamp(-MAX_REVERSE_SPEED, MAX_SPEED);

        let turn = BASE_TURN_RATE * (self.speed.abs() / MAX_SPEED) * dt;
        if inputs.turn_left {
            self.heading += turn;
        }
        if inputs.turn_right {
            self.heading -= turn;
        }

        let mut candidate = self
            .position
            .add(heading_forward(self.heading).scale(self.speed * dt));
        candidate.x = candidate.x.clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
        candidate.z = candidate.z.clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
        candidate
    }

    pub fn commit(&mut self, candidate: Vec3) {
        self.position = candidate;
    }

    /// Collision response: push out along the normal, invert and dampen the
    /// speed. The position stays at its pre-candidate value plus the push.
    pub fn bounce(&mut self, normal: Vec3) {
        self.position = self.position.add(normal.scale(BOUNCE_PUSH));
        self.speed *= -0.5;
    }

    /// Relayed response from the other party of a vehicle collision.
    pub fn apply_impulse(&mut self, impulse: Vec3, spin: f32) {
        self.position = self.position.add(impulse);
        self.heading += spin;
        self.speed *= -0.5;
    }

    /// Fresh state at a spawn point: zero speed, default heading.
    pub fn reset_at(&mut self, position: Vec3) {
        *self = Vehicle::at(position);
    }
}

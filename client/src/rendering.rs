//! Top-down debug view of the arena. Presentation only: everything drawn
//! here is read from the game state, nothing is decided here.

use crate::game::ClientGameState;
use macroquad::prelude::*;
use shared::{Obstacle, Vec3, ARENA_HALF_EXTENT, MAX_HEALTH, VEHICLE_HALF_LENGTH, VEHICLE_HALF_WIDTH};

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, game: &ClientGameState) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        let scale = self.scale();
        self.draw_arena(scale);

        for obstacle in &game.obstacles {
            self.draw_obstacle(obstacle, scale);
        }

        for (id, mirror) in &game.mirrors {
            if mirror.alive {
                self.draw_vehicle(mirror.position, mirror.rotation, false, scale);
                self.draw_health_bar(mirror.position, mirror.health, scale);
                self.draw_id_tag(*id, mirror.position, scale);
            }
        }

        if game.connected() && game.alive {
            self.draw_vehicle(game.vehicle.position, game.vehicle.heading, true, scale);
            self.draw_health_bar(game.vehicle.position, game.health, scale);
        }

        for projectile in &game.projectiles {
            let (x, y) = self.world_to_screen(projectile.position, scale);
            draw_circle(x, y, 2.0, YELLOW);
        }

        self.draw_ui(game);
    }

    fn scale(&self) -> f32 {
        screen_width().min(screen_height()) / (2.0 * ARENA_HALF_EXTENT + 100.0)
    }

    /// World x maps to screen x, world z to screen y, arena centered.
    fn world_to_screen(&self, position: Vec3, scale: f32) -> (f32, f32) {
        (
            screen_width() / 2.0 + position.x * scale,
            screen_height() / 2.0 + position.z * scale,
        )
    }

    fn draw_arena(&self, scale: f32) {
        let (x, y) = self.world_to_screen(
            Vec3::new(-ARENA_HALF_EXTENT, 0.0, -ARENA_HALF_EXTENT),
            scale,
        );
        let side = 2.0 * ARENA_HALF_EXTENT * scale;
        draw_rectangle_lines(x, y, side, side, 2.0, Color::from_rgba(68, 68, 68, 255));
    }

    fn draw_obstacle(&self, obstacle: &Obstacle, scale: f32) {
        let corner = Vec3::new(
            obstacle.center.x - obstacle.half_width,
            0.0,
            obstacle.center.z - obstacle.half_depth,
        );
        let (x, y) = self.world_to_screen(corner, scale);
        draw_rectangle(
            x,
            y,
            2.0 * obstacle.half_width * scale,
            2.0 * obstacle.half_depth * scale,
            Color::from_rgba(90, 90, 90, 255),
        );
    }

    fn draw_vehicle(&self, position: Vec3, heading: f32, is_local: bool, scale: f32) {
        let (x, y) = self.world_to_screen(position, scale);
        let color = if is_local {
            GREEN
        } else {
            Color::from_rgba(255, 68, 68, 255)
        };

        // Oversized on screen so vehicles stay visible at arena scale.
        let w = (2.0 * VEHICLE_HALF_WIDTH * scale).max(6.0);
        let h = (2.0 * VEHICLE_HALF_LENGTH * scale).max(12.0);

        draw_rectangle_ex(
            x,
            y,
            w,
            h,
            DrawRectangleParams {
                offset: vec2(0.5, 0.5),
                // Yaw is counter-clockwise about +y; screen y points down.
                rotation: -heading,
                color,
            },
        );
    }

    fn draw_health_bar(&self, position: Vec3, health: u32, scale: f32) {
        let (x, y) = self.world_to_screen(position, scale);
        let width = 20.0;
        let filled = width * health as f32 / MAX_HEALTH as f32;

        draw_rectangle(x - width / 2.0, y - 16.0, width, 3.0, Color::from_rgba(51, 51, 51, 255));
        let color = if health > 50 {
            GREEN
        } else if health > 25 {
            YELLOW
        } else {
            RED
        };
        draw_rectangle(x - width / 2.0, y - 16.0, filled, 3.0, color);
    }

    fn draw_id_tag(&self, id: u32, position: Vec3, scale: f32) {
        let (x, y) = self.world_to_screen(position, scale);
        draw_text(&format!("{}", id), x + 8.0, y - 8.0, 14.0, WHITE);
    }

    fn draw_ui(&self, game: &ClientGameState) {
        let status = match game.local_id {
            Some(id) => format!("id {}  |  {} peers", id, game.mirrors.len()),
            None => "connecting...".to_string(),
        };
        draw_text(&status, 10.0, 20.0, 16.0, WHITE);
        draw_text(&format!("health {}", game.health), 10.0, 38.0, 16.0, WHITE);

        if game.connected() && !game.alive {
            let text = "DESTROYED - respawning";
            let size = measure_text(text, None, 28, 1.0);
            draw_text(
                text,
                screen_width() / 2.0 - size.width / 2.0,
                screen_height() / 2.0,
                28.0,
                RED,
            );
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

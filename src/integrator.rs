//! Minimal explicit-Euler rigid-rectangle integrator.
//!
//! One step applies, in order: gravity accumulation on vertical velocity,
//! multiplicative horizontal damping, position integration, rotation
//! integration, then axis-aligned floor and wall collision response with
//! restitution.  There is deliberately no body–body collision: the collapse
//! puzzle only needs blocks to fall, bounce, and pile visually, and the
//! stacking puzzle runs on the full Rapier world instead.  This module is
//! the single home of the hand-rolled stepping logic — nothing else in the
//! crate integrates motion by hand.
//!
//! All rates are **per tick**: the caller advances one step per rendered
//! frame, which is the cadence the constants were tuned at.

use bevy::prelude::*;

/// Kinematic state of one free rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState2D {
    /// Centre position, y-up.
    pub pos: Vec2,
    /// Linear velocity (units per tick).
    pub vel: Vec2,
    /// Rotation angle (radians).
    pub angle: f32,
    /// Angular velocity (radians per tick).
    pub angvel: f32,
}

impl BodyState2D {
    /// A body at rest at `pos`.
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            angvel: 0.0,
        }
    }
}

/// Integration parameters plus the axis-aligned arena the bodies live in.
///
/// `floor_y`, `wall_min_x`, and `wall_max_x` bound the body **centre**, so
/// callers inset the arena edges by half the body size.
#[derive(Debug, Clone, Copy)]
pub struct Integrator2D {
    /// Downward acceleration added to `vel.y` every tick.
    pub gravity: f32,
    /// Multiplicative horizontal damping applied every tick.
    pub air_damping: f32,
    /// Bounce energy retention on floor/wall contact. 0 = dead stop,
    /// 1 = perfectly elastic.
    pub restitution: f32,
    /// Extra horizontal damping applied on each floor contact.
    pub floor_damping: f32,
    /// Angular damping applied on each floor contact.
    pub floor_angular_damping: f32,
    /// Vertical speeds below this are zeroed on floor contact so the bounce
    /// tail terminates instead of micro-bouncing forever.
    pub rest_speed: f32,
    /// Lowest permitted centre y.
    pub floor_y: f32,
    /// Leftmost permitted centre x.
    pub wall_min_x: f32,
    /// Rightmost permitted centre x.
    pub wall_max_x: f32,
}

impl Integrator2D {
    /// Advance `body` by one tick.
    pub fn step(&self, body: &mut BodyState2D) {
        // Integrate.
        body.vel.y -= self.gravity;
        body.vel.x *= self.air_damping;
        body.pos += body.vel;
        body.angle += body.angvel;

        // Floor: clamp, invert vertical velocity with restitution, damp the
        // horizontal and angular components, and kill residual micro-bounce.
        if body.pos.y < self.floor_y {
            body.pos.y = self.floor_y;
            body.vel.y = -body.vel.y * self.restitution;
            body.vel.x *= self.floor_damping;
            body.angvel *= self.floor_angular_damping;
            if body.vel.y.abs() < self.rest_speed {
                body.vel.y = 0.0;
            }
        }

        // Walls: clamp symmetrically and reflect with restitution.
        if body.pos.x < self.wall_min_x {
            body.pos.x = self.wall_min_x;
            body.vel.x = -body.vel.x * self.restitution;
        }
        if body.pos.x > self.wall_max_x {
            body.pos.x = self.wall_max_x;
            body.vel.x = -body.vel.x * self.restitution;
        }
    }

    /// True once a body has come to vertical rest on the floor.
    pub fn is_settled(&self, body: &BodyState2D) -> bool {
        body.pos.y <= self.floor_y && body.vel.y == 0.0
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    /// Integrator configured like the collapse arena, bounding a 60-unit
    /// block's centre.
    fn collapse_integrator() -> Integrator2D {
        Integrator2D {
            gravity: COLLAPSE_GRAVITY,
            air_damping: COLLAPSE_AIR_DAMPING,
            restitution: COLLAPSE_RESTITUTION,
            floor_damping: COLLAPSE_FLOOR_DAMPING,
            floor_angular_damping: COLLAPSE_FLOOR_ANGULAR_DAMPING,
            rest_speed: COLLAPSE_REST_SPEED,
            floor_y: -(COLLAPSE_HEIGHT / 2.0 - BLOCK_SIZE / 2.0),
            wall_min_x: -(COLLAPSE_WIDTH / 2.0 - BLOCK_SIZE / 2.0),
            wall_max_x: COLLAPSE_WIDTH / 2.0 - BLOCK_SIZE / 2.0,
        }
    }

    #[test]
    fn gravity_accumulates_on_vertical_velocity() {
        let integ = collapse_integrator();
        let mut body = BodyState2D::at(Vec2::new(0.0, 100.0));

        integ.step(&mut body);
        assert!(
            (body.vel.y + COLLAPSE_GRAVITY).abs() < 1e-6,
            "one tick of gravity expected, got vel.y = {}",
            body.vel.y
        );

        integ.step(&mut body);
        assert!(
            (body.vel.y + 2.0 * COLLAPSE_GRAVITY).abs() < 1e-6,
            "gravity must accumulate, got vel.y = {}",
            body.vel.y
        );
    }

    #[test]
    fn position_integrates_velocity() {
        let integ = collapse_integrator();
        let mut body = BodyState2D::at(Vec2::new(0.0, 100.0));
        body.vel = Vec2::new(2.0, 0.0);

        integ.step(&mut body);

        // x advances by the damped velocity; y falls by one tick of gravity.
        let expected_x = 2.0 * COLLAPSE_AIR_DAMPING;
        assert!((body.pos.x - expected_x).abs() < 1e-6);
        assert!(body.pos.y < 100.0);
    }

    #[test]
    fn rotation_integrates_angular_velocity() {
        let integ = collapse_integrator();
        let mut body = BodyState2D::at(Vec2::new(0.0, 100.0));
        body.angvel = 0.05;

        for _ in 0..10 {
            integ.step(&mut body);
        }

        assert!(
            (body.angle - 0.5).abs() < 1e-5,
            "expected angle 0.5 after 10 ticks, got {}",
            body.angle
        );
    }

    #[test]
    fn floor_clamps_and_bounces_with_restitution() {
        let integ = collapse_integrator();
        let mut body = BodyState2D::at(Vec2::new(0.0, integ.floor_y + 1.0));
        body.vel = Vec2::new(0.0, -10.0);

        integ.step(&mut body);

        assert_eq!(body.pos.y, integ.floor_y, "body must be clamped to floor");
        let expected = (10.0 + COLLAPSE_GRAVITY) * COLLAPSE_RESTITUTION;
        assert!(
            (body.vel.y - expected).abs() < 1e-4,
            "expected upward bounce {expected}, got {}",
            body.vel.y
        );
    }

    #[test]
    fn slow_floor_contact_comes_to_rest() {
        let integ = collapse_integrator();
        let mut body = BodyState2D::at(Vec2::new(0.0, integ.floor_y + 0.1));
        body.vel = Vec2::new(0.0, -0.5);

        integ.step(&mut body);

        // Bounce magnitude 0.9 * 0.4 = 0.36 < rest threshold 0.5 → zeroed.
        assert_eq!(body.pos.y, integ.floor_y);
        assert_eq!(body.vel.y, 0.0, "sub-threshold bounce must be zeroed");
        assert!(integ.is_settled(&body));
    }

    #[test]
    fn floor_contact_damps_horizontal_and_angular_velocity() {
        let integ = collapse_integrator();
        let mut body = BodyState2D::at(Vec2::new(0.0, integ.floor_y + 0.5));
        body.vel = Vec2::new(4.0, -8.0);
        body.angvel = 0.06;

        integ.step(&mut body);

        let expected_vx = 4.0 * COLLAPSE_AIR_DAMPING * COLLAPSE_FLOOR_DAMPING;
        let expected_angvel = 0.06 * COLLAPSE_FLOOR_ANGULAR_DAMPING;
        assert!((body.vel.x - expected_vx).abs() < 1e-5);
        assert!((body.angvel - expected_angvel).abs() < 1e-6);
    }

    #[test]
    fn walls_clamp_and_reflect() {
        let integ = collapse_integrator();

        let mut left = BodyState2D::at(Vec2::new(integ.wall_min_x + 1.0, 0.0));
        left.vel = Vec2::new(-10.0, 0.0);
        integ.step(&mut left);
        assert_eq!(left.pos.x, integ.wall_min_x);
        assert!(left.vel.x > 0.0, "left wall must reflect rightward");

        let mut right = BodyState2D::at(Vec2::new(integ.wall_max_x - 1.0, 0.0));
        right.vel = Vec2::new(10.0, 0.0);
        integ.step(&mut right);
        assert_eq!(right.pos.x, integ.wall_max_x);
        assert!(right.vel.x < 0.0, "right wall must reflect leftward");
    }

    /// Bounce peaks must decrease monotonically until the body settles —
    /// the collapse never oscillates forever.
    #[test]
    fn bounce_amplitude_decreases_monotonically_to_rest() {
        let integ = collapse_integrator();
        let mut body = BodyState2D::at(Vec2::new(0.0, integ.floor_y + 200.0));

        let mut peaks: Vec<f32> = Vec::new();
        let mut prev_y = body.pos.y;
        let mut rising = false;

        for _ in 0..100_000 {
            integ.step(&mut body);
            if body.pos.y > prev_y {
                rising = true;
            } else if rising && body.pos.y < prev_y {
                // Just passed a local maximum.
                peaks.push(prev_y);
                rising = false;
            }
            prev_y = body.pos.y;
            if integ.is_settled(&body) {
                break;
            }
        }

        assert!(
            integ.is_settled(&body),
            "body must settle, still at y = {} vel.y = {}",
            body.pos.y,
            body.vel.y
        );
        assert!(!peaks.is_empty(), "a 200-unit drop must bounce at least once");
        for pair in peaks.windows(2) {
            assert!(
                pair[1] <= pair[0] + 1e-4,
                "bounce peaks must not grow: {} then {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn settled_body_stays_settled() {
        let integ = collapse_integrator();
        let mut body = BodyState2D::at(Vec2::new(0.0, integ.floor_y));

        for _ in 0..100 {
            integ.step(&mut body);
        }

        assert_eq!(body.pos.y, integ.floor_y);
        assert_eq!(body.vel.y, 0.0);
    }
}

//! Runtime game configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.collapse_gravity`, `config.stabilization_secs`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay and physics configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/game.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Session ──────────────────────────────────────────────────────────────
    pub session_seconds: f32,
    pub dual_button_window_secs: f32,
    pub wait_puzzle_secs: f32,
    pub wait_puzzle_solve_delay_secs: f32,
    pub wait_puzzle_notice_secs: f32,

    // ── Collapse arena ───────────────────────────────────────────────────────
    pub collapse_width: f32,
    pub collapse_height: f32,
    pub block_size: f32,
    pub block_gap: f32,
    pub pyramid_base_fraction: f32,

    // ── Collapse physics (per tick) ──────────────────────────────────────────
    pub collapse_gravity: f32,
    pub collapse_air_damping: f32,
    pub collapse_restitution: f32,
    pub collapse_floor_damping: f32,
    pub collapse_floor_angular_damping: f32,
    pub collapse_rest_speed: f32,

    // ── Collapse gesture ─────────────────────────────────────────────────────
    pub gesture_drag_threshold: f32,
    pub gesture_tap_points: u32,
    pub gesture_drag_points: u32,
    pub collapse_score_threshold: u32,
    pub collapse_reveal_secs: f32,
    pub collapse_impulse_vx: f32,
    pub collapse_impulse_vy_min: f32,
    pub collapse_impulse_vy_max: f32,
    pub collapse_impulse_angvel: f32,

    // ── Stacking world ───────────────────────────────────────────────────────
    pub stack_canvas_width: f32,
    pub stack_canvas_height: f32,
    pub stack_world_width: f32,
    pub stack_gravity: f32,
    pub stack_ground_thickness: f32,
    pub stack_wall_thickness: f32,
    pub stack_wall_offset: f32,
    pub piece_restitution: f32,
    pub piece_friction: f32,
    pub piece_density: f32,

    // ── Stacking drop cursor ─────────────────────────────────────────────────
    pub drop_cursor_speed: f32,
    pub drop_cursor_range: f32,
    pub drop_height: f32,

    // ── Stacking timers ──────────────────────────────────────────────────────
    pub drop_cooldown_secs: f32,
    pub stabilization_secs: f32,
    pub success_notify_secs: f32,
    pub reset_settle_secs: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Session
            session_seconds: SESSION_SECONDS,
            dual_button_window_secs: DUAL_BUTTON_WINDOW_SECS,
            wait_puzzle_secs: WAIT_PUZZLE_SECS,
            wait_puzzle_solve_delay_secs: WAIT_PUZZLE_SOLVE_DELAY_SECS,
            wait_puzzle_notice_secs: WAIT_PUZZLE_NOTICE_SECS,
            // Collapse arena
            collapse_width: COLLAPSE_WIDTH,
            collapse_height: COLLAPSE_HEIGHT,
            block_size: BLOCK_SIZE,
            block_gap: BLOCK_GAP,
            pyramid_base_fraction: PYRAMID_BASE_FRACTION,
            // Collapse physics
            collapse_gravity: COLLAPSE_GRAVITY,
            collapse_air_damping: COLLAPSE_AIR_DAMPING,
            collapse_restitution: COLLAPSE_RESTITUTION,
            collapse_floor_damping: COLLAPSE_FLOOR_DAMPING,
            collapse_floor_angular_damping: COLLAPSE_FLOOR_ANGULAR_DAMPING,
            collapse_rest_speed: COLLAPSE_REST_SPEED,
            // Collapse gesture
            gesture_drag_threshold: GESTURE_DRAG_THRESHOLD,
            gesture_tap_points: GESTURE_TAP_POINTS,
            gesture_drag_points: GESTURE_DRAG_POINTS,
            collapse_score_threshold: COLLAPSE_SCORE_THRESHOLD,
            collapse_reveal_secs: COLLAPSE_REVEAL_SECS,
            collapse_impulse_vx: COLLAPSE_IMPULSE_VX,
            collapse_impulse_vy_min: COLLAPSE_IMPULSE_VY_MIN,
            collapse_impulse_vy_max: COLLAPSE_IMPULSE_VY_MAX,
            collapse_impulse_angvel: COLLAPSE_IMPULSE_ANGVEL,
            // Stacking world
            stack_canvas_width: STACK_CANVAS_WIDTH,
            stack_canvas_height: STACK_CANVAS_HEIGHT,
            stack_world_width: STACK_WORLD_WIDTH,
            stack_gravity: STACK_GRAVITY,
            stack_ground_thickness: STACK_GROUND_THICKNESS,
            stack_wall_thickness: STACK_WALL_THICKNESS,
            stack_wall_offset: STACK_WALL_OFFSET,
            piece_restitution: PIECE_RESTITUTION,
            piece_friction: PIECE_FRICTION,
            piece_density: PIECE_DENSITY,
            // Drop cursor
            drop_cursor_speed: DROP_CURSOR_SPEED,
            drop_cursor_range: DROP_CURSOR_RANGE,
            drop_height: DROP_HEIGHT,
            // Stacking timers
            drop_cooldown_secs: DROP_COOLDOWN_SECS,
            stabilization_secs: STABILIZATION_SECS,
            success_notify_secs: SUCCESS_NOTIFY_SECS,
            reset_settle_secs: RESET_SETTLE_SECS,
        }
    }
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are
/// logged but do not abort the game.  A missing file is silently ignored
/// (defaults are already in place from `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/game.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("[config] Loaded game config from {path}");
            }
            Err(e) => {
                warn!("[config] Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            info!("[config] No {path} found; using compiled defaults");
        }
    }
}

//! Centralised gameplay and physics constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig`] mirrors every constant and can override any
//! subset from `assets/game.toml` at startup.

// ── Session ───────────────────────────────────────────────────────────────────

/// Total session countdown in seconds. The result screen reports success iff
/// the player reaches the ending before this runs out.
pub const SESSION_SECONDS: f32 = 60.0 * 60.0;

/// How close (seconds) two door presses must be for the dual-button puzzle
/// to count as simultaneous.
pub const DUAL_BUTTON_WINDOW_SECS: f32 = 0.3;

/// How long (seconds) the wait puzzle must run without the player picking
/// any option.
pub const WAIT_PUZZLE_SECS: f32 = 10.0;

/// Delay between the wait puzzle elapsing and the solved signal, a short
/// beat for the player to register what happened.
pub const WAIT_PUZZLE_SOLVE_DELAY_SECS: f32 = 0.5;

/// How long (seconds) the "think again" notice stays up after the player
/// picks an option in the wait puzzle.
pub const WAIT_PUZZLE_NOTICE_SECS: f32 = 2.0;

// ── Collapse arena ────────────────────────────────────────────────────────────

/// Width of the collapse arena (world units). Blocks bounce off walls at
/// ±`COLLAPSE_WIDTH / 2`, inset by half a block.
pub const COLLAPSE_WIDTH: f32 = 500.0;

/// Height of the collapse arena (world units).
pub const COLLAPSE_HEIGHT: f32 = 600.0;

/// Side length of every pyramid block.
pub const BLOCK_SIZE: f32 = 60.0;

/// Horizontal and vertical gap between neighbouring pyramid blocks.
pub const BLOCK_GAP: f32 = 4.0;

/// Vertical position of the pyramid's bottom tier, as a fraction of arena
/// height measured from the top. 0.7 puts the base well below centre with
/// headroom for the upper tiers.
pub const PYRAMID_BASE_FRACTION: f32 = 0.7;

// ── Collapse physics (per tick) ───────────────────────────────────────────────
//
// The collapse integrates once per rendered frame, matching the cadence the
// puzzle was tuned at. These are per-tick deltas, not per-second rates.

/// Downward acceleration added to vertical velocity every tick.
pub const COLLAPSE_GRAVITY: f32 = 0.4;

/// Multiplicative horizontal damping applied every tick while airborne.
pub const COLLAPSE_AIR_DAMPING: f32 = 0.98;

/// Restitution for floor and wall bounces. 0 = dead stop, 1 = elastic.
pub const COLLAPSE_RESTITUTION: f32 = 0.4;

/// Extra horizontal damping applied on each floor contact.
pub const COLLAPSE_FLOOR_DAMPING: f32 = 0.9;

/// Angular damping applied on each floor contact.
pub const COLLAPSE_FLOOR_ANGULAR_DAMPING: f32 = 0.8;

/// Vertical speeds below this are zeroed on floor contact, ending the
/// micro-bounce tail.
pub const COLLAPSE_REST_SPEED: f32 = 0.5;

// ── Collapse gesture ──────────────────────────────────────────────────────────

/// Horizontal displacement (units) above which a pointer release counts as a
/// drag instead of a tap.
pub const GESTURE_DRAG_THRESHOLD: f32 = 50.0;

/// Score contributed by a tap on the interactive block.
pub const GESTURE_TAP_POINTS: u32 = 1;

/// Score contributed by a drag across the interactive block.
pub const GESTURE_DRAG_POINTS: u32 = 3;

/// Cumulative gesture score at which the pyramid collapses.
pub const COLLAPSE_SCORE_THRESHOLD: u32 = 6;

/// Seconds between the collapse trigger and the hidden answer becoming
/// visible. Independent of physics settling.
pub const COLLAPSE_REVEAL_SECS: f32 = 0.6;

/// Collapse impulse ranges: horizontal velocity is uniform in
/// ±`COLLAPSE_IMPULSE_VX`, vertical velocity upward in
/// [`COLLAPSE_IMPULSE_VY_MIN`, `COLLAPSE_IMPULSE_VY_MAX`], angular velocity
/// uniform in ±`COLLAPSE_IMPULSE_ANGVEL`.
pub const COLLAPSE_IMPULSE_VX: f32 = 3.0;
pub const COLLAPSE_IMPULSE_VY_MIN: f32 = 2.0;
pub const COLLAPSE_IMPULSE_VY_MAX: f32 = 6.0;
pub const COLLAPSE_IMPULSE_ANGVEL: f32 = 0.075;

// ── Stacking world ────────────────────────────────────────────────────────────

/// Width of the visible stacking viewport (world units).
pub const STACK_CANVAS_WIDTH: f32 = 400.0;

/// Height of the visible stacking viewport (world units).
pub const STACK_CANVAS_HEIGHT: f32 = 500.0;

/// Full physics-world width. Wider than the viewport so pieces that topple
/// sideways stay inside the walls instead of vanishing at the canvas edge.
pub const STACK_WORLD_WIDTH: f32 = 700.0;

/// Downward gravity for the stacking world (units/s² at pixel scale).
pub const STACK_GRAVITY: f32 = 1000.0;

/// Ground slab thickness.
pub const STACK_GROUND_THICKNESS: f32 = 20.0;

/// Side-wall thickness and the extra gap between the world edge and each
/// wall's centre line.
pub const STACK_WALL_THICKNESS: f32 = 50.0;
pub const STACK_WALL_OFFSET: f32 = 150.0;

/// Restitution, friction, and density shared by every dropped piece.
pub const PIECE_RESTITUTION: f32 = 0.3;
pub const PIECE_FRICTION: f32 = 0.8;
pub const PIECE_DENSITY: f32 = 0.001;

// ── Stacking drop cursor ──────────────────────────────────────────────────────

/// Horizontal oscillation speed of the pending piece (units per render tick).
pub const DROP_CURSOR_SPEED: f32 = 2.0;

/// Half-width of the oscillation range around the world centre. Matches the
/// viewport minus one piece margin on each side.
pub const DROP_CURSOR_RANGE: f32 = 150.0;

/// Height (world y) at which pending pieces hover and dropped bodies spawn:
/// 50 units below the top of the viewport.
pub const DROP_HEIGHT: f32 = STACK_CANVAS_HEIGHT / 2.0 - 50.0;

// ── Stacking timers ───────────────────────────────────────────────────────────

/// Cooldown after each drop before the next piece (or the stabilization
/// window) begins.
pub const DROP_COOLDOWN_SECS: f32 = 0.5;

/// Stabilization window after the final drop. If no failing contact occurs
/// within it, the attempt succeeds.
pub const STABILIZATION_SECS: f32 = 3.0;

/// UI-feedback delay between success and the solved signal.
pub const SUCCESS_NOTIFY_SECS: f32 = 1.0;

/// Settling delay between tearing down a failed world and re-initialising a
/// fresh one, so the reset never races a still-finalising teardown.
pub const RESET_SETTLE_SECS: f32 = 0.15;

//! Block-stacking puzzle simulation.
//!
//! Six square pieces are dropped one at a time onto a ground plane inside a
//! Rapier world.  The pending piece oscillates horizontally until the player
//! triggers a drop (click, touch, or space).  Contact-start events are
//! classified by [`classify_contact`]: the first piece owns the ground, and
//! any other piece touching it fails the attempt immediately.  Once all six
//! pieces are down and the stabilization window passes without a failing
//! contact, the attempt succeeds.
//!
//! ## State machine
//!
//! ```text
//! Waiting ──drop──▶ Dropped ──cooldown──▶ Waiting   (pieces remain)
//!                          └─────────────▶ AllDropped ──3 s──▶ Success
//! any non-terminal ──failing contact──▶ Fail ──reset──▶ Ready ──settle──▶ Waiting
//! ```
//!
//! All state transitions happen on [`StackingState`] as plain methods, so
//! the machine is fully testable without Rapier; the systems are thin
//! wrappers that feed it input, bodies, and collision events.  Every delayed
//! transition is a [`Timer`] owned by the state resource — disposing the
//! puzzle removes the resource and no timer can fire against a torn-down
//! world.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::chapter::{ChapterCatalog, ChapterSession, GamePhase};
use crate::config::GameConfig;
use crate::graphics::GameFont;
use crate::puzzle::{active_puzzle, PuzzleFailed, PuzzleKind, PuzzleSolved};

// ── Piece table (injected configuration) ──────────────────────────────────────

/// One entry of the drop sequence.
#[derive(Debug, Clone)]
pub struct PieceDefinition {
    pub size: f32,
    pub color: Color,
    pub label: &'static str,
}

/// The ordered piece table.  Injected as a resource so tests can substitute
/// alternates.  Index 0 is the only piece permitted ground contact.
#[derive(Resource, Debug, Clone)]
pub struct PieceTable {
    pub pieces: Vec<PieceDefinition>,
}

impl Default for PieceTable {
    fn default() -> Self {
        Self {
            pieces: vec![
                PieceDefinition {
                    size: 60.0,
                    color: Color::srgb_u8(255, 215, 0),
                    label: "1",
                },
                PieceDefinition {
                    size: 40.0,
                    color: Color::srgb_u8(65, 105, 225),
                    label: "2",
                },
                PieceDefinition {
                    size: 60.0,
                    color: Color::srgb_u8(50, 205, 50),
                    label: "3",
                },
                PieceDefinition {
                    size: 20.0,
                    color: Color::srgb_u8(147, 112, 219),
                    label: "4",
                },
                PieceDefinition {
                    size: 30.0,
                    color: Color::BLACK,
                    label: "5",
                },
                PieceDefinition {
                    size: 30.0,
                    color: Color::srgb_u8(220, 20, 60),
                    label: "6",
                },
            ],
        }
    }
}

// ── Contact classification ────────────────────────────────────────────────────

/// What one member of a contact pair is, as far as the fail rule cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactMember {
    Ground,
    Piece(usize),
    Other,
}

/// Verdict for one contact-start pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactClass {
    Ignore,
    Fail,
}

/// Classify a contact pair: the ground touching any piece other than the
/// base piece (index 0) fails the attempt.  Piece–piece, wall, and base
/// contacts are expected and ignored.
pub fn classify_contact(a: ContactMember, b: ContactMember) -> ContactClass {
    use ContactMember::*;
    match (a, b) {
        (Ground, Piece(i)) | (Piece(i), Ground) if i >= 1 => ContactClass::Fail,
        _ => ContactClass::Ignore,
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

/// Drop state machine phases.  `Success` and `Fail` are terminal; `Fail`
/// is exited only through the explicit reset flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropPhase {
    /// Torn down between a reset and re-initialisation.
    Ready,
    /// The pending piece oscillates, awaiting a drop trigger.
    #[default]
    Waiting,
    /// Post-drop cooldown.
    Dropped,
    /// All pieces down; stabilization window running.
    AllDropped,
    Success,
    Fail,
}

/// Owned context of one mounted stacking puzzle.
#[derive(Resource, Debug)]
pub struct StackingState {
    pub phase: DropPhase,
    /// Index of the next piece to drop == number of pieces dropped so far.
    pub next_piece: usize,
    /// Oscillating horizontal position of the pending piece (world units).
    pub cursor_x: f32,
    /// Oscillation direction, +1 or −1.
    pub cursor_dir: f32,
    pub cooldown: Timer,
    pub stabilization: Timer,
    pub success_notify: Timer,
    pub reset_settle: Timer,
}

impl StackingState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phase: DropPhase::Waiting,
            next_piece: 0,
            cursor_x: 0.0,
            cursor_dir: 1.0,
            cooldown: Timer::from_seconds(config.drop_cooldown_secs, TimerMode::Once),
            stabilization: Timer::from_seconds(config.stabilization_secs, TimerMode::Once),
            success_notify: Timer::from_seconds(config.success_notify_secs, TimerMode::Once),
            reset_settle: Timer::from_seconds(config.reset_settle_secs, TimerMode::Once),
        }
    }

    /// Advance the pending piece's triangle-wave oscillation by one render
    /// tick, reversing at the range edges.
    pub fn advance_cursor(&mut self, config: &GameConfig) {
        self.cursor_x += self.cursor_dir * config.drop_cursor_speed;
        if self.cursor_x <= -config.drop_cursor_range || self.cursor_x >= config.drop_cursor_range {
            self.cursor_x = self
                .cursor_x
                .clamp(-config.drop_cursor_range, config.drop_cursor_range);
            self.cursor_dir = -self.cursor_dir;
        }
    }

    /// Accept a drop trigger.  Only valid while `Waiting`; anything else is
    /// a silent no-op (the player mashing controls is expected).  Returns
    /// the index of the piece to spawn.
    pub fn try_begin_drop(&mut self, total_pieces: usize) -> Option<usize> {
        if self.phase != DropPhase::Waiting || self.next_piece >= total_pieces {
            return None;
        }
        let index = self.next_piece;
        self.next_piece += 1;
        self.phase = DropPhase::Dropped;
        self.cooldown.reset();
        Some(index)
    }

    /// Leave the post-drop cooldown: back to `Waiting` if pieces remain,
    /// otherwise into the stabilization window.
    pub fn finish_cooldown(&mut self, total_pieces: usize) {
        if self.phase != DropPhase::Dropped {
            return;
        }
        if self.next_piece >= total_pieces {
            self.phase = DropPhase::AllDropped;
            self.stabilization.reset();
        } else {
            self.phase = DropPhase::Waiting;
        }
    }

    /// Enter `Fail` from any non-terminal phase.  Returns `true` only on the
    /// transition, making the fail signal idempotent per attempt.
    pub fn fail(&mut self) -> bool {
        match self.phase {
            DropPhase::Fail | DropPhase::Success => false,
            _ => {
                self.phase = DropPhase::Fail;
                true
            }
        }
    }

    /// Enter `Success` at the end of the stabilization window.  Returns
    /// `true` only on the transition.
    pub fn succeed(&mut self) -> bool {
        if self.phase != DropPhase::AllDropped {
            return false;
        }
        self.phase = DropPhase::Success;
        self.success_notify.reset();
        true
    }

    /// Begin the reset flow.  Only valid from `Fail`; the caller tears down
    /// the physical world before calling this.
    pub fn begin_reset(&mut self) -> bool {
        if self.phase != DropPhase::Fail {
            return false;
        }
        self.phase = DropPhase::Ready;
        self.reset_settle.reset();
        true
    }

    /// Complete the reset after the settling delay: a fresh attempt with
    /// zero pieces dropped and piece 0 pending.
    pub fn finish_reset(&mut self) {
        if self.phase != DropPhase::Ready {
            return;
        }
        self.phase = DropPhase::Waiting;
        self.next_piece = 0;
        self.cursor_x = 0.0;
        self.cursor_dir = 1.0;
    }

    /// Player-facing status line for the HUD.
    pub fn status_message(&self, total_pieces: usize) -> String {
        match self.phase {
            DropPhase::Ready => "재시작 중...".to_string(),
            DropPhase::Waiting | DropPhase::Dropped => format!(
                "블록 {}/{} - 클릭하여 떨어뜨리기",
                (self.next_piece + 1).min(total_pieces),
                total_pieces
            ),
            DropPhase::AllDropped => "3초 동안 안정화 중...".to_string(),
            DropPhase::Success => "성공! 완벽하게 쌓았습니다!".to_string(),
            DropPhase::Fail => "실패! 2~6번 블록이 바닥에 닿았습니다.".to_string(),
        }
    }
}

// ── Messages & components ─────────────────────────────────────────────────────

/// The reset affordance on the failure notice was used.
#[derive(Message, Debug, Clone, Copy)]
pub struct StackingResetRequested;

/// A dropped piece body. The index is its position in the drop order.
#[derive(Component, Debug, Clone, Copy)]
pub struct Piece {
    pub index: usize,
}

/// The static ground slab.
#[derive(Component)]
pub struct Ground;

/// The oscillating preview of the next piece (visual only, no physics).
#[derive(Component)]
pub struct PendingPiece;

/// Every entity owned by the mounted stacking puzzle; despawned on dispose
/// and on reset teardown.
#[derive(Component)]
pub struct StackingEntity;

// ── Mount / dispose ───────────────────────────────────────────────────────────

/// True while the active chapter embeds the stacking puzzle.
pub fn stacking_chapter_active(
    catalog: Res<ChapterCatalog>,
    session: Res<ChapterSession>,
) -> bool {
    matches!(active_puzzle(&catalog, &session), Some(PuzzleKind::Stacking))
}

/// Spawn the ground slab and the two out-of-view side walls.
fn spawn_statics(commands: &mut Commands, config: &GameConfig) {
    let ground_top = -(config.stack_canvas_height / 2.0 - config.stack_ground_thickness);
    let ground_y = ground_top - config.stack_ground_thickness / 2.0;

    commands.spawn((
        RigidBody::Fixed,
        Collider::cuboid(
            config.stack_world_width / 2.0,
            config.stack_ground_thickness / 2.0,
        ),
        Transform::from_xyz(0.0, ground_y, 0.0),
        Sprite {
            color: Color::srgb_u8(63, 63, 70),
            custom_size: Some(Vec2::new(
                config.stack_world_width,
                config.stack_ground_thickness,
            )),
            ..default()
        },
        Ground,
        StackingEntity,
    ));

    // Walls sit outside the visible canvas; they only stop runaway drift.
    let wall_x = config.stack_world_width / 2.0 + config.stack_wall_offset;
    for side in [-1.0f32, 1.0] {
        commands.spawn((
            RigidBody::Fixed,
            Collider::cuboid(config.stack_wall_thickness / 2.0, config.stack_canvas_height),
            Transform::from_xyz(side * wall_x, 0.0, 0.0),
            StackingEntity,
        ));
    }
}

/// Spawn the oscillating preview sprite for the piece at `index`.
fn spawn_pending_preview(
    commands: &mut Commands,
    table: &PieceTable,
    index: usize,
    cursor_x: f32,
    config: &GameConfig,
    font: &Handle<Font>,
) {
    let Some(piece) = table.pieces.get(index) else {
        return;
    };
    commands
        .spawn((
            Sprite {
                color: piece.color,
                custom_size: Some(Vec2::splat(piece.size)),
                ..default()
            },
            Transform::from_xyz(cursor_x, config.drop_height, 1.0),
            PendingPiece,
            StackingEntity,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new(piece.label),
                TextFont {
                    font: font.clone(),
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Transform::from_translation(Vec3::Z),
            ));
        });
}

/// Spawn the physical body for a dropped piece at the cursor's position.
fn spawn_piece_body(
    commands: &mut Commands,
    table: &PieceTable,
    index: usize,
    x: f32,
    config: &GameConfig,
    font: &Handle<Font>,
) {
    let Some(piece) = table.pieces.get(index) else {
        return;
    };
    commands
        .spawn((
            (
                RigidBody::Dynamic,
                Collider::cuboid(piece.size / 2.0, piece.size / 2.0),
                Restitution::coefficient(config.piece_restitution),
                Friction::coefficient(config.piece_friction),
                ColliderMassProperties::Density(config.piece_density),
                Velocity::zero(),
                ActiveEvents::COLLISION_EVENTS,
            ),
            Transform::from_xyz(x, config.drop_height, 1.0),
            Sprite {
                color: piece.color,
                custom_size: Some(Vec2::splat(piece.size)),
                ..default()
            },
            Piece { index },
            StackingEntity,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new(piece.label),
                TextFont {
                    font: font.clone(),
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Transform::from_translation(Vec3::Z),
            ));
        });
}

/// Mount: fresh state machine, statics, and the first pending preview.
pub fn setup_stacking(
    mut commands: Commands,
    table: Res<PieceTable>,
    config: Res<GameConfig>,
    font: Res<GameFont>,
) {
    let state = StackingState::new(&config);
    spawn_statics(&mut commands, &config);
    spawn_pending_preview(&mut commands, &table, 0, state.cursor_x, &config, &font.0);
    commands.insert_resource(state);
    info!("[stacking] mounted, {} pieces queued", table.pieces.len());
}

/// Dispose: despawn every owned entity and drop the state resource,
/// cancelling all pending timers.  Safe to run when never mounted.
pub fn cleanup_stacking(mut commands: Commands, query: Query<Entity, With<StackingEntity>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
    commands.remove_resource::<StackingState>();
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Advance the pending piece oscillation while waiting for a drop.
pub fn drop_cursor_system(
    mut state: ResMut<StackingState>,
    config: Res<GameConfig>,
    mut preview: Query<&mut Transform, With<PendingPiece>>,
) {
    if state.phase != DropPhase::Waiting {
        return;
    }
    state.advance_cursor(&config);
    for mut transform in preview.iter_mut() {
        transform.translation.x = state.cursor_x;
    }
}

/// Accept drop triggers (click, touch, space) while waiting; spawns the
/// physical body at the cursor position and starts the cooldown.
///
/// Pointer presses over UI buttons (hint, close, reset) are not drops.
#[allow(clippy::too_many_arguments)]
pub fn drop_trigger_system(
    mut commands: Commands,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    ui_buttons: Query<&Interaction, With<Button>>,
    mut state: ResMut<StackingState>,
    table: Res<PieceTable>,
    config: Res<GameConfig>,
    font: Res<GameFont>,
    preview: Query<Entity, With<PendingPiece>>,
) {
    let over_ui = ui_buttons.iter().any(|i| *i != Interaction::None);
    let pointer = (buttons.just_pressed(MouseButton::Left) || touches.any_just_pressed())
        && !over_ui;
    let triggered = pointer || keys.just_pressed(KeyCode::Space);
    if !triggered {
        return;
    }

    let Some(index) = state.try_begin_drop(table.pieces.len()) else {
        // Not waiting — expected no-op from a mashing player.
        return;
    };

    for entity in preview.iter() {
        commands.entity(entity).despawn();
    }
    spawn_piece_body(&mut commands, &table, index, state.cursor_x, &config, &font.0);
    info!("[stacking] dropped piece {}/{}", index + 1, table.pieces.len());
}

/// Run the post-drop cooldown; then either queue the next pending piece or
/// enter the stabilization window.
pub fn drop_cooldown_system(
    mut commands: Commands,
    mut state: ResMut<StackingState>,
    table: Res<PieceTable>,
    config: Res<GameConfig>,
    font: Res<GameFont>,
    time: Res<Time>,
) {
    if state.phase != DropPhase::Dropped {
        return;
    }
    if !state.cooldown.tick(time.delta()).just_finished() {
        return;
    }
    state.finish_cooldown(table.pieces.len());
    match state.phase {
        DropPhase::Waiting => {
            spawn_pending_preview(
                &mut commands,
                &table,
                state.next_piece,
                state.cursor_x,
                &config,
                &font.0,
            );
        }
        DropPhase::AllDropped => {
            info!("[stacking] all pieces dropped, stabilizing");
        }
        _ => {}
    }
}

/// Resolve a contact member: the ground marker wins, then a tracked piece,
/// then anything else (walls, despawned-in-flight entities).
fn contact_member(
    entity: Entity,
    pieces: &Query<&Piece>,
    ground: &Query<(), With<Ground>>,
) -> ContactMember {
    if ground.contains(entity) {
        ContactMember::Ground
    } else if let Ok(piece) = pieces.get(entity) {
        ContactMember::Piece(piece.index)
    } else {
        ContactMember::Other
    }
}

/// Classify contact-start events from the physics step; a failing contact
/// moves the machine to `Fail` and reports it exactly once.
pub fn stacking_contact_system(
    mut events: MessageReader<CollisionEvent>,
    mut state: ResMut<StackingState>,
    pieces: Query<&Piece>,
    ground: Query<(), With<Ground>>,
    mut failed: MessageWriter<PuzzleFailed>,
) {
    for event in events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let a = contact_member(e1, &pieces, &ground);
        let b = contact_member(e2, &pieces, &ground);
        if classify_contact(a, b) == ContactClass::Fail && state.fail() {
            warn!("[stacking] non-base piece touched the ground — attempt failed");
            failed.write(PuzzleFailed);
        }
    }
}

/// Run the stabilization window; surviving it is success.
pub fn stabilization_system(mut state: ResMut<StackingState>, time: Res<Time>) {
    if state.phase != DropPhase::AllDropped {
        return;
    }
    if state.stabilization.tick(time.delta()).just_finished() && state.succeed() {
        info!("[stacking] stack held through stabilization — success");
    }
}

/// After success, give the player the feedback beat, then signal solved.
pub fn success_notify_system(
    mut state: ResMut<StackingState>,
    time: Res<Time>,
    mut solved: MessageWriter<PuzzleSolved>,
) {
    if state.phase != DropPhase::Success {
        return;
    }
    if state.success_notify.tick(time.delta()).just_finished() {
        solved.write(PuzzleSolved);
    }
}

/// Handle the reset affordance (UI button or the R key), available only
/// from `Fail`: tear the whole physical world down, then let the settle
/// timer re-initialise it.
pub fn stacking_reset_system(
    mut commands: Commands,
    mut requests: MessageReader<StackingResetRequested>,
    keys: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<StackingState>,
    owned: Query<Entity, With<StackingEntity>>,
) {
    let requested = requests.read().count() > 0 || keys.just_pressed(KeyCode::KeyR);
    if !requested {
        return;
    }
    if !state.begin_reset() {
        return;
    }
    for entity in owned.iter() {
        commands.entity(entity).despawn();
    }
    info!("[stacking] reset: world torn down, settling");
}

/// Complete a reset once the settle delay elapses: respawn the statics and
/// the first pending piece, fresh state machine.
pub fn stacking_reset_settle_system(
    mut commands: Commands,
    mut state: ResMut<StackingState>,
    table: Res<PieceTable>,
    config: Res<GameConfig>,
    font: Res<GameFont>,
    time: Res<Time>,
) {
    if state.phase != DropPhase::Ready {
        return;
    }
    if !state.reset_settle.tick(time.delta()).just_finished() {
        return;
    }
    state.finish_reset();
    spawn_statics(&mut commands, &config);
    spawn_pending_preview(&mut commands, &table, 0, state.cursor_x, &config, &font.0);
    info!("[stacking] reset complete, piece 1 pending");
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers the stacking puzzle's mount/dispose hooks and per-frame
/// systems, all gated on the puzzle being mounted.
pub struct StackingPlugin;

impl Plugin for StackingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PieceTable>()
            .add_message::<StackingResetRequested>()
            .add_systems(
                OnEnter(GamePhase::Puzzle),
                setup_stacking.run_if(stacking_chapter_active),
            )
            .add_systems(OnExit(GamePhase::Puzzle), cleanup_stacking)
            .add_systems(
                Update,
                (
                    drop_cursor_system,
                    drop_trigger_system,
                    drop_cooldown_system,
                    stacking_contact_system,
                    stabilization_system,
                    success_notify_system,
                    stacking_reset_system,
                    stacking_reset_settle_system,
                )
                    .chain()
                    .run_if(resource_exists::<StackingState>),
            );
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

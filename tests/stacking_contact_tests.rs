//! Headless wiring tests for the stacking puzzle's contact classification:
//! injected collision events drive the fail path exactly the way Rapier's
//! contact-start events do in the running game, without stepping a physics
//! world.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionEvent, CollisionEventFlags};

use love_escape::config::GameConfig;
use love_escape::puzzle::PuzzleFailed;
use love_escape::stacking::{
    stacking_contact_system, DropPhase, Ground, Piece, StackingState,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Harness {
    app: App,
    ground: Entity,
    pieces: Vec<Entity>,
}

/// Minimal app carrying the contact system, the state machine, a ground
/// entity, and the six piece entities.
fn harness() -> Harness {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_message::<CollisionEvent>();
    app.add_message::<PuzzleFailed>();

    let config = GameConfig::default();
    app.insert_resource(StackingState::new(&config));
    app.insert_resource(config);
    app.add_systems(Update, stacking_contact_system);

    let ground = app.world_mut().spawn(Ground).id();
    let pieces = (0..6)
        .map(|index| app.world_mut().spawn(Piece { index }).id())
        .collect();

    Harness { app, ground, pieces }
}

impl Harness {
    fn contact(&mut self, a: Entity, b: Entity) {
        self.app
            .world_mut()
            .resource_mut::<Messages<CollisionEvent>>()
            .write(CollisionEvent::Started(a, b, CollisionEventFlags::empty()));
    }

    fn phase(&self) -> DropPhase {
        self.app.world().resource::<StackingState>().phase
    }

    fn drain_failures(&mut self) -> usize {
        self.app
            .world_mut()
            .resource_mut::<Messages<PuzzleFailed>>()
            .drain()
            .count()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The base piece may rest on the ground; nothing fails.
#[test]
fn base_piece_ground_contact_is_ignored() {
    let mut h = harness();
    let (ground, piece0) = (h.ground, h.pieces[0]);

    h.contact(ground, piece0);
    h.contact(piece0, ground);
    h.app.update();

    assert_eq!(h.phase(), DropPhase::Waiting);
    assert_eq!(h.drain_failures(), 0);
}

/// A non-base piece touching the ground fails the attempt, in either event
/// order.
#[test]
fn non_base_piece_ground_contact_fails() {
    let mut h = harness();
    let (ground, piece2) = (h.ground, h.pieces[2]);

    h.contact(piece2, ground);
    h.app.update();

    assert_eq!(h.phase(), DropPhase::Fail);
    assert_eq!(h.drain_failures(), 1);
}

/// Piece–piece and unknown contacts never fail.
#[test]
fn piece_piece_and_unknown_contacts_are_ignored() {
    let mut h = harness();
    let stray = h.app.world_mut().spawn_empty().id();
    let (p1, p2) = (h.pieces[1], h.pieces[2]);

    h.contact(p1, p2);
    h.contact(p1, stray);
    h.contact(h.ground, stray);
    h.app.update();

    assert_eq!(h.phase(), DropPhase::Waiting);
    assert_eq!(h.drain_failures(), 0);
}

/// Scenario: pieces 0–4 land cleanly, then piece 5 bounces onto the ground.
/// The failure is reported exactly once, no matter how many further
/// qualifying contacts arrive.
#[test]
fn late_bounce_fails_exactly_once() {
    let mut h = harness();

    // Five clean drops: the state machine walks its cooldowns.
    {
        let config = GameConfig::default();
        let mut state = h.app.world_mut().resource_mut::<StackingState>();
        for _ in 0..5 {
            state.try_begin_drop(6);
            state
                .cooldown
                .tick(std::time::Duration::from_secs_f32(config.drop_cooldown_secs + 0.01));
            state.finish_cooldown(6);
        }
        assert_eq!(state.phase, DropPhase::Waiting);
        state.try_begin_drop(6);
    }

    // Piece 5 grazes the ground — fail fires once.
    let (ground, piece5) = (h.ground, h.pieces[5]);
    h.contact(piece5, ground);
    h.app.update();
    assert_eq!(h.phase(), DropPhase::Fail);
    assert_eq!(h.drain_failures(), 1);

    // It bounces and touches again; other pieces slide off too. Silence.
    h.contact(piece5, ground);
    h.contact(ground, h.pieces[3]);
    h.app.update();
    assert_eq!(h.drain_failures(), 0, "repeat contacts must be swallowed");
    assert_eq!(h.phase(), DropPhase::Fail);
}

/// A failing contact during the stabilization window kills the attempt
/// before success.
#[test]
fn stabilization_window_contact_fails() {
    let mut h = harness();
    {
        let mut state = h.app.world_mut().resource_mut::<StackingState>();
        state.phase = DropPhase::AllDropped;
    }

    h.contact(h.ground, h.pieces[4]);
    h.app.update();

    assert_eq!(h.phase(), DropPhase::Fail);
    assert_eq!(h.drain_failures(), 1);
}

/// A contact arriving after success does not flip the outcome.
#[test]
fn contact_after_success_is_ignored() {
    let mut h = harness();
    {
        let mut state = h.app.world_mut().resource_mut::<StackingState>();
        state.phase = DropPhase::AllDropped;
        assert!(state.succeed());
    }

    h.contact(h.ground, h.pieces[5]);
    h.app.update();

    assert_eq!(h.phase(), DropPhase::Success);
    assert_eq!(h.drain_failures(), 0);
}

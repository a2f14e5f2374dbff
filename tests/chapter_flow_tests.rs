//! Headless tests for chapter progression: the controller's reaction to the
//! puzzle-solved signal, the catalog's integrity, and countdown clamping.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use love_escape::chapter::{
    advance_chapter_system, countdown_running, countdown_system, ChapterCatalog, ChapterSession,
    GamePhase,
};
use love_escape::puzzle::PuzzleSolved;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Headless app with the chapter controller wired the way the game wires
/// it: states, the catalog, the session, and the advance system.
fn chapter_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_state(GamePhase::Puzzle);
    app.init_resource::<ChapterSession>();
    app.init_resource::<ChapterCatalog>();
    app.add_message::<PuzzleSolved>();
    app.add_systems(
        Update,
        (
            countdown_system.run_if(countdown_running),
            advance_chapter_system,
        ),
    );
    app
}

fn solve(app: &mut App) {
    app.world_mut()
        .resource_mut::<Messages<PuzzleSolved>>()
        .write(PuzzleSolved);
}

fn current_state(app: &App) -> GamePhase {
    app.world().resource::<State<GamePhase>>().get().clone()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Solving a mid-story puzzle advances the chapter cursor, rewinds the
/// scene, and returns to the story screen.
#[test]
fn solved_puzzle_advances_to_next_chapter() {
    let mut app = chapter_app();
    app.update();

    solve(&mut app);
    app.update(); // advance_chapter_system reacts
    app.update(); // StateTransition applies the request

    let session = app.world().resource::<ChapterSession>();
    assert_eq!(session.chapter, 1, "CH1 solved must land on CH2");
    assert_eq!(session.scene, 0, "new chapter must start at its first scene");
    assert_eq!(current_state(&app), GamePhase::Playing);
}

/// Solving every chapter in sequence walks the whole catalog and ends in
/// the outro.
#[test]
fn solving_all_chapters_reaches_the_outro() {
    let mut app = chapter_app();
    app.update();

    let total = app.world().resource::<ChapterCatalog>().chapters.len();
    for _ in 0..total {
        solve(&mut app);
        app.update();
        app.update();
    }

    assert_eq!(current_state(&app), GamePhase::Outro);
    let session = app.world().resource::<ChapterSession>();
    assert_eq!(
        session.chapter,
        total - 1,
        "cursor must stop at the last chapter"
    );
}

/// A solved signal with no chapters remaining must not run the cursor past
/// the catalog.
#[test]
fn duplicate_final_solves_do_not_overrun() {
    let mut app = chapter_app();
    app.update();

    let total = app.world().resource::<ChapterCatalog>().chapters.len();
    app.world_mut().resource_mut::<ChapterSession>().chapter = total - 1;

    solve(&mut app);
    app.update();
    solve(&mut app);
    app.update();

    let session = app.world().resource::<ChapterSession>();
    assert_eq!(session.chapter, total - 1);
    app.update();
    assert_eq!(current_state(&app), GamePhase::Outro);
}

/// The countdown never goes below zero, no matter how many frames pass
/// after it is exhausted.
#[test]
fn countdown_clamps_at_zero() {
    let mut app = chapter_app();
    app.world_mut().resource_mut::<ChapterSession>().time_remaining = 0.0;

    for _ in 0..10 {
        app.update();
    }

    let session = app.world().resource::<ChapterSession>();
    assert_eq!(session.time_remaining, 0.0);
    assert!(!session.succeeded());
}

/// The countdown does not tick outside the play/puzzle phases.
#[test]
fn countdown_is_frozen_in_the_outro() {
    let mut app = chapter_app();
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GamePhase>>()
        .set(GamePhase::Outro);
    app.update();

    let before = app.world().resource::<ChapterSession>().time_remaining;
    for _ in 0..10 {
        app.update();
    }
    let after = app.world().resource::<ChapterSession>().time_remaining;
    assert_eq!(before, after, "outro must not consume session time");
}

//! Headless tests for the text-answer flow, wired the way the game wires
//! it: the submit system runs only while a text-validated puzzle is
//! mounted, accepts the chapter's literals, and rejects everything else.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use love_escape::chapter::{ChapterCatalog, ChapterSession, GamePhase};
use love_escape::puzzle::{
    answer_submit_system, text_answer_active, AnswerEditor, PuzzleSolved, SubmitAnswer,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// App in the `Puzzle` state, positioned at the given chapter.
fn answer_app(chapter: usize) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_state(GamePhase::Puzzle);
    app.init_resource::<ChapterCatalog>();
    app.insert_resource(ChapterSession {
        chapter,
        ..Default::default()
    });
    app.init_resource::<AnswerEditor>();
    app.add_message::<PuzzleSolved>();
    app.add_message::<SubmitAnswer>();
    app.add_systems(
        Update,
        answer_submit_system.run_if(in_state(GamePhase::Puzzle).and(text_answer_active)),
    );
    app
}

fn submit(app: &mut App, input: &str) {
    app.world_mut().resource_mut::<AnswerEditor>().buffer = input.to_string();
    app.world_mut()
        .resource_mut::<Messages<SubmitAnswer>>()
        .write(SubmitAnswer);
    app.update();
}

fn drain_solved(app: &mut App) -> usize {
    app.world_mut()
        .resource_mut::<Messages<PuzzleSolved>>()
        .drain()
        .count()
}

const COLLAPSE_CHAPTER: usize = 7; // CH8
const STACKING_CHAPTER: usize = 10; // CH11
const PACE_CHAPTER: usize = 1; // CH2

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The collapse chapter accepts its primary answer, exactly once per
/// submission.
#[test]
fn collapse_chapter_accepts_primary_answer() {
    let mut app = answer_app(COLLAPSE_CHAPTER);
    app.update();

    submit(&mut app, "의심");

    assert_eq!(drain_solved(&mut app), 1);
    let editor = app.world().resource::<AnswerEditor>();
    assert!(editor.buffer.is_empty(), "accepted answer must clear the buffer");
    assert!(editor.notice.is_none());
}

/// The alternate literal is accepted too, with surrounding whitespace
/// trimmed.
#[test]
fn collapse_chapter_accepts_trimmed_alternate() {
    let mut app = answer_app(COLLAPSE_CHAPTER);
    app.update();

    submit(&mut app, "  불신  ");

    assert_eq!(drain_solved(&mut app), 1);
}

/// A wrong answer is rejected: no solved signal, a rejection notice, and
/// the buffer kept for editing.
#[test]
fn collapse_chapter_rejects_wrong_answer() {
    let mut app = answer_app(COLLAPSE_CHAPTER);
    app.update();

    submit(&mut app, "맞음");

    assert_eq!(drain_solved(&mut app), 0);
    let editor = app.world().resource::<AnswerEditor>();
    assert!(editor.notice.is_some(), "rejection must raise the notice");
    assert_eq!(editor.buffer, "맞음");
}

/// Normalized chapters ignore case and inner whitespace.
#[test]
fn normalized_chapter_accepts_spaced_lowercase() {
    let mut app = answer_app(PACE_CHAPTER);
    app.update();

    submit(&mut app, "p A c E");
    assert_eq!(drain_solved(&mut app), 1);

    submit(&mut app, "race");
    assert_eq!(drain_solved(&mut app), 0);
}

/// Submitting text while a non-text puzzle (stacking) is mounted is a
/// silent no-op.
#[test]
fn stacking_chapter_ignores_text_submissions() {
    let mut app = answer_app(STACKING_CHAPTER);
    app.update();

    submit(&mut app, "의심");

    assert_eq!(drain_solved(&mut app), 0);
    let editor = app.world().resource::<AnswerEditor>();
    assert!(editor.notice.is_none(), "no rejection for out-of-band input");
}

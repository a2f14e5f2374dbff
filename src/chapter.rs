//! Game-phase state machine and chapter sequencing.
//!
//! ## States
//!
//! | State     | Description                                         |
//! |-----------|-----------------------------------------------------|
//! | `Intro`   | Title screen; collects the player's definition      |
//! | `Playing` | Story scenes of the current chapter                 |
//! | `Puzzle`  | The chapter's puzzle is mounted                     |
//! | `Hint`    | Hint modal (counts against the player)              |
//! | `Answer`  | Answer-explanation modal                            |
//! | `Outro`   | Ending choice, then ending text                     |
//! | `Result`  | Elapsed time, hint count, success/failure           |
//!
//! The chapter controller owns progression only: it mounts whichever puzzle
//! the active chapter embeds by entering `Puzzle`, and reacts to the
//! puzzle's terminal [`PuzzleSolved`](crate::puzzle::PuzzleSolved) signal by
//! advancing the chapter cursor (or entering the outro after the last
//! chapter).  The simulations themselves never know about chapters.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::puzzle::{PuzzleKind, PuzzleSolved};

// ── Game state ────────────────────────────────────────────────────────────────

/// Top-level application state machine.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    /// Title screen; shown on startup.
    #[default]
    Intro,
    /// Story scenes of the active chapter.
    Playing,
    /// The active chapter's puzzle is mounted.
    Puzzle,
    /// Hint modal over the puzzle.
    Hint,
    /// Answer-explanation modal over the puzzle.
    Answer,
    /// Ending choice and ending text.
    Outro,
    /// Final result screen.
    Result,
}

/// Phases during which the session countdown ticks.
pub fn countdown_running(state: Res<State<GamePhase>>) -> bool {
    matches!(
        state.get(),
        GamePhase::Playing | GamePhase::Puzzle | GamePhase::Hint | GamePhase::Answer
    )
}

// ── Catalog types ─────────────────────────────────────────────────────────────

/// What the single button under a scene does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneButton {
    /// Advance to the next scene of the chapter.
    Next,
    /// Open the chapter's puzzle.
    Puzzle,
}

/// One story scene: a block of text and its forward button.
#[derive(Debug, Clone)]
pub struct SceneDefinition {
    pub text: &'static str,
    pub button: SceneButton,
}

/// Static definition of one chapter.
#[derive(Debug, Clone)]
pub struct ChapterDefinition {
    pub id: &'static str,
    pub scenes: Vec<SceneDefinition>,
    pub puzzle: PuzzleKind,
    pub hint: &'static str,
    pub answer_explain: &'static str,
}

/// One of the two endings.
#[derive(Debug, Clone)]
pub struct EndingDefinition {
    pub text: &'static str,
}

/// The outro's ending pair.
#[derive(Debug, Clone)]
pub struct OutroEndings {
    pub breakup: EndingDefinition,
    pub trust: EndingDefinition,
}

/// The full chapter catalog, consumed at startup.  `Default` carries the
/// shipped story (see [`crate::story`]); tests may inject alternates.
#[derive(Resource, Debug, Clone)]
pub struct ChapterCatalog {
    pub chapters: Vec<ChapterDefinition>,
    pub endings: OutroEndings,
}

/// The player's ending choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Breakup,
    Trust,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Runtime progression state for one play-through.
#[derive(Resource, Debug, Clone)]
pub struct ChapterSession {
    /// 0-based index into the catalog.
    pub chapter: usize,
    /// 0-based scene index within the chapter.
    pub scene: usize,
    /// The player's intro answer ("사랑이란 ___다").
    pub love_definition: String,
    pub hint_count: u32,
    /// Session countdown, seconds. Clamped at zero.
    pub time_remaining: f32,
    /// Countdown start value, for elapsed-time reporting.
    pub total_secs: f32,
    pub ending: Option<Ending>,
    /// Elapsed seconds at the moment the ending was chosen.
    pub ended_at_secs: Option<f32>,
}

impl Default for ChapterSession {
    fn default() -> Self {
        Self {
            chapter: 0,
            scene: 0,
            love_definition: String::new(),
            hint_count: 0,
            time_remaining: crate::constants::SESSION_SECONDS,
            total_secs: crate::constants::SESSION_SECONDS,
            ending: None,
            ended_at_secs: None,
        }
    }
}

impl ChapterSession {
    /// Seconds spent so far.
    pub fn elapsed_secs(&self) -> f32 {
        self.total_secs - self.time_remaining
    }

    /// The run succeeds iff the ending was reached before the countdown hit
    /// zero.
    pub fn succeeded(&self) -> bool {
        self.time_remaining > 0.0
    }

    /// Move to the next scene if the chapter has one.
    pub fn next_scene(&mut self, catalog: &ChapterCatalog) {
        if let Some(chapter) = catalog.chapters.get(self.chapter) {
            if self.scene + 1 < chapter.scenes.len() {
                self.scene += 1;
            }
        }
    }

    /// Move to the previous scene if there is one.
    pub fn prev_scene(&mut self) {
        self.scene = self.scene.saturating_sub(1);
    }

    /// React to a solved puzzle: advance to the next chapter, or report that
    /// the story is over (the caller enters the outro).
    pub fn advance_on_solved(&mut self, total_chapters: usize) -> bool {
        if self.chapter + 1 < total_chapters {
            self.chapter += 1;
            self.scene = 0;
            false
        } else {
            true
        }
    }
}

/// `MM:SS` for the top bar and the result screen.
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Arm the countdown from config when play begins.
pub fn start_session(mut session: ResMut<ChapterSession>, config: Res<GameConfig>) {
    session.time_remaining = config.session_seconds;
    session.total_secs = config.session_seconds;
}

/// Tick the session countdown, clamped at zero.
pub fn countdown_system(mut session: ResMut<ChapterSession>, time: Res<Time>) {
    session.time_remaining = (session.time_remaining - time.delta_secs()).max(0.0);
}

/// React to the active puzzle's solved signal: next chapter, or the outro
/// after the last one.
pub fn advance_chapter_system(
    mut solved: MessageReader<PuzzleSolved>,
    mut session: ResMut<ChapterSession>,
    catalog: Res<ChapterCatalog>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    for _ in solved.read() {
        if session.advance_on_solved(catalog.chapters.len()) {
            info!("[chapter] final chapter solved — entering outro");
            next_state.set(GamePhase::Outro);
        } else {
            info!(
                "[chapter] advancing to {}",
                catalog
                    .chapters
                    .get(session.chapter)
                    .map(|c| c.id)
                    .unwrap_or("?")
            );
            next_state.set(GamePhase::Playing);
        }
    }
}

/// Each visit to the hint modal costs one hint.
pub fn count_hint_system(mut session: ResMut<ChapterSession>) {
    session.hint_count += 1;
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `GamePhase`, the session resource, the catalog, and the
/// progression systems.
///
/// This plugin must be added **before** any plugin that calls
/// `.run_if(in_state(GamePhase::..))`, so the state is always registered
/// first.
pub struct ChapterPlugin;

impl Plugin for ChapterPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GamePhase>()
            .init_resource::<ChapterSession>()
            .init_resource::<ChapterCatalog>()
            .add_systems(OnExit(GamePhase::Intro), start_session)
            .add_systems(OnEnter(GamePhase::Hint), count_hint_system)
            .add_systems(
                Update,
                (
                    countdown_system.run_if(countdown_running),
                    advance_chapter_system,
                ),
            );
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

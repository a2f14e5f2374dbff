//! The puzzle contract shared by every mini-game, plus the two simple
//! puzzles (dual-button and wait) that need no physics.
//!
//! ## Contract
//!
//! A puzzle is *mounted* by entering [`GamePhase::Puzzle`](crate::chapter::GamePhase):
//! the matching `OnEnter` system spawns its entities and inserts its state
//! resource.  It is *disposed* exactly once by leaving the state: `OnExit`
//! despawns the entities and removes the resource, and every pending timer
//! dies with it.  Completion is signalled by writing [`PuzzleSolved`];
//! the stacking puzzle additionally reports [`PuzzleFailed`].  Simulations
//! never block and never signal by return value.
//!
//! ## Answer validation
//!
//! Text answers come in two flavours:
//! - [`AnswerRule::Exact`] — trim only, then literal comparison (the
//!   collapse puzzle's Korean answers).
//! - [`AnswerRule::Normalized`] — trim, lowercase, strip all whitespace on
//!   both sides (the image/video text puzzles, where `PACE`, `pace`, and
//!   `P A C E` are all accepted).

use bevy::prelude::*;

use crate::chapter::{ChapterCatalog, ChapterSession, GamePhase};
use crate::config::GameConfig;

// ── Messages ──────────────────────────────────────────────────────────────────

/// The active puzzle reached its solved terminal condition.  The chapter
/// controller reacts by advancing to the next chapter (or the outro).
#[derive(Message, Debug, Clone, Copy)]
pub struct PuzzleSolved;

/// The stacking puzzle reached its failed terminal condition.  Reported
/// exactly once per attempt; the player recovers via the reset affordance.
#[derive(Message, Debug, Clone, Copy)]
pub struct PuzzleFailed;

/// The player submitted the current answer buffer (Enter key or the Enter
/// button in the answer row).
#[derive(Message, Debug, Clone, Copy)]
pub struct SubmitAnswer;

/// One of the two doors in the dual-button puzzle was pressed.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorPressed(pub Door);

/// A choice button in the wait puzzle was pressed (any choice resets the
/// wait).
#[derive(Message, Debug, Clone, Copy)]
pub struct WaitChoicePicked;

/// Door identity for [`DoorPressed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Door {
    A,
    B,
}

// ── Puzzle kinds & answers ────────────────────────────────────────────────────

/// How a submitted answer is compared against the accepted literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerRule {
    /// Trim, then exact comparison.
    Exact,
    /// Trim, lowercase, strip whitespace on both sides.
    Normalized,
}

/// The accepted answer literals for a text-validated puzzle.
#[derive(Debug, Clone)]
pub struct AcceptedAnswers {
    pub primary: &'static str,
    pub alternate: Option<&'static str>,
    pub rule: AnswerRule,
}

impl AcceptedAnswers {
    pub const fn exact(primary: &'static str, alternate: &'static str) -> Self {
        Self {
            primary,
            alternate: Some(alternate),
            rule: AnswerRule::Exact,
        }
    }

    pub const fn normalized(primary: &'static str, alternate: &'static str) -> Self {
        Self {
            primary,
            alternate: Some(alternate),
            rule: AnswerRule::Normalized,
        }
    }

    /// True iff `input` matches one of the accepted literals under this
    /// answer's comparison rule.
    pub fn matches(&self, input: &str) -> bool {
        let candidates = [Some(self.primary), self.alternate];
        match self.rule {
            AnswerRule::Exact => {
                let trimmed = input.trim();
                candidates.iter().flatten().any(|a| trimmed == *a)
            }
            AnswerRule::Normalized => {
                let normalized = normalize_answer(input);
                candidates
                    .iter()
                    .flatten()
                    .any(|a| normalized == normalize_answer(a))
            }
        }
    }
}

/// Trim, lowercase, and strip all whitespace.
pub fn normalize_answer(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Which mini-game a chapter embeds.
#[derive(Debug, Clone)]
pub enum PuzzleKind {
    /// Two doors; pressing both within the simultaneity window solves.
    DualButton,
    /// Solved by *not* choosing anything for the configured wait time.
    Wait,
    /// Free-text answer against accepted literals (image/video chapters —
    /// the media itself is out of scope, the validation is not).
    Text { answers: AcceptedAnswers },
    /// The pyramid-collapse simulation plus an exact-match text answer.
    Collapse { answers: AcceptedAnswers },
    /// The block-stacking simulation.
    Stacking,
}

/// The active chapter's puzzle definition.
pub fn active_puzzle<'a>(
    catalog: &'a ChapterCatalog,
    session: &ChapterSession,
) -> Option<&'a PuzzleKind> {
    catalog.chapters.get(session.chapter).map(|c| &c.puzzle)
}

// ── Run conditions ────────────────────────────────────────────────────────────

pub fn dual_button_active(catalog: Res<ChapterCatalog>, session: Res<ChapterSession>) -> bool {
    matches!(
        active_puzzle(&catalog, &session),
        Some(PuzzleKind::DualButton)
    )
}

pub fn wait_puzzle_active(catalog: Res<ChapterCatalog>, session: Res<ChapterSession>) -> bool {
    matches!(active_puzzle(&catalog, &session), Some(PuzzleKind::Wait))
}

/// True for every puzzle that carries a text-answer row.
pub fn text_answer_active(catalog: Res<ChapterCatalog>, session: Res<ChapterSession>) -> bool {
    matches!(
        active_puzzle(&catalog, &session),
        Some(PuzzleKind::Text { .. } | PuzzleKind::Collapse { .. })
    )
}

// ── Answer editor ─────────────────────────────────────────────────────────────

/// Shared free-text edit buffer for the intro prompt and the puzzle answer
/// row, plus the rejection notice countdown.
#[derive(Resource, Debug, Clone, Default)]
pub struct AnswerEditor {
    pub buffer: String,
    /// While `Some`, the UI shows the rejection notice; cleared when the
    /// timer finishes.
    pub notice: Option<Timer>,
}

impl AnswerEditor {
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.notice = None;
    }

    pub fn reject(&mut self) {
        self.notice = Some(Timer::from_seconds(2.0, TimerMode::Once));
    }
}

/// Append typed characters to the answer buffer; Backspace deletes, Enter
/// submits.
///
/// Uses logical keys so any character the platform delivers (including
/// Hangul) lands in the buffer, not just ASCII keycodes.
pub fn answer_input_system(
    mut keyboard: MessageReader<bevy::input::keyboard::KeyboardInput>,
    mut editor: ResMut<AnswerEditor>,
    mut submit: MessageWriter<SubmitAnswer>,
) {
    use bevy::input::keyboard::Key;
    use bevy::input::ButtonState;

    for event in keyboard.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        match &event.logical_key {
            Key::Character(text) => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    editor.buffer.push(c);
                }
            }
            Key::Space => editor.buffer.push(' '),
            Key::Backspace => {
                editor.buffer.pop();
            }
            Key::Enter => {
                submit.write(SubmitAnswer);
            }
            _ => {}
        }
    }
}

/// Tick the rejection-notice countdown and clear it when done.
pub fn answer_notice_system(mut editor: ResMut<AnswerEditor>, time: Res<Time>) {
    let finished = match editor.notice.as_mut() {
        Some(timer) => timer.tick(time.delta()).finished(),
        None => false,
    };
    if finished {
        editor.notice = None;
    }
}

/// Validate a submitted answer against the active puzzle's accepted
/// literals.
///
/// Runs only while a text-validated puzzle is active.  A match solves the
/// puzzle; anything else shows the rejection notice and changes nothing —
/// for the collapse chapter this is deliberately independent of the
/// animation phase (the player may answer before the reveal finishes).
pub fn answer_submit_system(
    mut submits: MessageReader<SubmitAnswer>,
    mut editor: ResMut<AnswerEditor>,
    catalog: Res<ChapterCatalog>,
    session: Res<ChapterSession>,
    mut solved: MessageWriter<PuzzleSolved>,
) {
    for _ in submits.read() {
        let answers = match active_puzzle(&catalog, &session) {
            Some(PuzzleKind::Text { answers }) | Some(PuzzleKind::Collapse { answers }) => answers,
            _ => continue,
        };
        if answers.matches(&editor.buffer) {
            info!("[puzzle] answer accepted for chapter {}", session.chapter + 1);
            editor.clear();
            solved.write(PuzzleSolved);
        } else {
            editor.reject();
        }
    }
}

// ── Dual-button puzzle ────────────────────────────────────────────────────────

/// Press times of the two doors, in seconds of game time.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DualButtonState {
    pub last_a: Option<f32>,
    pub last_b: Option<f32>,
}

impl DualButtonState {
    /// Record a press at `now` and report whether both doors have now been
    /// pressed within `window` seconds of each other.
    pub fn press(&mut self, door: Door, now: f32, window: f32) -> bool {
        match door {
            Door::A => self.last_a = Some(now),
            Door::B => self.last_b = Some(now),
        }
        match (self.last_a, self.last_b) {
            (Some(a), Some(b)) => (a - b).abs() < window,
            _ => false,
        }
    }
}

/// Track door presses; two presses inside the simultaneity window solve the
/// chapter.  The prompt says to pick one door — pressing both is the point.
pub fn dual_button_system(
    mut presses: MessageReader<DoorPressed>,
    mut state: ResMut<DualButtonState>,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut solved: MessageWriter<PuzzleSolved>,
) {
    for DoorPressed(door) in presses.read() {
        if state.press(*door, time.elapsed_secs(), config.dual_button_window_secs) {
            info!("[puzzle] dual-button solved");
            solved.write(PuzzleSolved);
        }
    }
}

// ── Wait puzzle ───────────────────────────────────────────────────────────────

/// Countdown state for the wait puzzle: solved by leaving every choice
/// untouched until the timer runs out.
#[derive(Resource, Debug)]
pub struct WaitState {
    /// Restarts whenever the player picks a choice.
    pub countdown: Timer,
    /// While running, the "think again" notice is visible.
    pub notice: Timer,
    /// Armed once the countdown elapses; fires the solved signal.
    pub solve_delay: Option<Timer>,
}

impl WaitState {
    pub fn new(config: &GameConfig) -> Self {
        let mut notice = Timer::from_seconds(config.wait_puzzle_notice_secs, TimerMode::Once);
        // Start with the notice already expired so it is hidden.
        notice.tick(std::time::Duration::from_secs_f32(
            config.wait_puzzle_notice_secs,
        ));
        Self {
            countdown: Timer::from_seconds(config.wait_puzzle_secs, TimerMode::Once),
            notice,
            solve_delay: None,
        }
    }
}

/// Advance the wait-puzzle countdown; any picked choice restarts it.
pub fn wait_puzzle_system(
    mut picks: MessageReader<WaitChoicePicked>,
    mut state: ResMut<WaitState>,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut solved: MessageWriter<PuzzleSolved>,
) {
    let mut picked = false;
    for _ in picks.read() {
        picked = true;
    }
    if picked && state.solve_delay.is_none() {
        state.countdown.reset();
        state.notice.reset();
    }

    state.notice.tick(time.delta());

    if let Some(delay) = state.solve_delay.as_mut() {
        if delay.tick(time.delta()).just_finished() {
            info!("[puzzle] wait puzzle solved");
            solved.write(PuzzleSolved);
        }
        return;
    }

    if state.countdown.tick(time.delta()).just_finished() {
        state.solve_delay = Some(Timer::from_seconds(
            config.wait_puzzle_solve_delay_secs,
            TimerMode::Once,
        ));
    }
}

// ── Mount / dispose for the simple puzzles ────────────────────────────────────

/// Insert the simple-puzzle state resources matching the active chapter.
pub fn setup_simple_puzzles(
    mut commands: Commands,
    catalog: Res<ChapterCatalog>,
    session: Res<ChapterSession>,
    config: Res<GameConfig>,
) {
    match active_puzzle(&catalog, &session) {
        Some(PuzzleKind::DualButton) => {
            commands.insert_resource(DualButtonState::default());
        }
        Some(PuzzleKind::Wait) => {
            commands.insert_resource(WaitState::new(&config));
        }
        _ => {}
    }
}

/// Dispose the simple-puzzle state.  Removing the resources cancels their
/// timers; safe to call when neither was mounted.
pub fn dispose_simple_puzzles(mut commands: Commands, mut editor: ResMut<AnswerEditor>) {
    commands.remove_resource::<DualButtonState>();
    commands.remove_resource::<WaitState>();
    editor.clear();
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers the puzzle messages, the shared answer flow, and the two simple
/// puzzles.  The physics puzzles register themselves via their own plugins.
pub struct PuzzlePlugin;

impl Plugin for PuzzlePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PuzzleSolved>()
            .add_message::<PuzzleFailed>()
            .add_message::<SubmitAnswer>()
            .add_message::<DoorPressed>()
            .add_message::<WaitChoicePicked>()
            .init_resource::<AnswerEditor>()
            .add_systems(OnEnter(GamePhase::Puzzle), setup_simple_puzzles)
            .add_systems(OnExit(GamePhase::Puzzle), dispose_simple_puzzles)
            .add_systems(
                Update,
                (
                    answer_input_system
                        .run_if(in_state(GamePhase::Intro).or(in_state(GamePhase::Puzzle))),
                    answer_notice_system,
                    answer_submit_system
                        .run_if(in_state(GamePhase::Puzzle).and(text_answer_active)),
                    dual_button_system
                        .run_if(in_state(GamePhase::Puzzle).and(dual_button_active)),
                    wait_puzzle_system
                        .run_if(in_state(GamePhase::Puzzle).and(wait_puzzle_active)),
                ),
            );
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── normalize_answer ──────────────────────────────────────────────────────

    #[test]
    fn normalize_trims_lowercases_and_strips_whitespace() {
        assert_eq!(normalize_answer("  PACE  "), "pace");
        assert_eq!(normalize_answer("P A C E"), "pace");
        assert_eq!(normalize_answer("버스 정류장"), "버스정류장");
        assert_eq!(normalize_answer(""), "");
    }

    // ── AcceptedAnswers ───────────────────────────────────────────────────────

    #[test]
    fn exact_rule_accepts_both_literals_after_trim() {
        let answers = AcceptedAnswers::exact("의심", "불신");
        assert!(answers.matches("의심"));
        assert!(answers.matches("  의심  "));
        assert!(answers.matches("불신"));
    }

    #[test]
    fn exact_rule_rejects_anything_else() {
        let answers = AcceptedAnswers::exact("의심", "불신");
        assert!(!answers.matches("맞음"));
        assert!(!answers.matches("의 심"), "exact rule must not strip inner whitespace");
        assert!(!answers.matches(""));
    }

    #[test]
    fn normalized_rule_is_case_and_whitespace_insensitive() {
        let answers = AcceptedAnswers::normalized("PACE", "pace");
        assert!(answers.matches("pace"));
        assert!(answers.matches(" PACE "));
        assert!(answers.matches("P a C e"));
        assert!(!answers.matches("pace!"));
        assert!(!answers.matches("race"));
    }

    // ── DualButtonState ───────────────────────────────────────────────────────

    #[test]
    fn single_door_press_does_not_solve() {
        let mut state = DualButtonState::default();
        assert!(!state.press(Door::A, 1.0, 0.3));
        assert!(!state.press(Door::A, 2.0, 0.3));
    }

    #[test]
    fn both_doors_within_window_solve() {
        let mut state = DualButtonState::default();
        assert!(!state.press(Door::A, 1.0, 0.3));
        assert!(state.press(Door::B, 1.2, 0.3));
    }

    #[test]
    fn both_doors_outside_window_do_not_solve() {
        let mut state = DualButtonState::default();
        assert!(!state.press(Door::A, 1.0, 0.3));
        assert!(!state.press(Door::B, 2.0, 0.3));
        // A later re-press of A inside the window does solve.
        assert!(state.press(Door::A, 2.1, 0.3));
    }
}

//! Screen-per-state UI chrome.
//!
//! Every `GamePhase` owns one screen: a root-marker entity tree spawned on
//! `OnEnter` and despawned on `OnExit`, with one `Interaction` handler
//! system per screen.  The UI never holds game state — it mirrors the
//! session, editor, and simulation resources each frame and forwards button
//! presses as the puzzle messages.
//!
//! | Screen                  | State     | Module         |
//! |-------------------------|-----------|----------------|
//! | Title / definition      | `Intro`   | [`intro`]      |
//! | Story scenes + top bar  | `Playing` | [`scene`]      |
//! | Puzzle chrome           | `Puzzle`  | [`puzzle_panel`] |
//! | Hint / answer modals    | `Hint`, `Answer` | [`modal`] |
//! | Ending choice + text    | `Outro`   | [`outro`]      |
//! | Final tally             | `Result`  | [`result`]     |

mod common;
pub mod intro;
pub mod modal;
pub mod outro;
pub mod puzzle_panel;
pub mod result;
pub mod scene;

use bevy::prelude::*;

use crate::chapter::{format_time, ChapterSession, GamePhase};

/// Countdown readouts on the story screen and the puzzle chrome.
#[derive(Component)]
pub struct TimerText;

/// Keep every countdown readout current.
pub fn timer_text_system(
    session: Res<ChapterSession>,
    mut query: Query<&mut Text, With<TimerText>>,
) {
    for mut text in query.iter_mut() {
        **text = format_time(session.time_remaining);
    }
}

/// Registers every screen's setup/teardown and interaction systems.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app
            // ── Intro ────────────────────────────────────────────────────────
            .add_systems(OnEnter(GamePhase::Intro), intro::setup_intro)
            .add_systems(OnExit(GamePhase::Intro), intro::cleanup_intro)
            .add_systems(
                Update,
                (
                    intro::intro_buffer_text_system,
                    intro::intro_button_system,
                    intro::intro_submit_system,
                )
                    .run_if(in_state(GamePhase::Intro)),
            )
            // ── Story ────────────────────────────────────────────────────────
            .add_systems(OnEnter(GamePhase::Playing), scene::setup_scene_screen)
            .add_systems(OnExit(GamePhase::Playing), scene::cleanup_scene_screen)
            .add_systems(
                Update,
                (scene::scene_text_system, scene::scene_button_system)
                    .run_if(in_state(GamePhase::Playing)),
            )
            // ── Puzzle chrome ────────────────────────────────────────────────
            .add_systems(OnEnter(GamePhase::Puzzle), puzzle_panel::setup_puzzle_panel)
            .add_systems(OnExit(GamePhase::Puzzle), puzzle_panel::cleanup_puzzle_panel)
            .add_systems(
                Update,
                (
                    puzzle_panel::puzzle_button_system,
                    puzzle_panel::answer_row_system,
                    puzzle_panel::wait_notice_system,
                    puzzle_panel::stacking_status_system,
                )
                    .run_if(in_state(GamePhase::Puzzle)),
            )
            // ── Modals ───────────────────────────────────────────────────────
            .add_systems(OnEnter(GamePhase::Hint), modal::setup_hint_modal)
            .add_systems(OnExit(GamePhase::Hint), modal::cleanup_hint_modal)
            .add_systems(OnEnter(GamePhase::Answer), modal::setup_answer_modal)
            .add_systems(OnExit(GamePhase::Answer), modal::cleanup_answer_modal)
            .add_systems(
                Update,
                modal::modal_button_system
                    .run_if(in_state(GamePhase::Hint).or(in_state(GamePhase::Answer))),
            )
            // ── Outro / result ───────────────────────────────────────────────
            .add_systems(OnEnter(GamePhase::Outro), outro::setup_outro)
            .add_systems(OnExit(GamePhase::Outro), outro::cleanup_outro)
            .add_systems(
                Update,
                outro::outro_button_system.run_if(in_state(GamePhase::Outro)),
            )
            .add_systems(OnEnter(GamePhase::Result), result::setup_result)
            .add_systems(OnExit(GamePhase::Result), result::cleanup_result)
            // ── Shared ───────────────────────────────────────────────────────
            .add_systems(
                Update,
                timer_text_system.run_if(
                    in_state(GamePhase::Playing).or(in_state(GamePhase::Puzzle)),
                ),
            );
    }
}

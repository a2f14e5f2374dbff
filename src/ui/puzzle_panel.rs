use bevy::prelude::*;

use super::common::*;
use super::TimerText;
use crate::chapter::{ChapterCatalog, ChapterSession, GamePhase};
use crate::graphics::GameFont;
use crate::puzzle::{
    active_puzzle, AnswerEditor, Door, DoorPressed, PuzzleKind, SubmitAnswer, WaitChoicePicked,
    WaitState,
};
use crate::stacking::{DropPhase, StackingResetRequested, StackingState};

/// Root node of the puzzle chrome; despawned on `OnExit(Puzzle)`.
#[derive(Component)]
pub struct PuzzlePanelRoot;

/// Tags the "힌트" button.
#[derive(Component)]
pub struct PuzzleHintButton;

/// Tags the "닫기" button (back to the story).
#[derive(Component)]
pub struct PuzzleCloseButton;

/// Dynamic text mirroring the answer buffer.
#[derive(Component)]
pub struct AnswerRowText;

/// The rejection notice under the answer row.
#[derive(Component)]
pub struct AnswerNoticeText;

/// Tags the answer row's Enter button.
#[derive(Component)]
pub struct AnswerSubmitButton;

/// Tags door A / door B of the dual-button puzzle.
#[derive(Component)]
pub struct DoorButton(pub Door);

/// Tags the three choice buttons of the wait puzzle.
#[derive(Component)]
pub struct WaitChoiceButton;

/// The wait puzzle's "think again" notice.
#[derive(Component)]
pub struct WaitNoticeText;

/// The stacking puzzle's status line.
#[derive(Component)]
pub struct StackStatusText;

/// The stacking puzzle's dropped-count line.
#[derive(Component)]
pub struct StackCountText;

/// Tags the "다시 시작" button on the stacking failure notice.
#[derive(Component)]
pub struct StackResetButton;

/// The row holding the reset button; hidden except from `Fail`.
#[derive(Component)]
pub struct StackResetRow;

/// Spawn the puzzle chrome for the active chapter.
///
/// The physics puzzles render in world space behind the UI, so their chrome
/// hugs the bottom edge; the plain puzzles are centred panels.
pub fn setup_puzzle_panel(
    mut commands: Commands,
    font: Res<GameFont>,
    catalog: Res<ChapterCatalog>,
    session: Res<ChapterSession>,
) {
    let Some(kind) = active_puzzle(&catalog, &session).cloned() else {
        return;
    };
    let bottom_aligned = matches!(
        kind,
        PuzzleKind::Collapse { .. } | PuzzleKind::Stacking
    );

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: if bottom_aligned {
                    JustifyContent::SpaceBetween
                } else {
                    JustifyContent::Center
                },
                align_items: AlignItems::Center,
                ..default()
            },
            if bottom_aligned {
                // Keep the world canvas visible behind the chrome.
                BackgroundColor(Color::NONE)
            } else {
                BackgroundColor(screen_bg())
            },
            PuzzlePanelRoot,
        ))
        .with_children(|root| {
            // ── Top line: countdown ───────────────────────────────────────────
            root.spawn(Node {
                width: Val::Percent(100.0),
                justify_content: JustifyContent::FlexEnd,
                padding: UiRect::axes(Val::Px(24.0), Val::Px(12.0)),
                ..default()
            })
            .with_children(|bar| {
                bar.spawn((
                    Text::new("60:00"),
                    TextFont {
                        font: font.0.clone(),
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(accent()),
                    TimerText,
                ));
            });

            // ── Puzzle-specific body ──────────────────────────────────────────
            match &kind {
                PuzzleKind::DualButton => spawn_dual_button_body(root, &font.0),
                PuzzleKind::Wait => spawn_wait_body(root, &font.0),
                PuzzleKind::Text { .. } => spawn_answer_body(root, &font.0, true),
                PuzzleKind::Collapse { .. } => spawn_answer_body(root, &font.0, false),
                PuzzleKind::Stacking => spawn_stacking_body(root, &font.0),
            }

            // ── Footer: hint / close ──────────────────────────────────────────
            root.spawn(Node {
                justify_content: JustifyContent::Center,
                column_gap: Val::Px(12.0),
                padding: UiRect::all(Val::Px(16.0)),
                ..default()
            })
            .with_children(|footer| {
                spawn_button(footer, &font.0, "힌트", 130.0, accent(), PuzzleHintButton);
                spawn_button(footer, &font.0, "닫기", 130.0, dim_text(), PuzzleCloseButton);
            });
        });
}

fn spawn_dual_button_body(root: &mut ChildSpawnerCommands<'_>, font: &Handle<Font>) {
    root.spawn(Node {
        flex_direction: FlexDirection::Column,
        align_items: AlignItems::Center,
        row_gap: Val::Px(18.0),
        ..default()
    })
    .with_children(|body| {
        body.spawn(Node {
            column_gap: Val::Px(24.0),
            ..default()
        })
        .with_children(|doors| {
            spawn_button(doors, font, "문 A", 180.0, body_text(), DoorButton(Door::A));
            spawn_button(doors, font, "문 B", 180.0, body_text(), DoorButton(Door::B));
        });
        body.spawn((
            Text::new("하나를 골라보세요"),
            TextFont {
                font: font.clone(),
                font_size: 15.0,
                ..default()
            },
            TextColor(dim_text()),
        ));
    });
}

fn spawn_wait_body(root: &mut ChildSpawnerCommands<'_>, font: &Handle<Font>) {
    root.spawn(Node {
        flex_direction: FlexDirection::Column,
        align_items: AlignItems::Center,
        row_gap: Val::Px(14.0),
        ..default()
    })
    .with_children(|body| {
        for choice in ["힘들었어요?", "괜찮아요?", "(말 없이 지그시 바라본다.)"] {
            spawn_button(body, font, choice, 360.0, body_text(), WaitChoiceButton);
        }
        body.spawn((
            Text::new("다시 생각해보세요..."),
            TextFont {
                font: font.clone(),
                font_size: 17.0,
                ..default()
            },
            TextColor(danger_text()),
            Visibility::Hidden,
            WaitNoticeText,
        ));
    });
}

/// The shared answer row: buffer display, Enter button, rejection notice.
/// `framed` draws the centred panel treatment used by the plain text
/// chapters; the collapse chapter keeps the row at the bottom, under the
/// canvas.
fn spawn_answer_body(root: &mut ChildSpawnerCommands<'_>, font: &Handle<Font>, framed: bool) {
    root.spawn((
        Node {
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            row_gap: Val::Px(10.0),
            padding: UiRect::all(Val::Px(if framed { 28.0 } else { 10.0 })),
            border: UiRect::all(Val::Px(if framed { 2.0 } else { 0.0 })),
            ..default()
        },
        BackgroundColor(if framed { panel_bg() } else { Color::NONE }),
        BorderColor::all(panel_border()),
    ))
    .with_children(|body| {
        body.spawn(Node {
            column_gap: Val::Px(10.0),
            align_items: AlignItems::Center,
            ..default()
        })
        .with_children(|row| {
            row.spawn((
                Node {
                    width: Val::Px(320.0),
                    height: Val::Px(44.0),
                    align_items: AlignItems::Center,
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(0.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(panel_bg()),
                BorderColor::all(button_border()),
            ))
            .with_children(|field| {
                field.spawn((
                    Text::new("정답 입력"),
                    TextFont {
                        font: font.clone(),
                        font_size: 17.0,
                        ..default()
                    },
                    TextColor(dim_text()),
                    AnswerRowText,
                ));
            });
            spawn_button(row, font, "Enter", 110.0, body_text(), AnswerSubmitButton);
        });

        body.spawn((
            Text::new("틀렸습니다. 다시 시도하세요."),
            TextFont {
                font: font.clone(),
                font_size: 15.0,
                ..default()
            },
            TextColor(danger_text()),
            Visibility::Hidden,
            AnswerNoticeText,
        ));
    });
}

fn spawn_stacking_body(root: &mut ChildSpawnerCommands<'_>, font: &Handle<Font>) {
    root.spawn(Node {
        flex_direction: FlexDirection::Column,
        align_items: AlignItems::Center,
        row_gap: Val::Px(8.0),
        padding: UiRect::all(Val::Px(8.0)),
        ..default()
    })
    .with_children(|body| {
        body.spawn((
            Text::new(""),
            TextFont {
                font: font.clone(),
                font_size: 19.0,
                ..default()
            },
            TextColor(body_text()),
            StackStatusText,
        ));
        body.spawn((
            Text::new("드롭한 블록: 0 / 6"),
            TextFont {
                font: font.clone(),
                font_size: 15.0,
                ..default()
            },
            TextColor(dim_text()),
            StackCountText,
        ));
        body.spawn((
            Node {
                justify_content: JustifyContent::Center,
                ..default()
            },
            Visibility::Hidden,
            StackResetRow,
        ))
        .with_children(|reset_row| {
            spawn_button(reset_row, font, "다시 시작", 160.0, body_text(), StackResetButton);
        });
    });
}

/// Recursively despawn the puzzle chrome.
pub fn cleanup_puzzle_panel(mut commands: Commands, query: Query<Entity, With<PuzzlePanelRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Handle every puzzle-chrome button.
///
/// - **힌트** → [`GamePhase::Hint`] (costs one hint).
/// - **닫기** → back to the story; the puzzle is disposed and will remount
///   fresh.
/// - **Enter** → submits the answer buffer.
/// - Doors / wait choices / reset → forwarded as their puzzle messages.
#[allow(clippy::type_complexity)]
pub fn puzzle_button_system(
    hint_query: Query<&Interaction, (Changed<Interaction>, With<PuzzleHintButton>)>,
    close_query: Query<&Interaction, (Changed<Interaction>, With<PuzzleCloseButton>)>,
    submit_query: Query<&Interaction, (Changed<Interaction>, With<AnswerSubmitButton>)>,
    door_query: Query<(&Interaction, &DoorButton), Changed<Interaction>>,
    wait_query: Query<&Interaction, (Changed<Interaction>, With<WaitChoiceButton>)>,
    reset_query: Query<&Interaction, (Changed<Interaction>, With<StackResetButton>)>,
    mut next_state: ResMut<NextState<GamePhase>>,
    mut submit: MessageWriter<SubmitAnswer>,
    mut doors: MessageWriter<DoorPressed>,
    mut waits: MessageWriter<WaitChoicePicked>,
    mut resets: MessageWriter<StackingResetRequested>,
) {
    for interaction in hint_query.iter() {
        if *interaction == Interaction::Pressed {
            next_state.set(GamePhase::Hint);
        }
    }
    for interaction in close_query.iter() {
        if *interaction == Interaction::Pressed {
            next_state.set(GamePhase::Playing);
        }
    }
    for interaction in submit_query.iter() {
        if *interaction == Interaction::Pressed {
            submit.write(SubmitAnswer);
        }
    }
    for (interaction, door) in door_query.iter() {
        if *interaction == Interaction::Pressed {
            doors.write(DoorPressed(door.0));
        }
    }
    for interaction in wait_query.iter() {
        if *interaction == Interaction::Pressed {
            waits.write(WaitChoicePicked);
        }
    }
    for interaction in reset_query.iter() {
        if *interaction == Interaction::Pressed {
            resets.write(StackingResetRequested);
        }
    }
}

/// Mirror the answer buffer and the rejection notice.
#[allow(clippy::type_complexity)]
pub fn answer_row_system(
    editor: Res<AnswerEditor>,
    mut q_text: Query<(&mut Text, &mut TextColor), With<AnswerRowText>>,
    mut q_notice: Query<&mut Visibility, With<AnswerNoticeText>>,
) {
    for (mut text, mut color) in q_text.iter_mut() {
        if editor.buffer.is_empty() {
            **text = "정답 입력".to_string();
            *color = TextColor(dim_text());
        } else {
            **text = editor.buffer.clone();
            *color = TextColor(body_text());
        }
    }
    for mut visibility in q_notice.iter_mut() {
        *visibility = if editor.notice.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

/// Show the wait puzzle's notice while its timer runs.
pub fn wait_notice_system(
    state: Option<Res<WaitState>>,
    mut q_notice: Query<&mut Visibility, With<WaitNoticeText>>,
) {
    let Some(state) = state else {
        return;
    };
    for mut visibility in q_notice.iter_mut() {
        *visibility = if state.notice.finished() {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
    }
}

/// Mirror the stacking state into the status/count lines and toggle the
/// reset affordance (only offered from `Fail`).
#[allow(clippy::type_complexity)]
pub fn stacking_status_system(
    state: Option<Res<StackingState>>,
    table: Option<Res<crate::stacking::PieceTable>>,
    mut q_status: Query<(&mut Text, &mut TextColor), With<StackStatusText>>,
    mut q_count: Query<&mut Text, (With<StackCountText>, Without<StackStatusText>)>,
    mut q_reset: Query<&mut Visibility, With<StackResetRow>>,
) {
    let (Some(state), Some(table)) = (state, table) else {
        return;
    };
    let total_pieces = table.pieces.len();

    for (mut text, mut color) in q_status.iter_mut() {
        **text = state.status_message(total_pieces);
        *color = TextColor(match state.phase {
            DropPhase::Success => success_text(),
            DropPhase::Fail => danger_text(),
            _ => body_text(),
        });
    }
    for mut text in q_count.iter_mut() {
        **text = format!("드롭한 블록: {} / {}", state.next_piece, total_pieces);
    }

    for mut visibility in q_reset.iter_mut() {
        *visibility = if state.phase == DropPhase::Fail {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

use bevy::prelude::*;

use super::common::*;
use crate::chapter::{ChapterCatalog, ChapterSession, GamePhase};
use crate::graphics::GameFont;

/// Root node of the hint modal; despawned on `OnExit(Hint)`.
#[derive(Component)]
pub struct HintRoot;

/// Root node of the answer modal; despawned on `OnExit(Answer)`.
#[derive(Component)]
pub struct AnswerRoot;

/// Tags the "정답 보기" button in the hint modal.
#[derive(Component)]
pub struct HintShowAnswerButton;

/// Tags the "퍼즐로 돌아가기" buttons in both modals.
#[derive(Component)]
pub struct BackToPuzzleButton;

fn spawn_modal<M: Component>(
    commands: &mut Commands,
    font: &Handle<Font>,
    root_marker: M,
    title: &str,
    body: &str,
    with_answer_button: bool,
) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(screen_bg()),
            root_marker,
        ))
        .with_children(|root| {
            root.spawn((
                Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    max_width: Val::Px(720.0),
                    padding: UiRect::all(Val::Px(32.0)),
                    border: UiRect::all(Val::Px(2.0)),
                    row_gap: Val::Px(20.0),
                    ..default()
                },
                BackgroundColor(panel_bg()),
                BorderColor::all(panel_border()),
            ))
            .with_children(|panel| {
                panel.spawn((
                    Text::new(title),
                    TextFont {
                        font: font.clone(),
                        font_size: 24.0,
                        ..default()
                    },
                    TextColor(accent()),
                ));
                panel.spawn((
                    Text::new(body),
                    TextFont {
                        font: font.clone(),
                        font_size: 17.0,
                        ..default()
                    },
                    TextColor(body_text()),
                ));

                panel
                    .spawn(Node {
                        column_gap: Val::Px(12.0),
                        ..default()
                    })
                    .with_children(|buttons| {
                        if with_answer_button {
                            spawn_button(
                                buttons,
                                font,
                                "정답 보기",
                                160.0,
                                accent(),
                                HintShowAnswerButton,
                            );
                        }
                        spawn_button(
                            buttons,
                            font,
                            "퍼즐로 돌아가기",
                            200.0,
                            body_text(),
                            BackToPuzzleButton,
                        );
                    });
            });
        });
}

/// Spawn the hint modal for the active chapter.
pub fn setup_hint_modal(
    mut commands: Commands,
    font: Res<GameFont>,
    catalog: Res<ChapterCatalog>,
    session: Res<ChapterSession>,
) {
    let hint = catalog
        .chapters
        .get(session.chapter)
        .map(|c| c.hint)
        .unwrap_or("");
    spawn_modal(&mut commands, &font.0, HintRoot, "힌트", hint, true);
}

/// Spawn the answer-explanation modal for the active chapter.
pub fn setup_answer_modal(
    mut commands: Commands,
    font: Res<GameFont>,
    catalog: Res<ChapterCatalog>,
    session: Res<ChapterSession>,
) {
    let explain = catalog
        .chapters
        .get(session.chapter)
        .map(|c| c.answer_explain)
        .unwrap_or("");
    spawn_modal(&mut commands, &font.0, AnswerRoot, "정답", explain, false);
}

/// Recursively despawn the hint modal.
pub fn cleanup_hint_modal(mut commands: Commands, query: Query<Entity, With<HintRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Recursively despawn the answer modal.
pub fn cleanup_answer_modal(mut commands: Commands, query: Query<Entity, With<AnswerRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Modal navigation: reveal the answer, or return to the puzzle (which
/// remounts it fresh).
#[allow(clippy::type_complexity)]
pub fn modal_button_system(
    answer_query: Query<&Interaction, (Changed<Interaction>, With<HintShowAnswerButton>)>,
    back_query: Query<&Interaction, (Changed<Interaction>, With<BackToPuzzleButton>)>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    for interaction in answer_query.iter() {
        if *interaction == Interaction::Pressed {
            next_state.set(GamePhase::Answer);
        }
    }
    for interaction in back_query.iter() {
        if *interaction == Interaction::Pressed {
            next_state.set(GamePhase::Puzzle);
        }
    }
}

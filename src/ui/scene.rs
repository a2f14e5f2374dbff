use bevy::prelude::*;

use super::common::*;
use super::TimerText;
use crate::chapter::{ChapterCatalog, ChapterSession, GamePhase, SceneButton};
use crate::graphics::GameFont;

/// Root node of the story screen; despawned on `OnExit(Playing)`.
#[derive(Component)]
pub struct SceneRoot;

/// Top-bar chapter label.
#[derive(Component)]
pub struct SceneChapterText;

/// The scene's story text block.
#[derive(Component)]
pub struct SceneText;

/// Tags the "이전" button.
#[derive(Component)]
pub struct ScenePrevButton;

/// Tags the forward button ("다음", or "Q" on a chapter's final scene).
#[derive(Component)]
pub struct SceneForwardButton;

/// Label child of the forward button.
#[derive(Component)]
pub struct SceneForwardLabel;

/// Spawn the story screen: top bar with chapter id and countdown, the scene
/// text, and the navigation buttons.
pub fn setup_scene_screen(mut commands: Commands, font: Res<GameFont>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(screen_bg()),
            SceneRoot,
        ))
        .with_children(|root| {
            // ── Top bar ───────────────────────────────────────────────────────
            root.spawn((
                Node {
                    width: Val::Percent(100.0),
                    padding: UiRect::axes(Val::Px(24.0), Val::Px(14.0)),
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::Center,
                    border: UiRect::bottom(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(panel_bg()),
                BorderColor::all(panel_border()),
            ))
            .with_children(|bar| {
                bar.spawn((
                    Text::new("CH1"),
                    TextFont {
                        font: font.0.clone(),
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(body_text()),
                    SceneChapterText,
                ));
                bar.spawn((
                    Text::new("60:00"),
                    TextFont {
                        font: font.0.clone(),
                        font_size: 22.0,
                        ..default()
                    },
                    TextColor(accent()),
                    TimerText,
                ));
            });

            // ── Story text ────────────────────────────────────────────────────
            root.spawn(Node {
                flex_grow: 1.0,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Px(32.0)),
                ..default()
            })
            .with_children(|body| {
                body.spawn((
                    Text::new(""),
                    TextFont {
                        font: font.0.clone(),
                        font_size: 19.0,
                        ..default()
                    },
                    TextColor(body_text()),
                    TextLayout::new_with_justify(Justify::Center),
                    Node {
                        max_width: Val::Px(760.0),
                        ..default()
                    },
                    SceneText,
                ));
            });

            // ── Navigation ────────────────────────────────────────────────────
            root.spawn(Node {
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                column_gap: Val::Px(16.0),
                padding: UiRect::all(Val::Px(24.0)),
                ..default()
            })
            .with_children(|nav| {
                spawn_button(nav, &font.0, "이전", 140.0, dim_text(), ScenePrevButton);

                nav.spawn((
                    Button,
                    Node {
                        width: Val::Px(140.0),
                        height: Val::Px(46.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BackgroundColor(button_bg()),
                    BorderColor::all(button_border()),
                    SceneForwardButton,
                ))
                .with_children(|btn| {
                    btn.spawn((
                        Text::new("다음"),
                        TextFont {
                            font: font.0.clone(),
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(body_text()),
                        SceneForwardLabel,
                    ));
                });
            });
        });
}

/// Recursively despawn the story screen.
pub fn cleanup_scene_screen(mut commands: Commands, query: Query<Entity, With<SceneRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Keep the chapter label, story text, forward label, and prev-button
/// visibility in sync with the session cursor.
#[allow(clippy::type_complexity)]
pub fn scene_text_system(
    session: Res<ChapterSession>,
    catalog: Res<ChapterCatalog>,
    mut q_chapter: Query<&mut Text, With<SceneChapterText>>,
    mut q_scene: Query<&mut Text, (With<SceneText>, Without<SceneChapterText>)>,
    mut q_forward: Query<
        &mut Text,
        (
            With<SceneForwardLabel>,
            Without<SceneText>,
            Without<SceneChapterText>,
        ),
    >,
    mut q_prev: Query<&mut Visibility, With<ScenePrevButton>>,
) {
    let Some(chapter) = catalog.chapters.get(session.chapter) else {
        return;
    };
    let Some(scene) = chapter.scenes.get(session.scene) else {
        return;
    };

    for mut text in q_chapter.iter_mut() {
        **text = chapter.id.to_string();
    }
    for mut text in q_scene.iter_mut() {
        **text = scene.text.to_string();
    }
    for mut text in q_forward.iter_mut() {
        **text = match scene.button {
            SceneButton::Next => "다음".to_string(),
            SceneButton::Puzzle => "Q".to_string(),
        };
    }
    for mut visibility in q_prev.iter_mut() {
        *visibility = if session.scene > 0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

/// Scene navigation: prev steps back; forward either advances the scene or
/// opens the chapter's puzzle.
#[allow(clippy::type_complexity)]
pub fn scene_button_system(
    prev_query: Query<&Interaction, (Changed<Interaction>, With<ScenePrevButton>)>,
    forward_query: Query<&Interaction, (Changed<Interaction>, With<SceneForwardButton>)>,
    mut session: ResMut<ChapterSession>,
    catalog: Res<ChapterCatalog>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    for interaction in prev_query.iter() {
        if *interaction == Interaction::Pressed {
            session.prev_scene();
        }
    }

    for interaction in forward_query.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let button = catalog
            .chapters
            .get(session.chapter)
            .and_then(|c| c.scenes.get(session.scene))
            .map(|s| s.button);
        match button {
            Some(SceneButton::Next) => session.next_scene(&catalog),
            Some(SceneButton::Puzzle) => next_state.set(GamePhase::Puzzle),
            None => {}
        }
    }
}

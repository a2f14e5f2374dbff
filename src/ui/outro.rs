use bevy::prelude::*;

use super::common::*;
use crate::chapter::{ChapterCatalog, ChapterSession, Ending, GamePhase};
use crate::graphics::GameFont;

/// Root node of the outro screen; despawned on `OnExit(Outro)` and replaced
/// when the choice is made.
#[derive(Component)]
pub struct OutroRoot;

/// Tags the two ending-choice buttons.
#[derive(Component)]
pub struct EndingChoiceButton(pub Ending);

/// Tags the "결과보기" button on the ending text.
#[derive(Component)]
pub struct ShowResultButton;

/// Spawn the ending choice: the player's own definition read back, then the
/// two-way decision.
pub fn setup_outro(mut commands: Commands, font: Res<GameFont>, session: Res<ChapterSession>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(28.0),
                ..default()
            },
            BackgroundColor(screen_bg()),
            OutroRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new(format!("사랑이란 {}다.", session.love_definition)),
                TextFont {
                    font: font.0.clone(),
                    font_size: 30.0,
                    ..default()
                },
                TextColor(body_text()),
            ));
            root.spawn((
                Text::new("당신의 선택은?"),
                TextFont {
                    font: font.0.clone(),
                    font_size: 20.0,
                    ..default()
                },
                TextColor(dim_text()),
            ));
            root.spawn(Node {
                column_gap: Val::Px(24.0),
                ..default()
            })
            .with_children(|choices| {
                spawn_button(
                    choices,
                    &font.0,
                    "이별한다",
                    200.0,
                    body_text(),
                    EndingChoiceButton(Ending::Breakup),
                );
                spawn_button(
                    choices,
                    &font.0,
                    "믿어본다",
                    200.0,
                    body_text(),
                    EndingChoiceButton(Ending::Trust),
                );
            });
        });
}

/// Recursively despawn the outro screen.
pub fn cleanup_outro(mut commands: Commands, query: Query<Entity, With<OutroRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Spawn the chosen ending's text and the result button, replacing the
/// choice view.
fn spawn_ending_view(
    commands: &mut Commands,
    font: &Handle<Font>,
    catalog: &ChapterCatalog,
    ending: Ending,
) {
    let definition = match ending {
        Ending::Breakup => &catalog.endings.breakup,
        Ending::Trust => &catalog.endings.trust,
    };
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(24.0),
                padding: UiRect::all(Val::Px(28.0)),
                ..default()
            },
            BackgroundColor(screen_bg()),
            OutroRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new(definition.text),
                TextFont {
                    font: font.clone(),
                    font_size: 16.0,
                    ..default()
                },
                TextColor(body_text()),
                TextLayout::new_with_justify(Justify::Center),
                Node {
                    max_width: Val::Px(760.0),
                    ..default()
                },
            ));
            spawn_button(root, font, "결과보기", 200.0, accent(), ShowResultButton);
        });
}

/// Ending choice and result navigation.
#[allow(clippy::type_complexity)]
pub fn outro_button_system(
    mut commands: Commands,
    choice_query: Query<(&Interaction, &EndingChoiceButton), Changed<Interaction>>,
    result_query: Query<&Interaction, (Changed<Interaction>, With<ShowResultButton>)>,
    roots: Query<Entity, With<OutroRoot>>,
    mut session: ResMut<ChapterSession>,
    catalog: Res<ChapterCatalog>,
    font: Res<GameFont>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    for (interaction, choice) in choice_query.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        session.ending = Some(choice.0);
        session.ended_at_secs = Some(session.elapsed_secs());
        info!("[outro] ending chosen: {:?}", choice.0);

        for entity in roots.iter() {
            commands.entity(entity).despawn();
        }
        spawn_ending_view(&mut commands, &font.0, &catalog, choice.0);
        return;
    }

    for interaction in result_query.iter() {
        if *interaction == Interaction::Pressed {
            next_state.set(GamePhase::Result);
        }
    }
}

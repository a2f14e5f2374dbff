use bevy::prelude::*;

use super::common::*;
use crate::chapter::{ChapterSession, GamePhase};
use crate::graphics::GameFont;
use crate::puzzle::{AnswerEditor, SubmitAnswer};

/// Root node of the intro screen; despawned on `OnExit(Intro)`.
#[derive(Component)]
pub struct IntroRoot;

/// Tags the "시작하기" button.
#[derive(Component)]
pub struct IntroStartButton;

/// Dynamic text mirroring the player's definition buffer.
#[derive(Component)]
pub struct IntroBufferText;

/// Spawn the intro screen: the fill-in-the-blank prompt and the start
/// button.  The player types their definition directly; the shared
/// [`AnswerEditor`] buffer collects it.
pub fn setup_intro(mut commands: Commands, font: Res<GameFont>, mut editor: ResMut<AnswerEditor>) {
    editor.clear();

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(screen_bg()),
            IntroRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("사랑이란"),
                TextFont {
                    font: font.0.clone(),
                    font_size: 52.0,
                    ..default()
                },
                TextColor(body_text()),
            ));

            spacer(root, 26.0);

            root.spawn((
                Text::new("____ 다."),
                TextFont {
                    font: font.0.clone(),
                    font_size: 28.0,
                    ..default()
                },
                TextColor(accent()),
                IntroBufferText,
            ));

            spacer(root, 10.0);

            root.spawn((
                Text::new("당신의 답을 입력하고 시작하세요"),
                TextFont {
                    font: font.0.clone(),
                    font_size: 15.0,
                    ..default()
                },
                TextColor(dim_text()),
            ));

            spacer(root, 40.0);

            spawn_button(root, &font.0, "시작하기", 220.0, body_text(), IntroStartButton);
        });
}

/// Recursively despawn the intro screen.
pub fn cleanup_intro(mut commands: Commands, query: Query<Entity, With<IntroRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Mirror the edit buffer into the blank.
pub fn intro_buffer_text_system(
    editor: Res<AnswerEditor>,
    mut query: Query<&mut Text, With<IntroBufferText>>,
) {
    for mut text in query.iter_mut() {
        if editor.buffer.is_empty() {
            **text = "____ 다.".to_string();
        } else {
            **text = format!("{} 다.", editor.buffer);
        }
    }
}

/// Start button: submits the buffer like the Enter key does.
pub fn intro_button_system(
    query: Query<&Interaction, (Changed<Interaction>, With<IntroStartButton>)>,
    mut submit: MessageWriter<SubmitAnswer>,
) {
    for interaction in query.iter() {
        if *interaction == Interaction::Pressed {
            submit.write(SubmitAnswer);
        }
    }
}

/// Accept the intro submission: a non-empty definition starts the game.
/// An empty buffer is ignored — the blank has to be filled.
pub fn intro_submit_system(
    mut submits: MessageReader<SubmitAnswer>,
    mut editor: ResMut<AnswerEditor>,
    mut session: ResMut<ChapterSession>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    for _ in submits.read() {
        let definition = editor.buffer.trim().to_string();
        if definition.is_empty() {
            continue;
        }
        session.love_definition = definition;
        editor.clear();
        next_state.set(GamePhase::Playing);
    }
}

use bevy::prelude::*;

use super::common::*;
use crate::chapter::{format_time, ChapterSession};
use crate::graphics::GameFont;

/// Root node of the result screen.
#[derive(Component)]
pub struct ResultRoot;

/// Spawn the final tally: escape success, elapsed time, hints used.
pub fn setup_result(mut commands: Commands, font: Res<GameFont>, session: Res<ChapterSession>) {
    let success = session.succeeded();
    let elapsed = session.ended_at_secs.unwrap_or_else(|| session.elapsed_secs());

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(18.0),
                ..default()
            },
            BackgroundColor(screen_bg()),
            ResultRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new(if success { "성공!" } else { "실패" }),
                TextFont {
                    font: font.0.clone(),
                    font_size: 64.0,
                    ..default()
                },
                TextColor(if success { success_text() } else { danger_text() }),
            ));

            spacer(root, 18.0);

            root.spawn((
                Text::new(format!("소요 시간: {}", format_time(elapsed))),
                TextFont {
                    font: font.0.clone(),
                    font_size: 22.0,
                    ..default()
                },
                TextColor(body_text()),
            ));
            root.spawn((
                Text::new(format!("힌트 사용 횟수: {}회", session.hint_count)),
                TextFont {
                    font: font.0.clone(),
                    font_size: 22.0,
                    ..default()
                },
                TextColor(body_text()),
            ));

            spacer(root, 18.0);

            root.spawn((
                Text::new(if success {
                    "제한시간 내에 탈출했습니다!"
                } else {
                    "아쉽지만 시간이 초과되었습니다."
                }),
                TextFont {
                    font: font.0.clone(),
                    font_size: 17.0,
                    ..default()
                },
                TextColor(dim_text()),
            ));
        });
}

/// Recursively despawn the result screen.
pub fn cleanup_result(mut commands: Commands, query: Query<Entity, With<ResultRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

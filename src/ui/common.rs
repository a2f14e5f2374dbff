use bevy::prelude::*;

// Dark neutral theme shared by every screen.

pub(super) fn screen_bg() -> Color {
    Color::srgb(0.06, 0.06, 0.07)
}
pub(super) fn panel_bg() -> Color {
    Color::srgb(0.09, 0.09, 0.11)
}
pub(super) fn panel_border() -> Color {
    Color::srgb(0.25, 0.25, 0.27)
}
pub(super) fn button_bg() -> Color {
    Color::srgb(0.25, 0.25, 0.27)
}
pub(super) fn button_border() -> Color {
    Color::srgb(0.38, 0.38, 0.42)
}
pub(super) fn body_text() -> Color {
    Color::srgb(0.88, 0.88, 0.90)
}
pub(super) fn dim_text() -> Color {
    Color::srgb(0.55, 0.55, 0.60)
}
pub(super) fn accent() -> Color {
    Color::srgb(0.96, 0.76, 0.18)
}
pub(super) fn success_text() -> Color {
    Color::srgb(0.30, 0.85, 0.40)
}
pub(super) fn danger_text() -> Color {
    Color::srgb(0.95, 0.30, 0.30)
}

/// Spawn a fixed-height invisible spacer node.
pub(super) fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

/// Spawn a standard bordered button with a single text label and the given
/// marker component.
pub(super) fn spawn_button<M: Component>(
    parent: &mut ChildSpawnerCommands<'_>,
    font: &Handle<Font>,
    label: &str,
    width: f32,
    text_color: Color,
    marker: M,
) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(width),
                height: Val::Px(46.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(button_bg()),
            BorderColor::all(button_border()),
            marker,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font: font.clone(),
                    font_size: 18.0,
                    ..default()
                },
                TextColor(text_color),
            ));
        });
}

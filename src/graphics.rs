use bevy::prelude::*;

/// Game font resource — stores the loaded Korean-capable font handle.
///
/// All UI and in-world text references `font.0.clone()` instead of the
/// default Bevy font, which lacks Hangul coverage.  Created by
/// [`load_game_font`] at startup.
#[derive(Resource, Default)]
pub struct GameFont(pub Handle<Font>);

/// Load the story font from assets at startup.
///
/// Must run before any setup system that spawns text.
pub fn load_game_font(mut font: ResMut<GameFont>, asset_server: Res<AssetServer>) {
    font.0 = asset_server.load("fonts/NotoSansKR-Regular.ttf");
    info!("[setup] game font loading");
}

/// Setup camera for 2D rendering.
pub fn setup_camera(mut commands: Commands) {
    // Default Camera2d at the origin; puzzle worlds are built around it.
    commands.spawn(Camera2d);
    info!("[setup] camera spawned");
}

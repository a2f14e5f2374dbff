use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;

use love_escape::chapter::{ChapterPlugin, ChapterSession, GamePhase};
use love_escape::collapse::{CollapsePlugin, CollapseRng};
use love_escape::config::{self, GameConfig};
use love_escape::graphics;
use love_escape::puzzle::PuzzlePlugin;
use love_escape::stacking::StackingPlugin;
use love_escape::ui::UiPlugin;

/// Configure Rapier for the stacking world: pixel-scale downward gravity.
/// The collapse puzzle runs its own integrator and never touches Rapier.
fn setup_physics_config(mut rapier: Query<&mut RapierConfiguration>, config: Res<GameConfig>) {
    for mut cfg in rapier.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -config.stack_gravity);
    }
}

fn main() {
    // LOVE_ESCAPE_CHAPTER=<1..12> skips the intro and starts at a chapter's
    // final scene, one click away from its puzzle.
    let start_chapter = env::var("LOVE_ESCAPE_CHAPTER")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|c| (1..=12).contains(c));

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "사랑이란 — Love Escape".into(),
            resolution: WindowResolution::new(1000, 700),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.06, 0.06, 0.07)))
    // Compiled defaults; load_game_config overwrites them from
    // assets/game.toml (if present) in the Startup schedule.
    .insert_resource(GameConfig::default())
    .insert_resource(graphics::GameFont::default())
    .insert_resource(CollapseRng(StdRng::from_entropy()))
    // pixels_per_meter(1.0) keeps world units identical to the tuned pixel
    // constants; larger values shrink collider mass quadratically and change
    // the stack's feel.
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
    .add_plugins((
        ChapterPlugin,
        PuzzlePlugin,
        CollapsePlugin,
        StackingPlugin,
        UiPlugin,
    ))
    .add_systems(
        Startup,
        (
            // Load config first so every other startup system sees the final
            // values.
            config::load_game_config,
            graphics::load_game_font.after(config::load_game_config),
            graphics::setup_camera.after(config::load_game_config),
            setup_physics_config.after(config::load_game_config),
        ),
    );

    if let Some(chapter) = start_chapter {
        let catalog = love_escape::chapter::ChapterCatalog::default();
        let scene = catalog
            .chapters
            .get(chapter - 1)
            .map(|c| c.scenes.len().saturating_sub(1))
            .unwrap_or(0);
        app.insert_resource(ChapterSession {
            chapter: chapter - 1,
            scene,
            ..Default::default()
        });
        app.insert_state(GamePhase::Playing);
        println!("Starting at chapter {chapter}");
    }

    app.run();
}

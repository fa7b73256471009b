//! sine demo
//!
//! Renders at the logical resolution from `assets/config.ron` into an
//! offscreen target, then letterboxes it into the window.
//! - Playground: click to drop bodies
//! - Level: A/D to run, Space to jump
//! - P switches, T toggles debug outlines

mod demo;

use demo::{LevelState, Playground, CONFIG_PATH, LEVEL, PLAYGROUND};
use macroquad::prelude::*;
use sine::viewport::draw_letterboxed;
use sine::{FrameInput, GameConfig, Letterbox, SceneSwitcher, VERSION};

fn window_conf() -> Conf {
    let config = GameConfig::load_or_default(CONFIG_PATH);
    Conf {
        window_title: format!("{} v{}", config.title, VERSION),
        window_width: config.window_width,
        window_height: config.window_height,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Crash logging first, before anything can panic
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load_or_default(CONFIG_PATH);
    log::info!(
        "sine v{}: {}x{} logical, {}px tiles",
        VERSION,
        config.game_width,
        config.game_height,
        config.tile_size
    );

    let target = render_target(config.game_width as u32, config.game_height as u32);
    target.texture.set_filter(FilterMode::Nearest);

    let mut switcher = SceneSwitcher::new(config.clone());
    switcher.set_render_target(Some(target.clone()));
    let playground = switcher.register(Playground::new);
    let level = switcher.register(LevelState::new);
    if (playground, level) != (PLAYGROUND, LEVEL) {
        log::warn!("demo scenes registered as {} and {}, switching keys may misfire", playground, level);
    }

    let game_rect = Rect::new(0.0, 0.0, config.game_width, config.game_height);
    loop {
        let input = FrameInput::poll();
        switcher.update(get_frame_time(), &input);

        let mut clear_camera = Camera2D::from_display_rect(game_rect);
        clear_camera.render_target = Some(target.clone());
        set_camera(&clear_camera);
        clear_background(Color::from_rgba(24, 20, 37, 255));
        switcher.draw();

        set_default_camera();
        draw_letterboxed(&target.texture, &Letterbox::fit(input.screen, config.game_size()));

        next_frame().await
    }
}

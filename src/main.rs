//! Potesara demo runner.
//!
//! Opens a raylib window, optionally plays an animation folder, a music
//! track and a sound effect, and runs the per-frame loop:
//!
//! 1. Restore the window aspect ratio after a resize
//! 2. Tick the current scene
//! 3. Draw the current scene through the virtual screen
//! 4. Refill music streams
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --animation assets/walk --music assets/bgm.ogg
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};
use raylib::prelude::Color;

use potesara::backend::GraphicsBackend;
use potesara::backend::raylib::{RaylibAudioBackend, RaylibBackend};
use potesara::components::animation::Animation;
use potesara::resources::audio::AudioManager;
use potesara::resources::gameconfig::GameConfig;
use potesara::resources::texture::{DrawOptions, ReferencePoint};
use potesara::resources::windowcontroller::WindowController;
use potesara::scene::{Scene, SceneManager};

/// Potesara 2D demo runner
#[derive(Parser)]
#[command(version, about = "Plays an animation folder and audio files in a Potesara window.")]
struct Cli {
    /// Configuration file to read.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Animation folder (0.png, 1.png, ... and an optional anim.json).
    #[arg(long, value_name = "DIR")]
    animation: Option<PathBuf>,

    /// Music track to loop in the background.
    #[arg(long, value_name = "FILE")]
    music: Option<PathBuf>,

    /// Sound effect played once at startup.
    #[arg(long, value_name = "FILE")]
    sound: Option<PathBuf>,

    /// Let the window be resized to any aspect ratio.
    #[arg(long)]
    no_aspect_lock: bool,
}

/// Shows one animation centered on the virtual screen.
struct DemoScene {
    animation: Option<Animation<RaylibBackend>>,
    center: (f32, f32),
}

impl Scene<RaylibBackend> for DemoScene {
    fn enable(&mut self) {
        if let Some(animation) = self.animation.as_mut() {
            animation.reset();
        }
        info!("Demo scene enabled");
    }

    fn disable(&mut self) {
        if let Some(animation) = self.animation.as_mut() {
            animation.stop();
        }
    }

    fn update(&mut self, dt: f32) {
        if let Some(animation) = self.animation.as_mut() {
            animation.update(dt);
        }
    }

    fn draw(&mut self, gfx: &mut RaylibBackend) {
        if let Some(animation) = self.animation.as_ref() {
            let opts = DrawOptions::new().with_reference_point(ReferencePoint::Center);
            animation.draw(gfx, self.center.0, self.center.1, &opts);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
        config = GameConfig::with_path(&cli.config);
    }
    if cli.no_aspect_lock {
        config.aspect_lock = false;
    }

    // --------------- Raylib window ---------------
    let (mut rl, thread) = raylib::init()
        .size(config.window_width as i32, config.window_height as i32)
        .resizable()
        .title(&config.title)
        .build();
    rl.set_target_fps(config.target_fps);
    let mut gfx = RaylibBackend::new(rl, thread);
    gfx.set_vsync(config.vsync);

    // --------------- Scenes ---------------
    let mut scenes =
        match SceneManager::with_resolution(&mut gfx, config.render_width, config.render_height) {
            Ok(scenes) => scenes,
            Err(e) => {
                error!("Failed to create virtual screen: {}", e);
                std::process::exit(1);
            }
        };

    let animation = cli
        .animation
        .as_ref()
        .and_then(|dir| match Animation::load(&mut gfx, dir) {
            Ok(animation) => Some(animation),
            Err(e) => {
                error!("Failed to load animation {:?}: {}", dir, e);
                None
            }
        });
    let demo = scenes.spawn(DemoScene {
        animation,
        center: (
            config.render_width as f32 / 2.0,
            config.render_height as f32 / 2.0,
        ),
    });
    scenes.add_scene(demo);
    scenes.change_scene(demo);

    // --------------- Audio ---------------
    let mut audio = match RaylibAudioBackend::init() {
        Ok(backend) => Some(AudioManager::with_sound_channels(
            backend,
            config.sound_channels as usize,
        )),
        Err(e) => {
            warn!("Running without audio: {}", e);
            None
        }
    };
    if let Some(audio) = audio.as_mut() {
        if let Some(path) = &cli.music {
            if audio.register_music("bgm", path, true, 1.0) {
                audio.play_music("bgm");
            }
        }
        if let Some(path) = &cli.sound {
            if audio.register_sound("sfx", path, 1.0) {
                audio.play_sound("sfx");
            }
        }
    }

    let mut window = WindowController::new(config.render_width as i32, config.render_height as i32);
    window.set_aspect_lock(config.aspect_lock);

    // --------------- Main loop ---------------
    while !gfx.window_should_close() {
        let dt = gfx.frame_time();

        window.update(&mut gfx);
        scenes.update(dt);

        gfx.begin_frame();
        gfx.clear(Color::BLACK);
        scenes.draw(&mut gfx);
        gfx.end_frame();

        if let Some(audio) = audio.as_mut() {
            audio.update_music();
        }
    }

    scenes.delete_all_scenes();
    if let Some(audio) = audio.as_mut() {
        audio.unload_all();
    }
    info!("Bye!");
}

//! Integration tests for loading and playing animation folders.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test animation_integration
//! ```

use std::fs;
use std::path::Path;

use potesara::backend::headless::{DrawCall, HeadlessGraphics};
use potesara::components::animation::{Animation, AnimationError};
use potesara::resources::texture::{DrawOptions, ReferencePoint};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn write_frames(dir: &Path, count: usize) {
    for i in 0..count {
        fs::write(dir.join(format!("{i}.png")), b"png").unwrap();
    }
}

// =============================================================================
// Folder loading
// =============================================================================

#[test]
fn four_frames_fps10_no_loop_ends_on_last_frame() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 4);
    fs::write(dir.path().join("anim.json"), r#"{"FPS": 10, "Loop": false}"#).unwrap();

    let mut gfx = HeadlessGraphics::default();
    let mut anim = Animation::load(&mut gfx, dir.path()).unwrap();
    assert_eq!(anim.frame_count(), 4);
    assert!(approx_eq(anim.frame_time(), 0.1));
    assert!(!anim.is_looping());

    anim.update(1.0);
    assert_eq!(anim.current_frame(), 3);
    assert!(!anim.is_playing());

    anim.update(1.0);
    assert_eq!(anim.current_frame(), 3);
}

#[test]
fn missing_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 2);

    let mut gfx = HeadlessGraphics::default();
    let anim = Animation::load(&mut gfx, dir.path()).unwrap();
    assert!(anim.is_looping());
    assert!(anim.is_playing());
    assert!(approx_eq(anim.frame_time(), 1.0 / 60.0));
    assert_eq!(anim.current_frame(), 0);
}

#[test]
fn loading_stops_at_first_gap() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 3);
    fs::write(dir.path().join("5.png"), b"png").unwrap();

    let mut gfx = HeadlessGraphics::default();
    let anim = Animation::load(&mut gfx, dir.path()).unwrap();
    assert_eq!(anim.frame_count(), 3);
}

#[test]
fn empty_folder_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("1.png"), b"png").unwrap();

    let mut gfx = HeadlessGraphics::default();
    let result = Animation::load(&mut gfx, dir.path());
    assert!(matches!(result, Err(AnimationError::NoFrames(_))));
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 2);
    fs::write(dir.path().join("anim.json"), "{\"FPS\": \"fast\"}").unwrap();

    let mut gfx = HeadlessGraphics::default();
    let result = Animation::load(&mut gfx, dir.path());
    assert!(matches!(result, Err(AnimationError::ConfigParse { .. })));
}

#[test]
fn zero_fps_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 2);
    fs::write(dir.path().join("anim.json"), r#"{"FPS": 0}"#).unwrap();

    let mut gfx = HeadlessGraphics::default();
    let result = Animation::load(&mut gfx, dir.path());
    assert!(matches!(result, Err(AnimationError::InvalidFps)));
}

#[test]
fn frame_that_fails_to_decode_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 3);

    let mut gfx = HeadlessGraphics::default();
    gfx.fail_on(dir.path().join("1.png"));
    let result = Animation::load(&mut gfx, dir.path());
    assert!(matches!(result, Err(AnimationError::Frame { index: 1, .. })));
    // frame 0 was released again when loading bailed out
    assert_eq!(gfx.released().len(), 1);
}

// =============================================================================
// Playback
// =============================================================================

#[test]
fn looping_playback_wraps_for_every_cycle_count() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 5);

    let mut gfx = HeadlessGraphics::default();
    for fps in [16, 60, 24, 10] {
        fs::write(dir.path().join("anim.json"), format!(r#"{{"FPS": {fps}}}"#)).unwrap();
        let mut anim = Animation::load(&mut gfx, dir.path()).unwrap();
        for k in 0..120 {
            anim.reset();
            anim.update(k as f32 * anim.frame_time());
            assert_eq!(anim.current_frame(), k % 5, "fps = {fps}, k = {k}");
            assert_eq!(anim.timer(), 0.0, "fps = {fps}, k = {k}");
        }
    }
}

#[test]
fn non_loop_at_default_fps_stops_after_last_frame() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 4);
    fs::write(dir.path().join("anim.json"), r#"{"Loop": false}"#).unwrap();

    let mut gfx = HeadlessGraphics::default();
    let mut anim = Animation::load(&mut gfx, dir.path()).unwrap();
    anim.update(3.0 * anim.frame_time());
    assert_eq!(anim.current_frame(), 3);
    assert!(anim.is_playing());

    anim.update(anim.frame_time());
    assert_eq!(anim.current_frame(), 3);
    assert!(!anim.is_playing());
    assert_eq!(anim.timer(), 0.0);
}

#[test]
fn centered_draw_of_current_frame() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), 2);

    let mut gfx = HeadlessGraphics::default();
    gfx.set_texture_size(40.0, 20.0);
    let anim = Animation::load(&mut gfx, dir.path()).unwrap();

    let opts = DrawOptions::new()
        .with_reference_point(ReferencePoint::Center)
        .with_scale(2.0, 2.0);
    anim.draw(&mut gfx, 960.0, 540.0, &opts);

    match gfx.calls().as_slice() {
        [DrawCall::Texture { cmd, .. }] => {
            assert!(approx_eq(cmd.origin.x, 40.0));
            assert!(approx_eq(cmd.origin.y, 20.0));
            assert!(approx_eq(cmd.dest.width, 80.0));
            assert_eq!(cmd.tint.a, 255);
        }
        other => panic!("unexpected calls {other:?}"),
    }
}

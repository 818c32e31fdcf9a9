//! Integration tests for the scene manager lifecycle and the scene tree.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test scene_integration
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use potesara::backend::headless::{DrawCall, HeadlessGraphics};
use potesara::backend::GraphicsBackend;
use potesara::components::animation::{Animation, AnimationConfig};
use potesara::resources::texture::{DrawOptions, Texture};
use potesara::scene::{Scene, SceneId, SceneManager};

/// Counts hook calls per scene name.
#[derive(Default, Clone)]
struct Hooks(Rc<RefCell<FxHashMap<(&'static str, &'static str), usize>>>);

impl Hooks {
    fn bump(&self, name: &'static str, hook: &'static str) {
        *self.0.borrow_mut().entry((name, hook)).or_default() += 1;
    }

    fn count(&self, name: &'static str, hook: &'static str) -> usize {
        self.0.borrow().get(&(name, hook)).copied().unwrap_or(0)
    }
}

struct Counting {
    name: &'static str,
    hooks: Hooks,
}

impl Scene<HeadlessGraphics> for Counting {
    fn enable(&mut self) {
        self.hooks.bump(self.name, "enable");
    }
    fn disable(&mut self) {
        self.hooks.bump(self.name, "disable");
    }
    fn update(&mut self, _dt: f32) {
        self.hooks.bump(self.name, "update");
    }
    fn draw(&mut self, _gfx: &mut HeadlessGraphics) {
        self.hooks.bump(self.name, "draw");
    }
}

fn counting(hooks: &Hooks, name: &'static str) -> Counting {
    Counting {
        name,
        hooks: hooks.clone(),
    }
}

fn manager() -> (HeadlessGraphics, SceneManager<HeadlessGraphics>) {
    let mut gfx = HeadlessGraphics::default();
    let manager = SceneManager::new(&mut gfx).unwrap();
    (gfx, manager)
}

// =============================================================================
// delete_all_scenes
// =============================================================================

#[test]
fn delete_all_disables_every_node_once() {
    let (_gfx, mut scenes) = manager();
    let hooks = Hooks::default();

    // title
    // game
    //   hud
    //     score
    //   pause
    let title = scenes.spawn(counting(&hooks, "title"));
    let game = scenes.spawn(counting(&hooks, "game"));
    let hud = scenes.spawn_child(game, counting(&hooks, "hud")).unwrap();
    let score = scenes.spawn_child(hud, counting(&hooks, "score")).unwrap();
    let pause = scenes.spawn_child(game, counting(&hooks, "pause")).unwrap();
    scenes.add_scene(title);
    scenes.add_scene(game);
    scenes.change_scene(game);

    scenes.delete_all_scenes();

    for name in ["title", "game", "hud", "score", "pause"] {
        assert_eq!(hooks.count(name, "disable"), 1, "{name}");
    }
    assert!(scenes.scenes().is_empty());
    assert!(scenes.current_scene_id().is_none());
    for id in [title, game, hud, score, pause] {
        assert!(!scenes.contains(id));
    }
    assert!(scenes.is_empty());
}

#[test]
fn delete_all_disables_children_before_parents() {
    let (_gfx, mut scenes) = manager();
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    struct Ordered {
        name: &'static str,
        order: Rc<RefCell<Vec<&'static str>>>,
    }
    impl Scene<HeadlessGraphics> for Ordered {
        fn disable(&mut self) {
            self.order.borrow_mut().push(self.name);
        }
    }
    let ordered = |name| Ordered {
        name,
        order: Rc::clone(&order),
    };

    let root = scenes.spawn(ordered("root"));
    let a = scenes.spawn_child(root, ordered("a")).unwrap();
    scenes.spawn_child(a, ordered("a1")).unwrap();
    scenes.spawn_child(root, ordered("b")).unwrap();
    scenes.add_scene(root);

    scenes.delete_all_scenes();
    assert_eq!(*order.borrow(), vec!["a1", "a", "b", "root"]);
}

#[test]
fn delete_all_keeps_unregistered_current_scene_in_arena() {
    let (_gfx, mut scenes) = manager();
    let hooks = Hooks::default();
    let loose = scenes.spawn(counting(&hooks, "loose"));
    scenes.change_scene(loose);

    scenes.delete_all_scenes();
    // change_scene disabled it once, delete_all once more
    assert_eq!(hooks.count("loose", "disable"), 2);
    assert!(scenes.current_scene_id().is_none());
    assert!(scenes.contains(loose));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn switching_between_registered_scenes() {
    let (mut gfx, mut scenes) = manager();
    let hooks = Hooks::default();
    let menu = scenes.spawn(counting(&hooks, "menu"));
    let stage = scenes.spawn(counting(&hooks, "stage"));
    scenes.add_scene(menu);
    scenes.add_scene(stage);

    scenes.change_scene(menu);
    scenes.update(0.016);
    scenes.draw(&mut gfx);
    scenes.change_scene(stage);
    scenes.update(0.016);
    scenes.update(0.016);

    assert_eq!(hooks.count("menu", "enable"), 1);
    assert_eq!(hooks.count("menu", "disable"), 1);
    assert_eq!(hooks.count("menu", "update"), 1);
    assert_eq!(hooks.count("menu", "draw"), 1);
    assert_eq!(hooks.count("stage", "enable"), 1);
    assert_eq!(hooks.count("stage", "disable"), 0);
    assert_eq!(hooks.count("stage", "update"), 2);
}

#[test]
fn remove_current_disables_exactly_once() {
    let (mut gfx, mut scenes) = manager();
    let hooks = Hooks::default();
    let stage = scenes.spawn(counting(&hooks, "stage"));
    scenes.add_scene(stage);
    scenes.change_scene(stage);

    scenes.remove_scene(stage);
    assert_eq!(hooks.count("stage", "disable"), 1);
    assert!(scenes.current_scene().is_none());

    scenes.update(1.0);
    scenes.draw(&mut gfx);
    assert_eq!(hooks.count("stage", "update"), 0);
    assert!(gfx.calls().is_empty());
}

#[test]
fn reparenting_children() {
    let (_gfx, mut scenes) = manager();
    let hooks = Hooks::default();
    let a = scenes.spawn(counting(&hooks, "a"));
    let b = scenes.spawn(counting(&hooks, "b"));
    let c = scenes.spawn_child(a, counting(&hooks, "c")).unwrap();

    assert!(scenes.attach_child(b, c));
    assert_eq!(scenes.parent(c), Some(b));
    assert!(scenes.children(a).is_empty());
    assert!(!scenes.attach_child(c, b));

    scenes.detach(c);
    assert_eq!(scenes.parent(c), None);
    assert!(scenes.children(b).is_empty());
}

// =============================================================================
// Drawing
// =============================================================================

/// Scene that owns an animation, the way a game scene would.
struct Stage {
    animation: Animation<HeadlessGraphics>,
}

impl Scene<HeadlessGraphics> for Stage {
    fn enable(&mut self) {
        self.animation.reset();
    }
    fn update(&mut self, dt: f32) {
        self.animation.update(dt);
    }
    fn draw(&mut self, gfx: &mut HeadlessGraphics) {
        self.animation.draw(gfx, 100.0, 100.0, &DrawOptions::new());
    }
}

#[test]
fn scene_draws_into_virtual_screen_then_blits() {
    let dir = tempfile::tempdir().unwrap();
    let mut gfx = HeadlessGraphics::new(960, 540);
    let mut frames = Vec::new();
    for i in 0..3 {
        let path = dir.path().join(format!("{i}.png"));
        std::fs::write(&path, b"png").unwrap();
        frames.push(Texture::load(&mut gfx, &path).unwrap());
    }
    let animation = Animation::from_frames(
        frames,
        AnimationConfig {
            looping: true,
            fps: 4,
        },
    )
    .unwrap();
    let expected = animation.current_texture().unwrap().handle().unwrap().id() + 1;

    let mut scenes = SceneManager::new(&mut gfx).unwrap();
    let stage: SceneId = scenes.spawn(Stage { animation });
    scenes.add_scene(stage);
    scenes.change_scene(stage);
    scenes.update(0.25);
    scenes.draw(&mut gfx);

    let calls = gfx.calls();
    assert_eq!(calls.len(), 5);
    assert!(matches!(calls[0], DrawCall::BeginSurface(_)));
    assert!(matches!(calls[1], DrawCall::Clear(_)));
    assert!(matches!(calls[2], DrawCall::Texture { id, .. } if id == expected));
    assert!(matches!(calls[3], DrawCall::EndSurface));
    match &calls[4] {
        DrawCall::Surface { cmd, .. } => {
            assert_eq!(cmd.source.width, 1920.0);
            assert_eq!(cmd.source.height, -1080.0);
            assert_eq!(cmd.dest.width, 960.0);
            assert_eq!(cmd.dest.height, 540.0);
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert_eq!(gfx.screen_size(), (960, 540));
}

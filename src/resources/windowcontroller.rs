//! Window aspect-ratio lock.
//!
//! After the user resizes the window, [`WindowController::update`] snaps it
//! back to the base aspect ratio, keeping the width when the window became
//! too wide and the height otherwise.

use log::debug;

use crate::backend::WindowBackend;

/// Ratios closer than this are treated as equal.
const ASPECT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy)]
pub struct WindowController {
    target_aspect: f32,
    aspect_lock: bool,
}

impl WindowController {
    /// Lock to the aspect ratio of `base_width` x `base_height`.
    pub fn new(base_width: i32, base_height: i32) -> Self {
        Self {
            target_aspect: base_width as f32 / base_height as f32,
            aspect_lock: true,
        }
    }

    pub fn set_aspect_lock(&mut self, enable: bool) {
        self.aspect_lock = enable;
    }

    pub fn is_aspect_locked(&self) -> bool {
        self.aspect_lock
    }

    pub fn target_aspect(&self) -> f32 {
        self.target_aspect
    }

    /// Size the window should have to match the target ratio, or `None` when
    /// it already does. A minimized window (zero or negative extent) is left
    /// alone.
    pub fn corrected_size(&self, width: i32, height: i32) -> Option<(i32, i32)> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let current = width as f32 / height as f32;
        if (current - self.target_aspect).abs() < ASPECT_EPSILON {
            return None;
        }
        if current > self.target_aspect {
            Some((width, (width as f32 / self.target_aspect) as i32))
        } else {
            Some(((height as f32 * self.target_aspect) as i32, height))
        }
    }

    /// Call once per frame.
    pub fn update<W: WindowBackend>(&self, window: &mut W) {
        if !self.aspect_lock || !window.is_window_resized() {
            return;
        }
        let (w, h) = window.window_size();
        if let Some((new_w, new_h)) = self.corrected_size(w, h) {
            debug!("Restoring aspect ratio: {}x{} -> {}x{}", w, h, new_w, new_h);
            window.set_window_size(new_w, new_h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessGraphics;

    #[test]
    fn test_too_wide_keeps_width() {
        let controller = WindowController::new(1920, 1080);
        let mut window = HeadlessGraphics::new(1280, 720);
        window.simulate_resize(1600, 720);
        controller.update(&mut window);
        assert_eq!(window.window_size(), (1600, 900));
    }

    #[test]
    fn test_too_tall_keeps_height() {
        let controller = WindowController::new(1920, 1080);
        let mut window = HeadlessGraphics::new(1280, 720);
        window.simulate_resize(1280, 900);
        controller.update(&mut window);
        assert_eq!(window.window_size(), (1600, 900));
    }

    #[test]
    fn test_matching_ratio_is_left_alone() {
        let controller = WindowController::new(1920, 1080);
        let mut window = HeadlessGraphics::new(1280, 720);
        window.simulate_resize(1600, 900);
        controller.update(&mut window);
        assert!(window.is_window_resized());
        assert_eq!(window.window_size(), (1600, 900));
    }

    #[test]
    fn test_unlocked_or_not_resized_does_nothing() {
        let mut controller = WindowController::new(1920, 1080);
        let mut window = HeadlessGraphics::new(1000, 1000);
        controller.update(&mut window);
        assert_eq!(window.window_size(), (1000, 1000));

        controller.set_aspect_lock(false);
        assert!(!controller.is_aspect_locked());
        window.simulate_resize(1000, 500);
        controller.update(&mut window);
        assert_eq!(window.window_size(), (1000, 500));
    }

    #[test]
    fn test_minimized_window_is_left_alone() {
        let controller = WindowController::new(1920, 1080);
        assert_eq!(controller.corrected_size(0, 0), None);
        assert_eq!(controller.corrected_size(1280, 0), None);
        assert_eq!(controller.corrected_size(0, 720), None);

        let mut window = HeadlessGraphics::new(1280, 720);
        window.simulate_resize(0, 0);
        controller.update(&mut window);
        assert_eq!(window.window_size(), (0, 0));
    }
}

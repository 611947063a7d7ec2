// Candle-index <-> pixel transform with pan, zoom and follow mode
use std::ops::Range;

use crate::config::ViewportConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Newest candle pinned at a fixed screen position every frame.
    Follow,
    /// Transform driven by user gestures.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    start_x: f64,
    start_translate: f64,
}

/// `scale_x` is pixels per candle index, `translate_x` the pixel offset of index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale_x: f64,
    translate_x: f64,
    mode: ViewMode,
    limits: ViewportConfig,
    drag: Option<DragAnchor>,
}

impl Viewport {
    pub fn new(limits: ViewportConfig) -> Self {
        let mut viewport = Viewport {
            scale_x: limits.initial_scale_x,
            translate_x: 0.0,
            mode: ViewMode::Follow,
            limits,
            drag: None,
        };
        viewport.scale_x = viewport.clamp_scale(limits.initial_scale_x);
        viewport
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn translate_x(&self) -> f64 {
        self.translate_x
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn world_x(&self, index: f64) -> f64 {
        index * self.scale_x + self.translate_x
    }

    pub fn inv_world_x(&self, x: f64) -> f64 {
        (x - self.translate_x) / self.scale_x
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.limits.min_scale_x;
        }
        scale.clamp(self.limits.min_scale_x, self.limits.max_scale_x)
    }

    /// Translation that puts the newest candle's right edge at the follow anchor.
    pub fn follow_translate(&self, candle_count: usize, width: f64) -> f64 {
        width / 2.0 + self.limits.follow_offset_px - candle_count as f64 * self.scale_x
    }

    /// Re-anchors the newest candle when in follow mode; manual mode is left alone.
    pub fn follow(&mut self, candle_count: usize, width: f64) {
        if self.mode == ViewMode::Follow {
            self.translate_x = self.follow_translate(candle_count, width);
        }
    }

    /// Keeps the newest candle's right edge at least `min_visible_px` in from
    /// the left and the oldest candle's left edge at least as far in from the right.
    pub fn clamp_translate(&mut self, candle_count: usize, width: f64) {
        let min_visible = self.limits.min_visible_px;
        let lo = min_visible - candle_count as f64 * self.scale_x;
        let hi = width - min_visible;
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.translate_x = self.translate_x.clamp(lo, hi);
    }

    /// Zooms by `factor` (> 1 zooms in) keeping the point under `cursor_x` fixed.
    pub fn zoom_at(&mut self, cursor_x: f64, factor: f64, candle_count: usize, width: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let old_scale = self.scale_x;
        let new_scale = self.clamp_scale(old_scale * factor);
        self.translate_x = cursor_x - (cursor_x - self.translate_x) * new_scale / old_scale;
        self.scale_x = new_scale;
        self.mode = ViewMode::Manual;
        self.clamp_translate(candle_count, width);
    }

    pub fn begin_drag(&mut self, x: f64) {
        self.drag = Some(DragAnchor {
            start_x: x,
            start_translate: self.translate_x,
        });
        self.mode = ViewMode::Manual;
    }

    pub fn drag_to(&mut self, x: f64, candle_count: usize, width: f64) {
        if let Some(anchor) = self.drag {
            self.translate_x = anchor.start_translate + (x - anchor.start_x);
            self.clamp_translate(candle_count, width);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// True when the newest candle's centre is on screen.
    pub fn newest_visible(&self, candle_count: usize, width: f64) -> bool {
        if candle_count == 0 {
            return true;
        }
        let x = self.world_x(candle_count as f64 - 0.5);
        (0.0..=width).contains(&x)
    }

    pub fn needs_return_to_follow(&self, candle_count: usize, width: f64) -> bool {
        self.mode == ViewMode::Manual && !self.newest_visible(candle_count, width)
    }

    pub fn return_to_follow(&mut self) {
        self.mode = ViewMode::Follow;
        self.drag = None;
    }

    /// Candle indices that overlap `[0, width]`.
    pub fn visible_range(&self, candle_count: usize, width: f64) -> Range<usize> {
        let first = self.inv_world_x(0.0).floor();
        let last = self.inv_world_x(width).ceil();
        let start = if first.is_finite() { first.max(0.0) as usize } else { 0 };
        let end = if last.is_finite() { last.max(0.0) as usize } else { candle_count };
        let start = start.min(candle_count);
        let end = end.clamp(start, candle_count);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ViewportConfig {
        ViewportConfig {
            initial_scale_x: 8.0,
            min_scale_x: 2.0,
            max_scale_x: 40.0,
            follow_offset_px: 100.0,
            min_visible_px: 40.0,
            zoom_step: 1.1,
        }
    }

    fn manual_at(translate_x: f64) -> Viewport {
        let mut vp = Viewport::new(limits());
        vp.begin_drag(0.0);
        vp.end_drag();
        vp.translate_x = translate_x;
        vp
    }

    #[test]
    fn transform_round_trips() {
        let vp = manual_at(-123.0);
        for i in [0.0, 1.5, 99.0] {
            assert!((vp.inv_world_x(vp.world_x(i)) - i).abs() < 1e-9);
        }
    }

    #[test]
    fn follow_pins_newest_candle() {
        let mut vp = Viewport::new(limits());
        vp.follow(200, 800.0);
        assert_eq!(vp.mode(), ViewMode::Follow);
        assert!((vp.world_x(200.0) - 500.0).abs() < 1e-9);
        vp.follow(201, 800.0);
        assert!((vp.world_x(201.0) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn scale_stays_within_bounds() {
        let mut vp = Viewport::new(limits());
        vp.follow(500, 800.0);
        for _ in 0..200 {
            vp.zoom_at(400.0, 1.7, 500, 800.0);
            assert!(vp.scale_x() <= 40.0);
        }
        assert_eq!(vp.scale_x(), 40.0);
        for _ in 0..200 {
            vp.zoom_at(10.0, 0.3, 500, 800.0);
            assert!(vp.scale_x() >= 2.0);
        }
        assert_eq!(vp.scale_x(), 2.0);
        vp.zoom_at(10.0, f64::NAN, 500, 800.0);
        assert_eq!(vp.scale_x(), 2.0);
    }

    #[test]
    fn zoom_keeps_point_under_cursor() {
        let mut vp = manual_at(-400.0);
        let cursor = 300.0;
        let index_under_cursor = vp.inv_world_x(cursor);
        vp.zoom_at(cursor, 1.5, 200, 800.0);
        assert!((vp.world_x(index_under_cursor) - cursor).abs() < 1e-6);
        assert_eq!(vp.scale_x(), 12.0);
    }

    #[test]
    fn zoom_leaves_follow_mode() {
        let mut vp = Viewport::new(limits());
        vp.follow(100, 800.0);
        vp.zoom_at(200.0, 1.1, 100, 800.0);
        assert_eq!(vp.mode(), ViewMode::Manual);
    }

    #[test]
    fn drag_pans_from_anchor() {
        let mut vp = manual_at(-400.0);
        vp.begin_drag(100.0);
        vp.drag_to(150.0, 200, 800.0);
        assert_eq!(vp.translate_x(), -350.0);
        vp.drag_to(80.0, 200, 800.0);
        assert_eq!(vp.translate_x(), -420.0);
        vp.end_drag();
        vp.drag_to(0.0, 200, 800.0);
        assert_eq!(vp.translate_x(), -420.0);
    }

    #[test]
    fn extreme_drag_keeps_newest_candle_visible() {
        let mut vp = manual_at(0.0);
        vp.begin_drag(0.0);
        vp.drag_to(-1.0e9, 200, 800.0);
        assert!(vp.world_x(200.0) >= 40.0 - 1e-9);
        vp.drag_to(1.0e9, 200, 800.0);
        assert!(vp.world_x(0.0) <= 800.0 - 40.0 + 1e-9);
    }

    #[test]
    fn return_to_follow_affordance() {
        let mut vp = Viewport::new(limits());
        vp.follow(200, 800.0);
        assert!(!vp.needs_return_to_follow(200, 800.0));
        vp.begin_drag(0.0);
        vp.drag_to(700.0, 200, 800.0);
        vp.end_drag();
        assert!(vp.needs_return_to_follow(200, 800.0));
        vp.return_to_follow();
        vp.follow(200, 800.0);
        assert!(!vp.needs_return_to_follow(200, 800.0));
    }

    #[test]
    fn visible_range_matches_inverse_transform() {
        let vp = manual_at(-400.0);
        // 8 px per candle: x=0 is index 50, x=800 is index 150
        assert_eq!(vp.visible_range(200, 800.0), 50..150);
        assert_eq!(vp.visible_range(120, 800.0), 50..120);
        assert_eq!(vp.visible_range(10, 800.0), 10..10);
    }
}

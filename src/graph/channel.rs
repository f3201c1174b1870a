//! src/graph/channel.rs
//!
//! One telemetry loop: its samples, visible window, Y range and scroll bar.
//!
//! Every mutation that moves the visible X range re-runs the autoscaler, so
//! callers never have to remember to do it.

use tracing::trace;

use super::autoscale::autoscale_y;
use super::config::GraphConfig;
use super::data::SeriesStore;
use super::viewport::{ScrollState, Viewport, ZOOM_IN, ZOOM_OUT, pixels_to_data};

/// Loop identifier. `Loop1` is channel 0 on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Loop1,
    Loop2,
}

impl ChannelId {
    pub const ALL: [ChannelId; 2] = [ChannelId::Loop1, ChannelId::Loop2];

    pub fn index(self) -> usize {
        match self {
            ChannelId::Loop1 => 0,
            ChannelId::Loop2 => 1,
        }
    }

    /// 1-based loop number used in labels and file headers.
    pub fn number(self) -> usize {
        self.index() + 1
    }

    pub fn other(self) -> Self {
        match self {
            ChannelId::Loop1 => ChannelId::Loop2,
            ChannelId::Loop2 => ChannelId::Loop1,
        }
    }
}

/// Zoom direction from a wheel notch or key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zoom {
    In,
    Out,
}

impl Zoom {
    pub fn factor(self) -> f64 {
        match self {
            Zoom::In => ZOOM_IN,
            Zoom::Out => ZOOM_OUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Channel {
    pub id: ChannelId,
    pub store: SeriesStore,
    pub viewport: Viewport,
    pub y_range: (f64, f64),
    pub scroll: ScrollState,
    config: GraphConfig,
}

impl Channel {
    pub fn new(id: ChannelId, config: GraphConfig) -> Self {
        let mut ch = Self {
            id,
            store: SeriesStore::new(),
            viewport: Viewport::new(config.width()),
            y_range: config.y_range,
            scroll: ScrollState::default(),
            config,
        };
        ch.reset();
        ch
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn sample_count(&self) -> usize {
        self.store.len()
    }

    /// Append one value. With `follow` the window jumps to the newest
    /// sample; without it the current position is kept.
    pub fn append(&mut self, value: f64, follow: bool) {
        let sample = self.store.push(value);
        self.scroll
            .set_limit(self.store.len(), self.config.window_width);
        if follow {
            let v = self.scroll.set_value(self.scroll.max);
            self.viewport.show_from(v as f64);
        }
        // following means live, and live never scrolls
        self.set_scroll_enabled(!follow);
        trace!(channel = ?self.id, index = sample.index, value, "sample appended");
        self.autoscale();
    }

    /// Drop all samples and return to the default window.
    pub fn reset(&mut self) {
        self.store.clear();
        self.viewport.reset();
        self.y_range = self.config.y_range;
        self.scroll.reset();
    }

    /// Replace the whole series, e.g. from a saved file. The Y range is the
    /// raw min/max of the loaded data, without spike trimming.
    pub fn replace<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = f64>,
    {
        self.store.replace(values);
        self.viewport.reset();
        self.scroll
            .set_limit(self.store.len(), self.config.window_width);
        self.scroll.set_value(0);
        if let Some(bounds) = self.store.value_bounds() {
            self.y_range = bounds;
        }
    }

    /// Enable or disable the scroll bar; it only makes sense once there is
    /// more history than one window.
    pub fn set_scroll_enabled(&mut self, enabled: bool) {
        self.scroll.enabled = enabled && self.store.len() > self.config.window_width;
    }

    /// Scroll-bar move: show `[v, v + window]`. Ignored while the scroll
    /// bar is disabled.
    pub fn scroll_to(&mut self, value: usize) {
        if !self.scroll.enabled {
            return;
        }
        let v = self.scroll.set_value(value);
        self.viewport.show_from(v as f64);
        self.clamp_and_autoscale();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll.value.saturating_add_signed(delta);
        self.scroll_to(target);
    }

    /// Zoom around the window centre.
    pub fn zoom(&mut self, zoom: Zoom) {
        self.viewport.zoom(zoom.factor());
        self.clamp_and_autoscale();
    }

    pub fn zoom_at(&mut self, zoom: Zoom, anchor: f64) {
        self.viewport.zoom_at(zoom.factor(), anchor);
        self.clamp_and_autoscale();
    }

    /// Drag by a pointer delta. `plot` is the rendered plot area
    /// `(width, height)` in the same units as the delta. Screen Y grows
    /// downwards, so a downward drag moves the data range up.
    pub fn pan(&mut self, dx: f64, dy: f64, plot: (f64, f64)) {
        let data_dx = pixels_to_data(dx, self.viewport.span(), plot.0);
        let data_dy = -pixels_to_data(dy, self.y_range.1 - self.y_range.0, plot.1);
        self.viewport.shift(-data_dx);
        self.y_range = (self.y_range.0 - data_dy, self.y_range.1 - data_dy);
        self.clamp_and_autoscale();
    }

    /// Middle-click / zoom reset: back to `[0, window]`.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.clamp_and_autoscale();
    }

    fn clamp_and_autoscale(&mut self) {
        self.viewport.clamp(self.store.len());
        self.autoscale();
    }

    fn autoscale(&mut self) {
        if let Some(bounds) = autoscale_y(&self.store, self.viewport.min, self.viewport.max) {
            self.y_range = bounds;
        }
    }

    /// Visible points for rendering.
    pub fn visible_points(&self) -> Vec<(f64, f64)> {
        self.store.points(self.viewport.min, self.viewport.max)
    }

    /// (min, max, last) over the visible window, `None` when empty.
    pub fn stats(&self) -> Option<(f64, f64, f64)> {
        let mut it = self
            .store
            .visible(self.viewport.min, self.viewport.max)
            .map(|s| s.value);
        let first = it.next()?;
        let (mn, mx, last) = it.fold((first, first, first), |(lo, hi, _), v| {
            (lo.min(v), hi.max(v), v)
        });
        Some((mn, mx, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> Channel {
        Channel::new(ChannelId::Loop1, GraphConfig::default())
    }

    #[test]
    fn follow_pins_right_edge_to_newest() {
        let mut ch = channel();
        for i in 0..250 {
            ch.append(i as f64, true);
        }
        assert_eq!(ch.scroll.max, 150);
        assert_eq!(ch.scroll.value, 150);
        assert_eq!((ch.viewport.min, ch.viewport.max), (150.0, 250.0));
    }

    #[test]
    fn without_follow_position_is_kept() {
        let mut ch = channel();
        for i in 0..250 {
            ch.append(i as f64, false);
        }
        assert_eq!(ch.scroll.max, 150);
        assert_eq!((ch.viewport.min, ch.viewport.max), (0.0, 100.0));
    }

    #[test]
    fn append_autoscales_visible_window() {
        let mut ch = channel();
        for v in [10.0, 10.0, 12.0, 12.0, 500.0] {
            ch.append(v, true);
        }
        assert_eq!(ch.y_range, (10.0, 12.0));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut ch = channel();
        for i in 0..300 {
            ch.append(i as f64, true);
        }
        ch.set_scroll_enabled(true);
        ch.reset();
        assert_eq!(ch.sample_count(), 0);
        assert_eq!((ch.viewport.min, ch.viewport.max), (0.0, 100.0));
        assert_eq!(ch.y_range, (0.0, 1.0));
        assert_eq!(ch.scroll, ScrollState::default());
    }

    #[test]
    fn replace_uses_raw_bounds() {
        let mut ch = channel();
        ch.replace([5.0, 5.0, 5.0, 9.0, -3.0]);
        assert_eq!(ch.sample_count(), 5);
        assert_eq!(ch.y_range, (-3.0, 9.0));
        assert_eq!((ch.viewport.min, ch.viewport.max), (0.0, 100.0));
        assert_eq!(ch.scroll.max, 0);
    }

    #[test]
    fn scroll_moves_window_and_clamps() {
        let mut ch = channel();
        for i in 0..300 {
            ch.append(i as f64, false);
        }
        ch.scroll_to(120);
        assert_eq!((ch.viewport.min, ch.viewport.max), (120.0, 220.0));
        ch.scroll_by(1000);
        assert_eq!((ch.viewport.min, ch.viewport.max), (200.0, 300.0));
        ch.scroll_by(-1000);
        assert_eq!(ch.viewport.min, 0.0);
    }

    #[test]
    fn scroll_is_ignored_while_disabled() {
        let mut ch = channel();
        for i in 0..300 {
            ch.append(i as f64, true);
        }
        assert!(!ch.scroll.enabled);
        ch.scroll_to(10);
        ch.scroll_by(-50);
        assert_eq!(ch.scroll.value, 200);
        assert_eq!((ch.viewport.min, ch.viewport.max), (200.0, 300.0));

        ch.set_scroll_enabled(true);
        ch.scroll_to(10);
        assert_eq!((ch.viewport.min, ch.viewport.max), (10.0, 110.0));
    }

    #[test]
    fn zoom_out_past_data_is_clamped() {
        let mut ch = channel();
        for i in 0..300 {
            ch.append(i as f64, false);
        }
        ch.zoom(Zoom::Out);
        // [-5, 105] shifts right to [0, 110]
        assert_eq!(ch.viewport.min, 0.0);
        assert!((ch.viewport.max - 110.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_on_short_series_collapses_to_data() {
        let mut ch = channel();
        for i in 0..40 {
            ch.append(i as f64, false);
        }
        ch.zoom(Zoom::In);
        assert_eq!((ch.viewport.min, ch.viewport.max), (0.0, 40.0));
    }

    #[test]
    fn pan_converts_cells_to_data() {
        let mut ch = channel();
        for i in 0..300 {
            ch.append((i % 7) as f64, false);
        }
        ch.scroll_to(100);
        // 50 cells over a 100-unit span on a 50-cell plot = 100 units left drag
        ch.pan(-50.0, 0.0, (50.0, 20.0));
        assert_eq!((ch.viewport.min, ch.viewport.max), (200.0, 300.0));
    }

    #[test]
    fn pan_y_sticks_when_nothing_visible() {
        let mut ch = channel();
        ch.pan(0.0, 10.0, (50.0, 10.0));
        assert_eq!(ch.y_range, (1.0, 2.0));
    }

    #[test]
    fn reset_view_returns_to_first_window() {
        let mut ch = channel();
        for i in 0..300 {
            ch.append(i as f64, true);
        }
        ch.reset_view();
        assert_eq!((ch.viewport.min, ch.viewport.max), (0.0, 100.0));
        // 0..=100 visible: 0 and 100 are single boundary values
        assert_eq!(ch.y_range, (1.0, 99.0));
    }

    #[test]
    fn scrolling_needs_more_than_one_window() {
        let mut ch = channel();
        for i in 0..100 {
            ch.append(i as f64, false);
        }
        ch.set_scroll_enabled(true);
        assert!(!ch.scroll.enabled);
        ch.append(0.0, false);
        ch.set_scroll_enabled(true);
        assert!(ch.scroll.enabled);
    }
}

//! src/graph/viewport.rs
//!
//! Visible X range of a channel and the scroll-bar model that drives it.

pub const ZOOM_IN: f64 = 0.9;
pub const ZOOM_OUT: f64 = 1.1;

/// Visible `[min, max]` plus the constant default window width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub min: f64,
    pub max: f64,
    window_width: f64,
}

impl Viewport {
    pub fn new(window_width: f64) -> Self {
        Self {
            min: 0.0,
            max: window_width,
            window_width,
        }
    }

    pub fn window_width(&self) -> f64 {
        self.window_width
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Back to `[0, window_width]`.
    pub fn reset(&mut self) {
        self.min = 0.0;
        self.max = self.window_width;
    }

    pub fn set_range(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
    }

    /// Show `[start, start + window_width]`.
    pub fn show_from(&mut self, start: f64) {
        self.set_range(start, start + self.window_width);
    }

    /// Scale the span by `factor` keeping `anchor` at the same relative
    /// position. Does not clamp.
    pub fn zoom_at(&mut self, factor: f64, anchor: f64) {
        self.min = anchor - (anchor - self.min) * factor;
        self.max = anchor + (self.max - anchor) * factor;
    }

    pub fn zoom(&mut self, factor: f64) {
        let c = self.center();
        self.zoom_at(factor, c);
    }

    /// Shift by `dx` in data units. Does not clamp.
    pub fn shift(&mut self, dx: f64) {
        self.min += dx;
        self.max += dx;
    }

    /// Keep the range inside `[0, sample_count]`.
    ///
    /// A negative left edge shifts the window right keeping its span; a right
    /// edge past the data snaps to the last sample and the left edge is
    /// re-floored at `max(0, right - window_width)`.
    pub fn clamp(&mut self, sample_count: usize) {
        let count = sample_count as f64;
        if self.min < 0.0 {
            let span = self.span();
            self.min = 0.0;
            self.max = span;
        }
        if self.max > count {
            self.max = count;
            self.min = (self.max - self.window_width).max(0.0);
        }
    }
}

/// Pixel (or terminal cell) movement converted to data units.
///
/// `extent` is the rendered plot area along the same axis.
pub fn pixels_to_data(pixels: f64, span: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return 0.0;
    }
    pixels * span / extent
}

/// Horizontal scroll bar: thumb position over `[0, max]`, page = window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub value: usize,
    pub max: usize,
    pub enabled: bool,
}

impl ScrollState {
    /// `[0, 0]`, thumb at 0, disabled.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Recompute the scroll limit for `sample_count` samples.
    pub fn set_limit(&mut self, sample_count: usize, window_width: usize) {
        self.max = sample_count.saturating_sub(window_width);
        self.value = self.value.min(self.max);
    }

    /// Move the thumb, clamped to `[0, max]`. Returns the new value.
    pub fn set_value(&mut self, value: usize) -> usize {
        self.value = value.min(self.max);
        self.value
    }
}

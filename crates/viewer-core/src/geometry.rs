//! Basic geometry shared by layout, mapping and scheduling.

use serde::{Deserialize, Serialize};

/// A width/height pair in page-native units (or pixels once scaled).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SizeF {
    pub width: f32,
    pub height: f32,
}

impl SizeF {
    pub const ZERO: SizeF = SizeF {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Multiply both dimensions by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// True when either dimension is zero, negative or not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// Length along the scroll axis.
    pub fn primary(&self, axis: ScrollAxis) -> f32 {
        match axis {
            ScrollAxis::Vertical => self.height,
            ScrollAxis::Horizontal => self.width,
        }
    }

    /// Length across the scroll axis.
    pub fn cross(&self, axis: ScrollAxis) -> f32 {
        match axis {
            ScrollAxis::Vertical => self.width,
            ScrollAxis::Horizontal => self.height,
        }
    }
}

/// Rectangle relative to a page, each coordinate in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    /// The whole page.
    pub const FULL: RectF = RectF {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };

    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Bit-exact identity, usable as a hash key.
    pub fn key(&self) -> [u32; 4] {
        [
            self.left.to_bits(),
            self.top.to_bits(),
            self.right.to_bits(),
            self.bottom.to_bits(),
        ]
    }
}

/// Direction the document strip scrolls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAxis {
    #[default]
    Vertical,
    Horizontal,
}

impl ScrollAxis {
    pub fn is_vertical(self) -> bool {
        self == ScrollAxis::Vertical
    }

    /// Split an `(x, y)` pair into `(primary, cross)` for this axis.
    pub fn split(self, x: f32, y: f32) -> (f32, f32) {
        match self {
            ScrollAxis::Vertical => (y, x),
            ScrollAxis::Horizontal => (x, y),
        }
    }

    /// Inverse of [`ScrollAxis::split`].
    pub fn join(self, primary: f32, cross: f32) -> (f32, f32) {
        match self {
            ScrollAxis::Vertical => (cross, primary),
            ScrollAxis::Horizontal => (primary, cross),
        }
    }
}

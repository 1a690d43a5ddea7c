//! Viewport and pan/zoom transform.

use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 4.0;
pub const DEFAULT_PADDING: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow::anyhow!("invalid viewport `{s}` (expected WIDTHxHEIGHT)"))?;
        let width: f64 = w.trim().parse()?;
        let height: f64 = h.trim().parse()?;
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            anyhow::bail!("viewport dimensions must be positive, got `{s}`");
        }
        Ok(Self { width, height })
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// `screen = layout * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ZoomTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    /// Scale and center `content` (width, height) inside `viewport`.
    ///
    /// Empty content maps to the identity transform.
    pub fn fit(content: (f64, f64), viewport: Viewport, padding: f64) -> Self {
        let (cw, ch) = content;
        if cw <= 0.0 || ch <= 0.0 {
            return Self::identity();
        }
        let avail_w = (viewport.width - 2.0 * padding).max(1.0);
        let avail_h = (viewport.height - 2.0 * padding).max(1.0);
        let scale = (avail_w / cw).min(avail_h / ch).clamp(MIN_SCALE, MAX_SCALE);
        Self {
            scale,
            translate_x: (viewport.width - cw * scale) / 2.0,
            translate_y: (viewport.height - ch * scale) / 2.0,
        }
    }

    pub fn pan(self, dx: f64, dy: f64) -> Self {
        Self {
            translate_x: self.translate_x + dx,
            translate_y: self.translate_y + dy,
            ..self
        }
    }

    /// Zoom by `factor` keeping the screen point `(px, py)` fixed.
    pub fn zoom_at(self, factor: f64, px: f64, py: f64) -> Self {
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let k = scale / self.scale;
        Self {
            scale,
            translate_x: px - (px - self.translate_x) * k,
            translate_y: py - (py - self.translate_y) * k,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.translate_x, y * self.scale + self.translate_y)
    }
}

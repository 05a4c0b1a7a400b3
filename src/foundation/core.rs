use crate::foundation::error::{LoopforgeError, LoopforgeResult};
use crate::foundation::math::{lerp, smoothstep};

pub use kurbo::{Point, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// Fixed vertical short-form canvas (9:16). Both dimensions are even, which
/// yuv420p MP4 output requires.
pub const LOOP_CANVAS: Canvas = Canvas {
    width: 1080,
    height: 1920,
};

/// Straight (non-premultiplied) opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex color.
    pub fn from_hex(hex: &str) -> LoopforgeResult<Self> {
        let s = hex.strip_prefix('#').unwrap_or(hex);
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LoopforgeError::validation(format!(
                "invalid hex color '{hex}' (expected #rrggbb)"
            )));
        }
        let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).unwrap_or(0);
        Ok(Self::new(byte(0), byte(2), byte(4)))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear mix between two colors, `t` clamped to `[0, 1]`.
    pub fn mix(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| lerp(f64::from(a), f64::from(b), t).round() as u8;
        Self::new(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }

    /// Uniform brightness scale, `k` clamped to `[0, 1]`.
    pub fn scale(self, k: f64) -> Self {
        let k = k.clamp(0.0, 1.0);
        let ch = |c: u8| (f64::from(c) * k).round() as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }
}

/// An owned opaque RGB frame buffer. Pixels are stored row-major as
/// `[r, g, b]` triplets; the PNG writer expands this directly.
#[derive(Clone, Debug)]
pub struct FrameBuf {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameBuf {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; (canvas.width * canvas.height * 3) as usize],
        }
    }

    pub fn fill(&mut self, color: Rgb8) {
        for px in self.data.chunks_exact_mut(3) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
        }
    }

    /// Fill with a vertical gradient from `top` to `bottom`.
    pub fn fill_vertical_gradient(&mut self, top: Rgb8, bottom: Rgb8) {
        let h = self.height.max(1);
        for y in 0..self.height {
            let t = f64::from(y) / f64::from(h - 1).max(1.0);
            let c = top.mix(bottom, t);
            let row = (y * self.width * 3) as usize;
            for px in self.data[row..row + (self.width * 3) as usize].chunks_exact_mut(3) {
                px[0] = c.r;
                px[1] = c.g;
                px[2] = c.b;
            }
        }
    }

    /// Blend `color` over the pixel at `(x, y)` with coverage `alpha`.
    /// Out-of-bounds coordinates are ignored.
    pub fn blend_px(&mut self, x: i64, y: i64, color: Rgb8, alpha: f64) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 3) as usize;
        let px = &mut self.data[idx..idx + 3];
        px[0] = lerp(f64::from(px[0]), f64::from(color.r), a).round() as u8;
        px[1] = lerp(f64::from(px[1]), f64::from(color.g), a).round() as u8;
        px[2] = lerp(f64::from(px[2]), f64::from(color.b), a).round() as u8;
    }

    /// Draw a soft-edged filled disk centered at `center` with radius `r`.
    ///
    /// Coverage falls off over roughly one pixel at the rim so motion stays
    /// smooth between frames.
    pub fn disk(&mut self, center: Point, r: f64, color: Rgb8, alpha: f64) {
        if r <= 0.0 {
            return;
        }
        let x0 = (center.x - r - 1.0).floor() as i64;
        let x1 = (center.x + r + 1.0).ceil() as i64;
        let y0 = (center.y - r - 1.0).floor() as i64;
        let y1 = (center.y + r + 1.0).ceil() as i64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                let d = (dx * dx + dy * dy).sqrt();
                let cov = 1.0 - smoothstep(r - 1.0, r + 1.0, d);
                if cov > 0.0 {
                    self.blend_px(x, y, color, alpha * cov);
                }
            }
        }
    }

    /// Draw an anti-aliased ring (annulus) of radius `r` and stroke
    /// half-width `w`.
    pub fn ring(&mut self, center: Point, r: f64, w: f64, color: Rgb8, alpha: f64) {
        if r <= 0.0 || w <= 0.0 {
            return;
        }
        let outer = r + w + 1.0;
        let x0 = (center.x - outer).floor() as i64;
        let x1 = (center.x + outer).ceil() as i64;
        let y0 = (center.y - outer).floor() as i64;
        let y1 = (center.y + outer).ceil() as i64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                let d = (dx * dx + dy * dy).sqrt();
                let cov = 1.0 - smoothstep(w - 0.5, w + 1.0, (d - r).abs());
                if cov > 0.0 {
                    self.blend_px(x, y, color, alpha * cov);
                }
            }
        }
    }
}

//! Software 2-D drawing surface
//!
//! Mirrors the small subset of a browser 2-D context the animations need:
//! clearing, rect/disc fills, bitmap text and a per-pixel read back.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use glam::DVec2;

/// Width and height of a glyph cell before scaling
pub const GLYPH_SIZE: u32 = 8;

/// Largest glyph scaling, 8192px glyphs already dwarf any window
pub const MAX_SCALE: u32 = 1024;

/// A straight (non-premultiplied) RGBA8 color
#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with a `0.0..=1.0` opacity, like css `rgba(r, g, b, a)`
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            a: (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Source-over compositing of `self` on top of `dst`
    fn over(self, dst: Rgba) -> Rgba {
        if self.a == 255 || dst.a == 0 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }

        let sa = self.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let channel =
            |s: u8, d: u8| ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round() as u8;

        Rgba {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: (out_a * 255.0).round() as u8,
        }
    }
}

/// A bitmap font: 8x8 glyph cells drawn `scale` pixels per cell pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Font {
    pub scale: u32,
}

impl Font {
    /// The closest integer scaling of the 8px glyphs to `px`
    pub fn from_px(px: f64) -> Self {
        let scale = if px.is_finite() {
            (px / GLYPH_SIZE as f64).round().clamp(1.0, MAX_SCALE as f64) as u32
        } else {
            1
        };
        Self { scale }
    }

    pub fn advance(&self) -> u32 {
        GLYPH_SIZE.saturating_mul(self.scale)
    }
}

/// The drawing capabilities the animations consume
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reset every pixel to transparent
    fn clear(&mut self);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba);

    /// Draw `text` with its left baseline at (`x`, `y`)
    fn fill_text(&mut self, text: &str, font: Font, x: f64, y: f64, color: Rgba);

    fn fill_disc(&mut self, center: DVec2, radius: f64, color: Rgba);

    /// Row-major RGBA8 bytes, 4 per pixel
    fn image_data(&self) -> &[u8];
}

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[self.index(x, y)])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        let i = self.index(x, y);
        self.pixels[i] = color.over(self.pixels[i]);
    }

    /// Clamp a half-open pixel span to `0..limit`
    fn span(start: f64, end: f64, limit: u32) -> std::ops::Range<u32> {
        if !(start.is_finite() && end.is_finite()) {
            return 0..0;
        }
        let start = start.round().clamp(0.0, limit as f64) as u32;
        let end = end.round().clamp(0.0, limit as f64) as u32;
        start..end.max(start)
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        let xs = Self::span(x, x + width, self.width);
        for py in Self::span(y, y + height, self.height) {
            for px in xs.clone() {
                self.blend(px, py, color);
            }
        }
    }

    fn fill_text(&mut self, text: &str, font: Font, x: f64, y: f64, color: Rgba) {
        let cell = font.scale as f64;
        let advance = font.advance() as f64;
        let top = y - advance;

        for (i, c) in text.chars().enumerate() {
            let left = x + i as f64 * advance;
            if left >= self.width as f64 {
                break;
            }
            let Some(glyph) = BASIC_FONTS.get(c) else {
                continue;
            };

            for (row, bits) in glyph.into_iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits >> col & 1 == 1 {
                        self.fill_rect(
                            left + col as f64 * cell,
                            top + row as f64 * cell,
                            cell,
                            cell,
                            color,
                        );
                    }
                }
            }
        }
    }

    fn fill_disc(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if !center.is_finite() || !(radius > 0.0) {
            return;
        }

        let xs = Self::span(center.x - radius, center.x + radius + 1.0, self.width);
        let ys = Self::span(center.y - radius, center.y + radius + 1.0, self.height);
        let radius_sq = radius * radius;
        for py in ys {
            for px in xs.clone() {
                let offset = DVec2::new(px as f64 + 0.5, py as f64 + 0.5) - center;
                if offset.length_squared() <= radius_sq {
                    self.blend(px, py, color);
                }
            }
        }
    }

    fn image_data(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

//! Turns a rendered string into particle seed positions

use std::{fmt, str::FromStr};

use glam::DVec2;

use crate::canvas::{Canvas, Font, Rgba, Surface};

/// A font size, either absolute or relative to the smaller surface side
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FontSize {
    Px(f64),
    Vmin(f64),
}

impl FontSize {
    pub fn to_px(self, width: u32, height: u32) -> f64 {
        match self {
            FontSize::Px(px) => px,
            FontSize::Vmin(v) => v / 100.0 * width.min(height) as f64,
        }
    }
}

impl FromStr for FontSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (number, unit): (&str, fn(f64) -> FontSize) = if let Some(v) = s.strip_suffix("vmin")
        {
            (v, FontSize::Vmin)
        } else if let Some(px) = s.strip_suffix("px") {
            (px, FontSize::Px)
        } else {
            (s, FontSize::Px)
        };

        match number.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(unit(value)),
            _ => Err(format!("invalid font size `{s}`, expected e.g. `32px` or `4vmin`")),
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSize::Px(px) => write!(f, "{px}px"),
            FontSize::Vmin(v) => write!(f, "{v}vmin"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextSampler {
    pub text: String,
    pub font: FontSize,
    /// Left baseline of the rendered text
    pub position: DVec2,
    /// Added to every lit pixel before scaling
    pub adjust: DVec2,
    pub scale: f64,
    /// Pixels with an alpha strictly above this are lit
    pub threshold: u8,
    pub fill: Rgba,
}

impl TextSampler {
    pub fn new(text: impl Into<String>, font: FontSize) -> Self {
        Self {
            text: text.into(),
            font,
            position: DVec2::new(100.0, 100.0),
            adjust: DVec2::new(5.0, 5.0),
            scale: 2.0,
            threshold: 128,
            fill: Rgba::new(173, 216, 230, 204),
        }
    }

    /// Sample on a fresh offscreen canvas of the given size
    #[cfg(test)]
    pub fn sample(&self, width: u32, height: u32) -> Vec<DVec2> {
        self.sample_on(&mut Canvas::new(width, height))
    }

    pub fn sample_on(&self, surface: &mut dyn Surface) -> Vec<DVec2> {
        let (width, height) = (surface.width(), surface.height());
        let font = Font::from_px(self.font.to_px(width, height));

        surface.clear();
        surface.fill_text(&self.text, font, self.position.x, self.position.y, self.fill);

        surface
            .image_data()
            .chunks_exact(4)
            .enumerate()
            .filter(|(_, rgba)| rgba[3] > self.threshold)
            .map(|(i, _)| {
                let x = (i % width as usize) as f64;
                let y = (i / width as usize) as f64;
                (DVec2::new(x, y) + self.adjust) * self.scale
            })
            .collect()
    }
}

use clap::ValueEnum;

use crate::canvas::Rgba;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn background(self) -> Rgba {
        match self {
            Theme::Dark => Rgba::opaque(0, 0, 0),
            Theme::Light => Rgba::opaque(255, 255, 255),
        }
    }

    /// Color of decorative glyphs drawn over the background
    pub fn foreground(self) -> Rgba {
        match self {
            Theme::Dark => Rgba::opaque(255, 255, 255),
            Theme::Light => Rgba::opaque(0, 0, 0),
        }
    }

    pub fn clear_color(self) -> wgpu::Color {
        match self {
            Theme::Dark => wgpu::Color::BLACK,
            Theme::Light => wgpu::Color::WHITE,
        }
    }
}

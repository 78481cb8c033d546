//! "Matrix rain": columns of random glyphs falling over a fading surface

use std::ops::Range;

use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    canvas::{Font, Surface},
    particle::PointerState,
    render_loop::Scene,
    theme::Theme,
};

#[derive(Clone, Debug)]
pub struct RainConfig {
    pub font_px: u32,
    pub charset: Vec<char>,
    /// Rows a drop falls per frame
    pub fall_speed: f64,
    /// Chance per frame that a drop below the bottom restarts at the top
    pub reset_chance: f64,
    /// Narrower surfaces get no rain at all
    pub min_width: u32,
    pub fade_alpha: f64,
    pub opacity: Range<f64>,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            font_px: 14,
            charset: "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789@#$%^&*()_+-=[]{}|;:,.<>?/~`"
                .chars()
                .collect(),
            fall_speed: 0.5,
            reset_chance: 0.015,
            min_width: 768,
            fade_alpha: 0.06,
            opacity: 0.03..0.15,
        }
    }
}

pub struct MatrixRain {
    config: RainConfig,
    theme: Theme,
    /// Current row of each column's drop, in glyph rows
    drops: Vec<f64>,
    width: u32,
    height: u32,
    rng: StdRng,
}

impl MatrixRain {
    pub fn new(config: RainConfig, theme: Theme) -> Self {
        Self::with_rng(config, theme, StdRng::from_entropy())
    }

    pub fn with_rng(config: RainConfig, theme: Theme, rng: StdRng) -> Self {
        Self {
            config,
            theme,
            drops: Vec::new(),
            width: 0,
            height: 0,
            rng,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.drops.is_empty()
    }

    #[cfg(test)]
    pub fn drops(&self) -> &[f64] {
        &self.drops
    }

    fn glyph(&mut self) -> Option<char> {
        if self.config.charset.is_empty() {
            return None;
        }
        let i = self.rng.gen_range(0..self.config.charset.len());
        Some(self.config.charset[i])
    }
}

impl Scene for MatrixRain {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;

        if width < self.config.min_width || self.config.font_px == 0 {
            info!("Matrix rain disabled below {}px", self.config.min_width);
            self.drops.clear();
            return;
        }

        let columns = (width / self.config.font_px) as usize;
        let rng = &mut self.rng;
        self.drops
            .resize_with(columns, || rng.gen_range(-100.0..0.0));
        info!("Matrix rain over {} columns", columns);
    }

    fn begin_frame(&mut self, surface: &mut dyn Surface) {
        if !self.is_active() {
            return;
        }

        let fade = self.theme.background().with_opacity(self.config.fade_alpha);
        surface.fill_rect(
            0.0,
            0.0,
            surface.width() as f64,
            surface.height() as f64,
            fade,
        );
    }

    fn frame(&mut self, surface: &mut dyn Surface, _pointer: &PointerState) {
        let font_px = self.config.font_px as f64;
        let font = Font::from_px(font_px);

        for i in 0..self.drops.len() {
            let x = i as f64 * font_px;
            let y = self.drops[i] * font_px;

            if let Some(glyph) = self.glyph() {
                let opacity = self.rng.gen_range(self.config.opacity.clone());
                let color = self.theme.foreground().with_opacity(opacity);
                let mut buf = [0; 4];
                surface.fill_text(glyph.encode_utf8(&mut buf), font, x, y, color);
            }

            if y > self.height as f64 && self.rng.gen_bool(self.config.reset_chance) {
                self.drops[i] = 0.0;
            }
            self.drops[i] += self.config.fall_speed;
        }
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn population(&self) -> usize {
        self.drops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    fn rain() -> MatrixRain {
        MatrixRain::with_rng(RainConfig::default(), Theme::Dark, StdRng::seed_from_u64(3))
    }

    #[test]
    fn narrow_surfaces_get_no_rain() {
        let mut rain = rain();
        rain.resize(700, 400);
        assert!(!rain.is_active());

        let mut canvas = Canvas::new(700, 400);
        rain.begin_frame(&mut canvas);
        rain.frame(&mut canvas, &PointerState::default());
        assert!(canvas.pixels().iter().all(|p| p.a == 0));
    }

    #[test]
    fn one_column_per_glyph_width() {
        let mut rain = rain();
        rain.resize(1000, 400);

        assert_eq!(rain.population(), 1000 / 14);
        assert!(rain.drops().iter().all(|d| (-100.0..0.0).contains(d)));
    }

    #[test]
    fn resize_keeps_existing_drops() {
        let mut rain = rain();
        rain.resize(1000, 400);
        let before = rain.drops().to_vec();

        rain.resize(1400, 400);
        assert_eq!(rain.population(), 100);
        assert_eq!(rain.drops()[..before.len()], before[..]);

        rain.resize(500, 400);
        assert!(!rain.is_active());
    }

    #[test]
    fn drops_fall_half_a_row_per_frame() {
        let mut rain = rain();
        rain.resize(800, 400);
        let before = rain.drops().to_vec();

        let mut canvas = Canvas::new(800, 400);
        rain.frame(&mut canvas, &PointerState::default());

        for (after, before) in rain.drops().iter().zip(before) {
            assert_eq!(*after, before + 0.5);
        }
    }

    #[test]
    fn drops_below_the_bottom_eventually_restart() {
        let mut rain = rain();
        rain.resize(800, 140);
        rain.drops.iter_mut().for_each(|d| *d = 50.0);

        let mut canvas = Canvas::new(800, 140);
        for _ in 0..2000 {
            rain.frame(&mut canvas, &PointerState::default());
        }

        assert!(rain.drops().iter().any(|d| *d < 50.0));
    }

    #[test]
    fn frame_start_fades_instead_of_clearing() {
        let mut rain = rain();
        rain.resize(800, 100);

        let mut canvas = Canvas::new(800, 100);
        rain.begin_frame(&mut canvas);
        let pixel = canvas.pixel(10, 10).unwrap();
        assert_eq!(pixel, Theme::Dark.background().with_opacity(0.06));

        rain.set_theme(Theme::Light);
        rain.begin_frame(&mut canvas);
        let faded = canvas.pixel(10, 10).unwrap();
        assert!(faded.a > pixel.a);
        assert!(faded.r > 0);
    }
}

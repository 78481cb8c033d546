use clap::{Parser, ValueEnum};

use crate::{
    particle::{ParticleStyle, PointerState},
    sampler::{FontSize, TextSampler},
    theme::Theme,
};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind {
    /// Text made of particles that flee the pointer
    Particles,
    /// Falling columns of random glyphs
    Matrix,
}

/// Decorative canvas animations: text-shaped particles and matrix rain
#[derive(Parser, Debug)]
#[command()]
pub struct Args {
    /// Text the particles are sampled from
    #[arg(default_value = "Innovating with AI")]
    pub text: String,

    #[arg(short, long, value_enum, default_value_t = SceneKind::Particles)]
    pub scene: SceneKind,

    /// Font size, in `px` or as a percentage of the smaller window side (`vmin`)
    #[arg(long, default_value = "4vmin")]
    pub font_size: FontSize,

    /// Pointer interaction radius
    #[arg(short, long, default_value_t = PointerState::DEFAULT_RADIUS)]
    pub radius: f64,

    /// Radius of a single particle
    #[arg(long, default_value_t = 1.0)]
    pub particle_size: f64,

    /// Include the scroll offset in the pointer distance
    #[arg(long)]
    pub scroll_compensation: bool,

    #[arg(short, long, value_enum, default_value_t = Theme::Dark)]
    pub theme: Theme,

    /// The framerate the animation will run at
    ///
    /// if not set the animation will run as fast as possible
    #[arg(short, long)]
    pub framerate: Option<u32>,
}

impl Args {
    pub fn sampler(&self) -> TextSampler {
        TextSampler::new(self.text.clone(), self.font_size)
    }

    pub fn particle_style(&self) -> ParticleStyle {
        ParticleStyle {
            size: self.particle_size,
            scroll_compensation: self.scroll_compensation,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_site() {
        let args = Args::parse_from(["textfield"]);

        assert_eq!(args.text, "Innovating with AI");
        assert_eq!(args.scene, SceneKind::Particles);
        assert_eq!(args.font_size, FontSize::Vmin(4.0));
        assert_eq!(args.radius, 150.0);
        assert!(!args.scroll_compensation);
        assert_eq!(args.framerate, None);
    }

    #[test]
    fn options_flow_into_the_field_config() {
        let args = Args::parse_from([
            "textfield",
            "Hello",
            "--font-size",
            "32px",
            "--particle-size",
            "2",
            "--scroll-compensation",
            "--scene",
            "matrix",
            "--theme",
            "light",
            "-f",
            "60",
        ]);

        let sampler = args.sampler();
        assert_eq!(sampler.text, "Hello");
        assert_eq!(sampler.font, FontSize::Px(32.0));

        let style = args.particle_style();
        assert_eq!(style.size, 2.0);
        assert!(style.scroll_compensation);

        assert_eq!(args.scene, SceneKind::Matrix);
        assert_eq!(args.theme, Theme::Light);
        assert_eq!(args.framerate, Some(60));
    }

    #[test]
    fn rejects_bad_font_sizes() {
        assert!(Args::try_parse_from(["textfield", "--font-size", "huge"]).is_err());
    }
}

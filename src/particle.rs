use glam::DVec2;
use log::{info, warn};
use rand::Rng;

use crate::{
    canvas::{Canvas, Rgba, Surface},
    render_loop::Scene,
    sampler::TextSampler,
};

/// Share of the offset to the origin a particle closes on every free tick
const RETURN_RATE: f64 = 1.0 / 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    /// `None` until the pointer first moves
    pub position: Option<DVec2>,
    pub radius: f64,
}

impl PointerState {
    pub const DEFAULT_RADIUS: f64 = 150.0;

    pub fn new(radius: f64) -> Self {
        Self {
            position: None,
            radius,
        }
    }

    #[cfg(test)]
    pub fn at(position: DVec2, radius: f64) -> Self {
        Self {
            position: Some(position),
            radius,
        }
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: DVec2,
    pub size: f64,
    origin: DVec2,
    density: f64,
}

impl Particle {
    pub fn new(origin: DVec2, size: f64, rng: &mut impl Rng) -> Self {
        Self {
            position: origin,
            size,
            origin,
            density: rng.gen_range(1.0..16.0),
        }
    }

    #[cfg(test)]
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    #[cfg(test)]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// The repulsion applied this tick, if the pointer is close enough to push
    fn repulsion(&self, pointer: &PointerState, scroll_offset: f64) -> Option<DVec2> {
        let delta = pointer.position? - (self.position + DVec2::new(0.0, scroll_offset));
        let distance = delta.length();

        // Coincident or non-finite distances have no direction
        if !(distance > 0.0 && distance < pointer.radius) {
            return None;
        }

        let force = (pointer.radius - distance) / pointer.radius;
        Some(delta / distance * force * self.density)
    }

    pub fn update(&mut self, pointer: &PointerState, scroll_offset: f64) {
        match self.repulsion(pointer, scroll_offset) {
            Some(push) => self.position -= push,
            None => self.position -= (self.position - self.origin) * RETURN_RATE,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ParticleStyle {
    pub size: f64,
    pub color: Rgba,
    /// Fold the page scroll into the pointer distance
    pub scroll_compensation: bool,
}

impl Default for ParticleStyle {
    fn default() -> Self {
        Self {
            size: 1.0,
            color: Rgba::opaque(255, 127, 80),
            scroll_compensation: false,
        }
    }
}

/// Particles seeded from rendered text, pushed around by the pointer
pub struct ParticleField {
    particles: Vec<Particle>,
    sampler: TextSampler,
    style: ParticleStyle,
    scroll_offset: f64,
}

impl ParticleField {
    /// An empty field, populated by the first [`ParticleField::rebuild`]
    pub fn new(sampler: TextSampler, style: ParticleStyle) -> Self {
        Self {
            particles: Vec::new(),
            sampler,
            style,
            scroll_offset: 0.0,
        }
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn rebuild(&mut self, width: u32, height: u32) {
        self.rebuild_on(&mut Canvas::new(width, height));
    }

    /// Throw away every particle and resample the text on `surface`
    pub fn rebuild_on(&mut self, surface: &mut dyn Surface) {
        let mut rng = rand::thread_rng();
        let size = self.style.size;

        self.particles = self
            .sampler
            .sample_on(surface)
            .into_iter()
            .map(|origin| Particle::new(origin, size, &mut rng))
            .collect();

        if self.is_empty() {
            warn!("No lit pixels for {:?}, the field is empty", self.sampler.text);
        }
        info!(
            "Sampled {:?} into {} particles on a {}x{} surface",
            self.sampler.text,
            self.particles.len(),
            surface.width(),
            surface.height(),
        );
    }

    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    fn effective_scroll_offset(&self) -> f64 {
        if self.style.scroll_compensation {
            self.scroll_offset
        } else {
            0.0
        }
    }

    pub fn update(&mut self, pointer: &PointerState) {
        let scroll_offset = self.effective_scroll_offset();
        for particle in &mut self.particles {
            particle.update(pointer, scroll_offset);
        }
    }

    /// Paint every particle; the caller clears the surface
    pub fn draw(&self, surface: &mut dyn Surface) {
        for particle in &self.particles {
            surface.fill_disc(particle.position, particle.size, self.style.color);
        }
    }
}

impl Scene for ParticleField {
    fn resize(&mut self, width: u32, height: u32) {
        self.rebuild(width, height);
    }

    fn frame(&mut self, surface: &mut dyn Surface, pointer: &PointerState) {
        self.update(pointer);
        self.draw(surface);
    }

    fn scroll_to(&mut self, offset: f64) {
        self.set_scroll_offset(offset);
    }

    fn population(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::sampler::{tests::BlockSurface, FontSize};

    fn field(style: ParticleStyle) -> ParticleField {
        ParticleField::new(TextSampler::new("Hi", FontSize::Px(16.0)), style)
    }

    fn displaced(origin: DVec2, position: DVec2) -> Particle {
        let mut particle = Particle::new(origin, 1.0, &mut StdRng::seed_from_u64(7));
        particle.position = position;
        particle
    }

    #[test]
    fn forty_lit_pixels_make_forty_particles() {
        let mut field = field(ParticleStyle::default());
        field.rebuild_on(&mut BlockSurface::new(200, 100, (10, 10, 8, 5)));

        assert_eq!(field.len(), 40);
        for particle in field.particles() {
            assert!((1.0..16.0).contains(&particle.density()));
            assert_eq!(particle.position, particle.origin());
        }
    }

    #[test]
    fn empty_sample_is_a_valid_field() {
        let mut field = field(ParticleStyle::default());
        field.rebuild(0, 0);
        assert!(field.is_empty());

        field.update(&PointerState::at(DVec2::ZERO, 150.0));
        let mut canvas = Canvas::new(10, 10);
        field.draw(&mut canvas);
        assert!(canvas.pixels().iter().all(|p| p.a == 0));
    }

    #[test]
    fn converges_to_origin_when_pointer_is_far() {
        let origin = DVec2::new(50.0, 50.0);
        let mut particle = displaced(origin, DVec2::new(90.0, 10.0));
        let pointer = PointerState::at(DVec2::new(1000.0, 1000.0), 150.0);

        let start = particle.position - origin;
        particle.update(&pointer, 0.0);
        assert!(((particle.position - origin) - start * 0.8).length() < 1e-9);

        for _ in 0..200 {
            particle.update(&pointer, 0.0);
        }
        assert!((particle.position - origin).length() < 1e-9);
        assert_eq!(particle.origin(), origin);
    }

    #[test]
    fn repulsion_points_away_from_pointer() {
        let pointer_at = DVec2::new(100.0, 100.0);
        let pointer = PointerState::at(pointer_at, 150.0);

        for start in [
            DVec2::new(110.0, 100.0),
            DVec2::new(40.0, 170.0),
            DVec2::new(100.0, 99.0),
            DVec2::new(-10.0, 50.0),
        ] {
            let mut particle = displaced(start, start);
            particle.update(&pointer, 0.0);

            let displacement = particle.position - start;
            assert!(displacement.length() > 0.0);
            assert!(displacement.dot(start - pointer_at) >= 0.0);
        }
    }

    #[test]
    fn repulsion_scales_with_density_and_closeness() {
        let start = DVec2::new(0.0, 0.0);
        let mut particle = displaced(start, start);
        let pointer = PointerState::at(DVec2::new(75.0, 0.0), 150.0);

        particle.update(&pointer, 0.0);
        let expected = DVec2::new(-0.5 * particle.density(), 0.0);
        assert!((particle.position - expected).length() < 1e-9);
    }

    #[test]
    fn pointer_exactly_at_radius_does_not_push() {
        let origin = DVec2::new(-10.0, 0.0);
        let mut particle = displaced(origin, DVec2::ZERO);
        let pointer = PointerState::at(DVec2::new(150.0, 0.0), 150.0);

        particle.update(&pointer, 0.0);
        assert_eq!(particle.position, DVec2::new(-2.0, 0.0));
    }

    #[test]
    fn absent_pointer_only_returns_to_origin() {
        let origin = DVec2::new(20.0, 30.0);
        let mut particle = displaced(origin, DVec2::new(25.0, 10.0));
        let mut reference = particle.position;

        for _ in 0..10 {
            particle.update(&PointerState::new(150.0), 0.0);
            reference -= (reference - origin) / 5.0;

            assert!(particle.position.is_finite());
            assert!((particle.position - reference).length() < 1e-9);
        }
    }

    #[test]
    fn coincident_pointer_does_not_produce_nan() {
        let origin = DVec2::new(10.0, 10.0);
        let mut particle = displaced(origin, DVec2::new(20.0, 10.0));
        let pointer = PointerState::at(DVec2::new(20.0, 10.0), 150.0);

        particle.update(&pointer, 0.0);
        assert!(particle.position.is_finite());
        assert_eq!(particle.position, DVec2::new(18.0, 10.0));
    }

    #[test]
    fn non_finite_pointer_is_inert() {
        let origin = DVec2::new(10.0, 10.0);
        let mut particle = displaced(origin, origin);

        particle.update(&PointerState::at(DVec2::new(f64::NAN, 3.0), 150.0), 0.0);
        assert_eq!(particle.position, origin);
    }

    #[test]
    fn scroll_offset_only_counts_when_compensating() {
        let sampler = || TextSampler::new("Hi", FontSize::Px(16.0));
        let pointer = PointerState::at(DVec2::new(15.0, 510.0), 150.0);

        for (compensate, moved) in [(false, false), (true, true)] {
            let style = ParticleStyle {
                scroll_compensation: compensate,
                ..Default::default()
            };
            let mut field = ParticleField::new(sampler(), style);
            field.rebuild_on(&mut BlockSurface::new(20, 20, (0, 0, 1, 1)));
            field.set_scroll_offset(500.0);
            field.update(&pointer);

            let particle = field.particles()[0];
            assert_eq!(particle.position != particle.origin(), moved);
        }
    }

    #[test]
    fn rebuilding_is_deterministic_in_positions() {
        let mut field = field(ParticleStyle::default());
        field.rebuild(400, 300);
        let first: Vec<DVec2> = field.particles().iter().map(Particle::origin).collect();

        field.update(&PointerState::at(DVec2::new(220.0, 180.0), 150.0));
        field.rebuild(400, 300);
        let second: Vec<DVec2> = field.particles().iter().map(|p| p.position).collect();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn resize_round_trip_restores_particle_count() {
        let mut field = ParticleField::new(
            TextSampler::new("Innovating with AI", FontSize::Vmin(4.0)),
            ParticleStyle::default(),
        );

        field.rebuild(1200, 800);
        let original = field.len();
        field.rebuild(400, 300);
        assert_ne!(field.len(), original);
        field.rebuild(1200, 800);

        assert_eq!(field.len(), original);
    }

    #[test]
    fn draw_paints_particles_without_clearing() {
        let mut field = field(ParticleStyle::default());
        field.rebuild_on(&mut BlockSurface::new(50, 50, (0, 0, 1, 1)));

        let mut canvas = Canvas::new(50, 50);
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::opaque(1, 2, 3));
        field.draw(&mut canvas);

        let origin = field.particles()[0].origin();
        assert_eq!(origin, DVec2::new(10.0, 10.0));
        assert_eq!(canvas.pixel(10, 10), Some(Rgba::opaque(255, 127, 80)));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::opaque(1, 2, 3)));
    }
}

//! The egui settings overlay drawn on top of the animation

use glam::Vec2;
use winit::event::{ElementState, MouseButton};

use crate::theme::Theme;

/// Pointer activity the overlay cares about
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Moved(Vec2),
    Button {
        position: Vec2,
        state: ElementState,
        button: MouseButton,
    },
    Left,
}

impl PointerInput {
    fn to_egui(self) -> Option<egui::Event> {
        let pos = |p: Vec2| egui::Pos2::new(p.x, p.y);

        match self {
            PointerInput::Moved(position) => Some(egui::Event::PointerMoved(pos(position))),
            PointerInput::Button {
                position,
                state,
                button,
            } => {
                let button = match button {
                    MouseButton::Left => egui::PointerButton::Primary,
                    MouseButton::Right => egui::PointerButton::Secondary,
                    MouseButton::Middle => egui::PointerButton::Middle,
                    _ => return None,
                };
                Some(egui::Event::PointerButton {
                    pos: pos(position),
                    button,
                    pressed: state == ElementState::Pressed,
                    modifiers: egui::Modifiers::default(),
                })
            }
            PointerInput::Left => Some(egui::Event::PointerGone),
        }
    }
}

/// Read-only numbers shown in the settings window
#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub framerate: f32,
    pub width: u32,
    pub height: u32,
    pub population_label: &'static str,
    pub population: usize,
    pub frames: u64,
}

/// The editable state behind the settings window
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub paused: bool,
    pub radius: f64,
    pub theme: Theme,
}

impl Settings {
    pub const MAX_RADIUS: f64 = 500.0;

    fn show(&mut self, ctx: &egui::Context, stats: &Stats) {
        egui::Window::new("Settings")
            .default_width(160.0)
            .show(ctx, |ui| {
                ui.checkbox(&mut self.paused, "Paused [Space]");
                ui.label(format!("FPS {:.1}", stats.framerate));
                ui.label(format!("Size {}x{}", stats.width, stats.height));
                ui.label(format!("{} {}", stats.population_label, stats.population));
                ui.label(format!("Frames {}", stats.frames));

                ui.separator();
                ui.add(
                    egui::Slider::new(&mut self.radius, 0.0..=Self::MAX_RADIUS)
                        .text("Pointer radius"),
                );
                if ui.button(format!("Theme {:?} [t]", self.theme)).clicked() {
                    self.theme = self.theme.toggle();
                }
            });
    }
}

pub struct Overlay {
    ctx: egui::Context,
    raw_input: egui::RawInput,

    renderer: egui_wgpu::Renderer,
    clipped_shapes: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, swapchain_format: wgpu::TextureFormat) -> Self {
        Self {
            ctx: egui::Context::default(),
            raw_input: egui::RawInput::default(),

            renderer: egui_wgpu::Renderer::new(device, swapchain_format, None, 1),
            clipped_shapes: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.raw_input.screen_rect = Some(screen_rect(width, height));
    }

    /// Whether the last frame's window sits under the pointer
    pub fn wants_pointer(&self) -> bool {
        self.ctx.wants_pointer_input() || self.ctx.is_pointer_over_area()
    }

    pub fn pointer(&mut self, input: PointerInput) {
        self.raw_input.events.extend(input.to_egui());
    }

    /// Lay out the settings window, `settings` picks up whatever the user changed
    pub fn show(&mut self, settings: &mut Settings, stats: &Stats, delta_time: f32) {
        let mut raw_input = std::mem::take(&mut self.raw_input);
        raw_input.predicted_dt = delta_time;
        // Keep the screen size for the next frame
        self.raw_input.screen_rect = raw_input.screen_rect;

        let output = self.ctx.run(raw_input, |ctx| settings.show(ctx, stats));
        self.clipped_shapes = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.textures_delta = output.textures_delta;
    }

    /// Upload this frame's buffers and textures, before the render pass opens
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let screen = self.screen_descriptor();
        self.renderer
            .update_buffers(device, queue, encoder, &self.clipped_shapes, &screen);

        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    pub fn render<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        let screen = self.screen_descriptor();
        self.renderer.render(rpass, &self.clipped_shapes, &screen);
    }

    fn screen_descriptor(&self) -> egui_wgpu::ScreenDescriptor {
        let rect = self.ctx.screen_rect();
        egui_wgpu::ScreenDescriptor {
            size_in_pixels: [rect.width() as u32, rect.height() as u32],
            pixels_per_point: self.ctx.pixels_per_point(),
        }
    }
}

fn screen_rect(width: u32, height: u32) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::Vec2::new(width as f32, height as f32),
    )
}

mod canvas;
mod cli;
mod framepace;
mod gpu;
mod gui;
mod matrix;
mod particle;
mod present;
mod render_loop;
mod sampler;
mod theme;

use std::sync::Arc;

use clap::Parser;
use cli::SceneKind;
use framepace::{frame_budget, Framepacer};
use glam::{DVec2, Vec2};
use gpu::GpuContext;
use gui::{Overlay, PointerInput, Settings, Stats};
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    matrix::{MatrixRain, RainConfig},
    particle::ParticleField,
    present::PresentModule,
    render_loop::{LoopEvent, RenderLoop, Scene},
    theme::Theme,
};

/// Pixels scrolled per wheel line
const LINE_HEIGHT: f64 = 40.0;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = cli::Args::parse();

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app_state = AppState {
        tokio_rt: tokio::runtime::Runtime::new()?,
        gfx: None,
        framepace: Framepacer::new(),

        mouse_position: Vec2::ZERO,
        scroll_offset: 0.0,

        theme: args.theme,
        is_paused: false,
        step: false,
        framerate: args.framerate,
        args,
    };

    event_loop.run_app(&mut app_state)?;
    Ok(())
}

struct GfxState {
    window: Arc<Window>,
    gpu: GpuContext<'static>,
    overlay: Overlay,
    present: PresentModule,

    render_loop: RenderLoop,
}

struct AppState {
    tokio_rt: tokio::runtime::Runtime,
    args: cli::Args,
    gfx: Option<GfxState>,
    framepace: Framepacer,

    mouse_position: Vec2,
    scroll_offset: f64,

    theme: Theme,
    is_paused: bool,
    step: bool,
    framerate: Option<u32>,
}

impl AppState {
    fn build_scene(&self) -> Box<dyn Scene> {
        match self.args.scene {
            SceneKind::Particles => Box::new(ParticleField::new(
                self.args.sampler(),
                self.args.particle_style(),
            )),
            SceneKind::Matrix => Box::new(MatrixRain::new(RainConfig::default(), self.theme)),
        }
    }

    fn create_gfx(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<GfxState> {
        let window = Arc::new(
            event_loop.create_window(Window::default_attributes().with_title("textfield"))?,
        );
        let window_size = window.inner_size();

        let gpu = self.tokio_rt.block_on(GpuContext::new(window.clone()))?;
        let present = PresentModule::new(&gpu.device, gpu.config.format);
        let mut overlay = Overlay::new(&gpu.device, gpu.config.format);
        overlay.resize(window_size.width, window_size.height);

        let render_loop = RenderLoop::new(
            self.build_scene(),
            window_size.width,
            window_size.height,
            self.args.radius,
        );

        Ok(GfxState {
            window,
            gpu,
            overlay,
            present,

            render_loop,
        })
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }

        match self.create_gfx(event_loop) {
            Ok(gfx) => self.gfx = Some(gfx),
            Err(err) => {
                error!("Couldn't set up a drawing surface: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                gfx.gpu.resize(new_size.width, new_size.height);
                gfx.overlay.resize(new_size.width, new_size.height);
                gfx.render_loop.dispatch(LoopEvent::Resized {
                    width: new_size.width,
                    height: new_size.height,
                });
            }
            WindowEvent::Occluded(occluded) => {
                gfx.render_loop
                    .dispatch(LoopEvent::VisibilityChanged(!occluded));
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Space) => {
                        self.is_paused = !self.is_paused;
                    }
                    PhysicalKey::Code(KeyCode::KeyN) => {
                        self.step = true;
                    }
                    PhysicalKey::Code(KeyCode::KeyT) => {
                        self.theme = self.theme.toggle();
                        gfx.render_loop.dispatch(LoopEvent::ThemeChanged(self.theme));
                    }
                    PhysicalKey::Code(KeyCode::F11) => {
                        if gfx.window.fullscreen().is_none() {
                            gfx.window
                                .set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
                        } else {
                            gfx.window.set_fullscreen(None);
                        }
                    }
                    _ => (),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if gfx.overlay.wants_pointer() {
                    return;
                }

                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64 * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(pos) => pos.y,
                };
                self.scroll_offset = (self.scroll_offset - delta).max(0.0);
                gfx.render_loop
                    .dispatch(LoopEvent::Scrolled(self.scroll_offset));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                gfx.overlay.pointer(PointerInput::Button {
                    position: self.mouse_position,
                    state,
                    button,
                });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
                gfx.overlay.pointer(PointerInput::Moved(self.mouse_position));
                gfx.render_loop
                    .dispatch(LoopEvent::PointerMoved(DVec2::new(position.x, position.y)));
            }
            WindowEvent::CursorLeft { .. } => {
                gfx.overlay.pointer(PointerInput::Left);
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(GfxState {
            window,
            gpu,
            overlay,
            present,
            render_loop,
        }) = self.gfx.as_mut()
        else {
            return;
        };

        self.framepace.begin_frame();

        if !self.is_paused || self.step {
            render_loop.tick();
            self.step = false;
        }

        // Nothing to draw until the window is visible again
        if !render_loop.is_running() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                gpu.reconfigure_surface();
                return;
            }
            Err(err) => {
                warn!("Skipping frame: {err}");
                return;
            }
        };

        present.upload(&gpu.device, &gpu.queue, render_loop.canvas());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        let mut settings = Settings {
            paused: self.is_paused,
            radius: render_loop.pointer_mut().radius,
            theme: self.theme,
        };
        let size = window.inner_size();
        let stats = Stats {
            framerate: self.framepace.framerate(),
            width: size.width,
            height: size.height,
            population_label: match self.args.scene {
                SceneKind::Particles => "Particles",
                SceneKind::Matrix => "Columns",
            },
            population: render_loop.scene().population(),
            frames: render_loop.frames(),
        };
        overlay.show(&mut settings, &stats, self.framepace.frametime());

        self.is_paused = settings.paused;
        render_loop.pointer_mut().radius = settings.radius;
        if settings.theme != self.theme {
            self.theme = settings.theme;
            info!("Switched to the {:?} theme", self.theme);
            render_loop.dispatch(LoopEvent::ThemeChanged(self.theme));
        }

        overlay.prepare(&gpu.device, &gpu.queue, &mut encoder);

        // Render
        {
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());

            let mut rpass = present.begin_pass(&mut encoder, &view, self.theme.clear_color());
            overlay.render(&mut rpass);
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();

        self.framepace.end_frame(frame_budget(self.framerate));
    }
}

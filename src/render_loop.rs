//! Frame scheduling for a single animated scene
//!
//! Host events are funneled through [`RenderLoop::dispatch`] and handled
//! synchronously, so a resize always finishes rebuilding before the next
//! [`RenderLoop::tick`], and hiding the host drops the pending frame at once.

use glam::DVec2;
use log::{debug, info};

use crate::{
    canvas::{Canvas, Surface},
    particle::PointerState,
    theme::Theme,
};

/// Something the render loop can animate
pub trait Scene {
    /// Rebuild all state for a surface of the given size
    fn resize(&mut self, width: u32, height: u32);

    fn begin_frame(&mut self, surface: &mut dyn Surface) {
        surface.clear();
    }

    fn frame(&mut self, surface: &mut dyn Surface, pointer: &PointerState);

    fn scroll_to(&mut self, _offset: f64) {}

    fn set_theme(&mut self, _theme: Theme) {}

    /// Number of animated elements, for display
    fn population(&self) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoopEvent {
    PointerMoved(DVec2),
    Scrolled(f64),
    Resized { width: u32, height: u32 },
    VisibilityChanged(bool),
    ThemeChanged(Theme),
}

/// A pending request for the next frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequest(u64);

pub struct RenderLoop {
    scene: Box<dyn Scene>,
    canvas: Canvas,
    pointer: PointerState,

    pending: Option<FrameRequest>,
    next_request: u64,
    frames: u64,
}

impl RenderLoop {
    pub fn new(mut scene: Box<dyn Scene>, width: u32, height: u32, pointer_radius: f64) -> Self {
        scene.resize(width, height);

        let mut render_loop = Self {
            scene,
            canvas: Canvas::new(width, height),
            pointer: PointerState::new(pointer_radius),

            pending: None,
            next_request: 0,
            frames: 0,
        };
        render_loop.request_frame();
        render_loop
    }

    pub fn dispatch(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::PointerMoved(position) => self.pointer.position = Some(position),
            LoopEvent::Scrolled(offset) => self.scene.scroll_to(offset),
            LoopEvent::Resized { width, height } => {
                info!("Rebuilding scene for a {}x{} surface", width, height);
                self.canvas = Canvas::new(width, height);
                self.scene.resize(width, height);
            }
            LoopEvent::VisibilityChanged(true) => {
                debug!("Host visible, resuming");
                if self.pending.is_none() {
                    self.request_frame();
                }
            }
            LoopEvent::VisibilityChanged(false) => {
                debug!("Host hidden, cancelling {:?}", self.pending);
                self.pending = None;
            }
            LoopEvent::ThemeChanged(theme) => {
                debug!("Theme changed to {:?}", theme);
                self.scene.set_theme(theme);
            }
        }
    }

    /// Draw one frame if one is pending, returns whether the canvas changed
    pub fn tick(&mut self) -> bool {
        if self.pending.take().is_none() {
            return false;
        }

        self.scene.begin_frame(&mut self.canvas);
        self.scene.frame(&mut self.canvas, &self.pointer);
        self.frames += 1;

        self.request_frame();
        true
    }

    fn request_frame(&mut self) {
        self.pending = Some(FrameRequest(self.next_request));
        self.next_request += 1;
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    pub fn pending_request(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    pub fn pointer_mut(&mut self) -> &mut PointerState {
        &mut self.pointer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

use std::num::NonZeroU32;
use std::rc::Rc;

use gl::types::GLsizei;

use glutin::context::PossiblyCurrentContext;
use glutin::surface::{GlSurface, Surface, WindowSurface};

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::context::GlWindow;
use crate::gl_api::GlApi;
use crate::render::Scene;
use crate::CLEAR_COLOR;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoopState {
    Running,
    Closing,
}

impl LoopState {
    /// Escape is the only key with a meaning; everything else is ignored.
    pub(crate) fn process_key(&mut self, key: KeyCode, state: ElementState) {
        if key == KeyCode::Escape && state == ElementState::Pressed {
            self.request_close();
        }
    }

    pub(crate) fn request_close(&mut self) {
        *self = LoopState::Closing;
    }

    pub(crate) fn should_close(self) -> bool {
        self == LoopState::Closing
    }
}

/// Maps the viewport onto the whole framebuffer after a resize.
pub(crate) fn framebuffer_resized(gl: &dyn GlApi, width: u32, height: u32) {
    gl.viewport(0, 0, width as GLsizei, height as GLsizei);
}

pub(crate) struct App {
    // Field order is drop order: GL objects go while the context is alive.
    scene: Option<Scene>,
    gl: Rc<dyn GlApi>,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
    state: LoopState,
}

impl App {
    pub(crate) fn new(gl_window: GlWindow) -> Self {
        let GlWindow {
            window,
            gl_surface,
            gl_context,
            gl,
        } = gl_window;

        let scene = Scene::new(&gl, CLEAR_COLOR);

        Self {
            scene: Some(scene),
            gl,
            gl_surface,
            gl_context,
            window,
            state: LoopState::Running,
        }
    }

    fn resize(&self, width: u32, height: u32) {
        // A minimized window reports zero; the surface can't shrink to that.
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.gl_surface.resize(&self.gl_context, w, h);
        }

        framebuffer_resized(&*self.gl, width, height);
        log::debug!("viewport resized to {width}x{height}");
    }

    fn redraw(&mut self) {
        if let Some(scene) = &self.scene {
            scene.render_frame();
        }

        self.window.pre_present_notify();
        if let Err(err) = self.gl_surface.swap_buffers(&self.gl_context) {
            log::error!("failed to present frame: {err}");
            self.state.request_close();
            return;
        }

        self.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        self.window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.state.request_close(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => self.state.process_key(key, state),
            WindowEvent::Resized(PhysicalSize { width, height }) => self.resize(width, height),
            WindowEvent::RedrawRequested if !self.state.should_close() => self.redraw(),
            _ => {}
        }

        if self.state.should_close() {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(scene) = self.scene.take() {
            log::info!("releasing GPU objects");
            drop(scene);
        }
    }
}

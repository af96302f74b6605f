use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};

use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::{GlDisplay, NotCurrentGlContext};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};

use glutin_winit::GlWindow as _;

use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::raw_window_handle::HasWindowHandle;
use winit::window::Window;

use crate::gl_api::{self, GlApi};
use crate::{GL_VERSION, HEIGHT, TITLE, WIDTH};

/// A window with a current GL context and loaded function pointers.
pub(crate) struct GlWindow {
    pub window: Window,
    pub gl_surface: Surface<WindowSurface>,
    pub gl_context: PossiblyCurrentContext,
    pub gl: Rc<dyn GlApi>,
}

pub(crate) fn create_gl_window(event_loop: &EventLoop<()>) -> Result<GlWindow> {
    let window_attribs = Window::default_attributes()
        .with_title(TITLE)
        .with_inner_size(PhysicalSize { width: WIDTH, height: HEIGHT })
        .with_resizable(true);
    let gl_config_template_builder = ConfigTemplateBuilder::new();

    let (window, gl_config) = glutin_winit::DisplayBuilder::new()
        .with_window_attributes(Some(window_attribs))
        .build(event_loop, gl_config_template_builder, |mut configs| {
            configs
                .next()
                .expect("glutin yields at least one config or fails the build")
        })
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = window.context("failed to create window")?;

    log::info!(
        "created {}x{} window with a {}-sample GL config",
        WIDTH,
        HEIGHT,
        gl_config.num_samples()
    );

    let (major, minor) = GL_VERSION;
    let context_attribs = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
        .with_profile(GlProfile::Core)
        .build(window.window_handle().ok().map(|wh| wh.as_raw()));
    let gl_display = gl_config.display();

    let not_current = unsafe { gl_display.create_context(&gl_config, &context_attribs) }
        .with_context(|| format!("failed to create OpenGL {major}.{minor} core context"))?;

    let surface_attribs = window
        .build_surface_attributes(Default::default())
        .context("failed to describe window surface")?;
    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attribs) }
        .context("failed to create window surface")?;

    let gl_context = not_current
        .make_current(&gl_surface)
        .context("failed to make GL context current")?;

    if let Err(err) = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN)) {
        log::warn!("vsync unavailable: {err}");
    }

    // The context was made current on this thread just above.
    let gl = unsafe { gl_api::load(|symbol| gl_display.get_proc_address(symbol)) }?;

    Ok(GlWindow {
        window,
        gl_surface,
        gl_context,
        gl: Rc::new(gl),
    })
}

use std::process;

use anyhow::{Context, Result};

use winit::event_loop::{ControlFlow, EventLoop};

const TITLE: &str = "LearnOpenGL";
const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const GL_VERSION: (u8, u8) = (3, 3); // Core profile.
const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];

mod app;
mod context;
mod geometry;
mod gl_api;
mod logging;
mod program;
mod render;
mod shaders;
mod utils;

use app::App;

fn run() -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let gl_window = context::create_gl_window(&event_loop)?;
    let mut app = App::new(gl_window);

    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;

    log::info!("window closed");

    Ok(())
}

fn main() {
    logging::init_logging();

    if let Err(err) = run() {
        log::error!("{err:#}");
        process::exit(-1);
    }
}

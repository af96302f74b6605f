use std::rc::Rc;

use gl::types::GLfloat;

use crate::geometry::{Mesh, VERTICES};
use crate::gl_api::GlApi;
use crate::program::ShaderProgram;
use crate::shaders::{FRAGMENT_SHADER_SRC, VERTEX_SHADER_SRC};

/// Everything drawn each frame. Created once before the loop, dropped once
/// after it.
pub(crate) struct Scene {
    // Drop order: mesh objects first, then the program.
    mesh: Mesh,
    program: ShaderProgram,
    gl: Rc<dyn GlApi>,

    /// Background color.
    clear_color: [GLfloat; 4],
}

impl Scene {
    pub(crate) fn new(gl: &Rc<dyn GlApi>, clear_color: [GLfloat; 4]) -> Self {
        let program = ShaderProgram::build(gl, &VERTEX_SHADER_SRC, &FRAGMENT_SHADER_SRC);
        if !program.is_linked() {
            log::warn!("continuing with an unlinked program; frames will show only the background");
        }

        let mesh = Mesh::upload(gl, &VERTICES);

        Self {
            mesh,
            program,
            gl: Rc::clone(gl),
            clear_color,
        }
    }

    pub(crate) fn render_frame(&self) {
        self.gl.clear_color(self.clear_color);
        self.gl.clear(gl::COLOR_BUFFER_BIT);

        self.program.bind();
        self.mesh.draw();
    }
}

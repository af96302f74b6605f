use std::ffi::CStr;
use std::rc::Rc;

use gl::types::GLuint;

use crate::gl_api::{GlApi, ShaderStage};
use crate::utils;

/// A compiled (or failed) shader stage. The GL name is deleted on drop.
pub(crate) struct Shader {
    gl: Rc<dyn GlApi>,
    id: GLuint,
    stage: ShaderStage,
    log: Option<String>,
}

impl Shader {
    /// Compiles `source` for `stage`. A compile error is logged and kept in
    /// [`Shader::log`]; it never aborts.
    pub(crate) fn compile(gl: Rc<dyn GlApi>, stage: ShaderStage, source: &CStr) -> Self {
        let id = gl.create_shader(stage);

        gl.shader_source(id, source);
        gl.compile_shader(id);

        let log = utils::ensure_shader_compilation(&*gl, id).err();
        if let Some(log) = &log {
            log::error!("{stage} shader compilation failed:\n{log}");
        }

        Self { gl, id, stage, log }
    }

    pub(crate) fn id(&self) -> GLuint {
        self.id
    }

    pub(crate) fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[cfg(test)]
    pub(crate) fn is_compiled(&self) -> bool {
        self.log.is_none()
    }

    #[cfg(test)]
    pub(crate) fn log(&self) -> Option<&str> {
        self.log.as_deref()
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

/// A linked program. Link failures leave an unusable program behind, which
/// still binds and draws (to nothing) without faulting.
pub(crate) struct ShaderProgram {
    gl: Rc<dyn GlApi>,
    id: GLuint,
    log: Option<String>,
}

impl ShaderProgram {
    pub(crate) fn build(gl: &Rc<dyn GlApi>, vertex_src: &CStr, fragment_src: &CStr) -> Self {
        let vertex = Shader::compile(Rc::clone(gl), ShaderStage::Vertex, vertex_src);
        let fragment = Shader::compile(Rc::clone(gl), ShaderStage::Fragment, fragment_src);

        Self::link(Rc::clone(gl), [vertex, fragment])
    }

    /// Links `stages` into a new program and releases them afterwards, whether
    /// linking succeeded or not.
    pub(crate) fn link(gl: Rc<dyn GlApi>, stages: [Shader; 2]) -> Self {
        let id = gl.create_program();

        for shader in &stages {
            gl.attach_shader(id, shader.id());
        }
        gl.link_program(id);

        let log = utils::ensure_shader_linking(&*gl, id).err();
        match &log {
            Some(log) => log::error!("shader program linking failed:\n{log}"),
            None => log::debug!(
                "linked program {id} from {} and {} stages",
                stages[0].stage(),
                stages[1].stage()
            ),
        }

        drop(stages);

        Self { gl, id, log }
    }

    pub(crate) fn is_linked(&self) -> bool {
        self.log.is_none()
    }

    #[cfg(test)]
    pub(crate) fn log(&self) -> Option<&str> {
        self.log.as_deref()
    }

    pub(crate) fn bind(&self) {
        self.gl.use_program(self.id);
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}

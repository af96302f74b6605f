//! The slice of OpenGL this program talks to.
//!
//! Everything above this module goes through [`GlApi`], so shader, geometry and
//! frame code can run against [`fake::RecordingGl`] in tests.

use std::ffi::{c_void, CStr, CString};
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use anyhow::{ensure, Result};
use gl::types::{GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLsizeiptr, GLuint};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Safe front for the GL entry points used by the renderer.
///
/// Info log methods follow GL semantics: at most `log.len() - 1` bytes are
/// written followed by a NUL, and the returned length excludes the NUL.
pub(crate) trait GlApi {
    fn create_shader(&self, stage: ShaderStage) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &CStr);
    fn compile_shader(&self, shader: GLuint);
    fn shader_compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint, log: &mut [u8]) -> usize;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn program_link_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint, log: &mut [u8]) -> usize;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);

    fn gen_vertex_array(&self) -> GLuint;
    fn bind_vertex_array(&self, vao: GLuint);
    fn delete_vertex_array(&self, vao: GLuint);

    fn gen_buffer(&self) -> GLuint;
    fn bind_buffer(&self, target: GLenum, buffer: GLuint);
    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum);
    fn delete_buffer(&self, buffer: GLuint);

    /// Declares a non-normalized float attribute of the bound array buffer.
    fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, stride: GLsizei, offset: usize);
    fn enable_vertex_attrib_array(&self, index: GLuint);

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn clear_color(&self, color: [GLfloat; 4]);
    fn clear(&self, mask: GLbitfield);
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);
}

/// Function pointers loaded by [`load`] for the current context.
///
/// Not `Send`: the context it was loaded for is current on one thread only.
pub(crate) struct LoadedGl {
    _not_send: PhantomData<*const ()>,
}

/// Loads GL function pointers through `loader` and checks every entry point
/// [`GlApi`] needs.
///
/// # Safety
///
/// The context `loader` resolves symbols for must be current on the calling
/// thread, and stay current for as long as the returned value is used.
pub(crate) unsafe fn load(loader: impl Fn(&CStr) -> *const c_void) -> Result<LoadedGl> {
    gl::load_with(|symbol| match CString::new(symbol) {
        Ok(symbol) => loader(symbol.as_c_str()),
        Err(_) => ptr::null(),
    });

    let entry_points = [
        ("glCreateShader", gl::CreateShader::is_loaded()),
        ("glShaderSource", gl::ShaderSource::is_loaded()),
        ("glCompileShader", gl::CompileShader::is_loaded()),
        ("glGetShaderiv", gl::GetShaderiv::is_loaded()),
        ("glGetShaderInfoLog", gl::GetShaderInfoLog::is_loaded()),
        ("glDeleteShader", gl::DeleteShader::is_loaded()),
        ("glCreateProgram", gl::CreateProgram::is_loaded()),
        ("glAttachShader", gl::AttachShader::is_loaded()),
        ("glLinkProgram", gl::LinkProgram::is_loaded()),
        ("glGetProgramiv", gl::GetProgramiv::is_loaded()),
        ("glGetProgramInfoLog", gl::GetProgramInfoLog::is_loaded()),
        ("glUseProgram", gl::UseProgram::is_loaded()),
        ("glDeleteProgram", gl::DeleteProgram::is_loaded()),
        ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
        ("glBindVertexArray", gl::BindVertexArray::is_loaded()),
        ("glDeleteVertexArrays", gl::DeleteVertexArrays::is_loaded()),
        ("glGenBuffers", gl::GenBuffers::is_loaded()),
        ("glBindBuffer", gl::BindBuffer::is_loaded()),
        ("glBufferData", gl::BufferData::is_loaded()),
        ("glDeleteBuffers", gl::DeleteBuffers::is_loaded()),
        ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded()),
        ("glEnableVertexAttribArray", gl::EnableVertexAttribArray::is_loaded()),
        ("glViewport", gl::Viewport::is_loaded()),
        ("glClearColor", gl::ClearColor::is_loaded()),
        ("glClear", gl::Clear::is_loaded()),
        ("glDrawArrays", gl::DrawArrays::is_loaded()),
    ];

    let missing: Vec<&str> = entry_points
        .iter()
        .filter(|(_, loaded)| !loaded)
        .map(|(name, _)| *name)
        .collect();

    ensure!(
        missing.is_empty(),
        "failed to load OpenGL functions: {}",
        missing.join(", ")
    );

    log::debug!("loaded {} OpenGL entry points", entry_points.len());

    Ok(LoadedGl {
        _not_send: PhantomData,
    })
}

// All calls below rely on the invariant established by `load`: the pointers
// are resolved and their context is current on this thread.
impl GlApi for LoadedGl {
    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        unsafe { gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null()) }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        let mut success = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success) };
        success != 0
    }

    fn shader_info_log(&self, shader: GLuint, log: &mut [u8]) -> usize {
        let mut log_length = 0;

        unsafe {
            gl::GetShaderInfoLog(
                shader,
                log.len() as GLsizei,
                &mut log_length,
                log.as_mut_ptr() as *mut _,
            );
        }

        log_length.max(0) as usize
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success) };
        success != 0
    }

    fn program_info_log(&self, program: GLuint, log: &mut [u8]) -> usize {
        let mut log_length = 0;

        unsafe {
            gl::GetProgramInfoLog(
                program,
                log.len() as GLsizei,
                &mut log_length,
                log.as_mut_ptr() as *mut _,
            );
        }

        log_length.max(0) as usize
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &vao) }
    }

    fn gen_buffer(&self) -> GLuint {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        unsafe {
            gl::BufferData(
                target,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const _,
                usage,
            )
        }
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, stride: GLsizei, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const _,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn clear_color(&self, color: [GLfloat; 4]) {
        unsafe { gl::ClearColor(color[0], color[1], color[2], color[3]) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! A GL stand-in that records calls and mimics driver compile/link checks.

    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum GlCall {
        CreateShader(GLuint, ShaderStage),
        ShaderSource(GLuint),
        CompileShader(GLuint),
        DeleteShader(GLuint),
        CreateProgram(GLuint),
        AttachShader { program: GLuint, shader: GLuint },
        LinkProgram(GLuint),
        UseProgram(GLuint),
        DeleteProgram(GLuint),
        GenVertexArray(GLuint),
        BindVertexArray(GLuint),
        DeleteVertexArray(GLuint),
        GenBuffer(GLuint),
        BindBuffer { target: GLenum, buffer: GLuint },
        BufferData { target: GLenum, data: Vec<u8>, usage: GLenum },
        DeleteBuffer(GLuint),
        VertexAttribPointer { index: GLuint, components: GLint, stride: GLsizei, offset: usize },
        EnableVertexAttribArray(GLuint),
        Viewport { x: GLint, y: GLint, width: GLsizei, height: GLsizei },
        ClearColor([GLfloat; 4]),
        Clear(GLbitfield),
        DrawArrays { mode: GLenum, first: GLint, count: GLsizei },
    }

    struct FakeShader {
        stage: ShaderStage,
        source: String,
        compiled: bool,
        log: String,
    }

    #[derive(Default)]
    struct FakeProgram {
        attached: Vec<GLuint>,
        linked: bool,
        log: String,
    }

    /// Sources without a `main` entry point fail to compile. Programs link only
    /// with exactly one compiled vertex and one compiled fragment stage.
    #[derive(Default)]
    pub(crate) struct RecordingGl {
        calls: RefCell<Vec<GlCall>>,
        last_name: Cell<GLuint>,
        shaders: RefCell<HashMap<GLuint, FakeShader>>,
        programs: RefCell<HashMap<GLuint, FakeProgram>>,
        compile_log: RefCell<Option<String>>,
    }

    impl RecordingGl {
        /// Replaces the log reported for every failed compilation.
        pub(crate) fn with_compile_log(self, log: impl Into<String>) -> Self {
            *self.compile_log.borrow_mut() = Some(log.into());
            self
        }

        pub(crate) fn calls(&self) -> Vec<GlCall> {
            self.calls.borrow().clone()
        }

        pub(crate) fn clear_calls(&self) {
            self.calls.borrow_mut().clear();
        }

        fn record(&self, call: GlCall) {
            self.calls.borrow_mut().push(call);
        }

        fn next_name(&self) -> GLuint {
            let name = self.last_name.get() + 1;
            self.last_name.set(name);
            name
        }
    }

    fn copy_log(src: &str, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return 0;
        }

        let len = src.len().min(dst.len() - 1);
        dst[..len].copy_from_slice(&src.as_bytes()[..len]);
        dst[len] = 0;
        len
    }

    impl GlApi for RecordingGl {
        fn create_shader(&self, stage: ShaderStage) -> GLuint {
            let name = self.next_name();
            self.shaders.borrow_mut().insert(
                name,
                FakeShader {
                    stage,
                    source: String::new(),
                    compiled: false,
                    log: String::new(),
                },
            );
            self.record(GlCall::CreateShader(name, stage));
            name
        }

        fn shader_source(&self, shader: GLuint, source: &CStr) {
            if let Some(fake) = self.shaders.borrow_mut().get_mut(&shader) {
                fake.source = source.to_string_lossy().into_owned();
            }
            self.record(GlCall::ShaderSource(shader));
        }

        fn compile_shader(&self, shader: GLuint) {
            if let Some(fake) = self.shaders.borrow_mut().get_mut(&shader) {
                fake.compiled = fake.source.contains("void main()");
                if !fake.compiled {
                    fake.log = self.compile_log.borrow().clone().unwrap_or_else(|| {
                        format!("0:1(1): error: {} shader has no entry point", fake.stage)
                    });
                }
            }
            self.record(GlCall::CompileShader(shader));
        }

        fn shader_compile_status(&self, shader: GLuint) -> bool {
            self.shaders
                .borrow()
                .get(&shader)
                .map_or(false, |fake| fake.compiled)
        }

        fn shader_info_log(&self, shader: GLuint, log: &mut [u8]) -> usize {
            self.shaders
                .borrow()
                .get(&shader)
                .map_or(0, |fake| copy_log(&fake.log, log))
        }

        fn delete_shader(&self, shader: GLuint) {
            self.record(GlCall::DeleteShader(shader));
        }

        fn create_program(&self) -> GLuint {
            let name = self.next_name();
            self.programs.borrow_mut().insert(name, FakeProgram::default());
            self.record(GlCall::CreateProgram(name));
            name
        }

        fn attach_shader(&self, program: GLuint, shader: GLuint) {
            if let Some(fake) = self.programs.borrow_mut().get_mut(&program) {
                fake.attached.push(shader);
            }
            self.record(GlCall::AttachShader { program, shader });
        }

        fn link_program(&self, program: GLuint) {
            let shaders = self.shaders.borrow();
            if let Some(fake) = self.programs.borrow_mut().get_mut(&program) {
                let stages: Vec<(ShaderStage, bool)> = fake
                    .attached
                    .iter()
                    .filter_map(|name| shaders.get(name))
                    .map(|shader| (shader.stage, shader.compiled))
                    .collect();
                let count = |stage: ShaderStage| stages.iter().filter(|(s, _)| *s == stage).count();

                fake.log = if stages.iter().any(|(_, compiled)| !compiled) {
                    "error: linking with uncompiled shader".to_string()
                } else if count(ShaderStage::Vertex) != 1 {
                    "error: program needs exactly one vertex shader".to_string()
                } else if count(ShaderStage::Fragment) != 1 {
                    "error: program lacks a fragment shader".to_string()
                } else {
                    String::new()
                };
                fake.linked = fake.log.is_empty();
            }
            self.record(GlCall::LinkProgram(program));
        }

        fn program_link_status(&self, program: GLuint) -> bool {
            self.programs
                .borrow()
                .get(&program)
                .map_or(false, |fake| fake.linked)
        }

        fn program_info_log(&self, program: GLuint, log: &mut [u8]) -> usize {
            self.programs
                .borrow()
                .get(&program)
                .map_or(0, |fake| copy_log(&fake.log, log))
        }

        fn use_program(&self, program: GLuint) {
            self.record(GlCall::UseProgram(program));
        }

        fn delete_program(&self, program: GLuint) {
            self.record(GlCall::DeleteProgram(program));
        }

        fn gen_vertex_array(&self) -> GLuint {
            let name = self.next_name();
            self.record(GlCall::GenVertexArray(name));
            name
        }

        fn bind_vertex_array(&self, vao: GLuint) {
            self.record(GlCall::BindVertexArray(vao));
        }

        fn delete_vertex_array(&self, vao: GLuint) {
            self.record(GlCall::DeleteVertexArray(vao));
        }

        fn gen_buffer(&self) -> GLuint {
            let name = self.next_name();
            self.record(GlCall::GenBuffer(name));
            name
        }

        fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
            self.record(GlCall::BindBuffer { target, buffer });
        }

        fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
            self.record(GlCall::BufferData {
                target,
                data: data.to_vec(),
                usage,
            });
        }

        fn delete_buffer(&self, buffer: GLuint) {
            self.record(GlCall::DeleteBuffer(buffer));
        }

        fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, stride: GLsizei, offset: usize) {
            self.record(GlCall::VertexAttribPointer {
                index,
                components,
                stride,
                offset,
            });
        }

        fn enable_vertex_attrib_array(&self, index: GLuint) {
            self.record(GlCall::EnableVertexAttribArray(index));
        }

        fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
            self.record(GlCall::Viewport { x, y, width, height });
        }

        fn clear_color(&self, color: [GLfloat; 4]) {
            self.record(GlCall::ClearColor(color));
        }

        fn clear(&self, mask: GLbitfield) {
            self.record(GlCall::Clear(mask));
        }

        fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
            self.record(GlCall::DrawArrays { mode, first, count });
        }
    }
}

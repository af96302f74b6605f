use std::mem::{offset_of, size_of};
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use gl::types::{GLint, GLsizei, GLuint};

use crate::gl_api::GlApi;

/// Interleaved position and color, tightly packed.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

const fn v(x: f32, y: f32, color: [f32; 3]) -> Vertex {
    Vertex {
        position: [x, y, 0.0],
        color,
    }
}

const GREEN: [f32; 3] = [0.2, 0.7, 0.2];
const RED: [f32; 3] = [0.9, 0.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 0.99];
const YELLOW: [f32; 3] = [0.9, 0.9, 0.0];
const LAVENDER: [f32; 3] = [0.5, 0.5, 0.9];
const STEEL: [f32; 3] = [0.123, 0.456, 0.789];
const WHITE: [f32; 3] = [0.9, 0.9, 0.9];
const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const ORANGE: [f32; 3] = [1.0, 0.5, 0.2];

/// Nine triangles, three consecutive vertices each.
pub(crate) const VERTICES: [Vertex; 27] = [
    v(-0.5, 1.0, GREEN),
    v(-0.5, 0.5, GREEN),
    v(0.2, 0.75, GREEN),
    //
    v(-0.75, 0.75, RED),
    v(-0.5, 1.0, RED),
    v(-0.5, 0.5, RED),
    //
    v(-1.0, 0.5, BLUE),
    v(-0.75, 0.75, BLUE),
    v(-0.5, 0.5, BLUE),
    //
    v(-0.5, 0.5, YELLOW),
    v(-0.75, 0.25, YELLOW),
    v(-1.0, 0.5, YELLOW),
    //
    v(-0.5, 0.5, LAVENDER),
    v(-0.5, -0.25, LAVENDER),
    v(-0.75, 0.25, LAVENDER),
    //
    v(-0.5, 0.5, STEEL),
    v(0.0, 0.45, STEEL),
    v(-0.5, -0.5, STEEL),
    //
    v(0.0, 0.45, WHITE),
    v(0.0, -0.5, WHITE),
    v(-0.75, -0.75, WHITE),
    //
    v(0.06, 0.70, BLACK),
    v(-0.5, 0.5, BLACK),
    v(-0.08, 0.46, BLACK),
    // Fills the gap between the green, steel and black triangles.
    v(0.2, 0.75, ORANGE),
    v(0.06, 0.70, ORANGE),
    v(0.0, 0.45, ORANGE),
];

pub(crate) const STRIDE: GLsizei = size_of::<Vertex>() as GLsizei;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct VertexAttrib {
    pub location: GLuint,
    pub components: GLint,
    pub offset: usize,
}

pub(crate) const POSITION_ATTRIB: VertexAttrib = VertexAttrib {
    location: 0,
    components: 3,
    offset: offset_of!(Vertex, position),
};

pub(crate) const COLOR_ATTRIB: VertexAttrib = VertexAttrib {
    location: 1,
    components: 3,
    offset: offset_of!(Vertex, color),
};

pub(crate) struct VertexArray {
    gl: Rc<dyn GlApi>,
    id: GLuint,
}

impl VertexArray {
    pub(crate) fn new(gl: Rc<dyn GlApi>) -> Self {
        let id = gl.gen_vertex_array();
        Self { gl, id }
    }

    pub(crate) fn bind(&self) {
        self.gl.bind_vertex_array(self.id);
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.id);
    }
}

pub(crate) struct Buffer {
    gl: Rc<dyn GlApi>,
    id: GLuint,
}

impl Buffer {
    pub(crate) fn new(gl: Rc<dyn GlApi>) -> Self {
        let id = gl.gen_buffer();
        Self { gl, id }
    }

    pub(crate) fn id(&self) -> GLuint {
        self.id
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.id);
    }
}

/// Static vertex data resident on the GPU.
///
/// Fields drop in declaration order: vertex array, vertex buffer, index buffer.
pub(crate) struct Mesh {
    vao: VertexArray,
    _vbo: Buffer,
    // Allocated for parity with the indexed layout but never filled or bound;
    // drawing is non-indexed.
    _ebo: Buffer,
    vertex_count: GLsizei,
}

impl Mesh {
    pub(crate) fn upload(gl: &Rc<dyn GlApi>, vertices: &[Vertex]) -> Self {
        let vao = VertexArray::new(Rc::clone(gl));
        let vbo = Buffer::new(Rc::clone(gl));
        let ebo = Buffer::new(Rc::clone(gl));

        vao.bind();
        gl.bind_buffer(gl::ARRAY_BUFFER, vbo.id());
        gl.buffer_data(
            gl::ARRAY_BUFFER,
            bytemuck::cast_slice(vertices),
            gl::STATIC_DRAW,
        );

        for attrib in [POSITION_ATTRIB, COLOR_ATTRIB] {
            gl.vertex_attrib_pointer(attrib.location, attrib.components, STRIDE, attrib.offset);
            gl.enable_vertex_attrib_array(attrib.location);
        }

        gl.bind_buffer(gl::ARRAY_BUFFER, 0);
        gl.bind_vertex_array(0);

        log::debug!(
            "uploaded {} vertices ({} bytes)",
            vertices.len(),
            vertices.len() * size_of::<Vertex>()
        );

        Self {
            vao,
            _vbo: vbo,
            _ebo: ebo,
            vertex_count: vertices.len() as GLsizei,
        }
    }

    #[cfg(test)]
    pub(crate) fn vertex_count(&self) -> GLsizei {
        self.vertex_count
    }

    /// Issues a non-indexed triangle draw over every uploaded vertex.
    pub(crate) fn draw(&self) {
        self.vao.bind();
        self.vao.gl.draw_arrays(gl::TRIANGLES, 0, self.vertex_count);
    }
}

use std::ffi::CString;

use lazy_static::lazy_static;

lazy_static! {
    /// Passes position through and forwards the per-vertex color.
    pub(crate) static ref VERTEX_SHADER_SRC: CString = CString::new(
        r"#version 330 core
    layout (location = 0) in vec3 aPos;
    layout (location = 1) in vec3 aColor;

    out vec3 ourColor;

    void main() {
        gl_Position = vec4(aPos, 1.0);
        ourColor = aColor;
    }
    "
    )
    .unwrap();

    pub(crate) static ref FRAGMENT_SHADER_SRC: CString = CString::new(
        r"#version 330 core
    in vec3 ourColor;
    out vec4 FragColor;

    void main() {
        FragColor = vec4(ourColor, 1.0f);
    }"
    )
    .unwrap();
}

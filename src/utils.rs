use gl::types::GLuint;

use crate::gl_api::GlApi;

/// Upper bound on the diagnostic text fetched from the driver, NUL included.
pub(crate) const INFO_LOG_CAPACITY: usize = 512;

pub(crate) fn ensure_shader_compilation(gl: &dyn GlApi, shader: GLuint) -> Result<(), String> {
    if gl.shader_compile_status(shader) {
        Ok(())
    } else {
        let mut log = [0u8; INFO_LOG_CAPACITY];
        let log_length = gl.shader_info_log(shader, &mut log);

        Err(log_to_string(&log, log_length))
    }
}

pub(crate) fn ensure_shader_linking(gl: &dyn GlApi, program: GLuint) -> Result<(), String> {
    if gl.program_link_status(program) {
        Ok(())
    } else {
        let mut log = [0u8; INFO_LOG_CAPACITY];
        let log_length = gl.program_info_log(program, &mut log);

        Err(log_to_string(&log, log_length))
    }
}

// Some drivers report failure with an empty log.
fn log_to_string(log: &[u8], log_length: usize) -> String {
    let text = String::from_utf8_lossy(&log[..log_length.min(log.len())]);
    let text = text.trim_end_matches(&['\0', '\n'][..]);

    if text.is_empty() {
        "no diagnostic reported by the driver".to_string()
    } else {
        text.to_string()
    }
}

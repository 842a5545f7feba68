use fragview_core::{PlayerError, ShaderStage};
use glow::HasContext;

unsafe fn compile_stage(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, PlayerError> {
    let kind = match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    };
    let shader = gl
        .create_shader(kind)
        .map_err(|e| PlayerError::GlCreate(format!("create_shader({stage}) failed: {e:?}")))?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(PlayerError::ShaderCompile { stage, log });
    }
    Ok(shader)
}

/// Compile and link; every intermediate object is deleted on each failure path.
pub unsafe fn compile_program(
    gl: &glow::Context,
    vert_src: &str,
    frag_src: &str,
) -> Result<glow::Program, PlayerError> {
    let vs = compile_stage(gl, ShaderStage::Vertex, vert_src)?;
    let fs = match compile_stage(gl, ShaderStage::Fragment, frag_src) {
        Ok(fs) => fs,
        Err(e) => {
            gl.delete_shader(vs);
            return Err(e);
        }
    };

    let program = match gl.create_program() {
        Ok(p) => p,
        Err(e) => {
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(PlayerError::GlCreate(format!("create_program failed: {e:?}")));
        }
    };
    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);
    gl.link_program(program);

    gl.detach_shader(program, vs);
    gl.detach_shader(program, fs);
    gl.delete_shader(vs);
    gl.delete_shader(fs);

    if !gl.get_program_link_status(program) {
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        return Err(PlayerError::ProgramLink { log });
    }

    Ok(program)
}

//! In-memory stand-ins for the GPU, the network and the status line.
//!
//! [`RecordingBackend`] never touches a graphics API. It emulates just enough of one to
//! exercise the pipeline: compile and link outcomes are derived from the source text, uniforms
//! are "active" when declared, and every call is recorded in order.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use fragview_core::{FetchError, PlayerError, ShaderStage};

use crate::gpu::{GpuBackend, SurfaceSize, UniformValue};
use crate::loader::Fetcher;
use crate::status::{format_error, StatusSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockProgram(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockTexture(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockUniform {
    pub program: MockProgram,
    pub name: String,
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CompileProgram(MockProgram),
    DeleteProgram(MockProgram),
    CreateTexture(MockTexture),
    UploadTexture {
        texture: MockTexture,
        width: u32,
        height: u32,
    },
    DeleteTexture(MockTexture),
    Resize(SurfaceSize),
    Clear([f32; 4]),
    UseProgram(MockProgram),
    BindTexture {
        unit: u32,
        texture: MockTexture,
    },
    SetUniform {
        name: String,
        value: UniformValue,
    },
    Draw {
        position: u32,
    },
}

#[derive(Debug)]
struct ProgramRecord {
    attribs: HashSet<String>,
    uniforms: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u32,
    calls: Vec<GpuCall>,
    programs: BTreeMap<MockProgram, ProgramRecord>,
    textures: BTreeMap<MockTexture, Vec<u8>>,
    viewport: SurfaceSize,
    /// Textures that may still be created; `None` is unlimited.
    texture_budget: Option<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `created` more textures succeed; every `create_texture` after that fails with
    /// `GlCreate`.
    pub fn fail_textures_after(mut self, created: usize) -> Self {
        self.texture_budget = Some(created);
        self
    }

    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn is_program_live(&self, program: &MockProgram) -> bool {
        self.programs.contains_key(program)
    }

    pub fn is_texture_live(&self, texture: &MockTexture) -> bool {
        self.textures.contains_key(texture)
    }

    /// Pixels as last uploaded, in upload (bottom-first) row order.
    pub fn texture_pixels(&self, texture: &MockTexture) -> Option<&[u8]> {
        self.textures.get(texture).map(Vec::as_slice)
    }

    /// The most recent value written to uniform `name`, if any call is still recorded.
    pub fn uniform_value(&self, name: &str) -> Option<UniformValue> {
        self.calls.iter().rev().find_map(|call| match call {
            GpuCall::SetUniform { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GpuCall::Draw { .. }))
            .count()
    }

    pub fn viewport(&self) -> SurfaceSize {
        self.viewport
    }

    /// The texture bound to `unit` by the most recent recorded bind.
    pub fn bound_texture(&self, unit: u32) -> Option<MockTexture> {
        self.calls.iter().rev().find_map(|call| match call {
            GpuCall::BindTexture { unit: u, texture } if *u == unit => Some(*texture),
            _ => None,
        })
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Balanced braces and no `#error` line.
fn check_compiles(stage: ShaderStage, source: &str) -> Result<(), PlayerError> {
    let mut depth: i64 = 0;
    for (n, line) in source.lines().enumerate() {
        if line.trim_start().starts_with("#error") {
            return Err(PlayerError::ShaderCompile {
                stage,
                log: format!("ERROR: 0:{}: '#error' : {}\n", n + 1, line.trim()),
            });
        }
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(PlayerError::ShaderCompile {
                    stage,
                    log: format!("ERROR: 0:{}: '}}' : syntax error\n", n + 1),
                });
            }
        }
    }
    if depth != 0 {
        return Err(PlayerError::ShaderCompile {
            stage,
            log: "ERROR: 0:0: '' : unexpected end of file\n".into(),
        });
    }
    Ok(())
}

/// Names from `uniform <type> <name>;` and `in <type> <name>;` declarations.
fn declared(source: &str, keyword: &str) -> HashSet<String> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix(keyword)?.strip_prefix(char::is_whitespace)?;
            let name = rest.split_whitespace().last()?;
            let name = name.trim_end_matches(';');
            let name = name.split('[').next().unwrap_or(name);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

impl GpuBackend for RecordingBackend {
    type Program = MockProgram;
    type Texture = MockTexture;
    type UniformLocation = MockUniform;

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<MockProgram, PlayerError> {
        check_compiles(ShaderStage::Vertex, vertex_source)?;
        check_compiles(ShaderStage::Fragment, fragment_source)?;
        if !fragment_source.contains("void main") {
            return Err(PlayerError::ProgramLink {
                log: "error: missing function `main` in fragment shader\n".into(),
            });
        }
        let id = MockProgram(self.next());
        self.programs.insert(
            id,
            ProgramRecord {
                attribs: declared(vertex_source, "in"),
                uniforms: declared(vertex_source, "uniform")
                    .into_iter()
                    .chain(declared(fragment_source, "uniform"))
                    .collect(),
            },
        );
        self.calls.push(GpuCall::CompileProgram(id));
        Ok(id)
    }

    fn delete_program(&mut self, program: MockProgram) {
        self.programs.remove(&program);
        self.calls.push(GpuCall::DeleteProgram(program));
    }

    fn attrib_location(&mut self, program: &MockProgram, name: &str) -> Option<u32> {
        let record = self.programs.get(program)?;
        record.attribs.contains(name).then_some(0)
    }

    fn uniform_location(&mut self, program: &MockProgram, name: &str) -> Option<MockUniform> {
        let record = self.programs.get(program)?;
        record.uniforms.contains(name).then(|| MockUniform {
            program: *program,
            name: name.to_string(),
        })
    }

    fn create_texture(&mut self) -> Result<MockTexture, PlayerError> {
        match &mut self.texture_budget {
            Some(0) => return Err(PlayerError::GlCreate("texture allocation refused".into())),
            Some(left) => *left -= 1,
            None => {}
        }
        let id = MockTexture(self.next());
        self.textures.insert(id, Vec::new());
        self.calls.push(GpuCall::CreateTexture(id));
        Ok(id)
    }

    fn upload_texture(&mut self, texture: &MockTexture, width: u32, height: u32, rgba: &[u8]) {
        if let Some(pixels) = self.textures.get_mut(texture) {
            *pixels = rgba.to_vec();
        }
        self.calls.push(GpuCall::UploadTexture {
            texture: *texture,
            width,
            height,
        });
    }

    fn delete_texture(&mut self, texture: MockTexture) {
        self.textures.remove(&texture);
        self.calls.push(GpuCall::DeleteTexture(texture));
    }

    fn resize_surface(&mut self, size: SurfaceSize) {
        self.viewport = size;
        self.calls.push(GpuCall::Resize(size));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(GpuCall::Clear(color));
    }

    fn use_program(&mut self, program: &MockProgram) {
        self.calls.push(GpuCall::UseProgram(*program));
    }

    fn bind_texture(&mut self, unit: u32, texture: &MockTexture) {
        self.calls.push(GpuCall::BindTexture {
            unit,
            texture: *texture,
        });
    }

    fn set_uniform(&mut self, location: &MockUniform, value: UniformValue) {
        self.calls.push(GpuCall::SetUniform {
            name: location.name.clone(),
            value,
        });
    }

    fn draw_fullscreen(&mut self, position: u32) {
        self.calls.push(GpuCall::Draw { position });
    }
}

/// Path → bytes. Unknown paths answer 404.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
    statuses: HashMap<String, u16>,
    attempts: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, path: &str, text: &str) -> Self {
        self.with_bytes(path, text.as_bytes().to_vec())
    }

    pub fn with_bytes(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_string(), bytes);
        self
    }

    /// Answer `path` with an HTTP error status instead of a body.
    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.statuses.insert(path.to_string(), status);
        self
    }

    /// Every location requested so far, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }
}

impl Fetcher for MemoryFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        self.attempts.borrow_mut().push(location.to_string());
        if let Some(status) = self.statuses.get(location) {
            return Err(FetchError::Status {
                status: *status,
                status_text: String::new(),
            });
        }
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                status_text: "Not Found".into(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEntry {
    Info(String),
    /// Fully formatted error line.
    Error(String),
}

impl StatusEntry {
    pub fn text(&self) -> &str {
        match self {
            StatusEntry::Info(t) | StatusEntry::Error(t) => t,
        }
    }
}

/// Records status lines. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct StatusLog {
    entries: Rc<RefCell<Vec<StatusEntry>>>,
    shader_lists: Rc<RefCell<Vec<(Vec<String>, String)>>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<StatusEntry> {
        self.entries.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|e| match e {
                StatusEntry::Error(t) => Some(t.clone()),
                StatusEntry::Info(_) => None,
            })
            .collect()
    }

    /// Every published shader list with its selection, oldest first.
    pub fn shader_lists(&self) -> Vec<(Vec<String>, String)> {
        self.shader_lists.borrow().clone()
    }

    /// What a status line would currently display.
    pub fn last(&self) -> Option<String> {
        self.entries.borrow().last().map(|e| e.text().to_string())
    }
}

impl StatusSink for StatusLog {
    fn info(&mut self, text: &str) {
        self.entries
            .borrow_mut()
            .push(StatusEntry::Info(text.to_string()));
    }

    fn error(&mut self, context: &str, err: &PlayerError) {
        self.entries
            .borrow_mut()
            .push(StatusEntry::Error(format_error(context, err)));
    }

    fn shader_list(&mut self, names: &[String], selected: &str) {
        self.shader_lists
            .borrow_mut()
            .push((names.to_vec(), selected.to_string()));
    }
}

/// A `width`×`height` PNG filled with `pixel`.
pub fn encode_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let rgba = pixel.repeat(width as usize * height as usize);
    encode_png_rgba(width, height, rgba)
}

/// A PNG from explicit RGBA rows, row 0 at the top. Empty when the buffer does not match
/// the size.
pub fn encode_png_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Vec<u8> {
    let Some(img) = image::RgbaImage::from_raw(width, height, rgba) else {
        tracing::error!(width, height, "rgba buffer does not match png size");
        return Vec::new();
    };
    let mut out = std::io::Cursor::new(Vec::new());
    match img.write_to(&mut out, image::ImageFormat::Png) {
        Ok(()) => out.into_inner(),
        Err(e) => {
            tracing::error!(error = %e, "png encode failed");
            Vec::new()
        }
    }
}

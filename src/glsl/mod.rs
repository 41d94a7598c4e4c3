//! OpenGL backend: lowers kernel IR to GLSL 1.20 fragment shaders.
//!
//! Kernels run once per output pixel. Input buffers become `sampler2D`
//! uniforms, the output buffer is `gl_FragColor`, and the loops the
//! scheduler bound to the block grid are replaced by the fragment's
//! `pixcoord`.
//!
//! Pipeline per kernel:
//! ```text
//! Stmt → inject_texture_loads → Simplify → ShaderEmitter → module text
//! ```
//!
//! Several kernels may be appended to one module; the runtime splits them
//! on the `/// KERNEL` header lines.

pub mod emit;
pub mod inject;
pub mod texture;
pub mod types;

use tracing::debug;

pub use emit::{format_float, ShaderEmitter};
pub use inject::inject_texture_loads;
pub use types::{print_name, print_type};

use crate::config::CodegenOptions;
use crate::device::DeviceCodegen;
use crate::error::CodegenError;
use crate::ir::simplify::{ConstantFolder, NoSimplify, Simplify};
use crate::ir::{Argument, Stmt};

/// Accumulates GLSL kernels into one module.
///
/// Not reentrant: compile independent modules with independent instances.
pub struct GlslBackend {
    emitter: ShaderEmitter,
    simplifier: Box<dyn Simplify>,
    current_kernel: String,
}

impl Default for GlslBackend {
    fn default() -> Self {
        Self::new(&CodegenOptions::default())
    }
}

impl GlslBackend {
    pub fn new(options: &CodegenOptions) -> Self {
        debug!("Creating GLSL codegen");
        let simplifier: Box<dyn Simplify> = if options.simplify {
            Box::new(ConstantFolder)
        } else {
            Box::new(NoSimplify)
        };
        Self {
            emitter: ShaderEmitter::new(options.indent_width),
            simplifier,
            current_kernel: String::new(),
        }
    }

    /// Replace the simplifier run after texture-load injection.
    pub fn with_simplifier(mut self, simplifier: Box<dyn Simplify>) -> Self {
        self.simplifier = simplifier;
        self
    }

    /// Start a new, empty module.
    pub fn init_module(&mut self) {
        self.emitter.clear();
        self.current_kernel.clear();
    }

    /// Compile one kernel and append it to the current module.
    pub fn add_kernel(
        &mut self,
        stmt: &Stmt,
        name: &str,
        args: &[Argument],
    ) -> Result<(), CodegenError> {
        self.current_kernel = name.to_string();
        self.emitter.compile(stmt, name, args, self.simplifier.as_ref())
    }

    /// The module source as a null-terminated byte string.
    pub fn compile_to_src(&self) -> Vec<u8> {
        let src = self.emitter.source();
        debug!("GLSL source:\n{}", src);
        let mut buffer = Vec::with_capacity(src.len() + 1);
        buffer.extend_from_slice(src.as_bytes());
        buffer.push(0);
        buffer
    }

    /// The module source accumulated so far.
    pub fn source(&self) -> &str {
        self.emitter.source()
    }

    pub fn current_kernel_name(&self) -> &str {
        &self.current_kernel
    }

    /// Print the module source to stderr.
    pub fn dump(&self) {
        eprintln!("{}", self.emitter.source());
    }
}

impl DeviceCodegen for GlslBackend {
    fn api_name(&self) -> &str {
        "opengl"
    }

    fn init_module(&mut self) {
        GlslBackend::init_module(self)
    }

    fn add_kernel(
        &mut self,
        stmt: &Stmt,
        name: &str,
        args: &[Argument],
    ) -> Result<(), CodegenError> {
        GlslBackend::add_kernel(self, stmt, name, args)
    }

    fn compile_to_src(&self) -> Vec<u8> {
        GlslBackend::compile_to_src(self)
    }

    fn current_kernel_name(&self) -> &str {
        GlslBackend::current_kernel_name(self)
    }

    fn dump(&self) {
        GlslBackend::dump(self)
    }
}

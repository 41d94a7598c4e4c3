pub mod config;
pub mod device;
pub mod diagnostic;
pub mod error;
pub mod glsl;
pub mod ir;
pub mod kernel_file;
pub mod span;

// Re-exports for the types most callers need
pub use config::CodegenOptions;
pub use device::{create_device_codegen, DeviceCodegen};
pub use error::CodegenError;
pub use glsl::GlslBackend;
pub use kernel_file::{KernelDef, KernelModule};

use tracing::info;

/// Compile every kernel of `module` into one GLSL module.
///
/// Returns the backend so callers can read the source, its null-terminated
/// bytes, or the last kernel name.
pub fn compile_module(
    module: &KernelModule,
    options: &CodegenOptions,
) -> Result<GlslBackend, CodegenError> {
    let mut backend = GlslBackend::new(options);
    backend.init_module();
    for kernel in &module.kernels {
        info!(kernel = %kernel.name, args = kernel.args.len(), "compiling kernel");
        backend.add_kernel(&kernel.body, &kernel.name, &kernel.args)?;
    }
    Ok(backend)
}

/// Content hash of a module's source, used by runtimes as a cache key.
pub fn source_hash(source: &str) -> blake3::Hash {
    blake3::hash(source.as_bytes())
}

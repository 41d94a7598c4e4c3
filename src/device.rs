//! Device codegen seam.
//!
//! The host compiler picks a device backend from the target and drives it
//! through `DeviceCodegen`: one module at a time, kernels appended in
//! order, source handed to the runtime loader as a null-terminated string.

use crate::config::CodegenOptions;
use crate::error::CodegenError;
use crate::glsl::GlslBackend;
use crate::ir::{Argument, Stmt};

/// A backend that turns kernel IR into source for a GPU API.
pub trait DeviceCodegen {
    /// The graphics/compute API name (e.g. "opengl").
    fn api_name(&self) -> &str;

    /// Discard the current module and start an empty one.
    fn init_module(&mut self);

    /// Compile one kernel into the current module.
    fn add_kernel(
        &mut self,
        stmt: &Stmt,
        name: &str,
        args: &[Argument],
    ) -> Result<(), CodegenError>;

    /// The module source, null-terminated.
    fn compile_to_src(&self) -> Vec<u8>;

    /// Name of the most recently added kernel.
    fn current_kernel_name(&self) -> &str;

    /// Write the module source to the diagnostic stream.
    fn dump(&self);
}

/// Create a device backend for the given API name.
pub fn create_device_codegen(
    api: &str,
    options: &CodegenOptions,
) -> Option<Box<dyn DeviceCodegen>> {
    match api {
        "opengl" | "glsl" => Some(Box::new(GlslBackend::new(options))),
        _ => None,
    }
}

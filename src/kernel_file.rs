//! JSON kernel modules.
//!
//! A module file lists kernels in the order they are added to the GLSL
//! module. Types are written as `{"code": "uint", "bits": 8}` (`width`
//! defaults to 1), expressions and statements use the externally tagged
//! serde form of the IR:
//!
//! ```json
//! {
//!   "kernels": [{
//!     "name": "copy",
//!     "args": [
//!       {"name": "src", "ty": {"code": "uint", "bits": 8}, "is_buffer": true, "read": true},
//!       {"name": "dst", "ty": {"code": "uint", "bits": 8}, "is_buffer": true, "write": true}
//!     ],
//!     "body": {"store": {"name": "dst", "value": ..., "index": [...]}}
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;
use crate::ir::{Argument, Stmt};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelDef {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Argument>,
    pub body: Stmt,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelModule {
    pub kernels: Vec<KernelDef>,
}

impl KernelModule {
    /// Parse a module from JSON text.
    pub fn parse(source: &str) -> Result<KernelModule, Diagnostic> {
        serde_json::from_str(source).map_err(|e| Diagnostic::from_json_error(&e, source))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

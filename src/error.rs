use thiserror::Error;

/// Why GLSL generation stopped. Both kinds abort the current module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// The input uses something the OpenGL backend does not support
    /// (a type GLSL cannot represent, a read/write buffer, a parallel loop).
    #[error("{0}")]
    User(String),
    /// An invariant an earlier pass should have established was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CodegenError {
    pub fn user(message: impl Into<String>) -> Self {
        CodegenError::User(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CodegenError::Internal(message.into())
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CodegenError::Internal(_))
    }

    pub fn message(&self) -> &str {
        match self {
            CodegenError::User(m) | CodegenError::Internal(m) => m,
        }
    }

    /// Prefix the message with the kernel being compiled.
    pub(crate) fn in_kernel(self, kernel: &str) -> Self {
        match self {
            CodegenError::User(m) => CodegenError::User(format!("in kernel '{}': {}", kernel, m)),
            CodegenError::Internal(m) => {
                CodegenError::Internal(format!("in kernel '{}': {}", kernel, m))
            }
        }
    }
}

pub type Result<T, E = CodegenError> = std::result::Result<T, E>;

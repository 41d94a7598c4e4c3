use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Code generation settings.
///
/// Loaded from the `[codegen]` section of a `glkern.toml`:
///
/// ```toml
/// [codegen]
/// indent_width = 2
/// simplify = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Spaces per nesting level in emitted GLSL.
    pub indent_width: usize,
    /// Run the constant folder after texture-load injection.
    pub simplify: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            simplify: true,
        }
    }
}

impl CodegenOptions {
    /// Load options from a glkern.toml file.
    pub fn load(toml_path: &Path) -> Result<CodegenOptions, Diagnostic> {
        let content = std::fs::read_to_string(toml_path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read '{}': {}", toml_path.display(), e),
                Span::dummy(),
            )
        })?;
        Self::parse(&content)
    }

    /// Section-aware minimal TOML parsing; unknown keys and sections are
    /// ignored so the file can be shared with other tools.
    pub fn parse(content: &str) -> Result<CodegenOptions, Diagnostic> {
        let mut options = CodegenOptions::default();
        let mut current_section = String::new();
        let mut offset = 0usize;

        for line in content.split_inclusive('\n') {
            let start = offset;
            offset += line.len();
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            if current_section != "codegen" {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                continue;
            };
            let key = key.trim().trim_matches('"');
            let value = value.trim();
            let span = Span::new(start, start + line.trim_end().len());

            match key {
                "indent_width" => {
                    options.indent_width = value.parse().map_err(|_| {
                        Diagnostic::error(
                            format!("indent_width must be a non-negative integer, found '{}'", value),
                            span,
                        )
                    })?;
                }
                "simplify" => {
                    options.simplify = match value {
                        "true" => true,
                        "false" => false,
                        _ => {
                            return Err(Diagnostic::error(
                                format!("simplify must be true or false, found '{}'", value),
                                span,
                            ))
                        }
                    };
                }
                _ => {}
            }
        }
        Ok(options)
    }
}

use crate::span::Span;

/// A problem with an input file (kernel module or glkern.toml).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Point a JSON syntax or schema error at the offending character.
    pub fn from_json_error(err: &serde_json::Error, source: &str) -> Self {
        let span = if err.line() == 0 {
            Span::dummy()
        } else {
            Span::at_line_col(source, err.line(), err.column())
        };
        let d = Diagnostic::error(format!("invalid kernel module: {}", err), span);
        if err.is_data() {
            d.with_help("see `glkern build --help` for the kernel module format".to_string())
        } else {
            d
        }
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let mut report = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        if let Err(e) = report.finish().eprint((filename, Source::from(source))) {
            eprintln!("error: {} ({}: {})", self.message, filename, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let d = Diagnostic::error("bad kernel".to_string(), Span::new(10, 15))
            .with_help("check the index list".to_string());
        assert_eq!(d.message, "bad kernel");
        assert_eq!(d.span.start, 10);
        assert_eq!(d.span.end, 15);
        assert_eq!(d.help.as_deref(), Some("check the index list"));
    }

    #[test]
    fn test_from_json_syntax_error() {
        let source = "{\n  \"kernels\": [,]\n}\n";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let d = Diagnostic::from_json_error(&err, source);
        assert!(d.message.starts_with("invalid kernel module"));
        // Points into the second line.
        assert_eq!(source[..d.span.start].matches('\n').count(), 1);
        assert!(d.help.is_none());
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "{\n  \"kernels\": 3\n}\n";
        let d = Diagnostic::error("expected a list".to_string(), Span::new(15, 16))
            .with_help("kernels must be an array".to_string());
        d.render("module.json", source);
    }
}

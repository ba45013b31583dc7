//! Fluent construction of [`Diagnostic`] values.

use super::{Diagnostic, DiagnosticCode, Level};
use crate::span::{SourceMap, Span};

/// Builds a [`Diagnostic`], resolving its `Span` against a [`SourceMap`] only
/// at the end so call sites never need the map in scope just to describe an
/// error.
pub struct DiagnosticBuilder {
    level: Level,
    code: Option<DiagnosticCode>,
    message: String,
    span: Option<Span>,
}

impl DiagnosticBuilder {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            code: None,
            message: message.into(),
            span: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Level::Fatal, message)
    }

    pub fn code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Resolve the builder into a concrete [`Diagnostic`] using `sources` to
    /// turn the span (if any) into a `(source_name, line, col)` triple.
    pub fn build(self, sources: &SourceMap) -> Diagnostic {
        let (source_name, line, col) = match self.span {
            Some(span) => {
                let name = sources.name(span.buffer).unwrap_or("<unknown>").to_string();
                let (line, col) = sources.line_col(span.buffer, span.start).unwrap_or((0, 0));
                (name, line, col)
            }
            None => ("<unknown>".to_string(), 0, 0),
        };
        Diagnostic {
            level: self.level,
            code: self.code,
            source_name,
            line,
            col,
            message: self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::codes::E_LEX_INVALID_BYTE;

    #[test]
    fn builds_diagnostic_with_resolved_location() {
        let mut sources = SourceMap::new();
        let buf = sources.add_buffer("a.c", "int x = @;\n");
        let span = Span {
            buffer: buf,
            start: 8,
            len: 1,
        };
        let diag = DiagnosticBuilder::error("unexpected byte '@'")
            .code(E_LEX_INVALID_BYTE)
            .span(span)
            .build(&sources);

        assert_eq!(diag.source_name, "a.c");
        assert_eq!(diag.line, 1);
        assert_eq!(diag.col, 9);
        assert_eq!(diag.code, Some(E_LEX_INVALID_BYTE));
    }

    #[test]
    fn builds_diagnostic_without_span() {
        let sources = SourceMap::new();
        let diag = DiagnosticBuilder::warning("no location available").build(&sources);
        assert_eq!(diag.source_name, "<unknown>");
        assert_eq!(diag.line, 0);
    }
}

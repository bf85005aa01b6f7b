//! Diagnostics reported while parsing Razor documents.
//!
//! Diagnostics are plain data: the parser attaches them to the offending
//! token or node, and consumers collect them with a tree walk.

use std::fmt::{self, Display};

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::{TextRange, TextSize};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

impl DiagnosticSeverity {
    fn level(self) -> Level {
        match self {
            DiagnosticSeverity::Warning => Level::Warning,
            DiagnosticSeverity::Error => Level::Error,
        }
    }
}

impl Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Warning => f.write_str("warning"),
            DiagnosticSeverity::Error => f.write_str("error"),
        }
    }
}

/// A located problem in a Razor document.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RazorDiagnostic {
    id: &'static str,
    severity: DiagnosticSeverity,
    message: String,
    span: TextRange,
}

impl RazorDiagnostic {
    pub fn new(
        id: &'static str,
        severity: DiagnosticSeverity,
        message: impl Into<String>,
        span: TextRange,
    ) -> Self {
        Self { id, severity, message: message.into(), span }
    }

    pub fn error(id: &'static str, message: impl Into<String>, span: TextRange) -> Self {
        Self::new(id, DiagnosticSeverity::Error, message, span)
    }

    pub fn warning(id: &'static str, message: impl Into<String>, span: TextRange) -> Self {
        Self::new(id, DiagnosticSeverity::Warning, message, span)
    }

    /// Stable diagnostic code, e.g. `RZ1006`.
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> TextRange {
        self.span
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let level = self.severity.level();
        let message = level.title(&self.message).id(self.id).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(level.span(self.span.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

impl Display for RazorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start: u32 = self.span.start().into();
        let end: u32 = self.span.end().into();
        write!(f, "{} {}@{start}..{end}: {}", self.severity, self.id, self.message)
    }
}

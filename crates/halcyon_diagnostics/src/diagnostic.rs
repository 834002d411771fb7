//! The structured diagnostic record.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use halcyon_source::Span;
use serde::{Deserialize, Serialize};

/// One finding reported by a pass or analyzer.
///
/// Carries a stable code, a severity, the primary span, any number of
/// secondary labels, and free-form notes and help lines. The help lines are
/// where analyzers put actionable suggestions (an `else` arm to add, a
/// statement order that removes a hazard); suggestions are always advisory
/// text, never applied to the IR.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity of the finding.
    pub severity: Severity,
    /// Stable diagnostic code.
    pub code: DiagnosticCode,
    /// Main message.
    pub message: String,
    /// Location of the offending construct.
    pub primary_span: Span,
    /// Supporting annotated spans.
    pub labels: Vec<Label>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Error, code, message, span)
    }

    /// Creates a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Warning, code, message, span)
    }

    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            primary_span: span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Attaches a label.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Attaches a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Attaches a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn error_constructor() {
        let d = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 101),
            "combinational loop",
            Span::DUMMY,
        );
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(format!("{}", d.code), "E101");
    }

    #[test]
    fn builder_chain() {
        let d = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 301),
            "latch inferred for 'y'",
            Span::DUMMY,
        )
        .with_label(Label::primary(Span::DUMMY, "assigned only when en is 1"))
        .with_note("unassigned path: !(en)")
        .with_help("assign 'y' in an else arm or give it a default");
        assert_eq!(d.labels.len(), 1);
        assert_eq!(d.notes.len(), 1);
        assert_eq!(d.help.len(), 1);
    }
}

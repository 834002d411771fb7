//! Plain-text rendering of diagnostics.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;

/// Renders diagnostics into a compiler-style text report.
///
/// Span resolution to file/line text belongs to the parsing collaborator's
/// source database, so the renderer prints byte offsets; the surrounding
/// tooling substitutes resolved locations when it owns the sources.
pub struct TerminalRenderer;

impl TerminalRenderer {
    /// Renders one diagnostic.
    pub fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}[{}]: {}\n", diag.severity, diag.code, diag.message);
        if !diag.primary_span.is_dummy() {
            out.push_str(&format!(
                "  --> file {} bytes {}..{}\n",
                diag.primary_span.file.as_raw(),
                diag.primary_span.start,
                diag.primary_span.end
            ));
        }
        for label in &diag.labels {
            let marker = match label.style {
                LabelStyle::Primary => "^^^",
                LabelStyle::Secondary => "---",
            };
            out.push_str(&format!("   {} {}\n", marker, label.message));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }

    /// Renders a full report followed by an error/warning tally.
    pub fn render_all(&self, diags: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diag in diags {
            out.push_str(&self.render(diag));
        }
        let errors = diags.iter().filter(|d| d.severity.is_error()).count();
        let warnings = diags.len() - errors;
        out.push_str(&format!(
            "{errors} error(s), {warnings} warning(s)\n"
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::label::Label;
    use halcyon_source::Span;

    #[test]
    fn renders_header_and_trailers() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 304),
            "order-dependent read of 'x'",
            Span::DUMMY,
        )
        .with_label(Label::primary(Span::DUMMY, "reads stale value"))
        .with_help("move this assignment after the one driving 'x'");
        let text = TerminalRenderer.render(&diag);
        assert!(text.starts_with("warning[W304]: order-dependent read of 'x'"));
        assert!(text.contains("^^^ reads stale value"));
        assert!(text.contains("= help: move this assignment"));
    }

    #[test]
    fn report_tallies() {
        let diags = vec![
            Diagnostic::error(DiagnosticCode::new(Category::Error, 101), "a", Span::DUMMY),
            Diagnostic::warning(DiagnosticCode::new(Category::Warning, 301), "b", Span::DUMMY),
        ];
        let text = TerminalRenderer.render_all(&diags);
        assert!(text.ends_with("1 error(s), 1 warning(s)\n"));
    }
}

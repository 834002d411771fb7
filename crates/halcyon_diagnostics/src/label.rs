//! Span annotations attached to diagnostics.

use halcyon_source::Span;
use serde::{Deserialize, Serialize};

/// Visual weight of a label.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// Points at the construct that triggered the finding.
    Primary,
    /// Supporting context (a declaration site, a conflicting driver).
    Secondary,
}

/// An annotated span inside a diagnostic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// The annotated span.
    pub span: Span,
    /// Message shown beside the span.
    pub message: String,
    /// Primary or secondary weight.
    pub style: LabelStyle,
}

impl Label {
    /// Creates the primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

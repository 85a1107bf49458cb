//! Validation diagnostics.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::version::SpecVersion;

use super::grammar::DocumentKind;

/// One grammar error or warning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based source line.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Everything the reader found wrong with a document.
///
/// Errors mean the document does not conform to its declared grammar;
/// warnings flag likely mistakes in a conforming document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// The document kind, if the root element was recognized.
    pub kind: Option<DocumentKind>,
    /// The declared version, if it was recognized.
    pub version: Option<SpecVersion>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// `true` if no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `true` if neither errors nor warnings were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub(crate) fn error(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        debug!(line, %message, "descriptor error");
        self.errors.push(Diagnostic { line, message });
    }

    pub(crate) fn warning(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        debug!(line, %message, "descriptor warning");
        self.warnings.push(Diagnostic { line, message });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.errors {
            writeln!(f, "error: {e}")?;
        }
        for w in &self.warnings {
            writeln!(f, "warning: {w}")?;
        }
        Ok(())
    }
}

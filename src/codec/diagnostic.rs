//! Non-fatal diagnostics produced while compiling.
//!
//! Failures stop compilation and travel as [DoculispError](crate::DoculispError). Diagnostics
//! don't: they accumulate in the variable table's reserved warnings list and are reported once
//! the compilation finishes.

use std::fmt;

use crate::location::Location;

/// Something that compiled but probably isn't what the author meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub message: String,
    pub location: Option<Location>,
}

impl ParseDiagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        ParseDiagnostic {
            message: message.into(),
            location: None,
        }
    }

    pub fn warning_at(message: impl Into<String>, location: &Location) -> Self {
        ParseDiagnostic {
            message: message.into(),
            location: Some(location.clone()),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "Warning: {} ({}:{}:{})",
                self.message,
                location.document_path.display(),
                location.line,
                location.char
            ),
            None => write!(f, "Warning: {}", self.message),
        }
    }
}

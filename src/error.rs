use std::{fmt, io, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::location::Location;

/// The failure half of every fallible Doculisp operation.
///
/// Failures below the document-parse boundary (malformed syntax, bad nesting, bad parameters)
/// are [DoculispError::Code] and pinpoint a source position. Failures above it (missing files,
/// invalid arguments, bad configuration) are [DoculispError::General] and carry at most a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DoculispError {
    #[error("{message} at '{}' line {line}, char {}", .path.display(), .char)]
    Code {
        message: String,
        path: PathBuf,
        line: usize,
        char: usize,
    },
    #[error("{message}{}", GeneralPath(.path))]
    General {
        message: String,
        path: Option<PathBuf>,
    },
    /// Every failure of a `.dlproj` compilation, plus the documents that still compiled.
    #[error("{} document(s) failed to compile:\n{}", .failures.len(), ProjectFailures(.failures))]
    Project {
        compiled: Vec<CompiledOutput>,
        failures: Vec<DoculispError>,
    },
}

/// A project document that compiled even though others in the same project failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledOutput {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl DoculispError {
    /// A code failure at `location`.
    pub fn code(message: impl Into<String>, location: &Location) -> Self {
        DoculispError::Code {
            message: message.into(),
            path: location.document_path.to_path_buf(),
            line: location.line,
            char: location.char,
        }
    }

    /// A general failure, optionally naming the path it concerns.
    pub fn general(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        DoculispError::General {
            message: message.into(),
            path,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, DoculispError::Code { .. })
    }

    pub fn is_general(&self) -> bool {
        matches!(self, DoculispError::General { .. })
    }

    /// The `(line, char)` position of a code failure.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            DoculispError::Code { line, char, .. } => Some((*line, *char)),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            DoculispError::Code { message, .. } | DoculispError::General { message, .. } => {
                message.clone()
            }
            DoculispError::Project { .. } => self.to_string(),
        }
    }
}

struct GeneralPath<'a>(&'a Option<PathBuf>);

impl fmt::Display for GeneralPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(path) => write!(f, " ('{}')", path.display()),
            None => Ok(()),
        }
    }
}

struct ProjectFailures<'a>(&'a [DoculispError]);

impl fmt::Display for ProjectFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {err}")?;
        }
        Ok(())
    }
}

impl From<io::Error> for DoculispError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => DoculispError::general(format!("File not found: {x}"), None),
            io::ErrorKind::PermissionDenied => {
                DoculispError::general(format!("Permission denied: {x}"), None)
            }
            _ => DoculispError::general(format!("IOError: {}", x.kind()), None),
        }
    }
}

impl From<toml::de::Error> for DoculispError {
    fn from(src: toml::de::Error) -> DoculispError {
        DoculispError::general(format!("Toml deserialization error: {src}"), None)
    }
}

impl From<fmt::Error> for DoculispError {
    fn from(x: fmt::Error) -> Self {
        DoculispError::general(format!("{x}"), None)
    }
}

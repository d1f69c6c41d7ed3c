//! Source positions within a compilation.
//!
//! Every document in an include tree owns a coordinate space rooted at its `(depth, index)`
//! pair: the root document is `(1, 1)`, its first include is `(2, 1)`, the second `(2, 2)`, and
//! so on. Positions order by depth, then index, then line, then char, which is the order the
//! writer relies on when deciding where blank lines go.

use std::{
    cmp::Ordering,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::error::DoculispError;

/// The coordinate of one document within a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectLocation {
    pub document_path: Arc<Path>,
    pub document_depth: usize,
    pub document_index: usize,
}

impl ProjectLocation {
    /// Depth and index are 1-based; zero for either is a general failure.
    pub fn new<P: AsRef<Path>>(
        path: P,
        depth: usize,
        index: usize,
    ) -> Result<ProjectLocation, DoculispError> {
        let path = path.as_ref();
        if depth < 1 {
            return Err(DoculispError::general(
                format!("Document depth must be at least 1, got {depth}"),
                Some(path.to_path_buf()),
            ));
        }
        if index < 1 {
            return Err(DoculispError::general(
                format!("Document index must be at least 1, got {index}"),
                Some(path.to_path_buf()),
            ));
        }
        Ok(ProjectLocation {
            document_path: Arc::from(path),
            document_depth: depth,
            document_index: index,
        })
    }

    /// Line 1, char 1 of this document.
    pub fn start(&self) -> Location {
        Location {
            document_path: self.document_path.clone(),
            document_depth: self.document_depth,
            document_index: self.document_index,
            line: 1,
            char: 1,
        }
    }

    /// The coordinate of this document's `index`th include (1-based).
    pub fn child<P: AsRef<Path>>(
        &self,
        path: P,
        index: usize,
    ) -> Result<ProjectLocation, DoculispError> {
        ProjectLocation::new(path, self.document_depth + 1, index)
    }

    pub fn extension(&self) -> Option<String> {
        self.document_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    pub fn path_buf(&self) -> PathBuf {
        self.document_path.to_path_buf()
    }
}

/// An immutable position inside one document of a compilation.
#[derive(Debug, Clone, Hash)]
pub struct Location {
    pub document_path: Arc<Path>,
    pub document_depth: usize,
    pub document_index: usize,
    pub line: usize,
    pub char: usize,
}

impl Location {
    /// The next line, char reset to 1.
    pub fn increase_line(&self) -> Location {
        Location {
            line: self.line + 1,
            char: 1,
            ..self.clone()
        }
    }

    pub fn increase_char(&self) -> Location {
        Location {
            char: self.char + 1,
            ..self.clone()
        }
    }

    /// Advance past `c`; a newline moves to the start of the next line.
    pub fn advance(&self, c: char) -> Location {
        if c == '\n' {
            self.increase_line()
        } else {
            self.increase_char()
        }
    }

    pub fn project_location(&self) -> ProjectLocation {
        ProjectLocation {
            document_path: self.document_path.clone(),
            document_depth: self.document_depth,
            document_index: self.document_index,
        }
    }

    pub fn compare(&self, other: &Location) -> Ordering {
        self.cmp(other)
    }

    pub fn is_before(&self, other: &Location) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Location) -> bool {
        self.compare(other) == Ordering::Greater
    }

    pub fn is_same(&self, other: &Location) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Whether `other` lies in the same document on the same line.
    pub fn same_line(&self, other: &Location) -> bool {
        self.document_path == other.document_path && self.line == other.line
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Location {}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.document_depth
            .cmp(&other.document_depth)
            .then(self.document_index.cmp(&other.document_index))
            .then(self.line.cmp(&other.line))
            .then(self.char.cmp(&other.char))
            // Only reached for distinct documents sharing a coordinate.
            .then_with(|| self.document_path.cmp(&other.document_path))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} (depth {}, index {})",
            self.document_path.display(),
            self.line,
            self.char,
            self.document_depth,
            self.document_index
        )
    }
}

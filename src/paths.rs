//! Path handling for source and destination documents.
//!
//! [DocPath] is the opaque path value the compiler passes around: it is always absolute and
//! lexically normalized, and it knows which kind of Doculisp source it names. Relative links
//! between generated documents are computed with `pathdiff` and rendered with `/` separators
//! regardless of platform.

use std::{
    borrow::Cow,
    fmt,
    path::{Component, Path, PathBuf},
};

/// What a source file contains, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Markdown with directive blocks inside HTML comments.
    Markdown,
    /// `.dlisp`: pure directive source.
    Doculisp,
    /// `.dlproj`: a project descriptor.
    Project,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    full: PathBuf,
}

impl DocPath {
    /// Resolve `raw` against `base` (when relative) and normalize the result.
    pub fn new<P: AsRef<Path>, B: AsRef<Path>>(raw: P, base: B) -> DocPath {
        let raw = raw.as_ref();
        let joined = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            base.as_ref().join(raw)
        };
        DocPath {
            full: normalize(&joined),
        }
    }

    /// The absolute, normalized path.
    pub fn full_name(&self) -> &Path {
        &self.full
    }

    /// Lower-cased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.full
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    pub fn kind(&self) -> DocumentKind {
        match self.extension().as_deref() {
            Some("dlisp") => DocumentKind::Doculisp,
            Some("dlproj") => DocumentKind::Project,
            _ => DocumentKind::Markdown,
        }
    }

    /// The containing directory.
    pub fn directory(&self) -> DocPath {
        DocPath {
            full: self
                .full
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.full.clone()),
        }
    }

    /// Resolve `raw` relative to the directory containing this path.
    pub fn sibling<P: AsRef<Path>>(&self, raw: P) -> DocPath {
        DocPath::new(raw, self.directory().full_name())
    }

    /// A `./`-prefixed, `/`-separated path from the directory `root` to this path.
    pub fn relative_to(&self, root: &DocPath) -> String {
        let diff = pathdiff::diff_paths(&self.full, &root.full).unwrap_or_else(|| self.full.clone());
        let rendered = os_path_to_string(&diff);
        if rendered.starts_with("../") || rendered == ".." {
            rendered
        } else {
            format!("./{rendered}")
        }
    }

    /// The link from a document generated at `self` to a document generated at `target`.
    pub fn link_to(&self, target: &DocPath) -> String {
        target.relative_to(&self.directory())
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full.display())
    }
}

impl AsRef<Path> for DocPath {
    fn as_ref(&self) -> &Path {
        &self.full
    }
}

/// Lexically remove `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normal = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normal.pop() {
                    normal.push(component.as_os_str());
                }
            }
            _ => normal.push(component.as_os_str()),
        }
    }
    normal
}

/// `/`-separated, lossily decoded text of a path. A leading root becomes a leading `/`.
pub fn os_path_to_string<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .components()
        .map(|c| match c {
            Component::RootDir => Cow::from(""),
            _ => c.as_os_str().to_string_lossy(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Lower-cased, hyphenated form of a title, keeping letters, digits, `_` and `-`.
pub fn to_anchor(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .replace(char::is_whitespace, "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

pub fn as_anchor(anchor: &str) -> String {
    format!("#{}", to_anchor(anchor))
}

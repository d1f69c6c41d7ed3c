//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; later calls do nothing.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Write `files` (paths relative to the temp dir) and return the temp dir's root.
#[allow(dead_code)]
pub fn write_tree(temp_dir: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = temp_dir.path().to_path_buf();
    for (path, text) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, text).unwrap();
    }
    root
}

/// A small documentation tree: a main document including a Markdown section and a `.dlisp`
/// section, plus a project file compiling it alongside a second document.
///
/// ```text
/// docs/
///   docs.dlproj
///   _main.md
///   sections/sleep.md
///   sections/dream.dlisp
///   guide.md
/// ```
#[allow(dead_code)]
pub fn create_doc_tree(temp_dir: &TempDir) -> PathBuf {
    write_tree(
        temp_dir,
        &[
            (
                "docs/_main.md",
                r#"<!-- (dl (section-meta
    (title Rest)
    (author Jason Kerney)
    (include
        (Section ./sections/sleep.md)
        (Section ./sections/dream.dlisp))))
-->

How to rest. Also see the [guide](<!-- (dl (get-path guide)) -->).

<!-- (dl (content (toc numbered))) -->
"#,
            ),
            (
                "docs/sections/sleep.md",
                r#"<!-- (dl (section-meta (title Sleep) (id sleep))) -->

Sleep is `important`.

```
<!-- (dl (# not a directive)) -->
```
"#,
            ),
            (
                "docs/sections/dream.dlisp",
                "(section-meta\n    (title Dream)\n    (subtitle Sometimes)\n    (author Jason Kerney))\n",
            ),
            (
                "docs/guide.md",
                "<!-- (dl (section-meta (title Guide))) -->\n\nBack to [sleep](<!-- (dl (get-path sleep)) -->).\n",
            ),
            (
                "docs/docs.dlproj",
                r#"(documents
    (document
        (id readme)
        (source ./_main.md)
        (output ../README.md))
    (document
        (id guide)
        (source ./guide.md)
        (output ../guide/README.md)))
"#,
            ),
        ],
    )
}

#[allow(dead_code)]
pub fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

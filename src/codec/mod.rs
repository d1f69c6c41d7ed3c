//! The Doculisp compilation pipeline.
//!
//! A document goes through five stages, each a plain function over the previous stage's
//! output:
//!
//! 1. [`splitter::split`] separates literal text from `(dl ...)` directive blocks.
//! 2. [`tokenizer::tokenize`] turns directive blocks into atoms, parameters and close-parens.
//! 3. [`parser::parse`] folds tokens into forms, validates them against
//!    [`grammar::DOCULISP_GRAMMAR`] and builds a typed [`Doculisp`] tree.
//! 4. [`includes::IncludeResolver`] loads every included document and attaches its tree.
//! 5. [`writer::write_ast`] renders the resolved tree to Markdown.
//!
//! Every stage returns `Result<_, DoculispError>`; the first failure stops the pipeline.
//! [`project::parse_project`] reads `.dlproj` descriptors with the same first two stages and
//! [`grammar::PROJECT_GRAMMAR`].
//!
//! ```rust
//! use doculisp::{codec::{parse_text, write_ast}, location::ProjectLocation, variables::VariableTable};
//!
//! let mut variables = VariableTable::new();
//! let location = ProjectLocation::new("/docs/readme.md", 1, 1).unwrap();
//! let doc = parse_text("<!-- (dl (# Hello)) -->\nWorld", &location, &mut variables).unwrap();
//! let markdown = write_ast(&doc, &variables).unwrap();
//! assert!(markdown.contains("## Hello ##\n\nWorld"));
//! ```

use crate::{error::DoculispError, location::ProjectLocation, variables::VariableTable};

pub mod ast;
pub(crate) mod cursor;
pub mod diagnostic;
pub mod grammar;
pub mod includes;
pub mod parser;
pub mod project;
pub mod splitter;
pub mod tokenizer;
pub mod writer;

pub use ast::{BulletStyle, Doculisp, DoculispPart, DocumentPart, Load, SectionWriter, Token};
pub use diagnostic::ParseDiagnostic;
pub use includes::IncludeResolver;
pub use project::{parse_project, Project, ProjectDocument};
pub use writer::{write_ast, GENERATED_MARKER};

/// Split, tokenize and parse `text` as the document at `location`. Includes are left
/// unresolved.
pub fn parse_text(
    text: &str,
    location: &ProjectLocation,
    variables: &mut VariableTable,
) -> Result<Doculisp, DoculispError> {
    let parts = splitter::split(text, location)?;
    let tokens = tokenizer::tokenize(parts)?;
    parser::parse(tokens, variables)
}

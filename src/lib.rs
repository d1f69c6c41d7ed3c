//! # doculisp
//!
//! A compiler that turns annotated Markdown into generated Markdown.
//!
//! ## Overview
//!
//! Doculisp sources are ordinary Markdown with a small lisp-like directive language embedded in
//! HTML comments. Directives describe document metadata (title, subtitle, authors, ids),
//! composition (`include` child documents) and output shaping (tables of contents, heading
//! levels, where included sections go). Sources can also be pure directive files (`.dlisp`), and
//! a project descriptor (`.dlproj`) compiles many documents in one batch with shared
//! cross-document ids.
//!
//! ```markdown
//! <!-- (dl (section-meta
//!     (title Rest)
//!     (author Jason Kerney)
//!     (include
//!         (Section ./sleep.md)
//!         (Section ./dream.md))))
//! -->
//!
//! <!-- (dl (content (toc numbered))) -->
//! ```
//!
//! ## Architecture
//!
//! - **[`codec`]**: the pipeline (splitter, tokenizer, parser, include resolver, writer) and the
//!   `.dlproj` reader
//! - **[`compiler`]**: [`compiler::Compiler`], which ties the pipeline to a [`files::FileHandler`]
//!   and a [`config::DoculispConfig`]
//! - **[`variables`]**: the scoped variable table threaded through a compilation
//! - **[`location`]**: source coordinates and the document order they define
//! - **[`paths`]**: absolute, normalized document paths and relative link computation
//! - **[`error`]**: [`DoculispError`], the failure half of every fallible operation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doculisp::{
//!     compiler::Compiler, config::DoculispConfig, files::FsFileHandler, paths::DocPath,
//! };
//!
//! fn main() -> Result<(), doculisp::DoculispError> {
//!     let compiler = Compiler::new(FsFileHandler, DoculispConfig::discover(".")?);
//!     let source = DocPath::new("./docs/_main.md", std::env::current_dir()?);
//!     let destination = DocPath::new("./README.md", std::env::current_dir()?);
//!     for doc in compiler.run(&source, Some(&destination), false)? {
//!         for warning in doc.warnings {
//!             eprintln!("{warning}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **default**: the library
//! - **bin**: the `doculisp` command line tool (`clap`, `tracing-subscriber`)

pub mod codec;
pub mod compiler;
pub mod config;
pub mod error;
pub mod files;
pub mod location;
pub mod paths;
#[cfg(test)]
mod tests;
pub mod variables;

pub use error::*;

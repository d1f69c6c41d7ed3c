//! Recursive include resolution.
//!
//! Each `(include ...)` entry is loaded, split, tokenized and parsed at `depth + 1` with its
//! 1-based position as the index, inside its own child scope of the variable table. Paths are
//! already absolute by the time they get here, so resolution never depends on the process's
//! working directory. The first failure anywhere in the tree aborts the whole resolution.

use crate::{
    codec::{
        ast::{Doculisp, SectionWriter},
        parse_text,
    },
    config::DoculispConfig,
    error::DoculispError,
    files::FileHandler,
    location::ProjectLocation,
    paths::DocPath,
    variables::{Variable, VariableTable, SOURCE_KEY},
};

pub struct IncludeResolver<'a> {
    files: &'a dyn FileHandler,
    config: &'a DoculispConfig,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(files: &'a dyn FileHandler, config: &'a DoculispConfig) -> Self {
        IncludeResolver { files, config }
    }

    /// Parse the document at `path` as a root (depth 1, index 1) and resolve its includes.
    pub fn parse(
        &self,
        path: &DocPath,
        variables: &mut VariableTable,
    ) -> Result<Doculisp, DoculispError> {
        let location = ProjectLocation::new(path.full_name(), 1, 1)?;
        let doc = self.parse_document(path, &location, variables)?;
        let mut chain = vec![path.clone()];
        self.parse_externals(doc, variables, &mut chain)
    }

    /// Load and parse one document without following its includes.
    pub fn parse_document(
        &self,
        path: &DocPath,
        location: &ProjectLocation,
        variables: &mut VariableTable,
    ) -> Result<Doculisp, DoculispError> {
        tracing::debug!(
            "Parsing {} at depth {}, index {}",
            path,
            location.document_depth,
            location.document_index
        );
        let text = self.files.load(path)?;
        parse_text(&text, location, variables)
    }

    /// Resolve every include of `doc`, depth first, in source order. `chain` holds the documents
    /// currently being resolved, outermost first.
    pub fn parse_externals(
        &self,
        doc: Doculisp,
        variables: &mut VariableTable,
        chain: &mut Vec<DocPath>,
    ) -> Result<Doculisp, DoculispError> {
        let Doculisp::Section(mut section) = doc else {
            return Ok(Doculisp::Empty);
        };
        self.resolve_section(&mut section, variables, chain)?;
        Ok(Doculisp::Section(section))
    }

    fn resolve_section(
        &self,
        section: &mut SectionWriter,
        variables: &mut VariableTable,
        chain: &mut Vec<DocPath>,
    ) -> Result<(), DoculispError> {
        let parent = section.document_order.project_location();
        for (idx, load) in section.include.iter_mut().enumerate() {
            if parent.document_depth >= self.config.max_include_depth {
                return Err(DoculispError::code(
                    format!(
                        "Include depth limit of {} exceeded by {}",
                        self.config.max_include_depth, load.path
                    ),
                    &load.document_order,
                ));
            }
            if self.config.check_include_cycles && chain.contains(&load.path) {
                let cycle = chain
                    .iter()
                    .chain(std::iter::once(&load.path))
                    .map(|path| path.to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(DoculispError::code(
                    format!("Include cycle detected: {cycle}"),
                    &load.document_order,
                ));
            }

            let location = parent.child(load.path.full_name(), idx + 1)?;
            chain.push(load.path.clone());
            let resolved = variables.scoped(|variables| {
                variables.add_value(SOURCE_KEY, Variable::Path(load.path.clone()));
                let doc = self.parse_document(&load.path, &location, variables)?;
                self.parse_externals(doc, variables, chain)
            });
            chain.pop();
            load.document = resolved?.into_section();
        }
        Ok(())
    }
}

//! Top-level compilation of documents and projects.

use crate::{
    codec::{
        diagnostic::ParseDiagnostic, includes::IncludeResolver, project::parse_project,
        writer::write_ast, Doculisp,
    },
    config::DoculispConfig,
    error::{CompiledOutput, DoculispError},
    files::FileHandler,
    paths::{DocPath, DocumentKind},
    variables::{IdTarget, Variable, VariableTable, DESTINATION_KEY, SOURCE_KEY},
};

/// The outcome of compiling one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDocument {
    pub source: DocPath,
    /// `None` when validating a single document without a destination.
    pub destination: Option<DocPath>,
    pub text: String,
    /// Warnings raised while parsing this document and its includes.
    pub warnings: Vec<ParseDiagnostic>,
}

pub struct Compiler<F: FileHandler> {
    files: F,
    config: DoculispConfig,
}

impl<F: FileHandler> Compiler<F> {
    pub fn new(files: F, config: DoculispConfig) -> Self {
        Compiler { files, config }
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn config(&self) -> &DoculispConfig {
        &self.config
    }

    /// Compile `source`, dispatching on its kind.
    ///
    /// A `.dlproj` source compiles every document it lists and must not be given a
    /// destination. Any other source needs a destination unless `test` is set. In test mode
    /// nothing is written.
    pub fn run(
        &self,
        source: &DocPath,
        destination: Option<&DocPath>,
        test: bool,
    ) -> Result<Vec<CompiledDocument>, DoculispError> {
        match (source.kind(), destination) {
            (DocumentKind::Project, Some(_)) => Err(DoculispError::general(
                "A project file lists its own outputs; remove the destination",
                Some(source.full_name().to_path_buf()),
            )),
            (DocumentKind::Project, None) => self.compile_project(source, test),
            (_, None) if !test => Err(DoculispError::general(
                "A destination is required unless testing",
                Some(source.full_name().to_path_buf()),
            )),
            (_, destination) => {
                let mut variables = VariableTable::new();
                let doc = self.compile_document(source, destination, &mut variables, test)?;
                Ok(vec![doc])
            }
        }
    }

    /// Parse `source` and resolve its includes, with `source` and `destination` set in
    /// `variables`' current scope. Callers read authors and warnings back out of `variables`.
    pub fn parse(
        &self,
        source: &DocPath,
        destination: Option<&DocPath>,
        variables: &mut VariableTable,
    ) -> Result<Doculisp, DoculispError> {
        variables.add_value(SOURCE_KEY, Variable::Path(source.clone()));
        variables.add_value(
            DESTINATION_KEY,
            Variable::Path(destination.unwrap_or(source).clone()),
        );
        IncludeResolver::new(&self.files, &self.config).parse(source, variables)
    }

    /// Compile one document tree. The text is written to `destination` unless `test` is set.
    pub fn compile_document(
        &self,
        source: &DocPath,
        destination: Option<&DocPath>,
        variables: &mut VariableTable,
        test: bool,
    ) -> Result<CompiledDocument, DoculispError> {
        let before = variables.warnings().len();
        let doc = self.parse(source, destination, variables)?;
        let text = write_ast(&doc, variables)?;
        let text = match (destination, test) {
            (Some(destination), false) => self.files.write(destination, text)?,
            _ => text,
        };
        tracing::info!("Compiled {}", source);
        Ok(CompiledDocument {
            source: source.clone(),
            destination: destination.cloned(),
            text,
            warnings: variables.warnings().split_off(before),
        })
    }

    /// Compile every document a `.dlproj` file lists.
    ///
    /// Project ids are registered first so any document can link to any other. Each document
    /// then parses in its own scope, and only documents that parsed are written. Every failure
    /// is collected into one [DoculispError::Project], which also lists the documents that
    /// were written anyway.
    pub fn compile_project(
        &self,
        path: &DocPath,
        test: bool,
    ) -> Result<Vec<CompiledDocument>, DoculispError> {
        let text = self.files.load(path)?;
        let project = parse_project(&text, path)?;
        let mut variables = VariableTable::new();
        let mut failures = Vec::new();

        for document in project.documents.iter() {
            let Some(id) = document.id.as_deref() else {
                continue;
            };
            let target = IdTarget {
                destination: document.output.clone(),
                anchor: None,
            };
            if let Err(existing) = variables.register_id(id, target) {
                failures.push(DoculispError::code(
                    format!(
                        "Duplicate id `{id}`: already refers to {}",
                        existing.destination
                    ),
                    &document.location,
                ));
            }
        }
        if !failures.is_empty() {
            return Err(DoculispError::Project {
                compiled: Vec::new(),
                failures,
            });
        }

        let mut parsed = Vec::new();
        for document in project.documents.iter() {
            let result = variables.scoped(|variables| {
                let before = variables.warnings().len();
                self.parse(&document.source, Some(&document.output), variables)
                    .map(|doc| (doc, variables.warnings().split_off(before)))
            });
            match result {
                Ok((doc, warnings)) => parsed.push((document, doc, warnings)),
                Err(e) => failures.push(e),
            }
        }

        let mut compiled = Vec::new();
        for (document, doc, warnings) in parsed {
            let result = variables.scoped(|variables| -> Result<String, DoculispError> {
                variables.add_value(SOURCE_KEY, Variable::Path(document.source.clone()));
                variables.add_value(DESTINATION_KEY, Variable::Path(document.output.clone()));
                let text = write_ast(&doc, variables)?;
                if test {
                    Ok(text)
                } else {
                    self.files.write(&document.output, text)
                }
            });
            match result {
                Ok(text) => compiled.push(CompiledDocument {
                    source: document.source.clone(),
                    destination: Some(document.output.clone()),
                    text,
                    warnings,
                }),
                Err(e) => failures.push(e),
            }
        }

        if failures.is_empty() {
            tracing::info!("Compiled {} document(s) from {}", compiled.len(), path);
            Ok(compiled)
        } else {
            let compiled = compiled
                .into_iter()
                .filter_map(|doc| {
                    Some(CompiledOutput {
                        source: doc.source.full_name().to_path_buf(),
                        destination: doc.destination?.full_name().to_path_buf(),
                    })
                })
                .collect();
            Err(DoculispError::Project { compiled, failures })
        }
    }
}

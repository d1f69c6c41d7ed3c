//! `.dlproj` project descriptors.
//!
//! ```text
//! (documents
//!     (document
//!         (id readme)
//!         (source ./_main.md)
//!         (output ../README.md)))
//! ```

use crate::{
    codec::{
        grammar::{build_items, Item, PROJECT_GRAMMAR},
        parser::is_valid_id,
        splitter::split,
        tokenizer::tokenize,
    },
    error::DoculispError,
    location::{Location, ProjectLocation},
    paths::DocPath,
};

/// One `(document ...)` entry, paths resolved against the descriptor's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDocument {
    pub source: DocPath,
    pub output: DocPath,
    pub id: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub path: DocPath,
    pub documents: Vec<ProjectDocument>,
}

/// Parse the text of the descriptor at `path`.
pub fn parse_project(text: &str, path: &DocPath) -> Result<Project, DoculispError> {
    let location = ProjectLocation::new(path.full_name(), 1, 1)?;
    let items = build_items(tokenize(split(text, &location)?)?)?;
    if items.is_empty() {
        return Err(DoculispError::general(
            "Project file contains no documents",
            Some(path.full_name().to_path_buf()),
        ));
    }
    PROJECT_GRAMMAR.validate(&items, &location.start())?;

    let mut documents = Vec::new();
    for item in items.iter() {
        let Item::Form(root) = item else {
            continue;
        };
        for document in root.children_named("document") {
            let source = document
                .child("source")
                .and_then(|form| form.parameter_text())
                .unwrap_or_default();
            let output = document
                .child("output")
                .and_then(|form| form.parameter_text())
                .unwrap_or_default();
            let id = match document.child("id") {
                Some(form) => {
                    let id = form.parameter_text().unwrap_or_default().trim();
                    if !is_valid_id(id) {
                        return Err(DoculispError::code(
                            format!("Invalid id `{id}`: ids must be lower-kebab-case"),
                            form.parameter_location(),
                        ));
                    }
                    Some(id.to_string())
                }
                None => None,
            };
            documents.push(ProjectDocument {
                source: path.sibling(source),
                output: path.sibling(output),
                id,
                location: document.location.clone(),
            });
        }
    }
    tracing::debug!("Project {} lists {} document(s)", path, documents.len());
    Ok(Project {
        path: path.clone(),
        documents,
    })
}

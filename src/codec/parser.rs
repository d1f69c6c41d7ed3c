//! Structural parser: validated forms to a typed [Doculisp] tree.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    codec::{
        ast::{bullet_style_at, BulletStyle, Doculisp, DoculispPart, Load, SectionWriter, Token},
        diagnostic::ParseDiagnostic,
        grammar::{build_items, Form, Item, DOCULISP_GRAMMAR},
    },
    error::DoculispError,
    location::Location,
    paths::{as_anchor, DocPath},
    variables::{IdTarget, VariableTable, AUTHORS_KEY},
};

static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid id pattern"));

/// Whether `id` is a valid lower-kebab-case id.
pub fn is_valid_id(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}

/// Parse a token stream into a [Doculisp] tree.
///
/// Authors are added to the global author list and section ids are registered in `variables`
/// as a side effect. A stream with no tokens, or only whitespace text, parses to
/// [Doculisp::Empty].
pub fn parse(tokens: Vec<Token>, variables: &mut VariableTable) -> Result<Doculisp, DoculispError> {
    let Some(first) = tokens.first() else {
        return Ok(Doculisp::Empty);
    };
    let start = first.location().project_location().start();
    let items = build_items(tokens)?;
    DOCULISP_GRAMMAR.validate(&items, &start)?;

    let mut section = SectionWriter {
        document_order: start.clone(),
        doculisp: Vec::new(),
        include: Vec::new(),
    };
    let mut has_content = false;

    for item in items {
        match item {
            Item::Text { text, location } => {
                if let Some(part) = write_part(&text, &location) {
                    section.doculisp.push(part);
                }
            }
            Item::Form(form) => match form.atom.as_str() {
                "section-meta" => {
                    let (title, include) = section_meta(&form, variables)?;
                    section.doculisp.push(title);
                    section.include = include;
                }
                "content" => {
                    has_content = true;
                    if let Some(toc) = form.child("toc") {
                        section.doculisp.push(table_of_contents(toc)?);
                    }
                    section.doculisp.push(DoculispPart::ContentLocation {
                        document_order: form.location.clone(),
                    });
                }
                "get-path" => {
                    let id = form.parameter_text().unwrap_or_default().trim();
                    if !is_valid_id(id) {
                        return Err(DoculispError::code(
                            format!("Invalid id `{id}`: ids must be lower-kebab-case"),
                            form.parameter_location(),
                        ));
                    }
                    section.doculisp.push(DoculispPart::PathId {
                        id: id.to_string(),
                        document_order: form.location.clone(),
                    });
                }
                _ => section.doculisp.push(DoculispPart::Header {
                    depth_count: form.atom.len(),
                    text: form.parameter_text().unwrap_or_default().to_string(),
                    document_order: form.location.clone(),
                }),
            },
        }
    }

    if section.doculisp.is_empty() && section.include.is_empty() {
        return Ok(Doculisp::Empty);
    }
    if !section.include.is_empty() && !has_content {
        variables.add_warning(ParseDiagnostic::warning_at(
            format!(
                "'{}' includes sections but has no (content) location",
                start.document_path.display()
            ),
            &start,
        ));
    }
    tracing::debug!(
        "Parsed {} into {} node(s), {} include(s)",
        start.document_path.display(),
        section.doculisp.len(),
        section.include.len()
    );
    Ok(Doculisp::Section(section))
}

/// Trim literal text: whole leading blank lines go (the location moves past them), and trailing
/// whitespace goes when it reaches a line end. Blank text yields nothing.
fn write_part(text: &str, location: &Location) -> Option<DoculispPart> {
    if text.trim().is_empty() {
        return None;
    }
    let mut value = text;
    let mut document_order = location.clone();
    while let Some(newline) = value.find('\n') {
        if !value[..newline].trim().is_empty() {
            break;
        }
        value = &value[newline + 1..];
        document_order = document_order.increase_line();
    }
    let trimmed = value.trim_end();
    if value[trimmed.len()..].contains('\n') {
        value = trimmed;
    }
    Some(DoculispPart::Write {
        value: value.to_string(),
        document_order,
    })
}

fn section_meta(
    form: &Form,
    variables: &mut VariableTable,
) -> Result<(DoculispPart, Vec<Load>), DoculispError> {
    let document_order = form.location.clone();
    let title_form = form
        .child("title")
        .ok_or_else(|| DoculispError::code("section-meta requires `title`", &form.location))?;
    let title = title_form.parameter_text().unwrap_or_default().to_string();
    let depth = document_order.document_depth;
    let marks = "#".repeat(depth);
    let label = format!("{marks} {title} {marks}");
    let ref_link = match form.child("ref-link") {
        Some(link) => as_anchor(link.parameter_text().unwrap_or_default()),
        None => as_anchor(&title),
    };
    let subtitle = form
        .child("subtitle")
        .and_then(Form::parameter_text)
        .map(str::to_string);

    for author in form.children_named("author") {
        if let Some(name) = author.parameter_text() {
            variables.add_global_value_to_string_list(AUTHORS_KEY, name);
        }
    }

    if let Some(id_form) = form.child("id") {
        let id = id_form.parameter_text().unwrap_or_default().trim();
        if !is_valid_id(id) {
            return Err(DoculispError::code(
                format!("Invalid id `{id}`: ids must be lower-kebab-case"),
                id_form.parameter_location(),
            ));
        }
        let destination = variables
            .destination()
            .or_else(|| variables.source())
            .cloned()
            .unwrap_or_else(|| DocPath::new(&*document_order.document_path, "/"));
        let target = IdTarget {
            destination,
            anchor: Some(ref_link.clone()),
        };
        if let Err(existing) = variables.register_id(id, target) {
            return Err(DoculispError::code(
                format!(
                    "Duplicate id `{id}`: already refers to {}{}",
                    existing.destination,
                    existing.anchor.unwrap_or_default()
                ),
                id_form.parameter_location(),
            ));
        }
    }

    let document_path = DocPath::new(&*document_order.document_path, "/");
    let include = form
        .child("include")
        .map(|include| {
            include
                .children
                .iter()
                .map(|entry| Load {
                    document_order: entry.location.clone(),
                    path: document_path.sibling(entry.parameter_text().unwrap_or_default()),
                    section_label: entry.atom.replace('-', " "),
                    document: None,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok((
        DoculispPart::Title {
            title,
            label,
            ref_link,
            subtitle,
            document_order,
        },
        include,
    ))
}

fn table_of_contents(toc: &Form) -> Result<DoculispPart, DoculispError> {
    let bullet_style = match (toc.parameter.as_ref(), toc.child("style")) {
        (Some(_), Some(style)) => {
            return Err(DoculispError::code(
                "`toc` takes either a style parameter or a `style` sub-form, not both",
                &style.location,
            ))
        }
        (Some(parameter), None) => bullet_style_at(&parameter.text, &parameter.location)?,
        (None, Some(style)) => bullet_style_at(
            style.parameter_text().unwrap_or_default(),
            style.parameter_location(),
        )?,
        (None, None) => BulletStyle::Numbered,
    };
    let label = toc
        .child("label")
        .and_then(Form::parameter_text)
        .map(str::to_string);
    Ok(DoculispPart::TableOfContents {
        label,
        bullet_style,
        document_order: toc.location.clone(),
    })
}

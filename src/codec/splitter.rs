//! Separate Markdown prose from embedded `(dl ...)` directive blocks.
//!
//! In Markdown sources, directives live inside HTML comments: `<!-- (dl (# Heading)) -->`.
//! Everything else passes through verbatim, including code spans and fences, inside which a
//! comment marker is just text. Non-directive comment content is dropped. `.dlisp` and
//! `.dlproj` sources are all directives, as if the whole file were wrapped in one block.

use crate::{
    codec::{ast::DocumentPart, cursor::Cursor},
    error::DoculispError,
    location::{Location, ProjectLocation},
};

/// Split `text` into [DocumentPart]s, in source order.
pub fn split(
    text: &str,
    project_location: &ProjectLocation,
) -> Result<Vec<DocumentPart>, DoculispError> {
    if project_location.document_depth < 1 || project_location.document_index < 1 {
        return Err(DoculispError::general(
            format!(
                "Invalid document coordinate (depth {}, index {})",
                project_location.document_depth, project_location.document_index
            ),
            Some(project_location.path_buf()),
        ));
    }
    let text = normalize_newlines(text);
    let start = project_location.start();
    let mut cursor = Cursor::new(&text, &start);

    let parts = match project_location.extension().as_deref() {
        Some("dlisp") | Some("dlproj") => {
            let block = read_block(&mut cursor, None)?;
            match block {
                DocumentPart::LispBlock { ref text, .. } if text.trim().is_empty() => vec![],
                block => vec![block],
            }
        }
        _ => split_markdown(&mut cursor)?,
    };
    tracing::debug!(
        "Split {} into {} part(s)",
        project_location.document_path.display(),
        parts.len()
    );
    Ok(parts)
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Accumulates consecutive prose into one [DocumentPart::Text].
#[derive(Default)]
struct TextRun {
    text: String,
    start: Option<Location>,
}

impl TextRun {
    fn push(&mut self, c: char, location: Location) {
        if self.start.is_none() {
            self.start = Some(location);
        }
        self.text.push(c);
    }

    fn push_from(&mut self, cursor: &mut Cursor<'_>, count: usize) {
        for _ in 0..count {
            let here = cursor.location();
            match cursor.bump() {
                Some(c) => self.push(c, here),
                None => break,
            }
        }
    }

    fn flush(&mut self, parts: &mut Vec<DocumentPart>) {
        if let Some(location) = self.start.take() {
            parts.push(DocumentPart::Text {
                text: std::mem::take(&mut self.text),
                location,
            });
        }
    }
}

fn split_markdown(cursor: &mut Cursor<'_>) -> Result<Vec<DocumentPart>, DoculispError> {
    let mut parts = Vec::new();
    let mut run = TextRun::default();

    while !cursor.is_eof() {
        if cursor.starts_with("```") {
            read_fence(cursor, &mut run)?;
        } else if cursor.starts_with("`") {
            read_inline_code(cursor, &mut run)?;
        } else if cursor.starts_with("<!--") {
            read_comment(cursor, &mut run, &mut parts)?;
        } else {
            run.push_from(cursor, 1);
        }
    }
    run.flush(&mut parts);
    Ok(parts)
}

fn read_fence(cursor: &mut Cursor<'_>, run: &mut TextRun) -> Result<(), DoculispError> {
    let opener = cursor.location();
    let Some(close) = cursor.rest()[3..].find("```") else {
        return Err(DoculispError::code(
            "Multiline code block not closed",
            &opener,
        ));
    };
    let length = cursor.rest()[..close + 6].chars().count();
    run.push_from(cursor, length);
    Ok(())
}

fn read_inline_code(cursor: &mut Cursor<'_>, run: &mut TextRun) -> Result<(), DoculispError> {
    let opener = cursor.location();
    let body = &cursor.rest()[1..];
    match body.find(['`', '\n']) {
        Some(end) if body[end..].starts_with('`') => {
            let length = cursor.rest()[..end + 2].chars().count();
            run.push_from(cursor, length);
            Ok(())
        }
        _ => Err(DoculispError::code("Inline code block not closed", &opener)),
    }
}

fn read_comment(
    cursor: &mut Cursor<'_>,
    run: &mut TextRun,
    parts: &mut Vec<DocumentPart>,
) -> Result<(), DoculispError> {
    let opener = cursor.location();
    cursor.bump_n(4);
    loop {
        if cursor.starts_with("-->") {
            cursor.bump_n(3);
            return Ok(());
        }
        if cursor.is_eof() {
            return Err(DoculispError::code("HTML comment not closed", &opener));
        }
        if cursor.at_block_opener() {
            run.flush(parts);
            let here = cursor.location();
            let block = read_block(cursor, Some(here))?;
            parts.push(block);
        } else {
            cursor.bump();
        }
    }
}

/// Read one directive block. `opener` is the location of an explicit `(dl`; `None` reads an
/// implicit block spanning the rest of the source.
fn read_block(
    cursor: &mut Cursor<'_>,
    opener: Option<Location>,
) -> Result<DocumentPart, DoculispError> {
    if opener.is_some() {
        cursor.bump_n(3);
    }
    let location = cursor.location();
    let mut text = String::new();
    let mut open_parens: Vec<Location> = Vec::new();

    loop {
        let here = cursor.location();
        let Some(c) = cursor.peek() else {
            return match (open_parens.last(), &opener) {
                (None, None) => Ok(DocumentPart::LispBlock { text, location }),
                (Some(paren), _) => Err(DoculispError::code("Parenthesis not closed", paren)),
                (None, Some(opener)) => {
                    Err(DoculispError::code("Doculisp block not closed", opener))
                }
            };
        };

        if let Some(opener) = &opener {
            if cursor.starts_with("-->") {
                return Err(DoculispError::code("Doculisp block not closed", opener));
            }
        }

        match c {
            '\\' => {
                text.push(c);
                cursor.bump();
                if let Some(escaped) = cursor.bump() {
                    text.push(escaped);
                }
            }
            '(' if cursor.at_block_opener() => {
                return Err(DoculispError::code(
                    "Doculisp blocks cannot be nested",
                    &here,
                ));
            }
            '(' => {
                open_parens.push(here);
                text.push(c);
                cursor.bump();
            }
            ')' if open_parens.is_empty() => {
                if opener.is_none() {
                    return Err(DoculispError::code(
                        format!(
                            "'{}' has something not contained in parenthesis",
                            location.document_path.display()
                        ),
                        &here,
                    ));
                }
                cursor.bump();
                return Ok(DocumentPart::LispBlock { text, location });
            }
            ')' => {
                open_parens.pop();
                text.push(c);
                cursor.bump();
            }
            c if opener.is_none() && open_parens.is_empty() && !c.is_whitespace() => {
                return Err(DoculispError::code(
                    format!(
                        "'{}' has something not contained in parenthesis",
                        location.document_path.display()
                    ),
                    &here,
                ));
            }
            c => {
                text.push(c);
                cursor.bump();
            }
        }
    }
}

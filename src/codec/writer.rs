//! Render a resolved [Doculisp] tree to Markdown.

use std::fmt::Write;

use crate::{
    codec::ast::{BulletStyle, Doculisp, DoculispPart, SectionWriter},
    error::DoculispError,
    location::Location,
    variables::VariableTable,
};

/// First and last line of every generated document.
pub const GENERATED_MARKER: &str = "<!-- Generated Document do not edit! -->";

/// Render `doc`. [Doculisp::Empty] renders as the empty string.
pub fn write_ast(doc: &Doculisp, variables: &VariableTable) -> Result<String, DoculispError> {
    let Doculisp::Section(section) = doc else {
        return Ok(String::new());
    };
    let mut out = MarkdownOut::default();
    out.block(GENERATED_MARKER);
    write_section(section, variables, &mut out)?;
    out.block(GENERATED_MARKER);
    let text = out.finish();
    tracing::trace!("Rendered {} byte(s)", text.len());
    Ok(text)
}

/// Output buffer applying the line-break rule: an inline part starting on the source line where
/// the previous inline part ended is joined directly, everything else is separated by a blank
/// line.
#[derive(Default)]
struct MarkdownOut {
    text: String,
    /// Where the last inline part ended in its source.
    last_inline: Option<Location>,
}

impl MarkdownOut {
    fn separate(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let kept = self.text.trim_end().len();
        self.text.truncate(kept);
        self.text.push_str("\n\n");
    }

    fn block(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.separate();
        self.text.push_str(text);
        self.last_inline = None;
    }

    fn inline(&mut self, text: &str, location: &Location) {
        let joins = self
            .last_inline
            .as_ref()
            .map(|last| last.same_line(location))
            .unwrap_or(false);
        if !joins {
            self.separate();
        }
        self.text.push_str(text);
        let end = text.matches('\n').fold(location.clone(), |end, _| end.increase_line());
        self.last_inline = Some(end);
    }

    fn finish(mut self) -> String {
        if !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text
    }
}

fn heading(level: usize, text: &str) -> String {
    let marks = "#".repeat(level);
    format!("{marks} {text} {marks}")
}

fn write_section(
    section: &SectionWriter,
    variables: &VariableTable,
    out: &mut MarkdownOut,
) -> Result<(), DoculispError> {
    let depth = section.document_order.document_depth;
    for part in section.doculisp.iter() {
        match part {
            DoculispPart::Write {
                value,
                document_order,
            } => out.inline(value, document_order),
            DoculispPart::Title {
                label, subtitle, ..
            } => {
                out.block(label);
                if let Some(subtitle) = subtitle {
                    out.block(&heading(depth + 2, subtitle));
                }
            }
            DoculispPart::Header {
                depth_count, text, ..
            } => out.block(&heading(depth_count + depth, text)),
            DoculispPart::ContentLocation { .. } => {
                for child in section.include.iter().filter_map(|load| load.document.as_ref()) {
                    write_section(child, variables, out)?;
                }
            }
            DoculispPart::TableOfContents {
                label,
                bullet_style,
                ..
            } => {
                if *bullet_style == BulletStyle::NoTable {
                    continue;
                }
                if let Some(label) = label {
                    out.block(&heading(depth + 1, label));
                }
                out.block(&table_of_contents(section, *bullet_style)?);
            }
            DoculispPart::PathId { id, document_order } => {
                let link = path_id(id, document_order, variables)?;
                out.inline(&link, document_order);
            }
        }
    }
    Ok(())
}

fn table_of_contents(
    section: &SectionWriter,
    bullet_style: BulletStyle,
) -> Result<String, DoculispError> {
    let mut toc = String::new();
    let entries = section.include.iter().filter_map(|load| {
        let child = load.document.as_ref()?;
        let (title, ref_link) = child.title()?;
        Some((load.section_label.as_str(), title, ref_link))
    });
    for (idx, (label, title, link)) in entries.enumerate() {
        if idx > 0 {
            toc.push('\n');
        }
        let text = if bullet_style.is_labeled() {
            format!("{label}: {title}")
        } else {
            title.to_string()
        };
        match bullet_style {
            BulletStyle::Numbered | BulletStyle::NumberedLabeled => {
                write!(toc, "{}. [{text}]({link})", idx + 1)?
            }
            BulletStyle::Bulleted | BulletStyle::BulletedLabeled => {
                write!(toc, "* [{text}]({link})")?
            }
            BulletStyle::Unlabeled | BulletStyle::Labeled => write!(toc, "[{text}]({link})")?,
            BulletStyle::NoTable => {}
        }
    }
    Ok(toc)
}

/// The link target for `id` as seen from the document being written.
fn path_id(
    id: &str,
    location: &Location,
    variables: &VariableTable,
) -> Result<String, DoculispError> {
    let target = variables
        .get_id(id)
        .ok_or_else(|| DoculispError::code(format!("Unknown id `{id}`"), location))?;
    let anchor = target.anchor.as_deref().unwrap_or_default();
    match variables.destination().or_else(|| variables.source()) {
        Some(current) if *current == target.destination && !anchor.is_empty() => {
            Ok(anchor.to_string())
        }
        Some(current) => Ok(format!("{}{anchor}", current.link_to(&target.destination))),
        None => Ok(format!("{}{anchor}", target.destination)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::{parser::parse, splitter::split, tokenizer::tokenize},
        location::ProjectLocation,
        paths::DocPath,
        variables::{IdTarget, Variable, DESTINATION_KEY},
    };
    use test_log::test;

    fn render(source: &str, variables: &mut VariableTable) -> Result<String, DoculispError> {
        let location = ProjectLocation::new("/docs/readme.md", 1, 1)?;
        let doc = parse(tokenize(split(source, &location)?)?, variables)?;
        write_ast(&doc, variables)
    }

    fn body(output: &str) -> &str {
        output
            .trim_end()
            .strip_prefix(GENERATED_MARKER)
            .and_then(|rest| rest.strip_suffix(GENERATED_MARKER))
            .map(str::trim)
            .unwrap_or(output)
    }

    #[test]
    fn test_empty_renders_nothing() {
        assert_eq!(write_ast(&Doculisp::Empty, &VariableTable::new()).unwrap(), "");
    }

    #[test]
    fn test_markers_wrap_output() {
        let output = render("<!-- (dl (# Hello)) -->", &mut VariableTable::new()).unwrap();
        assert_eq!(
            output,
            format!("{GENERATED_MARKER}\n\n## Hello ##\n\n{GENERATED_MARKER}\n")
        );
    }

    #[test]
    fn test_title_and_subtitle() {
        let output = render(
            "<!-- (dl (section-meta (title Doc) (subtitle Sub))) -->\nBody text",
            &mut VariableTable::new(),
        )
        .unwrap();
        assert_eq!(body(&output), "# Doc #\n\n### Sub ###\n\nBody text");
    }

    #[test]
    fn test_text_on_one_line_is_joined() {
        let output = render(
            "Before <!-- a comment --> after\nnext line",
            &mut VariableTable::new(),
        )
        .unwrap();
        assert_eq!(body(&output), "Before  after\nnext line");
    }

    #[test]
    fn test_path_id_same_document() {
        let mut variables = VariableTable::new();
        variables.add_value(
            DESTINATION_KEY,
            Variable::Path(DocPath::new("/out/readme.md", "/")),
        );
        let output = render(
            "<!-- (dl (section-meta (title Doc) (id doc))) -->\nSee [here](<!-- (dl (get-path doc)) -->).",
            &mut variables,
        )
        .unwrap();
        assert!(body(&output).ends_with("See [here](#doc)."));
    }

    #[test]
    fn test_path_id_after_a_line_break_stays_in_its_paragraph() {
        let mut variables = VariableTable::new();
        variables.add_value(
            DESTINATION_KEY,
            Variable::Path(DocPath::new("/out/readme.md", "/")),
        );
        variables
            .register_id(
                "guide",
                IdTarget {
                    destination: DocPath::new("/out/guide.md", "/"),
                    anchor: None,
                },
            )
            .unwrap();
        let output = render(
            "First line of a paragraph.\nSee the [guide](<!-- (dl (get-path guide)) -->) for more.",
            &mut variables,
        )
        .unwrap();
        assert_eq!(
            body(&output),
            "First line of a paragraph.\nSee the [guide](./guide.md) for more."
        );
    }

    #[test]
    fn test_text_before_a_block_loses_trailing_spaces() {
        let output = render("text   <!-- (dl (# H)) -->", &mut VariableTable::new()).unwrap();
        assert_eq!(body(&output), "text\n\n## H ##");
    }

    #[test]
    fn test_path_id_other_document() {
        let mut variables = VariableTable::new();
        variables.add_value(
            DESTINATION_KEY,
            Variable::Path(DocPath::new("/out/docs/guide.md", "/")),
        );
        variables
            .register_id(
                "readme",
                IdTarget {
                    destination: DocPath::new("/out/README.md", "/"),
                    anchor: None,
                },
            )
            .unwrap();
        let output = render(
            "Back to [readme](<!-- (dl (get-path readme)) -->)",
            &mut variables,
        )
        .unwrap();
        assert_eq!(body(&output), "Back to [readme](../README.md)");
    }

    #[test]
    fn test_unknown_id_fails() {
        let err = render("<!-- (dl (get-path nowhere)) -->", &mut VariableTable::new())
            .unwrap_err();
        assert!(err.is_code());
        assert!(err.message().contains("nowhere"));
    }
}

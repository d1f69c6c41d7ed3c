//! Data carried between the pipeline stages.

use std::{fmt, str::FromStr};

use crate::{error::DoculispError, location::Location, paths::DocPath};

/// Output of the splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPart {
    /// Prose, code spans and code fences, verbatim.
    Text { text: String, location: Location },
    /// The inside of a `(dl ...)` block with the marker and the closing paren removed.
    LispBlock { text: String, location: Location },
}

impl DocumentPart {
    pub fn location(&self) -> &Location {
        match self {
            DocumentPart::Text { location, .. } | DocumentPart::LispBlock { location, .. } => {
                location
            }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DocumentPart::Text { text, .. } | DocumentPart::LispBlock { text, .. } => text,
        }
    }
}

/// Output of the tokenizer. An opening parenthesis never appears: it only marks that the next
/// run of characters is an [Token::Atom], whose location is the parenthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text { text: String, location: Location },
    Atom { text: String, location: Location },
    Parameter { text: String, location: Location },
    CloseParenthesis { location: Location },
}

impl Token {
    pub fn location(&self) -> &Location {
        match self {
            Token::Text { location, .. }
            | Token::Atom { location, .. }
            | Token::Parameter { location, .. }
            | Token::CloseParenthesis { location } => location,
        }
    }
}

/// How a table of contents renders its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletStyle {
    NoTable,
    Unlabeled,
    Labeled,
    Numbered,
    NumberedLabeled,
    Bulleted,
    BulletedLabeled,
}

impl BulletStyle {
    pub const ALL: [BulletStyle; 7] = [
        BulletStyle::NoTable,
        BulletStyle::Unlabeled,
        BulletStyle::Labeled,
        BulletStyle::Numbered,
        BulletStyle::NumberedLabeled,
        BulletStyle::Bulleted,
        BulletStyle::BulletedLabeled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BulletStyle::NoTable => "no-table",
            BulletStyle::Unlabeled => "unlabeled",
            BulletStyle::Labeled => "labeled",
            BulletStyle::Numbered => "numbered",
            BulletStyle::NumberedLabeled => "numbered-labeled",
            BulletStyle::Bulleted => "bulleted",
            BulletStyle::BulletedLabeled => "bulleted-labeled",
        }
    }

    pub fn is_labeled(&self) -> bool {
        matches!(
            self,
            BulletStyle::Labeled | BulletStyle::NumberedLabeled | BulletStyle::BulletedLabeled
        )
    }
}

impl fmt::Display for BulletStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulletStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BulletStyle::ALL
            .iter()
            .find(|style| style.as_str() == s.trim())
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unrecognized table of contents style '{}'; expected one of: {}",
                    s.trim(),
                    BulletStyle::ALL
                        .iter()
                        .map(BulletStyle::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// One node of a document's directive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoculispPart {
    /// Literal text.
    Write {
        value: String,
        document_order: Location,
    },
    Title {
        title: String,
        /// The rendered heading line, e.g. `# My Title #`.
        label: String,
        /// `#`-prefixed anchor used by tables of contents and ids.
        ref_link: String,
        subtitle: Option<String>,
        document_order: Location,
    },
    Header {
        depth_count: usize,
        text: String,
        document_order: Location,
    },
    /// Where included sections are rendered.
    ContentLocation { document_order: Location },
    TableOfContents {
        label: Option<String>,
        bullet_style: BulletStyle,
        document_order: Location,
    },
    /// A link target for a project-wide id.
    PathId {
        id: String,
        document_order: Location,
    },
}

impl DoculispPart {
    pub fn document_order(&self) -> &Location {
        match self {
            DoculispPart::Write { document_order, .. }
            | DoculispPart::Title { document_order, .. }
            | DoculispPart::Header { document_order, .. }
            | DoculispPart::ContentLocation { document_order }
            | DoculispPart::TableOfContents { document_order, .. }
            | DoculispPart::PathId { document_order, .. } => document_order,
        }
    }

    /// Inline parts flow into the surrounding text instead of standing as their own block.
    pub fn is_inline(&self) -> bool {
        matches!(self, DoculispPart::Write { .. } | DoculispPart::PathId { .. })
    }
}

/// A child include, pending until the resolver fills in `document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Load {
    pub document_order: Location,
    pub path: DocPath,
    /// The include entry's atom with hyphens turned into spaces.
    pub section_label: String,
    pub document: Option<SectionWriter>,
}

/// The parsed result of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionWriter {
    pub document_order: Location,
    pub doculisp: Vec<DoculispPart>,
    pub include: Vec<Load>,
}

impl SectionWriter {
    pub fn title(&self) -> Option<(&str, &str)> {
        self.doculisp.iter().find_map(|part| match part {
            DoculispPart::Title {
                title, ref_link, ..
            } => Some((title.as_str(), ref_link.as_str())),
            _ => None,
        })
    }

    pub fn has_content_location(&self) -> bool {
        self.doculisp
            .iter()
            .any(|part| matches!(part, DoculispPart::ContentLocation { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doculisp {
    /// The document produced no tokens at all.
    Empty,
    Section(SectionWriter),
}

impl Doculisp {
    pub fn is_empty(&self) -> bool {
        matches!(self, Doculisp::Empty)
    }

    pub fn section(&self) -> Option<&SectionWriter> {
        match self {
            Doculisp::Empty => None,
            Doculisp::Section(section) => Some(section),
        }
    }

    pub fn into_section(self) -> Option<SectionWriter> {
        match self {
            Doculisp::Empty => None,
            Doculisp::Section(section) => Some(section),
        }
    }
}

/// Parse a bullet style, failing at `location` when it isn't one of the seven known styles.
pub fn bullet_style_at(value: &str, location: &Location) -> Result<BulletStyle, DoculispError> {
    value
        .parse()
        .map_err(|message: String| DoculispError::code(message, location))
}

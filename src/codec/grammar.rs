//! Declarative form grammars and the generic form tree they validate.
//!
//! Parsing happens in two steps. [build_items] folds a token stream into untyped [Form]s,
//! enforcing only what every directive language shares (balanced parens, at most one
//! parameter, parameter before sub-forms). A [Grammar] then checks the tree against a table of
//! [FormRule]s: which forms may appear where, how often, and whether they take a parameter.
//! Turning validated forms into typed nodes is left to the caller.

use once_cell::sync::Lazy;

use crate::{codec::ast::Token, error::DoculispError, location::Location};

/// The grammar of directive blocks in `.md` and `.dlisp` sources.
pub static DOCULISP_GRAMMAR: Lazy<Grammar> = Lazy::new(Grammar::doculisp);

/// The grammar of `.dlproj` project descriptors.
pub static PROJECT_GRAMMAR: Lazy<Grammar> = Lazy::new(Grammar::project);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub text: String,
    pub location: Location,
}

/// An untyped `(atom parameter? children*)` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub atom: String,
    pub location: Location,
    pub parameter: Option<Parameter>,
    pub children: Vec<Form>,
}

impl Form {
    fn new(atom: String, location: Location) -> Self {
        Form {
            atom,
            location,
            parameter: None,
            children: Vec::new(),
        }
    }

    pub fn parameter_text(&self) -> Option<&str> {
        self.parameter.as_ref().map(|p| p.text.as_str())
    }

    /// Location of the parameter, or of the form itself when there is none.
    pub fn parameter_location(&self) -> &Location {
        self.parameter
            .as_ref()
            .map(|p| &p.location)
            .unwrap_or(&self.location)
    }

    pub fn child(&self, atom: &str) -> Option<&Form> {
        self.children.iter().find(|child| child.atom == atom)
    }

    pub fn children_named<'a>(&'a self, atom: &'a str) -> impl Iterator<Item = &'a Form> + 'a {
        self.children.iter().filter(move |child| child.atom == atom)
    }
}

/// A root-level item: either literal text or a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Text { text: String, location: Location },
    Form(Form),
}

/// Fold tokens into root-level [Item]s.
pub fn build_items(tokens: Vec<Token>) -> Result<Vec<Item>, DoculispError> {
    let mut items = Vec::new();
    let mut stack: Vec<Form> = Vec::new();

    for token in tokens {
        match token {
            Token::Text { text, location } => {
                if let Some(open) = stack.last() {
                    return Err(DoculispError::code(
                        format!("`{}` not closed before text", open.atom),
                        &open.location,
                    ));
                }
                items.push(Item::Text { text, location });
            }
            Token::Atom { text, location } => stack.push(Form::new(text, location)),
            Token::Parameter { text, location } => {
                let Some(form) = stack.last_mut() else {
                    return Err(DoculispError::code(
                        "Parameter found outside of a form",
                        &location,
                    ));
                };
                if !form.children.is_empty() {
                    return Err(DoculispError::code(
                        format!("The parameter of `{}` must come before its sub-forms", form.atom),
                        &location,
                    ));
                }
                if form.parameter.is_some() {
                    return Err(DoculispError::code(
                        format!("`{}` takes at most one parameter", form.atom),
                        &location,
                    ));
                }
                form.parameter = Some(Parameter { text, location });
            }
            Token::CloseParenthesis { location } => {
                let Some(form) = stack.pop() else {
                    return Err(DoculispError::code(
                        "Unmatched closing parenthesis",
                        &location,
                    ));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(form),
                    None => items.push(Item::Form(form)),
                }
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DoculispError::code(
            format!("`{}` not closed", open.atom),
            &open.location,
        ));
    }
    Ok(items)
}

/// How a rule recognizes a form's atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Exact(&'static str),
    /// One or more `#`.
    Header,
    /// Any atom at all; used for include entries, whose atom is a free-text label.
    AnyLabel,
}

impl Matcher {
    pub fn matches(&self, atom: &str) -> bool {
        match self {
            Matcher::Exact(name) => *name == atom,
            Matcher::Header => !atom.is_empty() && atom.chars().all(|c| c == '#'),
            Matcher::AnyLabel => !atom.is_empty(),
        }
    }
}

/// Whether a form takes a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Never,
    Optional,
    Required,
}

/// How many times a form may appear inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    Once,
    AtMostOnce,
    Many,
    AtLeastOnce,
}

impl Occurs {
    fn is_mandatory(&self) -> bool {
        matches!(self, Occurs::Once | Occurs::AtLeastOnce)
    }

    fn is_single(&self) -> bool {
        matches!(self, Occurs::Once | Occurs::AtMostOnce)
    }
}

#[derive(Debug, Clone)]
pub struct FormRule {
    /// Used in messages.
    pub name: &'static str,
    pub matcher: Matcher,
    pub parameter: Arity,
    pub children: Vec<(FormRule, Occurs)>,
}

impl FormRule {
    fn exact(name: &'static str, parameter: Arity) -> Self {
        FormRule {
            name,
            matcher: Matcher::Exact(name),
            parameter,
            children: Vec::new(),
        }
    }

    fn with(mut self, child: FormRule, occurs: Occurs) -> Self {
        self.children.push((child, occurs));
        self
    }

    fn validate(&self, form: &Form) -> Result<(), DoculispError> {
        match (self.parameter, &form.parameter) {
            (Arity::Required, None) => {
                return Err(DoculispError::code(
                    format!("`{}` requires a parameter", form.atom),
                    &form.location,
                ))
            }
            (Arity::Never, Some(parameter)) => {
                return Err(DoculispError::code(
                    format!("`{}` does not take a parameter", form.atom),
                    &parameter.location,
                ))
            }
            _ => {}
        }
        if self.children.is_empty() {
            if let Some(child) = form.children.first() {
                return Err(DoculispError::code(
                    format!("`{}` cannot contain sub-forms", form.atom),
                    &child.location,
                ));
            }
            return Ok(());
        }
        let children: Vec<&Form> = form.children.iter().collect();
        validate_children(&form.atom, &form.location, &children, &self.children)
    }
}

fn validate_children(
    parent: &str,
    parent_location: &Location,
    children: &[&Form],
    rules: &[(FormRule, Occurs)],
) -> Result<(), DoculispError> {
    let mut counts = vec![0usize; rules.len()];
    for child in children {
        let Some(idx) = rules
            .iter()
            .position(|(rule, _)| rule.matcher.matches(&child.atom))
        else {
            return Err(DoculispError::code(
                format!("`{}` is not valid inside {parent}", child.atom),
                &child.location,
            ));
        };
        let (rule, occurs) = &rules[idx];
        counts[idx] += 1;
        if occurs.is_single() && counts[idx] > 1 {
            return Err(DoculispError::code(
                format!("{parent} may only contain one `{}`", rule.name),
                &child.location,
            ));
        }
        rule.validate(child)?;
    }
    for ((rule, occurs), count) in rules.iter().zip(counts) {
        if occurs.is_mandatory() && count == 0 {
            return Err(DoculispError::code(
                format!("{parent} requires `{}`", rule.name),
                parent_location,
            ));
        }
    }
    Ok(())
}

/// A directive language: the forms allowed at its root and whether literal text may appear
/// between them.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub name: &'static str,
    pub allows_text: bool,
    pub root: Vec<(FormRule, Occurs)>,
}

impl Grammar {
    fn doculisp() -> Self {
        let section_meta = FormRule::exact("section-meta", Arity::Never)
            .with(FormRule::exact("title", Arity::Required), Occurs::Once)
            .with(FormRule::exact("subtitle", Arity::Required), Occurs::AtMostOnce)
            .with(FormRule::exact("ref-link", Arity::Required), Occurs::AtMostOnce)
            .with(FormRule::exact("author", Arity::Required), Occurs::Many)
            .with(FormRule::exact("id", Arity::Required), Occurs::AtMostOnce)
            .with(
                FormRule::exact("include", Arity::Never).with(
                    FormRule {
                        name: "include entry",
                        matcher: Matcher::AnyLabel,
                        parameter: Arity::Required,
                        children: Vec::new(),
                    },
                    Occurs::Many,
                ),
                Occurs::AtMostOnce,
            );
        let content = FormRule::exact("content", Arity::Never).with(
            FormRule::exact("toc", Arity::Optional)
                .with(FormRule::exact("label", Arity::Required), Occurs::AtMostOnce)
                .with(FormRule::exact("style", Arity::Required), Occurs::AtMostOnce),
            Occurs::AtMostOnce,
        );
        let header = FormRule {
            name: "#",
            matcher: Matcher::Header,
            parameter: Arity::Required,
            children: Vec::new(),
        };
        Grammar {
            name: "the document root",
            allows_text: true,
            root: vec![
                (section_meta, Occurs::AtMostOnce),
                (content, Occurs::AtMostOnce),
                (header, Occurs::Many),
                (FormRule::exact("get-path", Arity::Required), Occurs::Many),
            ],
        }
    }

    fn project() -> Self {
        let document = FormRule::exact("document", Arity::Never)
            .with(FormRule::exact("source", Arity::Required), Occurs::Once)
            .with(FormRule::exact("output", Arity::Required), Occurs::Once)
            .with(FormRule::exact("id", Arity::Required), Occurs::AtMostOnce);
        Grammar {
            name: "the project root",
            allows_text: false,
            root: vec![(
                FormRule::exact("documents", Arity::Never).with(document, Occurs::AtLeastOnce),
                Occurs::Once,
            )],
        }
    }

    /// Check `items` against this grammar. `start` locates failures that concern the document
    /// as a whole, such as a missing mandatory root form.
    pub fn validate(&self, items: &[Item], start: &Location) -> Result<(), DoculispError> {
        let mut forms = Vec::new();
        for item in items {
            match item {
                Item::Form(form) => forms.push(form),
                Item::Text { text, location } => {
                    if !self.allows_text && !text.trim().is_empty() {
                        return Err(DoculispError::code(
                            format!("Text is not allowed in {}", self.name),
                            location,
                        ));
                    }
                }
            }
        }
        validate_children(self.name, start, &forms, &self.root)
    }
}

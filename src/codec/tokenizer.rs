//! Turn directive blocks into atoms, parameters and close-parens.

use crate::{
    codec::{
        ast::{DocumentPart, Token},
        cursor::Cursor,
    },
    error::DoculispError,
    location::Location,
};

/// Tokenize split document parts. Text parts pass through unchanged; each directive block is
/// rescanned from its own starting location.
pub fn tokenize(parts: Vec<DocumentPart>) -> Result<Vec<Token>, DoculispError> {
    let mut tokens = Vec::new();
    for part in parts {
        match part {
            DocumentPart::Text { text, location } => tokens.push(Token::Text { text, location }),
            DocumentPart::LispBlock { text, location } => {
                tokenize_block(&text, &location, &mut tokens)?
            }
        }
    }
    tracing::trace!("Tokenized {} token(s)", tokens.len());
    Ok(tokens)
}

fn tokenize_block(
    text: &str,
    start: &Location,
    tokens: &mut Vec<Token>,
) -> Result<(), DoculispError> {
    let mut cursor = Cursor::new(text, start);
    // Location of a '(' whose atom hasn't been read yet.
    let mut pending_open: Option<Location> = None;

    while let Some(c) = cursor.peek() {
        let here = cursor.location();
        if c.is_whitespace() {
            cursor.bump();
        } else if cursor.starts_with("(*") {
            skip_comment(&mut cursor)?;
        } else if c == '(' {
            if let Some(open) = pending_open {
                return Err(DoculispError::code("Expected an atom after '('", &open));
            }
            pending_open = Some(here);
            cursor.bump();
        } else if c == ')' {
            if let Some(open) = pending_open {
                return Err(DoculispError::code("Empty parenthesis", &open));
            }
            tokens.push(Token::CloseParenthesis { location: here });
            cursor.bump();
        } else if let Some(open) = pending_open.take() {
            tokens.push(Token::Atom {
                text: read_atom(&mut cursor),
                location: open,
            });
        } else {
            tokens.push(Token::Parameter {
                text: read_parameter(&mut cursor),
                location: here,
            });
        }
    }
    if let Some(open) = pending_open {
        return Err(DoculispError::code("Expected an atom after '('", &open));
    }
    Ok(())
}

fn read_atom(cursor: &mut Cursor<'_>) -> String {
    let mut atom = String::new();
    while let Some(c) = cursor.peek() {
        if c.is_whitespace() || c == '(' || c == ')' {
            break;
        }
        atom.push(c);
        cursor.bump();
    }
    atom
}

/// Read up to the next unescaped parenthesis. Parameters may span lines; the result is trimmed
/// and `\(`, `\)` and `\\` are unescaped.
fn read_parameter(cursor: &mut Cursor<'_>) -> String {
    let mut value = String::new();
    while let Some(c) = cursor.peek() {
        match c {
            '(' | ')' => break,
            '\\' => {
                cursor.bump();
                match cursor.bump() {
                    Some(escaped @ ('(' | ')' | '\\')) => value.push(escaped),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => value.push('\\'),
                }
            }
            c => {
                value.push(c);
                cursor.bump();
            }
        }
    }
    value.trim_end().to_string()
}

/// Skip a `(* ... )` comment form, honoring nested parens.
fn skip_comment(cursor: &mut Cursor<'_>) -> Result<(), DoculispError> {
    let opener = cursor.location();
    cursor.bump_n(2);
    let mut depth = 1usize;
    while depth > 0 {
        match cursor.bump() {
            None => return Err(DoculispError::code("Comment block not closed", &opener)),
            Some('\\') => {
                cursor.bump();
            }
            Some('(') => depth += 1,
            Some(')') => depth -= 1,
            Some(_) => {}
        }
    }
    Ok(())
}

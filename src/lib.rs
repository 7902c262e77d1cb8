#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::{
    ast::ast::Ast,
    errors::errors::{Error, ErrorTip},
};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod xml;

extern crate regex;

/// A location in the source text. Lines and columns start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

/// The source range a token, node or diagnostic originates from.
#[derive(Debug, Clone)]
pub struct Trace {
    pub file: Rc<String>,
    pub start: Position,
    pub end: Position,
}

impl Trace {
    pub fn new(file: Rc<String>, start: Position, end: Position) -> Self {
        Trace { file, start, end }
    }

    pub fn null() -> Self {
        Trace {
            file: Rc::new(String::from("<null>")),
            start: Position::start(),
            end: Position::start(),
        }
    }

    /// Returns a trace covering `self` through the end of `other`.
    pub fn to(&self, other: &Trace) -> Trace {
        Trace {
            file: Rc::clone(&self.file),
            start: self.start,
            end: other.end,
        }
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.start.line, self.start.column)
    }
}

/// Lexes and parses `source` in one go.
pub fn parse_source(source: &str, file: Option<String>) -> Result<Ast, Error> {
    let tokens = lexer::lexer::tokenize(source.to_string(), file)?;
    parser::parser::parse(tokens.into_tokens())
}

pub fn get_line(source: &str, line: u32) -> Option<&str> {
    source
        .split_inclusive('\n')
        .nth(line.saturating_sub(1) as usize)
        .map(|text| text.trim_end_matches(['\n', '\r']))
}


/// Formats a diagnostic against the in-memory source it was raised for.
///
/// ```text
/// SyntaxError: message (tip)
/// -> final.lang:20:9
///    |
/// 20 | let a = #;
///    | --------^
/// ```
pub fn render_error(error: &Error, source: &str) -> String {
    let trace = error.get_trace();
    let line_text = get_line(source, trace.start.line).unwrap_or("");

    let line_string = trace.start.line.to_string();
    let padding = line_string.len() + 2;

    let mut output = match error.get_tip() {
        ErrorTip::None => format!("{}: {}\n", error.get_category(), error.message()),
        tip => format!(
            "{}: {} ({})\n",
            error.get_category(),
            error.message(),
            tip
        ),
    };
    output.push_str(&format!("-> {}\n", trace));
    output.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = (trace.start.column as usize)
        .saturating_sub(removed_whitespace)
        .max(1);
    output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    output
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let start = string.chars().take_while(|c| *c == ' ').count();
    (&string[start..], start)
}

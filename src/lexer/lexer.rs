use std::{collections::HashSet, ops::Deref, rc::Rc};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Trace, INTERNAL_FAULT, MK_CONSTRUCT_HANDLER, MK_TOKEN,
};

use super::{
    operators::{resolve_fixity, OPERATORS},
    tokens::{Token, TokenKind, RESERVED_LOOKUP},
};

pub type RegexHandler = fn(&mut Lexer, &str) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

const CONSTRUCT_CHARS: &str = ";:?()[]";

lazy_static! {
    static ref OPERATOR_CHARS: HashSet<char> = OPERATORS
        .lexed_symbols()
        .iter()
        .flat_map(|symbol| symbol.chars())
        .collect();

    static ref PATTERNS: Vec<RegexPattern> = {
        let operator_class = OPERATOR_CHARS
            .iter()
            .map(|c| regex::escape(&c.to_string()))
            .collect::<String>();
        let operator_alternation = OPERATORS
            .lexed_symbols()
            .iter()
            .map(|symbol| regex::escape(symbol))
            .collect::<Vec<_>>()
            .join("|");

        vec![
            pattern(r"\s+", skip_handler),
            pattern(r"//[^\n]*", skip_handler),
            pattern(r"/\*", block_comment_handler),
            pattern(r"[0-9]", number_handler),
            pattern("\"", string_handler),
            pattern(r"\\", escape_handler),
            pattern(";", MK_CONSTRUCT_HANDLER!(TokenKind::Semicolon, ";")),
            pattern(":", MK_CONSTRUCT_HANDLER!(TokenKind::Colon, ":")),
            pattern(r"\?", MK_CONSTRUCT_HANDLER!(TokenKind::Question, "?")),
            pattern(r"\(", MK_CONSTRUCT_HANDLER!(TokenKind::OpenParen, "(")),
            pattern(r"\)", MK_CONSTRUCT_HANDLER!(TokenKind::CloseParen, ")")),
            pattern(r"\[", MK_CONSTRUCT_HANDLER!(TokenKind::OpenBracket, "[")),
            pattern(r"\]", MK_CONSTRUCT_HANDLER!(TokenKind::CloseBracket, "]")),
            pattern("=>", MK_CONSTRUCT_HANDLER!(TokenKind::FatArrow, "=>")),
            pattern(&operator_alternation, operator_handler),
            pattern(
                &format!(r#"[^\s;:?()\[\]"\\{}]+"#, operator_class),
                symbol_handler,
            ),
        ]
    };
}

fn pattern(source: &str, handler: RegexHandler) -> RegexPattern {
    let regex = Regex::new(&format!("^(?:{})", source)).unwrap_or_else(|error| {
        INTERNAL_FAULT!("invalid lexer pattern", "pattern" => source, "error" => error)
    });

    RegexPattern { regex, handler }
}

fn is_identifier_char(c: char) -> bool {
    !c.is_whitespace()
        && !CONSTRUCT_CHARS.contains(c)
        && !OPERATOR_CHARS.contains(&c)
        && c != '"'
        && c != '\\'
}

/// Lexer output: the tokens, ending with `EOF`, and the number of source lines.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    line_count: u32,
}

impl TokenStream {
    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl Deref for TokenStream {
    type Target = [Token];

    fn deref(&self) -> &Self::Target {
        &self.tokens
    }
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
    /// Open `(` and `[` waiting for their closing partner.
    delimiters: Vec<(char, Trace)>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("<input>"))
        };

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            line: 1,
            column: 1,
            file: file_name,
            delimiters: vec![],
        }
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.pos as u32,
            line: self.line,
            column: self.column,
        }
    }

    pub fn trace_from(&self, start: Position) -> Trace {
        Trace::new(Rc::clone(&self.file), start, self.position())
    }

    pub fn error_here(&self, error: ErrorImpl) -> Error {
        let here = self.position();
        Error::new(error, Trace::new(Rc::clone(&self.file), here, here))
    }

    /// Reports `error` at the byte `offset` past the current position. The
    /// lexer stops at the first error, so it is left at that byte.
    pub fn error_at_offset(&mut self, offset: usize, error: ErrorImpl) -> Error {
        self.advance_n(offset);
        self.error_here(error)
    }

    /// Moves `n` bytes forward, keeping line and column in step.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for c in self.source[self.pos..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Pushes a construct token and tracks bracket balance.
    pub fn push_construct(&mut self, kind: TokenKind, value: &'static str) -> Result<(), Error> {
        let start = self.position();
        self.advance_n(value.len());
        let trace = self.trace_from(start);

        match value {
            "(" => self.delimiters.push(('(', trace.clone())),
            "[" => self.delimiters.push(('[', trace.clone())),
            ")" | "]" => {
                let expected = if value == ")" { '(' } else { '[' };
                match self.delimiters.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => {
                        let delimiter = if value == ")" { ')' } else { ']' };
                        return Err(Error::new(ErrorImpl::UnmatchedDelimiter { delimiter }, trace));
                    }
                }
            }
            _ => {}
        }

        self.push(MK_TOKEN!(kind, String::from(value), trace));
        Ok(())
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn line_count(&self) -> u32 {
        self.line
    }
}

fn skip_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.advance_n(matched.len());
    Ok(())
}

fn block_comment_handler(lexer: &mut Lexer, _matched: &str) -> Result<(), Error> {
    match lexer.remainder()[2..].find("*/") {
        Some(end) => {
            lexer.advance_n(end + 4);
            Ok(())
        }
        None => Err(lexer.error_here(ErrorImpl::UnterminatedComment)),
    }
}

fn escape_handler(lexer: &mut Lexer, _matched: &str) -> Result<(), Error> {
    Err(lexer.error_here(ErrorImpl::ExtraneousEscape))
}

fn number_handler(lexer: &mut Lexer, _matched: &str) -> Result<(), Error> {
    let start = lexer.position();
    let (length, kind, value) = match scan_number(lexer.remainder()) {
        Ok(scanned) => scanned,
        Err((offset, error)) => return Err(lexer.error_at_offset(offset, error)),
    };

    lexer.advance_n(length);
    let trace = lexer.trace_from(start);
    lexer.push(MK_TOKEN!(kind, value, trace));
    Ok(())
}

/// Reads a numeric literal from the start of `rest`.
///
/// Returns the consumed length, the literal kind and its payload. Integers
/// of any radix are converted to their decimal spelling. Errors carry the
/// byte offset of the offending character.
fn scan_number(rest: &str) -> Result<(usize, TokenKind, String), (usize, ErrorImpl)> {
    let mut radix = 10;
    let mut length = 0;

    if rest.starts_with('0') {
        match rest[1..].chars().next() {
            Some(c) if c.is_ascii_digit() => return Err((1, ErrorImpl::LeadingZero)),
            Some(c) if is_identifier_char(c) => {
                radix = match c {
                    'x' => 16,
                    'o' => 8,
                    'b' => 2,
                    _ => return Err((1, ErrorImpl::InvalidRadix { radix: c })),
                };
                length = 2;
            }
            _ => {}
        }
    }

    let digits_start = length;
    let mut seen_point = false;

    for c in rest[digits_start..].chars() {
        if c.is_digit(radix) {
            length += 1;
        } else if c == '.' {
            let reason = if radix != 10 {
                "floats must be decimal"
            } else if seen_point {
                "multiple decimal points"
            } else {
                seen_point = true;
                length += 1;
                continue;
            };
            return Err((
                length,
                ErrorImpl::MalformedNumber {
                    token: rest[..length + 1].to_string(),
                    reason: reason.to_string(),
                },
            ));
        } else if is_identifier_char(c) {
            return Err((length, ErrorImpl::InvalidCharacterInNumber { character: c }));
        } else {
            break;
        }
    }

    let text = &rest[..length];
    let digits = &rest[digits_start..length];

    if digits.is_empty() {
        return Err((
            length,
            ErrorImpl::MalformedNumber {
                token: text.to_string(),
                reason: String::from("missing digits after radix prefix"),
            },
        ));
    }

    if digits.ends_with('.') {
        return Err((
            length,
            ErrorImpl::MalformedNumber {
                token: text.to_string(),
                reason: String::from("missing digits after decimal point"),
            },
        ));
    }

    if seen_point {
        digits
            .parse::<f64>()
            .map_err(|_| {
                (
                    0,
                    ErrorImpl::NumberParseError {
                        token: text.to_string(),
                    },
                )
            })?;
        Ok((length, TokenKind::Float, digits.to_string()))
    } else {
        let value =
            i64::from_str_radix(digits, radix).map_err(|_| {
                (
                    0,
                    ErrorImpl::NumberParseError {
                        token: text.to_string(),
                    },
                )
            })?;
        Ok((length, TokenKind::Integer, value.to_string()))
    }
}

fn string_handler(lexer: &mut Lexer, _matched: &str) -> Result<(), Error> {
    let start = lexer.position();
    let (length, value) = match scan_string(lexer.remainder()) {
        Ok(scanned) => scanned,
        Err((offset, error)) => return Err(lexer.error_at_offset(offset, error)),
    };

    lexer.advance_n(length);
    let trace = lexer.trace_from(start);
    lexer.push(MK_TOKEN!(TokenKind::String, value, trace));
    Ok(())
}

/// Reads a string literal, quotes included, from the start of `rest` and
/// decodes its escape sequences. A bad escape is reported at its backslash,
/// an unterminated string at the opening quote.
fn scan_string(rest: &str) -> Result<(usize, String), (usize, ErrorImpl)> {
    let mut result = String::new();
    let mut chars = rest.char_indices().skip(1).peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '"' => return Ok((i + 1, result)),
            '\\' => {
                let backslash = i;
                let Some((_, escape)) = chars.next() else {
                    break;
                };

                let decoded = match escape {
                    'a' => '\x07',
                    'b' => '\x08',
                    'f' => '\x0C',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'v' => '\x0B',
                    '\\' | '\'' | '"' | '?' => escape,
                    'x' => {
                        let mut hex = String::new();
                        while hex.len() < 2 {
                            match chars.peek() {
                                Some((_, c)) if c.is_ascii_hexdigit() => {
                                    hex.push(*c);
                                    chars.next();
                                }
                                _ => break,
                            }
                        }

                        if hex.len() != 2 {
                            return Err((
                                backslash,
                                ErrorImpl::InvalidEscape {
                                    sequence: format!("\\x{}", hex),
                                },
                            ));
                        }

                        // Two hex digits always fit in a byte.
                        char::from(u8::from_str_radix(&hex, 16).unwrap_or_default())
                    }
                    '0'..='7' => {
                        let mut octal = String::from(escape);
                        while octal.len() < 3 {
                            match chars.peek() {
                                Some((_, c)) if ('0'..='7').contains(c) => {
                                    octal.push(*c);
                                    chars.next();
                                }
                                _ => break,
                            }
                        }

                        match u8::from_str_radix(&octal, 8) {
                            Ok(byte) => char::from(byte),
                            Err(_) => {
                                return Err((
                                    backslash,
                                    ErrorImpl::InvalidEscape {
                                        sequence: format!("\\{}", octal),
                                    },
                                ))
                            }
                        }
                    }
                    other => {
                        return Err((
                            backslash,
                            ErrorImpl::InvalidEscape {
                                sequence: format!("\\{}", other),
                            },
                        ))
                    }
                };

                result.push(decoded);
            }
            _ => result.push(ch),
        }
    }

    Err((0, ErrorImpl::UnterminatedString))
}

fn operator_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let operator = resolve_fixity(matched, lexer.tokens.last());

    let start = lexer.position();
    lexer.advance_n(matched.len());
    let trace = lexer.trace_from(start);
    lexer.push(MK_TOKEN!(TokenKind::Operator, matched.to_string(), trace, operator));
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let kind = match matched {
        "true" | "false" => TokenKind::Boolean,
        _ => RESERVED_LOOKUP
            .get(matched)
            .copied()
            .unwrap_or(TokenKind::Identifier),
    };

    let start = lexer.position();
    lexer.advance_n(matched.len());
    let trace = lexer.trace_from(start);
    lexer.push(MK_TOKEN!(kind, matched.to_string(), trace));
    Ok(())
}

/// Converts `source` into tokens, stopping at the first error.
///
/// # Arguments
///
/// * `source` - The program text
/// * `file` - Name used in traces, `<input>` when absent
pub fn tokenize(source: String, file: Option<String>) -> Result<TokenStream, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let mut matched = false;

        for pattern in PATTERNS.iter() {
            let Some(found) = pattern.regex.find(lex.remainder()) else {
                continue;
            };

            let text = found.as_str().to_string();
            (pattern.handler)(&mut lex, &text)?;
            matched = true;
            break;
        }

        if !matched {
            let token = lex.remainder().chars().next().unwrap_or_default().to_string();
            return Err(lex.error_here(ErrorImpl::UnrecognisedToken { token }));
        }
    }

    if let Some((open, trace)) = lex.delimiters.pop() {
        return Err(Error::new(
            ErrorImpl::UnmatchedDelimiter { delimiter: open },
            trace,
        ));
    }

    let end = lex.position();
    let trace = lex.trace_from(end);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::new(), trace));

    debug!(
        file = %lex.file,
        tokens = lex.tokens.len(),
        lines = lex.line,
        "tokenized source"
    );

    Ok(TokenStream {
        line_count: lex.line_count(),
        tokens: lex.tokens,
    })
}

use std::fmt::Display;

use thiserror::Error;

use crate::Trace;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    trace: Trace,
}

/// Short label grouping diagnostics by the kind of mistake in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Reference,
    Type,
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "SyntaxError"),
            ErrorCategory::Reference => write!(f, "ReferenceError"),
            ErrorCategory::Type => write!(f, "TypeError"),
        }
    }
}

impl Error {
    pub fn new(error_impl: ErrorImpl, trace: Trace) -> Self {
        Error {
            internal_error: error_impl,
            trace,
        }
    }

    pub fn get_trace(&self) -> &Trace {
        &self.trace
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn get_category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::VariableAlreadyDeclared { .. }
            | ErrorImpl::FunctionAlreadyDeclared { .. }
            | ErrorImpl::TypeAlreadyDeclared { .. }
            | ErrorImpl::VariableNotDeclared { .. } => ErrorCategory::Reference,
            ErrorImpl::TypeMatchError { .. } => ErrorCategory::Type,
            _ => ErrorCategory::Syntax,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::InvalidRadix { .. } => "InvalidRadix",
            ErrorImpl::LeadingZero => "LeadingZero",
            ErrorImpl::MalformedNumber { .. } => "MalformedNumber",
            ErrorImpl::InvalidCharacterInNumber { .. } => "InvalidCharacterInNumber",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::InvalidEscape { .. } => "InvalidEscape",
            ErrorImpl::ExtraneousEscape => "ExtraneousEscape",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::UnmatchedDelimiter { .. } => "UnmatchedDelimiter",
            ErrorImpl::BreakOutsideLoop => "BreakOutsideLoop",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::TypeAlreadyDeclared { .. } => "TypeAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { expected, .. } if expected == "`;`" => {
                ErrorTip::Suggestion(String::from("did you miss a semicolon?"))
            }
            ErrorImpl::UnexpectedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedTokenDetailed { .. } => ErrorTip::None,
            ErrorImpl::InvalidRadix { .. } => ErrorTip::Suggestion(String::from(
                "Use `0x` for hexadecimal, `0o` for octal or `0b` for binary",
            )),
            ErrorImpl::LeadingZero => ErrorTip::Suggestion(String::from(
                "Remove the leading zero, or use `0o` for an octal literal",
            )),
            ErrorImpl::MalformedNumber { .. } => ErrorTip::None,
            ErrorImpl::InvalidCharacterInNumber { character } => ErrorTip::Suggestion(format!(
                "`{}` is not a digit of this literal's radix",
                character
            )),
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("Add a closing `\"`"))
            }
            ErrorImpl::InvalidEscape { .. } => ErrorTip::Suggestion(String::from(
                "Valid escapes are \\a \\b \\f \\n \\r \\t \\v \\\\ \\' \\\" \\?, \\xHH and \\NNN",
            )),
            ErrorImpl::ExtraneousEscape => ErrorTip::Suggestion(String::from(
                "Escape sequences are only valid inside string literals",
            )),
            ErrorImpl::UnterminatedComment => {
                ErrorTip::Suggestion(String::from("Add a closing `*/`"))
            }
            ErrorImpl::UnmatchedDelimiter { .. } => ErrorTip::None,
            ErrorImpl::BreakOutsideLoop => ErrorTip::Suggestion(String::from(
                "`break` can only be used inside a `for` or `while` body",
            )),
            ErrorImpl::VariableAlreadyDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` already declared", variable))
            }
            ErrorImpl::FunctionAlreadyDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already declared", function))
            }
            ErrorImpl::TypeAlreadyDeclared { type_ } => {
                ErrorTip::Suggestion(format!("Type `{}` already declared", type_))
            }
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.get_category(),
            self.internal_error,
            self.trace
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unexpected token ({message}): {token}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("invalid radix '{radix}'")]
    InvalidRadix { radix: char },
    #[error("numbers cannot begin with '0'")]
    LeadingZero,
    #[error("malformed number {token:?}: {reason}")]
    MalformedNumber { token: String, reason: String },
    #[error("invalid character in number: '{character}'")]
    InvalidCharacterInNumber { character: char },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid escape code {sequence:?}")]
    InvalidEscape { sequence: String },
    #[error("extraneous escape character outside of a string")]
    ExtraneousEscape,
    #[error("unterminated multi-line comment")]
    UnterminatedComment,
    #[error("unmatched delimiter '{delimiter}'")]
    UnmatchedDelimiter { delimiter: char },
    #[error("break statement outside of a loop")]
    BreakOutsideLoop,
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("type {type_:?} already declared")]
    TypeAlreadyDeclared { type_: String },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
}

use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::{Trace, INTERNAL_FAULT};

use super::operators::{Fixity, Operator, OperatorIndex, OperatorTable, OPERATORS};

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("define", TokenKind::Define);
        map.insert("function", TokenKind::Function);
        map.insert("return", TokenKind::Return);
        map.insert("do", TokenKind::Do);
        map.insert("end", TokenKind::End);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("for", TokenKind::For);
        map.insert("break", TokenKind::Break);
        map.insert("type", TokenKind::Type);
        map.insert("constructor", TokenKind::Constructor);
        map.insert("method", TokenKind::Method);
        map.insert("public", TokenKind::Public);
        map.insert("private", TokenKind::Private);
        map.insert("protected", TokenKind::Protected);
        map.insert("static", TokenKind::Static);
        map.insert("foreign", TokenKind::Foreign);
        map.insert("inherits", TokenKind::Inherits);
        map.insert("from", TokenKind::From);
        map.insert("void", TokenKind::Void);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    Float,
    String,
    Boolean,
    Identifier,
    Operator,

    // Constructs
    Semicolon,
    Colon,
    Question,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    FatArrow,

    // Reserved
    Define,
    Function,
    Return,
    Do,
    End,
    If,
    Else,
    While,
    For,
    Break,
    Type,
    Constructor,
    Method,
    Public,
    Private,
    Protected,
    Static,
    Foreign,
    Inherits,
    From,
    Void,
}

impl TokenKind {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer | TokenKind::Float | TokenKind::String | TokenKind::Boolean
        )
    }

    /// Literals and identifiers.
    pub fn is_terminal(&self) -> bool {
        self.is_literal() || *self == TokenKind::Identifier
    }

    /// Name of the built-in type a literal of this kind has.
    pub fn literal_type(&self) -> Option<&'static str> {
        match self {
            TokenKind::Integer => Some("Integer"),
            TokenKind::Float => Some("Float"),
            TokenKind::String => Some("String"),
            TokenKind::Boolean => Some("Boolean"),
            _ => None,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A lexical unit.
///
/// Literal and identifier tokens keep their payload in `value` (integers
/// are normalised to decimal). Operator tokens keep their symbol in `value`
/// and the resolved table entry in `operator`.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub operator: Option<OperatorIndex>,
    pub trace: Trace,
}

// Traces are not compared.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value && self.operator == other.operator
    }
}

impl Eq for Token {}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EOF => write!(f, "end of file"),
            TokenKind::String => write!(f, "{:?}", self.value),
            TokenKind::Operator => write!(f, "`{}`", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}

impl Token {
    /// Builds an operator token for a table entry, as the parser does for
    /// calls and subscripts.
    pub fn operator(index: OperatorIndex, trace: Trace) -> Self {
        Token {
            kind: TokenKind::Operator,
            value: OPERATORS.lookup_by_index(index).symbol.to_string(),
            operator: Some(index),
            trace,
        }
    }

    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// The table entry of an operator token. Faults on any other kind.
    pub fn get_operator(&self) -> &'static Operator {
        match self.operator {
            Some(index) => {
                let table: &'static OperatorTable = &OPERATORS;
                table.lookup_by_index(index)
            }
            None => INTERNAL_FAULT!(
                "token carries no operator",
                "kind" => self.kind,
                "value" => &self.value,
            ),
        }
    }

    pub fn as_operator(&self) -> Option<&'static Operator> {
        match self.kind {
            TokenKind::Operator => Some(self.get_operator()),
            _ => None,
        }
    }

    pub fn has_fixity(&self, fixity: Fixity) -> bool {
        self.as_operator().is_some_and(|op| op.fixity == fixity)
    }

    pub fn is_operator_named(&self, name: &str) -> bool {
        self.as_operator().is_some_and(|op| op.name == name)
    }

    pub fn debug(&self) -> String {
        match self.as_operator() {
            Some(operator) => format!("{} ({})", self.kind, operator.name),
            None if self.is_one_of_many(&[
                TokenKind::Integer,
                TokenKind::Float,
                TokenKind::String,
                TokenKind::Boolean,
                TokenKind::Identifier,
            ]) =>
            {
                format!("{} ({})", self.kind, self.value)
            }
            None => format!("{} ()", self.kind),
        }
    }
}

//! The operator table.
//!
//! Every operator the language knows about, with its precedence, name,
//! associativity, arity and fixity. The table is built once and never
//! mutated; tokens refer to entries by [`OperatorIndex`].

use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;

use crate::INTERNAL_FAULT;

use super::tokens::{Token, TokenKind};

pub const ASSIGNMENT: &str = "Assignment";
pub const COMMA: &str = "Comma";
pub const MEMBER_ACCESS: &str = "Member access";
pub const CALL: &str = "Call";
pub const SUBSCRIPT: &str = "Subscript";
pub const NO_OP: &str = "No-op";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Nullary,
    Unary,
    Binary,
    Ternary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Infix,
    Postfix,
    Circumfix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub symbol: &'static str,
    pub precedence: u8,
    pub name: &'static str,
    pub associativity: Associativity,
    pub arity: Arity,
    pub fixity: Fixity,
    /// Synthetic operators are built by the parser, never matched by the lexer.
    pub synthetic: bool,
}

impl Operator {
    const fn binary(symbol: &'static str, precedence: u8, name: &'static str) -> Self {
        Operator {
            symbol,
            precedence,
            name,
            associativity: Associativity::Left,
            arity: Arity::Binary,
            fixity: Fixity::Infix,
            synthetic: false,
        }
    }

    const fn assignment(symbol: &'static str, name: &'static str) -> Self {
        Operator {
            symbol,
            precedence: 1,
            name,
            associativity: Associativity::Right,
            arity: Arity::Binary,
            fixity: Fixity::Infix,
            synthetic: false,
        }
    }

    const fn prefix(symbol: &'static str, name: &'static str) -> Self {
        Operator {
            symbol,
            precedence: 12,
            name,
            associativity: Associativity::Right,
            arity: Arity::Unary,
            fixity: Fixity::Prefix,
            synthetic: false,
        }
    }

    const fn postfix(symbol: &'static str, name: &'static str) -> Self {
        Operator {
            symbol,
            precedence: 13,
            name,
            associativity: Associativity::Left,
            arity: Arity::Unary,
            fixity: Fixity::Postfix,
            synthetic: false,
        }
    }

    const fn synthetic(
        symbol: &'static str,
        precedence: u8,
        name: &'static str,
        associativity: Associativity,
        arity: Arity,
        fixity: Fixity,
    ) -> Self {
        Operator {
            symbol,
            precedence,
            name,
            associativity,
            arity,
            fixity,
            synthetic: true,
        }
    }

    pub fn is_binary_infix(&self) -> bool {
        self.arity == Arity::Binary && self.fixity == Fixity::Infix
    }

    pub fn is_unary(&self, fixity: Fixity) -> bool {
        self.arity == Arity::Unary && self.fixity == fixity
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} `{}` (precedence {})", self.name, self.symbol, self.precedence)
    }
}

/// Position of an operator inside [`OPERATORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatorIndex(usize);

impl OperatorIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

pub struct OperatorTable {
    operators: Vec<Operator>,
    by_name: HashMap<&'static str, OperatorIndex>,
    by_symbol: HashMap<&'static str, Vec<OperatorIndex>>,
}

impl OperatorTable {
    /// Builds a table, faulting if an entry is unary with infix fixity or
    /// if two entries share a name.
    pub fn new(operators: Vec<Operator>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_symbol: HashMap<&'static str, Vec<OperatorIndex>> = HashMap::new();

        for (i, operator) in operators.iter().enumerate() {
            if operator.arity == Arity::Unary && operator.fixity == Fixity::Infix {
                INTERNAL_FAULT!(
                    "unary operator declared with infix fixity",
                    "operator" => operator.name,
                    "symbol" => operator.symbol,
                );
            }

            if by_name.insert(operator.name, OperatorIndex(i)).is_some() {
                INTERNAL_FAULT!("duplicate operator name", "operator" => operator.name);
            }

            if !operator.synthetic {
                by_symbol.entry(operator.symbol).or_default().push(OperatorIndex(i));
            }
        }

        OperatorTable {
            operators,
            by_name,
            by_symbol,
        }
    }

    pub fn find(&self, name: &str) -> Option<OperatorIndex> {
        self.by_name.get(name).copied()
    }

    /// Returns the index of the operator called `name`, faulting if there is none.
    pub fn index_of(&self, name: &str) -> OperatorIndex {
        self.find(name)
            .unwrap_or_else(|| INTERNAL_FAULT!("no operator with this name", "name" => name))
    }

    pub fn lookup_by_name(&self, name: &str) -> &Operator {
        self.lookup_by_index(self.index_of(name))
    }

    pub fn lookup_by_index(&self, index: OperatorIndex) -> &Operator {
        self.operators.get(index.0).unwrap_or_else(|| {
            INTERNAL_FAULT!("operator index out of range", "index" => index.0)
        })
    }

    /// Lexable entries sharing `symbol`.
    pub fn candidates(&self, symbol: &str) -> &[OperatorIndex] {
        self.by_symbol.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every lexable symbol, longest first.
    pub fn lexed_symbols(&self) -> Vec<&'static str> {
        let mut symbols = self.by_symbol.keys().copied().collect::<Vec<_>>();
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        symbols
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

lazy_static! {
    pub static ref OPERATORS: OperatorTable = OperatorTable::new(vec![
        Operator::binary(",", 0, COMMA),

        Operator::assignment("=", ASSIGNMENT),
        Operator::assignment("+=", "Add assignment"),
        Operator::assignment("-=", "Subtract assignment"),
        Operator::assignment("*=", "Multiply assignment"),
        Operator::assignment("/=", "Divide assignment"),
        Operator::assignment("%=", "Modulo assignment"),
        Operator::assignment("<<=", "Left shift assignment"),
        Operator::assignment(">>=", "Right shift assignment"),
        Operator::assignment("&=", "Bitwise AND assignment"),
        Operator::assignment("^=", "Bitwise XOR assignment"),
        Operator::assignment("|=", "Bitwise OR assignment"),
        Operator::synthetic("?:", 1, "Conditional", Associativity::Right, Arity::Ternary, Fixity::Circumfix),

        Operator::binary("||", 2, "Logical OR"),
        Operator::binary("&&", 3, "Logical AND"),
        Operator::binary("|", 4, "Bitwise OR"),
        Operator::binary("^", 5, "Bitwise XOR"),
        Operator::binary("&", 6, "Bitwise AND"),

        Operator::binary("==", 7, "Equality"),
        Operator::binary("!=", 7, "Inequality"),
        Operator::binary("<", 8, "Less than"),
        Operator::binary("<=", 8, "Less or equal"),
        Operator::binary(">", 8, "Greater than"),
        Operator::binary(">=", 8, "Greater or equal"),

        Operator::binary("<<", 9, "Left shift"),
        Operator::binary(">>", 9, "Right shift"),

        Operator::binary("+", 10, "Add"),
        Operator::binary("-", 10, "Subtract"),
        Operator::binary("*", 11, "Multiply"),
        Operator::binary("/", 11, "Divide"),
        Operator::binary("%", 11, "Modulo"),

        Operator::prefix("++", "Prefix ++"),
        Operator::prefix("--", "Prefix --"),
        Operator::prefix("+", "Unary +"),
        Operator::prefix("-", "Unary -"),
        Operator::prefix("~", "Bitwise NOT"),
        Operator::prefix("!", "Logical NOT"),

        Operator::postfix("++", "Postfix ++"),
        Operator::postfix("--", "Postfix --"),
        Operator::binary(".", 13, MEMBER_ACCESS),
        Operator::synthetic("()", 13, CALL, Associativity::Left, Arity::Binary, Fixity::Postfix),
        Operator::synthetic("[]", 13, SUBSCRIPT, Associativity::Left, Arity::Binary, Fixity::Circumfix),

        Operator::synthetic("", 0, NO_OP, Associativity::Left, Arity::Nullary, Fixity::Circumfix),
    ]);
}

/// Picks the table entry for `symbol` given the token right before it.
///
/// After an operand (a literal, an identifier, a closing bracket or a
/// postfix operator) the symbol is infix or postfix. Anywhere else,
/// including the start of input, it is prefix.
pub fn resolve_fixity(symbol: &str, preceding: Option<&Token>) -> OperatorIndex {
    let candidates = OPERATORS.candidates(symbol);

    match candidates {
        [] => INTERNAL_FAULT!("no operator with this symbol", "symbol" => symbol),
        [only] => *only,
        _ => {
            let after_operand = follows_operand(preceding);
            candidates
                .iter()
                .copied()
                .find(|index| {
                    let fixity = OPERATORS.lookup_by_index(*index).fixity;
                    (fixity == Fixity::Prefix) != after_operand
                })
                .unwrap_or_else(|| {
                    INTERNAL_FAULT!(
                        "ambiguous symbol has no entry for its context",
                        "symbol" => symbol,
                        "after operand" => after_operand,
                    )
                })
        }
    }
}

fn follows_operand(preceding: Option<&Token>) -> bool {
    let Some(token) = preceding else {
        return false;
    };

    match token.kind {
        TokenKind::Operator => {
            let operator = token.get_operator();
            operator.arity != Arity::Binary && operator.fixity == Fixity::Postfix
        }
        TokenKind::CloseParen | TokenKind::CloseBracket => true,
        kind => kind.is_terminal(),
    }
}

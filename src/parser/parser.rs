//! Parser state and the `parse` entry point.
//!
//! The parser walks the token list once. Statements are dispatched through
//! the statement lookup table; expression operands through the primary
//! lookup table. Nodes go straight into the [`Ast`] arena as they are
//! built, and every completed statement is attached to the block that is
//! being filled at the time.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::{
        ast::{Ast, NodeId},
        statements::BlockType,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    INTERNAL_FAULT,
};

use super::{
    lookups::{create_token_lookups, PrimaryHandler, PrimaryLookup, StmtHandler, StmtLookup},
    stmt::parse_block_body,
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse, ending in an EOF token
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The tree under construction
    pub ast: Ast,
    /// Block that receives completed statements
    pub block: NodeId,
    /// Node where name resolution starts
    pub scope: NodeId,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for expression operand handlers
    primary_lookup: PrimaryLookup,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Vector of tokens to parse; the last one must be EOF
    ///
    /// # Returns
    ///
    /// A new Parser whose tree holds only the root block.
    pub fn new(tokens: Vec<Token>) -> Self {
        let (first, last) = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) if last.kind == TokenKind::EOF => (first, last),
            _ => INTERNAL_FAULT!(
                "token list must end with an EOF token",
                "tokens" => tokens.len(),
            ),
        };

        let ast = Ast::new(first.trace.to(&last.trace));
        let root = ast.get_root();

        Parser {
            tokens,
            pos: 0,
            ast,
            block: root,
            scope: root,
            stmt_lookup: HashMap::new(),
            primary_lookup: HashMap::new(),
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        self.peek(0)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the token `offset` positions ahead, clamped to EOF.
    pub fn peek(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.peek(offset).kind
    }

    /// Advances to the next token and returns the previous one.
    ///
    /// The cursor never moves past EOF.
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if token.kind != TokenKind::EOF {
            self.pos += 1;
        }
        token
    }

    /// Expects a token of the specified kind, with a custom error.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    /// * `error` - Error to return if the expectation fails
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise the error.
    pub fn expect_error(&mut self, expected_kind: TokenKind, error: Error) -> Result<Token, Error> {
        if self.current_token_kind() == expected_kind {
            Ok(self.advance())
        } else {
            Err(error)
        }
    }

    /// Expects a token of the specified kind with the default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        let error = self.unexpected(&describe(expected_kind));
        self.expect_error(expected_kind, error)
    }

    /// Consumes the current token if it has the given kind.
    pub fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.current_token_kind() == kind {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// A syntax error at the current token naming what was expected.
    pub fn unexpected(&self, expected: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedToken {
                expected: expected.to_string(),
                found: token.to_string(),
            },
            token.trace.clone(),
        )
    }

    /// A syntax error at the current token with a free-form message.
    pub fn unexpected_detailed(&self, message: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.to_string(),
                message: message.to_string(),
            },
            token.trace.clone(),
        )
    }

    pub fn get_stmt_handler(&self, kind: TokenKind) -> Option<StmtHandler> {
        self.stmt_lookup.get(&kind).copied()
    }

    pub fn get_primary_handler(&self, kind: TokenKind) -> Option<PrimaryHandler> {
        self.primary_lookup.get(&kind).copied()
    }

    /// Registers a statement handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The leading token kind of the statement
    /// * `stmt_fn` - The handler function for this statement type
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers an expression operand handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind that starts the operand
    /// * `primary_fn` - The handler function for this operand
    pub fn primary(&mut self, kind: TokenKind, primary_fn: PrimaryHandler) {
        self.primary_lookup.insert(kind, primary_fn);
    }

    /// Makes `scope` the starting point of name resolution and returns the
    /// previous one, to be handed back to [`Parser::leave`].
    pub fn enter(&mut self, scope: NodeId) -> NodeId {
        std::mem::replace(&mut self.scope, scope)
    }

    pub fn leave(&mut self, previous: NodeId) {
        self.scope = previous;
    }

    /// Appends a completed statement to the block being filled.
    pub fn attach(&mut self, id: NodeId) -> Result<(), Error> {
        self.ast.append(self.block, id)
    }
}

/// Human-readable name of a token kind for "expected ..." messages.
pub fn describe(kind: TokenKind) -> String {
    match kind {
        TokenKind::EOF => String::from("end of file"),
        TokenKind::Semicolon => String::from("`;`"),
        TokenKind::Colon => String::from("`:`"),
        TokenKind::Question => String::from("`?`"),
        TokenKind::OpenParen => String::from("`(`"),
        TokenKind::CloseParen => String::from("`)`"),
        TokenKind::OpenBracket => String::from("`[`"),
        TokenKind::CloseBracket => String::from("`]`"),
        TokenKind::FatArrow => String::from("`=>`"),
        TokenKind::Identifier => String::from("identifier"),
        TokenKind::Integer
        | TokenKind::Float
        | TokenKind::String
        | TokenKind::Boolean
        | TokenKind::Operator => format!("{} token", kind),
        keyword => format!("`{}`", format!("{:?}", keyword).to_lowercase()),
    }
}

/// Parses a stream of tokens into an Abstract Syntax Tree.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// registers the lookup tables, and parses statements into the root block
/// until EOF.
///
/// # Arguments
///
/// * `tokens` - Vector of tokens to parse, ending in an EOF token
///
/// # Returns
///
/// The finished tree, or the first error encountered.
pub fn parse(tokens: Vec<Token>) -> Result<Ast, Error> {
    let mut parser = Parser::new(tokens);
    create_token_lookups(&mut parser);

    let root = parser.ast.get_root();
    parse_block_body(&mut parser, root, BlockType::Root)?;
    parser.expect(TokenKind::EOF)?;

    debug!(
        file = %parser.ast.file(),
        nodes = parser.ast.len(),
        "parsed token stream"
    );

    Ok(parser.ast)
}

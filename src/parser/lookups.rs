use std::collections::HashMap;

use crate::{ast::ast::NodeId, errors::errors::Error, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser, stmt::*};

pub type StmtHandler = fn(&mut Parser) -> Result<NodeId, Error>;
pub type PrimaryHandler = fn(&mut Parser) -> Result<NodeId, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Literals and symbols
    parser.primary(TokenKind::Integer, parse_terminal_expr);
    parser.primary(TokenKind::Float, parse_terminal_expr);
    parser.primary(TokenKind::String, parse_terminal_expr);
    parser.primary(TokenKind::Boolean, parse_terminal_expr);
    parser.primary(TokenKind::Identifier, parse_terminal_expr);
    parser.primary(TokenKind::OpenParen, parse_grouping_expr);

    // Statements
    parser.stmt(TokenKind::Define, parse_var_decl_stmt);
    parser.stmt(TokenKind::Identifier, parse_ident_stmt);
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::While, parse_while_stmt);
    parser.stmt(TokenKind::For, parse_for_stmt);
    parser.stmt(TokenKind::Do, parse_block_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::Break, parse_break_stmt);
    parser.stmt(TokenKind::Function, parse_fn_decl_stmt);
    parser.stmt(TokenKind::Foreign, parse_foreign_fn_decl_stmt);
    parser.stmt(TokenKind::Type, parse_type_decl_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type PrimaryLookup = HashMap<TokenKind, PrimaryHandler>;

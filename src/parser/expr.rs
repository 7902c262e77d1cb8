//! Expression parsing by precedence climbing.
//!
//! [`parse_expr`] folds binary infix operators of at least a minimum
//! precedence. Operands come from [`parse_primary_expr`], which gathers a
//! run of prefix operators, the operand itself and every postfix form that
//! follows it (postfix operators, calls and subscripts), then nests them so
//! the tighter-binding operator ends up closer to the operand.

use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        expressions::ExpressionNode,
    },
    errors::errors::Error,
    lexer::{
        operators::{Associativity, Fixity, CALL, NO_OP, OPERATORS, SUBSCRIPT},
        tokens::{Token, TokenKind},
    },
};

use super::{parser::Parser, scope::resolve_references};

/// A postfix form waiting to be applied to its operand.
struct Postfix {
    token: Token,
    /// Argument list of a call, or the index of a subscript
    argument: Option<NodeId>,
}

impl Postfix {
    fn precedence(&self) -> u8 {
        self.token.get_operator().precedence
    }
}

/// Parses a complete expression and resolves the identifiers it uses.
pub fn parse_expression(parser: &mut Parser) -> Result<NodeId, Error> {
    let expression = parse_expr(parser, 0)?;
    resolve_references(parser, expression)?;
    Ok(expression)
}

/// Parses an expression whose binary operators all have a precedence of at
/// least `min_precedence`.
pub fn parse_expr(parser: &mut Parser, min_precedence: u8) -> Result<NodeId, Error> {
    let mut lhs = parse_primary_expr(parser)?;

    while let Some(operator) = parser.current_token().as_operator() {
        if !operator.is_binary_infix() || operator.precedence < min_precedence {
            break;
        }

        let operator_token = parser.advance();
        let next_precedence = match operator.associativity {
            Associativity::Left => operator.precedence + 1,
            Associativity::Right => operator.precedence,
        };
        let rhs = parse_expr(parser, next_precedence)?;

        lhs = make_operator_node(parser, operator_token, &[lhs, rhs])?;
    }

    Ok(lhs)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let mut prefixes = vec![];
    while parser.current_token().has_fixity(Fixity::Prefix) {
        prefixes.push(parser.advance());
    }

    let handler = parser
        .get_primary_handler(parser.current_token_kind())
        .ok_or_else(|| parser.unexpected("expression"))?;
    let mut node = handler(parser)?;

    let mut postfixes = parse_postfix_chain(parser)?.into_iter().peekable();

    // Prefixes apply innermost-last, postfixes innermost-first.
    loop {
        let apply_postfix = match (postfixes.peek(), prefixes.last()) {
            (Some(postfix), Some(prefix)) => {
                postfix.precedence() > prefix.get_operator().precedence
            }
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if apply_postfix {
            if let Some(postfix) = postfixes.next() {
                let mut children = vec![node];
                children.extend(postfix.argument);
                node = make_operator_node(parser, postfix.token, &children)?;
            }
        } else if let Some(prefix) = prefixes.pop() {
            node = make_operator_node(parser, prefix, &[node])?;
        }
    }

    Ok(node)
}

fn parse_postfix_chain(parser: &mut Parser) -> Result<Vec<Postfix>, Error> {
    let mut chain = vec![];

    loop {
        match parser.current_token_kind() {
            TokenKind::Operator if parser.current_token().has_fixity(Fixity::Postfix) => {
                chain.push(Postfix {
                    token: parser.advance(),
                    argument: None,
                });
            }
            TokenKind::OpenParen => {
                let open = parser.advance();
                let arguments = match parser.accept(TokenKind::CloseParen) {
                    Some(close) => {
                        let no_op = Token::operator(OPERATORS.index_of(NO_OP), close.trace.clone());
                        parser
                            .ast
                            .push(NodeKind::Expression(ExpressionNode::new(no_op)), close.trace)
                    }
                    None => {
                        let arguments = parse_expr(parser, 0)?;
                        parser.expect(TokenKind::CloseParen)?;
                        arguments
                    }
                };

                chain.push(Postfix {
                    token: Token::operator(OPERATORS.index_of(CALL), open.trace),
                    argument: Some(arguments),
                });
            }
            TokenKind::OpenBracket => {
                let open = parser.advance();
                let index = parse_expr(parser, 0)?;
                parser.expect(TokenKind::CloseBracket)?;

                chain.push(Postfix {
                    token: Token::operator(OPERATORS.index_of(SUBSCRIPT), open.trace),
                    argument: Some(index),
                });
            }
            _ => break,
        }
    }

    Ok(chain)
}

fn make_operator_node(
    parser: &mut Parser,
    token: Token,
    children: &[NodeId],
) -> Result<NodeId, Error> {
    let trace = token.trace.clone();
    let node = parser
        .ast
        .push(NodeKind::Expression(ExpressionNode::new(token)), trace);
    for child in children {
        parser.ast.append(node, *child)?;
    }
    Ok(node)
}

pub fn parse_terminal_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.advance();
    let trace = token.trace.clone();
    Ok(parser
        .ast
        .push(NodeKind::Expression(ExpressionNode::new(token)), trace))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let expression = parse_expr(parser, 0)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expression)
}

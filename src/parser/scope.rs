//! Reference resolution for finished expressions.
//!
//! Every identifier terminal must name something visible from the parser's
//! current scope. The right operand of a member access names a field of
//! some value and is left alone.

use crate::{
    ast::ast::NodeId,
    errors::errors::{Error, ErrorImpl},
    lexer::{
        operators::{Arity, CALL, MEMBER_ACCESS, SUBSCRIPT},
        tokens::TokenKind,
    },
};

use super::parser::Parser;

pub fn resolve_references(parser: &Parser, expression: NodeId) -> Result<(), Error> {
    resolve(parser, expression, false)
}

fn resolve(parser: &Parser, id: NodeId, is_member: bool) -> Result<(), Error> {
    let expression = parser.ast.expression(id);
    let token = &expression.token;

    match token.kind {
        TokenKind::Identifier => {
            if is_member || parser.ast.resolve_name(parser.scope, &token.value).is_some() {
                Ok(())
            } else {
                Err(Error::new(
                    ErrorImpl::VariableNotDeclared {
                        variable: token.value.clone(),
                    },
                    token.trace.clone(),
                ))
            }
        }
        TokenKind::Operator => {
            let operator = token.get_operator();
            match (operator.name, expression.children.as_slice()) {
                (MEMBER_ACCESS, [object, field]) => {
                    resolve(parser, *object, is_member)?;
                    resolve(parser, *field, true)
                }
                (CALL | SUBSCRIPT, [target, argument]) => {
                    resolve(parser, *target, is_member)?;
                    resolve(parser, *argument, false)
                }
                (_, [operand]) if operator.arity == Arity::Unary => {
                    resolve(parser, *operand, is_member)
                }
                (_, children) => children
                    .iter()
                    .try_for_each(|child| resolve(parser, *child, false)),
            }
        }
        _ => Ok(()),
    }
}

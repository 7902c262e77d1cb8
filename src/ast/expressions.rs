use crate::lexer::tokens::Token;

use super::ast::NodeId;

/// An operator application or a terminal.
///
/// Terminals (literals and identifiers) have no children. Operator nodes
/// have one child per operand; a call has the callee and the argument
/// expression, which is a comma tree or a `No-op` node for `f()`.
#[derive(Debug, Clone)]
pub struct ExpressionNode {
    pub token: Token,
    pub children: Vec<NodeId>,
}

impl ExpressionNode {
    pub fn new(token: Token) -> Self {
        ExpressionNode {
            token,
            children: vec![],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.token.kind.is_terminal()
    }
}

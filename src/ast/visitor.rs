//! The visitor contract for AST consumers.
//!
//! A consumer implements one method per node kind and calls
//! [`Ast::visit`], which dispatches on the node's kind. Adding a node kind
//! means every consumer fails to compile until it handles the new kind.

use crate::lexer::tokens::TokenKind;

use super::{
    ast::{Ast, NodeId, NodeKind},
    expressions::ExpressionNode,
    statements::{
        BlockNode, BranchNode, ConstructorNode, DeclarationNode, FunctionNode, LoopNode,
        MemberNode, MethodNode, ReturnNode, TypeNode,
    },
};

pub trait Visitor {
    type Output;

    fn visit_block(&mut self, ast: &Ast, id: NodeId, node: &BlockNode) -> Self::Output;
    fn visit_expression(&mut self, ast: &Ast, id: NodeId, node: &ExpressionNode) -> Self::Output;
    fn visit_declaration(&mut self, ast: &Ast, id: NodeId, node: &DeclarationNode)
        -> Self::Output;
    fn visit_branch(&mut self, ast: &Ast, id: NodeId, node: &BranchNode) -> Self::Output;
    fn visit_loop(&mut self, ast: &Ast, id: NodeId, node: &LoopNode) -> Self::Output;
    fn visit_return(&mut self, ast: &Ast, id: NodeId, node: &ReturnNode) -> Self::Output;
    fn visit_break(&mut self, ast: &Ast, id: NodeId) -> Self::Output;
    fn visit_function(&mut self, ast: &Ast, id: NodeId, node: &FunctionNode) -> Self::Output;
    fn visit_type(&mut self, ast: &Ast, id: NodeId, node: &TypeNode) -> Self::Output;
    fn visit_constructor(&mut self, ast: &Ast, id: NodeId, node: &ConstructorNode)
        -> Self::Output;
    fn visit_method(&mut self, ast: &Ast, id: NodeId, node: &MethodNode) -> Self::Output;
    fn visit_member(&mut self, ast: &Ast, id: NodeId, node: &MemberNode) -> Self::Output;
}

impl Ast {
    /// Calls the `visitor` method matching the kind of node `id`.
    pub fn visit<V: Visitor>(&self, id: NodeId, visitor: &mut V) -> V::Output {
        match self.kind(id) {
            NodeKind::Block(node) => visitor.visit_block(self, id, node),
            NodeKind::Expression(node) => visitor.visit_expression(self, id, node),
            NodeKind::Declaration(node) => visitor.visit_declaration(self, id, node),
            NodeKind::Branch(node) => visitor.visit_branch(self, id, node),
            NodeKind::Loop(node) => visitor.visit_loop(self, id, node),
            NodeKind::Return(node) => visitor.visit_return(self, id, node),
            NodeKind::BreakLoop => visitor.visit_break(self, id),
            NodeKind::Function(node) => visitor.visit_function(self, id, node),
            NodeKind::Type(node) => visitor.visit_type(self, id, node),
            NodeKind::Constructor(node) => visitor.visit_constructor(self, id, node),
            NodeKind::Method(node) => visitor.visit_method(self, id, node),
            NodeKind::Member(node) => visitor.visit_member(self, id, node),
        }
    }
}

/// Renders a tree as indented text, one node per line.
pub struct TreePrinter {
    depth: usize,
    output: String,
}

impl TreePrinter {
    pub fn print(ast: &Ast) -> String {
        let mut printer = TreePrinter {
            depth: 0,
            output: String::new(),
        };
        ast.visit(ast.get_root(), &mut printer);
        printer.output
    }

    fn line(&mut self, text: &str) {
        self.output.push_str(&"  ".repeat(self.depth));
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn nested(&mut self, ast: &Ast, children: impl IntoIterator<Item = NodeId>) {
        self.depth += 1;
        for child in children {
            ast.visit(child, self);
        }
        self.depth -= 1;
    }

    fn labelled(&mut self, ast: &Ast, label: &str, child: Option<NodeId>) {
        if let Some(child) = child {
            self.depth += 1;
            self.line(label);
            self.nested(ast, [child]);
            self.depth -= 1;
        }
    }

    fn function_line(prefix: &str, function: &FunctionNode) -> String {
        let name = function.identifier.as_deref().unwrap_or("<anonymous>");
        let foreign = if function.foreign { " foreign" } else { "" };
        format!("{} {} {}{}", prefix, name, function.signature, foreign)
    }
}

impl Visitor for TreePrinter {
    type Output = ();

    fn visit_block(&mut self, ast: &Ast, _id: NodeId, node: &BlockNode) {
        self.line(&format!("Block ({})", node.block_type.as_str()));
        self.nested(ast, node.children.iter().copied());
    }

    fn visit_expression(&mut self, ast: &Ast, _id: NodeId, node: &ExpressionNode) {
        let token = &node.token;
        let text = match token.kind {
            TokenKind::Operator => format!("Operator {}", token.get_operator().name),
            TokenKind::String => format!("String {:?}", token.value),
            kind => format!("{} {}", kind, token.value),
        };
        self.line(&text);
        self.nested(ast, node.children.iter().copied());
    }

    fn visit_declaration(&mut self, ast: &Ast, _id: NodeId, node: &DeclarationNode) {
        self.line(&format!("Declaration {}: {}", node.identifier, node.type_info));
        self.nested(ast, node.init);
    }

    fn visit_branch(&mut self, ast: &Ast, _id: NodeId, node: &BranchNode) {
        self.line("Branch");
        self.labelled(ast, "condition:", node.condition);
        self.labelled(ast, "success:", node.success);
        self.labelled(ast, "failure:", node.failure);
    }

    fn visit_loop(&mut self, ast: &Ast, _id: NodeId, node: &LoopNode) {
        self.line("Loop");
        self.labelled(ast, "init:", node.init);
        self.labelled(ast, "condition:", node.condition);
        self.labelled(ast, "update:", node.update);
        self.labelled(ast, "code:", node.code);
    }

    fn visit_return(&mut self, ast: &Ast, _id: NodeId, node: &ReturnNode) {
        self.line("Return");
        self.nested(ast, node.value);
    }

    fn visit_break(&mut self, _ast: &Ast, _id: NodeId) {
        self.line("Break");
    }

    fn visit_function(&mut self, ast: &Ast, _id: NodeId, node: &FunctionNode) {
        self.line(&TreePrinter::function_line("Function", node));
        self.nested(ast, node.code);
    }

    fn visit_type(&mut self, ast: &Ast, _id: NodeId, node: &TypeNode) {
        if node.inherits.is_empty() {
            self.line(&format!("Type {}", node.name));
        } else {
            self.line(&format!("Type {} inherits {}", node.name, node.inherits.join(", ")));
        }
        self.nested(ast, node.children.iter().copied());
    }

    fn visit_constructor(&mut self, ast: &Ast, _id: NodeId, node: &ConstructorNode) {
        let foreign = if node.foreign { " foreign" } else { "" };
        self.line(&format!(
            "Constructor {} {}{}",
            node.visibility, node.signature, foreign
        ));
        self.nested(ast, node.code);
    }

    fn visit_method(&mut self, ast: &Ast, _id: NodeId, node: &MethodNode) {
        let prefix = if node.is_static {
            format!("Method {} static", node.visibility)
        } else {
            format!("Method {}", node.visibility)
        };
        self.line(&TreePrinter::function_line(&prefix, &node.function));
        self.nested(ast, node.function.code);
    }

    fn visit_member(&mut self, ast: &Ast, _id: NodeId, node: &MemberNode) {
        let is_static = if node.is_static { " static" } else { "" };
        self.line(&format!(
            "Member {}{} {}: {}",
            node.visibility, is_static, node.declaration.identifier, node.declaration.type_info
        ));
        self.nested(ast, node.declaration.init);
    }
}

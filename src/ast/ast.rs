//! The arena that owns every node of a parsed program.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. Each node
//! records its parent, so constructs can search upward for an enclosing
//! loop or the block that declares a name.

use std::rc::Rc;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Trace, INTERNAL_FAULT,
};

use super::{
    expressions::ExpressionNode,
    statements::{
        BlockNode, BlockType, BranchNode, ConstructorNode, DeclarationNode, FunctionNode,
        LoopNode, MemberNode, MethodNode, ReturnNode, TypeNode,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Block(BlockNode),
    Expression(ExpressionNode),
    Declaration(DeclarationNode),
    Branch(BranchNode),
    Loop(LoopNode),
    Return(ReturnNode),
    BreakLoop,
    Function(FunctionNode),
    Type(TypeNode),
    Constructor(ConstructorNode),
    Method(MethodNode),
    Member(MemberNode),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Block(_) => "Block",
            NodeKind::Expression(_) => "Expression",
            NodeKind::Declaration(_) => "Declaration",
            NodeKind::Branch(_) => "Branch",
            NodeKind::Loop(_) => "Loop",
            NodeKind::Return(_) => "Return",
            NodeKind::BreakLoop => "BreakLoop",
            NodeKind::Function(_) => "Function",
            NodeKind::Type(_) => "Type",
            NodeKind::Constructor(_) => "Constructor",
            NodeKind::Method(_) => "Method",
            NodeKind::Member(_) => "Member",
        }
    }

    fn is_type_body_item(&self) -> bool {
        matches!(
            self,
            NodeKind::Constructor(_) | NodeKind::Method(_) | NodeKind::Member(_)
        )
    }

    fn is_function_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Function(_) | NodeKind::Method(_) | NodeKind::Constructor(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub trace: Trace,
}

/// Named child positions of the fixed-shape nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Init,
    Condition,
    Success,
    Failure,
    Update,
    Code,
    Value,
}

impl Slot {
    fn accepts(&self, child: &NodeKind) -> bool {
        match self {
            Slot::Condition | Slot::Update | Slot::Value => {
                matches!(child, NodeKind::Expression(_))
            }
            Slot::Success | Slot::Code => matches!(child, NodeKind::Block(_)),
            Slot::Failure => matches!(child, NodeKind::Block(_) | NodeKind::Branch(_)),
            Slot::Init => matches!(child, NodeKind::Expression(_) | NodeKind::Declaration(_)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Variable,
    Function,
    Type,
}

#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Creates a tree holding only an empty root block.
    pub fn new(trace: Trace) -> Self {
        Ast {
            nodes: vec![Node {
                kind: NodeKind::Block(BlockNode::new(BlockType::Root)),
                parent: None,
                trace,
            }],
            root: NodeId(0),
        }
    }

    pub fn get_root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.node(self.root).trace.file)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.0)
            .unwrap_or_else(|| INTERNAL_FAULT!("node id out of range", "id" => id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let len = self.nodes.len();
        self.nodes.get_mut(id.0).unwrap_or_else(|| {
            INTERNAL_FAULT!("node id out of range", "id" => id.0, "nodes" => len)
        })
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn trace(&self, id: NodeId) -> &Trace {
        &self.node(id).trace
    }

    pub fn expression(&self, id: NodeId) -> &ExpressionNode {
        match self.kind(id) {
            NodeKind::Expression(expression) => expression,
            other => INTERNAL_FAULT!("expected an expression node", "id" => id.0, "kind" => other.name()),
        }
    }

    pub fn block(&self, id: NodeId) -> &BlockNode {
        match self.kind(id) {
            NodeKind::Block(block) => block,
            other => INTERNAL_FAULT!("expected a block node", "id" => id.0, "kind" => other.name()),
        }
    }

    /// Stores a new, unattached node.
    pub fn push(&mut self, kind: NodeKind, trace: Trace) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            trace,
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Records `parent` as the parent of `child` without listing it as a child.
    ///
    /// Lets a node search upward before it is attached. Faults if `child`
    /// already belongs to another node.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || child == self.root {
            INTERNAL_FAULT!("node cannot adopt itself or the root", "parent" => parent.0, "child" => child.0);
        }

        let node = self.node_mut(child);
        match node.parent {
            None => node.parent = Some(parent),
            Some(existing) if existing == parent => {}
            Some(existing) => INTERNAL_FAULT!(
                "node already has a parent",
                "child" => child.0,
                "parent" => existing.0,
                "new parent" => parent.0,
            ),
        }
    }

    /// Appends `child` to a block, type or expression.
    ///
    /// Appending a declaration, named function or type to a block records it
    /// in the block's scope maps; a second declaration of the same name in
    /// one block is an error.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        self.adopt(parent, child);

        let declared = self
            .declaration_of(child)
            .map(|(namespace, name)| (namespace, name.to_string()));
        let child_kind = self.kind(child);
        let is_type_body_item = child_kind.is_type_body_item();
        let is_expression = matches!(child_kind, NodeKind::Expression(_));
        let child_name = child_kind.name();

        if let (NodeKind::Type(type_node), Some((namespace, name))) = (self.kind(parent), &declared) {
            let duplicate = type_node.children.iter().any(|sibling| {
                matches!(self.declaration_of(*sibling), Some((ns, n)) if ns == *namespace && n == name)
            });
            if duplicate {
                return Err(self.redeclared(*namespace, name, child));
            }
        }

        if let (NodeKind::Block(block), Some((namespace, name))) = (self.kind(parent), &declared) {
            let taken = match namespace {
                Namespace::Variable => block.variables.contains_key(name),
                Namespace::Function => block.functions.contains_key(name),
                Namespace::Type => block.types.contains(name),
            };
            if taken {
                return Err(self.redeclared(*namespace, name, child));
            }
        }

        let parent_node = self.node_mut(parent);
        match &mut parent_node.kind {
            NodeKind::Block(block) if !is_type_body_item => {
                match declared {
                    Some((Namespace::Variable, name)) => {
                        block.variables.insert(name, child);
                    }
                    Some((Namespace::Function, name)) => {
                        block.functions.insert(name, child);
                    }
                    Some((Namespace::Type, name)) => {
                        block.types.insert(name);
                    }
                    None => {}
                }
                block.children.push(child);
            }
            NodeKind::Type(type_node) if is_type_body_item => type_node.children.push(child),
            NodeKind::Expression(expression) if is_expression => expression.children.push(child),
            other => INTERNAL_FAULT!(
                "node cannot hold this child",
                "parent" => other.name(),
                "child" => child_name,
            ),
        }

        Ok(())
    }

    /// Fills one named slot of a fixed-shape node. Faults when the slot does
    /// not exist for that node, is already filled, or cannot hold `child`.
    pub fn set_slot(&mut self, parent: NodeId, slot: Slot, child: NodeId) {
        let child_kind = self.kind(child);
        if !slot.accepts(child_kind) {
            INTERNAL_FAULT!(
                "slot cannot hold this kind of node",
                "slot" => format!("{:?}", slot),
                "child" => child_kind.name(),
            );
        }

        self.adopt(parent, child);

        let parent_node = self.node_mut(parent);
        let parent_name = parent_node.kind.name();
        let target = match (&mut parent_node.kind, slot) {
            (NodeKind::Declaration(declaration), Slot::Init) => Some(&mut declaration.init),
            (NodeKind::Member(member), Slot::Init) => Some(&mut member.declaration.init),
            (NodeKind::Branch(branch), Slot::Condition) => Some(&mut branch.condition),
            (NodeKind::Branch(branch), Slot::Success) => Some(&mut branch.success),
            (NodeKind::Branch(branch), Slot::Failure) => Some(&mut branch.failure),
            (NodeKind::Loop(node), Slot::Init) => Some(&mut node.init),
            (NodeKind::Loop(node), Slot::Condition) => Some(&mut node.condition),
            (NodeKind::Loop(node), Slot::Update) => Some(&mut node.update),
            (NodeKind::Loop(node), Slot::Code) => Some(&mut node.code),
            (NodeKind::Return(node), Slot::Value) => Some(&mut node.value),
            (NodeKind::Function(function), Slot::Code) => Some(&mut function.code),
            (NodeKind::Method(method), Slot::Code) => Some(&mut method.function.code),
            (NodeKind::Constructor(constructor), Slot::Code) => Some(&mut constructor.code),
            _ => None,
        };

        match target {
            Some(target) if target.is_none() => *target = Some(child),
            Some(_) => INTERNAL_FAULT!(
                "slot already filled",
                "node" => parent_name,
                "slot" => format!("{:?}", slot),
            ),
            None => INTERNAL_FAULT!(
                "node has no such slot",
                "node" => parent_name,
                "slot" => format!("{:?}", slot),
            ),
        }
    }

    /// Child nodes in source order. Empty slots are skipped.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::Block(block) => block.children.clone(),
            NodeKind::Expression(expression) => expression.children.clone(),
            NodeKind::Type(type_node) => type_node.children.clone(),
            NodeKind::Declaration(declaration) => declaration.init.into_iter().collect(),
            NodeKind::Member(member) => member.declaration.init.into_iter().collect(),
            NodeKind::Branch(branch) => [branch.condition, branch.success, branch.failure]
                .into_iter()
                .flatten()
                .collect(),
            NodeKind::Loop(node) => [node.init, node.condition, node.update, node.code]
                .into_iter()
                .flatten()
                .collect(),
            NodeKind::Return(node) => node.value.into_iter().collect(),
            NodeKind::BreakLoop => vec![],
            NodeKind::Function(function) => function.code.into_iter().collect(),
            NodeKind::Method(method) => method.function.code.into_iter().collect(),
            NodeKind::Constructor(constructor) => constructor.code.into_iter().collect(),
        }
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            ast: self,
            next: Some(id),
        }
    }

    /// The nearest strict ancestor of `id` whose kind satisfies `predicate`.
    pub fn find_above<P>(&self, id: NodeId, predicate: P) -> Option<NodeId>
    where
        P: Fn(&NodeKind) -> bool,
    {
        self.ancestors(id)
            .skip(1)
            .find(|ancestor| predicate(self.kind(*ancestor)))
    }

    /// The loop a `break` at `id` would leave. Function boundaries stop the search.
    pub fn enclosing_loop(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|ancestor| {
                let kind = self.kind(*ancestor);
                matches!(kind, NodeKind::Loop(_)) || kind.is_function_like()
            })
            .filter(|found| matches!(self.kind(*found), NodeKind::Loop(_)))
    }

    /// Resolves an identifier used at `from` to the node that introduces it.
    ///
    /// Searches outward from `from` (inclusive). Blocks answer from their
    /// variable and function maps, loops from their init declaration,
    /// functions from their arguments and types from their members.
    pub fn resolve_name(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors(from).find_map(|id| match self.kind(id) {
            NodeKind::Block(block) => block
                .variables
                .get(name)
                .or_else(|| block.functions.get(name))
                .copied(),
            NodeKind::Loop(node) => node.init.filter(|init| {
                matches!(self.kind(*init), NodeKind::Declaration(d) if d.identifier == name)
            }),
            NodeKind::Function(function) => function.signature.argument(name).map(|_| id),
            NodeKind::Method(method) => method.function.signature.argument(name).map(|_| id),
            NodeKind::Constructor(constructor) => {
                constructor.signature.argument(name).map(|_| id)
            }
            NodeKind::Type(type_node) => type_node.children.iter().copied().find(|child| {
                matches!(self.declaration_of(*child), Some((_, n)) if n == name)
            }),
            _ => None,
        })
    }

    pub fn lookup_variable(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors(from).find_map(|id| match self.kind(id) {
            NodeKind::Block(block) => block.variables.get(name).copied(),
            _ => None,
        })
    }

    pub fn lookup_function(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors(from).find_map(|id| match self.kind(id) {
            NodeKind::Block(block) => block.functions.get(name).copied(),
            _ => None,
        })
    }

    pub fn is_type_declared(&self, from: NodeId, name: &str) -> bool {
        self.ancestors(from).any(|id| match self.kind(id) {
            NodeKind::Block(block) => block.types.contains(name),
            _ => false,
        })
    }

    fn declaration_of(&self, id: NodeId) -> Option<(Namespace, &str)> {
        match self.kind(id) {
            NodeKind::Declaration(declaration) => {
                Some((Namespace::Variable, declaration.identifier.as_str()))
            }
            NodeKind::Member(member) => {
                Some((Namespace::Variable, member.declaration.identifier.as_str()))
            }
            NodeKind::Function(function) => function
                .identifier
                .as_deref()
                .map(|name| (Namespace::Function, name)),
            NodeKind::Method(method) => method
                .function
                .identifier
                .as_deref()
                .map(|name| (Namespace::Function, name)),
            NodeKind::Type(type_node) => Some((Namespace::Type, type_node.name.as_str())),
            _ => None,
        }
    }

    fn redeclared(&self, namespace: Namespace, name: &str, at: NodeId) -> Error {
        let error = match namespace {
            Namespace::Variable => ErrorImpl::VariableAlreadyDeclared {
                variable: name.to_string(),
            },
            Namespace::Function => ErrorImpl::FunctionAlreadyDeclared {
                function: name.to_string(),
            },
            Namespace::Type => ErrorImpl::TypeAlreadyDeclared {
                type_: name.to_string(),
            },
        };
        Error::new(error, self.trace(at).clone())
    }

    /// Deep, kind-aware comparison of the subtree at `id` with the subtree
    /// at `other_id` in `other`. Traces, parents and scope maps are not
    /// compared.
    pub fn subtree_eq(&self, id: NodeId, other: &Ast, other_id: NodeId) -> bool {
        let slot = |a: Option<NodeId>, b: Option<NodeId>| match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.subtree_eq(a, other, b),
            _ => false,
        };
        let list = |a: &[NodeId], b: &[NodeId]| {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(a, b)| self.subtree_eq(*a, other, *b))
        };
        let function = |a: &FunctionNode, b: &FunctionNode| {
            a.identifier == b.identifier
                && a.signature == b.signature
                && a.foreign == b.foreign
                && slot(a.code, b.code)
        };
        let declaration = |a: &DeclarationNode, b: &DeclarationNode| {
            a.identifier == b.identifier && a.type_info == b.type_info && slot(a.init, b.init)
        };

        match (self.kind(id), other.kind(other_id)) {
            (NodeKind::Block(a), NodeKind::Block(b)) => {
                a.block_type == b.block_type && list(&a.children, &b.children)
            }
            (NodeKind::Expression(a), NodeKind::Expression(b)) => {
                a.token == b.token && list(&a.children, &b.children)
            }
            (NodeKind::Declaration(a), NodeKind::Declaration(b)) => declaration(a, b),
            (NodeKind::Branch(a), NodeKind::Branch(b)) => {
                slot(a.condition, b.condition)
                    && slot(a.success, b.success)
                    && slot(a.failure, b.failure)
            }
            (NodeKind::Loop(a), NodeKind::Loop(b)) => {
                slot(a.init, b.init)
                    && slot(a.condition, b.condition)
                    && slot(a.update, b.update)
                    && slot(a.code, b.code)
            }
            (NodeKind::Return(a), NodeKind::Return(b)) => slot(a.value, b.value),
            (NodeKind::BreakLoop, NodeKind::BreakLoop) => true,
            (NodeKind::Function(a), NodeKind::Function(b)) => function(a, b),
            (NodeKind::Type(a), NodeKind::Type(b)) => {
                a.name == b.name && a.inherits == b.inherits && list(&a.children, &b.children)
            }
            (NodeKind::Constructor(a), NodeKind::Constructor(b)) => {
                a.signature == b.signature
                    && a.visibility == b.visibility
                    && a.foreign == b.foreign
                    && slot(a.code, b.code)
            }
            (NodeKind::Method(a), NodeKind::Method(b)) => {
                function(&a.function, &b.function)
                    && a.visibility == b.visibility
                    && a.is_static == b.is_static
            }
            (NodeKind::Member(a), NodeKind::Member(b)) => {
                declaration(&a.declaration, &b.declaration)
                    && a.visibility == b.visibility
                    && a.is_static == b.is_static
            }
            _ => false,
        }
    }
}

impl PartialEq for Ast {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

pub struct Ancestors<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.ast.parent(current);
        Some(current)
    }
}

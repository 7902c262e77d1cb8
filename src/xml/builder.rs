//! Builds an [`Ast`] from an XML description of the tree.
//!
//! Each element names one node kind and carries its payload in attributes:
//!
//! ```xml
//! <block type="root">
//!   <decl ident="a" types="Float Integer">
//!     <expr type="Float" value="3.3"/>
//!   </decl>
//!   <expr type="Operator" value="Add">
//!     <expr type="Identifier" value="a"/>
//!     <expr type="Integer" value="1"/>
//!   </expr>
//! </block>
//! ```
//!
//! Names are not resolved against scopes; redeclarations inside one block
//! or type are still reported, as the text parser does.

use std::rc::Rc;

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind, Slot},
        expressions::ExpressionNode,
        statements::{
            BlockNode, BlockType, BranchNode, ConstructorNode, DeclarationNode, FunctionNode,
            LoopNode, MemberNode, MethodNode, ReturnNode, TypeNode, Visibility,
        },
        types::{FunctionSignature, TypeInfo},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{
        operators::{Arity, OPERATORS},
        tokens::{Token, TokenKind},
    },
    Position, Trace, MK_TOKEN,
};

const KNOWN_TAGS: &[&str] = &[
    "block",
    "expr",
    "decl",
    "branch",
    "loop",
    "loop_init",
    "loop_condition",
    "loop_update",
    "return",
    "break",
    "function",
    "type",
    "member",
    "method",
    "constructor",
];

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("malformed document: {0}")]
    Document(#[from] roxmltree::Error),
    #[error("root element must be <block>, found <{tag}>")]
    RootNotBlock { tag: String },
    #[error("unknown element <{tag}> ({trace})")]
    UnknownElement { tag: String, trace: Trace },
    #[error("<{tag}> is missing attribute `{attribute}` ({trace})")]
    MissingAttribute {
        tag: String,
        attribute: &'static str,
        trace: Trace,
    },
    #[error("<{tag}> has invalid {attribute}={value:?} ({trace})")]
    InvalidAttribute {
        tag: String,
        attribute: &'static str,
        value: String,
        trace: Trace,
    },
    #[error("<{tag}> is missing its {child} ({trace})")]
    MissingChild {
        tag: String,
        child: &'static str,
        trace: Trace,
    },
    #[error("<{tag}> cannot contain <{child}> here ({trace})")]
    UnexpectedChild {
        tag: String,
        child: String,
        trace: Trace,
    },
    #[error("<expr> {value:?} takes {expected} operands, found {found} ({trace})")]
    OperandCount {
        value: String,
        expected: usize,
        found: usize,
        trace: Trace,
    },
    #[error(transparent)]
    Diagnostic(#[from] Error),
}

/// Parses `document` and builds the tree it describes.
///
/// The root element must be a `<block>`; its `type` may be omitted or
/// `root`. `file` names the document in traces and defaults to `<xml>`.
pub fn build_from_xml(document: &str, file: Option<String>) -> Result<Ast, BuildError> {
    let document = Document::parse(document)?;
    let root = document.root_element();
    let file = Rc::new(file.unwrap_or_else(|| String::from("<xml>")));

    if root.tag_name().name() != "block" {
        return Err(BuildError::RootNotBlock {
            tag: root.tag_name().name().to_string(),
        });
    }

    let mut builder = Builder {
        ast: Ast::new(trace_of(&file, root)),
        file,
    };

    if builder.block_type(root, BlockType::Root)? != BlockType::Root {
        return Err(builder.invalid(root, "type"));
    }
    let root_id = builder.ast.get_root();
    builder.fill_block(root_id, root)?;

    debug!(file = %builder.file, nodes = builder.ast.len(), "built tree from xml");
    Ok(builder.ast)
}

fn trace_of(file: &Rc<String>, element: Node<'_, '_>) -> Trace {
    let range = element.range();
    let position = |offset: usize| {
        let text = element.document().text_pos_at(offset);
        Position {
            offset: offset as u32,
            line: text.row,
            column: text.col,
        }
    };
    Trace::new(Rc::clone(file), position(range.start), position(range.end))
}

fn elements<'a, 'input>(element: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    element.children().filter(|child| child.is_element())
}

fn tag<'a>(element: Node<'a, '_>) -> &'a str {
    element.tag_name().name()
}

fn terminal_kind(name: &str) -> Option<TokenKind> {
    match name {
        "Integer" => Some(TokenKind::Integer),
        "Float" => Some(TokenKind::Float),
        "String" => Some(TokenKind::String),
        "Boolean" => Some(TokenKind::Boolean),
        "Identifier" => Some(TokenKind::Identifier),
        _ => None,
    }
}

/// Whether `value` is spelled the way the lexer would spell a `kind` token.
fn is_valid_terminal(kind: TokenKind, value: &str) -> bool {
    match kind {
        TokenKind::Integer => value.parse::<i64>().is_ok_and(|n| n.to_string() == value),
        TokenKind::Float => value.contains('.') && value.parse::<f64>().is_ok(),
        TokenKind::Boolean => value == "true" || value == "false",
        TokenKind::Identifier => !value.is_empty(),
        _ => true,
    }
}

fn operand_count(arity: Arity) -> usize {
    match arity {
        Arity::Nullary => 0,
        Arity::Unary => 1,
        Arity::Binary => 2,
        Arity::Ternary => 3,
    }
}

struct Builder {
    ast: Ast,
    file: Rc<String>,
}

impl Builder {
    fn trace(&self, element: Node<'_, '_>) -> Trace {
        trace_of(&self.file, element)
    }

    fn required<'a>(
        &self,
        element: Node<'a, '_>,
        attribute: &'static str,
    ) -> Result<&'a str, BuildError> {
        element
            .attribute(attribute)
            .ok_or_else(|| self.missing(element, attribute))
    }

    fn missing(&self, element: Node<'_, '_>, attribute: &'static str) -> BuildError {
        BuildError::MissingAttribute {
            tag: tag(element).to_string(),
            attribute,
            trace: self.trace(element),
        }
    }

    fn invalid(&self, element: Node<'_, '_>, attribute: &'static str) -> BuildError {
        BuildError::InvalidAttribute {
            tag: tag(element).to_string(),
            attribute,
            value: element.attribute(attribute).unwrap_or_default().to_string(),
            trace: self.trace(element),
        }
    }

    fn missing_child(&self, element: Node<'_, '_>, child: &'static str) -> BuildError {
        BuildError::MissingChild {
            tag: tag(element).to_string(),
            child,
            trace: self.trace(element),
        }
    }

    /// The error for `child` found where it does not belong under `parent`.
    fn misplaced(&self, parent: Node<'_, '_>, child: Node<'_, '_>) -> BuildError {
        if KNOWN_TAGS.contains(&tag(child)) {
            BuildError::UnexpectedChild {
                tag: tag(parent).to_string(),
                child: tag(child).to_string(),
                trace: self.trace(child),
            }
        } else {
            BuildError::UnknownElement {
                tag: tag(child).to_string(),
                trace: self.trace(child),
            }
        }
    }

    /// `true` or `false`; absent means `false`.
    fn flag(&self, element: Node<'_, '_>, attribute: &'static str) -> Result<bool, BuildError> {
        match element.attribute(attribute) {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(_) => Err(self.invalid(element, attribute)),
        }
    }

    fn block_type(
        &self,
        element: Node<'_, '_>,
        default: BlockType,
    ) -> Result<BlockType, BuildError> {
        match element.attribute("type") {
            None => Ok(default),
            Some("root") => Ok(BlockType::Root),
            Some("code") => Ok(BlockType::Code),
            Some("if") => Ok(BlockType::If),
            Some("function") => Ok(BlockType::Function),
            Some(_) => Err(self.invalid(element, "type")),
        }
    }

    fn visibility(
        &self,
        element: Node<'_, '_>,
        default: Visibility,
    ) -> Result<Visibility, BuildError> {
        match element.attribute("visibility") {
            None => Ok(default),
            Some(value) => {
                Visibility::from_keyword(value).ok_or_else(|| self.invalid(element, "visibility"))
            }
        }
    }

    /// The only element child of `element`, if any.
    fn single_child<'a, 'input>(
        &self,
        element: Node<'a, 'input>,
    ) -> Result<Option<Node<'a, 'input>>, BuildError> {
        let mut children = elements(element);
        let first = children.next();
        match children.next() {
            Some(extra) => Err(self.misplaced(element, extra)),
            None => Ok(first),
        }
    }

    fn fill_block(&mut self, block: NodeId, element: Node<'_, '_>) -> Result<(), BuildError> {
        for child in elements(element) {
            let statement = self.statement(element, child)?;
            self.ast.append(block, statement)?;
        }
        Ok(())
    }

    fn statement(
        &mut self,
        parent: Node<'_, '_>,
        element: Node<'_, '_>,
    ) -> Result<NodeId, BuildError> {
        match tag(element) {
            "block" => self.block(element),
            "expr" => self.expression(element),
            "decl" => self.declaration(element),
            "branch" => self.branch(element),
            "loop" => self.loop_node(element),
            "return" => self.return_node(element),
            "break" => self.break_node(element),
            "function" => self.function(element),
            "type" => self.type_node(element),
            _ => Err(self.misplaced(parent, element)),
        }
    }

    fn block(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let block_type = self.block_type(element, BlockType::Code)?;
        if block_type == BlockType::Root {
            return Err(self.invalid(element, "type"));
        }

        let block = self
            .ast
            .push(NodeKind::Block(BlockNode::new(block_type)), self.trace(element));
        self.fill_block(block, element)?;
        Ok(block)
    }

    /// Builds `element` if it is a `<block>`, otherwise reports it as misplaced.
    fn child_block(
        &mut self,
        parent: Node<'_, '_>,
        element: Node<'_, '_>,
    ) -> Result<NodeId, BuildError> {
        match tag(element) {
            "block" => self.block(element),
            _ => Err(self.misplaced(parent, element)),
        }
    }

    fn child_expression(
        &mut self,
        parent: Node<'_, '_>,
        element: Node<'_, '_>,
    ) -> Result<NodeId, BuildError> {
        match tag(element) {
            "expr" => self.expression(element),
            _ => Err(self.misplaced(parent, element)),
        }
    }

    fn expression(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let trace = self.trace(element);
        let kind = self.required(element, "type")?;
        let value = self.required(element, "value")?;

        let token = if kind == "Operator" {
            let index = OPERATORS
                .find(value)
                .ok_or_else(|| self.invalid(element, "value"))?;
            Token::operator(index, trace.clone())
        } else {
            let kind = terminal_kind(kind).ok_or_else(|| self.invalid(element, "type"))?;
            if !is_valid_terminal(kind, value) {
                return Err(self.invalid(element, "value"));
            }
            MK_TOKEN!(kind, value.to_string(), trace.clone())
        };

        let expected = token
            .as_operator()
            .map_or(0, |operator| operand_count(operator.arity));
        let operands = elements(element).collect::<Vec<_>>();
        if operands.len() != expected {
            return Err(BuildError::OperandCount {
                value: value.to_string(),
                expected,
                found: operands.len(),
                trace,
            });
        }

        let expression = self
            .ast
            .push(NodeKind::Expression(ExpressionNode::new(token)), trace);
        for operand in operands {
            let operand = self.child_expression(element, operand)?;
            self.ast.append(expression, operand)?;
        }
        Ok(expression)
    }

    /// Identifier and types of a `<decl>` or `<member>`.
    ///
    /// `dynamic="true"` makes the declaration dynamic; otherwise `types`
    /// lists the permitted type names separated by spaces.
    fn declaration_parts(&self, element: Node<'_, '_>) -> Result<DeclarationNode, BuildError> {
        let identifier = self.required(element, "ident")?;
        if identifier.is_empty() {
            return Err(self.invalid(element, "ident"));
        }

        let type_info = if self.flag(element, "dynamic")? {
            TypeInfo::Dynamic
        } else {
            let types = self.required(element, "types")?;
            let names = types.split_whitespace().collect::<Vec<_>>();
            if names.is_empty() {
                return Err(self.invalid(element, "types"));
            }
            TypeInfo::definite(names)
        };

        Ok(DeclarationNode::new(identifier.to_string(), type_info))
    }

    fn initializer(&mut self, owner: NodeId, element: Node<'_, '_>) -> Result<(), BuildError> {
        if let Some(init) = self.single_child(element)? {
            let init = self.child_expression(element, init)?;
            self.ast.set_slot(owner, Slot::Init, init);
        }
        Ok(())
    }

    fn declaration(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let declaration = self.declaration_parts(element)?;
        let declaration = self
            .ast
            .push(NodeKind::Declaration(declaration), self.trace(element));
        self.initializer(declaration, element)?;
        Ok(declaration)
    }

    /// `<branch>` holds a condition, a success block and an optional
    /// failure block or nested branch, in that order.
    fn branch(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let mut children = elements(element);
        let condition = children
            .next()
            .ok_or_else(|| self.missing_child(element, "condition"))?;
        let success = children
            .next()
            .ok_or_else(|| self.missing_child(element, "success block"))?;
        let failure = children.next();
        if let Some(extra) = children.next() {
            return Err(self.misplaced(element, extra));
        }

        let branch = self
            .ast
            .push(NodeKind::Branch(BranchNode::default()), self.trace(element));

        let condition = self.child_expression(element, condition)?;
        self.ast.set_slot(branch, Slot::Condition, condition);

        let success = self.child_block(element, success)?;
        self.ast.set_slot(branch, Slot::Success, success);

        if let Some(failure) = failure {
            let failure = match tag(failure) {
                "branch" => self.branch(failure)?,
                _ => self.child_block(element, failure)?,
            };
            self.ast.set_slot(branch, Slot::Failure, failure);
        }

        Ok(branch)
    }

    /// `<loop>` holds optional `<loop_init>`, `<loop_condition>` and
    /// `<loop_update>` wrappers plus the body `<block>`, each at most once.
    fn loop_node(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let loop_node = self
            .ast
            .push(NodeKind::Loop(LoopNode::default()), self.trace(element));
        let mut filled = vec![];

        for child in elements(element) {
            let slot = match tag(child) {
                "loop_init" => Slot::Init,
                "loop_condition" => Slot::Condition,
                "loop_update" => Slot::Update,
                "block" => Slot::Code,
                _ => return Err(self.misplaced(element, child)),
            };
            if filled.contains(&slot) {
                return Err(self.misplaced(element, child));
            }
            filled.push(slot);

            let node = match slot {
                Slot::Code => self.block(child)?,
                _ => {
                    let inner = self
                        .single_child(child)?
                        .ok_or_else(|| self.missing_child(child, "expression"))?;
                    match (slot, tag(inner)) {
                        (Slot::Init, "decl") => self.declaration(inner)?,
                        _ => self.child_expression(child, inner)?,
                    }
                }
            };
            self.ast.set_slot(loop_node, slot, node);
        }

        Ok(loop_node)
    }

    fn return_node(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let return_node = self
            .ast
            .push(NodeKind::Return(ReturnNode::default()), self.trace(element));
        if let Some(value) = self.single_child(element)? {
            let value = self.child_expression(element, value)?;
            self.ast.set_slot(return_node, Slot::Value, value);
        }
        Ok(return_node)
    }

    fn break_node(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        if let Some(child) = elements(element).next() {
            return Err(self.misplaced(element, child));
        }
        Ok(self.ast.push(NodeKind::BreakLoop, self.trace(element)))
    }

    /// Reads `args="a:Integer,b:Float Integer,c"` and `return="Integer"`.
    ///
    /// An argument without types is dynamic. A missing or empty `return`,
    /// or `return="void"`, is a void return.
    fn signature(&self, element: Node<'_, '_>) -> Result<FunctionSignature, BuildError> {
        let mut arguments: Vec<(String, TypeInfo)> = vec![];

        let args = element.attribute("args").unwrap_or_default();
        for entry in args.split(',').filter(|entry| !entry.trim().is_empty()) {
            let (name, types) = entry.split_once(':').unwrap_or((entry, ""));
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(self.invalid(element, "args"));
            }
            if arguments.iter().any(|(existing, _)| existing == name) {
                return Err(Error::new(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: name.to_string(),
                    },
                    self.trace(element),
                )
                .into());
            }

            let types = types.split_whitespace().map(String::from).collect();
            arguments.push((name.to_string(), TypeInfo::from_list(types)));
        }

        let return_type = match element.attribute("return").map(str::trim) {
            None | Some("") | Some("void") => TypeInfo::Void,
            Some(types) => TypeInfo::definite(types.split_whitespace()),
        };

        Ok(FunctionSignature::new(arguments, return_type))
    }

    /// Attaches the body of a function, method or constructor. Foreign
    /// ones have none; all others need exactly one `<block>`.
    fn code(
        &mut self,
        owner: NodeId,
        element: Node<'_, '_>,
        foreign: bool,
    ) -> Result<(), BuildError> {
        let body = self.single_child(element)?;
        match (body, foreign) {
            (None, true) => Ok(()),
            (Some(extra), true) => Err(self.misplaced(element, extra)),
            (None, false) => Err(self.missing_child(element, "code block")),
            (Some(body), false) => {
                let body = self.child_block(element, body)?;
                self.ast.set_slot(owner, Slot::Code, body);
                Ok(())
            }
        }
    }

    fn function(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let identifier = element
            .attribute("ident")
            .filter(|ident| !ident.is_empty())
            .map(String::from);
        let foreign = self.flag(element, "foreign")?;
        if foreign && identifier.is_none() {
            return Err(self.missing(element, "ident"));
        }

        let signature = self.signature(element)?;
        let function = self.ast.push(
            NodeKind::Function(FunctionNode::new(identifier, signature, foreign)),
            self.trace(element),
        );
        self.code(function, element, foreign)?;
        Ok(function)
    }

    fn type_node(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let name = self.required(element, "name")?;
        if name.is_empty() {
            return Err(self.invalid(element, "name"));
        }
        let inherits = element
            .attribute("inherits")
            .unwrap_or_default()
            .split_whitespace()
            .map(String::from)
            .collect();

        let type_node = self.ast.push(
            NodeKind::Type(TypeNode {
                name: name.to_string(),
                inherits,
                children: vec![],
            }),
            self.trace(element),
        );

        for child in elements(element) {
            let item = match tag(child) {
                "member" => self.member(child)?,
                "method" => self.method(child)?,
                "constructor" => self.constructor(child)?,
                _ => return Err(self.misplaced(element, child)),
            };
            self.ast.append(type_node, item)?;
        }

        Ok(type_node)
    }

    fn member(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let member = MemberNode {
            declaration: self.declaration_parts(element)?,
            visibility: self.visibility(element, Visibility::Private)?,
            is_static: self.flag(element, "static")?,
        };
        let member = self
            .ast
            .push(NodeKind::Member(member), self.trace(element));
        self.initializer(member, element)?;
        Ok(member)
    }

    fn method(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        let identifier = self.required(element, "ident")?;
        if identifier.is_empty() {
            return Err(self.invalid(element, "ident"));
        }
        let foreign = self.flag(element, "foreign")?;

        let method = MethodNode {
            function: FunctionNode::new(
                Some(identifier.to_string()),
                self.signature(element)?,
                foreign,
            ),
            visibility: self.visibility(element, Visibility::Private)?,
            is_static: self.flag(element, "static")?,
        };
        let method = self
            .ast
            .push(NodeKind::Method(method), self.trace(element));
        self.code(method, element, foreign)?;
        Ok(method)
    }

    fn constructor(&mut self, element: Node<'_, '_>) -> Result<NodeId, BuildError> {
        if self.flag(element, "static")? {
            return Err(self.invalid(element, "static"));
        }
        let foreign = self.flag(element, "foreign")?;
        let arguments = self.signature(element)?.arguments;

        let constructor = ConstructorNode {
            signature: FunctionSignature::new(arguments, TypeInfo::Void),
            visibility: self.visibility(element, Visibility::Public)?,
            foreign,
            code: None,
        };
        let constructor = self
            .ast
            .push(NodeKind::Constructor(constructor), self.trace(element));
        self.code(constructor, element, foreign)?;
        Ok(constructor)
    }
}

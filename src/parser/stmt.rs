use tracing::trace;

use crate::{
    ast::{
        ast::{NodeId, NodeKind, Slot},
        statements::{
            BlockNode, BlockType, BranchNode, ConstructorNode, DeclarationNode, FunctionNode,
            LoopNode, MemberNode, MethodNode, ReturnNode, TypeNode, Visibility,
        },
        types::{Compatibility, FunctionSignature, TypeInfo},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{
        operators::{ASSIGNMENT, COMMA},
        tokens::{Token, TokenKind},
    },
};

use super::{
    expr::parse_expression,
    parser::Parser,
    types::{parse_arguments, parse_signature, parse_type_list},
};

pub fn parse_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let kind = parser.current_token_kind();
    trace!(token = %parser.current_token().debug(), "parsing statement");

    match parser.get_stmt_handler(kind) {
        Some(handler) => handler(parser),
        None => parse_expr_stmt(parser),
    }
}

pub fn parse_expr_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let expression = parse_expression(parser)?;
    parser.expect(TokenKind::Semicolon)?;
    parser.attach(expression)?;

    Ok(expression)
}

/// An identifier followed by another identifier or a comma starts a
/// declaration; anything else starting with an identifier is an expression.
pub fn parse_ident_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    if is_declaration_start(parser) {
        parse_var_decl_stmt(parser)
    } else {
        parse_expr_stmt(parser)
    }
}

fn is_declaration_start(parser: &Parser) -> bool {
    match parser.current_token_kind() {
        TokenKind::Define => true,
        TokenKind::Identifier => {
            parser.peek_kind(1) == TokenKind::Identifier || parser.peek(1).is_operator_named(COMMA)
        }
        _ => false,
    }
}

/// Fills `block` with statements until its terminator.
///
/// The root block ends at EOF, an `if` block at `else` or `end`, any other
/// block at `end`. The terminator itself is left for the caller.
pub fn parse_block_body(
    parser: &mut Parser,
    block: NodeId,
    block_type: BlockType,
) -> Result<(), Error> {
    let previous_block = std::mem::replace(&mut parser.block, block);
    let previous_scope = parser.enter(block);

    loop {
        match parser.current_token_kind() {
            TokenKind::EOF if block_type == BlockType::Root => break,
            TokenKind::EOF => return Err(parser.unexpected("`end`")),
            TokenKind::End if block_type != BlockType::Root => break,
            TokenKind::Else if block_type == BlockType::If => break,
            _ => {
                parse_stmt(parser)?;
            }
        }
    }

    parser.leave(previous_scope);
    parser.block = previous_block;

    Ok(())
}

/// Parses `do ... end` into a new block owned by `parent`.
///
/// An `if` block stops before its `else` or `end`, which the branch
/// consumes.
pub fn parse_block(
    parser: &mut Parser,
    parent: NodeId,
    block_type: BlockType,
) -> Result<NodeId, Error> {
    let error = parser.unexpected("`do`");
    let do_token = parser.expect_error(TokenKind::Do, error)?;

    let block = parser
        .ast
        .push(NodeKind::Block(BlockNode::new(block_type)), do_token.trace);
    parser.ast.adopt(parent, block);

    parse_block_body(parser, block, block_type)?;
    if block_type != BlockType::If {
        parser.expect(TokenKind::End)?;
    }

    Ok(block)
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let parent = parser.block;
    let block = parse_block(parser, parent, BlockType::Code)?;
    parser.attach(block)?;

    Ok(block)
}

/// The name, type and optional initializer of a declaration.
struct DeclarationParts {
    token: Token,
    declaration: DeclarationNode,
    init: Option<NodeId>,
}

fn parse_declaration_parts(parser: &mut Parser) -> Result<DeclarationParts, Error> {
    let type_info = match parser.accept(TokenKind::Define) {
        Some(_) => TypeInfo::Dynamic,
        None => TypeInfo::definite(parse_type_list(parser)?),
    };

    let error = parser.unexpected_detailed("expected identifier in declaration");
    let token = parser.expect_error(TokenKind::Identifier, error)?;

    let init = if parser.current_token().is_operator_named(ASSIGNMENT) {
        parser.advance();
        let init = parse_expression(parser)?;
        check_literal_type(parser, &type_info, init)?;
        Some(init)
    } else {
        None
    };

    Ok(DeclarationParts {
        declaration: DeclarationNode::new(token.value.clone(), type_info),
        token,
        init,
    })
}

/// A literal initializer must be one of the declared types.
fn check_literal_type(parser: &Parser, type_info: &TypeInfo, init: NodeId) -> Result<(), Error> {
    let expression = parser.ast.expression(init);
    let Some(literal_type) = expression.token.kind.literal_type() else {
        return Ok(());
    };

    match type_info.compatibility(Some(literal_type)) {
        Compatibility::Incompatible => Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: type_info.to_string(),
                received: literal_type.to_string(),
            },
            expression.token.trace.clone(),
        )),
        _ => Ok(()),
    }
}

/// Parses `define x [= e]`, `T x [= e]` or `T1, T2 x [= e]` without the
/// trailing `;` and without attaching it anywhere.
pub fn parse_declaration(parser: &mut Parser) -> Result<NodeId, Error> {
    let parts = parse_declaration_parts(parser)?;
    let declaration = parser
        .ast
        .push(NodeKind::Declaration(parts.declaration), parts.token.trace);
    if let Some(init) = parts.init {
        parser.ast.set_slot(declaration, Slot::Init, init);
    }

    Ok(declaration)
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let declaration = parse_declaration(parser)?;
    parser.expect(TokenKind::Semicolon)?;
    parser.attach(declaration)?;

    Ok(declaration)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let parent = parser.block;
    let branch = parse_branch(parser, parent)?;
    parser.attach(branch)?;

    Ok(branch)
}

/// Parses `if cond do ... [else do ... | else if ...] end`.
///
/// An `else if` is a nested branch in the failure slot; the whole chain
/// shares a single `end`.
fn parse_branch(parser: &mut Parser, parent: NodeId) -> Result<NodeId, Error> {
    let if_token = parser.expect(TokenKind::If)?;
    let branch = parser
        .ast
        .push(NodeKind::Branch(BranchNode::default()), if_token.trace);
    parser.ast.adopt(parent, branch);

    let condition = parse_expression(parser)?;
    parser.ast.set_slot(branch, Slot::Condition, condition);

    let success = parse_block(parser, branch, BlockType::If)?;
    parser.ast.set_slot(branch, Slot::Success, success);

    if parser.accept(TokenKind::Else).is_none() {
        parser.expect(TokenKind::End)?;
        return Ok(branch);
    }

    let failure = match parser.current_token_kind() {
        TokenKind::If => parse_branch(parser, branch)?,
        TokenKind::Do => parse_block(parser, branch, BlockType::Code)?,
        _ => {
            return Err(parser.unexpected_detailed("'else' must be followed by 'do' or 'if'"));
        }
    };
    parser.ast.set_slot(branch, Slot::Failure, failure);

    Ok(branch)
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let while_token = parser.expect(TokenKind::While)?;
    let node = parser
        .ast
        .push(NodeKind::Loop(LoopNode::default()), while_token.trace);
    parser.ast.adopt(parser.block, node);

    let condition = parse_expression(parser)?;
    parser.ast.set_slot(node, Slot::Condition, condition);

    let code = parse_block(parser, node, BlockType::Code)?;
    parser.ast.set_slot(node, Slot::Code, code);

    parser.attach(node)?;
    Ok(node)
}

/// Parses `for [init]; [condition]; [update] do ... end`.
///
/// The init declaration is visible to the rest of the header and the body.
pub fn parse_for_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let for_token = parser.expect(TokenKind::For)?;
    let node = parser
        .ast
        .push(NodeKind::Loop(LoopNode::default()), for_token.trace);
    parser.ast.adopt(parser.block, node);
    let previous_scope = parser.enter(node);

    if parser.current_token_kind() != TokenKind::Semicolon {
        let init = if is_declaration_start(parser) {
            parse_declaration(parser)?
        } else {
            parse_expression(parser)?
        };
        parser.ast.set_slot(node, Slot::Init, init);
    }
    parser.expect(TokenKind::Semicolon)?;

    if parser.current_token_kind() != TokenKind::Semicolon {
        let condition = parse_expression(parser)?;
        parser.ast.set_slot(node, Slot::Condition, condition);
    }
    parser.expect(TokenKind::Semicolon)?;

    if parser.current_token_kind() != TokenKind::Do {
        let update = parse_expression(parser)?;
        parser.ast.set_slot(node, Slot::Update, update);
    }

    let code = parse_block(parser, node, BlockType::Code)?;
    parser.ast.set_slot(node, Slot::Code, code);

    parser.leave(previous_scope);
    parser.attach(node)?;
    Ok(node)
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let return_token = parser.expect(TokenKind::Return)?;
    let node = parser
        .ast
        .push(NodeKind::Return(ReturnNode::default()), return_token.trace);

    if parser.current_token_kind() != TokenKind::Semicolon {
        let value = parse_expression(parser)?;
        parser.ast.set_slot(node, Slot::Value, value);
    }
    parser.expect(TokenKind::Semicolon)?;

    parser.attach(node)?;
    Ok(node)
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let break_token = parser.expect(TokenKind::Break)?;
    let node = parser
        .ast
        .push(NodeKind::BreakLoop, break_token.trace.clone());
    parser.ast.adopt(parser.block, node);

    if parser.ast.enclosing_loop(node).is_none() {
        return Err(Error::new(ErrorImpl::BreakOutsideLoop, break_token.trace));
    }
    parser.expect(TokenKind::Semicolon)?;

    parser.attach(node)?;
    Ok(node)
}

/// Parses `function [name] [args] [=> ret] do ... end`.
///
/// The function is attached before its body so the body can call it.
pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let function_token = parser.expect(TokenKind::Function)?;
    let identifier = parser.accept(TokenKind::Identifier).map(|token| token.value);
    let signature = parse_signature(parser)?;

    let function = parser.ast.push(
        NodeKind::Function(FunctionNode::new(identifier, signature, false)),
        function_token.trace,
    );
    parser.attach(function)?;

    let code = parse_block(parser, function, BlockType::Function)?;
    parser.ast.set_slot(function, Slot::Code, code);

    Ok(function)
}

/// Parses `foreign function name [args] [=> ret];`.
pub fn parse_foreign_fn_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let foreign_token = parser.expect(TokenKind::Foreign)?;
    parser.expect(TokenKind::Function)?;

    let error = parser.unexpected_detailed("foreign functions can't be anonymous");
    let name = parser.expect_error(TokenKind::Identifier, error)?;
    let signature = parse_signature(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    let function = parser.ast.push(
        NodeKind::Function(FunctionNode::new(Some(name.value), signature, true)),
        foreign_token.trace,
    );
    parser.attach(function)?;

    Ok(function)
}

/// Parses `type Name [inherits [from] A, B] do ... end`.
pub fn parse_type_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.expect(TokenKind::Type)?;

    let error = parser.unexpected_detailed("expected identifier after 'type'");
    let name = parser.expect_error(TokenKind::Identifier, error)?;

    let inherits = match parser.accept(TokenKind::Inherits) {
        Some(_) => {
            parser.accept(TokenKind::From);
            parse_type_list(parser)?
        }
        None => vec![],
    };

    let type_node = parser.ast.push(
        NodeKind::Type(TypeNode {
            name: name.value,
            inherits,
            children: vec![],
        }),
        name.trace,
    );
    parser.attach(type_node)?;

    let error = parser.unexpected_detailed("expected type body");
    parser.expect_error(TokenKind::Do, error)?;

    let previous_scope = parser.enter(type_node);
    while parser.accept(TokenKind::End).is_none() {
        if parser.current_token_kind() == TokenKind::EOF {
            return Err(parser.unexpected("`end`"));
        }
        parse_type_item(parser, type_node)?;
    }
    parser.leave(previous_scope);

    Ok(type_node)
}

/// Modifiers written before a constructor, method or member.
#[derive(Default)]
struct Modifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    foreign: bool,
}

fn parse_modifiers(parser: &mut Parser) -> Result<Modifiers, Error> {
    let mut modifiers = Modifiers::default();

    loop {
        match parser.current_token_kind() {
            TokenKind::Public | TokenKind::Private | TokenKind::Protected => {
                if modifiers.visibility.is_some() {
                    return Err(parser
                        .unexpected_detailed("cannot have more than one visibility specifier"));
                }
                modifiers.visibility = Visibility::from_keyword(&parser.advance().value);
            }
            TokenKind::Static => {
                if modifiers.is_static {
                    return Err(parser.unexpected_detailed("cannot specify 'static' more than once"));
                }
                modifiers.is_static = true;
                parser.advance();
            }
            TokenKind::Foreign => {
                if modifiers.foreign {
                    return Err(parser.unexpected_detailed("cannot specify 'foreign' more than once"));
                }
                modifiers.foreign = true;
                parser.advance();
            }
            _ => return Ok(modifiers),
        }
    }
}

fn parse_type_item(parser: &mut Parser, type_node: NodeId) -> Result<NodeId, Error> {
    let modifiers = parse_modifiers(parser)?;

    match parser.current_token_kind() {
        TokenKind::Constructor => {
            if modifiers.is_static {
                return Err(parser.unexpected_detailed("constructors can't be static"));
            }
            parse_constructor(parser, type_node, modifiers)
        }
        TokenKind::Method => {
            let Some(visibility) = modifiers.visibility else {
                return Err(parser.unexpected_detailed("methods require a visibility specifier"));
            };
            parse_method(parser, type_node, visibility, modifiers)
        }
        _ => {
            if modifiers.foreign {
                return Err(parser.unexpected_detailed("member fields can't be foreign"));
            }
            let Some(visibility) = modifiers.visibility else {
                return Err(parser.unexpected_detailed("members require a visibility specifier"));
            };
            parse_member(parser, type_node, visibility, modifiers.is_static)
        }
    }
}

fn parse_constructor(
    parser: &mut Parser,
    type_node: NodeId,
    modifiers: Modifiers,
) -> Result<NodeId, Error> {
    let constructor_token = parser.expect(TokenKind::Constructor)?;
    let arguments = parse_arguments(parser)?;

    let constructor = parser.ast.push(
        NodeKind::Constructor(ConstructorNode {
            signature: FunctionSignature::new(arguments, TypeInfo::Void),
            visibility: modifiers.visibility.unwrap_or(Visibility::Public),
            foreign: modifiers.foreign,
            code: None,
        }),
        constructor_token.trace,
    );
    parser.ast.append(type_node, constructor)?;

    if modifiers.foreign {
        parser.expect(TokenKind::Semicolon)?;
    } else {
        let code = parse_block(parser, constructor, BlockType::Function)?;
        parser.ast.set_slot(constructor, Slot::Code, code);
    }

    Ok(constructor)
}

fn parse_method(
    parser: &mut Parser,
    type_node: NodeId,
    visibility: Visibility,
    modifiers: Modifiers,
) -> Result<NodeId, Error> {
    let method_token = parser.expect(TokenKind::Method)?;

    let error = parser.unexpected_detailed("expected method name");
    let name = parser.expect_error(TokenKind::Identifier, error)?;
    let signature = parse_signature(parser)?;

    let method = parser.ast.push(
        NodeKind::Method(MethodNode {
            function: FunctionNode::new(Some(name.value), signature, modifiers.foreign),
            visibility,
            is_static: modifiers.is_static,
        }),
        method_token.trace,
    );
    parser.ast.append(type_node, method)?;

    if modifiers.foreign {
        parser.expect(TokenKind::Semicolon)?;
    } else {
        let code = parse_block(parser, method, BlockType::Function)?;
        parser.ast.set_slot(method, Slot::Code, code);
    }

    Ok(method)
}

fn parse_member(
    parser: &mut Parser,
    type_node: NodeId,
    visibility: Visibility,
    is_static: bool,
) -> Result<NodeId, Error> {
    let parts = parse_declaration_parts(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    let member = parser.ast.push(
        NodeKind::Member(MemberNode {
            declaration: parts.declaration,
            visibility,
            is_static,
        }),
        parts.token.trace,
    );
    if let Some(init) = parts.init {
        parser.ast.set_slot(member, Slot::Init, init);
    }
    parser.ast.append(type_node, member)?;

    Ok(member)
}

//! Type annotations: type lists, argument lists and signatures.
//!
//! A type list is one or more type names separated by commas and stands
//! for the union of those types. `define` in place of a type list means
//! the value is dynamic.

use crate::{
    ast::types::{FunctionSignature, TypeInfo},
    errors::errors::{Error, ErrorImpl},
    lexer::{operators::COMMA, tokens::TokenKind},
};

use super::parser::Parser;

/// Reads `A, B, C` up to the first token that is neither a comma nor a
/// type name following one.
pub fn parse_type_list(parser: &mut Parser) -> Result<Vec<String>, Error> {
    let error = parser.unexpected_detailed("expected identifier in type list");
    let mut types = vec![parser.expect_error(TokenKind::Identifier, error)?.value];

    while parser.current_token().is_operator_named(COMMA) {
        parser.advance();
        let error = parser.unexpected_detailed("expected identifier in type list");
        types.push(parser.expect_error(TokenKind::Identifier, error)?.value);
    }

    Ok(types)
}

/// Parses `[T a, T1, T2 b, define c]`. No bracket means no arguments.
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<(String, TypeInfo)>, Error> {
    let mut arguments: Vec<(String, TypeInfo)> = vec![];
    if parser.accept(TokenKind::OpenBracket).is_none() {
        return Ok(arguments);
    }

    loop {
        let type_info = match parser.accept(TokenKind::Define) {
            Some(_) => TypeInfo::Dynamic,
            None => TypeInfo::definite(parse_type_list(parser)?),
        };

        let error = parser.unexpected_detailed("expected argument name");
        let name = parser.expect_error(TokenKind::Identifier, error)?;
        if arguments.iter().any(|(existing, _)| *existing == name.value) {
            return Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: name.value,
                },
                name.trace,
            ));
        }
        arguments.push((name.value, type_info));

        if parser.accept(TokenKind::CloseBracket).is_some() {
            break;
        }
        if !parser.current_token().is_operator_named(COMMA) {
            return Err(parser.unexpected("`,` or `]`"));
        }
        parser.advance();
    }

    Ok(arguments)
}

/// Parses `=> T1, T2` or `=> void`. No arrow means a void return.
pub fn parse_return_type(parser: &mut Parser) -> Result<TypeInfo, Error> {
    if parser.accept(TokenKind::FatArrow).is_none() || parser.accept(TokenKind::Void).is_some() {
        return Ok(TypeInfo::Void);
    }

    Ok(TypeInfo::definite(parse_type_list(parser)?))
}

pub fn parse_signature(parser: &mut Parser) -> Result<FunctionSignature, Error> {
    let arguments = parse_arguments(parser)?;
    let return_type = parse_return_type(parser)?;

    Ok(FunctionSignature::new(arguments, return_type))
}

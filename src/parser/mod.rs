//! Parser module for building the Abstract Syntax Tree (AST).
//!
//! This module turns the lexer's token stream into an [`Ast`](crate::ast::ast::Ast).
//! Expressions are parsed by precedence climbing over the operator table;
//! statements by recursive descent dispatched on the leading token:
//!
//! - Declarations (`define x;`, `Integer x = 1;`, `Float, Integer x;`)
//! - Control flow (`if`/`else`, `while`, `for`, `return`, `break`)
//! - Functions, foreign functions and type definitions
//!
//! Names are checked while parsing: a redeclaration in the same block or a
//! use of an undeclared identifier is reported as a reference error.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod scope;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;

//! Lexical analysis.
//!
//! Converts source text into tokens. It handles:
//!
//! - The operator table and fixity resolution for `+`, `-`, `++` and `--`
//! - Numeric literals in decimal, hexadecimal, octal and binary
//! - String literals with escape sequences
//! - Keywords, identifiers, booleans and construct characters
//! - Comments and whitespace

pub mod lexer;
pub mod operators;
pub mod tokens;

#[cfg(test)]
mod tests;

//! Alternate producer that builds the AST from an XML document.
//!
//! The document describes the tree directly, one element per node, so no
//! lexing or precedence climbing is involved. Trees built here compare
//! equal to the parser's output for the same program.

pub mod builder;

#[cfg(test)]
mod tests;

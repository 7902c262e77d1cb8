/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The node arena, scope lookups and deep equality
/// - expressions: Operator applications and terminals
/// - statements: Blocks, declarations, control flow, functions and types
/// - types: The gradual type model and function signatures
/// - visitor: The visitor contract and a tree printer built on it
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
pub mod visitor;

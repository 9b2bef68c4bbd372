/// AST (Abstract Syntax Tree) module
///
/// Submodules:
/// - ast: the `Node` sum type
/// - expressions: expression nodes and operators
/// - statements: statement nodes
/// - types: static types and struct layouts
/// - dump: stable textual dump of a tree
pub mod ast;
pub mod dump;
pub mod expressions;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;

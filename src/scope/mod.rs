//! Symbol tables for types, variables and functions, organised as a tree of
//! lexical scopes.

pub mod scope;

#[cfg(test)]
mod tests;

//! Parser module for building the Abstract Syntax Tree (AST).
//!
//! A Pratt parser for expressions (NUD/LED handlers with binding powers)
//! and table-driven recursive descent for statements. Scopes are populated
//! and names resolved as declarations are parsed. Failed statements are
//! reported and skipped so a single run collects every diagnostic.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

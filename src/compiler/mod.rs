//! Lowering of the resolved tree to LLVM IR.
//!
//! - Statements and blocks, including the value an `if` branch yields
//! - Expressions in typed or all-double arithmetic
//! - Struct layouts as packed named types
//! - File-scope initialisation through `__module_init`

pub mod compiler;
pub mod expr;
pub mod stmt;

#[cfg(test)]
mod tests;

//! Error types and error handling for the compiler.
//!
//! This module defines the diagnostics produced by every phase:
//!
//! - Error structures with source position information
//! - Specific error variants, grouped into lexical, syntax, semantic and
//!   codegen kinds
//! - A diagnostics list returned to the caller instead of aborting
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;

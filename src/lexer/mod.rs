//! Lexical analysis.
//!
//! Turns source text into [`tokens::Token`]s through the
//! [`tokens::TokenStream`] trait. Malformed input never aborts the lexer; it
//! is reported as an `Error` token and left for the parser to diagnose.

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;

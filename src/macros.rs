//! Helper macros for the lexer.
//!
//! - `MK_TOKEN!` builds a [`Token`](crate::lexer::tokens::Token)
//! - `MK_DEFAULT_HANDLER!` builds a regex handler for fixed punctuation

/// Creates a Token instance.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        $crate::lexer::tokens::Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a handler for a pattern that always matches the literal `$value`.
///
/// The handler emits one token of `$kind` and consumes `$value.len()` bytes.
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^\\+").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut $crate::lexer::lexer::Lexer, _regex: &regex::Regex| {
            Some(lexer.make_token($kind, String::from($value), $value.len()))
        }
    };
}

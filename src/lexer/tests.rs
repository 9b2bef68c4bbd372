//! Unit tests for the lexer module.
//!
//! Covers keywords, literals, operators, comments, line tracking and the
//! error tokens produced for malformed input.

use pretty_assertions::assert_eq;

use super::{
    lexer::{lex_error, tokenize, Lexer},
    tokens::{Token, TokenBuffer, TokenKind, TokenStream},
};
use crate::errors::errors::ErrorImpl;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.c".to_string()))
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    assert_eq!(
        kinds("void char short int long float double enum struct if else while return"),
        vec![
            TokenKind::Void,
            TokenKind::Char,
            TokenKind::Short,
            TokenKind::Int,
            TokenKind::Long,
            TokenKind::Float,
            TokenKind::Double,
            TokenKind::Enum,
            TokenKind::Struct,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = tokenize("foo baz_123 _tmp integer".to_string(), None);

    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, vec!["foo", "baz_123", "_tmp", "integer", "EOF"]);
    assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::Identifier));
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("42 3.14 0 7.".to_string(), None);

    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].kind, TokenKind::Integer);
    assert_eq!(tokens[3].kind, TokenKind::FloatLiteral);
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_malformed_number_is_error_token() {
    let tokens = tokenize("x = 1.2.3;".to_string(), None);

    assert_eq!(tokens[2].kind, TokenKind::Error);
    assert_eq!(tokens[2].value, "1.2.3");
    assert_eq!(
        lex_error(&tokens[2]),
        ErrorImpl::MalformedNumber {
            token: "1.2.3".to_string()
        }
    );
    assert_eq!(tokens[3].kind, TokenKind::Semicolon);
}

#[test]
fn test_char_literals() {
    let tokens = tokenize(r"'a' '\n' '\''".to_string(), None);

    assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
    assert_eq!(tokens[0].value, "a");
    assert_eq!(tokens[1].value, "\n");
    assert_eq!(tokens[2].value, "'");
}

#[test]
fn test_bad_char_literals() {
    let tokens = tokenize("'ab' 'c".to_string(), None);

    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(lex_error(&tokens[0]), ErrorImpl::UnterminatedChar);
    assert_eq!(tokens[1].kind, TokenKind::Error);
    assert_eq!(tokens[1].value, "'c");
    assert_eq!(tokens[2].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_strings() {
    let tokens = tokenize(r#""hello" "tab\there""#.to_string(), None);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "tab\there");
}

#[test]
fn test_unterminated_string() {
    let tokens = tokenize("\"open\nint".to_string(), None);

    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(lex_error(&tokens[0]), ErrorImpl::UnterminatedString);
    assert_eq!(tokens[1].kind, TokenKind::Int);
    assert_eq!(tokens[1].line(), 2);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("= == ! != < <= > >= . -> += -= *= /= + - * /"),
        vec![
            TokenKind::Assignment,
            TokenKind::Equals,
            TokenKind::Not,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::Dot,
            TokenKind::Arrow,
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] ; ,"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_operators_without_spaces() {
    assert_eq!(
        kinds("a->b+=c-1"),
        vec![
            TokenKind::Identifier,
            TokenKind::Arrow,
            TokenKind::Identifier,
            TokenKind::PlusEquals,
            TokenKind::Identifier,
            TokenKind::Dash,
            TokenKind::Integer,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    let tokens = tokenize("int x; // trailing\n// whole line\nx = 1;".to_string(), None);

    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, vec!["int", "x", ";", "x", "=", "1", ";", "EOF"]);
    assert_eq!(tokens[3].line(), 3);
}

#[test]
fn test_unknown_character() {
    let tokens = tokenize("a @ b".to_string(), None);

    assert_eq!(tokens[1].kind, TokenKind::Error);
    assert_eq!(
        lex_error(&tokens[1]),
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string()
        }
    );
    assert_eq!(tokens[2].value, "b");
}

#[test]
fn test_line_and_column_tracking() {
    let tokens = tokenize("int a;\n  a = 2;".to_string(), Some("main.c".to_string()));

    assert_eq!(tokens[0].span.start.line, 1);
    assert_eq!(tokens[0].span.start.column, 1);
    assert_eq!(tokens[3].value, "a");
    assert_eq!(tokens[3].span.start.line, 2);
    assert_eq!(tokens[3].span.start.column, 3);
    assert_eq!(tokens[3].span.start.file.as_str(), "main.c");
}

#[test]
fn test_empty_source_yields_eof() {
    let tokens = tokenize(String::new(), None);

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::EOF);
}

#[test]
fn test_stream_keeps_returning_eof() {
    let mut lexer = Lexer::new("x".to_string(), None);

    assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().kind, TokenKind::EOF);
    assert_eq!(lexer.next_token().kind, TokenKind::EOF);
}

#[test]
fn test_add_line_extends_the_stream() {
    let mut lexer = Lexer::new(String::new(), None);
    lexer.add_line("int a;");

    assert_eq!(lexer.next_token().kind, TokenKind::Int);
    assert_eq!(lexer.next_token().kind, TokenKind::Identifier);

    lexer.add_line("a = 1;");

    assert_eq!(lexer.next_token().kind, TokenKind::Semicolon);
    let target = lexer.next_token();
    assert_eq!(target.value, "a");
    assert_eq!(target.line(), 2);
}

#[test]
fn test_token_buffer_replays_tokens() {
    let tokens = tokenize("x;".to_string(), None);
    let mut buffer = TokenBuffer::new(tokens.clone());

    let replayed: Vec<Token> = (0..4).map(|_| buffer.next_token()).collect();
    assert_eq!(replayed[..3], tokens[..]);
    assert_eq!(replayed[3].kind, TokenKind::EOF);
}

use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("void", TokenKind::Void);
        map.insert("char", TokenKind::Char);
        map.insert("short", TokenKind::Short);
        map.insert("int", TokenKind::Int);
        map.insert("long", TokenKind::Long);
        map.insert("float", TokenKind::Float);
        map.insert("double", TokenKind::Double);
        map.insert("enum", TokenKind::Enum);
        map.insert("struct", TokenKind::Struct);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("return", TokenKind::Return);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    /// Lexical error sentinel; the token value carries the message.
    Error,

    Identifier,
    Integer,
    FloatLiteral,
    CharLiteral,
    String,

    // Primitive types
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,

    Enum,
    Struct,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Dot,
    Arrow, // ->
    Semicolon,
    Comma,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,

    Plus,
    Dash,
    Slash,
    Star,

    // Reserved
    If,
    Else,
    While,
    Return,
}

impl TokenKind {
    pub fn is_primitive_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer | TokenKind::FloatLiteral | TokenKind::CharLiteral | TokenKind::String
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    /// The 1-based source line the token starts on.
    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn debug(&self) {
        if self.is_one_of_many(&[
            TokenKind::String,
            TokenKind::Identifier,
            TokenKind::Integer,
            TokenKind::FloatLiteral,
            TokenKind::CharLiteral,
            TokenKind::Error,
        ]) {
            log::trace!("{} ({}) line {}", self.kind, self.value, self.line());
        } else {
            log::trace!("{} () line {}", self.kind, self.line());
        }
    }
}

/// Source of tokens for the parser.
///
/// A stream is lazy, finite and cannot be restarted. Once exhausted it keeps
/// returning an `EOF` token.
pub trait TokenStream {
    fn next_token(&mut self) -> Token;
}

/// Replays a fixed list of tokens.
pub struct TokenBuffer {
    tokens: std::vec::IntoIter<Token>,
    eof: Token,
}

impl TokenBuffer {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens
            .iter()
            .rev()
            .find(|token| token.kind == TokenKind::EOF)
            .cloned()
            .or_else(|| {
                tokens.last().map(|last| Token {
                    kind: TokenKind::EOF,
                    value: String::from("EOF"),
                    span: Span {
                        start: last.span.end.clone(),
                        end: last.span.end.clone(),
                    },
                })
            })
            .unwrap_or(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span::null(),
            });

        TokenBuffer {
            tokens: tokens.into_iter(),
            eof,
        }
    }
}

impl TokenStream for TokenBuffer {
    fn next_token(&mut self) -> Token {
        self.tokens.next().unwrap_or_else(|| self.eof.clone())
    }
}

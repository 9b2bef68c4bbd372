use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{errors::errors::ErrorImpl, Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN};

use super::tokens::{Token, TokenKind, TokenStream, RESERVED_LOOKUP};

/// Produces the next token from the text matched by the pattern, or `None`
/// when the match is skipped (whitespace, comments).
pub type RegexHandler = fn(&mut Lexer, &Regex) -> Option<Token>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new("^[0-9][0-9.]*").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new("^\\s+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^//[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^\"[^\"\n]*\"").unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new("^\"[^\"\n]*").unwrap(), handler: error_handler },
        RegexPattern { regex: Regex::new("^'(\\\\.|[^'\\\\\n])'").unwrap(), handler: char_handler },
        RegexPattern { regex: Regex::new("^'[^'\n]*'?").unwrap(), handler: error_handler },
        RegexPattern { regex: Regex::new("^\\[").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[") },
        RegexPattern { regex: Regex::new("^\\]").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]") },
        RegexPattern { regex: Regex::new("^\\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new("^\\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new("^\\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new("^\\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new("^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new("^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new("^!").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Not, "!") },
        RegexPattern { regex: Regex::new("^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new("^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new("^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new("^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new("^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new("^\\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dot, ".") },
        RegexPattern { regex: Regex::new("^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new("^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new("^->").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->") },
        RegexPattern { regex: Regex::new("^\\+=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=") },
        RegexPattern { regex: Regex::new("^-=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=") },
        RegexPattern { regex: Regex::new("^\\*=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=") },
        RegexPattern { regex: Regex::new("^/=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=") },
        RegexPattern { regex: Regex::new("^\\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new("^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new("^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new("^\\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
    ];
}

/// Lazy tokenizer over a growing source buffer.
///
/// Lines can be appended with [`Lexer::add_line`] while tokens are being
/// pulled; each call to [`TokenStream::next_token`] scans just far enough to
/// produce one token.
pub struct Lexer {
    source: String,
    pos: usize,
    line: u32,
    line_start: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            source,
            pos: 0,
            line: 1,
            line_start: 0,
            file: file_name,
        }
    }

    /// Appends one source line. Embedded `\r\n` pairs are normalised to `\n`.
    pub fn add_line(&mut self, line: &str) {
        if !self.source.is_empty() && !self.source.ends_with('\n') {
            self.source.push('\n');
        }
        self.source.push_str(&line.replace("\r\n", "\n"));
        self.source.push('\n');
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    pub fn get_position(&self) -> Position {
        Position::new(
            self.line,
            (self.pos - self.line_start) as u32 + 1,
            Rc::clone(&self.file),
        )
    }

    /// Consumes `n` bytes, keeping the line counter in sync.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for (offset, byte) in self.source.as_bytes()[self.pos..end].iter().enumerate() {
            if *byte == b'\n' {
                self.line += 1;
                self.line_start = self.pos + offset + 1;
            }
        }
        self.pos = end;
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Builds a token for the next `len` bytes and consumes them.
    pub fn make_token(&mut self, kind: TokenKind, value: String, len: usize) -> Token {
        let start = self.get_position();
        self.advance_n(len);
        let end = self.get_position();

        MK_TOKEN!(kind, value, Span { start, end })
    }

    fn matched(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map(|found| found.as_str().to_string())
            .unwrap_or_default()
    }
}

impl TokenStream for Lexer {
    fn next_token(&mut self) -> Token {
        while !self.at_eof() {
            let pattern = PATTERNS
                .iter()
                .find(|pattern| pattern.regex.is_match(self.remainder()));

            let token = match pattern {
                Some(pattern) => (pattern.handler)(self, &pattern.regex),
                None => {
                    let len = self.at().map(char::len_utf8).unwrap_or(1);
                    let value = self.remainder()[..len].to_string();
                    Some(self.make_token(TokenKind::Error, value, len))
                }
            };

            if let Some(token) = token {
                token.debug();
                return token;
            }
        }

        let position = self.get_position();
        MK_TOKEN!(
            TokenKind::EOF,
            String::from("EOF"),
            Span {
                start: position.clone(),
                end: position
            }
        )
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let matched = lexer.matched(regex);
    let kind = match matched.matches('.').count() {
        0 => TokenKind::Integer,
        1 => TokenKind::FloatLiteral,
        _ => TokenKind::Error,
    };

    let len = matched.len();
    Some(lexer.make_token(kind, matched, len))
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let len = lexer.matched(regex).len();
    lexer.advance_n(len);
    None
}

fn error_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let matched = lexer.matched(regex);
    let len = matched.len();
    Some(lexer.make_token(TokenKind::Error, matched, len))
}

fn unescape(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    }
}

fn char_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let matched = lexer.matched(regex);
    let inner = &matched[1..matched.len() - 1];

    let mut chars = inner.chars();
    let value = match (chars.next(), chars.next()) {
        (Some('\\'), Some(escaped)) => unescape(escaped).unwrap_or(escaped),
        (Some(ch), _) => ch,
        (None, _) => '\0',
    };

    let len = matched.len();
    Some(lexer.make_token(TokenKind::CharLiteral, value.to_string(), len))
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let matched = lexer.matched(regex);
    let string_literal = &matched[1..matched.len() - 1];

    let mut result = String::new();
    let mut chars = string_literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek().copied().and_then(unescape) {
            Some(escaped) => {
                result.push(escaped);
                chars.next();
            }
            // Keep the backslash
            None => result.push(ch),
        }
    }

    let len = matched.len();
    Some(lexer.make_token(TokenKind::String, result, len))
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let value = lexer.matched(regex);
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let len = value.len();
    Some(lexer.make_token(kind, value, len))
}

/// Classifies an `Error` token produced by the lexer.
pub fn lex_error(token: &Token) -> ErrorImpl {
    match token.value.chars().next() {
        Some(ch) if ch.is_ascii_digit() => ErrorImpl::MalformedNumber {
            token: token.value.clone(),
        },
        Some('\'') => ErrorImpl::UnterminatedChar,
        Some('"') => ErrorImpl::UnterminatedString,
        _ => ErrorImpl::UnrecognisedToken {
            token: token.value.clone(),
        },
    }
}

/// Tokenizes a whole source string, including the trailing `EOF` token.
pub fn tokenize(source: String, file: Option<String>) -> Vec<Token> {
    let mut lex = Lexer::new(source, file);
    let mut tokens = vec![];

    loop {
        let token = lex.next_token();
        let is_eof = token.kind == TokenKind::EOF;
        tokens.push(token);

        if is_eof {
            return tokens;
        }
    }
}

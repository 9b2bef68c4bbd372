//! Parser state and the top-level `parse` entry point.
//!
//! The parser pulls one token at a time from a [`TokenStream`] and dispatches
//! through lookup tables: statement handlers keyed by the leading token, NUD
//! (prefix) and LED (infix) expression handlers with a binding power per
//! infix operator, and type handlers for the tokens that can start a type.
//!
//! Names are resolved while parsing. Declarations go into the
//! [`ScopeTable`] as they are seen, so every identifier in the finished tree
//! already points at its variable, function or struct member.

use std::collections::HashMap;

use crate::{
    ast::{statements::BlockStmt, types::VarType},
    errors::errors::{Diagnostics, Error, ErrorImpl},
    lexer::{
        lexer::{lex_error, Lexer},
        tokens::{Token, TokenKind, TokenStream},
    },
    scope::scope::{ScopeId, ScopeTable},
    CompileOptions, Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup, TypeHandler, TypeLookup,
    },
    stmt::parse_block_body,
};

pub struct Parser {
    stream: Box<dyn TokenStream>,
    current: Token,
    /// End of the most recently consumed token
    previous_end: Position,
    /// Number of `{` consumed and not yet closed
    brace_depth: usize,
    /// Tokens consumed so far and the kind of the last one
    consumed: usize,
    last_kind: TokenKind,
    pub scopes: ScopeTable,
    pub options: CompileOptions,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_lookup: TypeLookup,
    /// Return type of the function whose body is being parsed.
    pub return_type: Option<VarType>,
    diagnostics: Diagnostics,
}

/// Scope and function context to restore after a failed statement.
pub struct Checkpoint {
    scope: ScopeId,
    return_type: Option<VarType>,
    brace_depth: usize,
    consumed: usize,
}

impl Parser {
    pub fn new(mut stream: Box<dyn TokenStream>, options: CompileOptions) -> Self {
        let current = stream.next_token();
        let previous_end = current.span.start.clone();

        Parser {
            stream,
            current,
            previous_end,
            brace_depth: 0,
            consumed: 0,
            last_kind: TokenKind::EOF,
            scopes: ScopeTable::new(),
            options,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_lookup: HashMap::new(),
            return_type: None,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.current
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Moves to the next token and returns the one that was current.
    pub fn advance(&mut self) -> Token {
        let next = if self.current.kind == TokenKind::EOF {
            self.current.clone()
        } else {
            self.stream.next_token()
        };

        let token = std::mem::replace(&mut self.current, next);
        match token.kind {
            TokenKind::OpenCurly => self.brace_depth += 1,
            TokenKind::CloseCurly => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
        self.previous_end = token.span.end.clone();
        self.consumed += 1;
        self.last_kind = token.kind;
        token
    }

    /// Error for the current token. Lexical error tokens are reported as
    /// what they are rather than as a misplaced token.
    pub fn unexpected(&self) -> Error {
        let token = self.current_token();
        let error = if token.kind == TokenKind::Error {
            lex_error(token)
        } else {
            ErrorImpl::UnexpectedToken {
                token: token.value.clone(),
            }
        };

        Error::new(error, token.span.start.clone())
    }

    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() == expected_kind {
            return Ok(self.advance());
        }

        match error {
            Some(error) if self.current_token_kind() != TokenKind::Error => Err(error),
            _ => Err(self.unexpected()),
        }
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_lookup(&self) -> &TypeLookup {
        &self.type_lookup
    }

    /// Binding power of the current token; tokens that cannot continue an
    /// expression have `Default`.
    pub fn current_bp(&self) -> BindingPower {
        self.binding_power_lookup
            .get(&self.current_token_kind())
            .copied()
            .unwrap_or(BindingPower::Default)
    }

    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn type_handler(&mut self, kind: TokenKind, type_fn: TypeHandler) {
        self.type_lookup.insert(kind, type_fn);
    }

    /// True if the current token starts a declaration: a primitive keyword or
    /// the name of a visible struct.
    pub fn at_type_start(&self) -> bool {
        let token = self.current_token();
        match token.kind {
            kind if kind.is_primitive_type() => true,
            TokenKind::Identifier => self.scopes.find_type(&token.value).is_some(),
            _ => false,
        }
    }

    pub fn get_position(&self) -> Position {
        self.current.span.start.clone()
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        Span {
            start,
            end: self.previous_end.clone(),
        }
    }

    pub fn report(&mut self, error: Error) {
        self.diagnostics.push(error);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            scope: self.scopes.current(),
            return_type: self.return_type.clone(),
            brace_depth: self.brace_depth,
            consumed: self.consumed,
        }
    }

    /// Skips the rest of a failed statement and restores the scope and
    /// function context it started in.
    ///
    /// Stops after a `;` at the statement's own brace depth, after the `}`
    /// that brings the depth back to it, or before a `}` that closes the
    /// enclosing block. A statement that failed after its own `;` or
    /// closing `}` has nothing left to skip.
    pub fn recover(&mut self, checkpoint: Checkpoint) {
        self.scopes.activate(checkpoint.scope);
        self.return_type = checkpoint.return_type;

        let depth = checkpoint.brace_depth;
        if self.consumed > checkpoint.consumed
            && matches!(self.last_kind, TokenKind::Semicolon | TokenKind::CloseCurly)
            && self.brace_depth <= depth
        {
            return;
        }

        loop {
            match self.current_token_kind() {
                TokenKind::EOF => return,
                TokenKind::Semicolon if self.brace_depth <= depth => {
                    self.advance();
                    return;
                }
                TokenKind::CloseCurly if self.brace_depth <= depth => return,
                TokenKind::CloseCurly => {
                    self.advance();
                    if self.brace_depth <= depth {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}

/// Output of [`parse`]: the file-scope block, the symbols it refers to and
/// every diagnostic found on the way.
pub struct ParseResult {
    pub root: BlockStmt,
    pub scopes: ScopeTable,
    pub diagnostics: Diagnostics,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Parses a whole compilation unit.
///
/// A statement that fails is reported and skipped; parsing then resumes at
/// the next statement, so one call reports every independent error.
pub fn parse(stream: Box<dyn TokenStream>, options: CompileOptions) -> ParseResult {
    let mut parser = Parser::new(stream, options);
    create_token_lookups(&mut parser);

    let start = parser.get_position();
    let mut body = parse_block_body(&mut parser);

    // A stray `}` at file scope ends `parse_block_body` early
    while parser.has_tokens() {
        let error = parser.unexpected();
        parser.report(error);
        parser.advance();
        body.extend(parse_block_body(&mut parser));
    }

    let root = BlockStmt {
        body,
        scope: ScopeId::ROOT,
        span: parser.span_from(start),
    };

    ParseResult {
        root,
        scopes: parser.scopes,
        diagnostics: parser.diagnostics,
    }
}

/// Lexes and parses a source string.
pub fn parse_source(source: &str, file: Option<String>, options: CompileOptions) -> ParseResult {
    parse(Box::new(Lexer::new(source.to_string(), file)), options)
}

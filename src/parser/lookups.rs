use std::collections::HashMap;

use crate::{ast::{ast::Node, types::VarType}, errors::errors::Error, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser, stmt::*, types::*};

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Comma,
    Assignment,
    Equality,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Member,
    Primary,
}

impl BindingPower {
    /// The next lower level. Parsing the right operand at this level lets an
    /// operator of the same level group to the right.
    pub fn weaker(self) -> BindingPower {
        match self {
            BindingPower::Default | BindingPower::Comma => BindingPower::Default,
            BindingPower::Assignment => BindingPower::Comma,
            BindingPower::Equality => BindingPower::Assignment,
            BindingPower::Relational => BindingPower::Equality,
            BindingPower::Additive => BindingPower::Relational,
            BindingPower::Multiplicative => BindingPower::Additive,
            BindingPower::Unary => BindingPower::Multiplicative,
            BindingPower::Member => BindingPower::Unary,
            BindingPower::Primary => BindingPower::Member,
        }
    }
}

/// Statement handlers return `None` for statements that leave nothing in the
/// tree (struct declarations, empty statements).
pub type StmtHandler = fn(&mut Parser) -> Result<Option<Node>, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Node, Error>;
pub type LEDHandler = fn(&mut Parser, Node, BindingPower) -> Result<Node, Error>;
pub type TypeHandler = fn(&mut Parser) -> Result<VarType, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    parser.led(TokenKind::Comma, BindingPower::Comma, parse_binary_expr);

    parser.led(TokenKind::Assignment, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::PlusEquals, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::MinusEquals, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::StarEquals, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::SlashEquals, BindingPower::Assignment, parse_assignment_expr);

    parser.led(TokenKind::Equals, BindingPower::Equality, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Equality, parse_binary_expr);

    parser.led(TokenKind::Less, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Relational, parse_binary_expr);

    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);

    parser.led(TokenKind::Dot, BindingPower::Member, parse_member_expr);
    parser.led(TokenKind::Arrow, BindingPower::Member, parse_member_expr);

    // Literals and symbols
    parser.nud(TokenKind::Integer, parse_primary_expr);
    parser.nud(TokenKind::FloatLiteral, parse_primary_expr);
    parser.nud(TokenKind::CharLiteral, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_identifier_expr);
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);

    // Statements
    parser.stmt(TokenKind::Struct, parse_struct_decl_stmt);
    parser.stmt(TokenKind::Enum, parse_enum_decl_stmt);
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::While, parse_while_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::OpenCurly, parse_block_stmt);
    parser.stmt(TokenKind::Identifier, parse_expression_stmt);
    parser.stmt(TokenKind::Semicolon, parse_empty_stmt);

    // Types
    for kind in [
        TokenKind::Void,
        TokenKind::Char,
        TokenKind::Short,
        TokenKind::Int,
        TokenKind::Long,
        TokenKind::Float,
        TokenKind::Double,
    ] {
        parser.type_handler(kind, parse_primitive_type);
    }
    parser.type_handler(TokenKind::Identifier, parse_named_type);
    parser.type_handler(TokenKind::Struct, parse_struct_type);
}

// Owned by each Parser, filled by create_token_lookups
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
pub type TypeLookup = HashMap<TokenKind, TypeHandler>;

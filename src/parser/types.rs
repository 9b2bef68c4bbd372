//! Type syntax and the typing rules applied while parsing.
//!
//! Types must match exactly. The one relaxation is for constant expressions
//! built from literals: an integer constant fits any numeric type and a
//! floating constant fits `float` or `double`. An integer literal stored
//! into an integer type must be within that type's signed range.

use std::rc::Rc;

use crate::{
    ast::{
        ast::Node,
        expressions::{Literal, UnaryOp},
        types::VarType,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position,
};

use super::parser::Parser;

pub fn parse_primitive_type(parser: &mut Parser) -> Result<VarType, Error> {
    let token = parser.advance();
    VarType::primitive(token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnknownType {
                type_: token.value.clone(),
            },
            token.span.start.clone(),
        )
    })
}

/// A struct referred to by its bare name, `P p;`.
pub fn parse_named_type(parser: &mut Parser) -> Result<VarType, Error> {
    let token = parser.advance();
    lookup_type(parser, &token)
}

/// `struct P` used as a type.
pub fn parse_struct_type(parser: &mut Parser) -> Result<VarType, Error> {
    parser.expect(TokenKind::Struct)?;
    let name = parser.expect(TokenKind::Identifier)?;
    lookup_type(parser, &name)
}

fn lookup_type(parser: &Parser, name: &Token) -> Result<VarType, Error> {
    parser.scopes.find_type(&name.value).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnknownType {
                type_: name.value.clone(),
            },
            name.span.start.clone(),
        )
    })
}

/// Parses the type at the start of a declaration, without declarator parts.
pub fn parse_type(parser: &mut Parser) -> Result<VarType, Error> {
    let kind = parser.current_token_kind();
    let handler = match parser.get_type_lookup().get(&kind) {
        Some(handler) => *handler,
        None => return Err(parser.unexpected()),
    };

    handler(parser)
}

/// Parses `*`s, the declared name and an optional `[N]` suffix.
pub fn parse_declarator(parser: &mut Parser, base: VarType) -> Result<(VarType, Token), Error> {
    let mut var_type = base;
    while parser.eat(TokenKind::Star) {
        var_type = var_type.pointer_to();
    }

    let name = parser.expect(TokenKind::Identifier)?;

    if parser.eat(TokenKind::OpenBracket) {
        let count = parser.expect(TokenKind::Integer)?;
        let length = match count.value.parse::<u32>() {
            Ok(length) if length > 0 => length,
            _ => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: count.value },
                    count.span.start,
                ))
            }
        };
        parser.expect(TokenKind::CloseBracket)?;
        var_type = VarType::Array(Rc::new(var_type), length);
    }

    Ok((var_type, name))
}

/// True if a constant of type `constant` can stand for a value of `target`.
fn constant_fits(constant: &VarType, target: &VarType) -> bool {
    (constant.is_integer() && target.is_numeric()) || (constant.is_float() && target.is_float())
}

/// The value of an integer literal, possibly negated.
fn integer_literal(node: &Node) -> Option<i64> {
    match node {
        Node::Value(expr) => match expr.value {
            Literal::Integer(value) => Some(value),
            _ => None,
        },
        Node::Unary(expr) if expr.operator == UnaryOp::Negate => {
            integer_literal(&expr.operand).and_then(i64::checked_neg)
        }
        _ => None,
    }
}

/// Whether `value` survives a store into the signed integer type `target`.
fn integer_fits(value: i64, target: &VarType) -> bool {
    let bits = target.size() * 8;
    if bits >= 64 {
        return true;
    }
    let limit = 1i64 << (bits - 1);
    (-limit..limit).contains(&value)
}

/// Checks that `value` can be stored into something of type `target`.
pub fn check_assignable(value: &Node, target: &VarType, position: Position) -> Result<(), Error> {
    let value_type = value.var_type();
    if target.is_integer() {
        if let Some(literal) = integer_literal(value) {
            if !integer_fits(literal, target) {
                return Err(type_mismatch(target, &value_type, position));
            }
        }
    }
    if value_type == *target || value_type.is_error() || target.is_error() {
        return Ok(());
    }

    if value.is_constant() && constant_fits(&value_type, target) {
        return Ok(());
    }

    Err(type_mismatch(target, &value_type, position))
}

/// The common type of two operands, adapting a constant side to the other.
pub fn unify(left: &Node, right: &Node, position: Position) -> Result<VarType, Error> {
    let left_type = left.var_type();
    let right_type = right.var_type();

    if left_type.is_error() || right_type.is_error() {
        return Ok(VarType::Error);
    }
    if left_type == right_type {
        return Ok(left_type);
    }

    match (left.is_constant(), right.is_constant()) {
        (true, true) if left_type.is_numeric() && right_type.is_numeric() => {
            // Two constants widen: floating beats integer, then the larger size wins
            let left_wins = match (left_type.is_float(), right_type.is_float()) {
                (true, false) => true,
                (false, true) => false,
                _ => left_type.size() >= right_type.size(),
            };
            Ok(if left_wins { left_type } else { right_type })
        }
        (true, false) if constant_fits(&left_type, &right_type) => Ok(right_type),
        (false, true) if constant_fits(&right_type, &left_type) => Ok(left_type),
        _ => Err(type_mismatch(&left_type, &right_type, position)),
    }
}

pub fn type_mismatch(expected: &VarType, received: &VarType, position: Position) -> Error {
    Error::new(
        ErrorImpl::TypeMatchError {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        position,
    )
}

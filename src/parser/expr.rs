use crate::{
    ast::{
        ast::Node,
        expressions::{
            AssignOp, AssignmentExpr, BinaryExpr, BinaryOp, CallExpr, Literal, MemberExpr,
            MemberStep, UnaryExpr, UnaryOp, ValueExpr,
        },
        types::VarType,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Associativity, Span,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    types::{check_assignable, type_mismatch, unify},
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Node, Error> {
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud(parser)?;

    // Keep extending the left side while the next operator binds tighter than `bp`
    while parser.current_bp() > bp {
        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected()),
        };

        let operator_bp = parser.current_bp();
        left = led(parser, left, operator_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Node, Error> {
    let token = parser.advance();
    let parse_error = || {
        Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span.start.clone(),
        )
    };

    let (value, var_type) = match token.kind {
        TokenKind::Integer => (
            Literal::Integer(token.value.parse().map_err(|_| parse_error())?),
            VarType::Int,
        ),
        TokenKind::FloatLiteral => (
            Literal::Float(token.value.parse().map_err(|_| parse_error())?),
            VarType::Double,
        ),
        TokenKind::CharLiteral => (
            Literal::Char(token.value.chars().next().unwrap_or('\0')),
            VarType::Char,
        ),
        TokenKind::String => (
            Literal::String(token.value.clone()),
            VarType::Char.pointer_to(),
        ),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    Ok(Node::Value(ValueExpr {
        value,
        var_type,
        span: token.span,
    }))
}

/// A variable reference, or a call when the name is followed by `(`.
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<Node, Error> {
    let token = parser.advance();

    if parser.current_token_kind() == TokenKind::OpenParen {
        return parse_call_expr(parser, token);
    }

    let id = parser.scopes.find_identifier(&token.value).ok_or_else(|| {
        Error::new(
            ErrorImpl::VariableNotDeclared {
                variable: token.value.clone(),
            },
            token.span.start.clone(),
        )
    })?;

    Ok(Node::Value(ValueExpr {
        var_type: parser.scopes.variable(id).var_type.clone(),
        value: Literal::Variable {
            name: token.value,
            id,
        },
        span: token.span,
    }))
}

fn parse_call_expr(parser: &mut Parser, name: Token) -> Result<Node, Error> {
    let function = parser.scopes.find_function(&name.value).ok_or_else(|| {
        Error::new(
            ErrorImpl::FunctionNotDeclared {
                function: name.value.clone(),
            },
            name.span.start.clone(),
        )
    })?;

    parser.expect(TokenKind::OpenParen)?;

    let mut arguments = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            arguments.push(parse_expr(parser, BindingPower::Comma)?);
            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let signature = parser.scopes.function(function).clone();
    let received = arguments.len();
    if received > signature.params.len() {
        return Err(Error::new(
            ErrorImpl::UnexpectedArguments {
                expected: signature.params.len(),
                received,
            },
            name.span.start,
        ));
    }
    if received < signature.required_params() {
        return Err(Error::new(
            ErrorImpl::MissingArguments {
                expected: signature.required_params(),
                received,
            },
            name.span.start,
        ));
    }

    for (argument, param) in arguments.iter().zip(&signature.params) {
        check_assignable(argument, &param.var_type, argument.span().start.clone())?;
    }

    // Omitted trailing arguments take the parameter defaults
    for param in &signature.params[received..] {
        if let Some(default) = &param.default {
            arguments.push(default.clone());
        }
    }

    Ok(Node::Call(CallExpr {
        span: parser.span_from(name.span.start.clone()),
        name: name.value,
        function,
        arguments,
        var_type: signature.return_type,
    }))
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Dash => Some(BinaryOp::Subtract),
        TokenKind::Star => Some(BinaryOp::Multiply),
        TokenKind::Slash => Some(BinaryOp::Divide),
        TokenKind::Equals => Some(BinaryOp::Equals),
        TokenKind::NotEquals => Some(BinaryOp::NotEquals),
        TokenKind::Less => Some(BinaryOp::Less),
        TokenKind::LessEquals => Some(BinaryOp::LessEquals),
        TokenKind::Greater => Some(BinaryOp::Greater),
        TokenKind::GreaterEquals => Some(BinaryOp::GreaterEquals),
        TokenKind::Comma => Some(BinaryOp::Comma),
        _ => None,
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: Node, bp: BindingPower) -> Result<Node, Error> {
    let operator_token = parser.advance();
    let operator = binary_op(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value.clone(),
            },
            operator_token.span.start.clone(),
        )
    })?;

    let right_bp = match parser.options.associativity {
        Associativity::Left => bp,
        Associativity::Right => bp.weaker(),
    };
    let right = parse_expr(parser, right_bp)?;

    let var_type = match operator {
        BinaryOp::Comma => right.var_type(),
        _ => {
            let operand_type = unify(&left, &right, operator_token.span.start.clone())?;
            let valid = if operator.is_comparison() {
                operand_type.is_scalar()
            } else {
                operand_type.is_numeric()
            };
            if !valid && !operand_type.is_error() {
                return Err(type_mismatch(
                    &VarType::Int,
                    &operand_type,
                    operator_token.span.start,
                ));
            }

            if operator.is_comparison() {
                VarType::Int
            } else {
                operand_type
            }
        }
    };

    Ok(Node::Binary(BinaryExpr {
        span: Span {
            start: left.span().start.clone(),
            end: right.span().end.clone(),
        },
        left: Box::new(left),
        operator,
        right: Box::new(right),
        var_type,
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Node, Error> {
    let operator_token = parser.advance();
    let operand = parse_expr(parser, BindingPower::Unary)?;
    let operand_type = operand.var_type();

    let (operator, var_type, valid) = match operator_token.kind {
        TokenKind::Not => (UnaryOp::Not, VarType::Int, operand_type.is_scalar()),
        _ => (
            UnaryOp::Negate,
            operand_type.clone(),
            operand_type.is_numeric(),
        ),
    };
    if !valid && !operand_type.is_error() {
        return Err(type_mismatch(
            &VarType::Int,
            &operand_type,
            operand.span().start.clone(),
        ));
    }

    Ok(Node::Unary(UnaryExpr {
        span: Span {
            start: operator_token.span.start,
            end: operand.span().end.clone(),
        },
        operator,
        operand: Box::new(operand),
        var_type,
    }))
}

fn assign_op(kind: TokenKind) -> AssignOp {
    match kind {
        TokenKind::PlusEquals => AssignOp::Add,
        TokenKind::MinusEquals => AssignOp::Subtract,
        TokenKind::StarEquals => AssignOp::Multiply,
        TokenKind::SlashEquals => AssignOp::Divide,
        _ => AssignOp::Assign,
    }
}

/// Assignment always groups to the right: `a = b = 1` is `a = (b = 1)`.
pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Node,
    bp: BindingPower,
) -> Result<Node, Error> {
    let operator_token = parser.advance();
    let operator = assign_op(operator_token.kind);

    if !matches!(
        &left,
        Node::Value(ValueExpr {
            value: Literal::Variable { .. },
            ..
        }) | Node::Member(_)
    ) {
        return Err(Error::new(
            ErrorImpl::InvalidAssignmentTarget,
            left.span().start.clone(),
        ));
    }

    let value = parse_expr(parser, bp.weaker())?;
    let var_type = left.var_type();

    check_assignable(&value, &var_type, value.span().start.clone())?;
    if operator != AssignOp::Assign && !var_type.is_numeric() && !var_type.is_error() {
        return Err(type_mismatch(
            &VarType::Int,
            &var_type,
            operator_token.span.start,
        ));
    }

    Ok(Node::Assign(AssignmentExpr {
        span: Span {
            start: left.span().start.clone(),
            end: value.span().end.clone(),
        },
        target: Box::new(left),
        operator,
        value: Box::new(value),
        var_type,
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Node, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// One `.name` or `->name` step. The chain must start at a variable, so
/// `a.b.c` becomes a single member expression rooted at `a`.
pub fn parse_member_expr(
    parser: &mut Parser,
    left: Node,
    _bp: BindingPower,
) -> Result<Node, Error> {
    let operator = parser.advance();
    let arrow = operator.kind == TokenKind::Arrow;
    let name = parser.expect(TokenKind::Identifier)?;

    let mut member_expr = match left {
        Node::Member(member_expr) => member_expr,
        Node::Value(ValueExpr {
            value: Literal::Variable { name, id },
            var_type,
            span,
        }) => MemberExpr {
            base: id,
            base_name: name,
            chain: vec![],
            var_type,
            span,
        },
        other => {
            return Err(Error::new(
                ErrorImpl::NotAStruct {
                    type_: other.var_type().to_string(),
                    operator: operator.value,
                },
                operator.span.start,
            ))
        }
    };

    let base_type = member_expr.var_type.clone();
    let resolved = if arrow {
        base_type.pointee_struct()
    } else {
        base_type.as_struct()
    };
    let layout = resolved.cloned().ok_or_else(|| {
        Error::new(
            ErrorImpl::NotAStruct {
                type_: base_type.to_string(),
                operator: operator.value.clone(),
            },
            operator.span.start.clone(),
        )
    })?;

    let index = layout.member_index(&name.value).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnknownMember {
                type_: format!("struct {}", layout.name),
                member: name.value.clone(),
            },
            name.span.start.clone(),
        )
    })?;
    let member = layout.members[index].clone();

    member_expr.var_type = member.var_type.clone();
    member_expr.span.end = name.span.end.clone();
    member_expr.chain.push(MemberStep {
        layout,
        index,
        member,
        arrow,
    });

    Ok(Node::Member(member_expr))
}

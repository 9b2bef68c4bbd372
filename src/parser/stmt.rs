use std::rc::Rc;

use crate::{
    ast::{
        ast::Node,
        statements::{BlockStmt, FnDeclStmt, IfStmt, ReturnStmt, VarDeclStmt, WhileStmt},
        types::{StructLayout, VarType},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    scope::scope::{FunctionSig, Parameter},
    Position,
};

use super::{
    expr::parse_expr,
    lookups::BindingPower,
    parser::Parser,
    types::{check_assignable, parse_declarator, parse_type, type_mismatch},
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    if parser.at_type_start() {
        return parse_decl_stmt(parser);
    }

    let kind = parser.current_token_kind();
    match parser.get_stmt_lookup().get(&kind) {
        Some(handler) => {
            let handler = *handler;
            handler(parser)
        }
        None => Err(parser.unexpected()),
    }
}

/// Statements up to the closing `}` of the current block (or the end of
/// input). A failing statement is reported and skipped.
pub fn parse_block_body(parser: &mut Parser) -> Vec<Node> {
    let mut body = vec![];

    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        let checkpoint = parser.checkpoint();

        match parse_stmt(parser) {
            Ok(Some(node)) => body.push(node),
            Ok(None) => {}
            Err(error) => {
                parser.report(error);
                parser.recover(checkpoint);
            }
        }
    }

    body
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;
    let scope = parser.scopes.enter_scope();
    let body = parse_block_body(parser);
    parser.scopes.exit_scope();
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Some(Node::Block(BlockStmt {
        body,
        scope,
        span: parser.span_from(start),
    })))
}

/// Body of an `if` branch or a loop: a braced block or a single statement,
/// either way in a fresh scope.
fn parse_scoped_body(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.get_position();
    let scope = parser.scopes.enter_scope();

    let body = if parser.eat(TokenKind::OpenCurly) {
        let body = parse_block_body(parser);
        parser.expect(TokenKind::CloseCurly)?;
        body
    } else {
        parse_stmt(parser)?.into_iter().collect()
    };

    parser.scopes.exit_scope();

    Ok(BlockStmt {
        body,
        scope,
        span: parser.span_from(start),
    })
}

pub fn parse_empty_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    parser.expect(TokenKind::Semicolon)?;
    Ok(None)
}

pub fn parse_expression_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    let expression = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Some(expression))
}

/// `T name;`, `T name = value;`, `T name[N];` or a function declaration.
pub fn parse_decl_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    let start = parser.get_position();
    let base = parse_type(parser)?;
    parse_decl_with_type(parser, base, start)
}

fn parse_decl_with_type(
    parser: &mut Parser,
    base: VarType,
    start: Position,
) -> Result<Option<Node>, Error> {
    let (var_type, name) = parse_declarator(parser, base)?;

    if parser.current_token_kind() == TokenKind::OpenParen {
        return parse_fn_decl_stmt(parser, var_type, name, start).map(Some);
    }

    let decl = parse_var_decl(parser, var_type, name, start)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Some(Node::VarDecl(decl)))
}

/// The part of a variable declaration after the declarator: an optional
/// initializer. Declares the variable in the active scope.
fn parse_var_decl(
    parser: &mut Parser,
    var_type: VarType,
    name: Token,
    start: Position,
) -> Result<VarDeclStmt, Error> {
    if var_type == VarType::Void {
        return Err(Error::new(
            ErrorImpl::InvalidVariableType {
                variable: name.value,
            },
            name.span.start,
        ));
    }

    let initializer = if parser.eat(TokenKind::Assignment) {
        let value = parse_expr(parser, BindingPower::Comma)?;
        check_assignable(&value, &var_type, value.span().start.clone())?;
        Some(Box::new(value))
    } else {
        None
    };

    let id = parser
        .scopes
        .declare_variable(&name.value, var_type.clone(), name.span.start.clone())
        .map_err(|error| Error::new(error, name.span.start.clone()))?;

    Ok(VarDeclStmt {
        name: name.value,
        id,
        var_type,
        initializer,
        span: parser.span_from(start),
    })
}

pub fn parse_fn_decl_stmt(
    parser: &mut Parser,
    return_type: VarType,
    name: Token,
    start: Position,
) -> Result<Node, Error> {
    if !parser.scopes.is_global() {
        return Err(Error::new(
            ErrorImpl::NestedFunction {
                function: name.value,
            },
            name.span.start,
        ));
    }

    // Registered before the body so the function can call itself
    let id = parser
        .scopes
        .declare_function(FunctionSig {
            name: name.value.clone(),
            return_type: return_type.clone(),
            params: vec![],
        })
        .map_err(|error| Error::new(error, name.span.start.clone()))?;

    let scope = parser.scopes.enter_scope();
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            params.push(parse_param(parser)?);
            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let signature_params = params
        .iter()
        .map(|param: &VarDeclStmt| Parameter {
            name: param.name.clone(),
            var_type: param.var_type.clone(),
            default: param.initializer.as_deref().cloned(),
        })
        .collect();
    parser.scopes.set_function_params(id, signature_params);

    // Parameters and body share one scope
    let previous_return = parser.return_type.replace(return_type.clone());
    let body_start = parser.expect(TokenKind::OpenCurly)?.span.start;
    let body = parse_block_body(parser);
    parser.expect(TokenKind::CloseCurly)?;
    parser.return_type = previous_return;
    parser.scopes.exit_scope();

    log::debug!("parsed function {} ({} params)", name.value, params.len());

    Ok(Node::FuncDecl(FnDeclStmt {
        name: name.value,
        id,
        return_type,
        params,
        body: BlockStmt {
            body,
            scope,
            span: parser.span_from(body_start),
        },
        span: parser.span_from(start),
    }))
}

fn parse_param(parser: &mut Parser) -> Result<VarDeclStmt, Error> {
    let start = parser.get_position();
    let base = parse_type(parser)?;
    let (var_type, name) = parse_declarator(parser, base)?;
    let decl = parse_var_decl(parser, var_type, name, start)?;

    if let Some(default) = &decl.initializer {
        if !default.is_constant() {
            return Err(Error::new(
                ErrorImpl::NonConstantDefault {
                    parameter: decl.name.clone(),
                },
                default.span().start.clone(),
            ));
        }
    }

    Ok(decl)
}

/// `struct P { ... };` declares a type. `struct P p;` declares a variable of
/// a previously declared struct.
pub fn parse_struct_decl_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    let start = parser.expect(TokenKind::Struct)?.span.start;
    let name = parser.expect(TokenKind::Identifier)?;

    if parser.current_token_kind() != TokenKind::OpenCurly {
        let base = parser
            .scopes
            .find_type(&name.value)
            .filter(|found| found.as_struct().is_some())
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::UnknownType {
                        type_: format!("struct {}", name.value),
                    },
                    name.span.start.clone(),
                )
            })?;
        return parse_decl_with_type(parser, base, start);
    }

    parser.expect(TokenKind::OpenCurly)?;
    let mut layout = StructLayout::new(parser.scopes.next_struct_id(), name.value.clone());

    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        let base = parse_type(parser)?;

        loop {
            let (member_type, member_name) = parse_declarator(parser, base.clone())?;
            if member_type == VarType::Void {
                return Err(Error::new(
                    ErrorImpl::InvalidVariableType {
                        variable: member_name.value,
                    },
                    member_name.span.start,
                ));
            }
            if !layout.push_member(member_name.value.clone(), member_type) {
                return Err(Error::new(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: member_name.value,
                    },
                    member_name.span.start,
                ));
            }

            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }

        parser.expect(TokenKind::Semicolon)?;
    }

    parser.expect(TokenKind::CloseCurly)?;
    parser.expect(TokenKind::Semicolon)?;

    log::debug!("struct {} has size {}", layout.name, layout.size);
    parser
        .scopes
        .declare_type(VarType::Struct(Rc::new(layout)))
        .map_err(|error| Error::new(error, name.span.start))?;

    Ok(None)
}

pub fn parse_enum_decl_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    let token = parser.expect(TokenKind::Enum)?;

    Err(Error::new(
        ErrorImpl::UnsupportedFeature {
            feature: String::from("enum"),
        },
        token.span.start,
    ))
}

fn parse_condition(parser: &mut Parser) -> Result<Node, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    let condition_type = condition.var_type();
    if !condition_type.is_scalar() && !condition_type.is_error() {
        return Err(type_mismatch(
            &VarType::Int,
            &condition_type,
            condition.span().start.clone(),
        ));
    }

    Ok(condition)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    let start = parser.expect(TokenKind::If)?.span.start;
    let condition = parse_condition(parser)?;
    let then_branch = parse_scoped_body(parser)?;

    let else_branch = if parser.eat(TokenKind::Else) {
        Some(parse_scoped_body(parser)?)
    } else {
        None
    };

    Ok(Some(Node::If(IfStmt {
        condition: Box::new(condition),
        then_branch,
        else_branch,
        span: parser.span_from(start),
    })))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    let start = parser.expect(TokenKind::While)?.span.start;
    let condition = parse_condition(parser)?;
    let body = parse_scoped_body(parser)?;

    Ok(Some(Node::While(WhileStmt {
        condition: Box::new(condition),
        body,
        span: parser.span_from(start),
    })))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Option<Node>, Error> {
    let token = parser.expect(TokenKind::Return)?;
    let position = token.span.start.clone();

    let value = if parser.current_token_kind() == TokenKind::Semicolon {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };
    parser.expect(TokenKind::Semicolon)?;

    let return_type = parser
        .return_type
        .clone()
        .ok_or_else(|| Error::new(ErrorImpl::ReturnOutsideFunction, position.clone()))?;

    match (&value, return_type == VarType::Void) {
        (None, false) => {
            return Err(Error::new(ErrorImpl::MissingReturnValue, position));
        }
        (Some(_), true) => {
            return Err(Error::new(ErrorImpl::UnexpectedReturnValue, position));
        }
        (Some(value), false) => {
            check_assignable(value, &return_type, value.span().start.clone())?;
        }
        (None, true) => {}
    }

    Ok(Some(Node::Return(ReturnStmt {
        value: value.map(Box::new),
        span: parser.span_from(position),
    })))
}

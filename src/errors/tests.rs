//! Unit tests for error handling.
//!
//! This module contains tests for error types, kinds and diagnostics lists.

use crate::errors::errors::{Diagnostics, Error, ErrorImpl, ErrorKind, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn position(line: u32) -> Position {
    Position::new(line, 1, Rc::new("test.c".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_kind(), ErrorKind::Lex);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(42),
    );

    assert_eq!(error.get_position().line, 42);
    assert_eq!(error.line(), 42);
}

#[test]
fn test_error_kinds() {
    let cases = vec![
        (ErrorImpl::MalformedNumber { token: "1.2.3".to_string() }, ErrorKind::Lex),
        (ErrorImpl::UnterminatedChar, ErrorKind::Lex),
        (ErrorImpl::UnexpectedToken { token: ")".to_string() }, ErrorKind::Syntax),
        (ErrorImpl::UnsupportedFeature { feature: "enum".to_string() }, ErrorKind::Syntax),
        (ErrorImpl::UnknownType { type_: "Foo".to_string() }, ErrorKind::Semantic),
        (ErrorImpl::VariableNotDeclared { variable: "y".to_string() }, ErrorKind::Semantic),
        (
            ErrorImpl::UnknownMember { type_: "struct P".to_string(), member: "z".to_string() },
            ErrorKind::Semantic,
        ),
        (ErrorImpl::InvalidModule { message: "bad".to_string() }, ErrorKind::Codegen),
    ];

    for (error, kind) in cases {
        assert_eq!(error.kind(), kind, "{:?}", error);
    }
}

#[test]
fn test_type_mismatch_error() {
    let error = Error::new(
        ErrorImpl::TypeMatchError {
            expected: "int".to_string(),
            received: "struct P".to_string(),
        },
        position(3),
    );

    assert_eq!(error.get_error_name(), "TypeMatchError");
    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert_eq!(tip, "Expected type `int`, received `struct P`"),
        ErrorTip::None => panic!("expected a suggestion"),
    }
}

#[test]
fn test_error_display_includes_kind_and_line() {
    let error = Error::new(
        ErrorImpl::VariableNotDeclared {
            variable: "y".to_string(),
        },
        position(7),
    );

    assert_eq!(
        error.to_string(),
        "SemanticError at line 7: variable \"y\" not declared"
    );
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Test suggestion".to_string());
    assert_eq!(format!("{}", tip), "Test suggestion");

    let no_tip = ErrorTip::None;
    assert_eq!(format!("{}", no_tip), "");
}

#[test]
fn test_codegen_error_has_null_position() {
    let error = Error::codegen("builder is not positioned");

    assert_eq!(error.get_kind(), ErrorKind::Codegen);
    assert_eq!(error.line(), 0);
}

#[test]
fn test_diagnostics_keep_order() {
    let mut diagnostics = Diagnostics::new();
    assert!(!diagnostics.has_errors());

    diagnostics.push(Error::new(ErrorImpl::ReturnOutsideFunction, position(1)));
    diagnostics.push(Error::new(ErrorImpl::InvalidAssignmentTarget, position(4)));

    assert_eq!(diagnostics.len(), 2);
    let lines: Vec<u32> = diagnostics.iter().map(|error| error.line()).collect();
    assert_eq!(lines, vec![1, 4]);
    assert_eq!(diagnostics.first().map(|e| e.get_error_name()), Some("ReturnOutsideFunction"));
}

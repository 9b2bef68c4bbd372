use std::fmt::Display;

use inkwell::builder::BuilderError;
use thiserror::Error;

use crate::Position;

/// Diagnostic category, matching the phase that detected the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed literal or unknown character.
    Lex,
    /// Unexpected or missing token.
    Syntax,
    /// Unknown name, duplicate declaration, type mismatch.
    Semantic,
    /// The IR builder or the module verifier rejected the generated code.
    Codegen,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Lex => "LexError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Semantic => "SemanticError",
            ErrorKind::Codegen => "CodegenError",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    /// An error raised by the backend, where no source position is known.
    pub fn codegen(message: impl Into<String>) -> Self {
        Error::new(
            ErrorImpl::BackendError {
                message: message.into(),
            },
            Position::null(),
        )
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn get_kind(&self) -> ErrorKind {
        self.internal_error.kind()
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::MalformedNumber { .. } => "MalformedNumber",
            ErrorImpl::UnterminatedChar => "UnterminatedChar",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnsupportedFeature { .. } => "UnsupportedFeature",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::TypeAlreadyDeclared { .. } => "TypeAlreadyDeclared",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::UnknownMember { .. } => "UnknownMember",
            ErrorImpl::NotAStruct { .. } => "NotAStruct",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::FunctionNotDeclared { .. } => "FunctionNotDeclared",
            ErrorImpl::NestedFunction { .. } => "NestedFunction",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::NonConstantDefault { .. } => "NonConstantDefault",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::MissingReturnValue => "MissingReturnValue",
            ErrorImpl::UnexpectedReturnValue => "UnexpectedReturnValue",
            ErrorImpl::InvalidVariableType { .. } => "InvalidVariableType",
            ErrorImpl::VariableNotAllocated { .. } => "VariableNotAllocated",
            ErrorImpl::BackendError { .. } => "BackendError",
            ErrorImpl::InvalidModule { .. } => "InvalidModule",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::MalformedNumber { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, a number may contain at most one `.`",
                token
            )),
            ErrorImpl::UnterminatedChar => ErrorTip::Suggestion(String::from(
                "Character literals hold exactly one character and end with `'`",
            )),
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("String literals must end on the same line"))
            }
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnsupportedFeature { feature } => {
                ErrorTip::Suggestion(format!("`{}` is not supported", feature))
            }
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::TypeAlreadyDeclared { type_ } => {
                ErrorTip::Suggestion(format!("Type `{}` already declared in this scope", type_))
            }
            ErrorImpl::VariableAlreadyDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` already declared", variable))
            }
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::UnknownMember { type_, member } => {
                ErrorTip::Suggestion(format!("`{}` has no member named `{}`", type_, member))
            }
            ErrorImpl::NotAStruct { type_, operator } => ErrorTip::Suggestion(format!(
                "`{}` cannot be used on a value of type `{}`",
                operator, type_
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "Only variables and struct members can be assigned to",
            )),
            ErrorImpl::FunctionAlreadyDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already declared", function))
            }
            ErrorImpl::FunctionNotDeclared { function } => ErrorTip::Suggestion(format!(
                "Function `{}` not declared before this call",
                function
            )),
            ErrorImpl::NestedFunction { function } => ErrorTip::Suggestion(format!(
                "Function `{}` must be declared at file scope",
                function
            )),
            ErrorImpl::UnexpectedArguments { expected, received } => ErrorTip::Suggestion(
                format!("Expected at most {} arguments, received {}", expected, received),
            ),
            ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected at least {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::NonConstantDefault { parameter } => ErrorTip::Suggestion(format!(
                "The default value of `{}` must be a constant",
                parameter
            )),
            ErrorImpl::ReturnOutsideFunction => ErrorTip::Suggestion(String::from(
                "`return` can only be used inside a function body",
            )),
            ErrorImpl::MissingReturnValue => ErrorTip::Suggestion(String::from(
                "This function must return a value",
            )),
            ErrorImpl::UnexpectedReturnValue => ErrorTip::Suggestion(String::from(
                "A `void` function cannot return a value",
            )),
            ErrorImpl::InvalidVariableType { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` cannot have type `void`",
                variable
            )),
            ErrorImpl::VariableNotAllocated { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` has no storage at this point",
                variable
            )),
            ErrorImpl::BackendError { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::InvalidModule { message } => ErrorTip::Suggestion(message.clone()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}: {}",
            self.get_kind(),
            self.position.line,
            self.internal_error
        )
    }
}

impl std::error::Error for Error {}

impl From<BuilderError> for Error {
    fn from(error: BuilderError) -> Self {
        Error::codegen(error.to_string())
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexical
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("malformed number: {token:?}")]
    MalformedNumber { token: String },
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("unterminated string literal")]
    UnterminatedString,

    // Syntax
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("{feature} is not supported")]
    UnsupportedFeature { feature: String },

    // Semantic
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("type {type_:?} already declared")]
    TypeAlreadyDeclared { type_: String },
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("{type_} has no member {member:?}")]
    UnknownMember { type_: String, member: String },
    #[error("operator {operator:?} applied to non-struct type {type_}")]
    NotAStruct { type_: String, operator: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("function {function:?} not declared")]
    FunctionNotDeclared { function: String },
    #[error("function {function:?} declared outside file scope")]
    NestedFunction { function: String },
    #[error("unexpected arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("default value of parameter {parameter:?} is not constant")]
    NonConstantDefault { parameter: String },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("missing return value")]
    MissingReturnValue,
    #[error("unexpected return value in void function")]
    UnexpectedReturnValue,
    #[error("variable {variable:?} declared with type void")]
    InvalidVariableType { variable: String },

    // Codegen
    #[error("variable {variable:?} used before it was allocated")]
    VariableNotAllocated { variable: String },
    #[error("backend error: {message}")]
    BackendError { message: String },
    #[error("generated module is invalid: {message}")]
    InvalidModule { message: String },
}

impl ErrorImpl {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::MalformedNumber { .. }
            | ErrorImpl::UnterminatedChar
            | ErrorImpl::UnterminatedString => ErrorKind::Lex,
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::UnsupportedFeature { .. } => ErrorKind::Syntax,
            ErrorImpl::VariableNotAllocated { .. }
            | ErrorImpl::BackendError { .. }
            | ErrorImpl::InvalidModule { .. } => ErrorKind::Codegen,
            _ => ErrorKind::Semantic,
        }
    }
}

/// Errors collected over a whole compilation unit, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: Vec<Error>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { errors: vec![] }
    }

    pub fn push(&mut self, error: Error) {
        log::debug!("diagnostic: {}", error);
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&Error> {
        self.errors.first()
    }
}

impl From<Error> for Diagnostics {
    fn from(error: Error) -> Self {
        Diagnostics {
            errors: vec![error],
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

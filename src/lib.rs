#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod scope;

extern crate regex;

/// A location in a source file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(line: u32, column: u32, file: Rc<String>) -> Self {
        Position { line, column, file }
    }

    pub fn null() -> Self {
        Position::new(0, 0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }

    pub fn line(&self) -> u32 {
        self.start.line
    }
}

/// How chains of same-precedence binary operators group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Associativity {
    /// `1 - 2 - 3` parses as `(1 - 2) - 3`.
    #[default]
    Left,
    /// `1 - 2 - 3` parses as `1 - (2 - 3)`. Kept for compatibility with
    /// programs written against the historical grammar.
    Right,
}

/// Which instructions binary operators lower to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArithmeticMode {
    /// Integer instructions for integer operands, float instructions for
    /// floating operands, and `i1` results for comparisons.
    #[default]
    Typed,
    /// Every operand is widened to `double` and comparisons yield `0.0` or `1.0`.
    Float,
}

/// Settings threaded through a single compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    pub associativity: Associativity,
    pub arithmetic: ArithmeticMode,
    /// Log the active function's IR after every lowered statement.
    pub trace_ir: bool,
}

/// Returns the text of the given 1-based line, without its line terminator.
pub fn get_line(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }

    source
        .split('\n')
        .nth(line as usize - 1)
        .map(|text| text.trim_end_matches('\r'))
}

/// Renders a diagnostic the way the command line driver prints it:
///
/// ```text
/// Error: VariableNotDeclared (Variable `y` not declared)
/// -> main.c
///    |
///  3 | y = 1;
///    | ^
/// ```
pub fn format_error(error: &Error, source: &str) -> String {
    let position = error.get_position();
    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    let mut out = String::new();
    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    out.push_str(&format!("-> {}\n", position.file));

    let Some(line_text) = get_line(source, position.line) else {
        out.push_str(&format!("{:>padding$}\n", "|"));
        return out;
    };

    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let column = (position.column as usize).max(1);
    let arrows = column.saturating_sub(removed_whitespace).max(1);
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line() {
        let source = "Hello, world!\nsecond\r\n\nTesting { }\n";

        assert_eq!(super::get_line(source, 1), Some("Hello, world!"));
        assert_eq!(super::get_line(source, 2), Some("second"));
        assert_eq!(super::get_line(source, 3), Some(""));
        assert_eq!(super::get_line(source, 4), Some("Testing { }"));
        assert_eq!(super::get_line(source, 0), None);
        assert_eq!(super::get_line(source, 9), None);
    }
}

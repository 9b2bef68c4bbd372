//! End-to-end tests: source text through lexing, parsing and lowering to a
//! verified LLVM module.

use inkwell::context::Context;
use minicc::{
    ast::dump::dump_block,
    compiler::compiler::{compile, compile_source, Compilation},
    errors::errors::ErrorKind,
    format_error,
    lexer::lexer::Lexer,
    parser::parser::{parse, parse_source},
    ArithmeticMode, Associativity, CompileOptions,
};
use pretty_assertions::assert_eq;

const PROGRAM: &str = "\
struct Point { int x; int y; };
struct Line { Point start; Point *end; };

Point origin;
int calls = 0;

int manhattan(Point *p, int scale = 1) {
    calls += 1;
    int total = p->x + p->y;
    if (total < 0) {
        total = -total;
    }
    return total * scale;
}

int main() {
    Line line;
    line.start.x = 3;
    line.start.y = -4;
    line.end = &origin;
    return 0;
}
";

fn compile_ok<'ctx>(context: &'ctx Context, source: &str, options: CompileOptions) -> Compilation<'ctx> {
    match compile_source(context, source, "test.c", options) {
        Ok(compilation) => compilation,
        Err(diagnostics) => panic!("compilation failed: {:?}", diagnostics),
    }
}

#[test]
fn test_compile_program() {
    // `&` is not part of the language, so drop that line
    let source = PROGRAM.replace("    line.end = &origin;\n", "");

    let context = Context::create();
    let compilation = compile_ok(&context, &source, CompileOptions::default());
    let ir = compilation.ir();

    assert!(ir.contains("%Point = type <{ i32, i32 }>"));
    assert!(ir.contains("%Line = type <{ %Point, %Point* }>"));
    assert!(ir.contains("@origin = global %Point zeroinitializer"));
    assert!(ir.contains("define i32 @manhattan(%Point* %0, i32 %1)"));
    assert!(ir.contains("call void @__module_init()"));
    assert!(compilation.function("main").is_some());
}

#[test]
fn test_diagnostics_for_whole_unit() {
    let context = Context::create();
    let result = compile_source(&context, PROGRAM, "main.c", CompileOptions::default());

    let diagnostics = match result {
        Ok(_) => panic!("`&` should not be accepted"),
        Err(diagnostics) => diagnostics,
    };

    assert_eq!(diagnostics.len(), 1);
    let error = diagnostics.first().unwrap();
    assert_eq!(error.line(), 20);
    assert_eq!(error.get_kind(), ErrorKind::Lex);
}

#[test]
fn test_errors_accumulate_in_order() {
    let source = "\
int a = 1.2.3;
int b = ;
y = 1;
char c = 'ab';
";
    let result = parse_source(source, Some("main.c".to_string()), CompileOptions::default());

    let found: Vec<(ErrorKind, u32)> = result
        .diagnostics
        .iter()
        .map(|error| (error.get_kind(), error.line()))
        .collect();
    assert_eq!(
        found,
        vec![
            (ErrorKind::Lex, 1),
            (ErrorKind::Syntax, 2),
            (ErrorKind::Semantic, 3),
            (ErrorKind::Lex, 4),
        ]
    );
}

#[test]
fn test_error_rendering() {
    let source = "int x;\nint z;\ny = 1;\n";
    let result = parse_source(source, Some("main.c".to_string()), CompileOptions::default());
    let error = result.diagnostics.first().unwrap();

    assert_eq!(
        format_error(error, source),
        "Error: VariableNotDeclared (Variable `y` not declared)\n\
         -> main.c\n  |\n3 | y = 1;\n  | ^\n"
    );
}

#[test]
fn test_line_by_line_lexing_matches_whole_source() {
    let source = "int square(int v) { return v * v; }\nint main() { return square(4); }";

    let mut lexer = Lexer::new(String::new(), Some("test.c".to_string()));
    for line in source.lines() {
        lexer.add_line(line);
    }
    let from_lines = parse(Box::new(lexer), CompileOptions::default());
    let whole = parse_source(source, Some("test.c".to_string()), CompileOptions::default());

    assert_eq!(dump_block(&from_lines.root), dump_block(&whole.root));

    let context = Context::create();
    let first = compile(&context, from_lines, "test.c", CompileOptions::default())
        .map(|compilation| compilation.ir())
        .unwrap_or_default();
    let second_context = Context::create();
    let second = compile(&second_context, whole, "test.c", CompileOptions::default())
        .map(|compilation| compilation.ir())
        .unwrap_or_default();

    assert!(first.contains("define i32 @square(i32 %0)"));
    assert_eq!(first, second);
}

#[test]
fn test_ast_dump_is_stable() {
    let source = "int f(int a) { while (a > 0) { a -= 1; } return a; }";
    let first = parse_source(source, None, CompileOptions::default());
    let second = parse_source(source, None, CompileOptions::default());

    assert_eq!(dump_block(&first.root), dump_block(&second.root));
    assert!(dump_block(&first.root).starts_with("BLOCK:\n  FUNC: int f\n"));
}

#[test]
fn test_associativity_reaches_lowering() {
    let source = "int main() { return 10 - 4 - 3; }";

    let left_context = Context::create();
    let left = compile_ok(&left_context, source, CompileOptions::default()).ir();
    assert!(left.contains("ret i32 3"));

    let right_context = Context::create();
    let right = compile_ok(
        &right_context,
        source,
        CompileOptions {
            associativity: Associativity::Right,
            ..CompileOptions::default()
        },
    )
    .ir();
    assert!(right.contains("ret i32 9"));
}

#[test]
fn test_arithmetic_modes_agree_on_constants() {
    let source = "int main() { return 7 * 6 / 2; }";

    let typed_context = Context::create();
    let typed = compile_ok(&typed_context, source, CompileOptions::default()).ir();

    let float_context = Context::create();
    let float = compile_ok(
        &float_context,
        source,
        CompileOptions {
            arithmetic: ArithmeticMode::Float,
            ..CompileOptions::default()
        },
    )
    .ir();

    assert!(typed.contains("ret i32 21"));
    assert!(float.contains("ret i32 21"));
}

#[test]
fn test_independent_compilations() {
    let context = Context::create();
    let first = compile_ok(&context, "int a = 1;", CompileOptions::default());
    let second = compile_ok(&context, "int b = 2;", CompileOptions::default());

    assert!(first.ir().contains("@a = global i32 0"));
    assert!(!first.ir().contains("@b"));
    assert!(second.ir().contains("@b = global i32 0"));
}

#[test]
fn test_write_ir() {
    let context = Context::create();
    let compilation = compile_ok(&context, "int main() { return 0; }", CompileOptions::default());

    let path = std::env::temp_dir().join("minicc_integration_write_ir.ll");
    compilation.write_ir(&path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, compilation.ir());
    let _ = std::fs::remove_file(&path);
}

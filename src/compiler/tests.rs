//! Unit tests for lowering.
//!
//! Checks block structure through the inkwell API and instruction choice
//! through the printed IR.

use inkwell::{
    basic_block::BasicBlock,
    context::Context,
    values::{FunctionValue, InstructionOpcode, InstructionValue},
};
use pretty_assertions::assert_eq;

use crate::{errors::errors::ErrorKind, ArithmeticMode, CompileOptions};

use super::compiler::{compile_source, Compilation, MODULE_INIT};

fn compile_with<'ctx>(
    context: &'ctx Context,
    source: &str,
    options: CompileOptions,
) -> Compilation<'ctx> {
    match compile_source(context, source, "test.c", options) {
        Ok(compilation) => compilation,
        Err(diagnostics) => panic!("compilation failed: {:?}", diagnostics),
    }
}

fn compile_ok<'ctx>(context: &'ctx Context, source: &str) -> Compilation<'ctx> {
    compile_with(context, source, CompileOptions::default())
}

fn float_options() -> CompileOptions {
    CompileOptions {
        arithmetic: ArithmeticMode::Float,
        ..CompileOptions::default()
    }
}

fn block_named<'ctx>(function: FunctionValue<'ctx>, name: &str) -> Option<BasicBlock<'ctx>> {
    function
        .get_basic_blocks()
        .into_iter()
        .find(|block| block.get_name().to_str() == Ok(name))
}

fn instructions<'ctx>(function: FunctionValue<'ctx>) -> Vec<InstructionValue<'ctx>> {
    let mut all = vec![];
    for block in function.get_basic_blocks() {
        let mut next = block.get_first_instruction();
        while let Some(instruction) = next {
            next = instruction.get_next_instruction();
            all.push(instruction);
        }
    }
    all
}

fn count_opcode(function: FunctionValue, opcode: InstructionOpcode) -> usize {
    instructions(function)
        .iter()
        .filter(|instruction| instruction.get_opcode() == opcode)
        .count()
}

#[test]
fn test_if_else_lowers_to_two_targets_and_one_phi() {
    let context = Context::create();
    let compilation = compile_ok(
        &context,
        "int f() { if (1) { return 1; } else { return 2; } }",
    );
    let function = compilation.function("f").unwrap();

    let entry = function.get_first_basic_block().unwrap();
    let branch = entry.get_terminator().unwrap();
    assert_eq!(branch.get_opcode(), InstructionOpcode::Br);
    // condition, false target, true target
    assert_eq!(branch.get_num_operands(), 3);

    assert!(block_named(function, "then").is_some());
    assert!(block_named(function, "else").is_some());
    let merge = block_named(function, "merge").unwrap();
    let phi = merge.get_first_instruction().unwrap();
    assert_eq!(phi.get_opcode(), InstructionOpcode::Phi);
    assert_eq!(phi.get_num_operands(), 2);

    assert_eq!(count_opcode(function, InstructionOpcode::Phi), 1);
}

#[test]
fn test_if_without_else_still_merges() {
    let context = Context::create();
    let compilation = compile_ok(
        &context,
        "int f(int a) { int r = 0; if (a) { r = 5; } return r; }",
    );
    let function = compilation.function("f").unwrap();

    assert!(block_named(function, "else").is_some());
    let merge = block_named(function, "merge").unwrap();
    let phi = merge.get_first_instruction().unwrap();
    assert_eq!(phi.get_opcode(), InstructionOpcode::Phi);
    // the missing else contributes zero
    assert_eq!(phi.get_num_operands(), 2);
    assert!(compilation.ir().contains("phi i32"));
}

#[test]
fn test_if_without_values_has_no_phi() {
    let context = Context::create();
    let compilation = compile_ok(
        &context,
        "void f(int a) { if (a) { while (a) { a = a - 1; } } }",
    );
    let function = compilation.function("f").unwrap();

    assert_eq!(count_opcode(function, InstructionOpcode::Phi), 0);
}

#[test]
fn test_while_blocks() {
    let context = Context::create();
    let compilation = compile_ok(
        &context,
        "int sum(int n) { int total = 0; while (n > 0) { total += n; n -= 1; } return total; }",
    );
    let function = compilation.function("sum").unwrap();

    let cond = block_named(function, "while.cond").unwrap();
    let terminator = cond.get_terminator().unwrap();
    assert_eq!(terminator.get_opcode(), InstructionOpcode::Br);
    assert_eq!(terminator.get_num_operands(), 3);

    let body = block_named(function, "while.body").unwrap();
    let back_edge = body.get_terminator().unwrap();
    assert_eq!(back_edge.get_num_operands(), 1);

    assert!(block_named(function, "while.end").is_some());
}

#[test]
fn test_typed_arithmetic() {
    let context = Context::create();
    let ir = compile_ok(&context, "int f(int a, int b) { return a + b * 2 - a / b; }").ir();

    assert!(ir.contains("mul i32"));
    assert!(ir.contains("add i32"));
    assert!(ir.contains("sub i32"));
    assert!(ir.contains("sdiv i32"));
    assert!(!ir.contains("double"));
}

#[test]
fn test_typed_double_arithmetic() {
    let context = Context::create();
    let ir = compile_ok(&context, "double f(double a) { return a * 2 + 0.5; }").ir();

    assert!(ir.contains("fmul double"));
    assert!(ir.contains("fadd double"));
    assert!(!ir.contains("sitofp"));
}

#[test]
fn test_float_arithmetic_mode() {
    let context = Context::create();
    let ir = compile_with(
        &context,
        "int f(int a, int b) { return a + b; }",
        float_options(),
    )
    .ir();

    assert!(ir.contains("sitofp i32"));
    assert!(ir.contains("fadd double"));
    assert!(ir.contains("fptosi double"));
    assert!(!ir.contains("add i32"));
}

#[test]
fn test_typed_comparison_is_boolean() {
    let context = Context::create();
    let ir = compile_ok(&context, "int lt(int a, int b) { return a < b; }").ir();

    assert!(ir.contains("icmp slt i32"));
    assert!(ir.contains("zext i1"));
}

#[test]
fn test_float_mode_comparison_is_double() {
    let context = Context::create();
    let ir = compile_with(
        &context,
        "int lt(int a, int b) { return a < b; }",
        float_options(),
    )
    .ir();

    assert!(ir.contains("fcmp olt double"));
    assert!(ir.contains("uitofp i1"));
}

#[test]
fn test_struct_layout_is_packed() {
    let context = Context::create();
    let ir = compile_ok(
        &context,
        "struct S { int a; char b; double c; }; S s; int f() { s.b = 'x'; return s.a; }",
    )
    .ir();

    assert!(ir.contains("%S = type <{ i32, i8, double }>"));
    assert!(ir.contains("@s = global %S zeroinitializer"));
}

#[test]
fn test_member_through_pointer() {
    let context = Context::create();
    let compilation = compile_ok(
        &context,
        "struct P { int x; int y; }; P p; P *pp; int f() { pp->y = 3; return p.x; }",
    );
    let function = compilation.function("f").unwrap();

    assert!(count_opcode(function, InstructionOpcode::GetElementPtr) >= 1);
    assert!(compilation.ir().contains("@pp = global %P* null"));
}

#[test]
fn test_module_init_runs_file_scope_initialisers() {
    let context = Context::create();
    let compilation = compile_ok(&context, "int counter = 5; int main() { return counter; }");
    let ir = compilation.ir();

    assert!(ir.contains("@counter = global i32 0"));
    assert!(ir.contains("define void @__module_init()"));
    assert!(ir.contains("store i32 5, i32* @counter"));

    let main = compilation.function("main").unwrap();
    let first_call = instructions(main)
        .into_iter()
        .find(|instruction| instruction.get_opcode() == InstructionOpcode::Call);
    assert!(first_call.is_some());
    assert!(ir.contains(&format!("call void @{}()", MODULE_INIT)));
}

#[test]
fn test_module_init_without_main() {
    let context = Context::create();
    let compilation = compile_ok(&context, "int a = 1; int b; b = a + 1;");

    let init = compilation.function(MODULE_INIT).unwrap();
    assert_eq!(count_opcode(init, InstructionOpcode::Store), 2);
    assert_eq!(count_opcode(init, InstructionOpcode::Return), 1);
    assert!(!compilation.ir().contains("call void @__module_init"));
}

#[test]
fn test_constant_adapts_to_declared_type() {
    let context = Context::create();
    let ir = compile_ok(&context, "double d = 1; long l = 5000000000; char c = 65;").ir();

    assert!(ir.contains("store double 1.000000e+00, double* @d"));
    assert!(ir.contains("store i64 5000000000, i64* @l"));
    assert!(ir.contains("store i8 65, i8* @c"));
}

#[test]
fn test_call_fills_defaults() {
    let context = Context::create();
    let ir = compile_ok(
        &context,
        "int add(int a, int b = 2) { return a + b; } int main() { return add(1); }",
    )
    .ir();

    assert!(ir.contains("call i32 @add(i32 1, i32 2)"));
}

#[test]
fn test_void_call_statement() {
    let context = Context::create();
    let ir = compile_ok(&context, "void g() { } int main() { g(); return 0; }").ir();

    assert!(ir.contains("define void @g()"));
    assert!(ir.contains("call void @g()"));
}

#[test]
fn test_recursive_function() {
    let context = Context::create();
    let ir = compile_ok(
        &context,
        "int fact(int n) { if (n < 2) { return 1; } return n * fact(n - 1); }",
    )
    .ir();

    assert!(ir.contains("call i32 @fact"));
}

#[test]
fn test_code_after_return_is_valid() {
    let context = Context::create();
    let compilation = compile_ok(&context, "int f() { return 1; int x = 2; return x; }");
    let function = compilation.function("f").unwrap();

    assert!(block_named(function, "after.return").is_some());
    assert_eq!(count_opcode(function, InstructionOpcode::Return), 3);
}

#[test]
fn test_missing_return_yields_zero() {
    let context = Context::create();
    let ir = compile_ok(&context, "int f() { } double g() { }").ir();

    assert!(ir.contains("ret i32 0"));
    assert!(ir.contains("ret double 0.000000e+00"));
}

#[test]
fn test_locals_are_allocated_in_entry() {
    let context = Context::create();
    let compilation = compile_ok(
        &context,
        "int f(int n) { while (n) { int t = n; n = t - 1; } return n; }",
    );
    let function = compilation.function("f").unwrap();

    let entry = function.get_first_basic_block().unwrap();
    let mut allocas = 0;
    let mut next = entry.get_first_instruction();
    while let Some(instruction) = next {
        if instruction.get_opcode() == InstructionOpcode::Alloca {
            allocas += 1;
        }
        next = instruction.get_next_instruction();
    }
    assert_eq!(allocas, 2);
    assert_eq!(count_opcode(function, InstructionOpcode::Alloca), 2);
}

#[test]
fn test_string_literal() {
    let context = Context::create();
    let ir = compile_ok(&context, "char *s = \"hi\";").ir();

    assert!(ir.contains("c\"hi\\00\""));
}

#[test]
fn test_shadowed_variables_get_own_slots() {
    let context = Context::create();
    let compilation = compile_ok(
        &context,
        "int x = 1; int f() { int x = 2; { int x = 3; } return x; }",
    );
    let function = compilation.function("f").unwrap();

    assert_eq!(count_opcode(function, InstructionOpcode::Alloca), 2);
}

#[test]
fn test_parse_errors_stop_lowering() {
    let context = Context::create();
    let result = compile_source(&context, "int x = ;\nint y = z;", "test.c", CompileOptions::default());

    match result {
        Ok(_) => panic!("expected diagnostics"),
        Err(diagnostics) => {
            assert_eq!(diagnostics.len(), 2);
            let kinds: Vec<ErrorKind> = diagnostics.iter().map(|error| error.get_kind()).collect();
            assert_eq!(kinds, vec![ErrorKind::Syntax, ErrorKind::Semantic]);
        }
    }
}

#[test]
fn test_trace_does_not_change_output() {
    let source = "int f(int a) { if (a) { return a; } return 0; }";

    let context = Context::create();
    let plain = compile_ok(&context, source).ir();

    let traced_context = Context::create();
    let traced = compile_with(
        &traced_context,
        source,
        CompileOptions {
            trace_ir: true,
            ..CompileOptions::default()
        },
    )
    .ir();

    assert_eq!(plain, traced);
}

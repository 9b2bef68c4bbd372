use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
    time::Instant,
};

use clap::Parser;
use inkwell::context::Context;
use log::info;
use minicc::{
    ast::dump::dump_block,
    compiler::compiler::compile,
    errors::errors::Diagnostics,
    format_error,
    lexer::lexer::Lexer,
    parser::parser::parse,
    ArithmeticMode, Associativity, CompileOptions,
};

/// Compiles a C subset to LLVM IR
#[derive(Parser, Debug)]
#[command(name = "minicc")]
#[command(version = "0.1.0")]
struct Cli {
    /// Input source file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Where to write the IR
    #[arg(short, long, value_name = "FILE", default_value = "a.out")]
    output: PathBuf,

    /// Print the AST dump to stdout
    #[arg(long)]
    emit_ast: bool,

    /// Group same-precedence binary operators to the right
    #[arg(long)]
    right_assoc: bool,

    /// Lower all arithmetic in double precision
    #[arg(long)]
    float_arithmetic: bool,

    /// Log each function's IR after every statement (RUST_LOG=trace)
    #[arg(long)]
    trace_ir: bool,
}

impl Cli {
    fn options(&self) -> CompileOptions {
        CompileOptions {
            associativity: if self.right_assoc {
                Associativity::Right
            } else {
                Associativity::Left
            },
            arithmetic: if self.float_arithmetic {
                ArithmeticMode::Float
            } else {
                ArithmeticMode::Typed
            },
            trace_ir: self.trace_ir,
        }
    }
}

fn report(diagnostics: &Diagnostics, source: &str) -> ! {
    for error in diagnostics {
        eprint!("{}", format_error(error, source));
    }
    eprintln!("{} error(s) found", diagnostics.len());
    process::exit(1);
}

/// Feeds the file to the lexer one line at a time and keeps a copy of the
/// text for diagnostics.
fn read_source(path: &Path) -> std::io::Result<(Lexer, String)> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let mut lexer = Lexer::new(String::new(), Some(file_name));
    let mut source = String::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        lexer.add_line(&line);
        source.push_str(&line);
        source.push('\n');
    }

    Ok((lexer, source))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let Some(input) = cli.input.clone() else {
        eprintln!("Error: no input file given");
        eprintln!("Usage: minicc <FILE> [-o <FILE>]");
        process::exit(1);
    };
    let options = cli.options();

    let start = Instant::now();
    let (lexer, source) = match read_source(&input) {
        Ok(read) => read,
        Err(error) => {
            eprintln!("Error: cannot read {}: {}", input.display(), error);
            process::exit(1);
        }
    };
    info!("Read {} in {:?}", input.display(), start.elapsed());

    let parse_start = Instant::now();
    let parsed = parse(Box::new(lexer), options);
    info!("Parsed in {:?}", parse_start.elapsed());

    if parsed.has_errors() {
        report(&parsed.diagnostics, &source);
    }

    if cli.emit_ast {
        print!("{}", dump_block(&parsed.root));
    }

    let context = Context::create();
    let module_name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "main".to_string());

    let compile_start = Instant::now();
    let compilation = match compile(&context, parsed, &module_name, options) {
        Ok(compilation) => compilation,
        Err(diagnostics) => report(&diagnostics, &source),
    };
    info!("Lowered in {:?}", compile_start.elapsed());

    if let Err(error) = compilation.write_ir(&cli.output) {
        report(&Diagnostics::from(error), &source);
    }

    info!(
        "Wrote {} in {:?} total",
        cli.output.display(),
        start.elapsed()
    );
}

mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use blockgraph::block::BlockId;
use generator::{BlockError, Generation, TranslatorTable};

const SUBCOMMANDS: &[&str] = &["generate", "test", "help"];

#[derive(Parser)]
#[command(name = "blockgen", version, about = "Block program code generator")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate code from a block program file
    Generate(GenerateArgs),

    /// Run .test.json fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Block program file (JSON) to generate from
    file: String,

    /// Entry chain, selected by its root block id (default: first chain)
    #[arg(short, long)]
    entry: Option<String>,

    /// Load only, don't generate (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the loaded program model
    #[arg(long)]
    ast: bool,

    /// List the program's chains and exit
    #[arg(long)]
    list_chains: bool,

    /// Print the registry snapshot (variable name = last-known value)
    #[arg(long)]
    vars: bool,

    /// Suppress generated code output (just check for errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.json file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Backwards compatibility: if the first positional arg is not a known
    // subcommand, inject "generate" so `blockgen program.json` works like
    // `blockgen generate program.json`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(first_pos) = args.iter().skip(1).find(|a| !a.starts_with('-')) {
        let first_pos = first_pos.clone();
        if !SUBCOMMANDS.contains(&first_pos.as_str()) {
            let pos = args.iter().position(|a| *a == first_pos).unwrap();
            args.insert(pos, "generate".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Generate(generate_args) => do_generate(generate_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn do_generate(args: GenerateArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    // Read source
    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    // Load
    let program = match blockgraph::loader::from_json(&source, file_id) {
        Ok(p) => p,
        Err(error) => {
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            let diagnostic = error.to_diagnostic();
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            process::exit(1);
        }
    };

    // --check: load succeeded, exit
    if args.check {
        eprintln!("ok: {} loaded successfully", args.file);
        return;
    }

    // --ast: dump the program model
    if args.ast {
        println!("{:#?}", program);
        return;
    }

    // --list-chains: print each chain's root block and statement count
    if args.list_chains {
        for chain in &program.chains {
            let statements = chain.iter_chain().count();
            println!("{} ({}, {} statements)", chain.id, chain.kind, statements);
        }
        return;
    }

    // Generate
    let table = TranslatorTable::standard();
    let result = match &args.entry {
        Some(entry) => generator::generate_entry(&program, &table, &BlockId::new(entry.clone())),
        None => generator::generate_program(&program, &table),
    };

    let generation = match result {
        Ok(g) => g,
        Err(error) => {
            emit_block_error(&error);
            process::exit(1);
        }
    };

    print_generation(&generation, &args);

    if let Some(error) = &generation.error {
        emit_block_error(error);
        process::exit(1);
    }
}

/// Print generated code (partial or complete) and, on request, the registry
/// snapshot.
fn print_generation(generation: &Generation, args: &GenerateArgs) {
    if !args.quiet {
        print!("{}", generation.code);
    }
    if args.vars {
        for (name, value) in &generation.bindings {
            println!("{} = {}", name, value);
        }
    }
}

fn emit_block_error(error: &BlockError) {
    match &error.block {
        Some(block) => eprintln!("generate error at block '{}': {}", block, error),
        None => eprintln!("generate error: {}", error),
    }
}

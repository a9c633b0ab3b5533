use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rlox::ast_printer::AstPrinter;
use rlox::error::LoxError;
use rlox::lox::{Lox, RunOutcome};
use rlox::parser::Parser;
use rlox::scanner;

/// Exit status for malformed input (sysexits `EX_DATAERR`).
const EXIT_COMPILE_ERROR: i32 = 65;

/// Exit status for a runtime failure (sysexits `EX_SOFTWARE`).
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to rlox.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints the AST of every statement
    Parse { filename: PathBuf },

    /// Runs a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt (the default)
    Repl,
}

/// Maps a source file and checks it is UTF-8.
fn read_source(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    // SAFETY: the mapping is read-only and dropped before this function returns.
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    let text: &str = std::str::from_utf8(&map)
        .map_err(LoxError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", text.len(), filename);

    Ok(text.to_owned())
}

fn init_logger() -> Result<()> {
    let log_file = File::create("rlox.log").context("Failed to create rlox.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip the crate prefix from module paths
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rlox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to rlox.log");
    Ok(())
}

fn report(errors: &[&LoxError]) {
    for error in errors {
        eprintln!("{}", error);
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let source = read_source(filename)?;
    let (tokens, errors) = scanner::scan(&source);

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if !errors.is_empty() {
        report(&errors.iter().collect::<Vec<_>>());
        process::exit(EXIT_COMPILE_ERROR);
    }

    Ok(())
}

fn parse(filename: &Path) -> Result<()> {
    let source = read_source(filename)?;
    let (tokens, mut errors) = scanner::scan(&source);

    let (statements, parse_errors) = Parser::new(&tokens).parse();
    errors.extend(parse_errors);

    if !errors.is_empty() {
        report(&errors.iter().collect::<Vec<_>>());
        process::exit(EXIT_COMPILE_ERROR);
    }

    let printer = AstPrinter;
    for stmt in &statements {
        println!("{}", printer.print_stmt(stmt));
    }

    Ok(())
}

fn run(filename: &Path) -> Result<()> {
    let source = read_source(filename)?;
    let mut lox = Lox::new();

    let outcome = lox.run(&source);
    report(&outcome.errors());

    match outcome {
        RunOutcome::Success => {
            info!("Program executed successfully");
            Ok(())
        }
        RunOutcome::CompileError(_) => process::exit(EXIT_COMPILE_ERROR),
        RunOutcome::RuntimeError(_) => process::exit(EXIT_RUNTIME_ERROR),
    }
}

/// Each line runs in the same session; errors are reported and the prompt continues.
fn repl() -> Result<()> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let outcome = lox.run(&line);
        debug!("REPL line outcome: {:?}", outcome);
        report(&outcome.errors());
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename, json } => tokenize(&filename, json),
        Commands::Parse { filename } => parse(&filename),
        Commands::Run { filename } => run(&filename),
        Commands::Repl => repl(),
    }
}

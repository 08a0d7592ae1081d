use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use treelox as lox;

use lox::ast_printer::AstPrinter;
use lox::error::LoxError;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::pipeline;
use lox::scanner::{scan_tokens, Scanner};

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking interpreter for a small scripting language", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print the tokens as a JSON array instead of one per line
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file and prints each statement's tree
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive prompt
    Repl,
}

/// Maps a script into memory and validates it as UTF‑8.
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    // Zero-length files cannot be mapped on every platform.
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read-only and dropped before this function returns;
    // the text is copied out first.
    let map = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map file {:?}", filename))?;

    let text = std::str::from_utf8(&map)
        .map_err(LoxError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?
        .to_owned();

    info!("Read {} bytes from {:?}", text.len(), filename);

    Ok(text)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip the crate prefix from module paths
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("treelox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(errors: &[&LoxError]) {
    for e in errors {
        eprintln!("{}", e);
    }
}

fn no_input() -> ! {
    info!("No filepath provided");
    println!("No input filepath was provided. Exiting...");
    std::process::exit(0);
}

fn tokenize(source: &str, json: bool) -> Result<()> {
    let mut tokenized = true;

    if json {
        let (tokens, errors) = scan_tokens(source);
        for e in &errors {
            eprintln!("{}", e);
        }
        tokenized = errors.is_empty();
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in Scanner::new(source) {
            match token {
                Ok(token) => println!("{}", token),
                Err(e) => {
                    tokenized = false;
                    eprintln!("{}", e);
                }
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");
        std::process::exit(65);
    }

    Ok(())
}

fn parse(source: &str) {
    match pipeline::compile(source) {
        Ok(statements) => {
            for stmt in &statements {
                println!("{}", AstPrinter::print_stmt(stmt));
            }
        }
        Err(errors) => {
            report(&errors.iter().collect::<Vec<_>>());
            std::process::exit(65);
        }
    }
}

fn evaluate(source: &str) {
    let (tokens, lex_errors) = scan_tokens(source);

    if !lex_errors.is_empty() {
        report(&lex_errors.iter().collect::<Vec<_>>());
        std::process::exit(65);
    }

    let expr = match Parser::new(&tokens).parse_expression() {
        Ok(expr) => expr,
        Err(errors) => {
            report(&errors.iter().collect::<Vec<_>>());
            std::process::exit(65);
        }
    };

    let mut interpreter = Interpreter::new();

    match interpreter.evaluate(&expr) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(70);
        }
    }
}

fn run(source: &str) {
    let mut interpreter = Interpreter::new();

    if let Err(e) = pipeline::run_source(&mut interpreter, source) {
        debug!("Run failed: {}", e);
        report(&e.diagnostics());
        std::process::exit(e.exit_code());
    }

    info!("Program executed successfully");
}

fn repl() -> Result<()> {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line: String = line.context("Failed to read from stdin")?;

        if let Err(e) = pipeline::run_source(&mut interpreter, &line) {
            report(&e.diagnostics());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // Minimal logger so the macros have somewhere to go
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            let source = read_file(filename.unwrap_or_else(|| no_input()))?;
            tokenize(&source, json)?;
        }

        Commands::Parse { filename } => {
            let source = read_file(filename.unwrap_or_else(|| no_input()))?;
            parse(&source);
        }

        Commands::Evaluate { filename } => {
            let source = read_file(filename.unwrap_or_else(|| no_input()))?;
            evaluate(&source);
        }

        Commands::Run { filename } => {
            let source = read_file(filename.unwrap_or_else(|| no_input()))?;
            run(&source);
        }

        Commands::Repl => repl()?,
    }

    Ok(())
}

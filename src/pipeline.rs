//! Glue for the four stages: scan → parse → resolve → interpret.
//!
//! Execution only starts when the three front‑end passes are clean.  The
//! caller decides what to do with the returned diagnostics (print them,
//! pick an exit code, keep a REPL alive).

use log::info;
use thiserror::Error;

use crate::ast::Stmt;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;

/// Why a run did not complete.
#[derive(Debug, Error)]
pub enum RunError {
    /// Lexical, syntax or resolution errors; nothing was executed.
    #[error("{} compile error(s)", .0.len())]
    Compile(Vec<LoxError>),

    /// The program started and was aborted by this error.
    #[error(transparent)]
    Runtime(LoxError),
}

impl RunError {
    /// Conventional process exit code (sysexits `EX_DATAERR` / `EX_SOFTWARE`).
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Compile(_) => 65,
            RunError::Runtime(_) => 70,
        }
    }

    /// Every diagnostic carried, in report order.
    pub fn diagnostics(&self) -> Vec<&LoxError> {
        match self {
            RunError::Compile(errors) => errors.iter().collect(),
            RunError::Runtime(error) => vec![error],
        }
    }
}

/// Scan and parse `source`.  Lexical and syntax errors are reported together.
pub fn compile(source: &str) -> Result<Vec<Stmt>, Vec<LoxError>> {
    let (tokens, mut errors) = scan_tokens(source);

    match Parser::new(&tokens).parse() {
        Ok(statements) if errors.is_empty() => Ok(statements),
        Ok(_) => Err(errors),
        Err(parse_errors) => {
            errors.extend(parse_errors);
            Err(errors)
        }
    }
}

/// Run `source` on `interpreter`.  Globals defined by earlier calls stay
/// visible, which is what the REPL relies on.
pub fn run_source(interpreter: &mut Interpreter, source: &str) -> Result<(), RunError> {
    let statements: Vec<Stmt> = compile(source).map_err(RunError::Compile)?;

    Resolver::new(interpreter)
        .resolve(&statements)
        .map_err(RunError::Compile)?;

    info!("Front end clean, executing {} statement(s)", statements.len());

    interpreter
        .interpret(&statements)
        .map_err(RunError::Runtime)
}

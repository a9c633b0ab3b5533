//! A Lox session: scan → parse → resolve → interpret, with explicit outcomes
//! instead of process‑wide error flags. One session keeps its globals across
//! [`Lox::run`] calls, which is what a REPL needs.

use std::io::Write;

use log::{debug, info};

use crate::ast::ExprId;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner;

/// End‑of‑run signal for the driver.
#[derive(Debug)]
pub enum RunOutcome {
    Success,

    /// Scan, parse or resolve errors; nothing was executed.
    CompileError(Vec<LoxError>),

    /// Execution started and stopped at this error.
    RuntimeError(LoxError),
}

impl RunOutcome {
    pub fn had_compile_error(&self) -> bool {
        matches!(self, RunOutcome::CompileError(_))
    }

    pub fn had_runtime_error(&self) -> bool {
        matches!(self, RunOutcome::RuntimeError(_))
    }

    /// Every diagnostic in reporting order.
    pub fn errors(&self) -> Vec<&LoxError> {
        match self {
            RunOutcome::Success => Vec::new(),
            RunOutcome::CompileError(errors) => errors.iter().collect(),
            RunOutcome::RuntimeError(error) => vec![error],
        }
    }
}

pub struct Lox {
    interpreter: Interpreter,
    next_id: ExprId,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self::with_interpreter(Interpreter::with_output(out))
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            next_id: 0,
        }
    }

    /// Access to the interpreter, e.g. to register more natives.
    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Run one source text. Scanning and parsing both run to the end so all
    /// of their errors are reported together; any compile‑time error stops
    /// the run before execution.
    pub fn run(&mut self, source: &str) -> RunOutcome {
        info!("Running {} bytes of source", source.len());

        let (tokens, mut errors) = scanner::scan(source);

        let mut parser = Parser::starting_at(&tokens, self.next_id);
        let (statements, parse_errors) = parser.parse();
        self.next_id = parser.next_expr_id();

        errors.extend(parse_errors);

        if !errors.is_empty() {
            debug!("Stopping after {} syntax error(s)", errors.len());
            return RunOutcome::CompileError(errors);
        }

        match Resolver::new().resolve(&statements) {
            Ok(locals) => self.interpreter.resolve(locals),
            Err(errors) => {
                debug!("Stopping after {} resolve error(s)", errors.len());
                return RunOutcome::CompileError(errors);
            }
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => RunOutcome::Success,
            Err(error) => {
                debug!("Runtime error: {}", error);
                RunOutcome::RuntimeError(error)
            }
        }
    }
}

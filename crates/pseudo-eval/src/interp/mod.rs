//! The tree-walking interpreter.
//!
//! Split by concern:
//! - `exec_stmt`: statements and control flow
//! - `declare`: variables, arrays, constants, types and routine definitions
//! - `eval_expr`: expressions
//! - `resolve`: access paths to storage
//! - `operators`: arithmetic, comparison, logic, concat and casts
//! - `call`: the procedure/function call protocol
//! - `io`: console and file statements
//! - `format`: REPL echo formatting

mod call;
mod declare;
mod eval_expr;
mod exec_stmt;
mod format;
mod io;
mod operators;
mod resolve;

use pseudo_types::ast::Program;
use pseudo_types::Span;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::builtins;
use crate::console::{Console, StdConsole};
use crate::error::{ErrorKind, EvalResult, RuntimeError};
use crate::files::{DiskFiles, FileManager};
use crate::scope::{LookupMode, Scope, ScopeArena, ScopeId, ScopeKind, Storage};
use crate::value::Value;

pub(crate) use resolve::Target;

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct InterpreterOptions {
    /// Seed for `RAND`; entropy when `None`.
    pub seed: Option<u64>,
    /// Print the value of top-level expression statements (REPL mode).
    pub echo_expressions: bool,
}

/// How a block finished.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Normal,
    Break(Span),
    Continue(Span),
    Return(Value),
}

pub struct Interpreter {
    pub(crate) scopes: ScopeArena,
    pub(crate) root: ScopeId,
    pub(crate) console: Box<dyn Console>,
    pub(crate) files: Box<dyn FileManager>,
    pub(crate) rng: StdRng,
    pub(crate) options: InterpreterOptions,
}

impl Interpreter {
    /// An interpreter on stdout/stdin and the real filesystem.
    pub fn new(options: InterpreterOptions) -> Self {
        Self::with_io(options, Box::new(StdConsole), Box::new(DiskFiles::new()))
    }

    pub fn with_io(
        options: InterpreterOptions,
        console: Box<dyn Console>,
        files: Box<dyn FileManager>,
    ) -> Self {
        let mut scopes = ScopeArena::new();
        let mut program = Scope::new("Program", None, ScopeKind::Program);
        builtins::register(&mut program);
        let root = scopes.alloc(program);
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        tracing::debug!(seeded = options.seed.is_some(), "root scope created");
        Self {
            scopes,
            root,
            console,
            files,
            rng,
            options,
        }
    }

    /// Run a program in the root scope.
    ///
    /// The root persists between calls, so a REPL can feed one input at a
    /// time. A `BREAK` or `CONTINUE` that escapes every loop is reported here.
    #[tracing::instrument(level = "debug", skip_all, fields(stmts = program.body.stmts.len()))]
    pub fn run(&mut self, program: &Program) -> EvalResult<()> {
        let root = self.root;
        match self.exec_block(root, &program.body)? {
            ControlFlow::Break(span) => Err(self.error(
                root,
                span,
                ErrorKind::InvalidUsage("'BREAK' statement".into()),
            )),
            ControlFlow::Continue(span) => Err(self.error(
                root,
                span,
                ErrorKind::InvalidUsage("'CONTINUE' statement".into()),
            )),
            ControlFlow::Normal | ControlFlow::Return(_) => Ok(()),
        }
    }

    /// Close every file still open, warning about each.
    pub fn finish(&mut self) {
        for name in self.files.open_files() {
            tracing::warn!(file = %name, "file left open at program end; closing");
            self.files.close(&name);
        }
    }

    /// Current value of a program-level variable.
    pub fn global(&self, name: &str) -> Option<Value> {
        let place = self.scopes.find_variable(self.root, name, LookupMode::Local)?;
        self.scopes.variable(&place)?.value().cloned()
    }

    /// Number of live scopes, the root included.
    pub fn live_scopes(&self) -> usize {
        self.scopes.live_count()
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Helpers shared by the submodules
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn scope_name(&self, scope: ScopeId) -> &str {
        self.scopes.get(scope).map_or("<deleted>", |s| s.name.as_str())
    }

    pub(crate) fn error(&self, scope: ScopeId, span: Span, kind: ErrorKind) -> RuntimeError {
        RuntimeError::new(kind, span, self.scope_name(scope)).with_origin(scope)
    }

    /// A `General` error with a plain message.
    pub(crate) fn fail(&self, scope: ScopeId, span: Span, message: impl Into<String>) -> RuntimeError {
        self.error(scope, span, ErrorKind::General(message.into()))
    }

    pub(crate) fn frame(&self, scope: ScopeId, span: Span) -> EvalResult<&Scope> {
        self.scopes
            .get(scope)
            .ok_or_else(|| self.fail(scope, span, "Scope is no longer live"))
    }

    pub(crate) fn frame_mut(&mut self, scope: ScopeId, span: Span) -> EvalResult<&mut Scope> {
        if !self.scopes.is_live(scope) {
            return Err(self.fail(scope, span, "Scope is no longer live"));
        }
        self.scopes
            .get_mut(scope)
            .ok_or_else(|| RuntimeError::new(ErrorKind::General("Scope is no longer live".into()), span, ""))
    }

    /// Read the value owned at a resolved place.
    pub(crate) fn read(&self, scope: ScopeId, place: &crate::scope::Place, span: Span) -> EvalResult<Value> {
        match self.scopes.variable(place).map(|v| &v.storage) {
            Some(Storage::Owned(value)) => Ok(value.clone()),
            _ => Err(self.fail(scope, span, "Attempting to access deleted object")),
        }
    }
}

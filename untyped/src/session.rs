use std::{
    io::{self, Write},
    ops::ControlFlow,
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    ast::{Statement, Term},
    bindings::Bindings,
    eval::{self, Paused},
    parser::{parse_program, ParseError},
    subst,
};

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Options {
    /// Print every formula before evaluating it.
    pub show_before: bool,
    /// Print each intermediate term and wait on the gate after every rewrite.
    pub step: bool,
    /// Stop reducing a formula after this many rewrites.
    pub max_steps: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            show_before: true,
            step: false,
            max_steps: None,
        }
    }
}

/// How results are printed. Interactive sessions also forget their bindings
/// after each input.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Mode {
    Batch,
    Interactive,
}

/// What to do after a pause in step mode.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Resume {
    /// Perform one more rewrite.
    Next,
    /// Reduce the rest of the formula without pausing.
    Finish,
    /// Drop the formula and move on to the next one.
    Abort,
}

impl Resume {
    /// `c` (or end of input) finishes, `q` aborts, anything else steps.
    pub fn from_key(key: Option<char>) -> Self {
        match key {
            Some('c') | None => Resume::Finish,
            Some('q') => Resume::Abort,
            Some(_) => Resume::Next,
        }
    }
}

pub trait Gate {
    fn wait(&mut self) -> io::Result<Resume>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct Session<W, G> {
    bindings: Bindings,
    options: Options,
    mode: Mode,
    out: W,
    gate: G,
}

impl<W: Write, G: Gate> Session<W, G> {
    pub fn new(options: Options, mode: Mode, out: W, gate: G) -> Self {
        Self {
            bindings: Bindings::default(),
            options,
            mode,
            out,
            gate,
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Parses all of `source`, then evaluates its formulas in order. Nothing
    /// is evaluated if any part fails to parse.
    pub fn run(&mut self, source: &[u8]) -> Result<(), SessionError> {
        if self.mode == Mode::Interactive {
            self.bindings.clear();
        }
        let statements = parse_program(source, &mut self.bindings)?;
        debug!(
            statements = statements.len(),
            bindings = self.bindings.len(),
            "parsed"
        );
        for statement in &statements {
            if let Statement::Eval(term) = statement {
                self.evaluate(term)?;
            }
        }
        Ok(())
    }

    fn print_state(&mut self, term: &Term) -> io::Result<()> {
        match self.mode {
            Mode::Batch => writeln!(self.out, "{term}."),
            Mode::Interactive => writeln!(self.out, " = {term}."),
        }
    }

    fn print_result(&mut self, term: &Term) -> io::Result<()> {
        match self.mode {
            Mode::Batch if self.options.show_before || self.options.step => {
                writeln!(self.out, "-> {term}.")
            }
            _ => self.print_state(term),
        }
    }

    fn budget_exhausted(&self, rewrites: usize) -> bool {
        self.options.max_steps.map_or(false, |max| rewrites >= max)
    }

    pub fn evaluate(&mut self, term: &Term) -> io::Result<()> {
        debug!(term = %term, "evaluating");
        let mut current = subst::resolve(term, &self.bindings);
        let mut stepping = self.options.step;
        if self.mode == Mode::Batch && (self.options.show_before || stepping) {
            writeln!(self.out, "{term}")?;
            if stepping && !self.resume(&mut stepping)? {
                return Ok(());
            }
        }

        let mut rewrites = 0;
        let mut substituted = false;
        loop {
            if self.budget_exhausted(rewrites) {
                warn!(rewrites, "step budget exhausted");
                break;
            }
            let pause = stepping || self.options.max_steps.is_some();
            match eval::reduce(&mut current, &self.bindings, pause) {
                ControlFlow::Continue(modified) => {
                    substituted |= modified;
                    break;
                }
                ControlFlow::Break(Paused) => {
                    rewrites += 1;
                    substituted = true;
                    if stepping {
                        self.print_state(&current)?;
                        if !self.resume(&mut stepping)? {
                            return Ok(());
                        }
                    }
                }
            }
        }
        debug!(rewrites, substituted, "reduced");
        self.print_result(&current)
    }

    /// Waits on the gate. Returns false when the formula should be dropped.
    fn resume(&mut self, stepping: &mut bool) -> io::Result<bool> {
        self.out.flush()?;
        match self.gate.wait()? {
            Resume::Next => Ok(true),
            Resume::Finish => {
                debug!("finishing without pauses");
                *stepping = false;
                Ok(true)
            }
            Resume::Abort => {
                debug!("formula abandoned");
                Ok(false)
            }
        }
    }
}

//! Script Interpreter - Executes parsed module sequences
//!
//! Modules run strictly in order against a shared environment. The only
//! concurrent step is `Accept "s" With { x, y, ... }`, which forks one task
//! per automaton and joins them all before the next module starts.

use super::parser::Parser;
use super::types::{AcceptDfa, Environment, Module, ModuleSequence, PrintDfa};
use super::{ParseError, RuntimeError};
use crate::report::{Output, Report};
use crate::DfalangError;
use std::sync::Arc;
use tokio::task::JoinSet;

pub struct Interpreter {
    env: Arc<Environment>,
    output: Output,
}

impl Interpreter {
    /// Create an interpreter with an empty environment
    pub fn new(output: Output) -> Self {
        Self {
            env: Arc::new(Environment::new()),
            output,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Parse and run a whole script.
    ///
    /// Every failure has already been reported to the output when this
    /// returns; the error is handed back for the caller's exit status.
    pub async fn run_source(&mut self, source: &str) -> Result<(), DfalangError> {
        let program = self.parse(source)?;
        self.run(&program).await?;
        Ok(())
    }

    /// Parse `source`, reporting advisories and the first error, if any.
    pub fn parse(&self, source: &str) -> Result<ModuleSequence, ParseError> {
        let mut parser = Parser::new(source).map_err(|e| self.fail(e))?;
        let result = parser.parse();

        for warning in parser.take_warnings() {
            self.output.emit(&Report::warning(warning));
        }

        let program = result.map_err(|e| self.fail(e))?;
        log::debug!("Parsed {} modules", program.len());
        Ok(program)
    }

    /// Execute a program, reporting the runtime error that stops it.
    pub async fn run(&mut self, program: &ModuleSequence) -> Result<(), RuntimeError> {
        log::info!("Executing {} modules", program.len());
        self.execute(program).await.map_err(|e| self.fail(e))
    }

    /// Execute modules in order. The first error stops the sequence; bindings
    /// made before it stay in place.
    pub async fn execute(&mut self, program: &ModuleSequence) -> Result<(), RuntimeError> {
        for module in program.modules() {
            self.execute_module(module).await?;
        }
        Ok(())
    }

    async fn execute_module(&mut self, module: &Module) -> Result<(), RuntimeError> {
        match module {
            Module::Definition { name, dfa } => {
                let automaton = dfa.evaluate(&self.env)?;
                if !automaton.validate() {
                    return Err(RuntimeError::InvalidDefinition(name.clone()));
                }
                let report = Report::Defined {
                    name: name.clone(),
                    automaton: automaton.to_string(),
                };

                Arc::make_mut(&mut self.env).bind(name.clone(), dfa.clone());
                log::debug!("Bound automaton {}", name);
                self.output.emit(&report);
                Ok(())
            }
            Module::Print(print) => self.print(print),
            Module::PrintList(prints) => prints.iter().try_for_each(|print| self.print(print)),
            Module::Accept(accept) => check_acceptance(&self.env, &self.output, accept),
            Module::AcceptMulti(accepts) => {
                self.check_acceptance_concurrently(accepts).await;
                Ok(())
            }
        }
    }

    fn print(&self, print: &PrintDfa) -> Result<(), RuntimeError> {
        let automaton = print.dfa.evaluate(&self.env)?;
        self.output.emit(&Report::Printed {
            name: print.dfa.label().to_string(),
            automaton: automaton.to_string(),
        });
        Ok(())
    }

    /// Fork one task per check, then wait for all of them.
    ///
    /// Each task reports its own verdict or error; a failing task does not
    /// affect its siblings or the enclosing sequence.
    async fn check_acceptance_concurrently(&self, accepts: &[AcceptDfa]) {
        let mut tasks = JoinSet::new();

        for accept in accepts.iter().cloned() {
            let env = Arc::clone(&self.env);
            let output = self.output.clone();

            tasks.spawn_blocking(move || {
                if let Err(e) = check_acceptance(&env, &output, &accept) {
                    log::error!("Acceptance check with {} failed: {}", accept.dfa.label(), e);
                    output.emit(&Report::error(e));
                }
            });
        }
        log::debug!("Spawned {} acceptance tasks", tasks.len());

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                log::error!("Acceptance task did not complete: {}", e);
                self.output
                    .emit(&Report::error(format!("Acceptance task did not complete: {}", e)));
            }
        }
    }

    fn fail<E: std::fmt::Display>(&self, error: E) -> E {
        log::error!("{}", error);
        self.output.emit(&Report::error(&error));
        error
    }
}

/// Validate the automaton, run it on the input and report the verdict.
fn check_acceptance(env: &Environment, output: &Output, accept: &AcceptDfa) -> Result<(), RuntimeError> {
    let automaton = accept.dfa.evaluate(env)?;
    if !automaton.validate() {
        return Err(RuntimeError::InvalidAutomaton(accept.dfa.label().to_string()));
    }

    output.emit(&Report::Verdict {
        input: accept.input.clone(),
        automaton: accept.dfa.to_string(),
        accepted: automaton.accepts(&accept.input),
    });
    Ok(())
}

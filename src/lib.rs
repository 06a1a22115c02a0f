//! dfalang: an interpreter for DFA scripts
//!
//! Scripts define deterministic finite automata and ask whether strings are
//! accepted by them:
//!
//! ```text
//! # accepts exactly "a"
//! x = DFA { S=2 A={'a'} T={(1,'a',2)} F={2} }
//!
//! Print x
//! Accept "a" With x
//! Accept "b" With { x, y }      # checks run concurrently
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dfalang::{Interpreter, Output, ReportFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dfalang::DfalangError> {
//!     let mut interpreter = Interpreter::new(Output::stdout(ReportFormat::Text));
//!     interpreter
//!         .run_source("x = DFA { S=2 A={'a'} T={(1,'a',2)} F={2} }\nAccept \"a\" With x")
//!         .await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! source ──▶ Lexer ──▶ Parser ──▶ ModuleSequence ──▶ Interpreter ──▶ Output
//!                                                        │
//!                                                        ▼
//!                                             Automaton::validate / accepts
//! ```

pub mod automaton;
pub mod config;
pub mod lang;
pub mod report;

// Re-export core types
pub use automaton::{Automaton, StateId, START_STATE};
pub use config::DfalangConfig;
pub use lang::{
    AcceptDfa, AutomatonExpr, Environment, Interpreter, Module, ModuleSequence, ParseError,
    Parser, PrintDfa, RuntimeError,
};
pub use report::{CaptureBuffer, Output, Report, ReportFormat};

/// dfalang error types
#[derive(Debug, thiserror::Error)]
pub enum DfalangError {
    /// Script could not be tokenized or parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Script failed while executing
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

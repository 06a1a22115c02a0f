//! DFA script language
//!
//! Front end and execution engine for scripts that define automata and ask
//! whether strings are accepted by them.
//!
//! Architecture:
//! - Lexer: Tokenizes script source lazily, one token per request
//! - Parser: Predictive recursive descent into a module sequence
//! - Interpreter: Executes modules against a name -> expression environment

pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod types;

pub use interpreter::Interpreter;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{DuplicateTransition, Parser};
pub use types::{AcceptDfa, AutomatonExpr, Environment, Module, ModuleSequence, PrintDfa};

use thiserror::Error;

/// Failure while turning source text into a module sequence.
///
/// Any of these aborts the whole parse; nothing of the program is executed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected symbol near line {line}")]
    Lexical { line: usize },

    #[error("Expected {expected}, but got {found} near line {line}")]
    Syntax {
        expected: TokenKind,
        found: TokenKind,
        line: usize,
    },

    #[error("Number {lexeme} is too large near line {line}")]
    InvalidNumber { lexeme: String, line: usize },

    #[error("Expected a definition, Accept or Print statement, but got {found} near line {line}")]
    UnexpectedModule { found: TokenKind, line: usize },
}

impl ParseError {
    /// Source line the error was detected on
    pub fn line(&self) -> usize {
        match self {
            ParseError::Lexical { line }
            | ParseError::Syntax { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::UnexpectedModule { line, .. } => *line,
        }
    }
}

/// Failure while executing a parsed program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("No variable named {0}")]
    UndefinedVariable(String),

    #[error("Invalid automaton definition {0}")]
    InvalidDefinition(String),

    #[error("Invalid automaton definition used with {0}")]
    InvalidAutomaton(String),
}

//! Script Type Definitions and AST
//!
//! Data structures representing a parsed script and the environment it runs
//! against.

use super::RuntimeError;
use crate::automaton::Automaton;
use std::collections::HashMap;
use std::fmt;

/// An expression that evaluates to an automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomatonExpr {
    /// Inline `DFA { ... }` literal
    Literal(Automaton),

    /// Reference to a name bound by an earlier definition
    Variable(String),
}

impl AutomatonExpr {
    /// Evaluate to an automaton.
    ///
    /// Variables are resolved on every evaluation by evaluating the bound
    /// expression in turn. A binding that refers back to itself, directly or
    /// through other names, recurses without bound.
    pub fn evaluate<'a>(&'a self, env: &'a Environment) -> Result<&'a Automaton, RuntimeError> {
        match self {
            AutomatonExpr::Literal(dfa) => Ok(dfa),
            AutomatonExpr::Variable(name) => env
                .get(name)
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()))?
                .evaluate(env),
        }
    }

    /// Short name used in error messages
    pub fn label(&self) -> &str {
        match self {
            AutomatonExpr::Literal(_) => "DFA literal",
            AutomatonExpr::Variable(name) => name.as_str(),
        }
    }
}

impl fmt::Display for AutomatonExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomatonExpr::Literal(dfa) => write!(f, "{}", dfa),
            AutomatonExpr::Variable(name) => f.write_str(name),
        }
    }
}

/// `Print` of a single automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDfa {
    pub dfa: AutomatonExpr,
}

/// `Accept "<input>" With <automaton>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptDfa {
    pub input: String,
    pub dfa: AutomatonExpr,
}

/// One executable statement of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Module {
    /// `name = DFA { ... }`
    Definition { name: String, dfa: AutomatonExpr },

    /// `Print x`
    Print(PrintDfa),

    /// `Print { x, y, ... }`
    PrintList(Vec<PrintDfa>),

    /// `Accept "s" With x` or `Accept "s" With DFA { ... }`
    Accept(AcceptDfa),

    /// `Accept "s" With { x, y, ... }`, each check runs concurrently
    AcceptMulti(Vec<AcceptDfa>),
}

/// Whole parsed program, executed in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSequence {
    modules: Vec<Module>,
}

impl ModuleSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, module: Module) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl From<Vec<Module>> for ModuleSequence {
    fn from(modules: Vec<Module>) -> Self {
        Self { modules }
    }
}

/// Name -> expression bindings for one program run.
///
/// Bindings store the expression as written, not the evaluated automaton.
/// Names are never removed; rebinding a name keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, AutomatonExpr>,
    order: Vec<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, dfa: AutomatonExpr) {
        let name = name.into();
        if self.bindings.insert(name.clone(), dfa).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&AutomatonExpr> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bound names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

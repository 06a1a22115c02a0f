//! Deterministic finite automaton model
//!
//! An [`Automaton`] is the value every automaton expression evaluates to. It
//! carries a state count, an alphabet, a partial transition function and a
//! set of accept states. The start state is always 1.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// State index. Valid states are `1..=state_count`.
pub type StateId = u32;

/// Start state shared by every automaton.
pub const START_STATE: StateId = 1;

/// A deterministic finite automaton with a partial transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    /// Number of states
    state_count: StateId,

    /// Input symbols
    alphabet: BTreeSet<char>,

    /// Transitions: (source, symbol) -> destination
    transitions: BTreeMap<(StateId, char), StateId>,

    /// Final (accepting) states
    accept_states: BTreeSet<StateId>,
}

impl Automaton {
    /// Create an automaton from its parts.
    ///
    /// Nothing is checked here; call [`Automaton::validate`] before trusting
    /// the result for acceptance testing.
    pub fn new(
        state_count: StateId,
        alphabet: impl IntoIterator<Item = char>,
        transitions: BTreeMap<(StateId, char), StateId>,
        accept_states: impl IntoIterator<Item = StateId>,
    ) -> Self {
        Self {
            state_count,
            alphabet: alphabet.into_iter().collect(),
            transitions,
            accept_states: accept_states.into_iter().collect(),
        }
    }

    pub fn state_count(&self) -> StateId {
        self.state_count
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &BTreeMap<(StateId, char), StateId> {
        &self.transitions
    }

    pub fn accept_states(&self) -> &BTreeSet<StateId> {
        &self.accept_states
    }

    /// Get the next state from `state` on `symbol`, if the table defines one.
    pub fn next_state(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.transitions.get(&(state, symbol)).copied()
    }

    /// Check if the given state is an accept state
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accept_states.contains(&state)
    }

    /// Structural well-formedness check.
    ///
    /// Returns false if any transition leaves or enters a state outside
    /// `1..=state_count`, uses a symbol outside the alphabet, or if any accept
    /// state is out of range.
    pub fn validate(&self) -> bool {
        let transitions_ok = self.transitions.iter().all(|(&(from, symbol), &to)| {
            self.is_valid_state(from) && self.is_valid_state(to) && self.alphabet.contains(&symbol)
        });

        transitions_ok && self.accept_states.iter().all(|&s| self.is_valid_state(s))
    }

    /// Run the automaton on `input` from the start state.
    ///
    /// A missing transition rejects immediately. Performs no validation.
    pub fn accepts(&self, input: &str) -> bool {
        let mut state = START_STATE;

        for symbol in input.chars() {
            match self.next_state(state, symbol) {
                Some(next) => state = next,
                None => return false,
            }
        }

        self.is_accepting(state)
    }

    fn is_valid_state(&self, state: StateId) -> bool {
        (1..=self.state_count).contains(&state)
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alphabet = self
            .alphabet
            .iter()
            .map(|c| format!("'{}'", c))
            .collect::<Vec<_>>()
            .join(", ");
        let transitions = self
            .transitions
            .iter()
            .map(|((from, symbol), to)| format!("({}, '{}') -> {}", from, symbol, to))
            .collect::<Vec<_>>()
            .join(", ");
        let accept_states = self
            .accept_states
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        writeln!(f, "{{")?;
        writeln!(f, " State count = {}", self.state_count)?;
        writeln!(f, " Alphabet = {{{}}}", alphabet)?;
        writeln!(f, " Transitions = {{{}}}", transitions)?;
        writeln!(f, " Accept States = {{{}}}", accept_states)?;
        write!(f, "}}")
    }
}

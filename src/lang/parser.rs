//! Script Parser - Builds a module sequence from tokens
//!
//! Predictive recursive descent with one token of lookahead:
//!
//! ```text
//! program      := (EOL)* module (EOL+ module)* (EOL)*
//! module       := definition | accept_stmt | print_stmt
//! definition   := IDENT '=' automaton
//! automaton    := 'DFA' '{' states alphabet transitions final '}'
//! states       := 'States' '=' NUMBER
//! alphabet     := 'Alphabet' '=' '{' LETTER (',' LETTER)* '}'
//! transitions  := 'Transitions' '=' '{' transition (',' transition)* '}'
//! transition   := '(' NUMBER ',' LETTER ',' NUMBER ')'
//! final        := 'FinalStates' '=' '{' NUMBER (',' NUMBER)* '}'
//! accept_stmt  := 'Accept' STRING 'With' target
//! target       := IDENT | automaton | '{' IDENT (',' IDENT)* '}'
//! print_stmt   := 'Print' (IDENT | '{' IDENT (',' IDENT)* '}')
//! ```
//!
//! The first error aborts the parse; there is no resynchronization.

use super::lexer::{Lexer, Token, TokenKind};
use super::types::*;
use super::ParseError;
use crate::automaton::{Automaton, StateId};
use std::collections::BTreeMap;
use std::fmt;

/// Advisory raised when a transition list defines the same (state, symbol)
/// pair more than once. The last definition wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTransition {
    pub state: StateId,
    pub symbol: char,
    pub line: usize,
}

impl fmt::Display for DuplicateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Non deterministic transition list definition near line {}! \
             Transition ({}, '{}') is defined more than once; the last one will be considered.",
            self.line, self.state, self.symbol
        )
    }
}

pub struct Parser {
    lexer: Lexer,
    lookahead: Token,
    warnings: Vec<DuplicateTransition>,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let lookahead = lexer.next_token()?;

        Ok(Self {
            lexer,
            lookahead,
            warnings: Vec::new(),
        })
    }

    /// Parse the whole program.
    pub fn parse(&mut self) -> Result<ModuleSequence, ParseError> {
        let mut program = ModuleSequence::new();

        loop {
            self.skip_newlines()?;

            if self.check(TokenKind::Eof) {
                break;
            }

            let module = self.parse_module()?;
            log::debug!("parsed module ending near line {}", self.lookahead.line);
            program.push(module);

            // modules must be separated by new lines
            self.parse_newlines()?;
        }

        Ok(program)
    }

    /// Duplicate-transition advisories collected so far, in parse order.
    ///
    /// Still available after [`Parser::parse`] failed.
    pub fn warnings(&self) -> &[DuplicateTransition] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<DuplicateTransition> {
        std::mem::take(&mut self.warnings)
    }

    fn parse_module(&mut self) -> Result<Module, ParseError> {
        match self.lookahead.kind {
            TokenKind::Ident => self.parse_definition(),
            TokenKind::Accept => self.parse_accept(),
            TokenKind::Print => self.parse_print(),
            found => Err(ParseError::UnexpectedModule {
                found,
                line: self.lookahead.line,
            }),
        }
    }

    fn parse_definition(&mut self) -> Result<Module, ParseError> {
        let name = self.expect(TokenKind::Ident)?.lexeme;
        self.expect(TokenKind::Define)?;
        let dfa = self.parse_automaton()?;

        Ok(Module::Definition {
            name,
            dfa: AutomatonExpr::Literal(dfa),
        })
    }

    fn parse_accept(&mut self) -> Result<Module, ParseError> {
        self.expect(TokenKind::Accept)?;
        let input = self.parse_string()?;
        self.expect(TokenKind::With)?;

        match self.lookahead.kind {
            TokenKind::Ident => {
                let dfa = self.parse_variable()?;
                Ok(Module::Accept(AcceptDfa { input, dfa }))
            }
            TokenKind::Automaton => {
                let dfa = AutomatonExpr::Literal(self.parse_automaton()?);
                Ok(Module::Accept(AcceptDfa { input, dfa }))
            }
            _ => {
                let targets = self.parse_braced_list(Self::parse_variable)?;
                Ok(Module::AcceptMulti(
                    targets
                        .into_iter()
                        .map(|dfa| AcceptDfa {
                            input: input.clone(),
                            dfa,
                        })
                        .collect(),
                ))
            }
        }
    }

    fn parse_print(&mut self) -> Result<Module, ParseError> {
        self.expect(TokenKind::Print)?;

        if self.check(TokenKind::Ident) {
            let dfa = self.parse_variable()?;
            return Ok(Module::Print(PrintDfa { dfa }));
        }

        let targets = self.parse_braced_list(Self::parse_variable)?;
        Ok(Module::PrintList(
            targets.into_iter().map(|dfa| PrintDfa { dfa }).collect(),
        ))
    }

    fn parse_automaton(&mut self) -> Result<Automaton, ParseError> {
        self.expect(TokenKind::Automaton)?;
        self.expect(TokenKind::LeftBrace)?;

        let state_count = self.parse_states()?;
        let alphabet = self.parse_alphabet()?;
        let transitions = self.parse_transitions()?;
        let accept_states = self.parse_accept_states()?;

        self.expect(TokenKind::RightBrace)?;

        Ok(Automaton::new(state_count, alphabet, transitions, accept_states))
    }

    fn parse_states(&mut self) -> Result<StateId, ParseError> {
        self.expect(TokenKind::States)?;
        self.expect(TokenKind::Define)?;
        self.parse_number()
    }

    fn parse_alphabet(&mut self) -> Result<Vec<char>, ParseError> {
        self.expect(TokenKind::Alphabet)?;
        self.expect(TokenKind::Define)?;
        self.parse_braced_list(Self::parse_letter)
    }

    fn parse_transitions(&mut self) -> Result<BTreeMap<(StateId, char), StateId>, ParseError> {
        self.expect(TokenKind::Transitions)?;
        self.expect(TokenKind::Define)?;

        let entries = self.parse_braced_list(Self::parse_transition)?;

        let mut transitions = BTreeMap::new();
        for (from, symbol, to, line) in entries {
            if transitions.insert((from, symbol), to).is_some() {
                let warning = DuplicateTransition {
                    state: from,
                    symbol,
                    line,
                };
                log::warn!("{}", warning);
                self.warnings.push(warning);
            }
        }

        Ok(transitions)
    }

    /// `(from, 'c', to)`, returned with the line it started on
    fn parse_transition(&mut self) -> Result<(StateId, char, StateId, usize), ParseError> {
        let line = self.expect(TokenKind::LeftParen)?.line;

        let from = self.parse_number()?;
        self.expect(TokenKind::Comma)?;

        let symbol = self.parse_letter()?;
        self.expect(TokenKind::Comma)?;

        let to = self.parse_number()?;
        self.expect(TokenKind::RightParen)?;

        Ok((from, symbol, to, line))
    }

    fn parse_accept_states(&mut self) -> Result<Vec<StateId>, ParseError> {
        self.expect(TokenKind::AcceptStates)?;
        self.expect(TokenKind::Define)?;
        self.parse_braced_list(Self::parse_number)
    }

    /// `'{' item (',' item)* '}'`
    fn parse_braced_list<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        self.expect(TokenKind::LeftBrace)?;

        let mut items = vec![item(self)?];
        while !self.check(TokenKind::RightBrace) {
            self.expect(TokenKind::Comma)?;
            items.push(item(self)?);
        }

        self.expect(TokenKind::RightBrace)?;
        Ok(items)
    }

    fn parse_variable(&mut self) -> Result<AutomatonExpr, ParseError> {
        let name = self.expect(TokenKind::Ident)?.lexeme;
        Ok(AutomatonExpr::Variable(name))
    }

    // "abc" -> abc
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::String)?;
        Ok(token.lexeme.trim_matches('"').to_string())
    }

    // 'a' -> a, and 'abc' -> a as well
    fn parse_letter(&mut self) -> Result<char, ParseError> {
        let token = self.expect(TokenKind::Letter)?;
        token
            .lexeme
            .chars()
            .nth(1)
            .ok_or(ParseError::Lexical { line: token.line })
    }

    fn parse_number(&mut self) -> Result<StateId, ParseError> {
        let token = self.expect(TokenKind::Number)?;
        token
            .lexeme
            .parse::<StateId>()
            .map_err(|_| ParseError::InvalidNumber {
                lexeme: token.lexeme.clone(),
                line: token.line,
            })
    }

    fn parse_newlines(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Eol)?;
        self.skip_newlines()
    }

    // Utility methods

    fn check(&self, kind: TokenKind) -> bool {
        self.lookahead.kind == kind
    }

    /// Replace the lookahead with the next token, returning the old one.
    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if !self.check(kind) {
            return Err(ParseError::Syntax {
                expected: kind,
                found: self.lookahead.kind,
                line: self.lookahead.line,
            });
        }
        self.advance()
    }

    fn skip_newlines(&mut self) -> Result<(), ParseError> {
        while self.check(TokenKind::Eol) {
            self.advance()?;
        }
        Ok(())
    }
}

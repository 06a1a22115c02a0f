//! Script Lexer - Tokenizes DFA scripts
//!
//! Tokens are produced lazily, one per call to [`Lexer::next_token`], so the
//! parser only ever looks at a single token of lookahead.

use super::ParseError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Number,               // 42
    String,               // "abc"
    Ident,                // x, dfa1
    Letter,               // 'a'

    // Keywords
    Automaton,            // DFA
    States,               // S, States
    Alphabet,             // A, Alphabet
    Transitions,          // T, Transitions
    AcceptStates,         // F, FinalStates
    Accept,               // Accept
    With,                 // With
    Print,                // Print

    // Symbols
    LeftParen,            // (
    RightParen,           // )
    LeftBrace,            // {
    RightBrace,           // }
    Define,               // =
    Comma,                // ,
    Eol,                  // \n
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "end of input",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Ident => "identifier",
            TokenKind::Letter => "letter",
            TokenKind::Automaton => "'DFA'",
            TokenKind::States => "'States'",
            TokenKind::Alphabet => "'Alphabet'",
            TokenKind::Transitions => "'Transitions'",
            TokenKind::AcceptStates => "'FinalStates'",
            TokenKind::Accept => "'Accept'",
            TokenKind::With => "'With'",
            TokenKind::Print => "'Print'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::Define => "'='",
            TokenKind::Comma => "','",
            TokenKind::Eol => "new line",
        };
        f.write_str(name)
    }
}

/// A single token: kind, matched text and the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof | TokenKind::Eol => write!(f, "{} (line {})", self.kind, self.line),
            _ => write!(f, "{}({}) (line {})", self.kind, self.lexeme, self.line),
        }
    }
}

fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "DFA" => TokenKind::Automaton,
        "S" | "States" => TokenKind::States,
        "A" | "Alphabet" => TokenKind::Alphabet,
        "T" | "Transitions" => TokenKind::Transitions,
        "F" | "FinalStates" => TokenKind::AcceptStates,
        "Accept" => TokenKind::Accept,
        "With" => TokenKind::With,
        "Print" => TokenKind::Print,
        _ => return None,
    };
    Some(kind)
}

fn symbol(c: char) -> Option<TokenKind> {
    let kind = match c {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        '=' => TokenKind::Define,
        ',' => TokenKind::Comma,
        '\n' => TokenKind::Eol,
        _ => return None,
    };
    Some(kind)
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        // A trailing newline guarantees the last module is terminated.
        let mut chars: Vec<char> = input.chars().collect();
        chars.push('\n');

        Self {
            input: chars,
            position: 0,
            line: 1,
        }
    }

    /// Produce the next token.
    ///
    /// Patterns are tried in a fixed order: number, string, identifier or
    /// keyword, letter, symbol. Text matching none of them is a lexical error.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            self.skip_blanks();

            if self.is_eof() {
                return Ok(Token::new(TokenKind::Eof, "", self.line));
            }

            if self.current() == '#' {
                self.skip_comment();
                continue;
            }

            if self.current() == '\\' {
                self.splice_line()?;
                continue;
            }

            break;
        }

        if let Some(token) = self.read_number() {
            return Ok(token);
        }
        if let Some(token) = self.read_string() {
            return Ok(token);
        }
        if let Some(token) = self.read_identifier_or_keyword() {
            return Ok(token);
        }
        if let Some(token) = self.read_letter() {
            return Ok(token);
        }

        self.read_symbol()
    }

    /// Tokenize the remaining input up to and including [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current(&self) -> char {
        self.input[self.position]
    }

    fn char_at(&self, position: usize) -> Option<char> {
        self.input.get(position).copied()
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_blanks(&mut self) {
        while !self.is_eof() && matches!(self.current(), ' ' | '\t') {
            self.position += 1;
        }
    }

    // Leaves the terminating newline for the next token.
    fn skip_comment(&mut self) {
        while !self.is_eof() && self.current() != '\n' {
            self.position += 1;
        }
    }

    /// Length of the run of characters satisfying `pred` starting at `from`.
    fn run_length(&self, from: usize, pred: impl Fn(char) -> bool) -> usize {
        self.input[from.min(self.input.len())..]
            .iter()
            .take_while(|&&c| pred(c))
            .count()
    }

    fn cut(&mut self, len: usize) -> String {
        let lexeme: String = self.input[self.position..self.position + len].iter().collect();
        self.position += len;
        lexeme
    }

    fn read_number(&mut self) -> Option<Token> {
        let len = self.run_length(self.position, |c| c.is_ascii_digit());
        if len == 0 {
            return None;
        }
        Some(Token::new(TokenKind::Number, self.cut(len), self.line))
    }

    /// `"` letters `"`, no escapes.
    fn read_string(&mut self) -> Option<Token> {
        self.read_quoted('"', TokenKind::String)
    }

    /// `'` letters `'`. Only the first letter is meaningful to the parser.
    fn read_letter(&mut self) -> Option<Token> {
        self.read_quoted('\'', TokenKind::Letter)
    }

    fn read_quoted(&mut self, quote: char, kind: TokenKind) -> Option<Token> {
        if self.current() != quote {
            return None;
        }
        let letters = self.run_length(self.position + 1, |c| c.is_ascii_alphabetic());
        if letters == 0 || self.char_at(self.position + 1 + letters) != Some(quote) {
            return None;
        }
        Some(Token::new(kind, self.cut(letters + 2), self.line))
    }

    fn read_identifier_or_keyword(&mut self) -> Option<Token> {
        if !self.current().is_ascii_alphabetic() {
            return None;
        }
        let len = self.run_length(self.position, |c| c.is_ascii_alphanumeric());
        let lexeme = self.cut(len);
        let kind = keyword(&lexeme).unwrap_or(TokenKind::Ident);
        Some(Token::new(kind, lexeme, self.line))
    }

    /// `\` followed by the end of the physical line: drop both so the next
    /// line continues the current one. The newline still counts as a line.
    fn splice_line(&mut self) -> Result<(), ParseError> {
        self.position += 1;
        self.skip_blanks();
        if !self.is_eof() && self.current() == '#' {
            self.skip_comment();
        }

        if self.is_eof() || self.current() != '\n' {
            return Err(ParseError::Lexical { line: self.line });
        }
        self.position += 1;

        log::debug!("line continuation joined line {} onto line {}", self.line + 1, self.line);
        self.line += 1;
        Ok(())
    }

    fn read_symbol(&mut self) -> Result<Token, ParseError> {
        let kind = symbol(self.current()).ok_or(ParseError::Lexical { line: self.line })?;
        let lexeme = self.cut(1);
        let token = Token::new(kind, lexeme, self.line);

        if kind == TokenKind::Eol {
            self.line += 1;
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let input = "x = DFA { S=2 }";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Ident,
                TokenKind::Define,
                TokenKind::Automaton,
                TokenKind::LeftBrace,
                TokenKind::States,
                TokenKind::Define,
                TokenKind::Number,
                TokenKind::RightBrace,
                TokenKind::Eol,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_short_and_long_keywords() {
        let short = kinds("S A T F");
        let long = kinds("States Alphabet Transitions FinalStates");
        assert_eq!(short, long);
        assert_eq!(
            &short[..4],
            &[
                TokenKind::States,
                TokenKind::Alphabet,
                TokenKind::Transitions,
                TokenKind::AcceptStates
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(kinds("accept dfa")[..2], [TokenKind::Ident, TokenKind::Ident]);
        assert_eq!(kinds("Accept With Print")[..3], [
            TokenKind::Accept,
            TokenKind::With,
            TokenKind::Print
        ]);
    }

    #[test]
    fn test_literals_keep_quotes() {
        let tokens = Lexer::new("\"abc\" 'b' 17 dfa2").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "\"abc\"");
        assert_eq!(tokens[1].kind, TokenKind::Letter);
        assert_eq!(tokens[1].lexeme, "'b'");
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert_eq!(tokens[2].lexeme, "17");
        assert_eq!(tokens[3].kind, TokenKind::Ident);
        assert_eq!(tokens[3].lexeme, "dfa2");
    }

    #[test]
    fn test_multi_letter_quote_is_a_single_letter_token() {
        // 'ab' lexes as one letter token; the parser only keeps the 'a'.
        let tokens = Lexer::new("'ab'").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Letter);
        assert_eq!(tokens[0].lexeme, "'ab'");
    }

    #[test]
    fn test_number_before_identifier() {
        // Digits are matched first, so "1a" is a number then an identifier.
        assert_eq!(kinds("1a")[..2], [TokenKind::Number, TokenKind::Ident]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = Lexer::new("# heading\nPrint x # trailing\n").tokenize().unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Eol,
                TokenKind::Print,
                TokenKind::Ident,
                TokenKind::Eol,
                TokenKind::Eol,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_newline_token_carries_its_own_line() {
        let tokens = Lexer::new("a\nb\n\nc").tokenize().unwrap();
        let lines: Vec<_> = tokens.iter().map(|t| (t.kind, t.line)).collect();
        assert_eq!(
            lines,
            vec![
                (TokenKind::Ident, 1),
                (TokenKind::Eol, 1),
                (TokenKind::Ident, 2),
                (TokenKind::Eol, 2),
                (TokenKind::Eol, 3),
                (TokenKind::Ident, 4),
                (TokenKind::Eol, 4),
                (TokenKind::Eof, 5),
            ]
        );
    }

    #[test]
    fn test_line_continuation() {
        let tokens = Lexer::new("Print \\\n  x").tokenize().unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Print, TokenKind::Ident, TokenKind::Eol, TokenKind::Eof]
        );
        // the spliced newline still advances the physical line count
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_continuation_before_comment() {
        let tokens = Lexer::new("Print \\ # name follows\nx").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_long_continuation_chain() {
        let lines = 20_000;
        let input = format!("Print {}x", "\\\n".repeat(lines));
        let tokens = Lexer::new(&input).tokenize().unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();

        assert_eq!(
            kinds,
            vec![TokenKind::Print, TokenKind::Ident, TokenKind::Eol, TokenKind::Eof]
        );
        assert_eq!(tokens[1].line, lines + 1);
    }

    #[test]
    fn test_continuation_must_end_the_line() {
        let err = Lexer::new("Print \\ x").tokenize().unwrap_err();
        assert_eq!(err, ParseError::Lexical { line: 1 });
    }

    #[test]
    fn test_unknown_character() {
        let mut lexer = Lexer::new("x\n$");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eol);
        assert_eq!(lexer.next_token(), Err(ParseError::Lexical { line: 2 }));
    }

    #[test]
    fn test_unterminated_or_empty_quotes_fail() {
        assert!(Lexer::new("\"abc").tokenize().is_err());
        assert!(Lexer::new("\"\"").tokenize().is_err());
        assert!(Lexer::new("\"ab1\"").tokenize().is_err());
        assert!(Lexer::new("''").tokenize().is_err());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eol, TokenKind::Eof]);
    }
}

//! Boolean query language: `AND`, `OR`, `NOT` and parentheses over terms.
//!
//! Queries are parsed to postfix once (precedence `NOT > AND > OR`) and then
//! run as a stack machine over posting lists.

mod eval;
mod parser;
pub mod sets;

pub use eval::evaluate;
pub use parser::{lex, parse, to_postfix};

use std::fmt;

/// A lexical unit of a query, in either infix or postfix order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Term(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl Token {
    pub fn term(term: impl Into<String>) -> Self {
        Token::Term(term.into())
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            Token::And => Some(Operator::And),
            Token::Or => Some(Operator::Or),
            Token::Not => Some(Operator::Not),
            _ => None,
        }
    }
}

impl From<Operator> for Token {
    fn from(op: Operator) -> Self {
        match op {
            Operator::And => Token::And,
            Operator::Or => Token::Or,
            Operator::Not => Token::Not,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Term(term) => f.write_str(term),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            op => match op.operator() {
                Some(op) => write!(f, "{op}"),
                None => Ok(()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Not,
    And,
    Or,
}

struct OperatorSpec {
    op: Operator,
    keyword: &'static str,
    precedence: u8,
    arity: usize,
    associativity: Associativity,
}

/// Operator table, highest precedence first.
static OPERATORS: [OperatorSpec; 3] = [
    OperatorSpec { op: Operator::Not, keyword: "NOT", precedence: 3, arity: 1, associativity: Associativity::Right },
    OperatorSpec { op: Operator::And, keyword: "AND", precedence: 2, arity: 2, associativity: Associativity::Left },
    OperatorSpec { op: Operator::Or, keyword: "OR", precedence: 1, arity: 2, associativity: Associativity::Left },
];

impl Operator {
    fn entry(self) -> &'static OperatorSpec {
        match self {
            Operator::Not => &OPERATORS[0],
            Operator::And => &OPERATORS[1],
            Operator::Or => &OPERATORS[2],
        }
    }

    /// Operators are the upper-case keywords only; `and` is an ordinary term.
    pub fn from_keyword(word: &str) -> Option<Self> {
        OPERATORS.iter().find(|entry| entry.keyword == word).map(|entry| entry.op)
    }

    pub fn keyword(self) -> &'static str {
        self.entry().keyword
    }

    pub fn precedence(self) -> u8 {
        self.entry().precedence
    }

    pub fn arity(self) -> usize {
        self.entry().arity
    }

    pub fn associativity(self) -> Associativity {
        self.entry().associativity
    }

    /// Whether `stacked` must be emitted before `self` is pushed.
    pub(crate) fn yields_to(self, stacked: Operator) -> bool {
        let (mine, theirs) = (self.precedence(), stacked.precedence());
        theirs > mine || (theirs == mine && self.associativity() == Associativity::Left)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Render tokens space-separated, e.g. `a b c AND OR`.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

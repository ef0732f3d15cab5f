//! Tokenizer for dice notation.
//!
//! Notation is case-insensitive, so the input is lowercased before lexing.
//! The lexer knows nothing about ordering; the parser in
//! [`crate::notation`] checks the token sequence against the grammar.

use std::fmt;
use std::ops::Range;

use logos::Logos;

use crate::error::{DiceError, DiceResult};

/// A single dice notation token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Unsigned integer literal.
    #[regex("[0-9]+", |lex| lex.slice().parse::<u32>().ok())]
    Number(u32),

    /// The `d` separating count from sides.
    #[token("d")]
    Die,

    /// Keep-highest marker `kh`.
    #[token("kh")]
    KeepHighest,

    /// Keep-lowest marker `kl`.
    #[token("kl")]
    KeepLowest,

    /// Addition modifier `+`.
    #[token("+")]
    Plus,

    /// Subtraction modifier `-`.
    #[token("-")]
    Minus,

    /// Multiplication modifier `*`.
    #[token("*")]
    Star,

    /// Integer division modifier `/`.
    #[token("/")]
    Slash,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Die => write!(f, "d"),
            Token::KeepHighest => write!(f, "kh"),
            Token::KeepLowest => write!(f, "kl"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
        }
    }
}

/// Lex notation text into `(Token, Span)` pairs.
///
/// Stops at the first character that does not start a token. Numbers too
/// large for `u32` are reported the same way.
pub fn lex(notation: &str) -> DiceResult<Vec<(Token, Range<usize>)>> {
    let lowered = notation.to_ascii_lowercase();
    let mut lexer = Token::lexer(&lowered);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(DiceError::invalid(
                    notation,
                    format!("unexpected '{}' at offset {}", lexer.slice(), lexer.span().start),
                ));
            }
        }
    }

    Ok(tokens)
}

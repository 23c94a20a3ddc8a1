//! Infix-to-postfix conversion workspace.
//!
//! Every input token is a node whose id is its position in the input, so the
//! renderer can follow a token from the input tape onto the operator stack
//! and into the output.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::NodeId;

/// Associativity of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Assoc {
    Left,
    Right,
}

/// Classified input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Operand,
    Operator { precedence: u8, assoc: Assoc },
    OpenParen,
    CloseParen,
}

/// Fixed precedence table: `^` binds tightest and is right-associative;
/// `* /` and `+ -` are left-associative.
pub fn classify(text: &str) -> Option<TokenKind> {
    match text {
        "+" | "-" => Some(TokenKind::Operator {
            precedence: 1,
            assoc: Assoc::Left,
        }),
        "*" | "/" => Some(TokenKind::Operator {
            precedence: 2,
            assoc: Assoc::Left,
        }),
        "^" => Some(TokenKind::Operator {
            precedence: 3,
            assoc: Assoc::Right,
        }),
        "(" => Some(TokenKind::OpenParen),
        ")" => Some(TokenKind::CloseParen),
        _ if !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            Some(TokenKind::Operand)
        }
        _ => None,
    }
}

/// Splits an expression string into tokens: identifiers and numbers are
/// grouped, every other non-space character stands alone. Never fails;
/// unknown characters are left for the converter to reject.
pub fn tokenize(expr: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in expr.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c);
            continue;
        }
        if !word.is_empty() {
            tokens.push(std::mem::take(&mut word));
        }
        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: NodeId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversionModel {
    pub input: Vec<Token>,
    /// Index of the next unread input token.
    pub cursor: usize,
    /// Operator stack, bottom first.
    pub stack: Vec<Token>,
    pub output: Vec<Token>,
}

impl ConversionModel {
    pub fn new(tokens: &[String]) -> Self {
        ConversionModel {
            input: tokens
                .iter()
                .enumerate()
                .map(|(i, text)| Token {
                    id: NodeId(i as u32),
                    text: text.clone(),
                })
                .collect(),
            cursor: 0,
            stack: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Output tokens joined by single spaces.
    pub fn postfix(&self) -> String {
        self.output
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (i, token) in self.input.iter().enumerate() {
            if token.id != NodeId(i as u32) {
                return Err(CoreError::MisfiledNode {
                    key: NodeId(i as u32),
                    actual: token.id,
                });
            }
        }
        for token in self.stack.iter().chain(&self.output) {
            if token.id.0 as usize >= self.input.len() {
                return Err(CoreError::DanglingRelation {
                    from: token.id,
                    to: token.id,
                });
            }
        }
        if self.cursor > self.input.len() {
            return Err(CoreError::Inconsistent {
                node: NodeId(self.cursor as u32),
                reason: "cursor past end of input".into(),
            });
        }
        Ok(())
    }
}

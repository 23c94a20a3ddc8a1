//! Polynomial term lists and the multiplication workspace.
//!
//! A [`Polynomial`] is a list of terms ordered by exponent, highest first,
//! with unique exponents. [`ProductModel`] is what the multiplication trace
//! snapshots: both operands, the raw pairwise products, and the result as it
//! is combined and normalized.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{IdAllocator, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: NodeId,
    pub coefficient: i64,
    pub exponent: u32,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exponent {
            0 => write!(f, "{}", self.coefficient),
            1 => write!(f, "{}x", self.coefficient),
            e => write!(f, "{}x^{}", self.coefficient, e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Polynomial {
    pub terms: Vec<Term>,
}

impl Polynomial {
    /// Builds a polynomial from `(coefficient, exponent)` pairs, allocating
    /// ids from `ids`. Pairs must already be strictly descending by exponent.
    pub fn from_pairs(pairs: &[(i64, u32)], ids: &mut IdAllocator) -> Result<Self, CoreError> {
        let terms = pairs
            .iter()
            .map(|&(coefficient, exponent)| {
                Ok(Term {
                    id: ids.allocate()?,
                    coefficient,
                    exponent,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        let poly = Polynomial { terms };
        poly.check_order()?;
        Ok(poly)
    }

    pub fn is_zero(&self) -> bool {
        self.terms.iter().all(|t| t.coefficient == 0)
    }

    pub fn degree(&self) -> Option<u32> {
        self.terms.first().map(|t| t.exponent)
    }

    pub fn pairs(&self) -> Vec<(i64, u32)> {
        self.terms.iter().map(|t| (t.coefficient, t.exponent)).collect()
    }

    /// Exponents strictly descending.
    pub fn check_order(&self) -> Result<(), CoreError> {
        for pair in self.terms.windows(2) {
            if pair[1].exponent >= pair[0].exponent {
                return Err(CoreError::TermOrder {
                    exponent: pair[1].exponent,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        let rendered: Vec<String> = self.terms.iter().map(Term::to_string).collect();
        f.write_str(&rendered.join(" + "))
    }
}

/// Snapshot of one multiplication in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductModel {
    pub left: Polynomial,
    pub right: Polynomial,
    /// Pairwise products in the order they were formed.
    pub products: Vec<Term>,
    /// Combined result; exponent-descending once combination starts.
    pub result: Vec<Term>,
    pub ids: IdAllocator,
}

impl ProductModel {
    /// Starts a multiplication workspace. Term ids of the operands are kept;
    /// new ids continue past the largest operand id.
    pub fn new(left: Polynomial, right: Polynomial) -> Self {
        let next = left
            .terms
            .iter()
            .chain(right.terms.iter())
            .map(|t| t.id.0 + 1)
            .max()
            .unwrap_or(0);
        ProductModel {
            left,
            right,
            products: Vec::new(),
            result: Vec::new(),
            ids: IdAllocator::starting_at(next),
        }
    }

    pub fn result_polynomial(&self) -> Polynomial {
        Polynomial {
            terms: self.result.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.left.check_order()?;
        self.right.check_order()?;
        let mut seen = std::collections::BTreeSet::new();
        for term in self.left.terms.iter().chain(&self.right.terms) {
            if !seen.insert(term.id) {
                return Err(CoreError::DuplicateId { id: term.id });
            }
        }
        for term in self
            .left
            .terms
            .iter()
            .chain(&self.right.terms)
            .chain(&self.products)
            .chain(&self.result)
        {
            if term.id >= self.ids.peek() {
                return Err(CoreError::StaleAllocator { next: self.ids.peek() });
            }
        }
        Ok(())
    }
}

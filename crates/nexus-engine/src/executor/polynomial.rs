//! Polynomial multiplication executor.
//!
//! Three passes, each traced: form every pairwise product (`Multiply`),
//! merge products with equal exponents (`Combine`), then drop terms whose
//! coefficient cancelled to zero (`Normalize`).

use nexus_core::polynomial::{Polynomial, ProductModel, Term};
use nexus_core::{CoreError, IdAllocator, Outcome, Phase};

use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::PolynomialOp;

#[derive(Debug, Clone, Default)]
pub struct PolynomialExecutor {
    config: EngineConfig,
}

impl PolynomialExecutor {
    pub fn new(config: EngineConfig) -> Self {
        PolynomialExecutor { config }
    }

    /// Multiplies `left` by `right`. Operand term ids are renumbered (left
    /// operand first) so the workspace ids are unique and deterministic.
    pub fn multiply(
        &self,
        left: &Polynomial,
        right: &Polynomial,
    ) -> Result<Outcome<ProductModel>, EngineError> {
        left.check_order()?;
        right.check_order()?;
        let mut rec = TraceRecorder::new(&self.config);
        let mut ids = IdAllocator::default();
        let left = renumber(left, &mut ids)?;
        let right = renumber(right, &mut ids)?;
        let mut model = ProductModel::new(left, right);

        rec.record(
            Phase::Initialize,
            [],
            &model,
            format!("Multiply ({}) by ({})", model.left, model.right),
        )?;
        if model.left.terms.is_empty() || model.right.terms.is_empty() {
            rec.record(
                Phase::Done,
                [],
                &model,
                "One factor is the zero polynomial: the product is 0",
            )?;
            return Ok(rec.finish(model));
        }

        let pairs: Vec<(Term, Term)> = model
            .left
            .terms
            .iter()
            .flat_map(|a| model.right.terms.iter().map(move |b| (a.clone(), b.clone())))
            .collect();
        for (a, b) in pairs {
            let (Some(coefficient), Some(exponent)) = (
                a.coefficient.checked_mul(b.coefficient),
                a.exponent.checked_add(b.exponent),
            ) else {
                rec.record(
                    Phase::Error,
                    [a.id, b.id],
                    &model,
                    format!("({a})·({b}) overflows"),
                )?;
                return Ok(rec.finish(model));
            };
            let product = Term {
                id: model.ids.allocate()?,
                coefficient,
                exponent,
            };
            let description = format!("({a})·({b}) = {product}");
            let highlighted = [a.id, b.id, product.id];
            model.products.push(product);
            rec.record(Phase::Multiply, highlighted, &model, description)?;
        }

        let mut sorted = model.products.clone();
        sorted.sort_by(|x, y| y.exponent.cmp(&x.exponent));
        model.result = Vec::with_capacity(sorted.len());
        for term in sorted {
            let before = match model.result.last() {
                Some(last) if last.exponent == term.exponent => last.clone(),
                _ => {
                    model.result.push(term);
                    continue;
                }
            };
            let Some(sum) = before.coefficient.checked_add(term.coefficient) else {
                rec.record(
                    Phase::Error,
                    [before.id, term.id],
                    &model,
                    format!("Combining {before} with {term} overflows"),
                )?;
                return Ok(rec.finish(model));
            };
            let merged = Term {
                coefficient: sum,
                ..before.clone()
            };
            if let Some(last) = model.result.last_mut() {
                *last = merged.clone();
            }
            rec.record(
                Phase::Combine,
                [merged.id, term.id],
                &model,
                format!("Combine {before} with {term} into {merged}"),
            )?;
        }

        while let Some(position) = model.result.iter().position(|t| t.coefficient == 0) {
            let zero = model.result.remove(position);
            rec.record(
                Phase::Normalize,
                [zero.id],
                &model,
                format!("Drop {zero}: the coefficient cancelled"),
            )?;
        }

        let product = model.result_polynomial();
        rec.record(Phase::Done, [], &model, format!("Product: {product}"))?;
        Ok(rec.finish(model))
    }
}

impl Executor for PolynomialExecutor {
    type Model = ProductModel;
    type Request = PolynomialOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(
        &self,
        _model: &ProductModel,
        request: &PolynomialOp,
    ) -> Result<Outcome<ProductModel>, EngineError> {
        match request {
            PolynomialOp::Multiply { left, right } => self.multiply(left, right),
        }
    }
}

fn renumber(poly: &Polynomial, ids: &mut IdAllocator) -> Result<Polynomial, CoreError> {
    let terms = poly
        .terms
        .iter()
        .map(|t| {
            Ok(Term {
                id: ids.allocate()?,
                ..t.clone()
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;
    Ok(Polynomial { terms })
}

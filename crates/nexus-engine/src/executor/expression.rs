//! Infix to postfix conversion (shunting-yard) executor.
//!
//! `+ -` bind loosest, `* /` tighter, `^` tightest and right-associative.
//! Unknown tokens, unbalanced parentheses, and operators or operands out of
//! turn stop the conversion with an `Error` step; the returned model then
//! holds the partial conversion.

use nexus_core::expression::{classify, Assoc, ConversionModel, TokenKind};
use nexus_core::{Outcome, Phase};

use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::ExpressionOp;

#[derive(Debug, Clone, Default)]
pub struct ExpressionExecutor {
    config: EngineConfig,
}

impl ExpressionExecutor {
    pub fn new(config: EngineConfig) -> Self {
        ExpressionExecutor { config }
    }

    pub fn infix_to_postfix(&self, tokens: &[String]) -> Result<Outcome<ConversionModel>, EngineError> {
        let mut rec = TraceRecorder::new(&self.config);
        let mut model = ConversionModel::new(tokens);

        if model.input.is_empty() {
            rec.record(Phase::Error, [], &model, "Expression is empty: nothing to convert")?;
            return Ok(rec.finish(model));
        }

        // An operand or '(' is due at the start and after every operator or '('.
        let mut expect_operand = true;
        for position in 0..model.input.len() {
            let token = model.input[position].clone();
            model.cursor = position + 1;
            let Some(kind) = classify(&token.text) else {
                rec.record(
                    Phase::Error,
                    [token.id],
                    &model,
                    format!("Unknown token '{}' at position {position}", token.text),
                )?;
                return Ok(rec.finish(model));
            };
            if let Some(problem) = out_of_turn(kind, expect_operand) {
                rec.record(
                    Phase::Error,
                    [token.id],
                    &model,
                    format!("'{}' at position {position} {problem}", token.text),
                )?;
                return Ok(rec.finish(model));
            }
            expect_operand = matches!(kind, TokenKind::OpenParen | TokenKind::Operator { .. });
            rec.record(
                Phase::ReadToken,
                [token.id],
                &model,
                format!("Read '{}'", token.text),
            )?;

            match kind {
                TokenKind::Operand => {
                    model.output.push(token.clone());
                    rec.record(
                        Phase::Emit,
                        [token.id],
                        &model,
                        format!("Operand '{}' goes straight to the output", token.text),
                    )?;
                }
                TokenKind::OpenParen => {
                    model.stack.push(token.clone());
                    rec.record(Phase::Push, [token.id], &model, "Push '(' onto the stack")?;
                }
                TokenKind::CloseParen => loop {
                    match model.stack.pop() {
                        None => {
                            rec.record(
                                Phase::Error,
                                [token.id],
                                &model,
                                format!("Unbalanced ')' at position {position}: no matching '('"),
                            )?;
                            return Ok(rec.finish(model));
                        }
                        Some(open) if open.text == "(" => {
                            rec.record(
                                Phase::Pop,
                                [open.id, token.id],
                                &model,
                                "Pop the matching '(' and drop both parentheses",
                            )?;
                            break;
                        }
                        Some(top) => {
                            model.output.push(top.clone());
                            rec.record(
                                Phase::Pop,
                                [top.id, token.id],
                                &model,
                                format!("Pop '{}' to the output", top.text),
                            )?;
                        }
                    }
                },
                TokenKind::Operator { precedence, assoc } => {
                    while let Some(top) = model.stack.last() {
                        let Some(TokenKind::Operator {
                            precedence: above, ..
                        }) = classify(&top.text)
                        else {
                            break;
                        };
                        let yields = above > precedence || (above == precedence && assoc == Assoc::Left);
                        if !yields {
                            break;
                        }
                        let Some(top) = model.stack.pop() else {
                            break;
                        };
                        model.output.push(top.clone());
                        let relation = if above > precedence { "higher" } else { "equal" };
                        rec.record(
                            Phase::Pop,
                            [top.id, token.id],
                            &model,
                            format!(
                                "'{}' has {relation} precedence than '{}': pop it to the output",
                                top.text, token.text
                            ),
                        )?;
                    }
                    model.stack.push(token.clone());
                    rec.record(
                        Phase::Push,
                        [token.id],
                        &model,
                        format!("Push '{}' onto the stack", token.text),
                    )?;
                }
            }
        }

        if expect_operand {
            let last = model.input.last().map(|t| t.id);
            rec.record(
                Phase::Error,
                last,
                &model,
                "Input ends where an operand is still expected",
            )?;
            return Ok(rec.finish(model));
        }

        while let Some(top) = model.stack.pop() {
            if top.text == "(" {
                model.stack.push(top.clone());
                rec.record(
                    Phase::Error,
                    [top.id],
                    &model,
                    format!("Unbalanced '(' at position {}: no matching ')'", top.id.0),
                )?;
                return Ok(rec.finish(model));
            }
            model.output.push(top.clone());
            rec.record(
                Phase::Pop,
                [top.id],
                &model,
                format!("End of input: pop '{}' to the output", top.text),
            )?;
        }

        let postfix = model.postfix();
        rec.record(Phase::Done, [], &model, format!("Postfix: {postfix}"))?;
        Ok(rec.finish(model))
    }
}

/// Why `kind` cannot appear here, if it cannot.
fn out_of_turn(kind: TokenKind, expect_operand: bool) -> Option<&'static str> {
    match (kind, expect_operand) {
        (TokenKind::Operand, false) => Some("follows an operand without an operator between them"),
        (TokenKind::OpenParen, false) => Some("follows an operand without an operator before it"),
        (TokenKind::Operator { .. }, true) => Some("has no left operand"),
        (TokenKind::CloseParen, true) => Some("closes a group that ends without an operand"),
        _ => None,
    }
}

impl Executor for ExpressionExecutor {
    type Model = ConversionModel;
    type Request = ExpressionOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(
        &self,
        _model: &ConversionModel,
        request: &ExpressionOp,
    ) -> Result<Outcome<ConversionModel>, EngineError> {
        match request {
            ExpressionOp::InfixToPostfix { tokens } => self.infix_to_postfix(tokens),
        }
    }
}

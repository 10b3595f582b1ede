//! Human-readable ASCII rendering.
//!
//! [`Manager::render`] prints an expression using the registered kind names
//! and [`Notation`]s:
//!
//! | Notation | Example |
//! |----------|---------|
//! | `Infix(" * ")` | `A * B` |
//! | `Function("tr")` | `tr(A)` |
//! | `Postfix("^H")` | `A^H` |
//! | `Bracket` | `[A, B]` |
//!
//! An operand is parenthesized when it binds no tighter than its parent:
//! sums bind loosest, then other infix kinds, then postfix kinds, so
//! `A * B + C` needs none while `(A + B) * C` and `(A * B)^H` do. Sums print
//! negative real coefficients as subtraction, so `A*B + (-1)*B*A` renders as
//! `A * B - B * A`. The output is stable: it only depends on the canonical
//! structure of the expression.

use std::fmt::Write;

use num_traits::Signed;

use crate::expr::{Expr, ExprData};
use crate::kind::{Combine, Notation};
use crate::manager::Manager;

const ATOM: u8 = u8::MAX;

impl Manager {
    /// Renders `expr` as a single line of ASCII.
    pub fn render(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.render_into(expr, &mut out);
        out
    }

    fn render_into(&self, expr: &Expr, out: &mut String) {
        let kind = match expr.data() {
            ExprData::Scalar(value) => {
                let _ = write!(out, "{}", value);
                return;
            }
            ExprData::Zero(_) => {
                out.push('0');
                return;
            }
            ExprData::Identity(_) => {
                out.push('1');
                return;
            }
            ExprData::Symbol { name, attributes, .. } => {
                out.push_str(name);
                if !attributes.is_empty() {
                    let values: Vec<&str> = attributes.values().map(String::as_str).collect();
                    let _ = write!(out, "^({})", values.join(","));
                }
                return;
            }
            ExprData::Unary { kind, .. } | ExprData::Binary { kind, .. } | ExprData::NAry { kind, .. } => *kind,
        };

        let spec = match self.try_kind(kind) {
            Ok(spec) => spec,
            Err(_) => {
                let _ = write!(out, "{}", expr);
                return;
            }
        };
        let operands = expr.operands();
        let precedence = self.precedence(expr);

        match &spec.notation {
            Notation::Infix(op) => {
                let is_sum = matches!(spec.combine, Combine::Add { .. });
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        if is_sum {
                            if let Some(negated) = self.negated_term(operand) {
                                out.push_str(" - ");
                                self.render_operand(&negated, precedence, out);
                                continue;
                            }
                        }
                        out.push_str(op);
                    }
                    self.render_operand(operand, precedence, out);
                }
            }
            Notation::Function(name) => {
                out.push_str(name);
                out.push('(');
                self.render_list(operands, out);
                out.push(')');
            }
            Notation::Postfix(op) => {
                for operand in operands {
                    self.render_operand(operand, precedence, out);
                }
                out.push_str(op);
            }
            Notation::Bracket => {
                out.push('[');
                self.render_list(operands, out);
                out.push(']');
            }
        }
    }

    fn render_list(&self, operands: &[Expr], out: &mut String) {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.render_into(operand, out);
        }
    }

    /// Binding strength of `expr` when printed: sums bind loosest, then other
    /// infix kinds, then postfix kinds. Leaves, brackets and function calls
    /// are atoms.
    fn precedence(&self, expr: &Expr) -> u8 {
        let Some(spec) = expr.kind().and_then(|k| self.try_kind(k).ok()) else {
            return ATOM;
        };
        match spec.notation {
            Notation::Infix(_) if matches!(spec.combine, Combine::Add { .. }) => 1,
            Notation::Infix(_) => 2,
            Notation::Postfix(_) => 3,
            Notation::Function(_) | Notation::Bracket => ATOM,
        }
    }

    /// Renders an operand of a node with binding strength `parent`. Operands
    /// that bind no tighter than their parent are parenthesized.
    fn render_operand(&self, expr: &Expr, parent: u8, out: &mut String) {
        if self.precedence(expr) <= parent {
            out.push('(');
            self.render_into(expr, out);
            out.push(')');
        } else {
            self.render_into(expr, out);
        }
    }

    /// For a term `c * rest` with a negative real `c`, builds `(-c) * rest`.
    fn negated_term(&self, term: &Expr) -> Option<Expr> {
        let kind = term.kind()?;
        let (first, rest) = term.operands().split_first()?;
        let c = first.as_scalar()?;
        if !c.is_real() || !c.re().is_negative() {
            return None;
        }
        let mut operands = Vec::with_capacity(term.operands().len());
        operands.push(self.scalar(-c.clone()));
        operands.extend(rest.iter().cloned());
        self.create(kind, operands).ok()
    }
}

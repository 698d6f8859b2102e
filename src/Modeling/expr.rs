//! # Symbolic expression tree
//!
//! ## Aim
//! Expressions of objectives, constraints and named sub-expressions. Leaves are constants or
//! references (`DataRef`) to variable, parameter or named-expression data owned by a `Model`,
//! so the same tree can be evaluated against a model and rewritten by leaf identity.
//!
//! ## Main operations
//! - operator overloading (`+ - * /`, unary `-`) and constructors for powers and elementary functions
//! - `evaluate()`: numeric value against the current values stored in a model
//! - `ExpressionReplacer`: deep copy with substitution of leaves (leaf identity -> replacement) and
//!   optional inlining of named sub-expressions
//! - `leaves()`: variable / parameter leaves reachable from the root (named expressions are followed)
//! - `display()`: human readable form with model paths
use super::container::Model;
use super::index::DataRef;
use super::model_error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryFunction {
    Exp,
    Ln,
    Log10,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Abs,
}

impl UnaryFunction {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            UnaryFunction::Exp => x.exp(),
            UnaryFunction::Ln => x.ln(),
            UnaryFunction::Log10 => x.log10(),
            UnaryFunction::Sqrt => x.sqrt(),
            UnaryFunction::Sin => x.sin(),
            UnaryFunction::Cos => x.cos(),
            UnaryFunction::Tan => x.tan(),
            UnaryFunction::Abs => x.abs(),
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryFunction::Exp => "exp",
            UnaryFunction::Ln => "log",
            UnaryFunction::Log10 => "log10",
            UnaryFunction::Sqrt => "sqrt",
            UnaryFunction::Sin => "sin",
            UnaryFunction::Cos => "cos",
            UnaryFunction::Tan => "tan",
            UnaryFunction::Abs => "abs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Const(f64),
    /// variable data leaf
    Var(DataRef),
    /// parameter data leaf
    Param(DataRef),
    /// reference to a named sub-expression (an `Expression` component element)
    Named(DataRef),
    Sum(Vec<Expr>),
    Product(Box<Expr>, Box<Expr>),
    Division(Box<Expr>, Box<Expr>),
    Power(Box<Expr>, Box<Expr>),
    Negation(Box<Expr>),
    Func(UnaryFunction, Box<Expr>),
}

impl Expr {
    pub fn var(r: DataRef) -> Self {
        Expr::Var(r)
    }
    pub fn param(r: DataRef) -> Self {
        Expr::Param(r)
    }
    pub fn named(r: DataRef) -> Self {
        Expr::Named(r)
    }
    pub fn pow(self, exponent: Expr) -> Self {
        Expr::Power(Box::new(self), Box::new(exponent))
    }
    pub fn powf(self, exponent: f64) -> Self {
        Expr::Power(Box::new(self), Box::new(Expr::Const(exponent)))
    }
    pub fn exp(arg: Expr) -> Self {
        Expr::Func(UnaryFunction::Exp, Box::new(arg))
    }
    pub fn ln(arg: Expr) -> Self {
        Expr::Func(UnaryFunction::Ln, Box::new(arg))
    }
    pub fn sqrt(arg: Expr) -> Self {
        Expr::Func(UnaryFunction::Sqrt, Box::new(arg))
    }
    pub fn func(f: UnaryFunction, arg: Expr) -> Self {
        Expr::Func(f, Box::new(arg))
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Expr::Const(_))
    }

    /// numeric value of the expression at the current model values
    pub fn evaluate(&self, model: &Model) -> Result<f64, ModelError> {
        let value = match self {
            Expr::Const(c) => *c,
            Expr::Var(r) => model
                .var_data(r)?
                .value
                .ok_or_else(|| ModelError::MissingValue(model.data_name(r)))?,
            Expr::Param(r) => model.param_value(r)?,
            Expr::Named(r) => model.named_expression(r)?.evaluate(model)?,
            Expr::Sum(terms) => {
                let mut acc = 0.0;
                for t in terms {
                    acc += t.evaluate(model)?;
                }
                acc
            }
            Expr::Product(a, b) => a.evaluate(model)? * b.evaluate(model)?,
            Expr::Division(a, b) => a.evaluate(model)? / b.evaluate(model)?,
            Expr::Power(a, b) => a.evaluate(model)?.powf(b.evaluate(model)?),
            Expr::Negation(a) => -a.evaluate(model)?,
            Expr::Func(f, a) => f.apply(a.evaluate(model)?),
        };
        Ok(value)
    }

    /// variable and parameter leaves reachable from this node, named expressions included
    pub fn leaves(&self, model: &Model) -> Result<BTreeSet<DataRef>, ModelError> {
        let mut found = BTreeSet::new();
        let mut stack: Vec<&Expr> = vec![self];
        // named expressions are looked up in the model, keep them alive in a separate buffer
        let mut named_seen: BTreeSet<DataRef> = BTreeSet::new();
        let mut pending_named: Vec<DataRef> = Vec::new();
        loop {
            while let Some(node) = stack.pop() {
                match node {
                    Expr::Const(_) => {}
                    Expr::Var(r) | Expr::Param(r) => {
                        found.insert(r.clone());
                    }
                    Expr::Named(r) => {
                        if named_seen.insert(r.clone()) {
                            pending_named.push(r.clone());
                        }
                    }
                    Expr::Sum(terms) => stack.extend(terms.iter()),
                    Expr::Product(a, b) | Expr::Division(a, b) | Expr::Power(a, b) => {
                        stack.push(a);
                        stack.push(b);
                    }
                    Expr::Negation(a) | Expr::Func(_, a) => stack.push(a),
                }
            }
            match pending_named.pop() {
                Some(r) => stack.push(model.named_expression(&r)?),
                None => break,
            }
        }
        Ok(found)
    }

    pub fn contains_leaf(&self, model: &Model, leaf: &DataRef) -> Result<bool, ModelError> {
        Ok(self.leaves(model)?.contains(leaf))
    }

    /// printable form with model paths instead of raw ids
    pub fn display<'a>(&'a self, model: &'a Model) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, model }
    }
}

/// Deep copy of an expression tree replacing leaves by identity.
///
/// The map is keyed by the leaf `DataRef`; any `Var`/`Param` leaf found in it is replaced by a
/// clone of the mapped expression. With `remove_named_expressions` every `Named` node met during
/// the walk is inlined (its body is copied, with substitution, in place of the reference).
pub struct ExpressionReplacer<'a> {
    substitute: &'a HashMap<DataRef, Expr>,
    remove_named_expressions: bool,
}

impl<'a> ExpressionReplacer<'a> {
    pub fn new(substitute: &'a HashMap<DataRef, Expr>, remove_named_expressions: bool) -> Self {
        ExpressionReplacer {
            substitute,
            remove_named_expressions,
        }
    }

    pub fn replace(&self, model: &Model, expr: &Expr) -> Result<Expr, ModelError> {
        let new = match expr {
            Expr::Const(c) => Expr::Const(*c),
            Expr::Var(r) | Expr::Param(r) => match self.substitute.get(r) {
                Some(replacement) => replacement.clone(),
                None => expr.clone(),
            },
            Expr::Named(r) => {
                if self.remove_named_expressions {
                    let body = model.named_expression(r)?;
                    self.replace(model, body)?
                } else {
                    Expr::Named(r.clone())
                }
            }
            Expr::Sum(terms) => {
                let mut new_terms = Vec::with_capacity(terms.len());
                for t in terms {
                    new_terms.push(self.replace(model, t)?);
                }
                Expr::Sum(new_terms)
            }
            Expr::Product(a, b) => Expr::Product(
                Box::new(self.replace(model, a)?),
                Box::new(self.replace(model, b)?),
            ),
            Expr::Division(a, b) => Expr::Division(
                Box::new(self.replace(model, a)?),
                Box::new(self.replace(model, b)?),
            ),
            Expr::Power(a, b) => Expr::Power(
                Box::new(self.replace(model, a)?),
                Box::new(self.replace(model, b)?),
            ),
            Expr::Negation(a) => Expr::Negation(Box::new(self.replace(model, a)?)),
            Expr::Func(f, a) => Expr::Func(*f, Box::new(self.replace(model, a)?)),
        };
        Ok(new)
    }
}

/////////////////////////////////OPERATORS///////////////////////////////////////////////////
impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        match self {
            Expr::Sum(mut terms) => {
                terms.push(rhs);
                Expr::Sum(terms)
            }
            lhs => Expr::Sum(vec![lhs, rhs]),
        }
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        self + Expr::Negation(Box::new(rhs))
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::Product(Box::new(self), Box::new(rhs))
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::Division(Box::new(self), Box::new(rhs))
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Negation(Box::new(self))
    }
}

impl Add<f64> for Expr {
    type Output = Expr;
    fn add(self, rhs: f64) -> Expr {
        self + Expr::Const(rhs)
    }
}

impl Sub<f64> for Expr {
    type Output = Expr;
    fn sub(self, rhs: f64) -> Expr {
        self - Expr::Const(rhs)
    }
}

impl Mul<f64> for Expr {
    type Output = Expr;
    fn mul(self, rhs: f64) -> Expr {
        self * Expr::Const(rhs)
    }
}

impl Div<f64> for Expr {
    type Output = Expr;
    fn div(self, rhs: f64) -> Expr {
        self / Expr::Const(rhs)
    }
}

impl Mul<Expr> for f64 {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::Const(self) * rhs
    }
}

impl Add<Expr> for f64 {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::Const(self) + rhs
    }
}

impl From<f64> for Expr {
    fn from(c: f64) -> Self {
        Expr::Const(c)
    }
}

/////////////////////////////////DISPLAY/////////////////////////////////////////////////////
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    model: &'a Model,
}

impl<'a> ExprDisplay<'a> {
    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: &Expr) -> fmt::Result {
        match node {
            Expr::Const(c) => write!(f, "{}", c),
            Expr::Var(r) | Expr::Param(r) | Expr::Named(r) => {
                write!(f, "{}", self.model.data_name(r))
            }
            Expr::Sum(terms) => {
                for (k, t) in terms.iter().enumerate() {
                    match (k, t) {
                        (0, Expr::Negation(inner)) => {
                            write!(f, "- ")?;
                            self.write_operand(f, inner)?;
                        }
                        (0, t) => self.write_node(f, t)?,
                        (_, Expr::Negation(inner)) => {
                            write!(f, " - ")?;
                            self.write_operand(f, inner)?;
                        }
                        (_, t) => {
                            write!(f, " + ")?;
                            self.write_node(f, t)?;
                        }
                    }
                }
                Ok(())
            }
            Expr::Product(a, b) => {
                self.write_operand(f, a)?;
                write!(f, "*")?;
                self.write_operand(f, b)
            }
            Expr::Division(a, b) => {
                self.write_operand(f, a)?;
                write!(f, "/")?;
                self.write_operand(f, b)
            }
            Expr::Power(a, b) => {
                self.write_operand(f, a)?;
                write!(f, "**")?;
                self.write_operand(f, b)
            }
            Expr::Negation(a) => {
                write!(f, "- ")?;
                self.write_operand(f, a)
            }
            Expr::Func(func, a) => {
                write!(f, "{}(", func.as_str())?;
                self.write_node(f, a)?;
                write!(f, ")")
            }
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, node: &Expr) -> fmt::Result {
        match node {
            Expr::Sum(_) | Expr::Negation(_) => {
                write!(f, "(")?;
                self.write_node(f, node)?;
                write!(f, ")")
            }
            _ => self.write_node(f, node),
        }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.expr)
    }
}

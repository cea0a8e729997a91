//! Linear expressions and the row comparisons built from them.

use crate::ids::VariableId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl ComparisonSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "le",
            ComparisonSense::GreaterEqual => "ge",
            ComparisonSense::Equal => "eq",
        }
    }
}

/// Linear combination `sum(coeff * var)`.
///
/// Terms may repeat a variable; [`Expr::normalized`] merges them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    terms: Vec<(VariableId, f64)>,
}

impl Expr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(var: VariableId, coeff: f64) -> Self {
        Self {
            terms: vec![(var, coeff)],
        }
    }

    pub fn var(var: VariableId) -> Self {
        Self::term(var, 1.0)
    }

    /// Unit-coefficient sum of `vars`.
    pub fn sum<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = VariableId>,
    {
        Self {
            terms: vars.into_iter().map(|var| (var, 1.0)).collect(),
        }
    }

    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    pub fn into_terms(self) -> Vec<(VariableId, f64)> {
        self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn scale(&self, by: f64) -> Self {
        Self {
            terms: self.terms.iter().map(|&(var, c)| (var, c * by)).collect(),
        }
    }

    pub fn add(&self, other: &Expr) -> Self {
        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());
        terms.extend_from_slice(&self.terms);
        terms.extend_from_slice(&other.terms);
        Self { terms }
    }

    pub fn sub(&self, other: &Expr) -> Self {
        self.add(&other.scale(-1.0))
    }

    /// Terms in ascending variable order with duplicates merged and zeros dropped.
    pub fn normalized(&self) -> Vec<(VariableId, f64)> {
        let mut merged: BTreeMap<VariableId, f64> = BTreeMap::new();
        for &(var, coeff) in &self.terms {
            *merged.entry(var).or_insert(0.0) += coeff;
        }
        merged.into_iter().filter(|&(_, c)| c != 0.0).collect()
    }

    pub fn compare_scalar(&self, rhs: f64, sense: ComparisonSense) -> ConstraintExpr {
        ConstraintExpr::new(self.clone(), sense, rhs)
    }

    /// `self - other` compared against zero.
    pub fn compare(&self, other: &Expr, sense: ComparisonSense) -> ConstraintExpr {
        self.sub(other).compare_scalar(0.0, sense)
    }

    pub fn less_equal(&self, other: &Expr) -> ConstraintExpr {
        self.compare(other, ComparisonSense::LessEqual)
    }

    pub fn greater_equal(&self, other: &Expr) -> ConstraintExpr {
        self.compare(other, ComparisonSense::GreaterEqual)
    }

    pub fn equal_to(&self, other: &Expr) -> ConstraintExpr {
        self.compare(other, ComparisonSense::Equal)
    }

    pub fn at_most(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::LessEqual)
    }
}

/// An expression compared against a right-hand side, ready to become a row.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintExpr {
    expr: Expr,
    sense: ComparisonSense,
    rhs: f64,
}

impl ConstraintExpr {
    pub fn new(expr: Expr, sense: ComparisonSense, rhs: f64) -> Self {
        Self { expr, sense, rhs }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn sense(&self) -> ComparisonSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn into_parts(self) -> (Expr, ComparisonSense, f64) {
        (self.expr, self.sense, self.rhs)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn v(i: u32) -> VariableId {
        VariableId::new(i)
    }

    #[test]
    fn normalized_merges_duplicates() {
        let expr = Expr::sum([v(1), v(0), v(1)]);
        assert_eq!(expr.normalized(), vec![(v(0), 1.0), (v(1), 2.0)]);
    }

    #[test]
    fn compare_moves_everything_to_the_left() {
        let lhs = Expr::sum([v(0), v(1)]);
        let rhs = Expr::term(v(1), 2.0);
        let (expr, sense, rhs) = lhs.equal_to(&rhs).into_parts();
        assert_eq!(sense, ComparisonSense::Equal);
        assert_eq!(rhs, 0.0);
        assert_eq!(expr.normalized(), vec![(v(0), 1.0), (v(1), -1.0)]);
    }

    #[test]
    fn self_loop_cancels() {
        // An arc entering and leaving the same node appears on both sides.
        let expr = Expr::var(v(3)).sub(&Expr::var(v(3)));
        assert!(!expr.is_empty());
        assert!(expr.normalized().is_empty());
    }

    #[test]
    fn scale_then_at_most() {
        let row = Expr::sum([v(0), v(2)]).scale(2.0).at_most(5.0);
        assert_eq!(row.rhs(), 5.0);
        assert_eq!(row.sense().as_str(), "le");
        assert_eq!(row.expr().terms(), &[(v(0), 2.0), (v(2), 2.0)]);
    }
}

//! Row-oriented LP/MIP container.
//!
//! Arc-flow rows are built whole from an [`Expr`], so coefficients are stored
//! per row in ascending variable order. Ids are dense insertion indices: a
//! [`VariableId`] is the column a backend sees and a [`ConstraintId`] its row.

use crate::error::ModelError;
use crate::expr::{ComparisonSense, ConstraintExpr, Expr};
use crate::ids::{ConstraintId, VariableId};
use crate::types::{Bounds, Constraint, Objective, Sense, Variable};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Model {
    variables: Vec<Variable>,
    variable_names: Vec<Option<String>>,
    constraints: Vec<Constraint>,
    rows: Vec<Vec<(VariableId, f64)>>,
    constraint_names: Vec<Option<String>>,
    objective: Objective,
    primal_start: Option<BTreeMap<VariableId, f64>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, variable: Variable) -> Result<VariableId, ModelError> {
        check_bounds(variable.bounds)?;
        let id = VariableId::new(self.variables.len() as u32);
        self.variables.push(variable);
        self.variable_names.push(None);
        Ok(id)
    }

    /// Add `expr <sense> rhs` as a row.
    ///
    /// Duplicate variables are merged and zero coefficients dropped; a row
    /// whose terms cancel is still added.
    pub fn add_constraint_expr(
        &mut self,
        constraint: ConstraintExpr,
    ) -> Result<ConstraintId, ModelError> {
        let (expr, sense, rhs) = constraint.into_parts();
        let bounds = match sense {
            ComparisonSense::LessEqual => Bounds::new(f64::NEG_INFINITY, rhs),
            ComparisonSense::GreaterEqual => Bounds::new(rhs, f64::INFINITY),
            ComparisonSense::Equal => Bounds::new(rhs, rhs),
        };
        check_bounds(bounds)?;
        let terms = self.checked_terms(&expr)?;

        let id = ConstraintId::new(self.constraints.len() as u32);
        tracing::trace!(
            component = "model",
            operation = "add_row",
            status = "success",
            row = id.inner(),
            sense = sense.as_str(),
            terms = terms.len(),
            "Added row"
        );
        self.constraints.push(Constraint { bounds });
        self.rows.push(terms);
        self.constraint_names.push(None);
        Ok(id)
    }

    pub fn maximize(&mut self, expr: Expr) -> Result<(), ModelError> {
        self.set_objective(Sense::Maximize, expr)
    }

    pub fn minimize(&mut self, expr: Expr) -> Result<(), ModelError> {
        self.set_objective(Sense::Minimize, expr)
    }

    fn set_objective(&mut self, sense: Sense, expr: Expr) -> Result<(), ModelError> {
        if self.objective.sense.is_some() {
            return Err(ModelError::ObjectiveAlreadySet);
        }
        let terms = self.checked_terms(&expr)?;
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            terms = terms.len(),
            "Set objective function"
        );
        self.objective = Objective {
            sense: Some(sense),
            terms,
        };
        Ok(())
    }

    fn checked_terms(&self, expr: &Expr) -> Result<Vec<(VariableId, f64)>, ModelError> {
        let terms = expr.normalized();
        for &(var, coeff) in &terms {
            self.get_variable(var)?;
            if !coeff.is_finite() {
                return Err(ModelError::NonFiniteValue { value: coeff });
            }
        }
        Ok(terms)
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Non-zero entries of the constraint matrix.
    pub fn num_coefficients(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn get_variable(&self, id: VariableId) -> Result<&Variable, ModelError> {
        self.variables
            .get(id.index())
            .ok_or(ModelError::UnknownVariable(id))
    }

    pub fn get_constraint(&self, id: ConstraintId) -> Result<&Constraint, ModelError> {
        self.constraints
            .get(id.index())
            .ok_or(ModelError::UnknownConstraint(id))
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, var)| (VariableId::new(index as u32), var))
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraints
            .iter()
            .enumerate()
            .map(|(index, con)| (ConstraintId::new(index as u32), con))
    }

    /// Rows in order with their bounds and merged terms.
    pub fn rows(
        &self,
    ) -> impl Iterator<Item = (ConstraintId, &Constraint, &[(VariableId, f64)])> + '_ {
        self.constraints()
            .zip(&self.rows)
            .map(|((id, con), terms)| (id, con, terms.as_slice()))
    }

    /// Evaluate every row at `primal_values` (missing entries count as zero).
    pub fn row_activities(&self, primal_values: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|terms| {
                terms
                    .iter()
                    .map(|&(var, coeff)| {
                        coeff * primal_values.get(var.index()).copied().unwrap_or(0.0)
                    })
                    .sum()
            })
            .collect()
    }

    pub fn set_variable_name(&mut self, id: VariableId, name: String) -> Result<(), ModelError> {
        let slot = self
            .variable_names
            .get_mut(id.index())
            .ok_or(ModelError::UnknownVariable(id))?;
        *slot = Some(name);
        Ok(())
    }

    pub fn get_variable_name(&self, id: VariableId) -> Option<&str> {
        self.variable_names.get(id.index())?.as_deref()
    }

    pub fn set_constraint_name(
        &mut self,
        id: ConstraintId,
        name: String,
    ) -> Result<(), ModelError> {
        let slot = self
            .constraint_names
            .get_mut(id.index())
            .ok_or(ModelError::UnknownConstraint(id))?;
        *slot = Some(name);
        Ok(())
    }

    pub fn get_constraint_name(&self, id: ConstraintId) -> Option<&str> {
        self.constraint_names.get(id.index())?.as_deref()
    }

    /// Record a warm-start value; variables without a hint are left to the backend.
    pub fn set_primal_start(&mut self, id: VariableId, value: f64) -> Result<(), ModelError> {
        self.get_variable(id)?;
        if !value.is_finite() {
            return Err(ModelError::NonFiniteValue { value });
        }
        self.primal_start
            .get_or_insert_with(BTreeMap::new)
            .insert(id, value);
        Ok(())
    }

    pub fn primal_start(&self) -> Option<&BTreeMap<VariableId, f64>> {
        self.primal_start.as_ref()
    }
}

fn check_bounds(bounds: Bounds) -> Result<(), ModelError> {
    if bounds.is_valid() {
        Ok(())
    } else {
        Err(ModelError::InvalidBounds {
            lower: bounds.lower,
            upper: bounds.upper,
        })
    }
}

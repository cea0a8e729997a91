//! Linear model assembly for a built network.

use crate::formulation::Formulation;
use crate::warm_start::WarmStart;
use serde::Serialize;
use ssp_core::{Arc, ArcId, ArcKind, FlowValues, Instance, Network};
use ssp_model::{Bounds, Expr, Model, ModelError, Solution, Variable, VariableId};

/// Options for [`assemble`].
#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    /// Continuous variables instead of integer ones.
    pub relaxed: bool,
    /// Objective cut `objective <= bound`.
    pub bound: Option<f64>,
    /// Primal start hints.
    pub warm_start: Option<WarmStart>,
}

impl AssemblyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relaxed(mut self, relaxed: bool) -> Self {
        self.relaxed = relaxed;
        self
    }

    pub fn with_bound(mut self, bound: f64) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_warm_start(mut self, warm_start: WarmStart) -> Self {
        self.warm_start = Some(warm_start);
        self
    }
}

/// Size of an assembled model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    pub variables: usize,
    pub constraints: usize,
    pub nonzeros: usize,
}

/// A model with one column per network arc.
#[derive(Debug, Clone)]
pub struct FlowModel {
    formulation: Formulation,
    model: Model,
    columns: Vec<VariableId>,
}

impl FlowModel {
    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    /// Column of arc `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to the assembled network.
    pub fn variable(&self, id: ArcId) -> VariableId {
        self.columns[id.index()]
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            variables: self.model.num_variables(),
            constraints: self.model.num_constraints(),
            nonzeros: self.model.num_coefficients(),
        }
    }

    /// Per-arc values read from a solved model. Missing columns read as zero.
    pub fn flow_values(&self, network: &Network, solution: &Solution) -> FlowValues {
        FlowValues::from_ids(
            network,
            self.columns.iter().enumerate().map(|(index, var)| {
                (
                    ArcId::new(index as u32),
                    solution.get_primal(var.index()).unwrap_or(0.0),
                )
            }),
        )
    }
}

/// Sum of the columns of `ids`.
pub(crate) fn arc_sum(columns: &[VariableId], ids: impl IntoIterator<Item = ArcId>) -> Expr {
    Expr::sum(ids.into_iter().map(|id| columns[id.index()]))
}

fn is_slack(network: &Network, arc: &Arc) -> bool {
    arc.kind == ArcKind::Reflect
        && arc.item.is_none()
        && arc.start == network.threshold()
        && arc.end == network.threshold()
}

/// Assemble the maximization model of `formulation` over `network`.
pub fn assemble(
    instance: &Instance,
    formulation: Formulation,
    network: &Network,
    options: &AssemblyOptions,
) -> Result<FlowModel, ModelError> {
    let mut model = Model::new();
    let mut columns = Vec::with_capacity(network.len());
    for (id, arc) in network.arcs() {
        let upper = match arc.item {
            Some(item) => f64::from(instance.availability(item)),
            None => f64::INFINITY,
        };
        let lower = if is_slack(network, arc) {
            f64::NEG_INFINITY
        } else {
            0.0
        };
        let bounds = Bounds::new(lower, upper);
        let variable = if options.relaxed {
            Variable::continuous(bounds)
        } else {
            Variable::integer(bounds)
        };
        let var = model.add_variable(variable)?;
        model.set_variable_name(var, network.arc_name(id))?;
        columns.push(var);
    }

    let objective = match formulation {
        Formulation::ArcFlow => crate::plain::add_rows(&mut model, network, &columns)?,
        Formulation::LossArcFlow => crate::loss::add_rows(&mut model, network, &columns)?,
        Formulation::Reflect => crate::reflect::add_rows(&mut model, network, &columns)?,
    };

    for (item, _, availability) in instance.items() {
        let used = arc_sum(&columns, network.item_arcs(item));
        let row = model.add_constraint_expr(used.at_most(f64::from(availability)))?;
        model.set_constraint_name(row, format!("capacity[{}]", item))?;
    }

    if let Some(bound) = options.bound {
        let row = model.add_constraint_expr(objective.at_most(bound))?;
        model.set_constraint_name(row, "bound".to_string())?;
    }
    model.maximize(objective)?;

    if let Some(start) = &options.warm_start {
        for (id, value) in start.iter() {
            if let Some(&var) = columns.get(id.index()) {
                model.set_primal_start(var, value)?;
            }
        }
    }

    let flow_model = FlowModel {
        formulation,
        model,
        columns,
    };
    let stats = flow_model.stats();
    tracing::debug!(
        component = "arcflow",
        operation = "assemble",
        status = "success",
        formulation = formulation.as_str(),
        variables = stats.variables,
        constraints = stats.constraints,
        nonzeros = stats.nonzeros,
        relaxed = options.relaxed,
        warm_start = options.warm_start.is_some(),
        "Assembled model"
    );
    Ok(flow_model)
}

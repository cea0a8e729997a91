//! Object patterns and decoded paths.

use crate::instance::Instance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Item counts composing one object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pattern {
    counts: BTreeMap<usize, u32>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pattern holding one copy per listed item.
    pub fn from_items(items: impl IntoIterator<Item = usize>) -> Self {
        let mut pattern = Self::new();
        for item in items {
            pattern.add(item);
        }
        pattern
    }

    /// Pattern from explicit `(item, count)` pairs. Zero counts are dropped.
    pub fn from_counts(counts: impl IntoIterator<Item = (usize, u32)>) -> Self {
        let mut pattern = Self::new();
        for (item, count) in counts {
            if count > 0 {
                *pattern.counts.entry(item).or_insert(0) += count;
            }
        }
        pattern
    }

    pub fn add(&mut self, item: usize) {
        *self.counts.entry(item).or_insert(0) += 1;
    }

    pub fn count(&self, item: usize) -> u32 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    /// `(item, count)` in ascending item order.
    pub fn counts(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.counts.iter().map(|(&item, &count)| (item, count))
    }

    /// Item indices in ascending order, each repeated by its count.
    pub fn items(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts()
            .flat_map(|(item, count)| std::iter::repeat(item).take(count as usize))
    }

    /// Total number of item copies.
    pub fn copies(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of `count * length` over the entries.
    ///
    /// # Panics
    ///
    /// Panics if an item index is out of range for `instance`.
    pub fn length(&self, instance: &Instance) -> u64 {
        self.counts()
            .map(|(item, count)| instance.length(item) * u64::from(count))
            .sum()
    }
}

/// One token of a decoded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathStep {
    /// A copy of the item with this index.
    Item(usize),
    /// A run of consecutive loss arcs.
    Loss(usize),
    /// Object closed without a further item.
    Complete,
}

impl PathStep {
    pub fn render(&self, instance: &Instance) -> String {
        match self {
            PathStep::Item(item) => instance.length(*item).to_string(),
            PathStep::Loss(count) => format!("{}xL", count),
            PathStep::Complete => "R".to_string(),
        }
    }
}

/// Push `step`, merging it into a trailing loss run.
pub(crate) fn push_step(steps: &mut Vec<PathStep>, step: PathStep) {
    if let (PathStep::Loss(added), Some(PathStep::Loss(run))) = (step, steps.last_mut()) {
        *run += added;
        return;
    }
    steps.push(step);
}

/// A pattern extracted from a flow with its multiplicity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPattern {
    pub multiplicity: f64,
    /// Sum of item lengths along the path.
    pub length: u64,
    pub steps: Vec<PathStep>,
}

impl DecodedPattern {
    /// Build from path steps, collapsing loss runs and summing item lengths.
    pub fn from_steps(
        instance: &Instance,
        multiplicity: f64,
        steps: impl IntoIterator<Item = PathStep>,
    ) -> Self {
        let mut collapsed = Vec::new();
        let mut length = 0;
        for step in steps {
            if let PathStep::Item(item) = step {
                length += instance.length(item);
            }
            push_step(&mut collapsed, step);
        }
        Self {
            multiplicity,
            length,
            steps: collapsed,
        }
    }

    /// Item counts used by the path.
    pub fn pattern(&self) -> Pattern {
        Pattern::from_items(self.steps.iter().filter_map(|step| match step {
            PathStep::Item(item) => Some(*item),
            _ => None,
        }))
    }

    pub fn render(&self, instance: &Instance) -> Vec<String> {
        self.steps.iter().map(|step| step.render(instance)).collect()
    }

    /// `use {multiplicity} x [tokens] (length = {length})`
    pub fn describe(&self, instance: &Instance) -> String {
        format!(
            "use {} x [{}] (length = {})",
            self.multiplicity,
            self.render(instance).join(", "),
            self.length
        )
    }
}

/// Group decoded patterns by item counts, summing multiplicities.
pub fn merge_patterns<'a>(
    patterns: impl IntoIterator<Item = &'a DecodedPattern>,
) -> BTreeMap<Pattern, f64> {
    let mut merged = BTreeMap::new();
    for decoded in patterns {
        *merged.entry(decoded.pattern()).or_insert(0.0) += decoded.multiplicity;
    }
    merged
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (position, (item, count)) in self.counts().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", item, count)?;
        }
        f.write_str("}")
    }
}

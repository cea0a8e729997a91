//! Availability check for decoded patterns.

use ssp_core::{DecodedPattern, Instance, Tolerance};
use std::fmt;

/// An item used more often than it is available.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityViolation {
    pub item: usize,
    pub used: f64,
    pub available: u32,
}

impl fmt::Display for CapacityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[CAPACITY_EXCEEDED] Item {} used {} times, {} available",
            self.item, self.used, self.available
        )
    }
}

impl std::error::Error for CapacityViolation {}

/// Check that `patterns`, weighted by multiplicity, respect every
/// availability. Items outside the instance count as unavailable.
pub fn check_patterns(
    instance: &Instance,
    patterns: &[DecodedPattern],
    tol: Tolerance,
) -> Result<(), CapacityViolation> {
    let mut used = vec![0.0; instance.len()];
    for decoded in patterns {
        for (item, count) in decoded.pattern().counts() {
            let amount = decoded.multiplicity * f64::from(count);
            match used.get_mut(item) {
                Some(total) => *total += amount,
                None => {
                    return Err(CapacityViolation {
                        item,
                        used: amount,
                        available: 0,
                    })
                }
            }
        }
    }
    for (item, total) in used.into_iter().enumerate() {
        let available = instance.availability(item);
        if tol.is_positive(total - f64::from(available)) {
            return Err(CapacityViolation {
                item,
                used: total,
                available,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;
    use ssp_core::PathStep;

    fn instance() -> Instance {
        Instance::new(10, vec![6, 5, 4, 3], vec![1, 1, 2, 4]).unwrap()
    }

    fn decoded(inst: &Instance, multiplicity: f64, items: &[usize]) -> DecodedPattern {
        DecodedPattern::from_steps(inst, multiplicity, items.iter().map(|&i| PathStep::Item(i)))
    }

    #[test]
    fn accepts_usage_within_availability() {
        let inst = instance();
        let patterns = [decoded(&inst, 1.0, &[0, 2]), decoded(&inst, 2.0, &[3, 3])];
        assert_eq!(check_patterns(&inst, &patterns, Tolerance::default()), Ok(()));
    }

    #[test]
    fn reports_overused_item() {
        let inst = instance();
        let patterns = [decoded(&inst, 1.5, &[2, 3]), decoded(&inst, 1.0, &[2, 1])];
        let violation = check_patterns(&inst, &patterns, Tolerance::default()).unwrap_err();
        assert_eq!(violation.item, 2);
        assert_eq!(violation.used, 2.5);
        assert_eq!(violation.available, 2);
    }
}

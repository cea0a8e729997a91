//! Skiving stock problem instances.

use crate::error::InstanceError;
use serde::{Deserialize, Serialize};

/// A skiving stock instance: threshold `T`, item lengths and availabilities.
///
/// Every item is strictly shorter than the threshold. Use
/// [`Instance::strip_large_items`] to drop items that are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InstanceRecord")]
pub struct Instance {
    threshold: u64,
    lengths: Vec<u64>,
    availabilities: Vec<u32>,
}

#[derive(Deserialize)]
struct InstanceRecord {
    threshold: u64,
    lengths: Vec<u64>,
    availabilities: Vec<u32>,
}

impl TryFrom<InstanceRecord> for Instance {
    type Error = InstanceError;

    fn try_from(record: InstanceRecord) -> Result<Self, Self::Error> {
        Instance::new(record.threshold, record.lengths, record.availabilities)
    }
}

impl Instance {
    /// Create a validated instance.
    pub fn new(
        threshold: u64,
        lengths: Vec<u64>,
        availabilities: Vec<u32>,
    ) -> Result<Self, InstanceError> {
        if threshold == 0 {
            return Err(InstanceError::ZeroThreshold);
        }
        if lengths.len() != availabilities.len() {
            return Err(InstanceError::LengthMismatch {
                lengths: lengths.len(),
                availabilities: availabilities.len(),
            });
        }
        for (item, &length) in lengths.iter().enumerate() {
            if length == 0 {
                return Err(InstanceError::ZeroLength { item });
            }
            if length >= threshold {
                return Err(InstanceError::ItemTooLong {
                    item,
                    length,
                    threshold,
                });
            }
        }
        Ok(Self {
            threshold,
            lengths,
            availabilities,
        })
    }

    /// Create an instance after removing every item with `length >= threshold`.
    ///
    /// Item indices of the result refer to the kept items only.
    pub fn strip_large_items(
        threshold: u64,
        lengths: Vec<u64>,
        availabilities: Vec<u32>,
    ) -> Result<Self, InstanceError> {
        if lengths.len() != availabilities.len() {
            return Err(InstanceError::LengthMismatch {
                lengths: lengths.len(),
                availabilities: availabilities.len(),
            });
        }
        let before = lengths.len();
        let (lengths, availabilities): (Vec<u64>, Vec<u32>) = lengths
            .into_iter()
            .zip(availabilities)
            .filter(|(length, _)| *length < threshold)
            .unzip();
        if lengths.len() < before {
            tracing::debug!(
                component = "instance",
                operation = "strip_large_items",
                status = "success",
                threshold,
                removed = before - lengths.len(),
                "Removed items not shorter than the threshold"
            );
        }
        Self::new(threshold, lengths, availabilities)
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn lengths(&self) -> &[u64] {
        &self.lengths
    }

    pub fn availabilities(&self) -> &[u32] {
        &self.availabilities
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Length of item `item`.
    ///
    /// # Panics
    ///
    /// Panics if `item` is out of range.
    pub fn length(&self, item: usize) -> u64 {
        self.lengths[item]
    }

    /// Availability of item `item`.
    ///
    /// # Panics
    ///
    /// Panics if `item` is out of range.
    pub fn availability(&self, item: usize) -> u32 {
        self.availabilities[item]
    }

    /// Iterate `(item, length, availability)` in index order.
    pub fn items(&self) -> impl Iterator<Item = (usize, u64, u32)> + '_ {
        self.lengths
            .iter()
            .zip(&self.availabilities)
            .enumerate()
            .map(|(item, (&length, &availability))| (item, length, availability))
    }

    /// Total length of all available copies.
    pub fn total_length(&self) -> u64 {
        self.items()
            .map(|(_, length, availability)| length * u64::from(availability))
            .sum()
    }

    /// Total number of available copies.
    pub fn total_copies(&self) -> u64 {
        self.availabilities.iter().map(|&b| u64::from(b)).sum()
    }

    /// Material bound: no more than `total_length / threshold` objects fit.
    pub fn material_bound(&self) -> u64 {
        self.total_length() / self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Instance {
        Instance::new(10, vec![6, 5, 4, 3], vec![1, 1, 2, 4]).unwrap()
    }

    #[test]
    fn accessors_report_items() {
        let inst = sample();
        assert_eq!(inst.threshold(), 10);
        assert_eq!(inst.len(), 4);
        assert_eq!(inst.length(2), 4);
        assert_eq!(inst.availability(3), 4);
        assert_eq!(inst.total_length(), 6 + 5 + 8 + 12);
        assert_eq!(inst.total_copies(), 8);
        assert_eq!(inst.material_bound(), 3);
    }

    #[test]
    fn rejects_item_at_threshold() {
        let err = Instance::new(10, vec![10, 3], vec![1, 1]).unwrap_err();
        assert_eq!(
            err,
            InstanceError::ItemTooLong {
                item: 0,
                length: 10,
                threshold: 10
            }
        );
    }

    #[test]
    fn rejects_mismatched_vectors() {
        let err = Instance::new(10, vec![3, 4], vec![1]).unwrap_err();
        assert_eq!(err.code(), "INSTANCE_LENGTH_MISMATCH");
    }

    #[test]
    fn rejects_zero_threshold_and_zero_length() {
        assert_eq!(
            Instance::new(0, vec![], vec![]).unwrap_err(),
            InstanceError::ZeroThreshold
        );
        assert_eq!(
            Instance::new(5, vec![0], vec![1]).unwrap_err(),
            InstanceError::ZeroLength { item: 0 }
        );
    }

    #[test]
    fn strip_large_items_keeps_order() {
        let inst = Instance::strip_large_items(10, vec![12, 6, 10, 3], vec![2, 1, 5, 4]).unwrap();
        assert_eq!(inst.lengths(), &[6, 3]);
        assert_eq!(inst.availabilities(), &[1, 4]);
    }

    #[test]
    fn deserialization_validates() {
        let ok: Instance =
            serde_json::from_str(r#"{"threshold":10,"lengths":[4],"availabilities":[2]}"#)
                .unwrap();
        assert_eq!(ok.length(0), 4);

        let bad = serde_json::from_str::<Instance>(
            r#"{"threshold":10,"lengths":[11],"availabilities":[2]}"#,
        );
        assert!(bad.is_err());
    }
}

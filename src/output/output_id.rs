//! Stable output ids.
//!
//! # Bit layout
//!
//! ```text
//! | component type id | level (8) | type (2) | sequence (16) |
//!   bits 26..           18..25      16..17     0..15
//! ```
//!
//! An id is stable across layout passes for the same logical output: the
//! calculator hands a matched output its previous id back when it is still
//! free, so the diff and the mount state can match outputs by id. Ids the
//! previous layout handed out are held back from fresh sequences, so a newly
//! inserted output never takes the id of an unchanged sibling.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

use super::layout_output::OutputType;

pub const MAX_LEVEL: i64 = 255;
pub const MAX_SEQUENCE: i64 = 65535;

const TYPE_SHIFT: u32 = 26;
const LEVEL_SHIFT: u32 = 18;
const OUTPUT_TYPE_SHIFT: u32 = 16;
const SEQUENCE_MASK: u64 = 0xFFFF;

fn check_range(field: &'static str, value: i64, max: i64) -> Result<u64> {
    if !(0..=max).contains(&value) {
        return Err(Error::IdOutOfRange { field, value, max });
    }
    Ok(value as u64)
}

/// Pack an output id.
///
/// Fails when `level` is outside `[0, 255]` or `sequence` outside `[0, 65535]`.
pub fn calculate_id(
    component_type_id: u32,
    level: i64,
    output_type: OutputType,
    sequence: i64,
) -> Result<u64> {
    let level = check_range("level", level, MAX_LEVEL)?;
    let sequence = check_range("sequence", sequence, MAX_SEQUENCE)?;
    Ok(((component_type_id as u64) << TYPE_SHIFT)
        | (level << LEVEL_SHIFT)
        | (output_type.id_bits() << OUTPUT_TYPE_SHIFT)
        | sequence)
}

/// Pack a visibility output id (no type field).
pub fn calculate_visibility_id(component_type_id: u32, level: i64, sequence: i64) -> Result<u64> {
    let level = check_range("level", level, MAX_LEVEL)?;
    let sequence = check_range("sequence", sequence, MAX_SEQUENCE)?;
    Ok(((component_type_id as u64) << TYPE_SHIFT) | (level << LEVEL_SHIFT) | sequence)
}

/// Hands out unique ids for one layout pass.
#[derive(Debug, Default)]
pub struct OutputIdCalculator {
    taken: HashSet<u64>,
    held: HashSet<u64>,
    next_sequence: HashMap<u64, i64>,
}

impl OutputIdCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for an output, reusing `previous` when it has the same base and
    /// is still free.
    pub fn output_id(
        &mut self,
        component_type_id: u32,
        level: i64,
        output_type: OutputType,
        previous: Option<u64>,
    ) -> Result<u64> {
        let base = calculate_id(component_type_id, level, output_type, 0)?;
        self.claim(base, previous)
    }

    pub fn visibility_id(
        &mut self,
        component_type_id: u32,
        level: i64,
        previous: Option<u64>,
    ) -> Result<u64> {
        let base = calculate_visibility_id(component_type_id, level, 0)?;
        self.claim(base, previous)
    }

    /// Mark an id as used without going through the sequence counter.
    pub fn reserve(&mut self, id: u64) {
        self.taken.insert(id);
    }

    /// Keep `id` out of fresh sequences; only a claim naming it as its
    /// previous id gets it.
    pub fn hold(&mut self, id: u64) {
        self.held.insert(id);
    }

    fn claim(&mut self, base: u64, previous: Option<u64>) -> Result<u64> {
        if let Some(previous) = previous
            && previous & !SEQUENCE_MASK == base
            && self.taken.insert(previous)
        {
            return Ok(previous);
        }

        let sequence = self.next_sequence.entry(base).or_insert(0);
        loop {
            let candidate = check_range("sequence", *sequence, MAX_SEQUENCE)?;
            *sequence += 1;
            let id = base | candidate;
            if !self.held.contains(&id) && self.taken.insert(id) {
                return Ok(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            calculate_id(1, 1, OutputType::Content, 1).unwrap(),
            0b100000001000000000000000001
        );
        assert_eq!(
            calculate_id(1, 1, OutputType::Background, 1).unwrap(),
            0b100000001010000000000000001
        );
    }

    #[test]
    fn test_out_of_range() {
        let err = calculate_id(1, 256, OutputType::Content, 0).unwrap_err();
        assert!(matches!(err, Error::IdOutOfRange { field: "level", value: 256, max: 255 }));

        let err = calculate_id(1, 0, OutputType::Content, 65536).unwrap_err();
        assert!(matches!(err, Error::IdOutOfRange { field: "sequence", .. }));

        assert!(calculate_id(1, -1, OutputType::Content, 0).is_err());
        assert!(calculate_visibility_id(1, 300, 0).is_err());
        assert!(calculate_id(1, 255, OutputType::Host, 65535).is_ok());
    }

    #[test]
    fn test_calculator_sequences_per_base() {
        let mut ids = OutputIdCalculator::new();
        let a = ids.output_id(2, 1, OutputType::Content, None).unwrap();
        let b = ids.output_id(2, 1, OutputType::Content, None).unwrap();
        let c = ids.output_id(2, 1, OutputType::Background, None).unwrap();

        assert_eq!(a & SEQUENCE_MASK, 0);
        assert_eq!(b & SEQUENCE_MASK, 1);
        assert_eq!(c & SEQUENCE_MASK, 0);
    }

    #[test]
    fn test_calculator_reuses_previous_id() {
        let previous = calculate_id(2, 1, OutputType::Content, 5).unwrap();
        let mut ids = OutputIdCalculator::new();

        assert_eq!(ids.output_id(2, 1, OutputType::Content, Some(previous)).unwrap(), previous);
        // Taken: the second claimant gets a fresh sequence.
        let fresh = ids.output_id(2, 1, OutputType::Content, Some(previous)).unwrap();
        assert_ne!(fresh, previous);

        // A previous id from another level is not reused.
        let moved = ids.output_id(2, 2, OutputType::Content, Some(previous)).unwrap();
        assert_ne!(moved, previous);
    }

    #[test]
    fn test_fresh_ids_skip_reused_ones() {
        let reused = calculate_id(3, 1, OutputType::Content, 0).unwrap();
        let mut ids = OutputIdCalculator::new();
        ids.output_id(3, 1, OutputType::Content, Some(reused)).unwrap();
        let next = ids.output_id(3, 1, OutputType::Content, None).unwrap();
        assert_eq!(next & SEQUENCE_MASK, 1);
    }

    #[test]
    fn test_held_ids_are_not_handed_out_fresh() {
        let kept = calculate_id(5, 1, OutputType::Content, 0).unwrap();
        let mut ids = OutputIdCalculator::new();
        ids.hold(kept);

        let inserted = ids.output_id(5, 1, OutputType::Content, None).unwrap();
        assert_eq!(inserted & SEQUENCE_MASK, 1);
        assert_eq!(ids.output_id(5, 1, OutputType::Content, Some(kept)).unwrap(), kept);
    }

    #[test]
    fn test_border_and_host_share_sequence() {
        let mut ids = OutputIdCalculator::new();
        let host = ids.output_id(4, 1, OutputType::Host, None).unwrap();
        let border = ids.output_id(4, 1, OutputType::Border, None).unwrap();
        assert_ne!(host, border);
    }
}

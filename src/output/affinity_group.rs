//! OutputUnitsAffinityGroup - The outputs one component instance produced.
//!
//! A group holds up to one unit per type among CONTENT, BACKGROUND,
//! FOREGROUND and BORDER, or exactly one HOST and nothing else.

use crate::error::{Error, Result};

use super::layout_output::OutputType;

const SLOTS: usize = OutputType::ALL.len();

fn slot(output_type: OutputType) -> usize {
    match output_type {
        OutputType::Content => 0,
        OutputType::Background => 1,
        OutputType::Foreground => 2,
        OutputType::Host => 3,
        OutputType::Border => 4,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnitsAffinityGroup<T> {
    items: [Option<T>; SLOTS],
    size: usize,
}

impl<T> Default for OutputUnitsAffinityGroup<T> {
    fn default() -> Self {
        Self {
            items: [None, None, None, None, None],
            size: 0,
        }
    }
}

impl<T> OutputUnitsAffinityGroup<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit.
    ///
    /// Fails when a HOST would share the group with anything, or when the
    /// type is already present.
    pub fn add(&mut self, output_type: OutputType, value: T) -> Result<()> {
        if output_type == OutputType::Host && self.size > 0 {
            return Err(Error::AffinityHostConflict {
                added: output_type,
                existing: self.describe(),
            });
        }
        if output_type != OutputType::Host && self.items[slot(OutputType::Host)].is_some() {
            return Err(Error::AffinityHostConflict {
                added: output_type,
                existing: self.describe(),
            });
        }
        if self.items[slot(output_type)].is_some() {
            return Err(Error::AffinityDuplicate(output_type));
        }

        self.items[slot(output_type)] = Some(value);
        self.size += 1;
        Ok(())
    }

    /// Replace an existing unit, or add it when absent.
    pub fn replace(&mut self, output_type: OutputType, value: T) -> Result<()> {
        if self.items[slot(output_type)].is_some() {
            self.items[slot(output_type)] = Some(value);
            return Ok(());
        }
        self.add(output_type, value)
    }

    pub fn get(&self, output_type: OutputType) -> Option<&T> {
        self.items[slot(output_type)].as_ref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Units in type order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputType, &T)> {
        OutputType::ALL
            .into_iter()
            .filter_map(|output_type| self.get(output_type).map(|value| (output_type, value)))
    }

    /// The unit other outputs are matched against: HOST, else CONTENT, else
    /// the first present.
    pub fn most_significant_unit(&self) -> Option<&T> {
        self.get(OutputType::Host)
            .or_else(|| self.get(OutputType::Content))
            .or_else(|| self.iter().next().map(|(_, value)| value))
    }

    fn describe(&self) -> String {
        self.iter()
            .map(|(output_type, _)| output_type.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

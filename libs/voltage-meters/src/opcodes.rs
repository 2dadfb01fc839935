//! Driver opcode tables
//!
//! Maps measurements to the register address a given meter model exposes
//! them at. Tables are built once from a literal and never change.
//!
//! A measurement listed twice in a table literal poisons the whole table:
//! every lookup reports [`MeterError::DuplicateOpcode`] instead of quietly
//! picking one of the addresses.

use std::collections::BTreeMap;

use crate::error::{MeterError, Result};
use crate::measurement::Measurement;

/// Read-only `Measurement → register address` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opcodes {
    table: BTreeMap<Measurement, u16>,
    /// First measurement that appeared more than once while building
    duplicate: Option<Measurement>,
}

impl Opcodes {
    /// Fails if the table literal listed a measurement twice
    pub fn verify(&self) -> Result<()> {
        match self.duplicate {
            Some(measurement) => Err(MeterError::DuplicateOpcode { measurement }),
            None => Ok(()),
        }
    }

    /// Register address for `measurement`
    ///
    /// A miss is an explicit error, never address 0.
    pub fn opcode(&self, measurement: Measurement) -> Result<u16> {
        self.verify()?;
        self.table
            .get(&measurement)
            .copied()
            .ok_or(MeterError::MissingOpcode { measurement })
    }

    pub fn contains(&self, measurement: Measurement) -> bool {
        self.table.contains_key(&measurement)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Entries in measurement order
    pub fn iter(&self) -> impl Iterator<Item = (Measurement, u16)> + '_ {
        self.table.iter().map(|(m, addr)| (*m, *addr))
    }
}

impl<const N: usize> From<[(Measurement, u16); N]> for Opcodes {
    fn from(table: [(Measurement, u16); N]) -> Self {
        table.into_iter().collect()
    }
}

impl FromIterator<(Measurement, u16)> for Opcodes {
    fn from_iter<I: IntoIterator<Item = (Measurement, u16)>>(iter: I) -> Self {
        let mut opcodes = Self::default();
        for (measurement, address) in iter {
            let previous = opcodes.table.insert(measurement, address);
            if previous.is_some() && opcodes.duplicate.is_none() {
                opcodes.duplicate = Some(measurement);
            }
        }
        opcodes
    }
}

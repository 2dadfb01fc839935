//! Register read operations
//!
//! An [`Operation`] describes one read: which function code to issue, where,
//! how many registers, which measurement it yields and how to decode it.
//! Operations hold no I/O state and can be shared freely between pollers.

use serde::{Deserialize, Serialize};

use crate::error::{MeterError, Result};
use crate::measurement::Measurement;
use crate::transform::Transform;

/// Modbus read function codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionCode {
    /// FC01
    ReadCoils,
    /// FC02
    ReadDiscreteInputs,
    /// FC03
    ReadHoldingRegisters,
    /// FC04
    ReadInputRegisters,
}

impl FunctionCode {
    /// Wire value of the function code
    pub fn code(&self) -> u8 {
        match self {
            FunctionCode::ReadCoils => 0x01,
            FunctionCode::ReadDiscreteInputs => 0x02,
            FunctionCode::ReadHoldingRegisters => 0x03,
            FunctionCode::ReadInputRegisters => 0x04,
        }
    }
}

impl std::fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FC{:02}", self.code())
    }
}

/// One register read and its decode transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub function_code: FunctionCode,
    /// Start register address
    pub address: u16,
    /// Length of the read in 16-bit registers
    pub register_count: u16,
    pub measurement: Measurement,
    pub transform: Transform,
}

impl Operation {
    /// Create an operation; the register count follows the transform's encoding
    pub fn new(
        function_code: FunctionCode,
        address: u16,
        measurement: Measurement,
        transform: Transform,
    ) -> Self {
        Self {
            function_code,
            address,
            register_count: transform.register_count(),
            measurement,
            transform,
        }
    }

    /// Number of bytes a well-formed response carries
    pub fn byte_len(&self) -> usize {
        self.register_count as usize * 2
    }

    /// Decode the raw bytes returned for this operation
    pub fn decode(&self, bytes: &[u8]) -> Result<Reading> {
        if bytes.len() != self.byte_len() {
            return Err(MeterError::DecodeLength {
                expected: self.byte_len(),
                actual: bytes.len(),
            });
        }

        Ok(Reading {
            measurement: self.measurement,
            value: self.transform.apply(bytes)?,
        })
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} @0x{:04X} x{} ({}",
            self.measurement,
            self.function_code,
            self.address,
            self.register_count,
            self.transform.encoding
        )?;
        if self.transform.scale != 1.0 {
            write!(f, " ×{}", self.transform.scale)?;
        }
        write!(f, ")")
    }
}

/// Decoded engineering-unit value tagged with its measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub measurement: Measurement,
    pub value: f64,
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}{}", self.measurement, self.value, self.measurement.unit())
    }
}

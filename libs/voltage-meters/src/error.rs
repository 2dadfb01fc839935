//! Meter Layer Error Types
//!
//! Errors are grouped the way callers have to react to them:
//! configuration problems surface immediately, driver defects are fatal,
//! transport failures are per-operation, and decode inconsistencies point
//! at an upstream framing bug.

use thiserror::Error;

use crate::measurement::Measurement;

/// Result type for voltage-meters operations
pub type Result<T> = std::result::Result<T, MeterError>;

/// Meter layer errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeterError {
    /// Model name not present in the driver registry
    #[error("Unknown meter driver: {0}")]
    UnknownDriver(String),

    /// Model name registered twice
    #[error("Meter driver already registered: {0}")]
    DuplicateDriver(String),

    /// Driver references a measurement its opcode table does not define
    #[error("No opcode defined for measurement {measurement}")]
    MissingOpcode { measurement: Measurement },

    /// Opcode table lists the same measurement more than once
    #[error("Opcode table lists measurement {measurement} more than once")]
    DuplicateOpcode { measurement: Measurement },

    /// Operation address differs from the driver's opcode table
    #[error("Operation for {measurement} reads 0x{actual:04X}, opcode table says 0x{expected:04X}")]
    AddressMismatch {
        measurement: Measurement,
        expected: u16,
        actual: u16,
    },

    /// Driver produces the same measurement twice in one cycle
    #[error("Measurement {measurement} produced more than once")]
    DuplicateOperation { measurement: Measurement },

    /// Measurement name not in the catalog
    #[error("Unknown measurement: {0}")]
    UnknownMeasurement(String),

    /// Byte order string not recognised
    #[error("Invalid byte order: {0}")]
    InvalidByteOrder(String),

    /// Response length does not match the operation's register count
    #[error("Decode length mismatch: expected {expected} bytes, got {actual}")]
    DecodeLength { expected: usize, actual: usize },

    /// Executor failed to read the registers of one operation
    #[error("Transport error reading {measurement}: {message}")]
    Transport {
        measurement: Measurement,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<figment::Error> for MeterError {
    fn from(err: figment::Error) -> Self {
        MeterError::Config(err.to_string())
    }
}

// Helper methods for creating errors
impl MeterError {
    pub fn config(msg: impl Into<String>) -> Self {
        MeterError::Config(msg.into())
    }

    pub fn transport(measurement: Measurement, msg: impl Into<String>) -> Self {
        MeterError::Transport {
            measurement,
            message: msg.into(),
        }
    }

    /// Check if this error is a bug in a driver's own tables
    pub fn is_driver_defect(&self) -> bool {
        matches!(
            self,
            MeterError::MissingOpcode { .. }
                | MeterError::DuplicateOpcode { .. }
                | MeterError::AddressMismatch { .. }
                | MeterError::DuplicateOperation { .. }
                | MeterError::DuplicateDriver(_)
        )
    }

    /// Check if this error belongs to a single failed read
    pub fn is_transport(&self) -> bool {
        matches!(self, MeterError::Transport { .. })
    }
}

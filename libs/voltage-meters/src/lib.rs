//! Voltage Meters Library
//!
//! Register-operation layer for Modbus energy meters and power quality
//! analyzers. Describes *what* to read from a given meter model and *how*
//! to turn the returned bytes into engineering units; the transport doing
//! the actual reads is supplied by the caller.
//!
//! # Architecture
//!
//! ```text
//! DriverRegistry ──► factory ──► Producer (Opcodes)
//!                                   │ probe() / produce()
//!                                   ▼
//!                              [Operation] ──► OperationExecutor (transport)
//!                                   │                 │ raw bytes
//!                                   ▼                 ▼
//!                              Operation::decode ──► Reading
//! ```
//!
//! - **`measurement`**: vendor-neutral quantity catalog
//! - **`transform`** / **`bytes`**: decode pipeline with byte order handling
//! - **`operation`**: read descriptors
//! - **`producer`** / **`drivers`**: per-model opcode tables
//! - **`registry`**: model name → driver factory
//! - **`poll`**: one poll cycle over an executor, per-operation failures
//! - **`config`** / **`logging`**: device configuration and log setup

pub mod bytes;
pub mod config;
pub mod drivers;
pub mod error;
pub mod logging;
pub mod measurement;
pub mod opcodes;
pub mod operation;
pub mod poll;
pub mod producer;
pub mod registry;
pub mod simulator;
pub mod transform;

// Re-export core types
pub use bytes::ByteOrder;
pub use config::{load_config, DeviceConfig, MeterConfig};
pub use error::{MeterError, Result};
pub use measurement::Measurement;
pub use opcodes::Opcodes;
pub use operation::{FunctionCode, Operation, Reading};
pub use poll::{run_cycle, CycleReport, OperationExecutor, OperationFailure};
pub use producer::{DriverOptions, Producer, Snip};
pub use registry::{DriverRegistry, ProducerFactory};
pub use simulator::RegisterBank;
pub use transform::{Encoding, Transform};

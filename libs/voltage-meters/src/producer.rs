//! Producer abstraction
//!
//! One producer per meter model. A producer owns the model's opcode table
//! and turns it into operations: a single cheap [`Producer::probe`] for
//! discovery and the full [`Producer::produce`] list for a poll cycle.
//!
//! Drivers are data: an opcode table, a function code and a choice of
//! transform per measurement group. [`Snip`] builds the operations so no
//! driver needs its own control flow.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::bytes::ByteOrder;
use crate::error::{MeterError, Result};
use crate::measurement::Measurement;
use crate::opcodes::Opcodes;
use crate::operation::{FunctionCode, Operation};
use crate::transform::Transform;

/// Device driver for one meter model
pub trait Producer: Send + Sync {
    /// Human-readable identification of the device family
    fn description(&self) -> &'static str;

    /// Register table of this model
    fn opcodes(&self) -> &Opcodes;

    /// Single cheap read confirming the device responds
    fn probe(&self) -> Result<Operation>;

    /// Operations of one full poll cycle, rebuilt on every call
    fn produce(&self) -> Result<Vec<Operation>>;
}

/// Per-device driver choices taken from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverOptions {
    /// Multiplier applied to phase current reads, e.g. when a device
    /// revision reports mA instead of A
    pub current_scale: Option<f64>,
    /// Append the driver's energy counter group to each poll cycle
    pub energy: bool,
}

impl DriverOptions {
    pub fn with_current_scale(mut self, factor: f64) -> Self {
        self.current_scale = Some(factor);
        self
    }

    pub fn with_energy(mut self) -> Self {
        self.energy = true;
        self
    }
}

/// Operation builder over a driver's opcode table
#[derive(Debug, Clone, Copy)]
pub struct Snip<'a> {
    opcodes: &'a Opcodes,
    function_code: FunctionCode,
    order: ByteOrder,
}

impl<'a> Snip<'a> {
    pub fn new(opcodes: &'a Opcodes, function_code: FunctionCode) -> Self {
        Self {
            opcodes,
            function_code,
            order: ByteOrder::BigEndian,
        }
    }

    /// Default register layout for the `float32`/`float64`/`group` helpers
    pub fn with_order(self, order: ByteOrder) -> Self {
        Self { order, ..self }
    }

    /// Operation for `measurement` decoded with `transform` exactly as given
    pub fn op(&self, measurement: Measurement, transform: Transform) -> Result<Operation> {
        let address = self.opcodes.opcode(measurement)?;
        Ok(Operation::new(self.function_code, address, measurement, transform))
    }

    /// 32-bit float read in the snip's order, optionally scaled
    pub fn float32(&self, measurement: Measurement, scale: Option<f64>) -> Result<Operation> {
        let transform = Transform::ieee754_f32().with_order(self.order);
        self.op(measurement, transform.maybe_scaled(scale))
    }

    /// 64-bit double read in the snip's order, optionally scaled
    pub fn float64(&self, measurement: Measurement, scale: Option<f64>) -> Result<Operation> {
        let transform = Transform::ieee754_f64().with_order(self.order);
        self.op(measurement, transform.maybe_scaled(scale))
    }

    /// One operation per measurement, in the given order, with the snip's
    /// register layout applied to `transform`
    pub fn group(
        &self,
        measurements: &[Measurement],
        transform: Transform,
    ) -> Result<Vec<Operation>> {
        let transform = transform.with_order(self.order);
        measurements
            .iter()
            .map(|m| self.op(*m, transform))
            .collect()
    }
}

/// Check a producer's own consistency
///
/// The opcode table must be free of duplicate rows, the probe and every
/// produced operation must read the address the table lists for its
/// measurement, and a cycle must not read the same measurement twice.
pub fn validate_producer(producer: &dyn Producer) -> Result<()> {
    let opcodes = producer.opcodes();
    opcodes.verify()?;
    check_address(opcodes, &producer.probe()?)?;

    let mut seen = HashSet::new();
    for op in producer.produce()? {
        check_address(opcodes, &op)?;
        if !seen.insert(op.measurement) {
            return Err(MeterError::DuplicateOperation {
                measurement: op.measurement,
            });
        }
    }

    Ok(())
}

fn check_address(opcodes: &Opcodes, op: &Operation) -> Result<()> {
    let expected = opcodes.opcode(op.measurement)?;
    if op.address != expected {
        return Err(MeterError::AddressMismatch {
            measurement: op.measurement,
            expected,
            actual: op.address,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use Measurement::*;

    struct BrokenProducer {
        opcodes: Opcodes,
        duplicate: bool,
        /// Address used for the CurrentL1 read instead of the table entry
        stray_address: Option<u16>,
    }

    impl BrokenProducer {
        fn new(opcodes: Opcodes) -> Self {
            Self {
                opcodes,
                duplicate: false,
                stray_address: None,
            }
        }
    }

    impl Producer for BrokenProducer {
        fn description(&self) -> &'static str {
            "broken"
        }

        fn opcodes(&self) -> &Opcodes {
            &self.opcodes
        }

        fn probe(&self) -> Result<Operation> {
            Snip::new(&self.opcodes, FunctionCode::ReadHoldingRegisters).float32(VoltageL1, None)
        }

        fn produce(&self) -> Result<Vec<Operation>> {
            let snip = Snip::new(&self.opcodes, FunctionCode::ReadHoldingRegisters);
            if let Some(address) = self.stray_address {
                return Ok(vec![
                    snip.float32(VoltageL1, None)?,
                    Operation::new(
                        FunctionCode::ReadHoldingRegisters,
                        address,
                        CurrentL1,
                        Transform::ieee754_f32(),
                    ),
                ]);
            }
            let group: &[Measurement] = if self.duplicate {
                &[VoltageL1, VoltageL1]
            } else {
                &[VoltageL1, CurrentL1]
            };
            snip.group(group, Transform::ieee754_f32())
        }
    }

    #[test]
    fn test_snip_builds_from_table() {
        let ops = Opcodes::from([(VoltageL1, 0x10), (Import, 0x20)]);
        let snip = Snip::new(&ops, FunctionCode::ReadInputRegisters)
            .with_order(ByteOrder::BigEndianSwap);

        let op = snip.float32(VoltageL1, Some(0.1)).unwrap();
        assert_eq!(op.address, 0x10);
        assert_eq!(op.function_code, FunctionCode::ReadInputRegisters);
        assert_eq!(op.transform.order, ByteOrder::BigEndianSwap);
        assert_eq!(op.transform.scale, 0.1);

        let op = snip.float64(Import, None).unwrap();
        assert_eq!(op.register_count, 4);
    }

    #[test]
    fn test_snip_op_keeps_explicit_order() {
        let ops = Opcodes::from([(VoltageL1, 0x10), (VoltageL2, 0x12), (CurrentL1, 0x20)]);
        let snip = Snip::new(&ops, FunctionCode::ReadHoldingRegisters);

        let swapped = snip
            .op(
                VoltageL1,
                Transform::ieee754_f32().with_order(ByteOrder::BigEndianSwap),
            )
            .unwrap();
        let little = snip
            .op(
                VoltageL2,
                Transform::ieee754_f32().with_order(ByteOrder::LittleEndian),
            )
            .unwrap();
        let default = snip.float32(CurrentL1, None).unwrap();

        assert_eq!(swapped.transform.order, ByteOrder::BigEndianSwap);
        assert_eq!(little.transform.order, ByteOrder::LittleEndian);
        assert_eq!(default.transform.order, ByteOrder::BigEndian);

        // CDAB words decode to the intended value, not a byte-scrambled one
        let regs = crate::bytes::f32_to_registers(230.5, ByteOrder::BigEndianSwap);
        let bytes = crate::bytes::registers_to_bytes(&regs);
        assert!((swapped.decode(&bytes).unwrap().value - 230.5).abs() < 1e-3);
    }

    #[test]
    fn test_group_applies_snip_order() {
        let ops = Opcodes::from([(VoltageL1, 0x10), (VoltageL2, 0x12)]);
        let snip = Snip::new(&ops, FunctionCode::ReadInputRegisters)
            .with_order(ByteOrder::LittleEndianSwap);
        let group = snip
            .group(&[VoltageL1, VoltageL2], Transform::ieee754_f32())
            .unwrap();
        assert!(group
            .iter()
            .all(|op| op.transform.order == ByteOrder::LittleEndianSwap));
    }

    #[test]
    fn test_snip_missing_opcode() {
        let ops = Opcodes::from([(VoltageL1, 0x10)]);
        let snip = Snip::new(&ops, FunctionCode::ReadHoldingRegisters);
        assert_eq!(
            snip.float32(Frequency, None).unwrap_err(),
            MeterError::MissingOpcode {
                measurement: Frequency
            }
        );
    }

    #[test]
    fn test_validate_rejects_missing_opcode() {
        let producer = BrokenProducer::new(Opcodes::from([(VoltageL1, 0x10)]));
        let err = validate_producer(&producer).unwrap_err();
        assert!(err.is_driver_defect());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let producer = BrokenProducer {
            duplicate: true,
            ..BrokenProducer::new(Opcodes::from([(VoltageL1, 0x10)]))
        };
        assert_eq!(
            validate_producer(&producer).unwrap_err(),
            MeterError::DuplicateOperation {
                measurement: VoltageL1
            }
        );
    }

    #[test]
    fn test_validate_rejects_stray_address() {
        let producer = BrokenProducer {
            stray_address: Some(0x30),
            ..BrokenProducer::new(Opcodes::from([(VoltageL1, 0x10), (CurrentL1, 0x20)]))
        };
        assert_eq!(
            validate_producer(&producer).unwrap_err(),
            MeterError::AddressMismatch {
                measurement: CurrentL1,
                expected: 0x20,
                actual: 0x30
            }
        );

        let consistent = BrokenProducer::new(Opcodes::from([(VoltageL1, 0x10), (CurrentL1, 0x20)]));
        assert!(validate_producer(&consistent).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_table_row() {
        let producer = BrokenProducer::new(Opcodes::from([
            (VoltageL1, 0x10),
            (CurrentL1, 0x20),
            (CurrentL1, 0x22),
        ]));
        assert_eq!(
            validate_producer(&producer).unwrap_err(),
            MeterError::DuplicateOpcode {
                measurement: CurrentL1
            }
        );
    }

    #[test]
    fn test_options_builder() {
        let opts = DriverOptions::default().with_current_scale(0.001).with_energy();
        assert_eq!(opts.current_scale, Some(0.001));
        assert!(opts.energy);
        assert_eq!(DriverOptions::default().current_scale, None);
    }
}

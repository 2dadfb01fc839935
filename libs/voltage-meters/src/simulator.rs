//! In-memory meter simulator
//!
//! A register bank implementing [`OperationExecutor`], used to dry-run
//! drivers without hardware and to test poll cycles. Values are loaded per
//! operation and encoded with the operation's own transform, so a driver's
//! word order and scaling are exercised end to end.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tracing::{trace, warn};

use crate::bytes::{f32_to_registers, f64_to_registers, normalize, registers_to_bytes};
use crate::error::{MeterError, Result};
use crate::operation::{FunctionCode, Operation};
use crate::poll::OperationExecutor;
use crate::transform::{Encoding, Transform};

/// Simulated holding and input registers
#[derive(Debug, Default)]
pub struct RegisterBank {
    /// Holding registers (FC03)
    holding_registers: DashMap<u16, u16>,
    /// Input registers (FC04)
    input_registers: DashMap<u16, u16>,
    /// Start addresses whose reads fail at transport level
    failing: DashSet<u16>,
    /// Start addresses whose responses lose their last byte
    truncated: DashSet<u16>,
}

impl RegisterBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, function_code: FunctionCode) -> Option<&DashMap<u16, u16>> {
        match function_code {
            FunctionCode::ReadHoldingRegisters => Some(&self.holding_registers),
            FunctionCode::ReadInputRegisters => Some(&self.input_registers),
            FunctionCode::ReadCoils | FunctionCode::ReadDiscreteInputs => None,
        }
    }

    /// Write raw registers starting at `address`
    ///
    /// Coils and discrete inputs are not simulated; writes to them are
    /// dropped with a warning and later reads fail.
    pub fn set_registers(&self, function_code: FunctionCode, address: u16, regs: &[u16]) {
        let Some(table) = self.table(function_code) else {
            warn!(
                "{} not supported by simulator, dropped {} registers at 0x{:04X}",
                function_code,
                regs.len(),
                address
            );
            return;
        };
        for (offset, value) in regs.iter().enumerate() {
            table.insert(address.wrapping_add(offset as u16), *value);
        }
    }

    /// Store `value` so that `op` decodes it back
    pub fn load(&self, op: &Operation, value: f64) {
        let regs = encode(&op.transform, value);
        self.set_registers(op.function_code, op.address, &regs);
    }

    /// Make reads starting at `address` fail
    pub fn fail_at(&self, address: u16) {
        self.failing.insert(address);
    }

    /// Make reads starting at `address` return one byte short
    pub fn truncate_at(&self, address: u16) {
        self.truncated.insert(address);
    }
}

#[async_trait]
impl OperationExecutor for RegisterBank {
    async fn execute(&self, op: &Operation) -> Result<Vec<u8>> {
        if self.failing.contains(&op.address) {
            return Err(MeterError::transport(
                op.measurement,
                format!("no response at 0x{:04X}", op.address),
            ));
        }

        let table = self.table(op.function_code).ok_or_else(|| {
            MeterError::transport(
                op.measurement,
                format!("{} not supported by simulator", op.function_code),
            )
        })?;

        let regs: Vec<u16> = (0..op.register_count)
            .map(|offset| {
                table
                    .get(&op.address.wrapping_add(offset))
                    .map(|v| *v)
                    .unwrap_or(0)
            })
            .collect();

        let mut bytes = registers_to_bytes(&regs);
        if self.truncated.contains(&op.address) {
            bytes.pop();
        }
        trace!("{} -> {:02X?}", op, bytes);
        Ok(bytes)
    }
}

/// Inverse of [`Transform::apply`]: registers in the transform's layout
pub fn encode(transform: &Transform, value: f64) -> Vec<u16> {
    let raw = value / transform.scale;
    let order = transform.order;
    match transform.encoding {
        Encoding::Float32 => f32_to_registers(raw as f32, order).to_vec(),
        Encoding::Float64 => f64_to_registers(raw, order).to_vec(),
        Encoding::Uint16 => to_regs((raw.round() as u16).to_be_bytes(), transform),
        Encoding::Int16 => to_regs((raw.round() as i16).to_be_bytes(), transform),
        Encoding::Uint32 => to_regs((raw.round() as u32).to_be_bytes(), transform),
        Encoding::Int32 => to_regs((raw.round() as i32).to_be_bytes(), transform),
        Encoding::Uint64 => to_regs((raw.round() as u64).to_be_bytes(), transform),
    }
}

fn to_regs<const N: usize>(be_bytes: [u8; N], transform: &Transform) -> Vec<u16> {
    let bytes = normalize(be_bytes, transform.order);
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::bytes::ByteOrder;
    use crate::measurement::Measurement;
    use tracing_test::traced_test;

    #[test]
    fn test_encode_inverts_transform() {
        let cases = [
            (Transform::ieee754_f32(), 230.5),
            (Transform::ieee754_f32().with_order(ByteOrder::BigEndianSwap), -12.25),
            (Transform::ieee754_f64().scaled(0.001), 98_765.432),
            (Transform::new(Encoding::Int16).scaled(0.1), -42.7),
            (
                Transform::new(Encoding::Uint32).with_order(ByteOrder::LittleEndian),
                70_000.0,
            ),
        ];

        for (transform, value) in cases {
            let bytes = registers_to_bytes(&encode(&transform, value));
            let decoded = transform.apply(&bytes).unwrap();
            assert!((decoded - value).abs() < 1e-3, "{:?}: {}", transform, decoded);
        }
    }

    #[tokio::test]
    async fn test_bank_serves_loaded_values() {
        let bank = RegisterBank::new();
        let op = Operation::new(
            FunctionCode::ReadInputRegisters,
            0x0046,
            Measurement::Frequency,
            Transform::ieee754_f32(),
        );
        bank.load(&op, 50.01);

        let bytes = bank.execute(&op).await.unwrap();
        assert_eq!(bytes.len(), 4);
        assert!((op.decode(&bytes).unwrap().value - 50.01).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_bank_injected_faults() {
        let bank = RegisterBank::new();
        let op = Operation::new(
            FunctionCode::ReadHoldingRegisters,
            0x1100,
            Measurement::VoltageL1,
            Transform::ieee754_f32(),
        );

        bank.truncate_at(0x1100);
        assert_eq!(bank.execute(&op).await.unwrap().len(), 3);

        bank.fail_at(0x1100);
        assert!(bank.execute(&op).await.unwrap_err().is_transport());

        let coil = Operation {
            function_code: FunctionCode::ReadCoils,
            ..op
        };
        assert!(bank.execute(&coil).await.is_err());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_load_unsupported_function_code_warns() {
        let bank = RegisterBank::new();
        let op = Operation::new(
            FunctionCode::ReadDiscreteInputs,
            0x0010,
            Measurement::Frequency,
            Transform::ieee754_f32(),
        );
        bank.load(&op, 50.0);

        assert!(logs_contain("not supported by simulator"));
        assert!(bank.holding_registers.is_empty());
        assert!(bank.input_registers.is_empty());
        assert!(bank.execute(&op).await.unwrap_err().is_transport());
    }
}

//! Eastron SDM630 three-phase meters
//!
//! Input registers, 32-bit IEEE-754 floats in standard register order.

use crate::error::Result;
use crate::measurement::Measurement::{self, *};
use crate::opcodes::Opcodes;
use crate::operation::{FunctionCode, Operation};
use crate::producer::{DriverOptions, Producer, Snip};
use crate::transform::Transform;

/// Registry name of this driver
pub const MODEL: &str = "SDM";

const CYCLE: [&[Measurement]; 7] = [
    &[VoltageL1, VoltageL2, VoltageL3],
    &[CurrentL1, CurrentL2, CurrentL3],
    &[PowerL1, PowerL2, PowerL3, Power],
    &[ApparentPowerL1, ApparentPowerL2, ApparentPowerL3, ApparentPower],
    &[ReactivePowerL1, ReactivePowerL2, ReactivePowerL3, ReactivePower],
    &[CosphiL1, CosphiL2, CosphiL3, Cosphi],
    &[Frequency],
];

const ENERGY: [Measurement; 8] = [
    Import, Export, ImportL1, ImportL2, ImportL3, ExportL1, ExportL2, ExportL3,
];

fn opcodes() -> Opcodes {
    Opcodes::from([
        (VoltageL1, 0x0000),
        (VoltageL2, 0x0002),
        (VoltageL3, 0x0004),
        (CurrentL1, 0x0006),
        (CurrentL2, 0x0008),
        (CurrentL3, 0x000A),
        (PowerL1, 0x000C),
        (PowerL2, 0x000E),
        (PowerL3, 0x0010),
        (ApparentPowerL1, 0x0012),
        (ApparentPowerL2, 0x0014),
        (ApparentPowerL3, 0x0016),
        (ReactivePowerL1, 0x0018),
        (ReactivePowerL2, 0x001A),
        (ReactivePowerL3, 0x001C),
        (CosphiL1, 0x001E),
        (CosphiL2, 0x0020),
        (CosphiL3, 0x0022),
        (Power, 0x0034),
        (ApparentPower, 0x0038),
        (ReactivePower, 0x003C),
        (Cosphi, 0x003E),
        (Frequency, 0x0046),
        (Import, 0x0048),
        (Export, 0x004A),
        (ImportL1, 0x015A),
        (ImportL2, 0x015C),
        (ImportL3, 0x015E),
        (ExportL1, 0x0160),
        (ExportL2, 0x0162),
        (ExportL3, 0x0164),
    ])
}

/// SDM630 driver
#[derive(Debug, Clone)]
pub struct SdmProducer {
    opcodes: Opcodes,
    options: DriverOptions,
}

impl SdmProducer {
    pub fn new(options: DriverOptions) -> Self {
        Self {
            opcodes: opcodes(),
            options,
        }
    }

    /// Registry factory
    pub fn factory(options: &DriverOptions) -> Box<dyn Producer> {
        Box::new(Self::new(options.clone()))
    }

    fn snip(&self) -> Snip<'_> {
        Snip::new(&self.opcodes, FunctionCode::ReadInputRegisters)
    }
}

impl Default for SdmProducer {
    fn default() -> Self {
        Self::new(DriverOptions::default())
    }
}

impl Producer for SdmProducer {
    fn description(&self) -> &'static str {
        "Eastron SDM630 three-phase meters"
    }

    fn opcodes(&self) -> &Opcodes {
        &self.opcodes
    }

    fn probe(&self) -> Result<Operation> {
        self.snip().float32(VoltageL1, None)
    }

    fn produce(&self) -> Result<Vec<Operation>> {
        let snip = self.snip();
        let currents = Transform::ieee754_f32().maybe_scaled(self.options.current_scale);

        let mut ops = Vec::with_capacity(30);
        for group in CYCLE {
            let transform = if group.contains(&CurrentL1) {
                currents
            } else {
                Transform::ieee754_f32()
            };
            ops.extend(snip.group(group, transform)?);
        }

        if self.options.energy {
            ops.extend(snip.group(&ENERGY, Transform::ieee754_f32())?);
        }

        Ok(ops)
    }
}

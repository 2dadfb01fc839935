//! PQ Plus meters and power quality analyzers
//!
//! Holding registers, 32-bit IEEE-754 floats for instantaneous values and
//! 64-bit doubles for energy counters, both in standard register order.
//! Register map: PQ Plus Modbus manual v4.0 rev 1.2.

use crate::error::Result;
use crate::measurement::Measurement::{self, *};
use crate::opcodes::Opcodes;
use crate::operation::{FunctionCode, Operation};
use crate::producer::{DriverOptions, Producer, Snip};

/// Registry name of this driver
pub const MODEL: &str = "PQPLUS";

const CYCLE: [&[Measurement]; 5] = [
    &[VoltageL1, VoltageL2, VoltageL3],
    &[CurrentL1, CurrentL2, CurrentL3],
    &[Power, PowerL1, PowerL2, PowerL3],
    &[ReactivePower, ReactivePowerL1, ReactivePowerL2, ReactivePowerL3],
    &[ApparentPower, ApparentPowerL1, ApparentPowerL2, ApparentPowerL3],
];

const ENERGY: [Measurement; 8] = [
    Import, ImportL1, ImportL2, ImportL3, Export, ExportL1, ExportL2, ExportL3,
];

fn opcodes() -> Opcodes {
    Opcodes::from([
        (VoltageL1, 0x1100),       // 32b float
        (VoltageL2, 0x1102),       // 32b float
        (VoltageL3, 0x1104),       // 32b float
        (CurrentL1, 0x1200),       // 32b float
        (CurrentL2, 0x1202),       // 32b float
        (CurrentL3, 0x1204),       // 32b float
        (Power, 0x1314),           // 32b float
        (PowerL1, 0x1320),         // 32b float
        (PowerL2, 0x1322),         // 32b float
        (PowerL3, 0x1324),         // 32b float
        (ReactivePower, 0x1316),   // 32b float
        (ReactivePowerL1, 0x1328), // 32b float
        (ReactivePowerL2, 0x132A), // 32b float
        (ReactivePowerL3, 0x132C), // 32b float
        (ApparentPower, 0x1318),   // 32b float
        (ApparentPowerL1, 0x1330), // 32b float
        (ApparentPowerL2, 0x1332), // 32b float
        (ApparentPowerL3, 0x1334), // 32b float
        (Import, 0x2000),          // 64b double
        (ImportL1, 0x2010),        // 64b double
        (ImportL2, 0x2014),        // 64b double
        (ImportL3, 0x2018),        // 64b double
        (Export, 0x2004),          // 64b double
        (ExportL1, 0x2020),        // 64b double
        (ExportL2, 0x2024),        // 64b double
        (ExportL3, 0x2028),        // 64b double
        (CosphiL1, 0x130C),        // 32b float
        (CosphiL2, 0x130E),        // 32b float
        (CosphiL3, 0x1310),        // 32b float
        (Frequency, 0x1004),       // 32b float
    ])
}

/// PQ Plus driver
#[derive(Debug, Clone)]
pub struct PqPlusProducer {
    opcodes: Opcodes,
    options: DriverOptions,
}

impl PqPlusProducer {
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
        Snip::new(&self.opcodes, FunctionCode::ReadHoldingRegisters)
    }

    fn scale_for(&self, measurement: Measurement) -> Option<f64> {
        match measurement {
            CurrentL1 | CurrentL2 | CurrentL3 => self.options.current_scale,
            _ => None,
        }
    }
}

impl Default for PqPlusProducer {
    fn default() -> Self {
        Self::new(DriverOptions::default())
    }
}

impl Producer for PqPlusProducer {
    fn description(&self) -> &'static str {
        "PQ Plus meters and power quality analyzers"
    }

    fn opcodes(&self) -> &Opcodes {
        &self.opcodes
    }

    fn probe(&self) -> Result<Operation> {
        self.snip().float32(VoltageL1, None)
    }

    fn produce(&self) -> Result<Vec<Operation>> {
        let snip = self.snip();
        let mut ops = Vec::with_capacity(26);

        for m in CYCLE.iter().flat_map(|group| group.iter().copied()) {
            ops.push(snip.float32(m, self.scale_for(m))?);
        }

        if self.options.energy {
            for m in ENERGY {
                ops.push(snip.float64(m, None)?);
            }
        }

        Ok(ops)
    }
}

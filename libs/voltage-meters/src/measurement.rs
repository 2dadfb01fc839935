//! Measurement Catalog
//!
//! Vendor-neutral identifiers for the quantities a meter can expose. Every
//! driver maps its registers onto these, so the same logical quantity read
//! from two different vendors' meters is addressable identically downstream.
//!
//! Entries may be appended; existing entries are never removed or reordered.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::MeterError;

macro_rules! measurements {
    ($($name:ident => ($desc:expr, $unit:expr)),+ $(,)?) => {
        /// Vendor-neutral measurement identifier
        ///
        /// Ordering follows declaration order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Measurement {
            $($name,)+
        }

        impl Measurement {
            /// Every catalog entry in declaration order
            pub const ALL: &'static [Measurement] = &[$(Measurement::$name,)+];

            /// Stable identifier used for logging and correlation
            pub fn name(&self) -> &'static str {
                match self {
                    $(Measurement::$name => stringify!($name),)+
                }
            }

            /// Human-readable description
            pub fn description(&self) -> &'static str {
                match self {
                    $(Measurement::$name => $desc,)+
                }
            }

            /// Physical unit of the decoded value
            pub fn unit(&self) -> &'static str {
                match self {
                    $(Measurement::$name => $unit,)+
                }
            }
        }
    };
}

measurements! {
    Frequency => ("Frequency", "Hz"),

    Current => ("Current", "A"),
    CurrentL1 => ("L1 Current", "A"),
    CurrentL2 => ("L2 Current", "A"),
    CurrentL3 => ("L3 Current", "A"),

    Voltage => ("Voltage", "V"),
    VoltageL1 => ("L1 Voltage", "V"),
    VoltageL2 => ("L2 Voltage", "V"),
    VoltageL3 => ("L3 Voltage", "V"),

    Power => ("Power", "W"),
    PowerL1 => ("L1 Power", "W"),
    PowerL2 => ("L2 Power", "W"),
    PowerL3 => ("L3 Power", "W"),
    ImportPower => ("Import Power", "W"),
    ExportPower => ("Export Power", "W"),

    ReactivePower => ("Reactive Power", "var"),
    ReactivePowerL1 => ("L1 Reactive Power", "var"),
    ReactivePowerL2 => ("L2 Reactive Power", "var"),
    ReactivePowerL3 => ("L3 Reactive Power", "var"),

    ApparentPower => ("Apparent Power", "VA"),
    ApparentPowerL1 => ("L1 Apparent Power", "VA"),
    ApparentPowerL2 => ("L2 Apparent Power", "VA"),
    ApparentPowerL3 => ("L3 Apparent Power", "VA"),

    Cosphi => ("Cosphi", ""),
    CosphiL1 => ("L1 Cosphi", ""),
    CosphiL2 => ("L2 Cosphi", ""),
    CosphiL3 => ("L3 Cosphi", ""),

    Thd => ("Average voltage to neutral THD", "%"),
    ThdL1 => ("L1 Voltage to neutral THD", "%"),
    ThdL2 => ("L2 Voltage to neutral THD", "%"),
    ThdL3 => ("L3 Voltage to neutral THD", "%"),

    Sum => ("Total Sum", "kWh"),
    SumL1 => ("L1 Sum", "kWh"),
    SumL2 => ("L2 Sum", "kWh"),
    SumL3 => ("L3 Sum", "kWh"),

    Import => ("Total Import", "kWh"),
    ImportL1 => ("L1 Import", "kWh"),
    ImportL2 => ("L2 Import", "kWh"),
    ImportL3 => ("L3 Import", "kWh"),

    Export => ("Total Export", "kWh"),
    ExportL1 => ("L1 Export", "kWh"),
    ExportL2 => ("L2 Export", "kWh"),
    ExportL3 => ("L3 Export", "kWh"),

    ReactiveSum => ("Total Reactive Sum", "kvarh"),
    ReactiveImport => ("Reactive Import", "kvarh"),
    ReactiveExport => ("Reactive Export", "kvarh"),
}

impl Measurement {
    /// Description including the unit, e.g. `L1 Voltage (V)`
    pub fn label(&self) -> String {
        match self.unit() {
            "" => self.description().to_string(),
            unit => format!("{} ({})", self.description(), unit),
        }
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Measurement {
    type Err = MeterError;

    /// Exact, case-sensitive match against `name()`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Measurement::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| MeterError::UnknownMeasurement(s.to_string()))
    }
}

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Measurement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

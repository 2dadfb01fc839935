//! Driver Consistency Tests
//!
//! Every built-in driver is checked against the properties pollers rely on:
//! - all produced operations resolve through the driver's own opcode table
//! - produce() is deterministic across calls
//! - probe() is a single voltage read with a matching register count
//! - no measurement is read twice per cycle

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::collections::HashSet;
use voltage_meters::{
    bytes::{f32_to_registers, registers_to_bytes},
    drivers::pqplus,
    ByteOrder, DriverOptions, DriverRegistry, FunctionCode, Measurement, Producer,
};

fn option_sets() -> Vec<DriverOptions> {
    vec![
        DriverOptions::default(),
        DriverOptions::default().with_energy(),
        DriverOptions::default().with_current_scale(1000.0),
        DriverOptions::default().with_current_scale(0.001).with_energy(),
    ]
}

fn all_producers() -> Vec<(String, Box<dyn Producer>)> {
    let registry = DriverRegistry::with_builtin_drivers().unwrap();
    let mut producers = Vec::new();
    for name in registry.names() {
        for options in option_sets() {
            producers.push((name.clone(), registry.create(&name, &options).unwrap()));
        }
    }
    producers
}

// ============================================================================
// Properties across all drivers
// ============================================================================

#[test]
fn test_every_operation_resolves_opcode() {
    for (name, producer) in all_producers() {
        for op in producer.produce().unwrap() {
            let address = producer
                .opcodes()
                .opcode(op.measurement)
                .unwrap_or_else(|e| panic!("{}: {}", name, e));
            assert_eq!(address, op.address, "{} {}", name, op.measurement);
        }
    }
}

#[test]
fn test_produce_is_deterministic() {
    for (name, producer) in all_producers() {
        let first = producer.produce().unwrap();
        let second = producer.produce().unwrap();
        assert_eq!(first.len(), second.len(), "{}", name);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.address, b.address);
            assert_eq!(a.function_code, b.function_code);
            assert_eq!(a.register_count, b.register_count);
            assert_eq!(a.measurement, b.measurement);
        }
        assert_eq!(first, second);
    }
}

#[test]
fn test_probe_is_single_voltage_read() {
    let voltages = [
        Measurement::VoltageL1,
        Measurement::VoltageL2,
        Measurement::VoltageL3,
    ];
    for (name, producer) in all_producers() {
        let probe = producer.probe().unwrap();
        assert!(voltages.contains(&probe.measurement), "{}", name);
        assert_eq!(
            probe.register_count,
            probe.transform.encoding.register_count(),
            "{}",
            name
        );
    }
}

#[test]
fn test_no_duplicate_measurements() {
    for (name, producer) in all_producers() {
        let mut seen = HashSet::new();
        for op in producer.produce().unwrap() {
            assert!(seen.insert(op.measurement), "{} reads {} twice", name, op.measurement);
        }
    }
}

#[test]
fn test_register_count_matches_decode_width() {
    for (_, producer) in all_producers() {
        for op in producer.produce().unwrap() {
            assert_eq!(op.byte_len(), op.transform.encoding.byte_len());
        }
    }
}

// ============================================================================
// PQ Plus register map
// ============================================================================

#[test]
fn test_pqplus_documented_layout() {
    let registry = DriverRegistry::with_builtin_drivers().unwrap();
    let producer = registry.lookup(pqplus::MODEL).unwrap();

    assert_eq!(
        producer.opcodes().opcode(Measurement::VoltageL1).unwrap(),
        0x1100
    );

    let ops = producer.produce().unwrap();
    let addresses: Vec<u16> = ops.iter().map(|op| op.address).collect();
    assert_eq!(
        addresses,
        vec![
            0x1100, 0x1102, 0x1104, // voltages
            0x1200, 0x1202, 0x1204, // currents
            0x1314, 0x1320, 0x1322, 0x1324, // active power
            0x1316, 0x1328, 0x132A, 0x132C, // reactive power
            0x1318, 0x1330, 0x1332, 0x1334, // apparent power
        ]
    );
    assert!(ops
        .iter()
        .all(|op| op.function_code == FunctionCode::ReadHoldingRegisters));
}

#[test]
fn test_pqplus_voltage_round_trip() {
    let producer = DriverRegistry::with_builtin_drivers()
        .unwrap()
        .lookup("PQPLUS")
        .unwrap();
    let probe = producer.probe().unwrap();

    let bytes = registers_to_bytes(&f32_to_registers(230.50, ByteOrder::BigEndian));
    let reading = probe.decode(&bytes).unwrap();
    assert_eq!(reading.measurement, Measurement::VoltageL1);
    assert!((reading.value - 230.50).abs() < 1e-3);
}

#[test]
fn test_pqplus_current_scale() {
    let registry = DriverRegistry::with_builtin_drivers().unwrap();
    let producer = registry
        .create("PQPLUS", &DriverOptions::default().with_current_scale(0.001))
        .unwrap();
    let current = producer
        .produce()
        .unwrap()
        .into_iter()
        .find(|op| op.measurement == Measurement::CurrentL1)
        .unwrap();

    let bytes = registers_to_bytes(&f32_to_registers(12345.0, ByteOrder::BigEndian));
    let reading = current.decode(&bytes).unwrap();
    assert!((reading.value - 12.345).abs() < 1e-9);
}

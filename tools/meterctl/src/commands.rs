//! Command handlers

use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use std::path::Path;
use tracing::debug;
use voltage_meters::{
    load_config, registry, run_cycle, DriverOptions, Measurement, Operation, Producer,
    RegisterBank,
};

fn create(model: &str, options: &DriverOptions) -> Result<Box<dyn Producer>> {
    let registry = registry::global();
    registry
        .create(model, options)
        .with_context(|| format!("known models: {}", registry.names().join(", ")))
}

pub fn list_drivers() -> Result<()> {
    let registry = registry::global();
    println!("{}", "Registered meter drivers".bold());
    for name in registry.names() {
        let Some(producer) = registry.lookup(&name) else {
            continue;
        };
        println!(
            "  {:<10} {} ({} registers mapped)",
            name.green(),
            producer.description(),
            producer.opcodes().len()
        );
    }
    Ok(())
}

fn print_operation(index: Option<usize>, op: &Operation) {
    let prefix = match index {
        Some(i) => format!("{:>3}", i + 1),
        None => "  P".yellow().to_string(),
    };
    println!(
        "{} {:<16} {}  0x{:04X}  x{}  {:<8} {:<5} scale {}  {}",
        prefix,
        op.measurement.name().cyan(),
        op.function_code,
        op.address,
        op.register_count,
        op.transform.encoding.to_string(),
        op.transform.order.as_str(),
        op.transform.scale,
        op.measurement.label().dimmed()
    );
}

pub fn show_plan(model: &str, options: DriverOptions, json: bool) -> Result<()> {
    let producer = create(model, &options)?;
    let probe = producer.probe()?;
    let ops = producer.produce()?;

    if json {
        let plan = serde_json::json!({
            "model": model,
            "description": producer.description(),
            "options": options,
            "probe": probe,
            "operations": ops,
        });
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{} {}", model.green().bold(), producer.description());
    print_operation(None, &probe);
    for (i, op) in ops.iter().enumerate() {
        print_operation(Some(i), op);
    }
    let registers: usize = ops.iter().map(|op| usize::from(op.register_count)).sum();
    println!(
        "{} operations, {} registers per cycle",
        ops.len().to_string().bold(),
        registers
    );
    Ok(())
}

pub fn decode(model: &str, measurement: &str, raw: &str, options: DriverOptions) -> Result<()> {
    let measurement: Measurement = measurement.parse()?;
    let producer = create(model, &options)?;

    let mut ops = producer.produce()?;
    ops.push(producer.probe()?);
    let op = ops
        .into_iter()
        .find(|op| op.measurement == measurement)
        .ok_or_else(|| anyhow!("{} does not read {}", model, measurement))?;

    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    let bytes = hex::decode(&cleaned).with_context(|| format!("invalid hex: {}", raw))?;
    debug!("{} <- {:02X?}", op, bytes);

    let reading = op.decode(&bytes)?;
    println!(
        "{} = {} {}",
        reading.measurement.name().cyan(),
        reading.value.to_string().bold(),
        measurement.unit()
    );
    Ok(())
}

pub fn check_config(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let resolved = config.resolve_all(registry::global())?;

    for (device, producer) in &resolved {
        let cycle = producer.produce()?;
        println!(
            "{} {:<16} {:<8} slave {:<3} {} operations",
            "✓".green(),
            device.name,
            device.model,
            device.slave_id,
            cycle.len()
        );
    }
    println!("{} {} devices valid", "OK".green().bold(), resolved.len());
    Ok(())
}

/// Nominal reading used to fill the simulated register bank
fn nominal_value(m: Measurement) -> f64 {
    match m.unit() {
        "V" => 230.0,
        "A" => 10.0,
        "W" => 2300.0,
        "var" => 150.0,
        "VA" => 2305.0,
        "Hz" => 50.0,
        "kWh" | "kvarh" => 1000.0,
        _ => 1.0,
    }
}

pub async fn simulate(
    model: &str,
    options: DriverOptions,
    fail_at: &[u16],
    json: bool,
) -> Result<()> {
    let producer = create(model, &options)?;
    let bank = RegisterBank::new();
    for op in producer.produce()? {
        bank.load(&op, nominal_value(op.measurement));
    }
    for address in fail_at {
        bank.fail_at(*address);
    }

    let report = run_cycle(producer.as_ref(), &bank).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for reading in &report.readings {
            println!(
                "  {:<16} {:>12.3} {}",
                reading.measurement.name().cyan(),
                reading.value,
                reading.measurement.unit()
            );
        }
        for failure in &report.failures {
            println!(
                "  {:<16} {} {}",
                failure.operation.measurement.name().red(),
                "FAILED".red().bold(),
                failure.error
            );
        }
    }

    if !report.is_complete() {
        bail!(
            "{} of {} operations failed",
            report.failures.len(),
            report.attempted()
        );
    }
    Ok(())
}

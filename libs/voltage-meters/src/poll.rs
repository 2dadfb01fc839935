//! Poll cycle runner
//!
//! Drives one producer through one cycle against an [`OperationExecutor`]
//! supplied by the transport layer. Failures are per operation: a read that
//! fails or returns the wrong number of bytes is recorded and the cycle
//! moves on to the next operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{MeterError, Result};
use crate::operation::{Operation, Reading};
use crate::producer::Producer;

/// Transport seam: executes one register read
///
/// Implementations own framing, timeouts and retries. Errors should be
/// returned as [`MeterError::Transport`].
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    /// Read the registers described by `op` and return them in register order
    async fn execute(&self, op: &Operation) -> Result<Vec<u8>>;
}

/// One operation that did not yield a reading
#[derive(Debug, Clone, Serialize)]
pub struct OperationFailure {
    pub operation: Operation,
    #[serde(serialize_with = "serialize_error")]
    pub error: MeterError,
}

fn serialize_error<S: serde::Serializer>(
    err: &MeterError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub readings: Vec<Reading>,
    pub failures: Vec<OperationFailure>,
}

impl CycleReport {
    /// True when every operation produced a reading
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of operations attempted
    pub fn attempted(&self) -> usize {
        self.readings.len() + self.failures.len()
    }
}

/// Run one full poll cycle
///
/// Only a driver defect (from `produce()`) aborts the cycle; transport and
/// decode failures are collected in the report.
pub async fn run_cycle<E>(producer: &dyn Producer, executor: &E) -> Result<CycleReport>
where
    E: OperationExecutor + ?Sized,
{
    let started_at = Utc::now();
    let operations = producer.produce()?;
    debug!(
        "Polling {} operations for {}",
        operations.len(),
        producer.description()
    );

    let mut readings = Vec::with_capacity(operations.len());
    let mut failures = Vec::new();

    for op in operations {
        match read(&op, executor).await {
            Ok(reading) => readings.push(reading),
            Err(error) => failures.push(OperationFailure {
                operation: op,
                error,
            }),
        }
    }

    Ok(CycleReport {
        started_at,
        readings,
        failures,
    })
}

/// Execute the producer's probe operation
pub async fn probe<E>(producer: &dyn Producer, executor: &E) -> Result<Reading>
where
    E: OperationExecutor + ?Sized,
{
    let op = producer.probe()?;
    read(&op, executor).await
}

async fn read<E>(op: &Operation, executor: &E) -> Result<Reading>
where
    E: OperationExecutor + ?Sized,
{
    let bytes = executor.execute(op).await.inspect_err(|e| {
        warn!("{} read failed: {}", op, e);
    })?;

    op.decode(&bytes).inspect_err(|e| {
        error!("{} returned malformed response: {}", op, e);
    })
}

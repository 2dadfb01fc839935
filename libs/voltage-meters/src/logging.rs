//! Console logging setup
//!
//! Output format: `timestamp [LEVEL] module: message`, the bracketed
//! level style of the other VoltageEMS services plus the emitting module.

use tracing::Level;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::error::{MeterError, Result};

/// Bracketed level tag and its ANSI color
fn level_style(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::TRACE => ("[TRACE]", "\x1b[35m"),
        Level::DEBUG => ("[DEBUG]", "\x1b[34m"),
        Level::INFO => ("[INFO]", "\x1b[32m"),
        Level::WARN => ("[WARN]", "\x1b[33m"),
        Level::ERROR => ("[ERROR]", "\x1b[31m"),
    }
}

/// Module path without the crate name: `voltage_meters::poll` → `poll`
fn short_target(target: &str) -> &str {
    target.split_once("::").map_or(target, |(_, module)| module)
}

/// `timestamp [LEVEL] module: message`
///
/// Example: `2025-12-02T00:50:44.809Z [INFO] registry: Registered 2 meter drivers`
struct MeterLogFormat;

impl<S, N> FormatEvent<S, N> for MeterLogFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let (tag, color) = level_style(*meta.level());

        write!(writer, "{} ", chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;
        if writer.has_ansi_escapes() {
            write!(writer, "{}{}\x1b[0m ", color, tag)?;
        } else {
            write!(writer, "{} ", tag)?;
        }
        write!(writer, "{}: ", short_target(meta.target()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `default_level`. Logs go to stderr so
/// command output on stdout stays machine readable.
pub fn init_logging(default_level: &str, ansi: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| MeterError::config(format!("Invalid log level {}: {}", default_level, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(MeterLogFormat)
                .with_ansi(ansi)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| MeterError::config(format!("Logging already initialised: {}", e)))
}

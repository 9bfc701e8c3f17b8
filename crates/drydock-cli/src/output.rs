//! Output renderers for command results.

use anyhow::anyhow;
use drydock_app::{Admission, IdentityStatus, MaintenanceReport, PauseReason};
use drydock_fsops::CapacityState;
use drydock_identity::ServiceId;
use drydock_telemetry::MetricsSnapshot;
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

/// Renders `text`, or `value` with the process counters attached under `metrics`.
fn emit(
    format: OutputFormat,
    text: String,
    mut value: Value,
    metrics: &MetricsSnapshot,
) -> CliResult<String> {
    match format {
        OutputFormat::Text => Ok(text),
        OutputFormat::Json => {
            let counters = serde_json::to_value(metrics)
                .map_err(|err| CliError::failure(anyhow!("failed to encode metrics: {err}")))?;
            if let Value::Object(fields) = &mut value {
                fields.insert("metrics".to_string(), counters);
            }
            serde_json::to_string_pretty(&value)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
        }
    }
}

pub(crate) fn render_initialized(
    volumes: usize,
    format: OutputFormat,
    metrics: &MetricsSnapshot,
) -> CliResult<String> {
    emit(
        format,
        format!("initialised {volumes} volume(s)"),
        json!({ "command": "init", "volumes": volumes }),
        metrics,
    )
}

pub(crate) fn render_cleaned(
    auto_clean: bool,
    format: OutputFormat,
    metrics: &MetricsSnapshot,
) -> CliResult<String> {
    let text = if auto_clean {
        "volumes cleaned"
    } else {
        "automatic cleaning disabled; nothing to do"
    };
    emit(
        format,
        text.to_string(),
        json!({ "command": "clean", "auto_clean": auto_clean }),
        metrics,
    )
}

pub(crate) fn render_capacity(
    state: CapacityState,
    budget_bytes: u64,
    format: OutputFormat,
    metrics: &MetricsSnapshot,
) -> CliResult<String> {
    emit(
        format,
        state.as_str().to_string(),
        json!({ "capacity": state.as_str(), "budget_bytes": budget_bytes }),
        metrics,
    )
}

pub(crate) fn render_service_id(
    service: &ServiceId,
    format: OutputFormat,
    metrics: &MetricsSnapshot,
) -> CliResult<String> {
    emit(
        format,
        service.to_string(),
        json!({ "service_id": service.as_str() }),
        metrics,
    )
}

pub(crate) fn render_identity(
    identity: &IdentityStatus,
    format: OutputFormat,
    metrics: &MetricsSnapshot,
) -> CliResult<String> {
    let (text, value) = match identity {
        IdentityStatus::Resolved(service) => (
            format!("ready; service {service}"),
            json!({ "identity": identity.as_str(), "service_id": service.as_str() }),
        ),
        IdentityStatus::Unresolved { kind } => (
            format!("ready; identity unresolved ({})", kind.as_str()),
            json!({ "identity": identity.as_str(), "failure": kind.as_str() }),
        ),
        IdentityStatus::NotConfigured => (
            "ready; identity not configured".to_string(),
            json!({ "identity": identity.as_str() }),
        ),
    };
    emit(format, text, value, metrics)
}

pub(crate) fn render_maintenance(
    report: &MaintenanceReport,
    format: OutputFormat,
    metrics: &MetricsSnapshot,
) -> CliResult<String> {
    let text = match report.admission {
        Admission::Accept => "accept".to_string(),
        Admission::Pause { reason } => format!("pause ({})", reason.as_str()),
    };
    let reason = report.admission.pause_reason().map(PauseReason::as_str);
    emit(
        format,
        text,
        json!({
            "run_id": report.run_id.to_string(),
            "admission": report.admission.as_str(),
            "reason": reason,
        }),
        metrics,
    )
}

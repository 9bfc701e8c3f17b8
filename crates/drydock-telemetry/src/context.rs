//! Process-level span helpers.
//!
//! # Design
//! - A single `worker` span is entered for the lifetime of the process so every log line
//!   carries the build SHA and, once known, the service identity of the container.
//! - The span is stored globally so the identity can be recorded after it resolves.

use once_cell::sync::OnceCell;
use tracing::{Span, field, span::Entered};

use crate::init::build_sha;

static PROCESS_SPAN: OnceCell<Span> = OnceCell::new();

/// Guard that keeps the process-level span entered for the lifetime of the guard.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the process-level tracing span, creating it on first use.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        let mode = mode.into();
        let span = PROCESS_SPAN.get_or_init(|| {
            tracing::info_span!(
                "worker",
                mode = %mode,
                build_sha = %build_sha(),
                service = field::Empty
            )
        });
        Self {
            _guard: span.enter(),
        }
    }
}

/// Tag the process span with the service that started this container.
///
/// No-op until a [`GlobalContextGuard`] has been created.
pub fn record_service_identity(service: &str) {
    if let Some(span) = PROCESS_SPAN.get() {
        span.record("service", field::display(service));
    }
}

/// Span wrapping the maintenance performed after one job run.
#[must_use]
pub fn maintenance_span(run_id: &str) -> Span {
    tracing::info_span!("maintenance", run_id = %run_id)
}

//! Worker lifecycle: startup, per-run maintenance, and cached identity.

use drydock_config::WorkerConfig;
use drydock_fsops::{CapacityState, VolumeManager};
use drydock_identity::{IdentityError, IdentityResolver, ServiceId};
use drydock_telemetry::{Metrics, maintenance_span, record_service_identity};
use tokio::sync::OnceCell;
use tracing::{Instrument, info, warn};
use uuid::Uuid;

use crate::admission::{Admission, IdentityStatus, PauseReason};
use crate::error::{AppError, AppResult};

/// Result of [`WorkerContext::startup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// Identity established during startup.
    pub identity: IdentityStatus,
}

/// Result of [`WorkerContext::after_run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Identifier tagging this maintenance pass in logs.
    pub run_id: Uuid,
    /// Whether the worker may claim another job.
    pub admission: Admission,
}

/// Everything a worker process needs between jobs.
///
/// Volume permission and cleanup failures are fatal and propagate. A capacity
/// measurement failure pauses admission. Identity failures only degrade logging.
pub struct WorkerContext {
    config: WorkerConfig,
    volumes: VolumeManager,
    resolver: IdentityResolver,
    metrics: Metrics,
    identity: OnceCell<IdentityStatus>,
}

impl WorkerContext {
    /// Build production components from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the metrics registry or the agent HTTP client cannot be built.
    pub fn from_config(config: WorkerConfig) -> AppResult<Self> {
        let metrics =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        let volumes = VolumeManager::new(config.volumes.clone(), metrics.clone());
        let resolver = IdentityResolver::from_settings(&config.identity)
            .map_err(|err| AppError::identity_backend("identity.agent_client", err))?;
        Ok(Self::with_components(config, volumes, resolver, metrics))
    }

    /// Assemble a context from pre-built components.
    #[must_use]
    pub fn with_components(
        config: WorkerConfig,
        volumes: VolumeManager,
        resolver: IdentityResolver,
        metrics: Metrics,
    ) -> Self {
        Self {
            config,
            volumes,
            resolver,
            metrics,
            identity: OnceCell::new(),
        }
    }

    /// Configuration the context was built from.
    #[must_use]
    pub const fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Metrics shared by every component of this context.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Open permissions on every volume.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Volume`] when any volume could not be opened.
    pub async fn initialize_volumes(&self) -> AppResult<()> {
        self.volumes
            .initialize()
            .await
            .map_err(|err| AppError::volume("volumes.initialize", err))
    }

    /// Empty every volume and the temporary root.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Volume`] when any directory could not be emptied.
    pub async fn clean_volumes(&self) -> AppResult<()> {
        self.volumes
            .clean()
            .await
            .map_err(|err| AppError::volume("volumes.clean", err))
    }

    /// Classify disk usage against the budget.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Volume`] when usage cannot be measured.
    pub async fn check_capacity(&self) -> AppResult<CapacityState> {
        self.volumes
            .check_capacity()
            .await
            .map_err(|err| AppError::volume("volumes.check_capacity", err))
    }

    /// Resolve the service that started this container, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::IdentityNotConfigured`] without container and cluster names,
    /// or [`AppError::Identity`] when resolution fails.
    pub async fn resolve_identity(&self) -> AppResult<ServiceId> {
        match self.try_resolve().await {
            None => Err(AppError::IdentityNotConfigured),
            Some(resolved) => resolved.map_err(|err| AppError::identity("identity.resolve", err)),
        }
    }

    /// Identity of this worker, resolved once and cached for the process lifetime.
    pub async fn identity(&self) -> IdentityStatus {
        self.identity
            .get_or_init(|| self.load_identity())
            .await
            .clone()
    }

    /// Prepare the worker before its first job.
    ///
    /// Volume initialisation and identity resolution run concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Volume`] when volume permissions could not be opened.
    /// Identity failures never fail startup.
    pub async fn startup(&self) -> AppResult<StartupReport> {
        info!(
            volumes = self.config.volumes.volumes.len(),
            "worker startup"
        );
        let (initialized, identity) = tokio::join!(self.initialize_volumes(), self.identity());
        initialized?;
        info!(
            identity = identity.as_str(),
            service = identity.service_id().map(ServiceId::as_str),
            "worker ready"
        );
        Ok(StartupReport { identity })
    }

    /// Maintenance performed after every job run: clean, then decide admission.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Volume`] when cleaning fails. A failed capacity
    /// measurement is reported as [`PauseReason::MeasurementFailed`] instead.
    pub async fn after_run(&self) -> AppResult<MaintenanceReport> {
        let run_id = Uuid::new_v4();
        let admission = self
            .maintain()
            .instrument(maintenance_span(&run_id.to_string()))
            .await?;
        Ok(MaintenanceReport { run_id, admission })
    }

    async fn maintain(&self) -> AppResult<Admission> {
        self.clean_volumes().await?;
        let admission = match self.volumes.check_capacity().await {
            Ok(CapacityState::Ok) => Admission::Accept,
            Ok(CapacityState::Full) => Admission::Pause {
                reason: PauseReason::DiskFull,
            },
            Err(err) => {
                warn!(error = %err, detail = ?err, "capacity unknown; pausing admission");
                Admission::Pause {
                    reason: PauseReason::MeasurementFailed,
                }
            }
        };
        info!(
            admission = admission.as_str(),
            reason = admission.pause_reason().map(PauseReason::as_str),
            "maintenance complete"
        );
        Ok(admission)
    }

    async fn try_resolve(&self) -> Option<Result<ServiceId, IdentityError>> {
        let target = self.config.identity.target()?;
        let resolved = self
            .resolver
            .resolve(target.container_name, target.cluster_name)
            .await;
        match &resolved {
            Ok(service) => {
                self.metrics.inc_identity_resolution("resolved");
                record_service_identity(service.as_str());
            }
            Err(err) => self.metrics.inc_identity_resolution(err.kind().as_str()),
        }
        Some(resolved)
    }

    async fn load_identity(&self) -> IdentityStatus {
        match self.try_resolve().await {
            None => {
                info!("container or cluster name not configured; skipping identity resolution");
                IdentityStatus::NotConfigured
            }
            Some(Ok(service)) => {
                info!(service = service.as_str(), "service identity resolved");
                IdentityStatus::Resolved(service)
            }
            Some(Err(err)) => {
                let kind = err.kind();
                if err.is_not_found() {
                    info!("container not listed by the local agent; running without identity");
                } else {
                    warn!(
                        kind = kind.as_str(),
                        error = %err,
                        detail = ?err,
                        "identity resolution failed; continuing degraded"
                    );
                }
                IdentityStatus::Unresolved { kind }
            }
        }
    }
}

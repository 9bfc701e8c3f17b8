//! Volume lifecycle management between job runs.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use drydock_config::VolumeSettings;
use drydock_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::error::{VolumeError, VolumeResult};
use crate::fanout::{Outcomes, await_all};
use crate::fs::{LocalFs, OPEN_MODE, VolumeFs};
use crate::probe::{DiskUsageProbe, DuProbe};

/// Two-state classification of disk usage against the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityState {
    /// Usage is at or below the budget.
    Ok,
    /// Usage exceeds the budget.
    Full,
}

impl CapacityState {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Full => "full",
        }
    }

    /// Whether the worker should stop taking new work.
    #[must_use]
    pub const fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Classify `used_bytes` against `budget_bytes`. Usage equal to the budget is still `Ok`.
#[must_use]
pub const fn classify(used_bytes: u64, budget_bytes: u64) -> CapacityState {
    if used_bytes > budget_bytes {
        CapacityState::Full
    } else {
        CapacityState::Ok
    }
}

/// Keeps a worker's scratch volumes writable, empty between runs, and within the disk budget.
///
/// `clean` must not be called concurrently with itself on the same manager.
#[derive(Clone)]
pub struct VolumeManager {
    settings: VolumeSettings,
    fs: Arc<dyn VolumeFs>,
    probe: Arc<dyn DiskUsageProbe>,
    metrics: Metrics,
}

impl VolumeManager {
    /// Manager backed by the local filesystem and the `du` probe.
    #[must_use]
    pub fn new(settings: VolumeSettings, metrics: Metrics) -> Self {
        let probe = DuProbe::from_settings(&settings);
        Self::with_backends(settings, Arc::new(LocalFs), Arc::new(probe), metrics)
    }

    /// Manager with injected filesystem and probe backends.
    #[must_use]
    pub fn with_backends(
        settings: VolumeSettings,
        fs: Arc<dyn VolumeFs>,
        probe: Arc<dyn DiskUsageProbe>,
        metrics: Metrics,
    ) -> Self {
        Self {
            settings,
            fs,
            probe,
            metrics,
        }
    }

    /// Settings the manager was built from.
    #[must_use]
    pub const fn settings(&self) -> &VolumeSettings {
        &self.settings
    }

    /// Open every volume's permissions so job processes running as any user can write.
    ///
    /// All volumes are processed concurrently. Volumes that succeed keep their new mode
    /// even when another volume fails.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Permission`] naming the first configured volume that failed.
    pub async fn initialize(&self) -> VolumeResult<()> {
        let fs = &self.fs;
        let outcomes = await_all(self.settings.volumes.iter().cloned(), |path| async move {
            fs.set_mode(&path, OPEN_MODE).await
        })
        .await;

        self.settle("initialize", outcomes, VolumeError::permission)?;
        info!(
            volumes = self.settings.volumes.len(),
            mode = %format!("{OPEN_MODE:o}"),
            "volume permissions initialised"
        );
        Ok(())
    }

    /// Empty every volume and the temporary-files root.
    ///
    /// Does nothing when automatic cleaning is disabled. A clean target nested inside
    /// another one is left in place by the outer removal.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Cleanup`] naming the first directory that could not be emptied.
    pub async fn clean(&self) -> VolumeResult<()> {
        if !self.settings.auto_clean {
            debug!("automatic cleaning disabled; leaving volumes untouched");
            self.metrics.inc_volume_operation("clean", "skipped");
            return Ok(());
        }

        let targets = self.clean_targets();
        let fs = &self.fs;
        let keep = targets.as_slice();
        let outcomes = await_all(targets.iter().cloned(), |path| async move {
            fs.empty_dir(&path, keep).await
        })
        .await;

        self.settle("clean", outcomes, VolumeError::cleanup)?;
        info!(directories = targets.len(), "volumes cleaned");
        Ok(())
    }

    /// Classify root filesystem usage against the disk budget.
    ///
    /// The measurement covers the whole usage root, not only the managed volumes.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Measurement`] when usage cannot be measured.
    pub async fn check_capacity(&self) -> VolumeResult<CapacityState> {
        let budget = self.settings.max_disk_bytes;
        let used = match self.probe.measure().await {
            Ok(used) => used,
            Err(err) => {
                self.metrics.inc_capacity_check("unknown");
                return Err(err);
            }
        };

        let state = classify(used, budget);
        self.metrics.inc_capacity_check(state.as_str());
        debug!(
            used_bytes = used,
            budget_bytes = budget,
            state = state.as_str(),
            "disk usage measured"
        );
        if state.is_full() {
            warn!(
                used_bytes = used,
                budget_bytes = budget,
                "disk budget exceeded"
            );
        }
        Ok(state)
    }

    fn clean_targets(&self) -> Vec<PathBuf> {
        let mut targets = self.settings.volumes.clone();
        targets.push(self.settings.temp_root.clone());
        targets
    }

    fn settle(
        &self,
        operation: &'static str,
        outcomes: Outcomes<PathBuf, (), io::Error>,
        into_error: fn(PathBuf, io::Error) -> VolumeError,
    ) -> VolumeResult<()> {
        for (path, err) in outcomes.failures() {
            warn!(
                operation,
                path = %path.display(),
                error = %err,
                "volume operation failed"
            );
        }
        match outcomes.into_result() {
            Ok(_) => {
                self.metrics.inc_volume_operation(operation, "ok");
                Ok(())
            }
            Err((path, source)) => {
                self.metrics.inc_volume_operation(operation, "failed");
                Err(into_error(path, source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        SetMode(PathBuf, u32),
        EmptyDir(PathBuf),
    }

    #[derive(Default)]
    struct RecordingFs {
        calls: Mutex<Vec<Call>>,
        failing: HashSet<PathBuf>,
    }

    impl RecordingFs {
        fn failing(paths: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: paths.iter().map(PathBuf::from).collect(),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls
                .lock()
                .map(|calls| calls.clone())
                .unwrap_or_default()
        }

        fn record(&self, call: Call, path: &Path) -> io::Result<()> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
            if self.failing.contains(path) {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl VolumeFs for RecordingFs {
        async fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
            self.record(Call::SetMode(path.to_path_buf(), mode), path)
        }

        async fn empty_dir(&self, path: &Path, _keep: &[PathBuf]) -> io::Result<()> {
            self.record(Call::EmptyDir(path.to_path_buf()), path)
        }
    }

    struct FixedProbe {
        bytes: u64,
    }

    impl FixedProbe {
        const fn new(bytes: u64) -> Self {
            Self { bytes }
        }
    }

    #[async_trait]
    impl DiskUsageProbe for FixedProbe {
        async fn measure(&self) -> VolumeResult<u64> {
            Ok(self.bytes)
        }
    }

    fn settings(volumes: &[&str]) -> VolumeSettings {
        VolumeSettings {
            volumes: volumes.iter().map(PathBuf::from).collect(),
            temp_root: PathBuf::from("/scratch/tmp"),
            max_disk_bytes: 1_000,
            ..VolumeSettings::default()
        }
    }

    fn manager_with(
        settings: VolumeSettings,
        fs: Arc<RecordingFs>,
        probe: Arc<FixedProbe>,
    ) -> TestResult<VolumeManager> {
        Ok(VolumeManager::with_backends(
            settings,
            fs,
            probe,
            Metrics::new()?,
        ))
    }

    fn temp_dir() -> TestResult<TempDir> {
        Ok(tempfile::Builder::new().prefix("drydock-fsops-").tempdir()?)
    }

    #[test]
    fn classify_uses_strict_inequality() {
        assert_eq!(classify(0, 1_000), CapacityState::Ok);
        assert_eq!(classify(1_000, 1_000), CapacityState::Ok);
        assert_eq!(classify(1_001, 1_000), CapacityState::Full);
        assert_eq!(classify(u64::MAX, u64::MAX), CapacityState::Ok);
    }

    #[tokio::test]
    async fn check_capacity_boundary_is_ok_at_budget() -> TestResult<()> {
        let at_budget = manager_with(
            settings(&[]),
            Arc::new(RecordingFs::default()),
            Arc::new(FixedProbe::new(1_000)),
        )?;
        assert_eq!(at_budget.check_capacity().await?, CapacityState::Ok);

        let over_budget = manager_with(
            settings(&[]),
            Arc::new(RecordingFs::default()),
            Arc::new(FixedProbe::new(1_001)),
        )?;
        assert_eq!(over_budget.check_capacity().await?, CapacityState::Full);
        assert_eq!(over_budget.metrics.snapshot().capacity_full, 1);
        Ok(())
    }

    #[tokio::test]
    async fn check_capacity_reports_measurement_failure() -> TestResult<()> {
        let manager = VolumeManager::with_backends(
            settings(&[]),
            Arc::new(RecordingFs::default()),
            Arc::new(DuProbe::new("echo", "/")),
            Metrics::new()?,
        );
        let err = manager.check_capacity().await.err();
        assert!(matches!(err, Some(VolumeError::Measurement { .. })));
        assert_eq!(manager.metrics.snapshot().capacity_unknown, 1);
        Ok(())
    }

    #[tokio::test]
    async fn initialize_names_the_single_failing_volume() -> TestResult<()> {
        let fs = Arc::new(RecordingFs::failing(&["/scratch/b"]));
        let manager = manager_with(
            settings(&["/scratch/a", "/scratch/b", "/scratch/c"]),
            Arc::clone(&fs),
            Arc::new(FixedProbe::new(0)),
        )?;

        let err = manager.initialize().await.err();
        match err {
            Some(VolumeError::Permission { path, source }) => {
                assert_eq!(path, PathBuf::from("/scratch/b"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => return Err(format!("unexpected result: {other:?}").into()),
        }

        let calls = fs.calls();
        for volume in ["/scratch/a", "/scratch/b", "/scratch/c"] {
            assert!(calls.contains(&Call::SetMode(PathBuf::from(volume), OPEN_MODE)));
        }
        assert_eq!(manager.metrics.snapshot().volume_operations_failed, 1);
        Ok(())
    }

    #[tokio::test]
    async fn clean_disabled_never_touches_the_filesystem() -> TestResult<()> {
        let fs = Arc::new(RecordingFs::default());
        let mut disabled = settings(&["/scratch/a", "/scratch/b"]);
        disabled.auto_clean = false;
        let manager = manager_with(disabled, Arc::clone(&fs), Arc::new(FixedProbe::new(0)))?;

        manager.clean().await?;
        assert!(fs.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn clean_targets_volumes_and_temp_root() -> TestResult<()> {
        let fs = Arc::new(RecordingFs::default());
        let manager = manager_with(
            settings(&["/scratch/a", "/scratch/b"]),
            Arc::clone(&fs),
            Arc::new(FixedProbe::new(0)),
        )?;

        manager.clean().await?;
        let calls = fs.calls();
        assert_eq!(calls.len(), 3);
        for target in ["/scratch/a", "/scratch/b", "/scratch/tmp"] {
            assert!(calls.contains(&Call::EmptyDir(PathBuf::from(target))));
        }
        Ok(())
    }

    #[tokio::test]
    async fn clean_failure_names_offending_path() -> TestResult<()> {
        let fs = Arc::new(RecordingFs::failing(&["/scratch/tmp"]));
        let manager = manager_with(
            settings(&["/scratch/a"]),
            Arc::clone(&fs),
            Arc::new(FixedProbe::new(0)),
        )?;

        let err = manager.clean().await.err();
        assert!(matches!(
            err,
            Some(VolumeError::Cleanup { ref path, .. }) if path == Path::new("/scratch/tmp")
        ));
        assert_eq!(fs.calls().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn initialize_then_clean_leaves_volumes_empty_and_writable() -> TestResult<()> {
        let root = temp_dir()?;
        let volumes: Vec<PathBuf> = ["work", "cache"]
            .iter()
            .map(|name| root.path().join(name))
            .collect();
        let temp_root = root.path().join("tmp");
        for dir in volumes.iter().chain(std::iter::once(&temp_root)) {
            fs::create_dir_all(dir.join("leftover/nested"))?;
            fs::write(dir.join("leftover/nested/output.log"), b"job residue")?;
            fs::write(dir.join("scratch.bin"), [1_u8; 64])?;
        }

        let settings = VolumeSettings {
            volumes: volumes.clone(),
            temp_root: temp_root.clone(),
            ..VolumeSettings::default()
        };
        let manager = VolumeManager::with_backends(
            settings,
            Arc::new(LocalFs),
            Arc::new(FixedProbe::new(0)),
            Metrics::new()?,
        );

        manager.initialize().await?;
        manager.clean().await?;
        manager.clean().await?;

        for dir in volumes.iter().chain(std::iter::once(&temp_root)) {
            assert!(dir.is_dir(), "{} missing", dir.display());
            assert_eq!(fs::read_dir(dir)?.count(), 0);
        }
        for volume in &volumes {
            let probe_file = volume.join("next-job.txt");
            fs::write(&probe_file, b"ok")?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mode = fs::metadata(volume)?.permissions().mode() & 0o777;
                assert_eq!(mode, OPEN_MODE);
            }
        }
        assert_eq!(manager.metrics.snapshot().volume_operations_ok, 3);
        Ok(())
    }

    #[tokio::test]
    async fn clean_fails_when_a_volume_is_missing() -> TestResult<()> {
        let root = temp_dir()?;
        let present = root.path().join("present");
        fs::create_dir_all(&present)?;
        fs::write(present.join("file"), b"x")?;
        let missing = root.path().join("missing");
        let temp_root = root.path().join("tmp");
        fs::create_dir_all(&temp_root)?;

        let manager = VolumeManager::with_backends(
            VolumeSettings {
                volumes: vec![missing.clone(), present],
                temp_root,
                ..VolumeSettings::default()
            },
            Arc::new(LocalFs),
            Arc::new(FixedProbe::new(0)),
            Metrics::new()?,
        );

        let err = manager.clean().await.err();
        match err {
            Some(VolumeError::Cleanup { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => return Err(format!("unexpected result: {other:?}").into()),
        }
        Ok(())
    }

    #[tokio::test]
    async fn clean_keeps_volumes_nested_under_temp_root() -> TestResult<()> {
        let root = temp_dir()?;
        let temp_root = root.path().join("tmp");
        let work = temp_root.join("jobs/work");
        fs::create_dir_all(&work)?;
        fs::write(work.join("artifact.tar"), b"payload")?;
        fs::create_dir_all(temp_root.join("jobs/stale"))?;
        fs::write(temp_root.join("jobs/stale/old.log"), b"residue")?;
        fs::write(temp_root.join("session.sock"), b"")?;

        let manager = VolumeManager::with_backends(
            VolumeSettings {
                volumes: vec![work.clone()],
                temp_root: temp_root.clone(),
                ..VolumeSettings::default()
            },
            Arc::new(LocalFs),
            Arc::new(FixedProbe::new(0)),
            Metrics::new()?,
        );

        manager.initialize().await?;
        manager.clean().await?;
        assert!(work.is_dir());
        assert_eq!(fs::read_dir(&work)?.count(), 0);
        assert!(!temp_root.join("session.sock").exists());
        assert!(!temp_root.join("jobs/stale").exists());

        fs::write(work.join("second-run.txt"), b"x")?;
        manager.clean().await?;
        assert!(work.is_dir());
        assert_eq!(fs::read_dir(&work)?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn clean_with_duplicate_volume_settles_both_removals() -> TestResult<()> {
        let root = temp_dir()?;
        let shared = root.path().join("shared");
        let temp_root = root.path().join("tmp");
        fs::create_dir_all(&temp_root)?;
        for index in 0..32 {
            let nested = shared.join(format!("job-{index}/out"));
            fs::create_dir_all(&nested)?;
            fs::write(nested.join("result.bin"), [0_u8; 512])?;
            fs::write(shared.join(format!("top-{index}.log")), b"line")?;
        }

        let manager = VolumeManager::with_backends(
            VolumeSettings {
                volumes: vec![shared.clone(), shared.clone()],
                temp_root,
                ..VolumeSettings::default()
            },
            Arc::new(LocalFs),
            Arc::new(FixedProbe::new(0)),
            Metrics::new()?,
        );

        match manager.clean().await {
            Ok(()) => {}
            Err(VolumeError::Cleanup { path, .. }) => assert_eq!(path, shared),
            Err(other) => return Err(format!("unexpected result: {other:?}").into()),
        }
        assert!(shared.is_dir());
        assert_eq!(fs::read_dir(&shared)?.count(), 0);

        manager.clean().await?;
        assert!(shared.is_dir());
        Ok(())
    }
}

//! Disk usage measurement.
//!
//! The production probe shells out to `du -s -k <root>` and reports a single total in
//! KiB. Mounts below the root are included, so separately mounted volumes and `/tmp`
//! count toward the total.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use drydock_config::VolumeSettings;
use tokio::process::Command;
use tracing::warn;

use crate::error::{VolumeError, VolumeResult};

const KIB: u64 = 1024;
const DETAIL_LIMIT: usize = 256;

/// Source of the aggregate disk usage compared against the budget.
#[async_trait]
pub trait DiskUsageProbe: Send + Sync {
    /// Measure aggregate usage in bytes.
    async fn measure(&self) -> VolumeResult<u64>;
}

/// [`DiskUsageProbe`] running `du` against a root directory.
#[derive(Debug, Clone)]
pub struct DuProbe {
    program: String,
    root: PathBuf,
}

impl DuProbe {
    /// Probe `root` using `program` as the `du` binary.
    #[must_use]
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
        }
    }

    /// Probe configured through the worker's volume settings.
    #[must_use]
    pub fn from_settings(settings: &VolumeSettings) -> Self {
        Self::new(settings.du_program.clone(), settings.usage_root.clone())
    }

    fn failure(
        &self,
        reason: &'static str,
        detail: Option<String>,
        source: Option<std::io::Error>,
    ) -> VolumeError {
        VolumeError::Measurement {
            program: self.program.clone(),
            root: self.root.clone(),
            reason,
            detail,
            source,
        }
    }
}

#[async_trait]
impl DiskUsageProbe for DuProbe {
    async fn measure(&self) -> VolumeResult<u64> {
        let output = Command::new(&self.program)
            .arg("-s")
            .arg("-k")
            .arg(&self.root)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| self.failure("spawn_failed", None, Some(err)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_du_kib(&stdout) {
            Some(kib) => {
                if !output.status.success() {
                    // du exits non-zero when parts of the tree are unreadable but still prints a total.
                    warn!(
                        program = %self.program,
                        root = %self.root.display(),
                        status = %output.status,
                        stderr = %truncate(&String::from_utf8_lossy(&output.stderr)),
                        "disk usage measured with errors"
                    );
                }
                Ok(kib.saturating_mul(KIB))
            }
            None if !output.status.success() => Err(self.failure(
                "exit_status",
                Some(format!(
                    "{}: {}",
                    output.status,
                    truncate(&String::from_utf8_lossy(&output.stderr))
                )),
                None,
            )),
            None => Err(self.failure("unparseable_output", Some(truncate(&stdout)), None)),
        }
    }
}

/// Extract the KiB total from `du -s` output: the first field of the last non-empty line.
#[must_use]
pub fn parse_du_kib(output: &str) -> Option<u64> {
    output
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    trimmed.chars().take(DETAIL_LIMIT).collect()
}

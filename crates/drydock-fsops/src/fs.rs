//! Filesystem primitives used by the volume manager.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Mode applied to every volume so job processes running as any user can write into it.
pub const OPEN_MODE: u32 = 0o777;

/// Filesystem operations the volume manager issues against its volumes.
#[async_trait]
pub trait VolumeFs: Send + Sync {
    /// Set the permission bits of `path` to `mode`.
    async fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Remove everything inside `path`, keeping the directory itself.
    ///
    /// Entries listed in `keep` survive, as do the directories leading to them; only
    /// their siblings are removed. Fails when `path` does not exist or is not a
    /// directory.
    async fn empty_dir(&self, path: &Path, keep: &[PathBuf]) -> io::Result<()>;
}

/// [`VolumeFs`] backed by the local filesystem through `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

#[async_trait]
impl VolumeFs for LocalFs {
    async fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
        }
        #[cfg(not(unix))]
        {
            let _ = (path, mode);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "permission bits are only supported on unix",
            ))
        }
    }

    async fn empty_dir(&self, path: &Path, keep: &[PathBuf]) -> io::Result<()> {
        let mut pending = vec![path.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Err(err) if dir.as_path() != path && err.kind() == io::ErrorKind::NotFound => continue,
                entries => entries?,
            };
            while let Some(entry) = entries.next_entry().await? {
                let entry_path = entry.path();
                if keep.contains(&entry_path) {
                    continue;
                }
                let is_dir = match entry.file_type().await {
                    Ok(file_type) => file_type.is_dir(),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    Err(err) => return Err(err),
                };
                if is_dir && keep.iter().any(|kept| kept.starts_with(&entry_path)) {
                    pending.push(entry_path);
                    continue;
                }
                let removed = if is_dir {
                    tokio::fs::remove_dir_all(&entry_path).await
                } else {
                    tokio::fs::remove_file(&entry_path).await
                };
                match removed {
                    Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err),
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

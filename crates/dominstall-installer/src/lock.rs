use anyhow::{anyhow, Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::RegistryLayout;

/// Advisory lock over a registry root, released on drop. Never creates the
/// program directory itself.
#[derive(Debug)]
pub struct RegistryLock {
    path: PathBuf,
}

impl RegistryLock {
    pub fn acquire(layout: &RegistryLayout) -> Result<Self> {
        if !layout.program_dir().is_dir() {
            return Err(anyhow!(
                "program directory does not exist: {}",
                layout.program_dir().display()
            ));
        }
        let root = layout.registry_root();
        match fs::create_dir(&root) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to create install registry: {}", root.display())
                });
            }
        }

        let path = layout.lock_path();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(anyhow!(
                    "install registry is locked by pid {} (remove {} if no installer is running)",
                    read_holder_pid(&path).unwrap_or_else(|| "unknown".to_string()),
                    path.display()
                ));
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to create lock file: {}", path.display()));
            }
        };

        let lock = Self { path };
        writeln!(file, "{}", std::process::id())
            .with_context(|| format!("failed to write lock file: {}", lock.path.display()))?;
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!("failed to release lock {}: {err}", self.path.display());
            }
        }
    }
}

fn read_holder_pid(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let pid = raw.trim();
    if pid.is_empty() {
        return None;
    }
    Some(pid.to_string())
}

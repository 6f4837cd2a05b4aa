use std::ops::AddAssign;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use dominstall_core::SoftwareDescriptor;

use crate::deploy::DEFAULT_MAX_DEPTH;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub copied: u64,
    pub errors: u64,
}

impl AddAssign for DeployReport {
    fn add_assign(&mut self, other: Self) {
        self.copied += other.copied;
        self.errors += other.errors;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallReport {
    pub file_log_found: bool,
    pub removed: u64,
    pub missing: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionComparePolicy {
    #[default]
    ExactString,
    /// Compare parsed build and hotfix numbers. Falls back to string
    /// equality when either side does not parse.
    BuildNumber,
}

impl VersionComparePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactString => "string",
            Self::BuildNumber => "build",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::ExactString),
            "build" => Ok(Self::BuildNumber),
            _ => Err(anyhow!(
                "invalid version compare policy: {value} (expected 'string' or 'build')"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    pub program_dir: PathBuf,
    pub data_dir: PathBuf,
    pub notes_ini: Option<String>,
    pub payload_root: PathBuf,
    pub host_version: String,
    pub max_depth: u32,
    pub compare_policy: VersionComparePolicy,
    pub command_line: Vec<String>,
}

impl InstallerConfig {
    pub fn new(
        program_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        payload_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program_dir: program_dir.into(),
            data_dir: data_dir.into(),
            notes_ini: None,
            payload_root: payload_root.into(),
            host_version: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            compare_policy: VersionComparePolicy::default(),
            command_line: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    NoRegistryEntry,
    SameVersionInstalled { installed: SoftwareDescriptor },
    OlderVersionInstalled { installed: SoftwareDescriptor },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled {
        name: String,
        version: String,
    },
    Installed {
        name: String,
        version: String,
        previous_version: Option<String>,
        overlay: Option<PathBuf>,
        deploy: DeployReport,
        uninstall: Option<UninstallReport>,
        file_log: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    NotInstalled {
        name: String,
    },
    Removed {
        name: String,
        version: String,
        uninstall: UninstallReport,
    },
}

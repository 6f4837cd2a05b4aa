use anyhow::{anyhow, Context, Result};
use std::io;
use std::path::Path;

use dominstall_core::{parse_version, validate_product_name, SoftwareDescriptor};
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::deploy::TreeDeployer;
use crate::fs::{InstallFs, LogMode};
use crate::overlay::select_best_overlay;
use crate::receipts::{read_descriptor, read_installed_descriptors};
use crate::types::{
    DeployReport, InstallOutcome, InstallState, InstallerConfig, RemoveOutcome,
    VersionComparePolicy,
};
use crate::uninstall::uninstall_files;
use crate::{PayloadLayout, RegistryLayout};

pub struct InstallStateManager<'a> {
    fs: &'a dyn InstallFs,
    config: InstallerConfig,
    registry: RegistryLayout,
    payload: PayloadLayout,
}

impl<'a> InstallStateManager<'a> {
    pub fn new(fs: &'a dyn InstallFs, config: InstallerConfig) -> Result<Self> {
        if config.program_dir.as_os_str().is_empty() {
            return Err(anyhow!("no program directory found"));
        }
        if config.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("no data directory found"));
        }
        if !fs.is_dir(&config.program_dir) {
            return Err(anyhow!(
                "program directory does not exist: {}",
                config.program_dir.display()
            ));
        }
        if !fs.is_dir(&config.data_dir) {
            return Err(anyhow!(
                "data directory does not exist: {}",
                config.data_dir.display()
            ));
        }

        let registry = RegistryLayout::new(&config.program_dir);
        let payload = PayloadLayout::new(&config.payload_root);
        Ok(Self {
            fs,
            config,
            registry,
            payload,
        })
    }

    pub fn registry(&self) -> &RegistryLayout {
        &self.registry
    }

    pub fn read_payload_descriptor(&self) -> Result<SoftwareDescriptor> {
        let path = self.payload.install_ini_path();
        read_descriptor(self.fs, &path)?.ok_or_else(|| {
            anyhow!(
                "no install configuration found: cannot open {}",
                path.display()
            )
        })
    }

    pub fn read_installed_descriptor(&self, name: &str) -> Result<Option<SoftwareDescriptor>> {
        let installed = read_descriptor(self.fs, &self.registry.install_ini_path(name))?;
        Ok(installed.filter(|descriptor| !descriptor.version.is_empty()))
    }

    pub fn detect_state(&self, new: &SoftwareDescriptor) -> Result<InstallState> {
        let Some(installed) = self.read_installed_descriptor(&new.name)? else {
            return Ok(InstallState::NoRegistryEntry);
        };

        if same_release(&installed.version, &new.version, self.config.compare_policy) {
            Ok(InstallState::SameVersionInstalled { installed })
        } else {
            Ok(InstallState::OlderVersionInstalled { installed })
        }
    }

    pub fn list_installed(&self) -> Result<Vec<SoftwareDescriptor>> {
        read_installed_descriptors(self.fs, &self.registry)
    }

    /// Payload descriptor that an install would use. Fails on every fatal
    /// configuration problem without touching the filesystem.
    pub fn check_install(&self) -> Result<SoftwareDescriptor> {
        let new = self.read_payload_descriptor()?;
        new.ensure_installable()?;
        Ok(new)
    }

    pub fn resolve_remove_target(&self, name: Option<&str>) -> Result<String> {
        let name = match name.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self.read_payload_descriptor()?.name,
        };
        if name.is_empty() {
            return Err(anyhow!("no software name found"));
        }
        validate_product_name(&name)?;
        Ok(name)
    }

    pub fn install(&self) -> Result<InstallOutcome> {
        let new = self.check_install()?;

        let previous = match self.detect_state(&new)? {
            InstallState::SameVersionInstalled { installed } => {
                info!("{} {} already installed", installed.name, installed.version);
                return Ok(InstallOutcome::AlreadyInstalled {
                    name: new.name,
                    version: installed.version,
                });
            }
            InstallState::OlderVersionInstalled { installed } => Some(installed),
            InstallState::NoRegistryEntry => None,
        };

        let entry_dir = self.registry.entry_dir(&new.name);
        self.fs.create_dir_all(&entry_dir).with_context(|| {
            format!("failed to create registry entry: {}", entry_dir.display())
        })?;

        let install_log_path = self.registry.install_log_path(&new.name);
        let mut audit = AuditLog::new(
            self.fs
                .open_log(&install_log_path, LogMode::Truncate)
                .with_context(|| {
                    format!("failed to open install log: {}", install_log_path.display())
                })?,
        );
        self.write_run_header(&mut audit);

        let file_log_path = self.registry.file_log_path(&new.name);
        let uninstall = match &previous {
            Some(installed) => {
                if self.config.compare_policy == VersionComparePolicy::BuildNumber
                    && new.parsed_version().build < installed.parsed_version().build
                {
                    warn!(
                        "{}: payload {} is older than installed {}",
                        new.name, new.version, installed.version
                    );
                }
                info!("updating {} {} -> {}", new.name, installed.version, new.version);
                audit.line(format!(
                    "Updating {} -> {}",
                    installed.version, new.version
                ));
                audit.line(format!("Removing via [{}]", file_log_path.display()));
                let report = uninstall_files(self.fs, &file_log_path, &mut audit);
                delete_if_present(self.fs, &file_log_path, &mut audit);
                Some(report)
            }
            None => {
                info!("installing {} {}", new.name, new.version);
                audit.line(format!("Installing {}", new.version));
                None
            }
        };

        let mut file_log = self
            .fs
            .open_log(&file_log_path, LogMode::Truncate)
            .with_context(|| format!("failed to open file log: {}", file_log_path.display()))?;

        let deployer = TreeDeployer::new(self.fs, self.config.max_depth);
        let mut deploy = self.deploy_payload(&deployer, &self.payload, &mut *file_log, &mut audit)?;

        let host_build = parse_version(&self.config.host_version).build;
        let overlay = select_best_overlay(self.fs, self.payload.root(), host_build);
        if let Some(overlay) = &overlay {
            info!(
                "applying overlay {} (build {})",
                overlay.path.display(),
                overlay.build
            );
            audit.line(format!("InstallDirVersion={}", overlay.path.display()));
            let overlay_payload = PayloadLayout::new(&overlay.path);
            deploy += self.deploy_payload(&deployer, &overlay_payload, &mut *file_log, &mut audit)?;
        }
        drop(file_log);

        audit.line(format!("FilesCopied={}", deploy.copied));
        audit.line(format!("FileCopyErrors={}", deploy.errors));

        let installed_ini = self.registry.install_ini_path(&new.name);
        self.fs
            .copy_file(&self.payload.install_ini_path(), &installed_ini, true)
            .with_context(|| {
                format!(
                    "failed to record installed descriptor: {}",
                    installed_ini.display()
                )
            })?;

        Ok(InstallOutcome::Installed {
            name: new.name,
            version: new.version,
            previous_version: previous.map(|installed| installed.version),
            overlay: overlay.map(|overlay| overlay.path),
            deploy,
            uninstall,
            file_log: file_log_path,
        })
    }

    /// Replays the stored file-log for `name` (or the payload's product when
    /// no name is given), then drops `install.ini` and `file.log`. The
    /// `install.log` history is kept.
    pub fn remove(&self, name: Option<&str>) -> Result<RemoveOutcome> {
        let name = self.resolve_remove_target(name)?;

        let Some(installed) = self.read_installed_descriptor(&name)? else {
            info!("{name} has no registry entry");
            return Ok(RemoveOutcome::NotInstalled { name });
        };

        let install_log_path = self.registry.install_log_path(&name);
        let mut audit = match self.fs.open_log(&install_log_path, LogMode::Append) {
            Ok(writer) => AuditLog::new(writer),
            Err(err) => {
                warn!("cannot open {}: {err}", install_log_path.display());
                AuditLog::disabled()
            }
        };

        let file_log_path = self.registry.file_log_path(&name);
        info!(
            "removing {name} {} via {}",
            installed.version,
            file_log_path.display()
        );
        audit.line(format!(
            "Removing {} via [{}]",
            installed.version,
            file_log_path.display()
        ));

        let uninstall = uninstall_files(self.fs, &file_log_path, &mut audit);
        delete_if_present(self.fs, &self.registry.install_ini_path(&name), &mut audit);
        delete_if_present(self.fs, &file_log_path, &mut audit);
        audit.line(format!(
            "Removed={} FilesDeleted={} FilesMissing={} DeleteErrors={}",
            installed.version, uninstall.removed, uninstall.missing, uninstall.failed
        ));

        Ok(RemoveOutcome::Removed {
            name,
            version: installed.version,
            uninstall,
        })
    }

    fn deploy_payload(
        &self,
        deployer: &TreeDeployer<'_>,
        payload: &PayloadLayout,
        file_log: &mut dyn io::Write,
        audit: &mut AuditLog,
    ) -> Result<DeployReport> {
        let mut report = deployer.deploy(
            &payload.program_tree(),
            &self.config.program_dir,
            file_log,
            audit,
        )?;
        report += deployer.deploy(&payload.data_tree(), &self.config.data_dir, file_log, audit)?;
        Ok(report)
    }

    fn write_run_header(&self, audit: &mut AuditLog) {
        audit.line("-- Command-Line Arguments --");
        for arg in &self.config.command_line {
            audit.line(arg);
        }
        audit.line("-- Command-Line Arguments --");
        audit.line("");
        audit.line("-- Parameters --");
        audit.line(format!("ProgramDir={}", self.config.program_dir.display()));
        audit.line(format!("DataDir={}", self.config.data_dir.display()));
        audit.line(format!(
            "NotesIni={}",
            self.config.notes_ini.as_deref().unwrap_or_default()
        ));
        audit.line(format!("InstallDir={}", self.payload.root().display()));
        audit.line(format!("HostVersion={}", self.config.host_version));
        audit.line(format!("Compare={}", self.config.compare_policy.as_str()));
    }
}

fn same_release(installed: &str, new: &str, policy: VersionComparePolicy) -> bool {
    match policy {
        VersionComparePolicy::ExactString => installed == new,
        VersionComparePolicy::BuildNumber => {
            let installed_version = parse_version(installed);
            let new_version = parse_version(new);
            if installed_version.build.is_unknown() || new_version.build.is_unknown() {
                return installed == new;
            }
            installed_version == new_version
        }
    }
}

fn delete_if_present(fs: &dyn InstallFs, path: &Path, audit: &mut AuditLog) {
    match fs.delete_file(path) {
        Ok(()) => debug!("deleted {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            warn!("cannot delete {}: {err}", path.display());
            audit.line(format!("Cannot delete file: {}: {err}", path.display()));
        }
    }
}

mod audit;
mod deploy;
mod file_log;
mod fs;
mod layout;
mod lock;
mod manager;
mod overlay;
mod receipts;
mod types;
mod uninstall;

pub use audit::AuditLog;
pub use deploy::{TreeDeployer, DEFAULT_MAX_DEPTH};
pub use file_log::{append_file_log_entry, read_file_log_paths, FileLogPaths, FILE_LOG_ERROR_PREFIX};
pub use fs::{FsEntry, InstallFs, LogMode, StdFs};
pub use layout::{default_payload_root, PayloadLayout, RegistryLayout};
pub use lock::RegistryLock;
pub use manager::InstallStateManager;
pub use overlay::{select_best_overlay, OverlayMatch, OVERLAY_DIR_MARKER};
pub use receipts::{read_descriptor, read_installed_descriptors};
pub use types::{
    DeployReport, InstallOutcome, InstallState, InstallerConfig, RemoveOutcome, UninstallReport,
    VersionComparePolicy,
};
pub use uninstall::uninstall_files;

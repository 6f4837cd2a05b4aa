use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

const REGISTRY_DIR_NAME: &str = ".install-reg";
const INSTALL_INI_NAME: &str = "install.ini";
const INSTALL_LOG_NAME: &str = "install.log";
const FILE_LOG_NAME: &str = "file.log";
const LOCK_FILE_NAME: &str = ".lock";
const PROGRAM_TREE_NAME: &str = "domino-bin";
const DATA_TREE_NAME: &str = "domino-data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLayout {
    program_dir: PathBuf,
}

impl RegistryLayout {
    pub fn new(program_dir: impl Into<PathBuf>) -> Self {
        Self {
            program_dir: program_dir.into(),
        }
    }

    pub fn program_dir(&self) -> &Path {
        &self.program_dir
    }

    pub fn registry_root(&self) -> PathBuf {
        self.program_dir.join(REGISTRY_DIR_NAME)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.registry_root().join(LOCK_FILE_NAME)
    }

    pub fn entry_dir(&self, name: &str) -> PathBuf {
        self.registry_root().join(name)
    }

    pub fn install_ini_path(&self, name: &str) -> PathBuf {
        self.entry_dir(name).join(INSTALL_INI_NAME)
    }

    pub(crate) fn install_ini_for_entry(&self, entry_name: &OsStr) -> PathBuf {
        self.registry_root().join(entry_name).join(INSTALL_INI_NAME)
    }

    pub fn install_log_path(&self, name: &str) -> PathBuf {
        self.entry_dir(name).join(INSTALL_LOG_NAME)
    }

    pub fn file_log_path(&self, name: &str) -> PathBuf {
        self.entry_dir(name).join(FILE_LOG_NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadLayout {
    root: PathBuf,
}

impl PayloadLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn install_ini_path(&self) -> PathBuf {
        self.root.join(INSTALL_INI_NAME)
    }

    pub fn program_tree(&self) -> PathBuf {
        self.root.join(PROGRAM_TREE_NAME)
    }

    pub fn data_tree(&self) -> PathBuf {
        self.root.join(DATA_TREE_NAME)
    }
}

pub fn default_payload_root() -> Result<PathBuf> {
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        return Ok(dir);
    }

    std::env::current_dir().context("cannot resolve payload directory from current directory")
}

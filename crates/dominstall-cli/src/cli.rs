use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use dominstall_installer::{
    default_payload_root, InstallerConfig, VersionComparePolicy, DEFAULT_MAX_DEPTH,
};

pub(crate) const MAX_WAIT_SECONDS: u64 = 60;
pub(crate) const LOG_FILTER_ENV: &str = "DOMINSTALL_LOG";

const ENV_PROGRAM_DIR: &str = "autoinstall_DominoBin";
const ENV_DATA_DIR: &str = "autoinstall_DominoData";
const ENV_NOTES_INI: &str = "autoinstall_DominoNotesIni";
const ENV_HOST_VERSION: &str = "autoinstall_DominoVersion";
const ENV_HOST_BUILD: &str = "autoinstall_DominoBuild";
const ENV_SERVICE: &str = "autoinstall_DominoService";
const ENV_TRUSTED_KEY: &str = "autoinstall_TrustedKey";

/// Long options deployment scripts pass with a single dash (`-name=x`).
const LEGACY_LONG_FLAGS: [&str; 16] = [
    "name",
    "data",
    "bin",
    "wait",
    "check",
    "sigcheck",
    "list",
    "remove",
    "help",
    "payload",
    "host-version",
    "trusted-key",
    "max-depth",
    "compare",
    "json",
    "verbose",
];

#[derive(Parser, Debug)]
#[command(name = "dominstall")]
#[command(
    about = "Installs, upgrades and removes add-on software on a Domino server",
    long_about = None
)]
pub(crate) struct Cli {
    /// Product name for --remove (defaults to the payload's install.ini)
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Explicit program (binary) directory override
    #[arg(long, value_name = "DIR")]
    pub(crate) bin: Option<PathBuf>,
    /// Explicit data directory override
    #[arg(long, value_name = "DIR")]
    pub(crate) data: Option<PathBuf>,
    /// Payload root holding install.ini, domino-bin and domino-data
    #[arg(long, value_name = "DIR")]
    pub(crate) payload: Option<PathBuf>,
    #[arg(long, value_name = "VERSION")]
    pub(crate) host_version: Option<String>,
    /// Hex Ed25519 public key for signature checks
    #[arg(long, value_name = "HEX")]
    pub(crate) trusted_key: Option<String>,
    /// Seconds to wait before exiting, at most 60
    #[arg(long, value_name = "SECONDS", default_value_t = 0, value_parser = parse_wait_seconds)]
    pub(crate) wait: u64,
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub(crate) max_depth: u32,
    /// How an installed version is compared with the payload: string or build
    #[arg(long, default_value = "string", value_parser = parse_compare_policy)]
    pub(crate) compare: VersionComparePolicy,
    /// List installed software
    #[arg(long, conflicts_with_all = ["remove", "check", "sigcheck"])]
    pub(crate) list: bool,
    /// Remove an installed application
    #[arg(long, conflicts_with_all = ["check", "sigcheck"])]
    pub(crate) remove: bool,
    /// Report the signature status of one file
    #[arg(long, value_name = "FILE", conflicts_with = "sigcheck")]
    pub(crate) check: Option<PathBuf>,
    /// Report the signature status of every executable below a directory
    #[arg(long, value_name = "DIR")]
    pub(crate) sigcheck: Option<PathBuf>,
    /// Print --list output as JSON
    #[arg(long, requires = "list")]
    pub(crate) json: bool,
    #[arg(short, long, action = ArgAction::Count)]
    pub(crate) verbose: u8,
}

/// Leading digits only, like the scripts' historical `atoi` reading: `5s` is
/// 5 and an unreadable value is 0.
fn parse_wait_seconds(value: &str) -> Result<u64, String> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let seconds = digits
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .fold(0_u64, |total, ch| {
            total
                .saturating_mul(10)
                .saturating_add(u64::from(ch.to_digit(10).unwrap_or(0)))
        });
    if negative {
        return Ok(0);
    }
    Ok(seconds.min(MAX_WAIT_SECONDS))
}

fn parse_compare_policy(value: &str) -> Result<VersionComparePolicy, String> {
    VersionComparePolicy::parse(value).map_err(|err| err.to_string())
}

/// Rewrites `-name=x`, `-list`, `-help` and `-?` into their `--` spellings so
/// existing deployment scripts keep working. Short flags such as `-v` pass
/// through untouched.
pub(crate) fn normalize_legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 {
                return arg;
            }
            let normalized = arg.to_str().and_then(normalize_legacy_arg);
            normalized.map_or(arg, OsString::from)
        })
        .collect()
}

fn normalize_legacy_arg(raw: &str) -> Option<String> {
    if raw == "-?" {
        return Some("--help".to_string());
    }
    let body = raw.strip_prefix('-')?;
    if body.starts_with('-') {
        return None;
    }
    let key = body.split_once('=').map_or(body, |(key, _)| key);
    LEGACY_LONG_FLAGS
        .contains(&key)
        .then(|| format!("-{raw}"))
}

/// Host inputs after applying flag-over-environment precedence. Empty values
/// count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HostInputs {
    pub(crate) program_dir: Option<PathBuf>,
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) notes_ini: Option<String>,
    pub(crate) host_version: Option<String>,
    pub(crate) host_build: Option<String>,
    pub(crate) service: Option<String>,
    pub(crate) trusted_key: Option<String>,
}

pub(crate) fn resolve_host_inputs<F>(cli: &Cli, lookup: F) -> HostInputs
where
    F: Fn(&str) -> Option<String>,
{
    let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    HostInputs {
        program_dir: non_empty_path(cli.bin.clone())
            .or_else(|| env(ENV_PROGRAM_DIR).map(PathBuf::from)),
        data_dir: non_empty_path(cli.data.clone())
            .or_else(|| env(ENV_DATA_DIR).map(PathBuf::from)),
        notes_ini: env(ENV_NOTES_INI),
        host_version: non_empty(cli.host_version.clone()).or_else(|| env(ENV_HOST_VERSION)),
        host_build: env(ENV_HOST_BUILD),
        service: env(ENV_SERVICE),
        trusted_key: non_empty(cli.trusted_key.clone()).or_else(|| env(ENV_TRUSTED_KEY)),
    }
}

pub(crate) fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn non_empty_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|value| !value.as_os_str().is_empty())
}

pub(crate) fn installer_config(
    cli: &Cli,
    host: &HostInputs,
    command_line: Vec<String>,
) -> Result<InstallerConfig> {
    let payload_root = match &cli.payload {
        Some(payload) => payload.clone(),
        None => default_payload_root()?,
    };

    let mut config = InstallerConfig::new(
        host.program_dir.clone().unwrap_or_default(),
        host.data_dir.clone().unwrap_or_default(),
        payload_root,
    );
    config.notes_ini = host.notes_ini.clone();
    config.host_version = host.host_version.clone().unwrap_or_default();
    config.max_depth = cli.max_depth;
    config.compare_policy = cli.compare;
    config.command_line = command_line;
    Ok(config)
}

use anyhow::{Context, Result};
use dominstall_installer::{InstallStateManager, RegistryLock, StdFs};
use dominstall_security::{Ed25519SidecarVerifier, SignatureVerifier, TrustedKey};
use tracing::debug;

use crate::cli::{installer_config, process_env, resolve_host_inputs, Cli, HostInputs};
use crate::render::{
    current_output_style, format_host_report, format_install_outcome_lines,
    format_installed_lines, format_remove_outcome_lines, print_lines, print_status, OutputStyle,
};
use crate::signatures::{format_check_line, sweep_signatures, SIGCHECK_MAX_DEPTH};

pub(crate) fn run_cli(cli: &Cli, command_line: Vec<String>) -> Result<()> {
    let host = resolve_host_inputs(cli, process_env);
    run_with_host(cli, &host, command_line, current_output_style())
}

pub(crate) fn run_with_host(
    cli: &Cli,
    host: &HostInputs,
    command_line: Vec<String>,
    style: OutputStyle,
) -> Result<()> {
    if let Some(file) = &cli.check {
        let verifier = signature_verifier(host)?;
        println!("{}", format_check_line(file, &verifier.verify(file)));
        return Ok(());
    }
    if let Some(dir) = &cli.sigcheck {
        let verifier = signature_verifier(host)?;
        print_lines(&sweep_signatures(&StdFs, &verifier, dir, SIGCHECK_MAX_DEPTH));
        return Ok(());
    }

    let config = installer_config(cli, host, command_line)?;
    let fs = StdFs;
    let manager = InstallStateManager::new(&fs, config)?;
    print_lines(&format_host_report(host));

    if cli.list {
        return run_list(&manager, cli.json);
    }
    if cli.remove {
        return run_remove(&manager, cli.name.as_deref(), style);
    }
    if let Some(name) = &cli.name {
        debug!("--name={name} is ignored for install; the payload install.ini names the product");
    }
    run_install(&manager, style)
}

fn signature_verifier(host: &HostInputs) -> Result<Ed25519SidecarVerifier> {
    let trusted_key = host
        .trusted_key
        .as_deref()
        .map(TrustedKey::from_hex)
        .transpose()
        .context("invalid trusted signing key")?;
    Ok(Ed25519SidecarVerifier::new(trusted_key))
}

fn run_list(manager: &InstallStateManager<'_>, json: bool) -> Result<()> {
    let installed = manager.list_installed()?;
    if json {
        let rendered = serde_json::to_string_pretty(&installed)
            .context("failed to serialize installed software")?;
        println!("{rendered}");
        return Ok(());
    }

    println!();
    print_lines(&format_installed_lines(&installed));
    println!();
    Ok(())
}

fn run_remove(
    manager: &InstallStateManager<'_>,
    name: Option<&str>,
    style: OutputStyle,
) -> Result<()> {
    let name = manager.resolve_remove_target(name)?;
    let _lock = match manager.read_installed_descriptor(&name)? {
        Some(_) => Some(RegistryLock::acquire(manager.registry())?),
        None => None,
    };
    let outcome = manager.remove(Some(&name))?;
    print_lines(&format_remove_outcome_lines(&outcome, style));
    Ok(())
}

fn run_install(manager: &InstallStateManager<'_>, style: OutputStyle) -> Result<()> {
    manager.check_install()?;
    let _lock = RegistryLock::acquire(manager.registry())?;
    let outcome = manager.install()?;
    print_lines(&format_install_outcome_lines(&outcome, style));
    Ok(())
}

pub(crate) fn wait_before_exit(seconds: u64, style: OutputStyle) {
    if seconds == 0 {
        return;
    }
    print_status(
        style,
        "step",
        &format!("waiting {seconds} seconds before termination"),
    );
    std::thread::sleep(std::time::Duration::from_secs(seconds));
}

use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use dominstall_core::{parse_version, SoftwareDescriptor};
use dominstall_installer::{InstallOutcome, RemoveOutcome};

use crate::cli::HostInputs;

pub(crate) const INSTALLED_SOFTWARE_BANNER: &str = "--- Installed Software ---";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    output_style_for(
        std::env::var_os("NO_COLOR").is_some(),
        std::io::stdout().is_terminal(),
    )
}

pub(crate) fn output_style_for(no_color: bool, is_terminal: bool) -> OutputStyle {
    if no_color || !is_terminal {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

pub(crate) fn print_status(style: OutputStyle, status: &str, message: &str) {
    let line = match style {
        OutputStyle::Plain => render_status_line(style, status, message),
        OutputStyle::Rich => format!(
            "{} {message}",
            colorize(badge_style(status), status_badge(status))
        ),
    };
    println!("{line}");
}

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "error" => "[ERR]",
        _ => "[..]",
    }
}

fn badge_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "error" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightBlue,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) fn format_host_report(host: &HostInputs) -> Vec<String> {
    let version = host.host_version.as_deref().unwrap_or_default();
    let parsed = parse_version(version);
    let mut lines = vec![
        format!("ProgramDir: [{}]", display_path(host.program_dir.as_deref())),
        format!("Data Dir  : [{}]", display_path(host.data_dir.as_deref())),
        format!("Version   : [{version}]"),
        format!("Build     : {}", parsed.build),
        format!("Hotfix    : {}", parsed.hotfix),
    ];
    if let Some(service) = &host.service {
        lines.push(format!("Service   : [{service}]"));
    }
    if let Some(build) = &host.host_build {
        lines.push(format!("HostBuild : [{build}]"));
    }
    lines
}

fn display_path(path: Option<&std::path::Path>) -> String {
    path.map(|path| path.display().to_string())
        .unwrap_or_default()
}

pub(crate) fn format_installed_lines(installed: &[SoftwareDescriptor]) -> Vec<String> {
    let mut lines = Vec::with_capacity(installed.len() + 2);
    lines.push(INSTALLED_SOFTWARE_BANNER.to_string());
    for descriptor in installed {
        lines.push(format!(
            "{}|{}|{}",
            descriptor.name, descriptor.version, descriptor.description
        ));
    }
    lines.push(INSTALLED_SOFTWARE_BANNER.to_string());
    lines
}

pub(crate) fn format_install_outcome_lines(
    outcome: &InstallOutcome,
    style: OutputStyle,
) -> Vec<String> {
    match outcome {
        InstallOutcome::AlreadyInstalled { name, version } => vec![render_status_line(
            style,
            "ok",
            &format!("[{name}] latest version {version} already installed, 0 files copied"),
        )],
        InstallOutcome::Installed {
            name,
            version,
            previous_version,
            overlay,
            deploy,
            uninstall,
            file_log,
        } => {
            let mut lines = Vec::new();
            match previous_version {
                Some(previous) => lines.push(render_status_line(
                    style,
                    "step",
                    &format!("[{name}] updating {previous} -> {version}"),
                )),
                None => lines.push(render_status_line(
                    style,
                    "step",
                    &format!("[{name}] installing {version}"),
                )),
            }
            if let Some(uninstall) = uninstall {
                let status = if uninstall.failed > 0 { "warn" } else { "ok" };
                lines.push(render_status_line(
                    style,
                    status,
                    &format!(
                        "removed previous files: {} deleted, {} missing, {} failed",
                        uninstall.removed, uninstall.missing, uninstall.failed
                    ),
                ));
            }
            if let Some(overlay) = overlay {
                lines.push(render_status_line(
                    style,
                    "step",
                    &format!("InstallDirVersion={}", overlay.display()),
                ));
            }
            lines.push(render_status_line(
                style,
                "step",
                &format!("file log: {}", file_log.display()),
            ));

            let summary = format!(
                "[{name}] {version} installed: {} files copied, {} copy errors",
                deploy.copied, deploy.errors
            );
            let status = if deploy.errors > 0 { "warn" } else { "ok" };
            lines.push(render_status_line(style, status, &summary));
            lines
        }
    }
}

pub(crate) fn format_remove_outcome_lines(
    outcome: &RemoveOutcome,
    style: OutputStyle,
) -> Vec<String> {
    match outcome {
        RemoveOutcome::NotInstalled { name } => vec![render_status_line(
            style,
            "warn",
            &format!("cannot find specified software: [{name}]"),
        )],
        RemoveOutcome::Removed {
            name,
            version,
            uninstall,
        } => {
            let status = if uninstall.file_log_found && uninstall.failed == 0 {
                "ok"
            } else {
                "warn"
            };
            vec![render_status_line(
                style,
                status,
                &format!(
                    "[{name}] {version} removed: {} files deleted, {} missing, {} failed",
                    uninstall.removed, uninstall.missing, uninstall.failed
                ),
            )]
        }
    }
}

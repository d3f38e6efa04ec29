use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use vagrant_wrapper::{
    command_line, help_install_message, render_shim, write_shim, Wrapper, WrapperConfig,
    WrapperError, NOT_INSTALLED_EXIT,
};
use crate::cli::{WrapperCommand, CLI};

/// One searched directory and where it came from.
#[derive(Debug, Serialize)]
struct SearchEntry {
    path: PathBuf,
    source: &'static str,
}

#[derive(Debug, Serialize)]
struct WrapperInfo {
    tool: String,
    location: Option<PathBuf>,
    version: Option<String>,
    wrapper_mark: String,
    search_paths: Vec<SearchEntry>,
}

pub fn execute(cli: CLI) -> Result<ExitCode> {
    let config = build_config(&cli);
    match cli.command {
        WrapperCommand::InstallShim { path, force } => {
            execute_install_shim(&config, &path, force)
        }
        WrapperCommand::Check { requirement } => {
            execute_check(config, &requirement)
        }
        WrapperCommand::Which => {
            execute_which(&gated(config))
        }
        WrapperCommand::Version => {
            execute_version(&gated(config))
        }
        WrapperCommand::Paths { json } => {
            execute_paths(&gated(config), json)
        }
        WrapperCommand::Info { json } => {
            execute_info(&gated(config), json)
        }
        WrapperCommand::Output { args } => {
            execute_output(&gated(config), args)
        }
        WrapperCommand::Exec { dry_run, args } => {
            execute_exec(&gated(config), dry_run, args)
        }
    }
}

/// Builds the wrapper; a failed `--require` check prints help and exits.
fn gated(config: WrapperConfig) -> Wrapper {
    Wrapper::require_or_help_install_with(config)
}

/// Environment snapshot first, then command line flags on top.
fn build_config(cli: &CLI) -> WrapperConfig {
    let mut config = WrapperConfig::from_env().with_wrapper_env();
    if !cli.priority_paths.is_empty() {
        config = config.with_priority_paths(cli.priority_paths.iter().cloned());
    }
    if cli.require.is_some() {
        config = config.with_requirement(cli.require.clone());
    }
    config
}

fn not_installed(wrapper: &Wrapper) -> ExitCode {
    let config = wrapper.config();
    let err = WrapperError::NotInstalled {
        tool: config.display_name.clone(),
    };
    eprint!("{}", help_install_message(&err, &config.install_instructions()));
    ExitCode::from(NOT_INSTALLED_EXIT as u8)
}

fn search_entries(wrapper: &Wrapper) -> Vec<SearchEntry> {
    let defaults = wrapper.default_paths().iter().map(|path| SearchEntry {
        path: path.clone(),
        source: "default",
    });
    let env = wrapper.env_paths().iter().map(|path| SearchEntry {
        path: path.clone(),
        source: "env",
    });
    defaults.chain(env).collect()
}

pub fn execute_which(wrapper: &Wrapper) -> Result<ExitCode> {
    match wrapper.location() {
        Some(location) => {
            println!("{}", location.display());
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(not_installed(wrapper)),
    }
}

pub fn execute_version(wrapper: &Wrapper) -> Result<ExitCode> {
    match wrapper.version()? {
        Some(version) => {
            println!("{version}");
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(not_installed(wrapper)),
    }
}

pub fn execute_paths(wrapper: &Wrapper, json: bool) -> Result<ExitCode> {
    let entries = search_entries(wrapper);
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(ExitCode::SUCCESS);
    }
    for entry in entries {
        println!("{} ({})", entry.path.display(), entry.source.dimmed());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn execute_info(wrapper: &Wrapper, json: bool) -> Result<ExitCode> {
    let config = wrapper.config();
    let info = WrapperInfo {
        tool: config.tool_name.clone(),
        location: wrapper.location().map(Path::to_path_buf),
        version: wrapper.version()?,
        wrapper_mark: config.wrapper_mark.clone(),
        search_paths: search_entries(wrapper),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(ExitCode::SUCCESS);
    }
    println!("{}: {}", "tool".bold(), info.tool);
    match &info.location {
        Some(location) => println!("{}: {}", "location".bold(), location.display()),
        None => println!("{}: {}", "location".bold(), "not installed".red()),
    }
    match &info.version {
        Some(version) => println!("{}: {}", "version".bold(), version),
        None => println!("{}: {}", "version".bold(), "unknown".yellow()),
    }
    println!("{}: {}", "wrapper mark".bold(), info.wrapper_mark);
    println!("{}:", "search paths".bold());
    for entry in &info.search_paths {
        println!("  {} ({})", entry.path.display(), entry.source.dimmed());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn execute_check(config: WrapperConfig, requirement: &str) -> Result<ExitCode> {
    let config = config.with_requirement(None::<String>);
    let instructions = config.install_instructions();
    let wrapper = Wrapper::with_config(config)?;
    match wrapper.require_version(requirement) {
        Ok(version) => {
            println!("{} {version} satisfies {}", wrapper.config().display_name, requirement.trim());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprint!("{}", help_install_message(&err, &instructions));
            Ok(ExitCode::from(NOT_INSTALLED_EXIT as u8))
        }
    }
}

pub fn execute_output(wrapper: &Wrapper, args: Vec<OsString>) -> Result<ExitCode> {
    let Some(captured) = wrapper.get_output(&args)? else {
        return Ok(not_installed(wrapper));
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&captured.output)?;
    stdout.flush()?;
    let code = captured.code().unwrap_or(1);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

pub fn execute_exec(wrapper: &Wrapper, dry_run: bool, args: Vec<OsString>) -> Result<ExitCode> {
    if dry_run {
        let Some(location) = wrapper.location() else {
            return Ok(not_installed(wrapper));
        };
        println!("{}", command_line(location, args.as_slice()));
        return Ok(ExitCode::SUCCESS);
    }
    wrapper.execute(args)
}

pub fn execute_install_shim(config: &WrapperConfig, path: &Path, force: bool) -> Result<ExitCode> {
    let wrapper_exe = std::env::current_exe()
        .and_then(std::fs::canonicalize)
        .context("Could not determine the wrapper executable")?;
    let shim = render_shim(&wrapper_exe, &config.wrapper_mark, config.requirement.as_deref());
    let written = write_shim(path, &shim, force)?;
    println!("Shim written to: {}", written.display());
    Ok(ExitCode::SUCCESS)
}

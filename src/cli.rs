use std::ffi::OsString;
use std::path::PathBuf;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Version requirement the tool must meet, e.g. ">= 1.1" (default: $VAGRANT_WRAPPER_REQUIRE)
    #[clap(long, global = true)]
    pub(crate) require: Option<String>,
    /// Directory searched before PATH. Repeat to add more; replaces the built-in list
    #[clap(long = "priority-path", value_name = "DIR", global = true)]
    pub(crate) priority_paths: Vec<PathBuf>,
    /// More log output on stderr (-v debug, -vv trace)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    #[command(subcommand)]
    pub(crate) command: WrapperCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum WrapperCommand {
    /// Print the location of the tool that would be run
    Which,
    /// Print the version of the located tool
    Version,
    /// List the searched directories in order
    Paths {
        #[clap(long)]
        json: bool,
    },
    /// Show location, version and search paths
    Info {
        #[clap(long)]
        json: bool,
    },
    /// Check the located tool against a version requirement
    Check {
        requirement: String,
    },
    /// Run the tool and print its combined output, exiting with its exit code
    Output {
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    /// Replace this process with the tool
    Exec {
        /// Print the command line instead of running it
        #[clap(long)]
        dry_run: bool,
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    /// Write a shim at PATH that forwards to this wrapper and is skipped during search
    InstallShim {
        path: PathBuf,
        /// Overwrite an existing file
        #[clap(long)]
        force: bool,
    },
}

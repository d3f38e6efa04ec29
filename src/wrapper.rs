use std::convert::Infallible;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, warn};
use crate::config::WrapperConfig;
use crate::delegate::{self, CapturedOutput};
use crate::error::{Result, WrapperError};
use crate::locator::BinaryLocator;
use crate::requirement::Requirement;
use crate::version::{extract_version, Version};

/// Exit code used when the tool cannot be found.
pub const NOT_INSTALLED_EXIT: i32 = 1;
/// Exit code used when the tool was found but could not be started.
pub const EXEC_FAILED_EXIT: i32 = 126;

/// Flag passed to the tool to ask for its version.
const VERSION_FLAG: &str = "-v";

/// Finds the real tool, optionally checks its version, and forwards calls to it.
///
/// The search path is fixed at construction and the located binary is cached
/// for the lifetime of the wrapper.
#[derive(Debug)]
pub struct Wrapper {
    config: WrapperConfig,
    locator: BinaryLocator,
}

impl Wrapper {
    /// Builds a wrapper searching the built-in priority directories, then `PATH`.
    ///
    /// A given `requirement` is checked right away; without one this never fails.
    ///
    /// # Errors
    ///
    /// [`WrapperError::NotInstalled`], [`WrapperError::VersionMismatch`] or
    /// [`WrapperError::InvalidRequirement`] when a requirement was given.
    pub fn new(requirement: Option<&str>) -> Result<Self> {
        Self::with_config(WrapperConfig::from_env().with_requirement(requirement))
    }

    /// Builds a wrapper from an explicit configuration snapshot.
    pub fn with_config(config: WrapperConfig) -> Result<Self> {
        let wrapper = Self {
            locator: BinaryLocator::new(&config),
            config,
        };
        if let Some(expr) = wrapper.config.requirement.clone() {
            wrapper.require_version(&expr)?;
        }
        Ok(wrapper)
    }

    /// Like [`Wrapper::new`], but a failure is printed together with the
    /// install instructions and the process exits with code 1.
    pub fn require_or_help_install(requirement: Option<&str>) -> Self {
        Self::require_or_help_install_with(WrapperConfig::from_env().with_requirement(requirement))
    }

    pub fn require_or_help_install_with(config: WrapperConfig) -> Self {
        let instructions = config.install_instructions();
        match Self::with_config(config) {
            Ok(wrapper) => wrapper,
            Err(err) => {
                eprint!("{}", help_install_message(&err, &instructions));
                process::exit(NOT_INSTALLED_EXIT)
            }
        }
    }

    /// Checks the located tool against a requirement such as `>= 1.1`.
    ///
    /// Returns the version that satisfied it.
    pub fn require_version(&self, expression: &str) -> Result<Version> {
        let requirement = Requirement::parse(expression)?;
        let found = self.version()?.ok_or_else(|| WrapperError::NotInstalled {
            tool: self.config.display_name.clone(),
        })?;
        let mismatch = || WrapperError::VersionMismatch {
            tool: self.config.display_name.clone(),
            required: expression.trim().to_string(),
            found: found.clone(),
        };
        let version: Version = found.parse().map_err(|_| mismatch())?;
        if !requirement.satisfied_by(&version) {
            return Err(mismatch());
        }
        debug!("{} {version} satisfies {requirement}", self.config.display_name);
        Ok(version)
    }

    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    /// Where the tool was found, if anywhere.
    pub fn location(&self) -> Option<&Path> {
        self.locator.locate()
    }

    /// The tool's version as printed by `<tool> -v`.
    ///
    /// `None` when the tool is not installed or printed no version number.
    pub fn version(&self) -> Result<Option<String>> {
        let Some(captured) = self.get_output([VERSION_FLAG])? else {
            return Ok(None);
        };
        let version = extract_version(&captured.text());
        if version.is_none() {
            warn!(
                "{} printed no version number: {:?}",
                self.config.display_name,
                captured.text()
            );
        }
        Ok(version)
    }

    /// Runs the tool and returns its combined output, or `None` when it is not installed.
    pub fn get_output<I, S>(&self, args: I) -> Result<Option<CapturedOutput>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        match self.location() {
            Some(program) => delegate::capture(program, args).map(Some),
            None => Ok(None),
        }
    }

    /// Replaces this process with the tool.
    ///
    /// Only returns on failure, including [`WrapperError::NotInstalled`].
    pub fn exec<I, S>(&self, args: I) -> Result<Infallible>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = self.location().ok_or_else(|| WrapperError::NotInstalled {
            tool: self.config.display_name.clone(),
        })?;
        delegate::replace(program, args)
    }

    /// Replaces this process with the tool, or reports why it cannot and exits.
    ///
    /// A missing tool prints "`<Tool>` is not installed." with install
    /// instructions and exits with [`NOT_INSTALLED_EXIT`].
    pub fn execute<I, S>(&self, args: I) -> !
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        match self.exec(args) {
            Ok(never) => match never {},
            Err(err @ WrapperError::NotInstalled { .. }) => {
                eprint!("{}", help_install_message(&err, &self.config.install_instructions()));
                process::exit(NOT_INSTALLED_EXIT)
            }
            Err(err) => {
                eprintln!("{}: {err}", self.config.display_name);
                process::exit(EXEC_FAILED_EXIT)
            }
        }
    }

    pub fn default_paths(&self) -> &[PathBuf] {
        self.locator.search_path().default_paths()
    }

    pub fn env_paths(&self) -> &[PathBuf] {
        self.locator.search_path().env_paths()
    }

    /// Every searched directory, in order.
    pub fn search_paths(&self) -> Vec<&Path> {
        self.locator.search_path().iter().collect()
    }
}

/// The text printed before exiting on a failed check: the error on one line,
/// then the install instructions.
pub fn help_install_message(err: &WrapperError, instructions: &str) -> String {
    format!("{err}\n{instructions}")
}

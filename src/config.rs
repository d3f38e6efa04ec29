use std::ffi::OsString;
use std::path::PathBuf;
use crate::paths::{default_priority_paths, env_paths};

/// Name of the delegated tool's executable.
pub const TOOL_NAME: &str = "vagrant";
/// Name used in user-facing messages.
pub const DISPLAY_NAME: &str = "Vagrant";
/// Sentinel written on the last line of generated wrapper shims.
pub const WRAPPER_MARK: &str = "END VAGRANT WRAPPER";
pub const INSTALL_HINT: &str = "See http://www.vagrantup.com for instructions.";

/// Replaces the built-in priority directories when set (even when empty).
pub const PATHS_ENV: &str = "VAGRANT_WRAPPER_PATHS";
/// Default requirement expression, e.g. `>= 1.1`.
pub const REQUIRE_ENV: &str = "VAGRANT_WRAPPER_REQUIRE";

/// Construction-time settings of a [`crate::Wrapper`].
///
/// Holds a snapshot of everything the wrapper would otherwise read from the
/// process environment, so discovery stays deterministic once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperConfig {
    pub tool_name: String,
    pub display_name: String,
    pub wrapper_mark: String,
    pub install_hint: String,
    pub priority_paths: Vec<PathBuf>,
    /// Captured value of `PATH`.
    pub env_path: Option<OsString>,
    pub requirement: Option<String>,
    /// Also skip a candidate that resolves to the running executable.
    pub skip_current_exe: bool,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            tool_name: TOOL_NAME.to_string(),
            display_name: DISPLAY_NAME.to_string(),
            wrapper_mark: WRAPPER_MARK.to_string(),
            install_hint: INSTALL_HINT.to_string(),
            priority_paths: default_priority_paths(TOOL_NAME),
            env_path: None,
            requirement: None,
            skip_current_exe: false,
        }
    }
}

impl WrapperConfig {
    /// Snapshots `PATH`. Nothing else in the environment affects discovery.
    pub fn from_env() -> Self {
        Self::default().with_env_path(std::env::var_os("PATH"))
    }

    /// Layers `VAGRANT_WRAPPER_PATHS` and `VAGRANT_WRAPPER_REQUIRE` on top.
    ///
    /// Used by the command line surfaces only; the library constructors
    /// keep the built-in priority list and ask for no requirement.
    pub fn with_wrapper_env(self) -> Self {
        self.with_overrides(std::env::var_os(PATHS_ENV), std::env::var_os(REQUIRE_ENV))
    }

    fn with_overrides(mut self, paths: Option<OsString>, requirement: Option<OsString>) -> Self {
        if let Some(paths) = paths {
            self.priority_paths = env_paths(Some(paths.as_os_str()));
        }
        let requirement = requirement
            .and_then(|expr| expr.into_string().ok())
            .map(|expr| expr.trim().to_string())
            .filter(|expr| !expr.is_empty());
        if requirement.is_some() {
            self.requirement = requirement;
        }
        self
    }

    pub fn with_requirement<S: Into<String>>(mut self, requirement: Option<S>) -> Self {
        self.requirement = requirement.map(Into::into);
        self
    }

    pub fn with_priority_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.priority_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env_path<S: Into<OsString>>(mut self, env_path: Option<S>) -> Self {
        self.env_path = env_path.map(Into::into);
        self
    }

    pub fn with_wrapper_mark(mut self, mark: &str) -> Self {
        self.wrapper_mark = mark.to_string();
        self
    }

    pub fn skip_current_exe(mut self, skip: bool) -> Self {
        self.skip_current_exe = skip;
        self
    }

    /// Text printed after a failure, ending with a newline.
    pub fn install_instructions(&self) -> String {
        format!("{}\n", self.install_hint)
    }
}

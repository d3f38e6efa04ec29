use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Builds the built-in priority directories for a tool.
///
/// On Unix these are, in order:
/// - `/opt/<tool>/bin`
/// - `/usr/local/bin`
/// - `/usr/bin`
/// - `/bin`
///
/// The packaged install directory comes first so that a stale copy found
/// through `PATH` never shadows it.
#[cfg(not(windows))]
pub fn default_priority_paths(tool_name: &str) -> Vec<PathBuf> {
    vec![
        PathBuf::from(format!("/opt/{tool_name}/bin")),
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/usr/bin"),
        PathBuf::from("/bin"),
    ]
}

/// Builds the built-in priority directories for a tool.
///
/// On Windows the packaged installer places binaries under `C:\HashiCorp\<Tool>\bin`.
#[cfg(windows)]
pub fn default_priority_paths(tool_name: &str) -> Vec<PathBuf> {
    let mut chars = tool_name.chars();
    let display: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    vec![PathBuf::from(format!(r"C:\HashiCorp\{display}\bin"))]
}

/// Splits a search-path variable value into directories.
///
/// An absent, empty or whitespace-only value yields no directories. Empty
/// segments (`a::b`) are dropped rather than read as the working directory.
pub fn env_paths(raw: Option<&OsStr>) -> Vec<PathBuf> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let split: Vec<PathBuf> = match raw.to_str() {
        Some(text) => std::env::split_paths(text.trim()).collect(),
        None => std::env::split_paths(raw).collect(),
    };
    split
        .into_iter()
        .filter(|dir| !dir.as_os_str().is_empty())
        .collect()
}

/// The ordered directories searched for a tool: priority paths first, then
/// the directories of the captured `PATH`.
///
/// Built once and never changed afterwards. Duplicates are kept; the first
/// eligible match still wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    priority: Vec<PathBuf>,
    env: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(priority: Vec<PathBuf>, env_path: Option<&OsStr>) -> Self {
        Self {
            priority,
            env: env_paths(env_path),
        }
    }

    pub fn default_paths(&self) -> &[PathBuf] {
        &self.priority
    }

    pub fn env_paths(&self) -> &[PathBuf] {
        &self.env
    }

    /// Iterates every directory in search order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.priority.iter().chain(self.env.iter()).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.priority.len() + self.env.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

use std::cell::OnceCell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use crate::config::WrapperConfig;
use crate::paths::SearchPath;

const TAIL_CHUNK: u64 = 4096;

/// Returns the last line of `bytes`, without its line terminator.
///
/// A single trailing newline does not start a new (empty) line, matching
/// `tail -n1`.
pub fn last_line(bytes: &[u8]) -> &[u8] {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let body = body.strip_suffix(b"\r").unwrap_or(body);
    match body.iter().rposition(|&b| b == b'\n') {
        Some(idx) => &body[idx + 1..],
        None => body,
    }
}

/// Whether file contents belong to a wrapper shim: the last line contains `mark`.
///
/// Works on raw bytes; no encoding is assumed.
pub fn is_self_wrapper(contents: &[u8], mark: &[u8]) -> bool {
    if mark.is_empty() {
        return false;
    }
    last_line(contents)
        .windows(mark.len())
        .any(|window| window == mark)
}

/// Reads only the last line of a file, scanning backwards from its end.
pub fn read_last_line(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut pos = file.metadata()?.len();
    // newest-first; joined once at the end
    let mut chunks: Vec<Vec<u8>> = Vec::new();
    while pos > 0 {
        let step = TAIL_CHUNK.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos))?;
        let mut chunk = vec![0; step as usize];
        file.read_exact(&mut chunk)?;
        let body = if chunks.is_empty() {
            chunk.strip_suffix(b"\n").unwrap_or(chunk.as_slice())
        } else {
            chunk.as_slice()
        };
        let done = body.contains(&b'\n');
        chunks.push(chunk);
        if done {
            break;
        }
    }
    chunks.reverse();
    Ok(last_line(&chunks.concat()).to_vec())
}

/// Checks if a given path is an executable file on Unix.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Checks if a given path is a file with a Windows executable extension (.exe, .bat, .cmd).
#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    let is_file = std::fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let ext = ext.to_ascii_lowercase();
        is_file && matches!(ext.as_str(), "exe" | "bat" | "cmd")
    } else {
        false
    }
}

#[cfg(windows)]
fn candidate_names(tool_name: &str) -> Vec<String> {
    ["exe", "bat", "cmd"]
        .iter()
        .map(|ext| format!("{tool_name}.{ext}"))
        .collect()
}

#[cfg(not(windows))]
fn candidate_names(tool_name: &str) -> Vec<String> {
    vec![tool_name.to_string()]
}

/// Finds the first eligible copy of the tool along a [`SearchPath`].
///
/// The result, found or not, is computed once and reused for the lifetime of
/// the locator.
#[derive(Debug)]
pub struct BinaryLocator {
    search_path: SearchPath,
    tool_name: String,
    wrapper_mark: String,
    skip_current_exe: bool,
    resolved: OnceCell<Option<PathBuf>>,
}

impl BinaryLocator {
    pub fn new(config: &WrapperConfig) -> Self {
        Self {
            search_path: SearchPath::new(
                config.priority_paths.clone(),
                config.env_path.as_deref(),
            ),
            tool_name: config.tool_name.clone(),
            wrapper_mark: config.wrapper_mark.clone(),
            skip_current_exe: config.skip_current_exe,
            resolved: OnceCell::new(),
        }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Returns the located binary, scanning the search path on first use only.
    pub fn locate(&self) -> Option<&Path> {
        self.resolved.get_or_init(|| self.scan()).as_deref()
    }

    fn scan(&self) -> Option<PathBuf> {
        let current_exe = if self.skip_current_exe {
            std::env::current_exe()
                .and_then(std::fs::canonicalize)
                .ok()
        } else {
            None
        };
        for dir in self.search_path.iter() {
            for name in candidate_names(&self.tool_name) {
                let candidate = dir.join(name);
                if self.is_eligible(&candidate, current_exe.as_deref()) {
                    debug!("Located {} at {}", self.tool_name, candidate.display());
                    return Some(candidate);
                }
            }
        }
        debug!("{} not found in {} directories", self.tool_name, self.search_path.len());
        None
    }

    fn is_eligible(&self, candidate: &Path, current_exe: Option<&Path>) -> bool {
        if !is_executable(candidate) {
            trace!("Skipping {}: missing or not executable", candidate.display());
            return false;
        }
        if let Some(current_exe) = current_exe {
            if std::fs::canonicalize(candidate).is_ok_and(|resolved| resolved == current_exe) {
                debug!("Skipping {}: it is this executable", candidate.display());
                return false;
            }
        }
        match read_last_line(candidate) {
            Ok(line) if is_self_wrapper(&line, self.wrapper_mark.as_bytes()) => {
                debug!("Skipping {}: wrapper shim", candidate.display());
                false
            }
            Ok(_) => true,
            Err(err) => {
                warn!("Could not read {}: {err}; treating it as a real install", candidate.display());
                true
            }
        }
    }
}

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use crate::error::{Result, WrapperError};
#[cfg(not(windows))]
use crate::quote::shell_quote;

/// Renders a shim script that forwards every invocation to the wrapper CLI.
///
/// The last line always carries `mark`, so the locator recognises the shim
/// and never delegates back into it.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vagrant_wrapper::{is_self_wrapper, render_shim, WRAPPER_MARK};
///
/// let shim = render_shim(Path::new("/usr/local/bin/vagrant-wrapper"), WRAPPER_MARK, Some(">= 1.1"));
/// assert!(is_self_wrapper(shim.as_bytes(), WRAPPER_MARK.as_bytes()));
/// ```
#[cfg(not(windows))]
pub fn render_shim(wrapper_exe: &Path, mark: &str, requirement: Option<&str>) -> String {
    let exe = wrapper_exe.to_string_lossy();
    let require = match requirement {
        Some(expr) => format!(" --require {}", shell_quote(expr)),
        None => String::new(),
    };
    format!(
        "#!/bin/sh\n\
         # Generated by vagrant-wrapper.\n\
         exec {} exec{require} -- \"$@\"\n\
         # {mark}\n",
        shell_quote(&exe)
    )
}

/// Renders a `.bat` shim that forwards every invocation to the wrapper CLI.
///
/// The last line always carries `mark`.
#[cfg(windows)]
pub fn render_shim(wrapper_exe: &Path, mark: &str, requirement: Option<&str>) -> String {
    let require = match requirement {
        Some(expr) => format!(" --require \"{expr}\""),
        None => String::new(),
    };
    format!(
        "@echo off\r\n\"{}\" exec{require} -- %*\r\nexit /b %ERRORLEVEL%\r\nREM {mark}\r\n",
        wrapper_exe.display()
    )
}

/// Writes a rendered shim to `shim_path` and marks it executable.
///
/// On Windows the file gets a `.bat` extension. An existing file is only
/// replaced when `force` is set.
///
/// Returns the path actually written.
pub fn write_shim<P: AsRef<Path>>(shim_path: P, contents: &str, force: bool) -> Result<PathBuf> {
    #[cfg(windows)]
    let path = shim_path.as_ref().with_extension("bat");
    #[cfg(not(windows))]
    let path = shim_path.as_ref().to_path_buf();

    let io_err = |source: io::Error| WrapperError::Io {
        path: path.clone(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o755);
    }
    let mut file = options.open(&path).map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)?;

    // mode() only applies to newly created files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o755))
            .map_err(io_err)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WRAPPER_MARK;
    use crate::locator::{is_executable, is_self_wrapper, read_last_line};
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn test_render_shim_forwards_arguments() {
        let shim = render_shim(Path::new("/usr/local/bin/vagrant-wrapper"), WRAPPER_MARK, None);
        assert_eq!(
            shim,
            "#!/bin/sh\n\
             # Generated by vagrant-wrapper.\n\
             exec /usr/local/bin/vagrant-wrapper exec -- \"$@\"\n\
             # END VAGRANT WRAPPER\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_render_shim_quotes_path_and_requirement() {
        let shim = render_shim(Path::new("/opt/my tools/vagrant-wrapper"), WRAPPER_MARK, Some(">= 1.1"));
        assert!(shim.contains("exec '/opt/my tools/vagrant-wrapper' exec --require '>= 1.1' -- \"$@\"\n"));
    }

    #[test]
    fn test_rendered_shim_is_recognised() {
        let shim = render_shim(Path::new("vagrant-wrapper"), WRAPPER_MARK, Some("~> 2.0"));
        assert!(is_self_wrapper(shim.as_bytes(), WRAPPER_MARK.as_bytes()));
    }

    #[test]
    fn test_write_shim_creates_executable() {
        let dir = tempdir().unwrap();
        let shim = render_shim(Path::new("vagrant-wrapper"), WRAPPER_MARK, None);
        let path = write_shim(dir.path().join("vagrant"), &shim, false).unwrap();

        assert!(is_executable(&path));
        let last = read_last_line(&path).unwrap();
        assert!(is_self_wrapper(&last, WRAPPER_MARK.as_bytes()));
    }

    #[test]
    fn test_write_shim_refuses_to_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("vagrant");
        let first = write_shim(&target, "first\n", false).unwrap();

        let err = write_shim(&target, "second\n", false).unwrap_err();
        assert!(matches!(
            err,
            WrapperError::Io { ref source, .. } if source.kind() == io::ErrorKind::AlreadyExists
        ));
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "first\n");

        write_shim(&target, "second\n", true).unwrap();
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "second\n");
    }
}

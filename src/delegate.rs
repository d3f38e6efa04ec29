use std::borrow::Cow;
use std::convert::Infallible;
use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use tracing::debug;
use crate::error::{Result, WrapperError};
use crate::quote::shell_join;

/// Combined stdout and stderr of a finished child, plus its exit status.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub output: Vec<u8>,
}

impl CapturedOutput {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

fn collect_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter().map(|arg| arg.as_ref().to_os_string()).collect()
}

/// Interpreter for executable scripts without a `#!` line, as a shell would run them.
const FALLBACK_SHELL: &str = "/bin/sh";

/// `ENOEXEC`: the kernel does not know how to run the file.
#[cfg(unix)]
fn is_exec_format_error(err: &io::Error) -> bool {
    const ENOEXEC: i32 = 8;
    err.raw_os_error() == Some(ENOEXEC)
}

#[cfg(not(unix))]
fn is_exec_format_error(_err: &io::Error) -> bool {
    false
}

fn tool_command(program: &Path, args: &[OsString], via_shell: bool) -> Command {
    let mut command = if via_shell {
        debug!("{} is not a binary; running it with {FALLBACK_SHELL}", program.display());
        let mut command = Command::new(FALLBACK_SHELL);
        command.arg(program);
        command
    } else {
        Command::new(program)
    };
    command.args(args);
    command
}

/// Spawns with stdout and stderr both on `writer`. The command, and with it
/// its copies of the write end, is dropped before returning.
fn spawn_merged(mut command: Command, writer: &io::PipeWriter) -> io::Result<Child> {
    command
        .stdout(writer.try_clone()?)
        .stderr(writer.try_clone()?)
        .spawn()
}

/// Renders a program and its arguments as a shell command line, each word
/// quoted exactly once.
pub fn command_line<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    shell_join(
        std::iter::once(program.as_os_str())
            .chain(args.iter().map(AsRef::<OsStr>::as_ref))
            .map(OsStr::to_string_lossy),
    )
}

/// Runs `program` to completion and returns everything it printed.
///
/// Stderr is merged into stdout through one pipe, so the bytes keep the order
/// in which the child wrote them. A non-zero exit is not an error here.
///
/// Arguments go straight into the child's argv; no shell sees them. An
/// executable script without a `#!` line is handed to `/bin/sh`, as a shell
/// would do.
pub fn capture<I, S>(program: &Path, args: I) -> Result<CapturedOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args = collect_args(args);
    debug!("Running {}", command_line(program, args.as_slice()));
    let spawn_err = |source: io::Error| WrapperError::Spawn {
        program: program.to_path_buf(),
        source,
    };

    let (mut reader, writer) = io::pipe().map_err(spawn_err)?;
    let mut child = match spawn_merged(tool_command(program, &args, false), &writer) {
        Err(err) if is_exec_format_error(&err) => {
            spawn_merged(tool_command(program, &args, true), &writer)
        }
        spawned => spawned,
    }
    .map_err(spawn_err)?;
    // reading only sees EOF once every write end outside the child is closed
    drop(writer);

    let mut output = Vec::new();
    reader.read_to_end(&mut output).map_err(spawn_err)?;
    let status = child.wait().map_err(spawn_err)?;
    debug!("{} exited with {status}", program.display());
    Ok(CapturedOutput { status, output })
}

/// Replaces the current process with `program`.
///
/// On success this never returns: the tool keeps this process id, streams and
/// environment, and its exit code becomes ours. The error case is the only
/// way back.
#[cfg(unix)]
pub fn replace<I, S>(program: &Path, args: I) -> Result<Infallible>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    use std::os::unix::process::CommandExt;

    let args = collect_args(args);
    debug!("Handing over to {}", command_line(program, args.as_slice()));
    let mut source = tool_command(program, &args, false).exec();
    if is_exec_format_error(&source) {
        source = tool_command(program, &args, true).exec();
    }
    Err(WrapperError::Spawn {
        program: program.to_path_buf(),
        source,
    })
}

/// Runs `program` with inherited streams and exits with its exit code.
///
/// Without exec(2), console control events reach the child directly because
/// it shares our console; we only wait and mirror the result.
#[cfg(not(unix))]
pub fn replace<I, S>(program: &Path, args: I) -> Result<Infallible>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args = collect_args(args);
    debug!("Handing over to {}", command_line(program, args.as_slice()));
    let status = tool_command(program, &args, false)
        .status()
        .map_err(|source| WrapperError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;
    std::process::exit(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_arguments_once() {
        let line = command_line(
            Path::new("/opt/vagrant/bin/vagrant"),
            &["ssh", "-c", "echo 'hi'", ""],
        );
        assert_eq!(line, r"/opt/vagrant/bin/vagrant ssh -c 'echo '\''hi'\''' ''");
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_runs_script_without_interpreter_line() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("vagrant");
        std::fs::write(&script, "echo \"Vagrant 1.2.3 $1\"\necho oops >&2\nexit 6\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let captured = capture(&script, ["two words"]).unwrap();
        assert_eq!(captured.text(), "Vagrant 1.2.3 two words\noops\n");
        assert_eq!(captured.code(), Some(6));
    }

    #[test]
    fn test_capture_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("vagrant");
        let err = capture(&missing, ["-v"]).unwrap_err();
        assert!(matches!(err, WrapperError::Spawn { program, .. } if program == missing));
    }
}

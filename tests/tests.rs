#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;
use vagrant_wrapper::*;

// Writing a script while another test forks can leave the script busy (ETXTBSY)
// when it is executed; tests that write and run fixtures take this lock.
static FIXTURE_LOCK: Mutex<()> = Mutex::new(());

fn fixture_lock() -> MutexGuard<'static, ()> {
    FIXTURE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn fake_vagrant(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("vagrant");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config_for(priority: &[&Path], env: &[&Path]) -> WrapperConfig {
    WrapperConfig::default()
        .with_priority_paths(priority.iter().copied())
        .with_env_path(Some(std::env::join_paths(env).unwrap()))
}

fn setup_tests() -> (TempDir, TempDir) {
    (TempDir::new().unwrap(), TempDir::new().unwrap())
}

#[test]
fn test_version_is_read_from_located_tool() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    let path = fake_vagrant(prio.path(), "echo 'Vagrant 1.8.1'");

    let wrapper = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    assert_eq!(wrapper.location(), Some(path.as_path()));
    assert_eq!(wrapper.version().unwrap(), Some("1.8.1".to_string()));
}

#[test]
fn test_satisfied_requirement_constructs() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    fake_vagrant(prio.path(), "echo 'Vagrant 1.8.1'");

    let config = config_for(&[prio.path()], &[env.path()]).with_requirement(Some(">= 1.1, < 2"));
    let wrapper = Wrapper::with_config(config).unwrap();
    let version = wrapper.require_version("~> 1.8").unwrap();
    assert_eq!(version.to_string(), "1.8.1");
}

#[test]
fn test_unsatisfied_requirement_is_version_mismatch() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    fake_vagrant(prio.path(), "echo 'Vagrant 1.0'");

    let config = config_for(&[prio.path()], &[env.path()]).with_requirement(Some(">= 999.0"));
    let err = Wrapper::with_config(config).unwrap_err();
    match &err {
        WrapperError::VersionMismatch { required, found, .. } => {
            assert_eq!(required, ">= 999.0");
            assert_eq!(found, "1.0");
        }
        other => panic!("expected a version mismatch, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Vagrant >= 999.0 is required. You have 1.0.");
}

#[test]
fn test_tool_without_version_number_counts_as_not_installed_for_requirements() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    fake_vagrant(prio.path(), "echo 'no idea'");

    let wrapper = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    assert_eq!(wrapper.version().unwrap(), None);
    assert!(matches!(
        wrapper.require_version(">= 1.0"),
        Err(WrapperError::NotInstalled { .. })
    ));
}

#[test]
fn test_get_output_merges_stderr_and_ignores_exit_code() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    fake_vagrant(prio.path(), "echo out\necho err 1>&2\necho more\nexit 3");

    let wrapper = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    let captured = wrapper.get_output(Vec::<String>::new()).unwrap().unwrap();
    assert_eq!(captured.text(), "out\nerr\nmore\n");
    assert_eq!(captured.code(), Some(3));
}

#[test]
fn test_script_without_interpreter_line_runs_through_sh() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    let path = prio.path().join("vagrant");
    fs::write(&path, "echo Vagrant 1.2.3\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

    let config = config_for(&[prio.path()], &[env.path()]).with_requirement(Some("~> 1.2"));
    let wrapper = Wrapper::with_config(config).unwrap();
    assert_eq!(wrapper.location(), Some(path.as_path()));
    assert_eq!(wrapper.version().unwrap(), Some("1.2.3".to_string()));
    let captured = wrapper.get_output(["status"]).unwrap().unwrap();
    assert_eq!(captured.text(), "Vagrant 1.2.3\n");
    assert_eq!(captured.code(), Some(0));
}

#[test]
fn test_get_output_passes_arguments_verbatim() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    fake_vagrant(prio.path(), "for arg in \"$@\"; do printf '[%s]\\n' \"$arg\"; done");

    let wrapper = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    let captured = wrapper
        .get_output(["two words", "it's", "$HOME", "", "a\"b"])
        .unwrap()
        .unwrap();
    assert_eq!(captured.text(), "[two words]\n[it's]\n[$HOME]\n[]\n[a\"b]\n");
}

#[test]
fn test_shim_ahead_in_search_order_is_skipped() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    let shim = render_shim(Path::new("/nonexistent/vagrant-wrapper"), WRAPPER_MARK, None);
    write_shim(prio.path().join("vagrant"), &shim, false).unwrap();
    let real = fake_vagrant(env.path(), "echo 'Vagrant 2.4.1'");

    let wrapper = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    assert_eq!(wrapper.location(), Some(real.as_path()));
    assert_eq!(wrapper.version().unwrap(), Some("2.4.1".to_string()));
}

#[test]
fn test_priority_paths_win_over_env_paths() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    let packaged = fake_vagrant(prio.path(), "echo 'Vagrant 2.0.0'");
    fake_vagrant(env.path(), "echo 'Vagrant 1.2.0'");

    let wrapper = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    assert_eq!(wrapper.location(), Some(packaged.as_path()));
    assert_eq!(wrapper.version().unwrap(), Some("2.0.0".to_string()));
}

#[test]
fn test_location_is_cached_for_the_wrapper_lifetime() {
    let _guard = fixture_lock();
    let (prio, env) = setup_tests();
    let path = fake_vagrant(prio.path(), "echo 'Vagrant 1.0'");

    let wrapper = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    assert_eq!(wrapper.location(), Some(path.as_path()));
    fs::remove_file(&path).unwrap();
    fake_vagrant(env.path(), "echo 'Vagrant 9.9'");
    assert_eq!(wrapper.location(), Some(path.as_path()));

    let rebuilt = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    assert_eq!(rebuilt.location(), Some(env.path().join("vagrant").as_path()));
}

#[test]
fn test_nothing_installed() {
    let (prio, env) = setup_tests();
    let wrapper = Wrapper::with_config(config_for(&[prio.path()], &[env.path()])).unwrap();
    assert_eq!(wrapper.location(), None);
    assert_eq!(wrapper.version().unwrap(), None);
    assert!(wrapper.get_output(["-v"]).unwrap().is_none());
    assert!(wrapper.env_paths().iter().all(|dir| !dir.as_os_str().is_empty()));
}

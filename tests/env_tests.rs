// Mutates the process environment, so it lives alone in its own test binary.

use tempfile::TempDir;
use vagrant_wrapper::*;

#[test]
fn test_new_ignores_wrapper_variables() {
    let (prio, env) = (TempDir::new().unwrap(), TempDir::new().unwrap());
    // SAFETY: the only test in this binary; no other thread reads the environment.
    unsafe {
        std::env::set_var("PATH", env.path());
        std::env::set_var(PATHS_ENV, prio.path());
        std::env::set_var(REQUIRE_ENV, ">= 999.0");
    }

    let wrapper = Wrapper::new(None).unwrap();
    assert!(wrapper.config().requirement.is_none());
    assert_eq!(wrapper.default_paths(), default_priority_paths(TOOL_NAME).as_slice());
    assert_eq!(wrapper.env_paths(), &[env.path().to_path_buf()]);

    let layered = WrapperConfig::from_env().with_wrapper_env();
    assert_eq!(layered.priority_paths, vec![prio.path().to_path_buf()]);
    assert_eq!(layered.requirement.as_deref(), Some(">= 999.0"));
}

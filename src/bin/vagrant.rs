//! Drop-in `vagrant` executable.
//!
//! Install it where the tool used to live: every invocation is handed to the
//! real install, found with this executable excluded from the search.

use std::ffi::OsString;
use vagrant_wrapper::{logging, Wrapper, WrapperConfig};

fn main() {
    logging::init("warn");
    let config = WrapperConfig::from_env()
        .with_wrapper_env()
        .skip_current_exe(true);
    let vagrant = Wrapper::require_or_help_install_with(config);
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    vagrant.execute(args)
}

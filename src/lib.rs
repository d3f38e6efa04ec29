//! # Vagrant Wrapper Core Library
//!
//! This crate finds the packaged install of an external tool (Vagrant by default),
//! checks its version and hands invocations over to it.
//!
//! Packaged installs are preferred over copies found through `PATH`, and wrapper
//! shims (files whose last line carries [`WRAPPER_MARK`]) are skipped, so the
//! wrapper can sit where the tool used to live without ever calling itself.
//!
//! This library is built for the `vagrant-wrapper` and `vagrant` binaries, but you
//! can also use it from other tools.
//!
//! ## Modules Overview
//! - [`paths`] – Built-in priority directories and `PATH` splitting
//! - [`locator`] – First-match search with wrapper-shim exclusion
//! - [`version`] – Version extraction and loose numeric versions
//! - [`requirement`] – Requirement expressions (`>= 1.1`, `~> 1.7, != 1.7.3`)
//! - [`delegate`] – Capturing output or replacing the current process
//! - [`wrapper`] – The [`Wrapper`] tying it all together
//! - [`shims`] – Generating shims that forward to the wrapper
//! - [`config`] – Construction-time configuration snapshot
//! - [`logging`] – `tracing` subscriber setup
//!
//! ## Example
//!
//! ```no_run
//! use vagrant_wrapper::Wrapper;
//!
//! let vagrant = Wrapper::require_or_help_install(Some(">= 1.1"));
//! if let Some(output) = vagrant.get_output(["status"]).unwrap() {
//!     print!("{}", output.text());
//! }
//! vagrant.execute(["up"]);
//! ```

pub mod config;
pub mod delegate;
pub mod error;
pub mod locator;
pub mod logging;
pub mod paths;
pub mod quote;
pub mod requirement;
pub mod shims;
pub mod version;
pub mod wrapper;

pub use config::*;
pub use delegate::{capture, command_line, replace, CapturedOutput};
pub use error::{Result, WrapperError};
pub use locator::{is_executable, is_self_wrapper, last_line, read_last_line, BinaryLocator};
pub use paths::{default_priority_paths, env_paths, SearchPath};
pub use quote::{shell_join, shell_quote};
pub use requirement::{satisfied, Constraint, Op, Requirement};
pub use shims::{render_shim, write_shim};
pub use version::{extract_version, Version};
pub use wrapper::*;

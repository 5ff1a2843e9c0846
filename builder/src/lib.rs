//! Trusted-package builder library.
//!
//! After a package installation, the builder visits every package published
//! under the trusted vendor namespace and runs the `build` script declared in
//! its `composer.json`. It is used by the `app-builder` CLI binary and can be
//! embedded by installers that want to trigger the same finishing step.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`console`] - Verbose progress messages
//! - [`error`] - Error types for launch failures, manifests and trust
//! - [`manifest`] - Package manifest action lookup
//! - [`options`] - Option maps and the three-layer run option merge
//! - [`orchestrator`] - Sequential build of all trusted packages
//! - [`process`] - Shell execution of package scripts
//! - [`scanner`] - Directory listing for package discovery
//! - [`trust`] - Trusted directory resolution

pub mod cli;
pub mod console;
pub mod error;
pub mod manifest;
pub mod options;
pub mod orchestrator;
pub mod process;
pub mod scanner;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod trust;

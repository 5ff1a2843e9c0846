//! Build orchestration across trusted packages.
//!
//! A run resolves the trusted directory, walks its immediate subdirectories
//! in enumeration order, and executes each package's `build` script one at a
//! time. Script failures are recorded and logged but never stop the run; only
//! a failure to launch the shell does.

use std::io::Write;

use camino::Utf8PathBuf;
use log::{debug, warn};

use crate::console::emit;
use crate::error::Result;
use crate::manifest::get_action;
use crate::options::{OptionMap, RunOptions};
use crate::process::{ExecutionResult, ProcessRunner, ScriptRequest, ShellRunner};
use crate::scanner::list_dir;
use crate::trust::{TrustResolver, TrustedRoot};

/// Manifest action run for every trusted package.
pub const BUILD_ACTION: &str = "build";

/// The three option sources of a run, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct OptionSources {
    /// Environment-style overrides.
    pub overrides: OptionMap,
    /// Options supplied by the caller.
    pub caller: OptionMap,
    /// Options derived from the command line.
    pub cli: OptionMap,
}

impl OptionSources {
    /// Merge the sources into run options.
    #[must_use]
    pub fn merge(&self) -> RunOptions {
        RunOptions::merge(&self.overrides, &self.caller, &self.cli)
    }
}

/// Record of one executed package script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    /// Directory name of the package.
    pub name: String,
    /// Full path to the package directory.
    pub path: Utf8PathBuf,
    /// The script that was executed.
    pub command: String,
    /// Captured output of the script.
    pub result: ExecutionResult,
}

/// Every script executed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// The trusted directory that was scanned.
    pub trusted_root: TrustedRoot,
    /// Outcomes in execution order.
    pub packages: Vec<PackageOutcome>,
}

impl BuildReport {
    /// Number of packages whose script was executed.
    #[must_use]
    pub fn count(&self) -> usize {
        self.packages.len()
    }

    /// Outcomes whose script exited with a non-zero code.
    pub fn failures(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.packages.iter().filter(|outcome| !outcome.result.success())
    }
}

/// Runs the build action of every trusted package.
#[derive(Debug, Clone)]
pub struct Orchestrator<R> {
    runner: R,
    resolver: TrustResolver,
}

impl Orchestrator<ShellRunner> {
    /// Create an orchestrator that runs scripts through the host shell.
    ///
    /// The running executable's location is only consulted when `options`
    /// name neither a vendor directory nor an install location.
    ///
    /// # Errors
    ///
    /// Returns an error if the install location is needed but cannot be
    /// determined.
    pub fn for_options(options: &RunOptions) -> Result<Self> {
        let resolver = if options.vendor_dir.is_some() || options.install_dir.is_some() {
            TrustResolver::hint_only()
        } else {
            TrustResolver::from_current_exe()?
        };
        Ok(Self::new(ShellRunner, resolver))
    }
}

impl<R: ProcessRunner> Orchestrator<R> {
    /// Create an orchestrator from a runner and a trust resolver.
    #[must_use]
    pub fn new(runner: R, resolver: TrustResolver) -> Self {
        Self { runner, resolver }
    }

    /// Borrow the process runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Borrow the default trust resolver.
    #[must_use]
    pub fn resolver(&self) -> &TrustResolver {
        &self.resolver
    }

    /// Merge `sources` and run the build.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub fn build(&self, sources: &OptionSources, out: &mut dyn Write) -> Result<Option<usize>> {
        self.run(&sources.merge(), out)
    }

    /// Run the build action of every trusted package.
    ///
    /// Returns the number of packages whose script was executed, or `None`
    /// when no trusted directory could be resolved.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BuilderError::Launch`] if a script cannot be
    /// started; the remaining packages are not visited.
    pub fn run(&self, options: &RunOptions, out: &mut dyn Write) -> Result<Option<usize>> {
        Ok(self.run_report(options, out)?.map(|report| report.count()))
    }

    /// Run the build and return every package outcome.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub fn run_report(
        &self,
        options: &RunOptions,
        out: &mut dyn Write,
    ) -> Result<Option<BuildReport>> {
        let resolver = options
            .install_dir
            .as_deref()
            .map_or_else(|| self.resolver.clone(), |dir| TrustResolver::new(dir));

        let Some(trusted_root) = resolver.resolve(options.vendor_dir.as_deref()) else {
            return Ok(None);
        };

        emit(out, &format!("Trusted dir: {trusted_root}"), options);

        let mut packages = Vec::new();
        for name in list_dir(trusted_root.as_path()) {
            let path = trusted_root.as_path().join(&name);
            if !path.is_dir() {
                continue;
            }

            let Some(command) = get_action(BUILD_ACTION, &path) else {
                continue;
            };

            emit(out, &format!("Running '{command}' on '{path}'..."), options);
            let result = self
                .runner
                .execute(&ScriptRequest::new(command.as_str(), path.as_path()))?;
            log_result(&name, &result);
            emit(out, &result.stdout, options);

            packages.push(PackageOutcome {
                name,
                path,
                command,
                result,
            });
        }

        Ok(Some(BuildReport {
            trusted_root,
            packages,
        }))
    }
}

fn log_result(name: &str, result: &ExecutionResult) {
    if !result.success() {
        warn!(
            "{BUILD_ACTION} script of {name} exited with code {}: {}",
            result.exit_code, result.stderr
        );
    } else if !result.stderr.is_empty() {
        debug!("{BUILD_ACTION} script of {name} wrote to stderr: {}", result.stderr);
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

//! Trusted directory resolution.
//!
//! Only packages published under the [`TRUSTED_VENDOR`] namespace may have
//! their build scripts run automatically. The vendor directory comes either
//! from an explicit hint or from the builder's own install location, which is
//! expected to sit at `vendor/<namespace>/<package>`.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::error::{BuilderError, TrustError};

/// Namespace whose packages are trusted.
pub const TRUSTED_VENDOR: &str = "proximify";

/// Required name of a derived vendor directory.
pub const VENDOR_DIR_NAME: &str = "vendor";

/// A canonical directory whose immediate children are trusted packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedRoot(Utf8PathBuf);

impl TrustedRoot {
    /// Borrow the canonical path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        &self.0
    }
}

impl AsRef<Utf8Path> for TrustedRoot {
    fn as_ref(&self) -> &Utf8Path {
        &self.0
    }
}

impl fmt::Display for TrustedRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes the trusted directory for a run.
#[derive(Debug, Clone)]
pub struct TrustResolver {
    install_dir: Option<Utf8PathBuf>,
}

impl TrustResolver {
    /// Create a resolver for a builder installed in `install_dir`.
    #[must_use]
    pub fn new(install_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            install_dir: Some(install_dir.into()),
        }
    }

    /// Create a resolver that only accepts an explicit vendor directory.
    #[must_use]
    pub fn hint_only() -> Self {
        Self { install_dir: None }
    }

    /// Create a resolver for the directory holding the running executable.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InstallLocation`] if the executable path is
    /// unavailable, has no parent, or is not valid UTF-8.
    pub fn from_current_exe() -> Result<Self, BuilderError> {
        let exe = std::env::current_exe().map_err(|err| BuilderError::InstallLocation {
            reason: err.to_string(),
        })?;
        let exe = Utf8PathBuf::try_from(exe).map_err(|err| BuilderError::InstallLocation {
            reason: format!("executable path is not valid UTF-8: {err}"),
        })?;
        let dir = exe.parent().ok_or_else(|| BuilderError::InstallLocation {
            reason: format!("{exe} has no parent directory"),
        })?;
        Ok(Self::new(dir))
    }

    /// The install location used to derive the default vendor directory.
    #[must_use]
    pub fn install_dir(&self) -> Option<&Utf8Path> {
        self.install_dir.as_deref()
    }

    /// Resolve the trusted directory, or `None` if it cannot be established.
    #[must_use]
    pub fn resolve(&self, vendor_dir_hint: Option<&Utf8Path>) -> Option<TrustedRoot> {
        self.try_resolve(vendor_dir_hint)
            .inspect_err(|err| debug!("no trusted directory: {err}"))
            .ok()
    }

    /// Resolve the trusted directory, reporting why resolution failed.
    ///
    /// A hint is used verbatim. Without one, the directory two levels above
    /// the install location must be named [`VENDOR_DIR_NAME`].
    ///
    /// # Errors
    ///
    /// Returns a [`TrustError`] describing the failed check.
    pub fn try_resolve(&self, vendor_dir_hint: Option<&Utf8Path>) -> Result<TrustedRoot, TrustError> {
        let vendor_dir = match vendor_dir_hint {
            Some(hint) => hint.to_owned(),
            None => self.default_vendor_dir()?,
        };

        let candidate = vendor_dir.join(TRUSTED_VENDOR);
        let canonical = candidate
            .as_std_path()
            .canonicalize()
            .map_err(|source| TrustError::Missing {
                path: candidate.clone(),
                source,
            })?;
        let canonical = Utf8PathBuf::try_from(canonical).map_err(|err| TrustError::NonUtf8 {
            path: err.as_path().display().to_string(),
        })?;

        if !canonical.is_dir() {
            return Err(TrustError::NotADirectory { path: canonical });
        }

        Ok(TrustedRoot(canonical))
    }

    fn default_vendor_dir(&self) -> Result<Utf8PathBuf, TrustError> {
        let install_dir = self
            .install_dir
            .as_deref()
            .ok_or(TrustError::NoInstallLocation)?;
        let vendor_dir = install_dir
            .ancestors()
            .nth(2)
            .filter(|dir| !dir.as_str().is_empty())
            .ok_or_else(|| TrustError::NoInstallParent {
                path: install_dir.to_owned(),
            })?;

        if vendor_dir.file_name() != Some(VENDOR_DIR_NAME) {
            return Err(TrustError::UnexpectedLayout {
                path: vendor_dir.to_owned(),
            });
        }

        Ok(vendor_dir.to_owned())
    }
}

//! Package manifest lookup.
//!
//! Each package may carry a `composer.json` whose `scripts` object maps
//! action names to shell commands. The strict [`lookup_action`] keeps "no
//! manifest", "not declared" and "unreadable" apart; [`get_action`] folds
//! every failure into `None` so that a broken third-party manifest never halts
//! a build cycle.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ManifestError;

/// File name of the package manifest.
pub const MANIFEST_FILE: &str = "composer.json";

/// Outcome of looking up an action in a package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionLookup {
    /// The manifest declares the action with this shell command.
    Declared(String),
    /// The manifest exists but does not declare the action.
    NotDeclared,
    /// The package has no manifest.
    NoManifest,
}

impl ActionLookup {
    /// Return the declared command, if any.
    #[must_use]
    pub fn into_command(self) -> Option<String> {
        match self {
            Self::Declared(command) => Some(command),
            Self::NotDeclared | Self::NoManifest => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    scripts: Option<Value>,
}

impl Manifest {
    fn script(&self, action: &str) -> Option<String> {
        let scripts: BTreeMap<String, Value> =
            serde_json::from_value(self.scripts.clone()?).ok()?;
        script_command(scripts.get(action)?)
    }
}

/// Composer allows a script to be a list of commands run in sequence.
///
/// Empty commands are not scripts.
fn script_command(value: &Value) -> Option<String> {
    match value {
        Value::String(command) if !command.is_empty() => Some(command.clone()),
        Value::Array(items) => {
            let commands: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
            let commands: Vec<&str> = commands?
                .into_iter()
                .filter(|command| !command.is_empty())
                .collect();
            (!commands.is_empty()).then(|| commands.join(" && "))
        }
        _ => None,
    }
}

/// Return the path of the manifest inside `package_dir`.
#[must_use]
pub fn manifest_path(package_dir: &Utf8Path) -> Utf8PathBuf {
    package_dir.join(MANIFEST_FILE)
}

/// Look up `action` in the manifest of `package_dir`.
///
/// # Errors
///
/// Returns [`ManifestError::Read`] when the manifest exists but cannot be
/// read, and [`ManifestError::Parse`] when it is not a JSON object.
pub fn lookup_action(
    action: &str,
    package_dir: &Utf8Path,
) -> Result<ActionLookup, ManifestError> {
    let path = manifest_path(package_dir);
    if !path.is_file() {
        return Ok(ActionLookup::NoManifest);
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
        path: path.clone(),
        source,
    })?;
    let manifest: Manifest =
        serde_json::from_str(&contents).map_err(|source| ManifestError::Parse { path, source })?;

    Ok(manifest
        .script(action)
        .map_or(ActionLookup::NotDeclared, ActionLookup::Declared))
}

/// Return the command declared for `action`, treating every failure as absent.
///
/// # Examples
///
/// ```
/// use app_builder::manifest::get_action;
/// use camino::Utf8Path;
///
/// assert_eq!(get_action("build", Utf8Path::new("/nonexistent/package")), None);
/// ```
#[must_use]
pub fn get_action(action: &str, package_dir: &Utf8Path) -> Option<String> {
    match lookup_action(action, package_dir) {
        Ok(lookup) => {
            debug!("{package_dir}: `{action}` lookup gave {lookup:?}");
            lookup.into_command()
        }
        Err(err) => {
            warn!("ignoring manifest: {err}");
            None
        }
    }
}

/// Return true when the package declares `action`.
#[must_use]
pub fn has_action(action: &str, package_dir: &Utf8Path) -> bool {
    get_action(action, package_dir).is_some()
}

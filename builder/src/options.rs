//! Run options and their three-layer merge.
//!
//! Options arrive as loosely typed key/value maps from three sources:
//! environment-style overrides, caller-supplied options, and options derived
//! from the command line. [`RunOptions::merge`] collapses them, in that order
//! of priority, into one immutable value that is passed to every component.

use std::collections::BTreeMap;
use std::fmt;

use camino::Utf8PathBuf;

/// Option key naming the vendor directory.
pub const VENDOR_DIR: &str = "vendor-dir";
/// Option key overriding the install location.
pub const INSTALL_DIR: &str = "install-dir";
/// Option key enabling progress messages.
pub const VERBOSE: &str = "verbose";
/// Option key appending a dashed line after each message.
pub const SEPARATOR: &str = "separator";
/// Option key appending a line break after each message.
pub const NEWLINE: &str = "newline";

/// Prefix of environment variables that override options.
pub const ENV_PREFIX: &str = "APP_BUILDER_";

/// Key of an option map entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    /// A named option such as `vendor-dir`.
    Named(String),
    /// A positional argument, keyed by its index in argv.
    Positional(usize),
}

impl From<&str> for OptionKey {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<usize> for OptionKey {
    fn from(index: usize) -> Self {
        Self::Positional(index)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Positional(index) => write!(f, "{index}"),
        }
    }
}

/// Value of an option map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A boolean flag.
    Flag(bool),
    /// A text value.
    Text(String),
}

impl OptionValue {
    /// Interpret the value as a boolean.
    ///
    /// Text is false when empty or one of `0`, `false`, `no`, `off`
    /// (case-insensitive), and true otherwise.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Text(text) => {
                let text = text.trim();
                !(text.is_empty()
                    || ["0", "false", "no", "off"]
                        .iter()
                        .any(|falsy| text.eq_ignore_ascii_case(falsy)))
            }
        }
    }

    /// Return the text of a [`OptionValue::Text`] value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<&str> for OptionValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Loosely typed options from a single source.
pub type OptionMap = BTreeMap<OptionKey, OptionValue>;

/// Derive options from command-line arguments.
///
/// `--key=value` maps `key` to `value` (split at the first `=`), a bare
/// `--key` maps `key` to `true`, and any other argument is stored under its
/// index in `args`. The first argument is the program name and is skipped.
///
/// Values keep any further `=`, so `--define=a=b` maps `define` to `a=b`
/// rather than truncating at the second `=`. A bare `--` is ignored.
///
/// # Examples
///
/// ```
/// use app_builder::options::{OptionKey, OptionValue, parse_args};
///
/// let options = parse_args(["prog", "--verbose", "--vendor-dir=/x"]);
/// assert_eq!(options.get(&OptionKey::from("verbose")), Some(&OptionValue::Flag(true)));
/// assert_eq!(options.get(&OptionKey::from("vendor-dir")), Some(&OptionValue::from("/x")));
/// assert_eq!(options.len(), 2);
/// ```
#[must_use]
pub fn parse_args<I, S>(args: I) -> OptionMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = OptionMap::new();

    for (index, arg) in args.into_iter().enumerate().skip(1) {
        let arg = arg.as_ref();
        match arg.strip_prefix("--") {
            Some("") => {}
            Some(option) => match option.split_once('=') {
                Some((key, value)) => {
                    options.insert(OptionKey::from(key), OptionValue::from(value));
                }
                None => {
                    options.insert(OptionKey::from(option), OptionValue::Flag(true));
                }
            },
            None => {
                options.insert(OptionKey::from(index), OptionValue::from(arg));
            }
        }
    }

    options
}

/// Derive override options from environment variables.
///
/// Only variables starting with [`ENV_PREFIX`] are considered. The remainder
/// of the name is lowercased and `_` becomes `-`, so `APP_BUILDER_VENDOR_DIR`
/// sets `vendor-dir`.
#[must_use]
pub fn from_env_vars<I, K, V>(vars: I) -> OptionMap
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let key = name.as_ref().strip_prefix(ENV_PREFIX)?;
            if key.is_empty() {
                return None;
            }
            let key = key.to_ascii_lowercase().replace('_', "-");
            Some((OptionKey::Named(key), OptionValue::Text(value.into())))
        })
        .collect()
}

/// Read override options from the process environment.
///
/// Variables whose name or value is not valid Unicode are skipped.
#[must_use]
pub fn env_overrides() -> OptionMap {
    from_env_vars(std::env::vars_os().filter_map(|(name, value)| {
        Some((name.into_string().ok()?, value.into_string().ok()?))
    }))
}

/// Merged configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Vendor directory hint for trust resolution.
    pub vendor_dir: Option<Utf8PathBuf>,
    /// Install location override for trust resolution.
    pub install_dir: Option<Utf8PathBuf>,
    /// Whether progress messages are printed.
    pub verbose: bool,
    /// Whether a dashed line follows each message.
    pub separator: bool,
    /// Whether each message ends with a line break.
    pub newline: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            vendor_dir: None,
            install_dir: None,
            verbose: false,
            separator: false,
            newline: true,
        }
    }
}

impl RunOptions {
    /// Merge the three option sources, highest priority first.
    ///
    /// # Examples
    ///
    /// ```
    /// use app_builder::options::{OptionMap, RunOptions, parse_args};
    ///
    /// let cli = parse_args(["prog", "--verbose=0", "--vendor-dir=/cli"]);
    /// let caller = parse_args(["prog", "--vendor-dir=/caller"]);
    /// let options = RunOptions::merge(&OptionMap::new(), &caller, &cli);
    /// assert_eq!(options.vendor_dir.as_deref().map(|p| p.as_str()), Some("/caller"));
    /// assert!(!options.verbose);
    /// ```
    #[must_use]
    pub fn merge(overrides: &OptionMap, caller: &OptionMap, cli: &OptionMap) -> Self {
        let layers = [overrides, caller, cli];
        let lookup = |name: &str| {
            let key = OptionKey::from(name);
            layers.iter().find_map(|layer| layer.get(&key))
        };
        let path = |name: &str| {
            lookup(name)
                .and_then(OptionValue::as_text)
                .filter(|text| !text.is_empty())
                .map(Utf8PathBuf::from)
        };
        let flag = |name: &str, default: bool| lookup(name).map_or(default, OptionValue::as_bool);

        let defaults = Self::default();
        Self {
            vendor_dir: path(VENDOR_DIR),
            install_dir: path(INSTALL_DIR),
            verbose: flag(VERBOSE, defaults.verbose),
            separator: flag(SEPARATOR, defaults.separator),
            newline: flag(NEWLINE, defaults.newline),
        }
    }

    /// Build options from a single caller-supplied map.
    #[must_use]
    pub fn from_map(options: &OptionMap) -> Self {
        Self::merge(&OptionMap::new(), options, &OptionMap::new())
    }
}

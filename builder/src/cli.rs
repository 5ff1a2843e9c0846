//! CLI argument definitions for the `app-builder` binary.
//!
//! The parsed arguments become the lowest-priority option source of a run;
//! `APP_BUILDER_*` environment variables override them.

use camino::Utf8PathBuf;
use clap::Parser;

use crate::options::{
    INSTALL_DIR, NEWLINE, OptionKey, OptionMap, OptionValue, SEPARATOR, VENDOR_DIR, VERBOSE,
    parse_args,
};

/// Run the build scripts of trusted vendor packages.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "app-builder")]
#[command(version, about)]
#[command(long_about = concat!(
    "Run the build scripts of trusted vendor packages.\n\n",
    "Every immediate subdirectory of <vendor>/proximify whose composer.json ",
    "declares a `build` script has that script run through the shell, one ",
    "package at a time, in the package's own directory.\n\n",
    "Without --vendor-dir the vendor directory is taken to be two levels above ",
    "the directory holding this executable, and must be named `vendor`.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  APP_BUILDER_<KEY>    Overrides option <key>, e.g. APP_BUILDER_VENDOR_DIR\n",
    "  RUST_LOG             Log filter for diagnostics (default: warn)\n",
))]
pub struct Cli {
    /// Vendor directory containing the trusted namespace.
    #[arg(long, value_name = "DIR")]
    pub vendor_dir: Option<Utf8PathBuf>,

    /// Install location used to derive the vendor directory.
    #[arg(long, value_name = "DIR")]
    pub install_dir: Option<Utf8PathBuf>,

    /// Print progress and script output.
    #[arg(short, long, value_name = "BOOL", require_equals = true)]
    pub verbose: Option<Option<String>>,

    /// Underline each message with a dashed line.
    #[arg(long, value_name = "BOOL", require_equals = true)]
    pub separator: Option<Option<String>>,

    /// End each message with a line break (default: true).
    #[arg(long, value_name = "BOOL", require_equals = true)]
    pub newline: Option<Option<String>>,

    /// Do not end messages with a line break.
    #[arg(long)]
    pub no_newline: bool,

    /// Additional option as KEY=VALUE or KEY (repeatable).
    #[arg(short = 'o', long = "option", value_name = "KEY[=VALUE]")]
    pub options: Vec<String>,

    /// Further `--key[=value]` options and positional arguments.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Convert the parsed arguments into an option map.
    ///
    /// `argv` must be the argument list `self` was parsed from, program name
    /// first. It is derived with [`parse_args`], so positional arguments keep
    /// their index in `argv`. Extra `-o` options are applied next and the
    /// dedicated flags last, so they win.
    #[must_use]
    pub fn to_option_map<I, S>(&self, argv: I) -> OptionMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = parse_args(argv);
        let extras = self.options.iter().map(|option| format!("--{option}"));
        map.extend(parse_args(
            std::iter::once("app-builder".to_owned()).chain(extras),
        ));

        let mut set = |key: &str, value: OptionValue| {
            map.insert(OptionKey::from(key), value);
        };
        if let Some(dir) = &self.vendor_dir {
            set(VENDOR_DIR, OptionValue::from(dir.as_str()));
        }
        if let Some(dir) = &self.install_dir {
            set(INSTALL_DIR, OptionValue::from(dir.as_str()));
        }
        for (key, flag) in [
            (VERBOSE, &self.verbose),
            (SEPARATOR, &self.separator),
            (NEWLINE, &self.newline),
        ] {
            if let Some(value) = flag {
                set(key, flag_value(value.as_deref()));
            }
        }
        if self.no_newline {
            set(NEWLINE, OptionValue::Flag(false));
        }

        map
    }
}

fn flag_value(value: Option<&str>) -> OptionValue {
    value.map_or(OptionValue::Flag(true), OptionValue::from)
}

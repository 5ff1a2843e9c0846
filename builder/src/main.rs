//! `app-builder` CLI entrypoint.
//!
//! Runs after package installation and executes the `build` script of every
//! trusted vendor package. Progress goes to stdout when verbose; diagnostics
//! go to stderr through the log filter.

use std::io::Write;

use app_builder::cli::Cli;
use app_builder::console::emit;
use app_builder::error::Result;
use app_builder::options::{OptionMap, env_overrides};
use app_builder::orchestrator::{OptionSources, Orchestrator};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    let argv: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let cli = Cli::parse_from(&argv);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &argv, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Routes `log` records from the library through a stderr formatter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        // A global subscriber is already installed.
    }
}

fn run(cli: &Cli, argv: &[String], out: &mut dyn Write) -> Result<Option<usize>> {
    run_with(&option_sources(cli, argv, env_overrides()), out)
}

fn run_with(sources: &OptionSources, out: &mut dyn Write) -> Result<Option<usize>> {
    let options = sources.merge();
    let count = Orchestrator::for_options(&options)?.run(&options, out)?;

    match count {
        Some(count) => emit(out, &format!("Processed {count} package(s)"), &options),
        None => emit(out, "No trusted directory found", &options),
    }

    Ok(count)
}

fn option_sources(cli: &Cli, argv: &[String], overrides: OptionMap) -> OptionSources {
    OptionSources {
        overrides,
        caller: OptionMap::new(),
        cli: cli.to_option_map(argv),
    }
}

fn exit_code_for_run_result(result: Result<Option<usize>>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                write_stderr_line(stderr, format!("  caused by: {cause}"));
                source = std::error::Error::source(cause);
            }
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_builder::error::BuilderError;
    use app_builder::options::{OptionKey, OptionValue, from_env_vars};
    use camino::Utf8PathBuf;

    #[test]
    fn exit_code_is_zero_on_success_and_unresolved_trust() {
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Ok(Some(3)), &mut stderr), 0);
        assert_eq!(exit_code_for_run_result(Ok(None), &mut stderr), 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn launch_error_prints_cause_and_returns_one() {
        let err = BuilderError::Launch {
            command: "make".to_owned(),
            working_dir: Utf8PathBuf::from("/vendor/proximify/pkg"),
            source: std::io::Error::other("no shell"),
        };

        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Err(err), &mut stderr), 1);

        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.contains("cannot execute `make`"));
        assert!(text.contains("caused by: no shell"));
    }

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("app-builder")
            .chain(args.iter().copied())
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn environment_overrides_beat_command_line() {
        let argv = argv(&["--vendor-dir", "/cli", "--verbose"]);
        let cli = Cli::parse_from(&argv);
        let overrides = from_env_vars([("APP_BUILDER_VENDOR_DIR", "/env")]);

        let sources = option_sources(&cli, &argv, overrides);
        let options = sources.merge();

        assert_eq!(options.vendor_dir, Some(Utf8PathBuf::from("/env")));
        assert!(options.verbose);
        assert_eq!(
            sources.cli.get(&OptionKey::from("verbose")),
            Some(&OptionValue::Flag(true))
        );
    }

    #[test]
    fn generic_arguments_reach_the_run() {
        let temp = tempfile::TempDir::new().expect("failed to create temp dir");
        let vendor = camino::Utf8Path::from_path(temp.path())
            .expect("non-UTF8 path")
            .join("vendor");
        std::fs::create_dir_all(vendor.join("proximify")).expect("create trusted dir");

        let vendor_arg = format!("--vendor-dir={vendor}");
        let argv = argv(&["--verbose", "--newline=0", &vendor_arg, "extra"]);
        let cli = Cli::try_parse_from(&argv).expect("arguments should parse");

        let sources = option_sources(&cli, &argv, OptionMap::new());
        assert_eq!(
            sources.cli.get(&OptionKey::Positional(4)),
            Some(&OptionValue::from("extra"))
        );

        let mut out = Vec::new();
        let count = run_with(&sources, &mut out).expect("run should not fail");
        assert_eq!(count, Some(0));
        let text = String::from_utf8(out).expect("output was not UTF-8");
        assert!(text.starts_with("Trusted dir: "));
        assert!(text.ends_with("Processed 0 package(s)"));
        assert!(!text.ends_with('\n'));
    }
}

//! Integration tests for the orchestrator using the scripted runner.

use app_builder::error::BuilderError;
use app_builder::manifest::MANIFEST_FILE;
use app_builder::options::{OptionKey, OptionMap, OptionValue};
use app_builder::orchestrator::{OptionSources, Orchestrator};
use app_builder::test_utils::{ExpectedScript, StubRunner, failure_result, success_result};
use app_builder::trust::TrustResolver;
use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Install {
    _temp: TempDir,
    trusted: Utf8PathBuf,
    builder_dir: Utf8PathBuf,
}

impl Install {
    fn package(&self, name: &str, script: Option<&str>) -> Utf8PathBuf {
        let dir = self.trusted.join(name);
        std::fs::create_dir_all(&dir).expect("create package dir");
        if let Some(script) = script {
            let manifest = serde_json::json!({
                "name": format!("proximify/{name}"),
                "scripts": { "build": script },
            });
            std::fs::write(dir.join(MANIFEST_FILE), manifest.to_string()).expect("write manifest");
        }
        dir
    }
}

/// A project tree with the builder installed at `vendor/proximify/app-builder`.
#[fixture]
fn install() -> Install {
    let temp = TempDir::new().expect("failed to create temp dir");
    let root = Utf8Path::from_path(temp.path())
        .expect("non-UTF8 path")
        .canonicalize_utf8()
        .expect("canonicalize");
    let trusted = root.join("vendor").join("proximify");
    let builder_dir = trusted.join("app-builder");
    std::fs::create_dir_all(&builder_dir).expect("create builder dir");
    Install {
        _temp: temp,
        trusted,
        builder_dir,
    }
}

fn verbose_sources() -> OptionSources {
    OptionSources {
        caller: OptionMap::from([(OptionKey::from("verbose"), OptionValue::Flag(true))]),
        ..OptionSources::default()
    }
}

#[rstest]
fn default_vendor_is_derived_from_install_location(install: Install) {
    let alpha = install.package("alpha", Some("npm run build"));
    let beta = install.package("beta", Some("make"));
    install.package("gamma", None);

    let runner = StubRunner::new(vec![
        ExpectedScript {
            command: "npm run build".to_owned(),
            working_dir: alpha,
            result: Ok(success_result("bundled")),
        },
        ExpectedScript {
            command: "make".to_owned(),
            working_dir: beta,
            result: Ok(failure_result(2, "make: *** [all] Error 2")),
        },
    ]);
    let orchestrator = Orchestrator::new(runner, TrustResolver::new(&install.builder_dir));

    let mut out = Vec::new();
    let count = orchestrator
        .build(&verbose_sources(), &mut out)
        .expect("run should not fail");

    assert_eq!(count, Some(2));
    orchestrator.runner().assert_finished();
    let text = String::from_utf8(out).expect("output was not UTF-8");
    assert!(text.starts_with(&format!("Trusted dir: {}\n", install.trusted)));
    assert!(text.contains("Running 'npm run build' on"));
    assert!(text.contains("bundled\n"));
}

#[rstest]
fn unexpected_layout_yields_none(install: Install) {
    install.package("alpha", Some("make"));

    let runner = StubRunner::new(Vec::new());
    let orchestrator = Orchestrator::new(runner, TrustResolver::new(&install.trusted));

    let count = orchestrator
        .build(&OptionSources::default(), &mut Vec::new())
        .expect("run should not fail");
    assert_eq!(count, None);
}

#[rstest]
fn scripts_run_one_at_a_time_in_package_directories(install: Install) {
    let dirs: Vec<Utf8PathBuf> = ["one", "two", "three"]
        .iter()
        .map(|name| install.package(name, Some("composer dump-autoload")))
        .collect();

    let expected = dirs
        .iter()
        .map(|dir| ExpectedScript {
            command: "composer dump-autoload".to_owned(),
            working_dir: dir.clone(),
            result: Ok(success_result("")),
        })
        .collect();
    let runner = StubRunner::new(expected);
    let orchestrator = Orchestrator::new(runner, TrustResolver::new(&install.builder_dir));

    let report = orchestrator
        .run_report(&OptionSources::default().merge(), &mut Vec::new())
        .expect("run should not fail")
        .expect("trust should resolve");
    assert_eq!(report.count(), 3);
    orchestrator.runner().assert_finished();

    let requested: Vec<Utf8PathBuf> = orchestrator
        .runner()
        .executed()
        .into_iter()
        .map(|request| request.working_dir)
        .collect();
    let mut visited: Vec<Utf8PathBuf> = report.packages.into_iter().map(|p| p.path).collect();
    assert_eq!(requested, visited);

    visited.sort();
    let mut expected_dirs = dirs;
    expected_dirs.sort();
    assert_eq!(visited, expected_dirs);
}

#[rstest]
fn unexpected_script_surfaces_as_error(install: Install) {
    install.package("alpha", Some("make"));

    let runner = StubRunner::new(Vec::new());
    let orchestrator = Orchestrator::new(runner, TrustResolver::new(&install.builder_dir));

    let err = orchestrator
        .build(&OptionSources::default(), &mut Vec::new())
        .expect_err("stub should reject the script");
    assert!(matches!(err, BuilderError::StubMismatch { .. }));
}

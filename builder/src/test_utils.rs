//! Shared test utilities for the builder crate.

use std::cell::RefCell;
use std::collections::VecDeque;

use camino::Utf8PathBuf;

use crate::error::{BuilderError, Result};
use crate::process::{ExecutionResult, ProcessRunner, ScriptRequest};

/// Creates a successful result with the given stdout.
pub fn success_result(stdout: &str) -> ExecutionResult {
    ExecutionResult {
        stdout: stdout.to_owned(),
        stderr: String::new(),
        exit_code: 0,
    }
}

/// Creates a failed result with the given exit code and stderr.
pub fn failure_result(exit_code: i32, stderr: &str) -> ExecutionResult {
    ExecutionResult {
        stdout: String::new(),
        stderr: stderr.to_owned(),
        exit_code,
    }
}

/// Represents an expected script invocation for testing.
#[derive(Debug)]
pub struct ExpectedScript {
    /// The expected shell command.
    pub command: String,
    /// The expected working directory.
    pub working_dir: Utf8PathBuf,
    /// The result to return when this script is run.
    pub result: Result<ExecutionResult>,
}

/// A scripted implementation of [`ProcessRunner`] for testing.
///
/// Expected scripts may arrive in any order, because packages are visited in
/// filesystem enumeration order. Each expectation is consumed once.
#[derive(Debug, Default)]
pub struct StubRunner {
    expected: RefCell<VecDeque<ExpectedScript>>,
    executed: RefCell<Vec<ScriptRequest>>,
}

impl StubRunner {
    /// Creates a new `StubRunner` with the given expected scripts.
    pub fn new(expected: Vec<ExpectedScript>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            executed: RefCell::new(Vec::new()),
        }
    }

    /// Returns every request received so far, in order.
    pub fn executed(&self) -> Vec<ScriptRequest> {
        self.executed.borrow().clone()
    }

    /// Asserts that all expected scripts have been run.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected scripts that were not run.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further script invocations"
        );
    }
}

impl ProcessRunner for StubRunner {
    fn execute(&self, request: &ScriptRequest) -> Result<ExecutionResult> {
        self.executed.borrow_mut().push(request.clone());

        let mut expected = self.expected.borrow_mut();
        let position = expected.iter().position(|call| {
            call.command == request.command && call.working_dir == request.working_dir
        });
        let Some(call) = position.and_then(|index| expected.remove(index)) else {
            return Err(BuilderError::StubMismatch {
                message: format!(
                    "unexpected script `{}` in {}",
                    request.command, request.working_dir
                ),
            });
        };

        call.result
    }
}

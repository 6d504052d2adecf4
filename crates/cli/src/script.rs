use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use ppcboot_config::{BoardManifest, StopReason, TestAssertion, TestScript};
use ppcboot_core::board::{Board, BootOptions};
use ppcboot_core::report::BootReport;

#[derive(Debug, Serialize)]
pub struct AssertionResult {
    pub assertion: TestAssertion,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub script: PathBuf,
    pub board: Option<PathBuf>,
    pub emulated: bool,
    pub max_polls: u32,
}

#[derive(Debug, Serialize)]
pub struct TestResult {
    pub status: &'static str,
    pub config: RunConfig,
    #[serde(flatten)]
    pub report: BootReport,
    pub assertions: Vec<AssertionResult>,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.status == "pass"
    }
}

/// Load, boot and check one test script.
pub fn run_script(script_path: &Path) -> Result<TestResult> {
    let script = TestScript::from_file(script_path)?;

    let board_path = script.inputs.board.as_ref().map(|board| {
        script_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(board)
    });
    let manifest = match &board_path {
        Some(path) => {
            tracing::info!("Loading board manifest: {:?}", path);
            BoardManifest::from_file(path)
                .with_context(|| format!("Board referenced by {:?}", script_path))?
        }
        None => BoardManifest::default(),
    };

    let options = BootOptions {
        emulated: script.inputs.emulated.unwrap_or(manifest.emulated),
        max_polls: script.limits.max_polls,
        echo: script.inputs.echo,
    };
    let report = Board::new(&manifest).boot(&options);
    let assertions = evaluate(&script.assertions, &report);
    let passed = assertions.iter().all(|a| a.passed);

    Ok(TestResult {
        status: if passed { "pass" } else { "fail" },
        config: RunConfig {
            script: script_path.to_path_buf(),
            board: board_path,
            emulated: options.emulated,
            max_polls: options.max_polls,
        },
        report,
        assertions,
    })
}

/// Check every assertion against the report. A script without an
/// `expected_stop_reason` expects the firmware to reach halt.
pub fn evaluate(assertions: &[TestAssertion], report: &BootReport) -> Vec<AssertionResult> {
    let mut results: Vec<AssertionResult> = assertions
        .iter()
        .map(|assertion| check(assertion, report))
        .collect();

    let has_stop_check = assertions
        .iter()
        .any(|a| matches!(a, TestAssertion::ExpectedStopReason(_)));
    if !has_stop_check && report.stop_reason != StopReason::Halt {
        results.push(AssertionResult {
            assertion: TestAssertion::ExpectedStopReason(ppcboot_config::StopReasonAssertion {
                expected_stop_reason: StopReason::Halt,
            }),
            passed: false,
            detail: format!("firmware stopped with {:?}", report.stop_reason),
        });
    }
    results
}

fn check(assertion: &TestAssertion, report: &BootReport) -> AssertionResult {
    let (passed, detail) = match assertion {
        TestAssertion::UartContains(a) => {
            let text = report.transcript_text();
            (
                text.contains(&a.uart_contains),
                format!("uart output {:?}", text),
            )
        }
        TestAssertion::ClockDivisor(a) => (
            report.clock_divisor == Some(a.clock_divisor),
            format!("clock divisor {:?}", report.clock_divisor),
        ),
        TestAssertion::ExpectedStopReason(a) => (
            report.stop_reason == a.expected_stop_reason,
            format!("stop reason {:?}", report.stop_reason),
        ),
    };
    AssertionResult {
        assertion: assertion.clone(),
        passed,
        detail,
    }
}

//! Verdict aggregation: language-agnostic comparison of captured outputs
//! against expectations.
//!
//! This module knows nothing about toolchains, workspaces or subprocesses;
//! it is a pure function from execution captures to a verdict, which keeps
//! grading deterministic regardless of how execution happened.
//!
//! Comparison rule: `trim(actual) == trim(expected)`, exact equality.
//! Surrounding whitespace and trailing-newline differences are forgiven;
//! internal whitespace and case are significant. Expected/actual payloads
//! are attached only to failing cases.

use arbiter_common::{SubmissionVerdict, TestCaseResult, VerdictStatus};
use tracing::debug;

/// Raw capture from running one test case, before any comparison.
#[derive(Debug, Clone)]
pub struct CaseExecution {
    /// 1-based index in the provider's case order.
    pub index: usize,
    pub input: String,
    pub expected_output: String,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub runtime_error: bool,
    pub timed_out: bool,
}

fn normalize_output(output: &str) -> &str {
    output.trim()
}

pub fn evaluate_case(exec: &CaseExecution) -> TestCaseResult {
    let ran_cleanly = !exec.runtime_error && !exec.timed_out;
    let passed = ran_cleanly
        && normalize_output(&exec.stdout) == normalize_output(&exec.expected_output);

    TestCaseResult {
        index: exec.index,
        passed,
        time_ms: exec.duration_ms,
        expected: if passed {
            None
        } else {
            Some(normalize_output(&exec.expected_output).to_string())
        },
        actual: if passed {
            None
        } else {
            Some(normalize_output(&exec.stdout).to_string())
        },
        input: exec.input.clone(),
    }
}

/// Fold the attempted executions into the overall verdict.
///
/// The engine stops executing at the first runtime error, so `executions`
/// holds exactly the attempted prefix; a runtime error therefore dominates
/// the overall status. With a clean run the verdict is `accepted` iff every
/// case passed and at least one case was evaluated.
pub fn aggregate(executions: &[CaseExecution]) -> SubmissionVerdict {
    let test_cases: Vec<TestCaseResult> = executions.iter().map(evaluate_case).collect();

    let (overall_status, message) = if executions.is_empty() {
        (
            VerdictStatus::InternalError,
            Some("No test cases were evaluated".to_string()),
        )
    } else if let Some(failed) = executions.iter().find(|e| e.runtime_error || e.timed_out) {
        let message = if failed.timed_out {
            format!(
                "Time limit exceeded on test case {} after {} ms",
                failed.index, failed.duration_ms
            )
        } else {
            format!("Runtime Error: {}", failed.stderr.trim())
        };
        (VerdictStatus::RuntimeError, Some(message))
    } else if test_cases.iter().all(|c| c.passed) {
        (VerdictStatus::Accepted, None)
    } else {
        (VerdictStatus::WrongAnswer, None)
    };

    debug!(
        status = %overall_status,
        cases = test_cases.len(),
        passed = test_cases.iter().filter(|c| c.passed).count(),
        "Aggregated verdict"
    );

    SubmissionVerdict {
        overall_status,
        test_cases,
        message,
    }
}

/// Verdict for a submission that never ran: the compile step failed.
pub fn compilation_failure(stderr: &str) -> SubmissionVerdict {
    SubmissionVerdict {
        overall_status: VerdictStatus::CompilationError,
        test_cases: Vec::new(),
        message: Some(format!("Compilation Error: {}", stderr.trim())),
    }
}

/// Score as the original platform computed it: an even share of the
/// problem's points per passing case.
pub fn score(passed: usize, total: usize, points: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    passed as f64 * (points as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(index: usize, expected: &str, stdout: &str) -> CaseExecution {
        CaseExecution {
            index,
            input: "input".to_string(),
            expected_output: expected.to_string(),
            stdout: stdout.to_string(),
            stderr: String::new(),
            duration_ms: 10,
            runtime_error: false,
            timed_out: false,
        }
    }

    #[test]
    fn exact_match_passes() {
        let result = evaluate_case(&exec(1, "120", "120"));
        assert!(result.passed);
        assert_eq!(result.index, 1);
        assert!(result.expected.is_none());
        assert!(result.actual.is_none());
    }

    #[test]
    fn surrounding_whitespace_is_forgiven() {
        let result = evaluate_case(&exec(1, "hello", "  hello  \n"));
        assert!(result.passed);
        let result = evaluate_case(&exec(1, "line1\nline2", "line1\nline2\n"));
        assert!(result.passed);
    }

    #[test]
    fn case_and_internal_whitespace_are_significant() {
        assert!(!evaluate_case(&exec(1, "Hello", "hello")).passed);
        assert!(!evaluate_case(&exec(1, "a b", "a  b")).passed);
    }

    #[test]
    fn failure_carries_expected_and_actual() {
        let result = evaluate_case(&exec(2, "expected", "actual\n"));
        assert!(!result.passed);
        assert_eq!(result.expected.as_deref(), Some("expected"));
        assert_eq!(result.actual.as_deref(), Some("actual"));
        assert_eq!(result.input, "input");
    }

    #[test]
    fn runtime_error_fails_even_with_matching_output() {
        let mut e = exec(1, "ok", "ok");
        e.runtime_error = true;
        assert!(!evaluate_case(&e).passed);
    }

    #[test]
    fn all_passing_cases_accept() {
        let verdict = aggregate(&[exec(1, "a", "a"), exec(2, "b", "b")]);
        assert_eq!(verdict.overall_status, VerdictStatus::Accepted);
        assert_eq!(verdict.test_cases.len(), 2);
        assert!(verdict.message.is_none());
    }

    #[test]
    fn one_mismatch_is_wrong_answer() {
        let verdict = aggregate(&[exec(1, "a", "a"), exec(2, "b", "nope")]);
        assert_eq!(verdict.overall_status, VerdictStatus::WrongAnswer);
        assert!(verdict.test_cases[0].passed);
        assert!(!verdict.test_cases[1].passed);
    }

    #[test]
    fn runtime_error_dominates() {
        let mut crashed = exec(2, "b", "");
        crashed.runtime_error = true;
        crashed.stderr = "division by zero".to_string();

        let verdict = aggregate(&[exec(1, "a", "a"), crashed]);
        assert_eq!(verdict.overall_status, VerdictStatus::RuntimeError);
        assert!(verdict.message.as_deref().unwrap().contains("division by zero"));
    }

    #[test]
    fn timeout_reports_the_limit_breach() {
        let mut slow = exec(1, "a", "");
        slow.timed_out = true;
        slow.duration_ms = 5000;

        let verdict = aggregate(&[slow]);
        assert_eq!(verdict.overall_status, VerdictStatus::RuntimeError);
        assert!(verdict.message.as_deref().unwrap().contains("Time limit exceeded"));
    }

    #[test]
    fn empty_execution_list_is_internal_error() {
        let verdict = aggregate(&[]);
        assert_eq!(verdict.overall_status, VerdictStatus::InternalError);
    }

    #[test]
    fn compilation_failure_has_no_cases() {
        let verdict = compilation_failure("solution.cpp:3: expected ';'");
        assert_eq!(verdict.overall_status, VerdictStatus::CompilationError);
        assert!(verdict.test_cases.is_empty());
        assert!(verdict.message.as_deref().unwrap().contains("expected ';'"));
    }

    #[test]
    fn score_splits_points_evenly() {
        assert_eq!(score(2, 4, 100), 50.0);
        assert_eq!(score(4, 4, 100), 100.0);
        assert_eq!(score(0, 4, 100), 0.0);
        assert_eq!(score(0, 0, 100), 0.0);
    }
}
